//! # Application Layer
//!
//! Storage and upstream interfaces plus the use cases that coordinate them.

pub mod interfaces;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
