use std::sync::atomic::{AtomicI64, Ordering};

static LAST_TOKEN: AtomicI64 = AtomicI64::new(0);

/// Returns a millisecond timestamp that is strictly greater than every value
/// previously returned in this process.
///
/// Two calls within the same millisecond still yield distinct tokens, so the
/// value doubles as an identifier suffix and as a total order on `create_time`.
pub fn next_token() -> i64 {
    let now = current_millis();
    let mut last = LAST_TOKEN.load(Ordering::Relaxed);
    loop {
        let candidate = if now > last { now } else { last + 1 };
        match LAST_TOKEN.compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
        {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}

/// Formats an identifier such as `conv_1718000000000`.
pub fn token_id(prefix: &str, token: i64) -> String {
    format!("{}_{}", prefix, token)
}

fn current_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
