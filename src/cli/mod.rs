use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::application::DEFAULT_MODEL;
use crate::connector::{
    credential_from_env, ContainerConfig, Credential, DEFAULT_BASE_URL, DEFAULT_CREDENTIAL_HEADER,
};
use crate::domain::RetryPolicy;

#[derive(Parser)]
#[command(name = "chatrelay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Answer from canned replies instead of calling the upstream
    #[arg(long, global = true)]
    pub mock_responses: bool,

    /// Base URL of the upstream conversation API [env: CHATRELAY_UPSTREAM_URL]
    #[arg(long, global = true)]
    pub upstream_url: Option<String>,

    /// Credential forwarded upstream [env: CHATRELAY_API_KEY]
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Header carrying the credential [env: CHATRELAY_CREDENTIAL_HEADER]
    #[arg(long, global = true)]
    pub credential_header: Option<String>,

    #[arg(long, global = true, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Retries after the first fetch before giving up on a reply
    #[arg(long, global = true, default_value = "4")]
    pub max_retries: u32,

    #[arg(long, global = true, default_value = "1000")]
    pub base_delay_ms: u64,

    /// Growth of the delay between retries; values below 1 are treated as 1
    #[arg(long, global = true, default_value = "1.5")]
    pub backoff_factor: f64,

    #[arg(long, global = true, default_value = "10000")]
    pub max_delay_ms: u64,

    #[arg(long, global = true, default_value = "30")]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the chat API over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Send one prompt and wait for the reply
    Ask {
        prompt: String,

        /// Continue an existing conversation
        #[arg(short, long)]
        conversation: Option<String>,
    },
}

impl Cli {
    /// Flags win over the environment; the environment wins over defaults.
    pub fn container_config(&self) -> ContainerConfig {
        let upstream_url = self
            .upstream_url
            .clone()
            .or_else(|| std::env::var("CHATRELAY_UPSTREAM_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let credential = match self.api_key.as_deref().filter(|key| !key.is_empty()) {
            Some(key) => {
                let header = self
                    .credential_header
                    .clone()
                    .or_else(|| std::env::var("CHATRELAY_CREDENTIAL_HEADER").ok())
                    .unwrap_or_else(|| DEFAULT_CREDENTIAL_HEADER.to_string());
                Some(Credential::new(header, key))
            }
            None => credential_from_env().map(|env| match &self.credential_header {
                Some(header) => Credential::new(header.clone(), env.value().to_string()),
                None => env,
            }),
        };

        ContainerConfig {
            upstream_url,
            credential,
            mock_responses: self.mock_responses || mock_from_env(),
            default_model: self.model.clone(),
            retry_policy: RetryPolicy::new(
                self.max_retries,
                Duration::from_millis(self.base_delay_ms),
                self.backoff_factor,
                Duration::from_millis(self.max_delay_ms),
            ),
            request_timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn mock_from_env() -> bool {
    std::env::var("CHATRELAY_MOCK_RESPONSES")
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
