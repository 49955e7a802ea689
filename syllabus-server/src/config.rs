use std::{env, net::SocketAddr};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

const SERVER_ADDR: &str = "SYLLABUS_SERVER_ADDR";
const API_KEY: &str = "OPENAI_API_KEY";
const MODEL: &str = "OPENAI_MODEL";
const BASE_URL: &str = "OPENAI_BASE_URL";

/// Service configuration, read from the environment exactly once at
/// startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let addr = match env::var(SERVER_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|_| format!("Failed to parse `{SERVER_ADDR}` environment variable"))?,
            Err(_) => SocketAddr::from(([127, 0, 0, 1], 8080)),
        };

        let api_key = env::var(API_KEY)
            .map_err(|_| format!("`{API_KEY}` environment variable is not set"))?;

        let model = env::var(MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let base_url = env::var(BASE_URL)
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            addr,
            api_key,
            model,
            base_url,
        })
    }
}
