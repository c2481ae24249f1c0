use crate::api::DEFAULT_MAX_UPLOAD_BYTES;
use crate::processing::vision::{GeminiConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "doccheck", about = "Passport and visa cross-check service")]
pub struct StartArgs {
    #[arg(short, long, env = "DOCCHECK_ADDRESS", default_value = "127.0.0.1")]
    pub address: String,

    #[arg(short, long, env = "DOCCHECK_PORT", default_value_t = 5001)]
    pub port: u16,

    /// Default log filter; RUST_LOG takes precedence.
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Directory for request scoped upload files. Created if missing.
    #[arg(long, env = "DOCCHECK_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    #[arg(long, env = "DOCCHECK_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_GEMINI_BASE_URL)]
    pub gemini_base_url: String,

    /// Let the model answer in free text instead of requesting JSON output.
    #[arg(long)]
    pub no_structured_output: bool,

    /// Answer given by the placeholder visa requirement lookup.
    #[arg(long, env = "DOCCHECK_VISA_REQUIRED", default_value_t = true, action = clap::ArgAction::Set)]
    pub visa_required: bool,
}

impl StartArgs {
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.gemini_api_key.clone(),
            model: self.gemini_model.clone(),
            base_url: self.gemini_base_url.clone(),
            structured_output: !self.no_structured_output,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
