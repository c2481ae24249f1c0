// Passport and visa cross-check service

use clap::Parser;
use doccheck::{
    api::{self, AppState},
    config::StartArgs,
    processing::GeminiClient,
    utils::DocumentError,
    validation::StaticVisaRequirement,
    PassportValidator,
};
use log::{info, warn};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), DocumentError> {
    let args = StartArgs::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    std::fs::create_dir_all(&args.upload_dir)?;

    let gemini = args.gemini_config();
    if gemini.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set, /validate-documents extractions will fail");
    }
    info!("Using model {} for document extraction", gemini.model);

    let model = Arc::new(GeminiClient::new(gemini)?);
    let state = AppState {
        validator: Arc::new(PassportValidator::new(model, args.upload_dir.clone())),
        visa_rules: Arc::new(StaticVisaRequirement::new(args.visa_required)),
    };

    let listener = TcpListener::bind(args.bind_address()).await?;
    api::serve(listener, api::router(state, args.max_upload_bytes)).await
}
