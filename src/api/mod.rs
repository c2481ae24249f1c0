use crate::passport_validator::PassportValidator;
use crate::utils::DocumentError;
use crate::validation::VisaRequirementLookup;
use axum::{extract::DefaultBodyLimit, http::Method, routing::post, Router};
use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

mod error;
mod handlers;

pub use handlers::{MrzRequest, TimaticRequest, TimaticResponse};

/// Default cap on a request body, shared by both uploads.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<PassportValidator>,
    pub visa_rules: Arc<dyn VisaRequirementLookup>,
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/validate-mrz", post(handlers::validate_mrz))
        .route("/validate-documents", post(handlers::validate_documents))
        .route("/check-timatic", post(handlers::check_timatic))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), DocumentError> {
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
