use crate::utils::DocumentError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use log::error;
use serde_json::json;

impl DocumentError {
    pub fn status(&self) -> StatusCode {
        use DocumentError as E;
        match self {
            E::InvalidRequest(_) | E::MrzParsing(_) => StatusCode::BAD_REQUEST,
            E::Model(_) | E::Http(_) => StatusCode::BAD_GATEWAY,
            E::Io(_) | E::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DocumentError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
