use super::AppState;
use crate::models::{DocumentComparison, DocumentKind, MrzValidation};
use crate::passport_validator::UploadedDocument;
use crate::utils::DocumentError;
use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct MrzRequest {
    #[serde(default)]
    pub passport_mrz: String,
    #[serde(default)]
    pub visa_mrz: String,
}

pub(super) async fn validate_mrz(
    State(state): State<AppState>,
    payload: Result<Json<MrzRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!("Rejected /validate-mrz body: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "status": "error", "error": rejection.body_text() })),
            )
                .into_response();
        }
    };

    let result = state
        .validator
        .validate_mrz(&request.passport_mrz, &request.visa_mrz);

    let status = match &result {
        MrzValidation::Success { .. } => StatusCode::OK,
        MrzValidation::Error {
            passport_error,
            visa_error,
        } => {
            info!(
                "MRZ validation failed: passport={:?}, visa={:?}",
                passport_error, visa_error
            );
            StatusCode::BAD_REQUEST
        }
    };

    (status, Json(result)).into_response()
}

pub(super) async fn validate_documents(
    State(state): State<AppState>,
    form: Result<Multipart, MultipartRejection>,
) -> Result<Json<DocumentComparison>, DocumentError> {
    let mut form = form.map_err(|e| DocumentError::InvalidRequest(e.body_text()))?;

    let mut passport = None;
    let mut visa = None;

    while let Some(field) = form.next_field().await.map_err(invalid_multipart)? {
        let kind = match field.name() {
            Some("passport") => DocumentKind::Passport,
            Some("visa") => DocumentKind::Visa,
            _ => continue,
        };
        // Only file parts count as uploads.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        let slot = match kind {
            DocumentKind::Passport => &mut passport,
            DocumentKind::Visa => &mut visa,
        };
        if slot.is_some() {
            continue;
        }

        let data = field.bytes().await.map_err(invalid_multipart)?;
        info!("Received {} upload '{}' ({} bytes)", kind, file_name, data.len());

        *slot = Some(UploadedDocument {
            file_name: Some(file_name),
            data: data.to_vec(),
        });
    }

    let (Some(passport), Some(visa)) = (passport, visa) else {
        return Err(DocumentError::InvalidRequest(
            "Missing passport or visa files".to_string(),
        ));
    };

    Ok(Json(state.validator.validate_documents(passport, visa).await?))
}

fn invalid_multipart(e: axum::extract::multipart::MultipartError) -> DocumentError {
    DocumentError::InvalidRequest(format!("Invalid multipart body: {}", e.body_text()))
}

#[derive(Debug, Deserialize)]
pub struct TimaticRequest {
    #[serde(default = "unknown_nationality")]
    pub nationality: String,
}

fn unknown_nationality() -> String {
    "UNKNOWN".to_string()
}

#[derive(Debug, Serialize)]
pub struct TimaticResponse {
    pub nationality: String,
    pub visa_required: bool,
}

pub(super) async fn check_timatic(
    State(state): State<AppState>,
    payload: Result<Json<TimaticRequest>, JsonRejection>,
) -> Result<Json<TimaticResponse>, DocumentError> {
    let Json(TimaticRequest { nationality }) =
        payload.map_err(|e| DocumentError::InvalidRequest(e.body_text()))?;

    let visa_required = state.visa_rules.visa_required(&nationality);

    Ok(Json(TimaticResponse {
        nationality,
        visa_required,
    }))
}
