use async_trait::async_trait;
use doccheck::{
    api::{self, AppState},
    processing::DocumentModel,
    utils::DocumentError,
    validation::StaticVisaRequirement,
    PassportValidator,
};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::net::TcpListener;

const PASSPORT_MRZ: &str = "P<UTOSMITH<<JOHN<<<<<<<<<<<<<<<<<<<<<<<<<<<<\n\
                            1234567897UTO8001014M3512311<<<<<<<<<<<<<<<0";
const VISA_MRZ: &str = "V<UTOSMITH<<JOHN<<<<<<<<<<<<<<<<<<<<\n\
                        1234567897UTO8001014M3512311<<<<<<<<";
const VISA_MRZ_REVERSED: &str = "V<UTOJOHN<<SMITH<<<<<<<<<<<<<<<<<<<<\n\
                                 1234567897UTO8001014M3512311<<<<<<<<";
const VISA_MRZ_EXPIRED: &str = "V<UTOSMITH<<JOHN<<<<<<<<<<<<<<<<<<<<\n\
                                1234567897UTO8001014M2001012<<<<<<<<";

/// Stub vision model: a canned answer per document kind, or a failure.
struct StubModel {
    passport: Result<String, String>,
    visa: Result<String, String>,
    seen: Mutex<Vec<PathBuf>>,
}

impl StubModel {
    fn new(passport: Result<&str, &str>, visa: Result<&str, &str>) -> Self {
        Self {
            passport: passport.map(str::to_string).map_err(str::to_string),
            visa: visa.map(str::to_string).map_err(str::to_string),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DocumentModel for StubModel {
    fn id(&self) -> &str {
        "stub"
    }

    async fn generate(&self, image_path: &Path, prompt: &str) -> Result<String, DocumentError> {
        assert!(image_path.exists(), "upload must exist while the model reads it");
        self.seen.lock().unwrap().push(image_path.to_path_buf());

        let answer = if prompt.contains("visa document") {
            &self.visa
        } else {
            &self.passport
        };
        answer.clone().map_err(DocumentError::Model)
    }
}

struct TestServer {
    base_url: String,
    upload_dir: TempDir,
    model: Arc<StubModel>,
    client: reqwest::Client,
}

impl TestServer {
    async fn start(model: StubModel) -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let model = Arc::new(model);
        let state = AppState {
            validator: Arc::new(PassportValidator::new(model.clone(), upload_dir.path())),
            visa_rules: Arc::new(StaticVisaRequirement::default()),
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let router = api::router(state, api::DEFAULT_MAX_UPLOAD_BYTES);
        tokio::spawn(api::serve(listener, router));

        Self {
            base_url,
            upload_dir,
            model,
            client: reqwest::Client::new(),
        }
    }

    async fn post_json(&self, path: &str, body: Value) -> (u16, Value) {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        (response.status().as_u16(), response.json().await.unwrap())
    }

    async fn post_form(&self, form: Form) -> (u16, Value) {
        let response = self
            .client
            .post(format!("{}/validate-documents", self.base_url))
            .multipart(form)
            .send()
            .await
            .unwrap();
        (response.status().as_u16(), response.json().await.unwrap())
    }

    fn uploads_left(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path()).unwrap().count()
    }
}

fn image_part(name: &str) -> Part {
    Part::bytes(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec()).file_name(name.to_string())
}

fn both_images() -> Form {
    Form::new()
        .part("passport", image_part("passport.png"))
        .part("visa", image_part("visa.png"))
}

fn idle_model() -> StubModel {
    StubModel::new(Ok("{}"), Ok("{}"))
}

#[tokio::test]
async fn validate_mrz_matching_documents() {
    let server = TestServer::start(idle_model()).await;

    let (status, body) = server
        .post_json(
            "/validate-mrz",
            json!({"passport_mrz": PASSPORT_MRZ, "visa_mrz": VISA_MRZ}),
        )
        .await;

    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({
            "status": "success",
            "passport_data": {
                "passport_number": "123456789",
                "full_name": "JOHN SMITH",
                "expiry_date": "2035-12-31",
                "nationality": "UTO"
            },
            "visa_data": {
                "passport_number": "123456789",
                "full_name": "JOHN SMITH",
                "expiry_date": "2035-12-31",
                "nationality": "UTO",
                "issuing_country": "UTO"
            },
            "comparison_result": {
                "passport_number": "matched",
                "full_name": "matched",
                "visa_expiry_valid": "valid"
            }
        })
    );
}

#[tokio::test]
async fn validate_mrz_reports_mismatch_and_expiry() {
    let server = TestServer::start(idle_model()).await;

    let (_, body) = server
        .post_json(
            "/validate-mrz",
            json!({"passport_mrz": PASSPORT_MRZ, "visa_mrz": VISA_MRZ_REVERSED}),
        )
        .await;
    assert_eq!(
        body["comparison_result"]["full_name"],
        json!("unmatched (passport: JOHN SMITH, visa: SMITH JOHN)")
    );
    assert_eq!(body["comparison_result"]["passport_number"], json!("matched"));

    let (_, body) = server
        .post_json(
            "/validate-mrz",
            json!({"passport_mrz": PASSPORT_MRZ, "visa_mrz": VISA_MRZ_EXPIRED}),
        )
        .await;
    assert_eq!(body["comparison_result"]["visa_expiry_valid"], json!("expired"));
}

#[tokio::test]
async fn validate_mrz_parse_errors() {
    let server = TestServer::start(idle_model()).await;

    let (status, body) = server
        .post_json("/validate-mrz", json!({"passport_mrz": PASSPORT_MRZ}))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["status"], json!("error"));
    assert_eq!(body["passport_error"], Value::Null);
    assert!(body["visa_error"]
        .as_str()
        .unwrap()
        .starts_with("Visa MRZ parse error: "));

    let tampered = PASSPORT_MRZ.replace("1234567897", "1234567890");
    let (status, body) = server
        .post_json(
            "/validate-mrz",
            json!({"passport_mrz": tampered, "visa_mrz": VISA_MRZ}),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(
        body["passport_error"],
        json!("Passport MRZ parse error: document number check digit mismatch (expected 7, found 0)")
    );
    assert_eq!(body["visa_error"], Value::Null);
}

#[tokio::test]
async fn validate_mrz_rejects_non_json_body() {
    let server = TestServer::start(idle_model()).await;

    let response = server
        .client
        .post(format!("{}/validate-mrz", server.base_url))
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], json!("error"));
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn validate_documents_matched() {
    let server = TestServer::start(StubModel::new(
        Ok(r#"{"fullName":"JOHN SMITH","passportNumber":"123456789","documentExpiryDate":"01/01/2030"}"#),
        Ok("```json\n{\"fullName\":\"Mr John Smith\",\"passportNumber\":\"123456789\",\"documentExpiryDate\":\"31/12/2099\",\"visaType\":\"Tourist\",\"isAuthentic\":\"yes\",\"authenticityReason\":\"All fields present\"}\n```"),
    ))
    .await;

    let (status, body) = server.post_form(both_images()).await;

    assert_eq!(status, 200);
    assert_eq!(body["issues"], json!([]));
    assert_eq!(body["status"], json!("Matched"));
    assert_eq!(body["passport_fields"]["fullName"], json!("JOHN SMITH"));
    assert_eq!(body["visa_fields"]["visaType"], json!("Tourist"));

    assert_eq!(server.model.seen.lock().unwrap().len(), 2);
    assert_eq!(server.uploads_left(), 0);
}

#[tokio::test]
async fn validate_documents_with_prose_answers() {
    let server = TestServer::start(StubModel::new(
        Ok("I am unable to read this passport."),
        Ok("The visa image is blurry."),
    ))
    .await;

    let (status, body) = server.post_form(both_images()).await;

    assert_eq!(status, 200);
    assert_eq!(
        body["passport_fields"],
        json!({"error": "Invalid JSON from model", "raw": "I am unable to read this passport."})
    );
    assert_eq!(
        body["issues"],
        json!(["Passport parsing failed", "Visa parsing failed"])
    );
    assert_eq!(body["status"], json!("Mismatch Found"));
    assert_eq!(server.uploads_left(), 0);
}

#[tokio::test]
async fn validate_documents_service_failure_still_cleans_up() {
    let server = TestServer::start(StubModel::new(
        Ok(r#"{"fullName":"JOHN SMITH"}"#),
        Err("upstream timeout"),
    ))
    .await;

    let (status, body) = server.post_form(both_images()).await;

    assert_eq!(status, 200);
    assert_eq!(
        body["visa_fields"],
        json!({"error": "Model error: upstream timeout"})
    );
    assert_eq!(body["issues"], json!(["Visa parsing failed"]));

    let seen = server.model.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|path| !path.exists()));
    assert_eq!(server.uploads_left(), 0);
}

#[tokio::test]
async fn validate_documents_missing_file() {
    let server = TestServer::start(idle_model()).await;

    let form = Form::new().part("visa", image_part("visa.png"));
    let (status, body) = server.post_form(form).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Missing passport or visa files"}));

    // A plain text field is not a file upload.
    let form = Form::new()
        .text("passport", "not a file")
        .part("visa", image_part("visa.png"));
    let (status, body) = server.post_form(form).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Missing passport or visa files"}));

    assert!(server.model.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn check_timatic_stub() {
    let server = TestServer::start(idle_model()).await;

    let (status, body) = server
        .post_json("/check-timatic", json!({"nationality": "UTO"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"nationality": "UTO", "visa_required": true}));

    let (_, body) = server.post_json("/check-timatic", json!({})).await;
    assert_eq!(body, json!({"nationality": "UNKNOWN", "visa_required": true}));
}
