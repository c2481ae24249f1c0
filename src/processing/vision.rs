use crate::utils::DocumentError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use image::ImageFormat;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A model that reads a document image and answers a text prompt about it.
#[async_trait]
pub trait DocumentModel: Send + Sync {
    fn id(&self) -> &str;

    async fn generate(&self, image_path: &Path, prompt: &str) -> Result<String, DocumentError>;
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Ask the service for `application/json` output instead of free text.
    pub structured_output: bool,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            structured_output: true,
        }
    }
}

/// Gemini `generateContent` client sending the image inline.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, DocumentError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(&self, image: &[u8], prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: detect_mime_type(image).to_string(),
                            data: STANDARD.encode(image),
                        },
                    },
                    Part::Text { text: prompt.to_string() },
                ],
            }],
            generation_config: self.config.structured_output.then(|| GenerationConfig {
                response_mime_type: "application/json".to_string(),
            }),
        }
    }
}

#[async_trait]
impl DocumentModel for GeminiClient {
    fn id(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, image_path: &Path, prompt: &str) -> Result<String, DocumentError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| DocumentError::Config("Gemini API key is not configured".to_string()))?;

        let image = tokio::fs::read(image_path).await?;
        let request = self.build_request(&image, prompt);

        debug!(
            "Sending {} byte document to {} ({})",
            image.len(),
            self.config.model,
            request.contents[0].mime_type()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocumentError::Model(format!(
                "Gemini returned {}: {}",
                status, body
            )));
        }

        response_text(response.json::<GenerateContentResponse>().await?)
    }
}

/// Concatenated text parts of the first candidate.
fn response_text(response: GenerateContentResponse) -> Result<String, DocumentError> {
    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        let reason = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        DocumentError::Model(format!("Gemini returned no answer: {}", reason))
    })?;

    Ok(candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default())
}

/// MIME type of an uploaded scan, judged by its magic bytes.
pub fn detect_mime_type(data: &[u8]) -> &'static str {
    if data.starts_with(b"%PDF") {
        return "application/pdf";
    }

    match image::guess_format(data) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::WebP) => "image/webp",
        Ok(ImageFormat::Gif) => "image/gif",
        Ok(ImageFormat::Bmp) => "image/bmp",
        Ok(ImageFormat::Tiff) => "image/tiff",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

impl Content {
    fn mime_type(&self) -> &str {
        self.parts
            .iter()
            .find_map(|part| match part {
                Part::InlineData { inline_data } => Some(inline_data.mime_type.as_str()),
                Part::Text { .. } => None,
            })
            .unwrap_or("none")
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    #[serde(rename_all = "camelCase")]
    InlineData { inline_data: InlineData },
    Text { text: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
