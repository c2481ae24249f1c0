// Field extractors: MRZ text and document images into field sets.
use crate::models::{DocumentKind, ExtractionError, ExtractionResult, MrzFields, MrzFormat};
use crate::processing::dates::format_mrz_date;
use crate::processing::mrz::MrzParser;
use crate::processing::vision::DocumentModel;
use crate::utils::DocumentError;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use std::path::Path;

lazy_static! {
    // Greedy on purpose: from the first '{' to the last '}' of the answer.
    static ref JSON_OBJECT: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
}

pub struct MrzExtractor;

impl MrzExtractor {
    /// Parse a passport (TD3) or visa (MRV-B, or MRV-A for 44 character lines) MRZ.
    ///
    /// Any parser failure becomes `"<Passport|Visa> MRZ parse error: <reason>"`.
    pub fn extract(raw: &str, kind: DocumentKind) -> Result<MrzFields, DocumentError> {
        let format = match kind {
            DocumentKind::Passport => MrzFormat::TD3,
            DocumentKind::Visa => match MrzFormat::detect(&MrzParser::split_lines(raw)) {
                Some(MrzFormat::MRVA) => MrzFormat::MRVA,
                _ => MrzFormat::MRVB,
            },
        };

        let mrz = MrzParser::parse(raw, format).map_err(|e| {
            DocumentError::MrzParsing(format!("{} MRZ parse error: {}", kind.label(), e))
        })?;

        let full_name = format!("{} {}", mrz.given_names, mrz.surname).trim().to_string();

        Ok(MrzFields {
            passport_number: non_empty(mrz.document_number),
            full_name: non_empty(full_name),
            expiry_date: format_mrz_date(&mrz.date_of_expiry),
            nationality: non_empty(mrz.nationality),
            issuing_country: match kind {
                DocumentKind::Passport => None,
                DocumentKind::Visa => Some(non_empty(mrz.issuing_country)),
            },
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// Instructions sent along with a document image.
pub fn build_prompt(kind: DocumentKind) -> String {
    let mut prompt = format!(
        "You are a document understanding expert. Extract the following fields from the \
         uploaded image of a {} document:\n\
         \n\
         - fullName\n\
         - passportNumber\n\
         - documentExpiryDate (for visa, this refers to the visa expiry date)\n",
        kind
    );

    if kind == DocumentKind::Visa {
        prompt.push_str(
            "- visaType\n\
             \n\
             Validate document authenticity based on structure and field completeness.\n\
             Respond with \"isAuthentic\": \"yes\" or \"no\" and a brief \"authenticityReason\".\n",
        );
    }

    prompt.push_str("\nRespond in compact JSON, without any explanations.");
    prompt
}

/// Pull the first `{...}` block out of a model answer and parse it.
pub fn parse_model_output(text: &str) -> ExtractionResult {
    let Some(found) = JSON_OBJECT.find(text) else {
        return ExtractionResult::Failed(ExtractionError::NoJson { raw: text.to_string() });
    };

    match serde_json::from_str(found.as_str().trim()) {
        Ok(fields) => ExtractionResult::Fields(fields),
        Err(e) => ExtractionResult::Failed(ExtractionError::MalformedJson {
            message: e.to_string(),
            raw: text.to_string(),
        }),
    }
}

/// Ask `model` for the fields of the image at `image_path`.
///
/// Never fails: transport problems and unusable answers come back as
/// [`ExtractionResult::Failed`].
pub async fn extract_document_fields(
    model: &dyn DocumentModel,
    image_path: &Path,
    kind: DocumentKind,
) -> ExtractionResult {
    let prompt = build_prompt(kind);

    let result = match model.generate(image_path, &prompt).await {
        Ok(text) => {
            debug!("{} answered {} characters for {}", model.id(), text.len(), kind);
            parse_model_output(&text)
        }
        Err(e) => ExtractionResult::Failed(ExtractionError::Service(e.to_string())),
    };

    if let ExtractionResult::Failed(e) = &result {
        warn!("{} field extraction failed: {}", kind.label(), e.message());
    }

    result
}
