use crate::models::*;
use crate::processing::*;
use crate::utils::DocumentError;
use crate::validation::*;
use chrono::{Local, NaiveDateTime};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

/// A document image received from a client.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

/// Runs the extract, normalise, compare pipeline for a passport and its visa.
pub struct PassportValidator {
    model: Arc<dyn DocumentModel>,
    upload_dir: PathBuf,
}

impl PassportValidator {
    pub fn new(model: Arc<dyn DocumentModel>, upload_dir: impl Into<PathBuf>) -> Self {
        PassportValidator {
            model,
            upload_dir: upload_dir.into(),
        }
    }

    pub fn validate_mrz(&self, passport_mrz: &str, visa_mrz: &str) -> MrzValidation {
        self.validate_mrz_at(passport_mrz, visa_mrz, Local::now().naive_local())
    }

    /// Both MRZs must parse before anything is compared.
    pub fn validate_mrz_at(
        &self,
        passport_mrz: &str,
        visa_mrz: &str,
        now: NaiveDateTime,
    ) -> MrzValidation {
        let passport = MrzExtractor::extract(passport_mrz, DocumentKind::Passport);
        let visa = MrzExtractor::extract(visa_mrz, DocumentKind::Visa);

        match (passport, visa) {
            (Ok(passport_data), Ok(visa_data)) => {
                let comparison_result = MrzValidator::compare(&passport_data, &visa_data, now);
                info!(
                    "MRZ comparison: passport_number={}, full_name={}",
                    comparison_result.passport_number, comparison_result.full_name
                );
                MrzValidation::Success {
                    passport_data,
                    visa_data,
                    comparison_result,
                }
            }
            (passport, visa) => MrzValidation::Error {
                passport_error: passport.err().map(|e| e.to_string()),
                visa_error: visa.err().map(|e| e.to_string()),
            },
        }
    }

    /// Extract both images with the model and compare the results.
    ///
    /// Uploads live in temporary files for the duration of the call. Only
    /// failures to save or delete those files are returned as errors.
    pub async fn validate_documents(
        &self,
        passport: UploadedDocument,
        visa: UploadedDocument,
    ) -> Result<DocumentComparison, DocumentError> {
        let passport_upload = ScopedUpload::save(
            &self.upload_dir,
            DocumentKind::Passport,
            passport.file_name.as_deref(),
            &passport.data,
        )?;
        let visa_upload = ScopedUpload::save(
            &self.upload_dir,
            DocumentKind::Visa,
            visa.file_name.as_deref(),
            &visa.data,
        )?;

        let (passport_fields, visa_fields) = tokio::join!(
            extract_document_fields(self.model.as_ref(), passport_upload.path(), DocumentKind::Passport),
            extract_document_fields(self.model.as_ref(), visa_upload.path(), DocumentKind::Visa),
        );

        passport_upload.remove()?;
        visa_upload.remove()?;

        let comparison =
            DocumentValidator::compare(passport_fields, visa_fields, Local::now().naive_local());
        info!("Document comparison: {} issue(s)", comparison.issues.len());

        Ok(comparison)
    }
}
