use crate::models::{DocumentComparison, ExtractionResult, FieldSet, MatchStatus, ValidationIssue};
use crate::processing::dates::{normalize_date, parse_iso_date};
use crate::validation::expiry::ExpiryValidator;
use chrono::NaiveDateTime;
use serde_json::Value;

/// Cross-checks the field sets the vision model extracted from both images.
pub struct DocumentValidator;

impl DocumentValidator {
    pub fn compare(
        passport: ExtractionResult,
        visa: ExtractionResult,
        now: NaiveDateTime,
    ) -> DocumentComparison {
        let mut issues = Vec::new();

        if passport.is_failed() {
            issues.push(ValidationIssue::PassportParsingFailed);
        }
        if visa.is_failed() {
            issues.push(ValidationIssue::VisaParsingFailed);
        }

        if let (Some(p), Some(v)) = (passport.fields(), visa.fields()) {
            Self::check_fields(p, v, now, &mut issues);
        }

        let status = if issues.is_empty() {
            MatchStatus::Matched
        } else {
            MatchStatus::MismatchFound
        };

        DocumentComparison {
            passport_fields: passport,
            visa_fields: visa,
            issues,
            status,
        }
    }

    fn check_fields(
        passport: &FieldSet,
        visa: &FieldSet,
        now: NaiveDateTime,
        issues: &mut Vec<ValidationIssue>,
    ) {
        // Containment rather than equality: visas often add middle names or reorder.
        if let (Some(p), Some(v)) = (text(passport, "fullName"), text(visa, "fullName")) {
            if !v.to_lowercase().contains(&p.to_lowercase()) {
                issues.push(ValidationIssue::FullNameMismatch);
            }
        }

        if let (Some(p), Some(v)) = (present(passport, "passportNumber"), present(visa, "passportNumber")) {
            if p != v {
                issues.push(ValidationIssue::PassportNumberMismatch);
            }
        }

        if let Some(expiry) = text(visa, "documentExpiryDate") {
            match parse_iso_date(&normalize_date(&expiry)) {
                Some(date) if ExpiryValidator::is_expired(date, now) => {
                    issues.push(ValidationIssue::VisaExpired)
                }
                Some(_) => {}
                None => issues.push(ValidationIssue::InvalidVisaExpiryDate),
            }
        }
    }
}

/// A field that holds something: not null, false, zero or empty.
fn present<'a>(fields: &'a FieldSet, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|value| match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    })
}

/// A present field as text. Numbers are rendered the way JSON writes them.
fn text(fields: &FieldSet, key: &str) -> Option<String> {
    present(fields, key).map(|value| match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
