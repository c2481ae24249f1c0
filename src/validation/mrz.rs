use crate::models::{FieldMatch, MrzComparison, MrzFields};
use crate::validation::expiry::ExpiryValidator;
use chrono::NaiveDateTime;

/// Cross-checks the passport and visa MRZ field sets.
pub struct MrzValidator;

impl MrzValidator {
    /// Only the visa's validity window is checked; passport expiry does not matter here.
    pub fn compare(passport: &MrzFields, visa: &MrzFields, now: NaiveDateTime) -> MrzComparison {
        MrzComparison {
            passport_number: Self::compare_field(
                passport.passport_number.as_deref(),
                visa.passport_number.as_deref(),
            ),
            full_name: Self::compare_field(passport.full_name.as_deref(), visa.full_name.as_deref()),
            visa_expiry_valid: ExpiryValidator::visa_expiry_status(visa.expiry_date.as_deref(), now),
        }
    }

    /// Exact equality, nothing is normalised.
    pub fn compare_field(passport: Option<&str>, visa: Option<&str>) -> FieldMatch {
        match (passport, visa) {
            (Some(p), Some(v)) if p == v => FieldMatch::Matched,
            (Some(p), Some(v)) => FieldMatch::Unmatched {
                passport: p.to_string(),
                visa: v.to_string(),
            },
            _ => FieldMatch::Missing,
        }
    }
}
