use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MrzFormat {
    TD2,  // ID Card (105.0mm × 74.0mm)
    TD3,  // Passport (125.0mm × 88.0mm)
    MRVA, // Visa Format-A (80.0mm × 120.0mm)
    MRVB, // Visa Format-B (74.0mm × 105.0mm)
}

impl MrzFormat {
    pub fn mrz_lines(&self) -> usize {
        2
    }

    pub fn mrz_chars_per_line(&self) -> usize {
        match self {
            MrzFormat::TD2 => 36,
            MrzFormat::TD3 => 44,
            MrzFormat::MRVA => 44,
            MrzFormat::MRVB => 36,
        }
    }

    /// First character of the document code accepted for this layout.
    pub fn document_codes(&self) -> &'static [char] {
        match self {
            MrzFormat::TD2 => &['I', 'A', 'C'],
            MrzFormat::TD3 => &['P'],
            MrzFormat::MRVA | MrzFormat::MRVB => &['V'],
        }
    }

    /// Guess the layout from already split MRZ lines.
    pub fn detect(lines: &[String]) -> Option<MrzFormat> {
        if lines.len() != 2 {
            return None;
        }
        let code = lines[0].chars().next()?;
        match (lines[0].len(), code) {
            (44, 'P') => Some(MrzFormat::TD3),
            (44, 'V') => Some(MrzFormat::MRVA),
            (36, 'V') => Some(MrzFormat::MRVB),
            (36, 'I' | 'A' | 'C') => Some(MrzFormat::TD2),
            _ => None,
        }
    }
}

impl fmt::Display for MrzFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            MrzFormat::TD2 => "TD2",
            MrzFormat::TD3 => "TD3",
            MrzFormat::MRVA => "MRV-A",
            MrzFormat::MRVB => "MRV-B",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Passport,
    Visa,
}

impl DocumentKind {
    /// Capitalised name used in user facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Passport => "Passport",
            DocumentKind::Visa => "Visa",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Passport => "passport",
            DocumentKind::Visa => "visa",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw fields read from a machine readable zone.
#[derive(Debug, Clone)]
pub struct MrzData {
    pub document_format: MrzFormat,
    pub document_type: String,
    pub issuing_country: String,
    pub document_number: String,
    pub surname: String,
    pub given_names: String,
    pub nationality: String,
    pub date_of_birth: String,
    pub sex: String,
    /// `YYMMDD`, as printed.
    pub date_of_expiry: String,
    pub optional_data: Option<String>,
    pub check_digits: CheckDigits,
    pub raw_mrz_lines: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CheckDigits {
    pub document_number_check: char,
    pub date_of_birth_check: char,
    pub date_of_expiry_check: char,
    pub optional_data_check: Option<char>,
    pub composite_check: Option<char>,
}

/// Field set produced by the MRZ extractor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MrzFields {
    pub passport_number: Option<String>,
    pub full_name: Option<String>,
    pub expiry_date: Option<String>,
    pub nationality: Option<String>,
    /// Only present for visas; `Some(None)` serializes as `null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuing_country: Option<Option<String>>,
}

/// Field set returned by the vision model. Keys are whatever the model answered with.
pub type FieldSet = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// The model answer contained no `{...}` block.
    NoJson { raw: String },
    /// A `{...}` block was found but did not parse as a JSON object.
    /// Only the parser message goes out on the wire.
    MalformedJson { message: String, raw: String },
    /// Transport or service failure.
    Service(String),
}

impl ExtractionError {
    pub fn message(&self) -> &str {
        match self {
            ExtractionError::NoJson { .. } => "Invalid JSON from model",
            ExtractionError::MalformedJson { message, .. } => message,
            ExtractionError::Service(message) => message,
        }
    }

    pub fn raw(&self) -> Option<&str> {
        match self {
            ExtractionError::NoJson { raw } => Some(raw),
            ExtractionError::MalformedJson { .. } | ExtractionError::Service(_) => None,
        }
    }
}

impl Serialize for ExtractionError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = self.raw();
        let mut map = serializer.serialize_map(Some(if raw.is_some() { 2 } else { 1 }))?;
        map.serialize_entry("error", self.message())?;
        if let Some(raw) = raw {
            map.serialize_entry("raw", raw)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractionResult {
    Fields(FieldSet),
    Failed(ExtractionError),
}

impl ExtractionResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, ExtractionResult::Failed(_))
    }

    pub fn fields(&self) -> Option<&FieldSet> {
        match self {
            ExtractionResult::Fields(fields) => Some(fields),
            ExtractionResult::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMatch {
    Matched,
    Unmatched { passport: String, visa: String },
    Missing,
}

impl fmt::Display for FieldMatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldMatch::Matched => f.write_str("matched"),
            FieldMatch::Unmatched { passport, visa } => {
                write!(f, "unmatched (passport: {}, visa: {})", passport, visa)
            }
            FieldMatch::Missing => f.write_str("field missing"),
        }
    }
}

impl Serialize for FieldMatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExpiryStatus {
    #[serde(rename = "valid")]
    Valid,
    #[serde(rename = "expired")]
    Expired,
    #[serde(rename = "invalid or missing")]
    InvalidOrMissing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MrzComparison {
    pub passport_number: FieldMatch,
    pub full_name: FieldMatch,
    pub visa_expiry_valid: ExpiryStatus,
}

/// Outcome of `/validate-mrz`, tagged by `status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MrzValidation {
    Success {
        passport_data: MrzFields,
        visa_data: MrzFields,
        comparison_result: MrzComparison,
    },
    Error {
        passport_error: Option<String>,
        visa_error: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssue {
    PassportParsingFailed,
    VisaParsingFailed,
    FullNameMismatch,
    PassportNumberMismatch,
    VisaExpired,
    InvalidVisaExpiryDate,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let message = match self {
            ValidationIssue::PassportParsingFailed => "Passport parsing failed",
            ValidationIssue::VisaParsingFailed => "Visa parsing failed",
            ValidationIssue::FullNameMismatch => "Full name mismatch",
            ValidationIssue::PassportNumberMismatch => "Passport number mismatch",
            ValidationIssue::VisaExpired => "Visa is expired",
            ValidationIssue::InvalidVisaExpiryDate => "Invalid visa expiry date format",
        };
        f.write_str(message)
    }
}

impl Serialize for ValidationIssue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchStatus {
    Matched,
    #[serde(rename = "Mismatch Found")]
    MismatchFound,
}

/// Outcome of `/validate-documents`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentComparison {
    pub passport_fields: ExtractionResult,
    pub visa_fields: ExtractionResult,
    pub issues: Vec<ValidationIssue>,
    pub status: MatchStatus,
}
