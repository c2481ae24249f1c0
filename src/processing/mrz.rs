use crate::models::{CheckDigits, MrzData, MrzFormat};
use crate::utils::DocumentError;

/// ICAO Doc 9303 machine readable zone parser.
///
/// Validates layout, character set and every check digit the layout carries
/// before any field is returned.
pub struct MrzParser;

impl MrzParser {
    /// Parse `raw` using the layout it declares.
    pub fn parse_detected(raw: &str) -> Result<MrzData, DocumentError> {
        let lines = Self::split_lines(raw);
        let format = MrzFormat::detect(&lines).ok_or_else(|| {
            DocumentError::MrzParsing("unrecognised MRZ layout".to_string())
        })?;
        Self::parse_lines(lines, format)
    }

    /// Parse `raw` as the given layout.
    pub fn parse(raw: &str, format: MrzFormat) -> Result<MrzData, DocumentError> {
        Self::parse_lines(Self::split_lines(raw), format)
    }

    /// Split raw input into trimmed, upper-cased MRZ lines.
    ///
    /// A single line holding a whole two line zone is cut in half.
    pub fn split_lines(raw: &str) -> Vec<String> {
        let mut lines: Vec<String> = raw
            .lines()
            .map(|line| line.trim().to_ascii_uppercase())
            .filter(|line| !line.is_empty())
            .collect();

        if lines.len() == 1 && matches!(lines[0].len(), 88 | 72) && lines[0].is_ascii() {
            let half = lines[0].len() / 2;
            let second = lines[0].split_off(half);
            lines.push(second);
        }

        lines
    }

    /// ICAO 7-3-1 weighted check digit. `None` if the field holds a character outside `0-9A-Z<`.
    pub fn check_digit(field: &str) -> Option<char> {
        const WEIGHTS: [u32; 3] = [7, 3, 1];
        let mut total = 0;
        for (i, c) in field.chars().enumerate() {
            total += Self::char_value(c)? * WEIGHTS[i % 3];
        }
        char::from_digit(total % 10, 10)
    }

    fn char_value(c: char) -> Option<u32> {
        match c {
            '0'..='9' => c.to_digit(10),
            'A'..='Z' => Some(c as u32 - 'A' as u32 + 10),
            '<' => Some(0),
            _ => None,
        }
    }

    fn parse_lines(lines: Vec<String>, format: MrzFormat) -> Result<MrzData, DocumentError> {
        let width = format.mrz_chars_per_line();

        if lines.len() != format.mrz_lines() {
            return Err(DocumentError::MrzParsing(format!(
                "{} expects {} lines of {} characters, found {} line(s)",
                format,
                format.mrz_lines(),
                width,
                lines.len()
            )));
        }

        for (i, line) in lines.iter().enumerate() {
            if let Some(c) = line.chars().find(|c| Self::char_value(*c).is_none()) {
                return Err(DocumentError::MrzParsing(format!(
                    "invalid character '{}' in line {}",
                    c,
                    i + 1
                )));
            }
            if line.len() != width {
                return Err(DocumentError::MrzParsing(format!(
                    "line {} has {} characters, {} expects {}",
                    i + 1,
                    line.len(),
                    format,
                    width
                )));
            }
        }

        // Both lines are ASCII from here on, so byte slicing is safe.
        let line1 = &lines[0];
        let line2 = &lines[1];

        let code = line1.chars().next().unwrap_or('<');
        if !format.document_codes().contains(&code) {
            return Err(DocumentError::MrzParsing(format!(
                "document code '{}' is not valid for {}",
                &line1[0..2],
                format
            )));
        }

        let (surname, given_names) = Self::split_name(&line1[5..]);

        let document_number_check = Self::verify(&line2[0..9], &line2[9..10], "document number")?;
        let date_of_birth_check = Self::verify(&line2[13..19], &line2[19..20], "date of birth")?;
        let date_of_expiry_check = Self::verify(&line2[21..27], &line2[27..28], "date of expiry")?;

        let (optional_range, optional_data_check, composite_check) = match format {
            MrzFormat::TD3 => {
                let optional = Self::verify_optional(&line2[28..42], &line2[42..43])?;
                let composite_input = format!("{}{}{}", &line2[0..10], &line2[13..20], &line2[21..43]);
                let composite = Self::verify(&composite_input, &line2[43..44], "composite")?;
                (28..42, Some(optional), Some(composite))
            }
            MrzFormat::TD2 => {
                let composite_input = format!("{}{}{}", &line2[0..10], &line2[13..20], &line2[21..35]);
                let composite = Self::verify(&composite_input, &line2[35..36], "composite")?;
                (28..35, None, Some(composite))
            }
            MrzFormat::MRVA | MrzFormat::MRVB => (28..width, None, None),
        };

        let optional_data = Self::strip_filler(&line2[optional_range]);

        Ok(MrzData {
            document_format: format,
            document_type: Self::strip_filler(&line1[0..2]),
            issuing_country: Self::strip_filler(&line1[2..5]),
            document_number: Self::strip_filler(&line2[0..9]),
            surname,
            given_names,
            nationality: Self::strip_filler(&line2[10..13]),
            date_of_birth: line2[13..19].to_string(),
            sex: Self::strip_filler(&line2[20..21]),
            date_of_expiry: line2[21..27].to_string(),
            optional_data: (!optional_data.is_empty()).then_some(optional_data),
            check_digits: CheckDigits {
                document_number_check,
                date_of_birth_check,
                date_of_expiry_check,
                optional_data_check,
                composite_check,
            },
            raw_mrz_lines: lines.clone(),
        })
    }

    fn verify(field: &str, check: &str, name: &str) -> Result<char, DocumentError> {
        let found = check.chars().next().unwrap_or('<');
        let expected = Self::check_digit(field).ok_or_else(|| {
            DocumentError::MrzParsing(format!("invalid character in {}", name))
        })?;

        if found == expected {
            Ok(found)
        } else {
            Err(DocumentError::MrzParsing(format!(
                "{} check digit mismatch (expected {}, found {})",
                name, expected, found
            )))
        }
    }

    // An empty optional field may carry '<' instead of '0' as its check digit.
    fn verify_optional(field: &str, check: &str) -> Result<char, DocumentError> {
        if check == "<" && field.chars().all(|c| c == '<') {
            return Ok('<');
        }
        Self::verify(field, check, "optional data")
    }

    fn split_name(field: &str) -> (String, String) {
        let field = field.trim_end_matches('<');
        let (surname, given) = field.split_once("<<").unwrap_or((field, ""));
        (Self::filler_to_spaces(surname), Self::filler_to_spaces(given))
    }

    fn filler_to_spaces(value: &str) -> String {
        value
            .split('<')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn strip_filler(value: &str) -> String {
        value.trim_matches('<').to_string()
    }
}
