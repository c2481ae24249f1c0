use crate::models::ExpiryStatus;
use crate::processing::dates::parse_iso_date;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub struct ExpiryValidator;

impl ExpiryValidator {
    /// Status of a normalised (`YYYY-MM-DD`) visa expiry date.
    ///
    /// The date counts from midnight, so a visa expiring today is already expired.
    pub fn visa_expiry_status(expiry_date: Option<&str>, now: NaiveDateTime) -> ExpiryStatus {
        match expiry_date.and_then(parse_iso_date) {
            Some(date) if Self::start_of(date) > now => ExpiryStatus::Valid,
            Some(_) => ExpiryStatus::Expired,
            None => ExpiryStatus::InvalidOrMissing,
        }
    }

    /// True when the document stopped being valid strictly before `now`.
    pub fn is_expired(date: NaiveDate, now: NaiveDateTime) -> bool {
        Self::start_of(date) < now
    }

    fn start_of(date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::MIN)
    }
}
