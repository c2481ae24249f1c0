pub mod documents;
pub mod expiry;
pub mod mrz;
pub mod timatic;

pub use documents::DocumentValidator;
pub use expiry::ExpiryValidator;
pub use mrz::MrzValidator;
pub use timatic::{StaticVisaRequirement, VisaRequirementLookup};
