pub mod dates;
pub mod extractors;
pub mod mrz;
pub mod upload;
pub mod vision;

pub use extractors::{extract_document_fields, MrzExtractor};
pub use mrz::MrzParser;
pub use upload::ScopedUpload;
pub use vision::{DocumentModel, GeminiClient, GeminiConfig};
