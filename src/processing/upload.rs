use crate::models::DocumentKind;
use crate::utils::DocumentError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// An uploaded document held in a request scoped temporary file.
///
/// The file is removed when the value is dropped, whatever happened in between.
/// [`ScopedUpload::remove`] does the same but reports a failed delete.
pub struct ScopedUpload {
    file: NamedTempFile,
}

impl ScopedUpload {
    pub fn save(
        dir: &Path,
        kind: DocumentKind,
        file_name: Option<&str>,
        data: &[u8],
    ) -> Result<Self, DocumentError> {
        let suffix = file_name.and_then(extension).unwrap_or_default();

        let mut file = tempfile::Builder::new()
            .prefix(&format!("{}-", kind))
            .suffix(&suffix)
            .tempfile_in(dir)?;

        file.write_all(data)?;
        file.flush()?;

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn remove(self) -> Result<(), DocumentError> {
        self.file.close()?;
        Ok(())
    }
}

// Only a short alphanumeric extension survives from the client supplied name.
fn extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?;
    (ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .then(|| format!(".{}", ext.to_ascii_lowercase()))
}
