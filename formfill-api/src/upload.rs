//! Multipart upload extraction

use crate::error::AppError;
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::Multipart;
use formfill_core::{ensure_pdf_filename, FormError};

/// Name used when the client omits a filename on the `file` part
pub const DEFAULT_FILENAME: &str = "document.pdf";

/// The parts of an upload request the handlers care about
#[derive(Debug, Default)]
pub struct Upload {
    pub filename: Option<String>,
    pub bytes: Option<Bytes>,
    pub module: Option<String>,
}

impl Upload {
    /// Drain `multipart`, keeping the first `file` and `module` parts
    ///
    /// Takes the extractor result as-is so a non-multipart request is
    /// answered with the same JSON error body as every other rejection.
    pub async fn read(multipart: Result<Multipart, MultipartRejection>) -> Result<Self, AppError> {
        let mut multipart = multipart?;
        let mut upload = Upload::default();

        while let Some(field) = multipart.next_field().await? {
            let field_name = field.name().unwrap_or("").to_string();
            match field_name.as_str() {
                "file" if upload.bytes.is_none() => {
                    upload.filename = field.file_name().map(str::to_string);
                    upload.bytes = Some(field.bytes().await?);
                }
                "module" if upload.module.is_none() => {
                    upload.module = Some(field.text().await?);
                }
                _ => {}
            }
        }

        Ok(upload)
    }

    pub fn filename(&self) -> &str {
        match self.filename.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => DEFAULT_FILENAME,
        }
    }

    /// Non-empty PDF bytes, or the matching rejection
    pub fn document(&self) -> Result<Bytes, FormError> {
        let bytes = match &self.bytes {
            Some(bytes) if !bytes.is_empty() => bytes.clone(),
            _ => return Err(FormError::EmptyUpload),
        };
        ensure_pdf_filename(self.filename())?;
        Ok(bytes)
    }
}

/// Make an uploaded name safe for a `Content-Disposition` header
///
/// Keeps only the final path component and replaces quotes, backslashes,
/// control and non-ASCII characters with `_`.
pub fn attachment_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim().is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        cleaned
    }
}
