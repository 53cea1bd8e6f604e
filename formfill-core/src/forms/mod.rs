//! Interactive form (AcroForm) discovery and filling
//!
//! Parsing and serialization are delegated to `lopdf`. Only field values
//! are touched; appearance streams are left for the viewer to regenerate
//! (`/NeedAppearances true` is set on every fill).

mod acroform;
mod text;

pub use acroform::PdfForm;
pub use text::{decode_text_string, encode_text_string};

use crate::error::Result;
use crate::mapping::FieldMapping;
use serde::Serialize;

/// Field type from the (possibly inherited) `/FT` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Button,
    Choice,
    Signature,
    Unknown,
}

impl FieldKind {
    pub(crate) fn from_pdf_name(name: &[u8]) -> Self {
        match name {
            b"Tx" => FieldKind::Text,
            b"Btn" => FieldKind::Button,
            b"Ch" => FieldKind::Choice,
            b"Sig" => FieldKind::Signature,
            _ => FieldKind::Unknown,
        }
    }
}

/// A form field as discovered in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    /// Fully qualified name, ancestors joined with `.`
    pub name: String,
    pub kind: FieldKind,
    pub value: Option<String>,
}

/// What a fill actually touched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Mapping keys written into the document
    pub filled: Vec<String>,
    /// Mapping keys that name no field in the document
    pub unmatched: Vec<String>,
    /// Mapping keys naming fields that cannot be written (signatures,
    /// fields stored as direct objects)
    pub skipped: Vec<String>,
}

/// Filled document bytes plus the report
#[derive(Debug, Clone)]
pub struct FillOutcome {
    pub bytes: Vec<u8>,
    pub report: FillReport,
}

/// List the distinct form fields of a document, in discovery order
///
/// A document without an AcroForm yields an empty list.
pub fn list_fields(document: &[u8]) -> Result<Vec<FormField>> {
    Ok(PdfForm::load(document)?.fields())
}

pub fn field_names(document: &[u8]) -> Result<Vec<String>> {
    Ok(PdfForm::load(document)?.field_names())
}

/// Write `mapping` into the document's form fields
///
/// Fails with [`crate::FormError::UnfillableDocument`] when the document has no
/// form fields. Fields not named in `mapping` keep their current values.
pub fn fill(document: &[u8], mapping: &FieldMapping) -> Result<Vec<u8>> {
    fill_with_report(document, mapping).map(|outcome| outcome.bytes)
}

pub fn fill_with_report(document: &[u8], mapping: &FieldMapping) -> Result<FillOutcome> {
    let mut form = PdfForm::load(document)?;
    let report = form.apply(mapping)?;
    let bytes = form.to_bytes()?;
    Ok(FillOutcome { bytes, report })
}
