//! # formfill-core
//!
//! Fills organizational PDF forms with representative and company data.
//!
//! ## Pipeline
//!
//! 1. [`ActorRegistry`] resolves a [`Module`] to the representative who
//!    signs for it.
//! 2. [`FieldMapper`] turns the field names found in a document into a
//!    [`FieldMapping`] using an ordered list of rules.
//! 3. [`forms::fill`] writes the mapping into the document's AcroForm.
//!
//! ```rust,no_run
//! use formfill_core::{forms, Config, Module};
//!
//! # fn main() -> formfill_core::Result<()> {
//! let config = Config::default();
//! let registry = config.registry();
//! let mapper = config.mapper();
//!
//! let pdf = std::fs::read("form.pdf")?;
//! let names = forms::field_names(&pdf)?;
//! let actor = registry.resolve(Module::parse("primary")?);
//! let mapping = mapper.build_mapping(&names, &config.organization, actor);
//! let filled = forms::fill(&pdf, &mapping)?;
//! std::fs::write("filled.pdf", filled)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod forms;
pub mod mapping;
pub mod module;
pub mod registry;

#[cfg(any(test, feature = "test-support"))]
pub mod fixtures;

pub use config::Config;
pub use error::{FormError, Result};
pub use forms::{FieldKind, FillOutcome, FillReport, FormField};
pub use mapping::{label_mapping, FieldMapper, FieldMapping, MappingRule, ValueSource};
pub use module::Module;
pub use registry::{Actor, ActorRegistry, Organization};

/// Supported upload extension (compared case-insensitively)
pub const PDF_EXTENSION: &str = "pdf";

/// Reject uploads whose file name does not end in `.pdf`
pub fn ensure_pdf_filename(filename: &str) -> Result<()> {
    let supported = std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PDF_EXTENSION));
    if supported {
        Ok(())
    } else {
        Err(FormError::UnsupportedFormat(filename.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extension_check() {
        assert!(ensure_pdf_filename("form.pdf").is_ok());
        assert!(ensure_pdf_filename("FORM.PDF").is_ok());
        assert!(ensure_pdf_filename("archive.tar.pdf").is_ok());

        for name in ["form.docx", "form", "pdf", "form.pdf.txt", ""] {
            match ensure_pdf_filename(name) {
                Err(FormError::UnsupportedFormat(n)) => assert_eq!(n, name),
                other => panic!("Expected UnsupportedFormat for {name:?}, got {other:?}"),
            }
        }
    }
}
