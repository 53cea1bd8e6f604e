use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("Invalid module '{0}': module must be one of PRIMARY, SECONDARY")]
    InvalidModule(String),

    #[error("Uploaded file is empty")]
    EmptyUpload,

    #[error("Unsupported format: '{0}' (only .pdf documents are supported)")]
    UnsupportedFormat(String),

    #[error("Document is not fillable: no form fields found")]
    UnfillableDocument,

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FormError>;

impl From<lopdf::Error> for FormError {
    fn from(err: lopdf::Error) -> Self {
        FormError::MalformedDocument(err.to_string())
    }
}

impl From<toml::de::Error> for FormError {
    fn from(err: toml::de::Error) -> Self {
        FormError::Config(err.to_string())
    }
}

impl FormError {
    /// Stable machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            FormError::InvalidModule(_) => "INVALID_MODULE",
            FormError::EmptyUpload => "EMPTY_UPLOAD",
            FormError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            FormError::UnfillableDocument => "UNFILLABLE_DOCUMENT",
            FormError::MalformedDocument(_) => "MALFORMED_DOCUMENT",
            FormError::Config(_) => "CONFIG_ERROR",
            FormError::Io(_) => "IO_ERROR",
        }
    }

    /// Whether the error was caused by the caller's input rather than the host
    pub fn is_client_error(&self) -> bool {
        !matches!(self, FormError::Config(_) | FormError::Io(_))
    }
}
