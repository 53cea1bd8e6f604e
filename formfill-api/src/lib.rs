//! # formfill-api
//!
//! REST API server for formfill-core
//!

mod api;
mod error;
pub mod upload;

pub use api::{
    app, app_with_state, debug_label, generate, health_check, list_fields, AppState,
    FieldsResponse,
};
pub use error::{AppError, ErrorResponse};
