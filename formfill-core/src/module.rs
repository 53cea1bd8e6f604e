//! Module selector
//!
//! A module picks which representative signs a generated form. Only two
//! modules exist; anything else is rejected before it reaches the mapper.

use crate::error::{FormError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Business unit a form is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Module {
    Primary,
    Secondary,
}

impl Module {
    /// Every recognized module, in declaration order
    pub const ALL: [Module; 2] = [Module::Primary, Module::Secondary];

    /// Wire name used by the HTTP and CLI surfaces
    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Primary => "PRIMARY",
            Module::Secondary => "SECONDARY",
        }
    }

    /// Parse a module name, ignoring case and surrounding whitespace
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        Module::ALL
            .into_iter()
            .find(|module| module.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| FormError::InvalidModule(trimmed.to_string()))
    }
}

impl FromStr for Module {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self> {
        Module::parse(s)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
