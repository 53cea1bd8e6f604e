//! Organization data and the per-module representative registry

use crate::error::Result;
use crate::module::Module;
use serde::{Deserialize, Serialize};

/// Legal representative whose contact data is written into a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub display_name: String,
    pub email: String,
    pub phone: String,
}

impl Actor {
    pub fn new(
        display_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}

/// The organization submitting every form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    pub tax_id: String,
    pub email: String,
    pub phone: String,
}

impl Default for Organization {
    fn default() -> Self {
        Self {
            name: "Andes SCD SpA".to_string(),
            tax_id: "76.543.210-K".to_string(),
            email: "contacto@andesscd.cl".to_string(),
            phone: "+56 2 2940 1100".to_string(),
        }
    }
}

/// Immutable module → representative table
///
/// Holds exactly one [`Actor`] per [`Module`], so `resolve` cannot fail once
/// the module has been parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorRegistry {
    primary: Actor,
    secondary: Actor,
}

impl ActorRegistry {
    pub fn new(primary: Actor, secondary: Actor) -> Self {
        Self { primary, secondary }
    }

    /// Built-in representatives
    pub fn builtin() -> Self {
        Self::new(
            Actor::new(
                "María José Fuentes Rojas",
                "mfuentes@andesscd.cl",
                "+56 9 8765 4321",
            ),
            Actor::new(
                "Rodrigo Andrés Salinas Vera",
                "rsalinas@andesscd.cl",
                "+56 9 7654 3210",
            ),
        )
    }

    pub fn resolve(&self, module: Module) -> &Actor {
        match module {
            Module::Primary => &self.primary,
            Module::Secondary => &self.secondary,
        }
    }

    /// Parse `module` and resolve it in one step
    pub fn resolve_str(&self, module: &str) -> Result<&Actor> {
        Module::parse(module).map(|m| self.resolve(m))
    }
}

impl Default for ActorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
