//! Configuration management
//!
//! Everything is optional: a missing file or section falls back to the
//! built-in organization data and mapping rules.

use crate::error::{FormError, Result};
use crate::mapping::{FieldMapper, PositionalRule, PrefixFallbackRule, SemanticRule, ValueSource};
use crate::registry::{Actor, ActorRegistry, Organization};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::path::Path;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "FORMFILL_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub organization: Organization,
    pub actors: ActorsConfig,
    pub mapping: MappingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActorsConfig {
    pub primary: Actor,
    pub secondary: Actor,
}

impl Default for ActorsConfig {
    fn default() -> Self {
        let builtin = ActorRegistry::builtin();
        Self {
            primary: builtin.resolve(crate::Module::Primary).clone(),
            secondary: builtin.resolve(crate::Module::Secondary).clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionalConfig {
    pub prefix: String,
    pub start: u32,
    pub values: Vec<ValueSource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FallbackConfig {
    pub prefix: String,
    pub value: ValueSource,
}

/// Rule tables; `None` keeps the built-in table for that rule
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Character limit for labels stamped by the debug endpoint
    pub label_max_len: Option<usize>,
    pub semantic: Option<BTreeMap<String, ValueSource>>,
    pub positional: Option<PositionalConfig>,
    /// Generic-prefix catch-all, disabled unless configured
    pub fallback: Option<FallbackConfig>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            label_max_len: Some(20),
            semantic: None,
            positional: None,
            fallback: None,
        }
    }
}

impl MappingConfig {
    /// Build the rule pipeline: semantic, positional, then the optional fallback
    pub fn build_mapper(&self) -> FieldMapper {
        let semantic = match &self.semantic {
            Some(table) => SemanticRule::new(table.clone()),
            None => SemanticRule::default(),
        };
        let positional = match &self.positional {
            Some(p) => PositionalRule::new(p.prefix.clone(), p.start, p.values.clone()),
            None => PositionalRule::default(),
        };

        let mapper = FieldMapper::empty().with_rule(semantic).with_rule(positional);
        match &self.fallback {
            Some(f) => mapper.with_rule(PrefixFallbackRule::new(f.prefix.clone(), f.value.clone())),
            None => mapper,
        }
    }
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            FormError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&source)
    }

    /// Defaults, then the file named by `path` or `FORMFILL_CONFIG`, then
    /// `FORMFILL_HOST` / `FORMFILL_PORT`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match env::var(CONFIG_ENV) {
                Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
                _ => Self::default(),
            },
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = env::var("FORMFILL_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("FORMFILL_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| FormError::Config(format!("FORMFILL_PORT is not a port: {port}")))?;
        }
        Ok(())
    }

    pub fn registry(&self) -> ActorRegistry {
        ActorRegistry::new(self.actors.primary.clone(), self.actors.secondary.clone())
    }

    pub fn mapper(&self) -> FieldMapper {
        self.mapping.build_mapper()
    }
}
