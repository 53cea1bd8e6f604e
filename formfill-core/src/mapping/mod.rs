//! Field name → value mapping
//!
//! A [`FieldMapper`] runs an ordered list of [`MappingRule`]s over the field
//! names discovered in a document. The first rule to assign a field wins;
//! fields no rule claims stay out of the mapping and are left untouched by
//! the filler.

mod rules;

pub use rules::{PositionalRule, PrefixFallbackRule, SemanticRule, ValueSource};

use crate::registry::{Actor, Organization};
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;

/// A single `(field name, value)` pair proposed by a rule
pub type Assignment = (String, String);

/// Data a rule may draw values from
#[derive(Debug, Clone, Copy)]
pub struct MappingContext<'a> {
    pub organization: &'a Organization,
    pub actor: &'a Actor,
}

impl<'a> MappingContext<'a> {
    pub fn new(organization: &'a Organization, actor: &'a Actor) -> Self {
        Self {
            organization,
            actor,
        }
    }
}

/// One independent matching strategy
pub trait MappingRule: fmt::Debug + Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Propose assignments for any of `field_names` this rule recognizes
    fn assign(&self, field_names: &[String], ctx: &MappingContext<'_>) -> Vec<Assignment>;
}

/// Insertion-ordered field → value map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    entries: IndexMap<String, String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    /// Set `field`, replacing any previous value in place
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(field.into(), value.into());
    }

    /// Set `field` only if it has no value yet. Returns whether it was inserted.
    pub fn insert_if_absent(&mut self, field: impl Into<String>, value: impl Into<String>) -> bool {
        match self.entries.entry(field.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value.into());
                true
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMapping {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut mapping = FieldMapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

impl IntoIterator for FieldMapping {
    type Item = Assignment;
    type IntoIter = indexmap::map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Ordered rule pipeline
#[derive(Debug)]
pub struct FieldMapper {
    rules: Vec<Box<dyn MappingRule>>,
}

impl FieldMapper {
    /// A mapper with no rules; every document maps to an empty mapping
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule. Rules added later have lower priority.
    pub fn with_rule(mut self, rule: impl MappingRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn build_mapping(
        &self,
        field_names: &[String],
        organization: &Organization,
        actor: &Actor,
    ) -> FieldMapping {
        let ctx = MappingContext::new(organization, actor);
        let present: HashSet<&str> = field_names.iter().map(String::as_str).collect();
        let mut mapping = FieldMapping::new();

        for rule in &self.rules {
            let mut claimed = 0usize;
            for (field, value) in rule.assign(field_names, &ctx) {
                if !present.contains(field.as_str()) {
                    continue;
                }
                if mapping.insert_if_absent(field, value) {
                    claimed += 1;
                }
            }
            tracing::trace!(rule = rule.name(), claimed, "mapping rule applied");
        }

        mapping
    }
}

impl Default for FieldMapper {
    /// Semantic names first, then the numbered `Text<n>` convention
    fn default() -> Self {
        FieldMapper::empty()
            .with_rule(SemanticRule::default())
            .with_rule(PositionalRule::default())
    }
}

/// Map every field to its own name, cut to `max_len` characters when set
///
/// Used to stamp a document so an operator can read field names off the
/// rendered page.
pub fn label_mapping(field_names: &[String], max_len: Option<usize>) -> FieldMapping {
    field_names
        .iter()
        .map(|name| {
            let label = match max_len {
                Some(limit) => name.chars().take(limit).collect(),
                None => name.clone(),
            };
            (name.clone(), label)
        })
        .collect()
}
