//! Built-in matching rules

use super::{Assignment, MappingContext, MappingRule};
use serde::{Deserialize, Serialize};

/// Where a rule takes the value it writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    OrganizationName,
    OrganizationTaxId,
    OrganizationEmail,
    OrganizationPhone,
    ActorName,
    ActorEmail,
    ActorPhone,
    Literal(String),
}

impl ValueSource {
    pub fn resolve(&self, ctx: &MappingContext<'_>) -> String {
        match self {
            ValueSource::OrganizationName => ctx.organization.name.clone(),
            ValueSource::OrganizationTaxId => ctx.organization.tax_id.clone(),
            ValueSource::OrganizationEmail => ctx.organization.email.clone(),
            ValueSource::OrganizationPhone => ctx.organization.phone.clone(),
            ValueSource::ActorName => ctx.actor.display_name.clone(),
            ValueSource::ActorEmail => ctx.actor.email.clone(),
            ValueSource::ActorPhone => ctx.actor.phone.clone(),
            ValueSource::Literal(value) => value.clone(),
        }
    }
}

/// Fields with well-known semantic names, e.g. `NOMBRE_EMPRESA`
///
/// Names compare case-insensitively after trimming; the assignment keeps the
/// spelling found in the document.
#[derive(Debug, Clone)]
pub struct SemanticRule {
    table: Vec<(String, ValueSource)>,
}

impl SemanticRule {
    pub fn new<I, S>(table: I) -> Self
    where
        I: IntoIterator<Item = (S, ValueSource)>,
        S: Into<String>,
    {
        Self {
            table: table
                .into_iter()
                .map(|(name, source)| (name.into().trim().to_string(), source))
                .collect(),
        }
    }

    fn lookup(&self, field_name: &str) -> Option<&ValueSource> {
        let wanted = field_name.trim();
        self.table
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|(_, source)| source)
    }
}

impl Default for SemanticRule {
    fn default() -> Self {
        Self::new([
            ("NOMBRE_EMPRESA", ValueSource::OrganizationName),
            ("RUT_EMPRESA", ValueSource::OrganizationTaxId),
            ("EMAIL_EMPRESA", ValueSource::OrganizationEmail),
            ("TELEFONO_EMPRESA", ValueSource::OrganizationPhone),
            ("NOMBRE_REPRESENTANTE", ValueSource::ActorName),
            ("EMAIL_REPRESENTANTE", ValueSource::ActorEmail),
            ("TELEFONO_REPRESENTANTE", ValueSource::ActorPhone),
        ])
    }
}

impl MappingRule for SemanticRule {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn assign(&self, field_names: &[String], ctx: &MappingContext<'_>) -> Vec<Assignment> {
        field_names
            .iter()
            .filter_map(|field| {
                self.lookup(field)
                    .map(|source| (field.clone(), source.resolve(ctx)))
            })
            .collect()
    }
}

/// Generic numbered fields (`Text10`, `Text11`, ...) filled in a fixed order
///
/// `<prefix><start>` takes `values[0]`, `<prefix><start + 1>` takes
/// `values[1]`, and so on. Numbers outside the list are ignored.
#[derive(Debug, Clone)]
pub struct PositionalRule {
    prefix: String,
    start: u32,
    values: Vec<ValueSource>,
}

impl PositionalRule {
    pub fn new(prefix: impl Into<String>, start: u32, values: Vec<ValueSource>) -> Self {
        Self {
            prefix: prefix.into(),
            start,
            values,
        }
    }

    fn slot(&self, field_name: &str) -> Option<usize> {
        let digits = field_name.strip_prefix(self.prefix.as_str())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let number: u32 = digits.parse().ok()?;
        let offset = number.checked_sub(self.start)? as usize;
        (offset < self.values.len()).then_some(offset)
    }
}

impl Default for PositionalRule {
    fn default() -> Self {
        Self::new(
            "Text",
            10,
            vec![
                ValueSource::ActorName,
                ValueSource::ActorEmail,
                ValueSource::ActorPhone,
                ValueSource::OrganizationName,
                ValueSource::OrganizationTaxId,
            ],
        )
    }
}

impl MappingRule for PositionalRule {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn assign(&self, field_names: &[String], ctx: &MappingContext<'_>) -> Vec<Assignment> {
        field_names
            .iter()
            .filter_map(|field| {
                self.slot(field)
                    .map(|slot| (field.clone(), self.values[slot].resolve(ctx)))
            })
            .collect()
    }
}

/// Catch-all for every field starting with a generic prefix
///
/// Placeholder behaviour for documents whose author never named the fields.
/// Only installed when configured.
#[derive(Debug, Clone)]
pub struct PrefixFallbackRule {
    prefix: String,
    value: ValueSource,
}

impl PrefixFallbackRule {
    pub fn new(prefix: impl Into<String>, value: ValueSource) -> Self {
        Self {
            prefix: prefix.into(),
            value,
        }
    }
}

impl MappingRule for PrefixFallbackRule {
    fn name(&self) -> &'static str {
        "prefix_fallback"
    }

    fn assign(&self, field_names: &[String], ctx: &MappingContext<'_>) -> Vec<Assignment> {
        let value = self.value.resolve(ctx);
        field_names
            .iter()
            .filter(|field| field.starts_with(self.prefix.as_str()))
            .map(|field| (field.clone(), value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Actor, Organization};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn fixture() -> (Organization, Actor) {
        (
            Organization::default(),
            Actor::new("Ana Pérez", "ana@example.com", "+56 9 1111 2222"),
        )
    }

    #[test]
    fn test_semantic_rule_matches_case_insensitively() {
        let (org, actor) = fixture();
        let ctx = MappingContext::new(&org, &actor);
        let rule = SemanticRule::default();

        let assigned = rule.assign(&names(&["nombre_empresa", "Other", " RUT_EMPRESA "]), &ctx);
        assert_eq!(
            assigned,
            vec![
                ("nombre_empresa".to_string(), org.name.clone()),
                (" RUT_EMPRESA ".to_string(), org.tax_id.clone()),
            ]
        );
    }

    #[test]
    fn test_positional_rule_slots() {
        let (org, actor) = fixture();
        let ctx = MappingContext::new(&org, &actor);
        let rule = PositionalRule::default();

        let assigned = rule.assign(
            &names(&["Text9", "Text10", "Text12", "Text15", "Text1x", "Text", "Texto10"]),
            &ctx,
        );
        assert_eq!(
            assigned,
            vec![
                ("Text10".to_string(), actor.display_name.clone()),
                ("Text12".to_string(), actor.phone.clone()),
            ]
        );
    }

    #[test]
    fn test_positional_rule_custom_prefix() {
        let (org, actor) = fixture();
        let ctx = MappingContext::new(&org, &actor);
        let rule = PositionalRule::new(
            "Campo",
            1,
            vec![ValueSource::Literal("X".to_string()), ValueSource::OrganizationEmail],
        );

        let assigned = rule.assign(&names(&["Campo2", "Campo1"]), &ctx);
        assert_eq!(
            assigned,
            vec![
                ("Campo2".to_string(), org.email.clone()),
                ("Campo1".to_string(), "X".to_string()),
            ]
        );
    }

    #[test]
    fn test_prefix_fallback_rule() {
        let (org, actor) = fixture();
        let ctx = MappingContext::new(&org, &actor);
        let rule = PrefixFallbackRule::new("Text", ValueSource::OrganizationName);

        let assigned = rule.assign(&names(&["Text3", "Check1", "Text44"]), &ctx);
        assert_eq!(assigned.len(), 2);
        assert!(assigned.iter().all(|(_, v)| *v == org.name));
    }

    #[test]
    fn test_value_source_deserializes_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            values: Vec<ValueSource>,
        }

        let parsed: Wrapper =
            toml::from_str("values = [\"actor_name\", { literal = \"N/A\" }]").unwrap();
        assert_eq!(
            parsed.values,
            vec![ValueSource::ActorName, ValueSource::Literal("N/A".to_string())]
        );
    }
}
