//! AcroForm traversal and field writes on top of `lopdf`

use super::text::{decode_text_string, encode_text_string, object_to_text};
use super::{FieldKind, FillReport, FormField};
use crate::error::{FormError, Result};
use crate::mapping::FieldMapping;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;

/// Field trees deeper than this are treated as malformed and cut off
const MAX_FIELD_DEPTH: usize = 32;

/// Where the `/AcroForm` dictionary lives
#[derive(Debug, Clone, Copy)]
enum AcroFormLocation {
    Indirect(ObjectId),
    InCatalog(ObjectId),
}

/// A terminal field as found in the tree
#[derive(Debug, Clone)]
struct FieldNode {
    name: String,
    kind: FieldKind,
    value: Option<String>,
    id: Option<ObjectId>,
    widgets: Vec<ObjectId>,
}

/// A parsed document together with its flattened field list
pub struct PdfForm {
    document: Document,
    acroform: Option<AcroFormLocation>,
    nodes: Vec<FieldNode>,
}

impl PdfForm {
    /// Parse `bytes` and collect every terminal form field
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let document = Document::load_mem(bytes)?;
        let acroform = locate_acroform(&document);

        let mut nodes = Vec::new();
        if let Some(location) = acroform {
            if let Some(fields) = acroform_dict(&document, location).and_then(|d| d.get(b"Fields").ok()) {
                let mut visited = HashSet::new();
                for entry in resolve_array(&document, fields) {
                    walk_field(&document, entry, None, FieldKind::Unknown, 0, &mut visited, &mut nodes);
                }
            }
        }

        tracing::debug!(fields = nodes.len(), "parsed form fields");

        Ok(Self {
            document,
            acroform,
            nodes,
        })
    }

    pub fn has_fields(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Distinct fields in discovery order
    pub fn fields(&self) -> Vec<FormField> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .filter(|node| seen.insert(node.name.as_str()))
            .map(|node| FormField {
                name: node.name.clone(),
                kind: node.kind,
                value: node.value.clone(),
            })
            .collect()
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields().into_iter().map(|f| f.name).collect()
    }

    /// Write every mapped value into the document
    pub fn apply(&mut self, mapping: &FieldMapping) -> Result<FillReport> {
        if !self.has_fields() {
            return Err(FormError::UnfillableDocument);
        }

        let mut report = FillReport::default();
        for node in &self.nodes {
            let Some(value) = mapping.get(&node.name) else {
                continue;
            };
            let Some(id) = node.id else {
                tracing::warn!(field = %node.name, "field is a direct object; skipping");
                push_once(&mut report.skipped, &node.name);
                continue;
            };
            if node.kind == FieldKind::Signature {
                tracing::warn!(field = %node.name, "refusing to write into a signature field");
                push_once(&mut report.skipped, &node.name);
                continue;
            }

            write_value(&mut self.document, id, node, value)?;
            tracing::debug!(field = %node.name, kind = ?node.kind, "field written");
            push_once(&mut report.filled, &node.name);
        }

        let known: HashSet<&str> = self.nodes.iter().map(|n| n.name.as_str()).collect();
        report.unmatched = mapping
            .keys()
            .filter(|key| !known.contains(key))
            .map(str::to_string)
            .collect();

        if let Err(e) = self.set_need_appearances() {
            tracing::warn!(error = %e, "could not set NeedAppearances");
        }

        Ok(report)
    }

    /// Ask viewers to regenerate field appearances from the new values
    fn set_need_appearances(&mut self) -> Result<()> {
        let location = self
            .acroform
            .ok_or_else(|| FormError::MalformedDocument("document has no AcroForm".to_string()))?;
        let dict = match location {
            AcroFormLocation::Indirect(id) => self.document.get_object_mut(id)?.as_dict_mut()?,
            AcroFormLocation::InCatalog(catalog_id) => self
                .document
                .get_object_mut(catalog_id)?
                .as_dict_mut()?
                .get_mut(b"AcroForm")?
                .as_dict_mut()?,
        };
        dict.set("NeedAppearances", Object::Boolean(true));
        Ok(())
    }

    /// Serialize the (possibly modified) document
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.document
            .save_to(&mut output)
            .map_err(|e| FormError::MalformedDocument(format!("failed to serialize: {e}")))?;
        Ok(output)
    }
}

fn push_once(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

fn catalog_id(document: &Document) -> Option<ObjectId> {
    match document.trailer.get(b"Root").ok()? {
        Object::Reference(id) => Some(*id),
        _ => None,
    }
}

fn locate_acroform(document: &Document) -> Option<AcroFormLocation> {
    let catalog_id = catalog_id(document)?;
    let catalog = document.get_object(catalog_id).ok()?.as_dict().ok()?;
    match catalog.get(b"AcroForm").ok()? {
        Object::Reference(id) => Some(AcroFormLocation::Indirect(*id)),
        Object::Dictionary(_) => Some(AcroFormLocation::InCatalog(catalog_id)),
        _ => None,
    }
}

fn acroform_dict(document: &Document, location: AcroFormLocation) -> Option<&Dictionary> {
    match location {
        AcroFormLocation::Indirect(id) => document.get_object(id).ok()?.as_dict().ok(),
        AcroFormLocation::InCatalog(catalog_id) => document
            .get_object(catalog_id)
            .ok()?
            .as_dict()
            .ok()?
            .get(b"AcroForm")
            .ok()?
            .as_dict()
            .ok(),
    }
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

fn resolve_array<'a>(document: &'a Document, object: &'a Object) -> &'a [Object] {
    match resolve(document, object) {
        Some(Object::Array(items)) => items,
        _ => &[],
    }
}

fn partial_name(dict: &Dictionary) -> Option<String> {
    match dict.get(b"T").ok()? {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        _ => None,
    }
}

fn field_kind(dict: &Dictionary) -> Option<FieldKind> {
    match dict.get(b"FT").ok()? {
        Object::Name(name) => Some(FieldKind::from_pdf_name(name)),
        _ => None,
    }
}

fn is_widget(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name.as_slice() == b"Widget")
}

fn walk_field(
    document: &Document,
    entry: &Object,
    parent_name: Option<&str>,
    inherited_kind: FieldKind,
    depth: usize,
    visited: &mut HashSet<ObjectId>,
    out: &mut Vec<FieldNode>,
) {
    if depth > MAX_FIELD_DEPTH {
        tracing::warn!(depth, "form field tree too deep; truncating");
        return;
    }

    let id = match entry {
        Object::Reference(id) => {
            if !visited.insert(*id) {
                return;
            }
            Some(*id)
        }
        _ => None,
    };
    let Some(Object::Dictionary(dict)) = resolve(document, entry) else {
        return;
    };

    // an untitled root only groups its kids; they start a fresh name
    let name = match (parent_name, partial_name(dict)) {
        (Some(parent), Some(partial)) => Some(format!("{parent}.{partial}")),
        (None, Some(partial)) => Some(partial),
        (Some(parent), None) => Some(parent.to_string()),
        (None, None) => None,
    };
    let kind = field_kind(dict).unwrap_or(inherited_kind);

    let kids = dict
        .get(b"Kids")
        .map(|kids| resolve_array(document, kids))
        .unwrap_or(&[]);

    let mut field_kids = Vec::new();
    let mut widgets = Vec::new();
    for kid in kids {
        let Some(Object::Dictionary(kid_dict)) = resolve(document, kid) else {
            continue;
        };
        if kid_dict.has(b"T") {
            field_kids.push(kid);
        } else if let Object::Reference(kid_id) = kid {
            widgets.push(*kid_id);
        }
    }

    if !field_kids.is_empty() {
        for kid in field_kids {
            walk_field(document, kid, name.as_deref(), kind, depth + 1, visited, out);
        }
        return;
    }

    let Some(name) = name else {
        tracing::debug!("untitled form field without named kids; ignoring");
        return;
    };

    if is_widget(dict) {
        if let Some(id) = id {
            widgets.push(id);
        }
    }

    let value = dict
        .get(b"V")
        .ok()
        .and_then(|v| resolve(document, v))
        .and_then(object_to_text);

    out.push(FieldNode {
        name,
        kind,
        value,
        id,
        widgets,
    });
}

/// Whether the widget's normal appearance defines `state`; widgets without
/// appearance streams accept any state.
fn widget_has_state(document: &Document, widget: ObjectId, state: &[u8]) -> bool {
    let Some(dict) = document.get_object(widget).ok().and_then(|o| o.as_dict().ok()) else {
        return false;
    };
    let Some(appearance) = dict.get(b"AP").ok().and_then(|ap| resolve(document, ap)) else {
        return true;
    };
    let normal = appearance
        .as_dict()
        .ok()
        .and_then(|ap| ap.get(b"N").ok())
        .and_then(|n| resolve(document, n));
    match normal {
        Some(Object::Dictionary(states)) => states.has(state),
        _ => true,
    }
}

fn write_value(document: &mut Document, id: ObjectId, node: &FieldNode, value: &str) -> Result<()> {
    match node.kind {
        FieldKind::Button => {
            let state = Object::Name(value.as_bytes().to_vec());
            document.get_object_mut(id)?.as_dict_mut()?.set("V", state.clone());
            for widget in &node.widgets {
                // radio kids without this state switch off
                let appearance = if widget_has_state(document, *widget, value.as_bytes()) {
                    state.clone()
                } else {
                    Object::Name(b"Off".to_vec())
                };
                document
                    .get_object_mut(*widget)?
                    .as_dict_mut()?
                    .set("AS", appearance);
            }
        }
        _ => {
            document
                .get_object_mut(id)?
                .as_dict_mut()?
                .set("V", encode_text_string(value));
        }
    }
    Ok(())
}
