//! Fillable PDF builder for tests
//!
//! Produces small single-page documents with an AcroForm so tests never
//! depend on checked-in binaries.

use lopdf::{dictionary, Document, Object, ObjectId, Stream};

#[derive(Debug, Clone)]
enum PlannedField {
    Text {
        name: String,
        value: Option<String>,
    },
    Checkbox {
        name: String,
    },
    Group {
        name: String,
        children: Vec<String>,
    },
    UntitledRoot {
        children: Vec<String>,
    },
    RadioGroup {
        name: String,
        states: Vec<String>,
    },
    MultiWidgetText {
        name: String,
        widgets: usize,
    },
    Signature {
        name: String,
    },
}

/// `/Ff` bit marking a button field as a radio group
const RADIO_FLAG: i64 = 1 << 15;

/// Builder for fillable test documents
#[derive(Debug, Clone)]
pub struct FormPdfBuilder {
    fields: Vec<PlannedField>,
    with_acroform: bool,
    inline_acroform: bool,
}

impl Default for FormPdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormPdfBuilder {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            with_acroform: true,
            inline_acroform: false,
        }
    }

    /// Empty text field
    pub fn text_field(mut self, name: &str) -> Self {
        self.fields.push(PlannedField::Text {
            name: name.to_string(),
            value: None,
        });
        self
    }

    /// Text field with an existing value
    pub fn text_field_with_value(mut self, name: &str, value: &str) -> Self {
        self.fields.push(PlannedField::Text {
            name: name.to_string(),
            value: Some(value.to_string()),
        });
        self
    }

    /// Checkbox with `Yes` / `Off` appearance states, initially off
    pub fn checkbox(mut self, name: &str) -> Self {
        self.fields.push(PlannedField::Checkbox {
            name: name.to_string(),
        });
        self
    }

    /// Non-terminal field `name` with one text child per entry
    pub fn group(mut self, name: &str, children: &[&str]) -> Self {
        self.fields.push(PlannedField::Group {
            name: name.to_string(),
            children: children.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    /// Root entry without `/T` whose kids are complete text fields
    pub fn untitled_root(mut self, children: &[&str]) -> Self {
        self.fields.push(PlannedField::UntitledRoot {
            children: children.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    /// Radio button field with one kid widget per export state, all off
    pub fn radio_group(mut self, name: &str, states: &[&str]) -> Self {
        self.fields.push(PlannedField::RadioGroup {
            name: name.to_string(),
            states: states.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Text field shown in `widgets` places, each a separate kid annotation
    pub fn text_field_with_widgets(mut self, name: &str, widgets: usize) -> Self {
        self.fields.push(PlannedField::MultiWidgetText {
            name: name.to_string(),
            widgets,
        });
        self
    }

    /// Unsigned signature field
    pub fn signature_field(mut self, name: &str) -> Self {
        self.fields.push(PlannedField::Signature {
            name: name.to_string(),
        });
        self
    }

    /// Store the AcroForm dictionary directly in the catalog
    pub fn inline_acroform(mut self) -> Self {
        self.inline_acroform = true;
        self
    }

    /// Leave the AcroForm out entirely, like a scanned or flattened document
    pub fn without_acroform(mut self) -> Self {
        self.with_acroform = false;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let page_id = doc.new_object_id();

        let mut field_refs = Vec::new();
        let mut annots = Vec::new();
        let mut y = 760;

        for planned in &self.fields {
            match planned {
                PlannedField::Text { name, value } => {
                    let mut field = widget(name, "Tx", page_id, y);
                    if let Some(value) = value {
                        field.set("V", Object::string_literal(value.as_str()));
                    }
                    let id = doc.add_object(field);
                    field_refs.push(Object::Reference(id));
                    annots.push(Object::Reference(id));
                }
                PlannedField::Checkbox { name } => {
                    let on = doc.add_object(Stream::new(lopdf::Dictionary::new(), b"0 0 m".to_vec()));
                    let off = doc.add_object(Stream::new(lopdf::Dictionary::new(), Vec::new()));
                    let mut field = widget(name, "Btn", page_id, y);
                    field.set("V", Object::Name(b"Off".to_vec()));
                    field.set("AS", Object::Name(b"Off".to_vec()));
                    field.set(
                        "AP",
                        dictionary! {
                            "N" => dictionary! {
                                "Yes" => Object::Reference(on),
                                "Off" => Object::Reference(off),
                            },
                        },
                    );
                    let id = doc.add_object(field);
                    field_refs.push(Object::Reference(id));
                    annots.push(Object::Reference(id));
                }
                PlannedField::Group { name, children } => {
                    let parent_id = doc.new_object_id();
                    let mut kids = Vec::new();
                    for child in children {
                        y -= 30;
                        let mut kid = widget(child, "Tx", page_id, y);
                        kid.remove(b"FT");
                        kid.set("Parent", Object::Reference(parent_id));
                        let kid_id = doc.add_object(kid);
                        kids.push(Object::Reference(kid_id));
                        annots.push(Object::Reference(kid_id));
                    }
                    doc.objects.insert(
                        parent_id,
                        Object::Dictionary(dictionary! {
                            "FT" => "Tx",
                            "T" => Object::string_literal(name.as_str()),
                            "Kids" => kids,
                        }),
                    );
                    field_refs.push(Object::Reference(parent_id));
                }
                PlannedField::UntitledRoot { children } => {
                    let root_id = doc.new_object_id();
                    let mut kids = Vec::new();
                    for child in children {
                        y -= 30;
                        let mut kid = widget(child, "Tx", page_id, y);
                        kid.set("Parent", Object::Reference(root_id));
                        let kid_id = doc.add_object(kid);
                        kids.push(Object::Reference(kid_id));
                        annots.push(Object::Reference(kid_id));
                    }
                    doc.objects
                        .insert(root_id, Object::Dictionary(dictionary! { "Kids" => kids }));
                    field_refs.push(Object::Reference(root_id));
                }
                PlannedField::RadioGroup { name, states } => {
                    let parent_id = doc.new_object_id();
                    let off = doc.add_object(Stream::new(lopdf::Dictionary::new(), Vec::new()));
                    let mut kids = Vec::new();
                    for state in states {
                        let on = doc.add_object(Stream::new(lopdf::Dictionary::new(), b"0 0 m".to_vec()));
                        let mut normal = lopdf::Dictionary::new();
                        normal.set(state.as_str(), Object::Reference(on));
                        normal.set("Off", Object::Reference(off));
                        let kid = dictionary! {
                            "Type" => "Annot",
                            "Subtype" => "Widget",
                            "Parent" => Object::Reference(parent_id),
                            "P" => Object::Reference(page_id),
                            "Rect" => rect(y),
                            "AS" => "Off",
                            "AP" => dictionary! { "N" => normal },
                        };
                        let kid_id = doc.add_object(kid);
                        kids.push(Object::Reference(kid_id));
                        annots.push(Object::Reference(kid_id));
                        y -= 30;
                    }
                    doc.objects.insert(
                        parent_id,
                        Object::Dictionary(dictionary! {
                            "FT" => "Btn",
                            "Ff" => RADIO_FLAG,
                            "T" => Object::string_literal(name.as_str()),
                            "V" => "Off",
                            "Kids" => kids,
                        }),
                    );
                    field_refs.push(Object::Reference(parent_id));
                }
                PlannedField::MultiWidgetText { name, widgets } => {
                    let parent_id = doc.new_object_id();
                    let mut kids = Vec::new();
                    for _ in 0..*widgets {
                        let kid = dictionary! {
                            "Type" => "Annot",
                            "Subtype" => "Widget",
                            "Parent" => Object::Reference(parent_id),
                            "P" => Object::Reference(page_id),
                            "Rect" => rect(y),
                        };
                        let kid_id = doc.add_object(kid);
                        kids.push(Object::Reference(kid_id));
                        annots.push(Object::Reference(kid_id));
                        y -= 30;
                    }
                    doc.objects.insert(
                        parent_id,
                        Object::Dictionary(dictionary! {
                            "FT" => "Tx",
                            "T" => Object::string_literal(name.as_str()),
                            "Kids" => kids,
                        }),
                    );
                    field_refs.push(Object::Reference(parent_id));
                }
                PlannedField::Signature { name } => {
                    let id = doc.add_object(widget(name, "Sig", page_id, y));
                    field_refs.push(Object::Reference(id));
                    annots.push(Object::Reference(id));
                }
            }
            y -= 30;
        }

        doc.objects.insert(
            page_id,
            Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Annots" => annots,
            }),
        );
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        };
        if self.with_acroform {
            let acroform = dictionary! {
                "Fields" => field_refs,
                "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
            };
            if self.inline_acroform {
                catalog.set("AcroForm", acroform);
            } else {
                let acroform_id = doc.add_object(acroform);
                catalog.set("AcroForm", Object::Reference(acroform_id));
            }
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .expect("writing an in-memory PDF cannot fail");
        buffer
    }
}

fn widget(name: &str, kind: &str, page_id: ObjectId, y: i64) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => kind,
        "T" => Object::string_literal(name),
        "P" => Object::Reference(page_id),
        "Rect" => rect(y),
    }
}

fn rect(y: i64) -> Vec<Object> {
    vec![
        Object::Integer(72),
        Object::Integer(y),
        Object::Integer(300),
        Object::Integer(y + 20),
    ]
}
