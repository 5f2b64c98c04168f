//! # Component Registry
//!
//! Read-only catalog of placeable components. The drag reconciler asks it
//! whether a component accepts children; mutations use it to seed and check
//! props.
//!
//! Prop fields carry a [`FieldKind`] tag that property panels dispatch on.

use crate::block::Props;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Lookup interface the editor core depends on
pub trait ComponentRegistry: Send + Sync {
    fn entry(&self, name: &str) -> Option<&ComponentEntry>;

    /// Unknown components never accept children
    fn supports_children(&self, name: &str) -> bool {
        self.entry(name).map(|e| e.supports_children).unwrap_or(false)
    }

    fn names(&self) -> Vec<&str>;
}

/// Catalog entry for one component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentEntry {
    pub name: String,
    pub label: String,
    pub category: String,
    #[serde(default)]
    pub supports_children: bool,
    #[serde(default)]
    pub fields: Vec<PropField>,
}

/// Editable prop description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub required: bool,
}

/// Form control kind for a prop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text {
        #[serde(default)]
        max_length: Option<usize>,
    },
    Textarea,
    RichText,
    Number {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    Boolean,
    Select {
        options: Vec<String>,
    },
    Color,
    Image,
    Url,
    Repeater {
        fields: Vec<PropField>,
    },
}

impl FieldKind {
    /// Check that `value` is acceptable for this field kind.
    /// `null` is always accepted and means "unset".
    pub fn check(&self, value: &Value) -> Result<(), String> {
        if value.is_null() {
            return Ok(());
        }

        match self {
            FieldKind::Text { max_length } => {
                let s = value.as_str().ok_or("expected a string")?;
                match max_length {
                    Some(max) if s.chars().count() > *max => {
                        Err(format!("longer than {} characters", max))
                    }
                    _ => Ok(()),
                }
            }
            FieldKind::Textarea | FieldKind::RichText | FieldKind::Image | FieldKind::Url => {
                value.as_str().map(|_| ()).ok_or_else(|| "expected a string".to_string())
            }
            FieldKind::Color => {
                let s = value.as_str().ok_or("expected a color string")?;
                if is_color(s) {
                    Ok(())
                } else {
                    Err(format!("'{}' is not a color", s))
                }
            }
            FieldKind::Number { min, max } => {
                let n = value.as_f64().ok_or("expected a number")?;
                if let Some(min) = min {
                    if n < *min {
                        return Err(format!("must be at least {}", min));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(format!("must be at most {}", max));
                    }
                }
                Ok(())
            }
            FieldKind::Boolean => {
                value.as_bool().map(|_| ()).ok_or_else(|| "expected true or false".to_string())
            }
            FieldKind::Select { options } => {
                let s = value.as_str().ok_or("expected a string")?;
                if options.iter().any(|o| o == s) {
                    Ok(())
                } else {
                    Err(format!("'{}' is not one of {:?}", s, options))
                }
            }
            FieldKind::Repeater { fields } => {
                let items = value.as_array().ok_or("expected a list")?;
                for (i, item) in items.iter().enumerate() {
                    let obj = item
                        .as_object()
                        .ok_or_else(|| format!("item {} is not an object", i))?;
                    for field in fields {
                        if let Some(v) = obj.get(&field.name) {
                            field
                                .kind
                                .check(v)
                                .map_err(|e| format!("item {} '{}': {}", i, field.name, e))?;
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

fn is_color(s: &str) -> bool {
    if let Some(hex) = s.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    s.starts_with("rgb") || s.starts_with("hsl") || s.starts_with("var(") || s == "transparent"
}

impl ComponentEntry {
    pub fn new(name: impl Into<String>, label: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            category: category.into(),
            supports_children: false,
            fields: Vec::new(),
        }
    }

    pub fn container(mut self) -> Self {
        self.supports_children = true;
        self
    }

    pub fn field(mut self, field: PropField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field_def(&self, name: &str) -> Option<&PropField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Props a freshly inserted block starts with
    pub fn default_props(&self) -> Props {
        self.fields
            .iter()
            .filter_map(|f| f.default.clone().map(|v| (f.name.clone(), v)))
            .collect()
    }

    /// Validate props against declared fields. Undeclared keys pass through.
    pub fn validate_props(&self, props: &Props) -> Result<(), (String, String)> {
        for field in &self.fields {
            match props.get(&field.name) {
                Some(value) => field
                    .kind
                    .check(value)
                    .map_err(|reason| (field.name.clone(), reason))?,
                None if field.required => {
                    return Err((field.name.clone(), "is required".to_string()));
                }
                None => {}
            }
        }
        Ok(())
    }
}

impl PropField {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            default: None,
            required: false,
        }
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Registry backed by an in-memory map
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    entries: BTreeMap<String, ComponentEntry>,
}

impl StaticRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: impl IntoIterator<Item = ComponentEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.name.clone(), e)).collect(),
        }
    }

    pub fn register(&mut self, entry: ComponentEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    /// The built-in component catalog
    pub fn builtin() -> Self {
        let text = |max| FieldKind::Text { max_length: max };
        let align = FieldKind::Select {
            options: vec!["left".into(), "center".into(), "right".into()],
        };

        Self::with_entries([
            ComponentEntry::new("Section", "Section", "layout")
                .container()
                .field(PropField::new("background", "Background", FieldKind::Color))
                .field(
                    PropField::new("padding", "Padding", FieldKind::Number { min: Some(0.0), max: Some(400.0) })
                        .default_value(json!(48)),
                ),
            ComponentEntry::new("Container", "Container", "layout")
                .container()
                .field(
                    PropField::new("max_width", "Max width", FieldKind::Number { min: Some(0.0), max: None })
                        .default_value(json!(1200)),
                ),
            ComponentEntry::new("Columns", "Columns", "layout")
                .container()
                .field(
                    PropField::new("columns", "Columns", FieldKind::Number { min: Some(1.0), max: Some(6.0) })
                        .default_value(json!(2)),
                )
                .field(
                    PropField::new("gap", "Gap", FieldKind::Number { min: Some(0.0), max: None })
                        .default_value(json!(24)),
                ),
            ComponentEntry::new("Hero", "Hero", "content")
                .field(PropField::new("title", "Title", text(Some(120))).default_value(json!("Welcome")))
                .field(PropField::new("subtitle", "Subtitle", FieldKind::Textarea))
                .field(PropField::new("background_image", "Background image", FieldKind::Image))
                .field(PropField::new("cta_label", "Button label", text(Some(40))))
                .field(PropField::new("cta_link", "Button link", FieldKind::Url)),
            ComponentEntry::new("Heading", "Heading", "content")
                .field(
                    PropField::new("text", "Text", text(Some(200)))
                        .default_value(json!("Heading"))
                        .required(),
                )
                .field(
                    PropField::new("level", "Level", FieldKind::Number { min: Some(1.0), max: Some(6.0) })
                        .default_value(json!(2)),
                )
                .field(PropField::new("align", "Alignment", align.clone())),
            ComponentEntry::new("Text", "Text", "content")
                .field(PropField::new("content", "Content", FieldKind::RichText).default_value(json!("")))
                .field(PropField::new("align", "Alignment", align)),
            ComponentEntry::new("Image", "Image", "media")
                .field(PropField::new("src", "Image", FieldKind::Image))
                .field(PropField::new("alt", "Alt text", text(Some(250))))
                .field(PropField::new("link", "Link", FieldKind::Url)),
            ComponentEntry::new("Button", "Button", "content")
                .field(PropField::new("label", "Label", text(Some(60))).default_value(json!("Click me")))
                .field(PropField::new("href", "Link", FieldKind::Url))
                .field(
                    PropField::new(
                        "variant",
                        "Variant",
                        FieldKind::Select {
                            options: vec!["primary".into(), "secondary".into(), "outline".into()],
                        },
                    )
                    .default_value(json!("primary")),
                )
                .field(PropField::new("open_in_new_tab", "Open in new tab", FieldKind::Boolean)),
            ComponentEntry::new("Spacer", "Spacer", "layout").field(
                PropField::new("height", "Height", FieldKind::Number { min: Some(0.0), max: Some(800.0) })
                    .default_value(json!(32)),
            ),
            ComponentEntry::new("Divider", "Divider", "layout")
                .field(PropField::new("color", "Color", FieldKind::Color)),
            ComponentEntry::new("Video", "Video", "media")
                .field(PropField::new("url", "Video URL", FieldKind::Url))
                .field(PropField::new("autoplay", "Autoplay", FieldKind::Boolean).default_value(json!(false))),
            ComponentEntry::new("Testimonial", "Testimonials", "content").field(PropField::new(
                "items",
                "Testimonials",
                FieldKind::Repeater {
                    fields: vec![
                        PropField::new("quote", "Quote", FieldKind::Textarea),
                        PropField::new("author", "Author", text(Some(80))),
                        PropField::new("avatar", "Avatar", FieldKind::Image),
                    ],
                },
            )),
        ])
    }
}

impl ComponentRegistry for StaticRegistry {
    fn entry(&self, name: &str) -> Option<&ComponentEntry> {
        self.entries.get(name)
    }

    fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}
