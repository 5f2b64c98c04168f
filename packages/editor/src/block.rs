//! # Pages and Blocks
//!
//! The persisted data model. A page owns a flat list of blocks; tree structure
//! is encoded by `parent_block_id` and ordering within a sibling group by
//! `sort_order`. The backend stores exactly this shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Prop map carried by every block
pub type Props = BTreeMap<String, Value>;

/// Opaque block identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id for newly created blocks
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BlockId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One placed component instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,

    /// Registry name of the component ("Hero", "Section", ...)
    pub component_name: String,

    #[serde(default)]
    pub props: Props,

    /// `None` for root-level blocks
    #[serde(default)]
    pub parent_block_id: Option<BlockId>,

    #[serde(default)]
    pub sort_order: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_css: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_classes: Option<String>,

    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

fn default_visible() -> bool {
    true
}

impl Block {
    /// Create a detached, visible block with a fresh id
    pub fn new(component_name: impl Into<String>) -> Self {
        Self {
            id: BlockId::generate(),
            component_name: component_name.into(),
            props: Props::new(),
            parent_block_id: None,
            sort_order: 0,
            custom_css: None,
            custom_classes: None,
            is_visible: true,
        }
    }

    pub fn with_id(mut self, id: impl Into<BlockId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// String prop accessor, `None` when missing or not a string
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.parent_block_id.is_none()
    }
}

/// Publication status of a page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// A page and everything the editor persists for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    pub slug: String,

    #[serde(default)]
    pub status: PageStatus,

    #[serde(default)]
    pub blocks: Vec<Block>,

    #[serde(default)]
    pub seo: SeoSettings,

    #[serde(default)]
    pub fab: FabSettings,

    #[serde(default)]
    pub footer: FooterSettings,

    #[serde(default)]
    pub typography: TypographySettings,
}

impl Page {
    pub fn new(id: impl Into<String>, title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            slug: slug.into(),
            status: PageStatus::Draft,
            blocks: Vec::new(),
            seo: SeoSettings::default(),
            fab: FabSettings::default(),
            footer: FooterSettings::default(),
            typography: TypographySettings::default(),
        }
    }
}

/// Search-engine metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoSettings {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
    pub canonical_url: Option<String>,
    pub og_image: Option<String>,
    pub no_index: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FabPosition {
    #[default]
    BottomRight,
    BottomLeft,
}

/// Floating action button
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FabSettings {
    pub enabled: bool,
    pub icon: Option<String>,
    pub label: Option<String>,
    pub link: Option<String>,
    pub position: FabPosition,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FooterLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterSettings {
    pub enabled: bool,
    pub text: Option<String>,
    pub links: Vec<FooterLink>,
    pub show_social: bool,
}

impl Default for FooterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            text: None,
            links: Vec::new(),
            show_social: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypographySettings {
    pub heading_font: String,
    pub body_font: String,
    pub base_size_px: u32,
    pub line_height: f32,
    pub scale_ratio: f32,
}

impl Default for TypographySettings {
    fn default() -> Self {
        Self {
            heading_font: "Inter".to_string(),
            body_font: "Inter".to_string(),
            base_size_px: 16,
            line_height: 1.5,
            scale_ratio: 1.25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_defaults_when_deserializing() {
        let json = r#"{ "id": "b1", "component_name": "Hero" }"#;
        let block: Block = serde_json::from_str(json).unwrap();

        assert_eq!(block.id, BlockId::new("b1"));
        assert!(block.is_visible);
        assert!(block.is_root());
        assert_eq!(block.sort_order, 0);
        assert!(block.props.is_empty());
    }

    #[test]
    fn test_page_status_serializes_lowercase() {
        let json = serde_json::to_string(&PageStatus::Published).unwrap();
        assert_eq!(json, "\"published\"");
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        assert_ne!(BlockId::generate(), BlockId::generate());
    }

    #[test]
    fn test_page_without_settings_uses_defaults() {
        let json = r#"{ "id": "p1", "title": "Home", "slug": "home" }"#;
        let page: Page = serde_json::from_str(json).unwrap();

        assert_eq!(page.status, PageStatus::Draft);
        assert!(page.footer.enabled);
        assert_eq!(page.typography.base_size_px, 16);
        assert_eq!(page.fab.position, FabPosition::BottomRight);
    }
}
