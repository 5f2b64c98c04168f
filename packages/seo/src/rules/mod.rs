mod image_alt;
mod meta_description;
mod single_h1;
mod slug_format;
mod title_length;

pub use image_alt::ImageAltRule;
pub use meta_description::MetaDescriptionRule;
pub use single_h1::SingleH1Rule;
pub use slug_format::SlugFormatRule;
pub use title_length::TitleLengthRule;

use crate::diagnostic::Diagnostic;
use pagecraft_editor::{Block, Page};

/// What a rule sees of the page: metadata plus the blocks that will be
/// rendered, in document order
#[derive(Debug)]
pub struct PageContext<'a> {
    pub page: &'a Page,
    pub blocks: Vec<&'a Block>,
}

impl<'a> PageContext<'a> {
    /// Title used for `<title>`: the SEO override, else the page title
    pub fn effective_title(&self) -> &'a str {
        self.page
            .seo
            .meta_title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.page.title)
    }
}

/// Trait for implementing SEO rules
pub trait SeoRule {
    /// Unique identifier for this rule
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Check page-level metadata or the page as a whole
    fn check_page(&self, _ctx: &PageContext) -> Vec<Diagnostic> {
        Vec::new()
    }

    /// Check one rendered block
    fn check_block(&self, _block: &Block, _ctx: &PageContext) -> Vec<Diagnostic> {
        Vec::new()
    }
}

/// Registry of all available SEO rules
pub struct RuleRegistry {
    rules: Vec<Box<dyn SeoRule>>,
}

impl RuleRegistry {
    /// Create a new registry with all built-in rules
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(TitleLengthRule),
                Box::new(MetaDescriptionRule),
                Box::new(SlugFormatRule),
                Box::new(SingleH1Rule),
                Box::new(ImageAltRule),
            ],
        }
    }

    /// Get all registered rules
    pub fn rules(&self) -> &[Box<dyn SeoRule>] {
        &self.rules
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a custom rule to the registry
    pub fn add_rule(&mut self, rule: Box<dyn SeoRule>) {
        self.rules.push(rule);
    }

    /// Drop a rule by name, returning whether it was registered
    pub fn remove_rule(&mut self, name: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|rule| rule.name() != name);
        self.rules.len() != before
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &format!("{} rules", self.rules.len()))
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn context(page: &Page) -> PageContext<'_> {
    PageContext {
        page,
        blocks: page.blocks.iter().collect(),
    }
}
