use crate::diagnostic::Diagnostic;
use crate::rules::{PageContext, SeoRule};
use pagecraft_editor::Block;

/// Images need alternative text
pub struct ImageAltRule;

impl SeoRule for ImageAltRule {
    fn name(&self) -> &'static str {
        "image-alt"
    }

    fn description(&self) -> &'static str {
        "Image blocks must have alt text"
    }

    fn check_block(&self, block: &Block, _ctx: &PageContext) -> Vec<Diagnostic> {
        if block.component_name != "Image" {
            return Vec::new();
        }

        let has_alt = block.prop_str("alt").map(|alt| !alt.trim().is_empty()).unwrap_or(false);
        if has_alt {
            return Vec::new();
        }

        vec![Diagnostic::error(self.name(), "Image is missing alt text")
            .on_block(&block.id)
            .with_suggestion("Describe the image content in the Alt text field")]
    }
}
