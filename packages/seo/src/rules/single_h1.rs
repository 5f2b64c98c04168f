use crate::diagnostic::Diagnostic;
use crate::rules::{PageContext, SeoRule};
use pagecraft_editor::Block;
use serde_json::Value;

/// Exactly one top-level heading per page. A Hero renders its title as
/// the page `h1`.
pub struct SingleH1Rule;

pub(crate) fn is_h1(block: &Block) -> bool {
    match block.component_name.as_str() {
        "Hero" => true,
        "Heading" => block.props.get("level").and_then(Value::as_f64) == Some(1.0),
        _ => false,
    }
}

impl SeoRule for SingleH1Rule {
    fn name(&self) -> &'static str {
        "single-h1"
    }

    fn description(&self) -> &'static str {
        "Page should have exactly one H1 heading"
    }

    fn check_page(&self, ctx: &PageContext) -> Vec<Diagnostic> {
        let h1s: Vec<&Block> = ctx.blocks.iter().copied().filter(|b| is_h1(b)).collect();

        match h1s.as_slice() {
            [] => vec![Diagnostic::error(self.name(), "Page has no H1 heading")
                .with_suggestion("Add a Hero or set one Heading to level 1")],
            [_] => Vec::new(),
            [_, extra @ ..] => extra
                .iter()
                .map(|block| {
                    Diagnostic::warning(self.name(), "Page has more than one H1 heading")
                        .on_block(&block.id)
                        .with_suggestion("Use level 2 or lower for secondary headings")
                })
                .collect(),
        }
    }
}
