use crate::diagnostic::{Diagnostic, DiagnosticLevel};
use crate::rules::{PageContext, RuleRegistry};
use pagecraft_editor::{Block, BlockId, BlockTree, Page};
use serde::Serialize;

pub const ERROR_PENALTY: u32 = 20;
pub const WARNING_PENALTY: u32 = 8;

/// Options for configuring the analyzer
#[derive(Debug, Default)]
pub struct AnalyzeOptions {
    /// Custom rule registry (uses default if None)
    pub registry: Option<RuleRegistry>,

    /// Check blocks that are hidden from the published page
    pub include_hidden: bool,
}

/// Result of analyzing one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeoReport {
    /// 0 to 100, higher is better
    pub score: u8,
    pub diagnostics: Vec<Diagnostic>,
}

impl SeoReport {
    fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let penalty: u32 = diagnostics
            .iter()
            .map(|d| match d.level {
                DiagnosticLevel::Error => ERROR_PENALTY,
                DiagnosticLevel::Warning => WARNING_PENALTY,
                DiagnosticLevel::Info => 0,
            })
            .sum();
        let score = 100u32.saturating_sub(penalty) as u8;
        Self { score, diagnostics }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.level == DiagnosticLevel::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.level == DiagnosticLevel::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// Analyze a page and return its diagnostics and score
pub fn analyze_page(page: &Page, options: AnalyzeOptions) -> SeoReport {
    let registry = options.registry.unwrap_or_default();

    let tree = match BlockTree::from_blocks(page.blocks.clone()) {
        Ok(tree) => tree,
        Err(e) => {
            tracing::warn!(page = %page.id, error = %e, "page has an invalid block tree");
            let diagnostic = Diagnostic::error("block-tree", format!("Page blocks are inconsistent: {}", e));
            return SeoReport::from_diagnostics(vec![diagnostic]);
        }
    };

    let mut blocks = Vec::new();
    collect_rendered(&tree, None, options.include_hidden, &mut blocks);
    let ctx = PageContext { page, blocks };

    let mut diagnostics = Vec::new();
    for rule in registry.rules() {
        diagnostics.extend(rule.check_page(&ctx));
        for block in &ctx.blocks {
            diagnostics.extend(rule.check_block(block, &ctx));
        }
    }

    let report = SeoReport::from_diagnostics(diagnostics);
    tracing::debug!(page = %page.id, score = report.score, issues = report.diagnostics.len(), "seo analyzed");
    report
}

/// Depth-first in sibling order; a hidden block hides its subtree
fn collect_rendered<'a>(
    tree: &'a BlockTree,
    parent: Option<&BlockId>,
    include_hidden: bool,
    out: &mut Vec<&'a Block>,
) {
    for block in tree.children(parent) {
        if !block.is_visible && !include_hidden {
            continue;
        }
        out.push(block);
        collect_rendered(tree, Some(&block.id), include_hidden, out);
    }
}
