use crate::diagnostic::Diagnostic;
use crate::rules::{PageContext, SeoRule};

pub const MIN_TITLE_CHARS: usize = 30;
pub const MAX_TITLE_CHARS: usize = 60;

/// Page titles should fit a search result snippet
pub struct TitleLengthRule;

impl SeoRule for TitleLengthRule {
    fn name(&self) -> &'static str {
        "title-length"
    }

    fn description(&self) -> &'static str {
        "Page title should be between 30 and 60 characters"
    }

    fn check_page(&self, ctx: &PageContext) -> Vec<Diagnostic> {
        let title = ctx.effective_title().trim();
        let len = title.chars().count();

        let diagnostic = if len == 0 {
            Diagnostic::error(self.name(), "Page has no title")
                .with_suggestion("Set a meta title in the page SEO settings")
        } else if len < MIN_TITLE_CHARS {
            Diagnostic::warning(
                self.name(),
                format!("Title is {} characters; aim for at least {}", len, MIN_TITLE_CHARS),
            )
            .with_suggestion("Add the page topic or brand name to the title")
        } else if len > MAX_TITLE_CHARS {
            Diagnostic::warning(
                self.name(),
                format!("Title is {} characters and will be truncated after {}", len, MAX_TITLE_CHARS),
            )
            .with_suggestion("Move secondary words out of the title")
        } else {
            return Vec::new();
        };

        vec![diagnostic]
    }
}
