use crate::diagnostic::Diagnostic;
use crate::rules::{PageContext, SeoRule};

pub const MIN_DESCRIPTION_CHARS: usize = 70;
pub const MAX_DESCRIPTION_CHARS: usize = 160;

/// Meta description presence and length
pub struct MetaDescriptionRule;

impl SeoRule for MetaDescriptionRule {
    fn name(&self) -> &'static str {
        "meta-description"
    }

    fn description(&self) -> &'static str {
        "Page should have a meta description of 70 to 160 characters"
    }

    fn check_page(&self, ctx: &PageContext) -> Vec<Diagnostic> {
        let description = ctx.page.seo.meta_description.as_deref().unwrap_or_default().trim();
        let len = description.chars().count();

        if len == 0 {
            return vec![Diagnostic::error(self.name(), "Page has no meta description")
                .with_suggestion("Summarize the page in one or two sentences")];
        }

        if len < MIN_DESCRIPTION_CHARS {
            return vec![Diagnostic::warning(
                self.name(),
                format!("Meta description is {} characters; aim for at least {}", len, MIN_DESCRIPTION_CHARS),
            )];
        }

        if len > MAX_DESCRIPTION_CHARS {
            return vec![Diagnostic::warning(
                self.name(),
                format!(
                    "Meta description is {} characters and will be truncated after {}",
                    len, MAX_DESCRIPTION_CHARS
                ),
            )];
        }

        Vec::new()
    }
}
