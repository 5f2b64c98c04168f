use crate::diagnostic::Diagnostic;
use crate::rules::{PageContext, SeoRule};
use regex::Regex;
use std::sync::OnceLock;

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern is valid"))
}

/// Slugs are lowercase words joined by single hyphens
pub struct SlugFormatRule;

impl SeoRule for SlugFormatRule {
    fn name(&self) -> &'static str {
        "slug-format"
    }

    fn description(&self) -> &'static str {
        "Page slug should be lowercase words separated by hyphens"
    }

    fn check_page(&self, ctx: &PageContext) -> Vec<Diagnostic> {
        let slug = ctx.page.slug.as_str();
        if slug_pattern().is_match(slug) {
            return Vec::new();
        }

        let message = if slug.is_empty() {
            "Page has no slug".to_string()
        } else {
            format!("Slug '{}' is not a lowercase, hyphen-separated path", slug)
        };

        vec![Diagnostic::error(self.name(), message).with_suggestion(format!("Use '{}'", suggest_slug(slug)))]
    }
}

/// Best-effort conversion of arbitrary text to a valid slug
pub fn suggest_slug(text: &str) -> String {
    let mut slug = String::new();
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "page".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::context;
    use pagecraft_editor::Page;

    #[test]
    fn test_valid_slugs() {
        for slug in ["home", "about-us", "pricing-2024"] {
            let page = Page::new("p", "P", slug);
            assert!(SlugFormatRule.check_page(&context(&page)).is_empty(), "{}", slug);
        }
    }

    #[test]
    fn test_invalid_slugs() {
        for slug in ["", "About Us", "about--us", "-about", "about_us", "über"] {
            let page = Page::new("p", "P", slug);
            assert_eq!(SlugFormatRule.check_page(&context(&page)).len(), 1, "{}", slug);
        }
    }

    #[test]
    fn test_suggest_slug() {
        assert_eq!(suggest_slug("About Us!"), "about-us");
        assert_eq!(suggest_slug("  --Pricing__2024--"), "pricing-2024");
        assert_eq!(suggest_slug("!!!"), "page");
    }
}
