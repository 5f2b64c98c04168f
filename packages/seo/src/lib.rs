//! # Pagecraft SEO
//!
//! Rule-based SEO checks for a page and a 0-100 score.

mod analyzer;
mod diagnostic;
mod rules;

pub use analyzer::{analyze_page, AnalyzeOptions, SeoReport};
pub use diagnostic::{Diagnostic, DiagnosticLevel};
pub use rules::{PageContext, RuleRegistry, SeoRule};
