//! # Pagecraft Export
//!
//! Code-export views of a page: a standalone HTML document, the page
//! stylesheet, nested JSON and a plain-text outline.

mod compiler;
mod css;
mod json;

pub use compiler::{compile_to_html, CompileError, CompileOptions};
pub use css::compile_to_css;
pub use json::{compile_outline, compile_to_json};

#[cfg(test)]
mod tests;
