//! Nested JSON and plain-text outline views of a page

use crate::compiler::{heading_level, CompileError};
use pagecraft_editor::{Block, BlockId, BlockTree, Page, PageStatus, Props, SeoSettings};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageNode<'a> {
    id: &'a str,
    title: &'a str,
    slug: &'a str,
    status: PageStatus,
    seo: &'a SeoSettings,
    blocks: Vec<BlockNode<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockNode<'a> {
    id: &'a BlockId,
    component: &'a str,
    #[serde(skip_serializing_if = "no_props")]
    props: &'a Props,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_css: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_classes: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<BlockNode<'a>>,
}

fn no_props(props: &&Props) -> bool {
    props.is_empty()
}

/// Compile a page to nested JSON, children inline under their parent
pub fn compile_to_json(page: &Page, pretty: bool) -> Result<String, CompileError> {
    let tree = BlockTree::from_blocks(page.blocks.clone())?;
    let node = PageNode {
        id: &page.id,
        title: &page.title,
        slug: &page.slug,
        status: page.status,
        seo: &page.seo,
        blocks: nodes(&tree, None),
    };

    let json = if pretty {
        serde_json::to_string_pretty(&node)?
    } else {
        serde_json::to_string(&node)?
    };
    Ok(json)
}

fn nodes<'a>(tree: &'a BlockTree, parent: Option<&BlockId>) -> Vec<BlockNode<'a>> {
    tree.children(parent)
        .into_iter()
        .map(|block| BlockNode {
            id: &block.id,
            component: &block.component_name,
            props: &block.props,
            hidden: !block.is_visible,
            custom_css: block.custom_css.as_deref(),
            custom_classes: block.custom_classes.as_deref(),
            children: nodes(tree, Some(&block.id)),
        })
        .collect()
}

const SUMMARY_KEYS: [&str; 5] = ["title", "text", "label", "content", "alt"];
const SUMMARY_MAX: usize = 40;

/// Indented tree of the page, one block per line
///
/// ```text
/// Home (/home)
///   Section [s1]
///     Heading h2 [h1] "About us"
///     Text [t1] (hidden)
/// ```
pub fn compile_outline(page: &Page) -> Result<String, CompileError> {
    let tree = BlockTree::from_blocks(page.blocks.clone())?;
    let mut out = format!("{} (/{})\n", page.title, page.slug);
    outline(&tree, None, 1, &mut out);
    Ok(out)
}

fn outline(tree: &BlockTree, parent: Option<&BlockId>, depth: usize, out: &mut String) {
    for block in tree.children(parent) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&outline_line(block));
        out.push('\n');
        outline(tree, Some(&block.id), depth + 1, out);
    }
}

fn outline_line(block: &Block) -> String {
    let mut line = block.component_name.clone();
    if block.component_name == "Heading" {
        line.push_str(&format!(" h{}", heading_level(block)));
    }
    line.push_str(&format!(" [{}]", block.id));

    if let Some(summary) = SUMMARY_KEYS.iter().find_map(|key| block.prop_str(key)) {
        if !summary.is_empty() {
            line.push_str(&format!(" \"{}\"", truncate(summary, SUMMARY_MAX)));
        }
    }
    if !block.is_visible {
        line.push_str(" (hidden)");
    }
    line
}

fn truncate(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
