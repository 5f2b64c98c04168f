use crate::{compile_outline, compile_to_html, compile_to_json, CompileError, CompileOptions};
use pagecraft_editor::{Block, BlockId, FooterLink, Page};
use serde_json::json;

fn child(component: &str, id: &str, parent: &str, order: i64) -> Block {
    let mut block = Block::new(component).with_id(id);
    block.parent_block_id = Some(BlockId::new(parent));
    block.sort_order = order;
    block
}

fn landing_page() -> Page {
    let mut page = Page::new("landing", "Landing", "landing");
    page.blocks = vec![
        Block::new("Section").with_id("s1").with_prop("padding", 48),
        child("Heading", "h1", "s1", 0)
            .with_prop("text", "About <us>")
            .with_prop("level", 1),
        child("Text", "t1", "s1", 1).with_prop("content", "We build pages"),
    ];
    page
}

#[test]
fn test_compile_document_shell() {
    let html = compile_to_html(&landing_page(), CompileOptions::default()).expect("Failed to compile");

    println!("Generated HTML:\n{}", html);

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Landing</title>"));
    assert!(html.contains("<main class=\"pc-page\">"));
    assert!(html.contains("</html>"));
}

#[test]
fn test_compile_nested_blocks() {
    let html = compile_to_html(&landing_page(), CompileOptions::default()).expect("Failed to compile");

    let section = html.find("<section data-block-id=\"s1\"").unwrap();
    let heading = html.find("<h1 data-block-id=\"h1\" class=\"pc-heading\">").unwrap();
    let text = html.find("<p data-block-id=\"t1\"").unwrap();
    let close = html.find("</section>").unwrap();

    assert!(section < heading && heading < text && text < close);
    assert!(html.contains("About &lt;us&gt;"));
    assert!(html.contains("style=\"padding: 48px 0;\""));
}

#[test]
fn test_compile_children_in_sort_order() {
    let mut page = landing_page();
    page.blocks[1].sort_order = 1;
    page.blocks[2].sort_order = 0;

    let html = compile_to_html(&page, CompileOptions::default()).unwrap();
    assert!(html.find("data-block-id=\"t1\"").unwrap() < html.find("data-block-id=\"h1\"").unwrap());
}

#[test]
fn test_compile_hidden_blocks() {
    let mut page = landing_page();
    page.blocks[0].is_visible = false;

    let html = compile_to_html(&page, CompileOptions::default()).unwrap();
    assert!(!html.contains("data-block-id=\"s1\""));
    assert!(!html.contains("data-block-id=\"h1\""), "children of hidden blocks are hidden too");

    let options = CompileOptions {
        include_hidden: true,
        ..Default::default()
    };
    let html = compile_to_html(&page, options).unwrap();
    assert!(html.contains("class=\"pc-section pc-hidden\""));
}

#[test]
fn test_compile_custom_classes_and_css() {
    let mut page = landing_page();
    page.blocks[2].custom_classes = Some("lead  muted".to_string());
    page.blocks[2].custom_css = Some("color: #333".to_string());

    let html = compile_to_html(&page, CompileOptions::default()).unwrap();
    assert!(html.contains("class=\"pc-text lead muted\""));
    assert!(html.contains("[data-block-id=\"t1\"] {"));

    let options = CompileOptions {
        embed_css: false,
        ..Default::default()
    };
    let html = compile_to_html(&page, options).unwrap();
    assert!(!html.contains("<style>"));
}

#[test]
fn test_compile_embedded_css_stays_in_style_element() {
    let mut page = landing_page();
    page.blocks[2].custom_css = Some("&::before { content: \"</style><p>x</p>\"; }".to_string());

    let html = compile_to_html(&page, CompileOptions::default()).unwrap();
    assert_eq!(html.matches("</style>").count(), 1);
    assert!(html.contains("<\\/style>"));
}

#[test]
fn test_compile_seo_meta() {
    let mut page = landing_page();
    page.seo.meta_title = Some("Landing | Pagecraft".to_string());
    page.seo.meta_description = Some("A \"fast\" page".to_string());
    page.seo.no_index = true;

    let html = compile_to_html(&page, CompileOptions::default()).unwrap();
    assert!(html.contains("<title>Landing | Pagecraft</title>"));
    assert!(html.contains("<meta name=\"description\" content=\"A &quot;fast&quot; page\">"));
    assert!(html.contains("noindex"));
}

#[test]
fn test_compile_leaf_components() {
    let mut page = Page::new("p", "P", "p");
    page.blocks = vec![
        Block::new("Image")
            .with_id("i1")
            .with_prop("src", "/a.png")
            .with_prop("alt", "A"),
        Block::new("Button")
            .with_id("b1")
            .with_prop("label", "Go")
            .with_prop("href", "/go")
            .with_prop("open_in_new_tab", true),
        Block::new("Divider").with_id("d1"),
        Block::new("Widget").with_id("w1"),
    ];
    for (i, block) in page.blocks.iter_mut().enumerate() {
        block.sort_order = i as i64;
    }

    let html = compile_to_html(&page, CompileOptions::default()).unwrap();
    assert!(html.contains("<img data-block-id=\"i1\" class=\"pc-image\" src=\"/a.png\" alt=\"A\" />"));
    assert!(html.contains("class=\"pc-button pc-button-primary\" href=\"/go\" target=\"_blank\""));
    assert!(html.contains("<hr data-block-id=\"d1\" class=\"pc-divider\" />"));
    assert!(html.contains("<div data-block-id=\"w1\" class=\"pc-widget\"></div>"));
}

#[test]
fn test_compile_footer_and_fab() {
    let mut page = Page::new("p", "P", "p");
    page.footer.text = Some("© Pagecraft".to_string());
    page.footer.links.push(FooterLink {
        label: "Privacy".to_string(),
        url: "/privacy".to_string(),
    });
    page.fab.enabled = true;
    page.fab.label = Some("Chat".to_string());
    page.fab.link = Some("/chat".to_string());

    let html = compile_to_html(&page, CompileOptions::default()).unwrap();
    assert!(html.contains("<footer class=\"pc-footer\">"));
    assert!(html.contains("<a href=\"/privacy\">Privacy</a>"));
    assert!(html.contains("<a class=\"pc-fab pc-fab-bottom-right\" href=\"/chat\">Chat</a>"));
}

#[test]
fn test_compile_compact() {
    let options = CompileOptions {
        pretty: false,
        embed_css: false,
        ..Default::default()
    };
    let html = compile_to_html(&landing_page(), options).unwrap();
    assert!(!html.contains('\n'));
}

#[test]
fn test_compile_rejects_dangling_parent() {
    let mut page = landing_page();
    page.blocks.push(child("Text", "orphan", "ghost", 0));

    let err = compile_to_html(&page, CompileOptions::default()).unwrap_err();
    assert!(matches!(err, CompileError::InvalidTree(_)));
}

#[test]
fn test_json_is_nested() {
    let json = compile_to_json(&landing_page(), false).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["slug"], "landing");
    assert_eq!(value["blocks"].as_array().unwrap().len(), 1);
    let children = &value["blocks"][0]["children"];
    assert_eq!(children[0]["component"], "Heading");
    assert_eq!(children[0]["props"]["level"], json!(1));
    assert_eq!(children[1]["id"], "t1");
}

#[test]
fn test_outline() {
    let mut page = landing_page();
    page.blocks[2].is_visible = false;

    let outline = compile_outline(&page).unwrap();
    assert_eq!(
        outline,
        "Landing (/landing)\n  Section [s1]\n    Heading h1 [h1] \"About <us>\"\n    Text [t1] \"We build pages\" (hidden)\n"
    );
}
