use pagecraft_editor::{Block, BlockTree, MutationError, Page};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during export
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Invalid block tree: {0}")]
    InvalidTree(#[from] MutationError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Options for HTML compilation
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Emit layout props (padding, background, ...) as inline styles
    pub inline_styles: bool,
    /// Embed the page stylesheet in a `<style>` tag
    pub embed_css: bool,
    /// Render blocks marked invisible
    pub include_hidden: bool,
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            inline_styles: true,
            embed_css: true,
            include_hidden: false,
            pretty: true,
            indent: "  ".to_string(),
        }
    }
}

struct Context<'a> {
    options: CompileOptions,
    tree: &'a BlockTree,
    depth: usize,
    buffer: String,
}

impl<'a> Context<'a> {
    fn new(options: CompileOptions, tree: &'a BlockTree) -> Self {
        Self {
            options,
            tree,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Compile a page to a standalone HTML document
pub fn compile_to_html(page: &Page, options: CompileOptions) -> Result<String, CompileError> {
    let tree = BlockTree::from_blocks(page.blocks.clone())?;
    let mut ctx = Context::new(options, &tree);

    ctx.add_line("<!DOCTYPE html>");
    ctx.add_line("<html lang=\"en\">");
    ctx.indent();

    compile_head(page, &mut ctx);

    ctx.add_line("<body>");
    ctx.indent();

    ctx.add_line("<main class=\"pc-page\">");
    ctx.indent();
    for block in tree.roots() {
        compile_block(block, &mut ctx);
    }
    ctx.dedent();
    ctx.add_line("</main>");

    compile_footer(page, &mut ctx);
    compile_fab(page, &mut ctx);

    ctx.dedent();
    ctx.add_line("</body>");

    ctx.dedent();
    ctx.add_line("</html>");

    tracing::debug!(page = %page.id, blocks = tree.len(), "compiled html");
    Ok(ctx.get_output())
}

fn compile_head(page: &Page, ctx: &mut Context) {
    let seo = &page.seo;

    ctx.add_line("<head>");
    ctx.indent();

    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");

    let title = seo.meta_title.as_deref().unwrap_or(&page.title);
    ctx.add_line(&format!("<title>{}</title>", escape_html(title)));
    ctx.add_line(&format!("<meta property=\"og:title\" content=\"{}\">", escape_html(title)));

    if let Some(description) = &seo.meta_description {
        ctx.add_line(&format!("<meta name=\"description\" content=\"{}\">", escape_html(description)));
    }
    if !seo.keywords.is_empty() {
        ctx.add_line(&format!(
            "<meta name=\"keywords\" content=\"{}\">",
            escape_html(&seo.keywords.join(", "))
        ));
    }
    if let Some(url) = &seo.canonical_url {
        ctx.add_line(&format!("<link rel=\"canonical\" href=\"{}\">", escape_html(url)));
    }
    if let Some(image) = &seo.og_image {
        ctx.add_line(&format!("<meta property=\"og:image\" content=\"{}\">", escape_html(image)));
    }
    if seo.no_index {
        ctx.add_line("<meta name=\"robots\" content=\"noindex, nofollow\">");
    }

    if ctx.options.embed_css {
        let css = crate::css::compile_to_css(page);
        ctx.add_line("<style>");
        for line in css.lines().filter(|l| !l.is_empty()) {
            ctx.add_line(line);
        }
        ctx.add_line("</style>");
    }

    ctx.dedent();
    ctx.add_line("</head>");
}

fn compile_block(block: &Block, ctx: &mut Context) {
    if !block.is_visible && !ctx.options.include_hidden {
        return;
    }

    let attrs = block_attributes(block, ctx);

    match block.component_name.as_str() {
        "Section" => compile_container("section", &attrs, block, ctx),
        "Container" | "Columns" => compile_container("div", &attrs, block, ctx),

        "Hero" => {
            ctx.add_line(&format!("<header{}>", attrs));
            ctx.indent();
            let title = block.prop_str("title").unwrap_or_default();
            ctx.add_line(&format!("<h1>{}</h1>", escape_html(title)));
            if let Some(subtitle) = block.prop_str("subtitle").filter(|s| !s.is_empty()) {
                ctx.add_line(&format!("<p>{}</p>", escape_html(subtitle)));
            }
            if let Some(label) = block.prop_str("cta_label").filter(|s| !s.is_empty()) {
                let href = block.prop_str("cta_link").unwrap_or("#");
                ctx.add_line(&format!(
                    "<a class=\"pc-hero-cta\" href=\"{}\">{}</a>",
                    escape_html(href),
                    escape_html(label)
                ));
            }
            ctx.dedent();
            ctx.add_line("</header>");
        }

        "Heading" => {
            let level = heading_level(block);
            let text = block.prop_str("text").unwrap_or_default();
            ctx.add_line(&format!("<h{level}{attrs}>{}</h{level}>", escape_html(text)));
        }

        "Text" => {
            let content = block.prop_str("content").unwrap_or_default();
            ctx.add_line(&format!("<p{}>{}</p>", attrs, escape_html(content)));
        }

        "Image" => {
            let src = block.prop_str("src").unwrap_or_default();
            let alt = block.prop_str("alt").unwrap_or_default();
            let img = format!("<img{} src=\"{}\" alt=\"{}\" />", attrs, escape_html(src), escape_html(alt));
            match block.prop_str("link").filter(|s| !s.is_empty()) {
                Some(link) => ctx.add_line(&format!("<a href=\"{}\">{}</a>", escape_html(link), img)),
                None => ctx.add_line(&img),
            }
        }

        "Button" => {
            let label = block.prop_str("label").unwrap_or_default();
            let href = block.prop_str("href").unwrap_or("#");
            let target = if prop_bool(block, "open_in_new_tab") {
                " target=\"_blank\" rel=\"noopener noreferrer\""
            } else {
                ""
            };
            ctx.add_line(&format!(
                "<a{} href=\"{}\"{}>{}</a>",
                attrs,
                escape_html(href),
                target,
                escape_html(label)
            ));
        }

        "Spacer" => ctx.add_line(&format!("<div{}></div>", attrs)),
        "Divider" => ctx.add_line(&format!("<hr{} />", attrs)),

        "Video" => {
            let url = block.prop_str("url").unwrap_or_default();
            let autoplay = if prop_bool(block, "autoplay") { " autoplay muted" } else { "" };
            ctx.add_line(&format!(
                "<video{} src=\"{}\" controls{}></video>",
                attrs,
                escape_html(url),
                autoplay
            ));
        }

        "Testimonial" => {
            ctx.add_line(&format!("<div{}>", attrs));
            ctx.indent();
            let items = block.props.get("items").and_then(Value::as_array);
            for item in items.into_iter().flatten() {
                let quote = item.get("quote").and_then(Value::as_str).unwrap_or_default();
                let author = item.get("author").and_then(Value::as_str).unwrap_or_default();
                ctx.add_line("<figure>");
                ctx.indent();
                ctx.add_line(&format!("<blockquote>{}</blockquote>", escape_html(quote)));
                if !author.is_empty() {
                    ctx.add_line(&format!("<figcaption>{}</figcaption>", escape_html(author)));
                }
                ctx.dedent();
                ctx.add_line("</figure>");
            }
            ctx.dedent();
            ctx.add_line("</div>");
        }

        // Components this exporter does not know render as a plain wrapper
        _ => compile_container("div", &attrs, block, ctx),
    }
}

fn compile_container(tag: &str, attrs: &str, block: &Block, ctx: &mut Context) {
    let tree = ctx.tree;
    let children = tree.children(Some(&block.id));

    if children.is_empty() {
        ctx.add_line(&format!("<{tag}{attrs}></{tag}>"));
        return;
    }

    ctx.add_line(&format!("<{tag}{attrs}>"));
    ctx.indent();
    for child in children {
        compile_block(child, ctx);
    }
    ctx.dedent();
    ctx.add_line(&format!("</{tag}>"));
}

fn compile_footer(page: &Page, ctx: &mut Context) {
    let footer = &page.footer;
    if !footer.enabled {
        return;
    }

    ctx.add_line("<footer class=\"pc-footer\">");
    ctx.indent();
    if let Some(text) = &footer.text {
        ctx.add_line(&format!("<p>{}</p>", escape_html(text)));
    }
    if !footer.links.is_empty() {
        ctx.add_line("<nav>");
        ctx.indent();
        for link in &footer.links {
            ctx.add_line(&format!(
                "<a href=\"{}\">{}</a>",
                escape_html(&link.url),
                escape_html(&link.label)
            ));
        }
        ctx.dedent();
        ctx.add_line("</nav>");
    }
    ctx.dedent();
    ctx.add_line("</footer>");
}

fn compile_fab(page: &Page, ctx: &mut Context) {
    let fab = &page.fab;
    if !fab.enabled {
        return;
    }

    let position = match fab.position {
        pagecraft_editor::FabPosition::BottomRight => "bottom-right",
        pagecraft_editor::FabPosition::BottomLeft => "bottom-left",
    };
    let href = fab.link.as_deref().unwrap_or("#");
    let label = fab.label.as_deref().or(fab.icon.as_deref()).unwrap_or("+");
    let style = match (&fab.color, ctx.options.inline_styles) {
        (Some(color), true) => format!(" style=\"background: {};\"", escape_html(color)),
        _ => String::new(),
    };

    ctx.add_line(&format!(
        "<a class=\"pc-fab pc-fab-{}\" href=\"{}\"{}>{}</a>",
        position,
        escape_html(href),
        style,
        escape_html(label)
    ));
}

/// ` data-block-id=".." class=".."` plus inline styles when enabled
fn block_attributes(block: &Block, ctx: &Context) -> String {
    let mut classes = vec![component_class(&block.component_name)];
    if block.component_name == "Button" {
        let variant = block.prop_str("variant").unwrap_or("primary");
        classes.push(format!("pc-button-{}", variant));
    }
    if !block.is_visible {
        classes.push("pc-hidden".to_string());
    }
    if let Some(custom) = &block.custom_classes {
        classes.extend(custom.split_whitespace().map(str::to_string));
    }

    let mut attrs = format!(
        " data-block-id=\"{}\" class=\"{}\"",
        escape_html(block.id.as_str()),
        escape_html(&classes.join(" "))
    );

    if ctx.options.inline_styles {
        let styles = inline_styles(block);
        if !styles.is_empty() {
            attrs.push_str(&format!(" style=\"{}\"", escape_html(&styles.join(" "))));
        }
    }

    attrs
}

fn inline_styles(block: &Block) -> Vec<String> {
    let mut styles = Vec::new();
    let mut push = |key: &str, value: String| styles.push(format!("{}: {};", key, value));

    match block.component_name.as_str() {
        "Section" => {
            if let Some(bg) = block.prop_str("background") {
                push("background", bg.to_string());
            }
            if let Some(padding) = prop_number(block, "padding") {
                push("padding", format!("{}px 0", padding));
            }
        }
        "Container" => {
            if let Some(width) = prop_number(block, "max_width") {
                push("max-width", format!("{}px", width));
                push("margin", "0 auto".to_string());
            }
        }
        "Columns" => {
            let columns = prop_number(block, "columns").unwrap_or(2.0);
            push("display", "grid".to_string());
            push("grid-template-columns", format!("repeat({}, 1fr)", columns));
            if let Some(gap) = prop_number(block, "gap") {
                push("gap", format!("{}px", gap));
            }
        }
        "Spacer" => {
            let height = prop_number(block, "height").unwrap_or(32.0);
            push("height", format!("{}px", height));
        }
        "Divider" => {
            if let Some(color) = block.prop_str("color") {
                push("border-color", color.to_string());
            }
        }
        "Heading" | "Text" => {
            if let Some(align) = block.prop_str("align") {
                push("text-align", align.to_string());
            }
        }
        _ => {}
    }

    styles
}

/// `pc-` followed by the kebab-cased component name
pub(crate) fn component_class(component_name: &str) -> String {
    let mut class = String::from("pc-");
    for (i, ch) in component_name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                class.push('-');
            }
            class.push(ch.to_ascii_lowercase());
        } else if ch.is_ascii_alphanumeric() {
            class.push(ch);
        } else {
            class.push('-');
        }
    }
    class
}

pub(crate) fn heading_level(block: &Block) -> u8 {
    prop_number(block, "level")
        .map(|level| level.clamp(1.0, 6.0) as u8)
        .unwrap_or(2)
}

fn prop_number(block: &Block, key: &str) -> Option<f64> {
    block.props.get(key).and_then(Value::as_f64)
}

fn prop_bool(block: &Block, key: &str) -> bool {
    block.props.get(key).and_then(Value::as_bool).unwrap_or(false)
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
