use pagecraft_editor::{Page, TypographySettings};

/// Compile the page stylesheet: typography variables followed by each
/// block's custom CSS scoped to that block.
///
/// Custom CSS is either a declaration list (`color: red; padding: 4px`) or
/// full rules where `&` stands for the block's selector. Custom CSS with
/// unbalanced braces is dropped, and `</` is escaped so the stylesheet can
/// be embedded in a `<style>` element.
pub fn compile_to_css(page: &Page) -> String {
    let mut css = String::new();
    compile_typography(&page.typography, &mut css);

    for block in &page.blocks {
        let Some(custom) = block.custom_css.as_deref().map(str::trim) else {
            continue;
        };
        if custom.is_empty() {
            continue;
        }
        let Some(custom) = sanitize_custom_css(custom) else {
            tracing::warn!(block = %block.id, "custom CSS has unbalanced braces, skipped");
            continue;
        };

        let selector = format!("[data-block-id=\"{}\"]", escape_selector(block.id.as_str()));
        css.push('\n');
        if custom.contains('{') {
            css.push_str(&custom.replace('&', &selector));
            css.push('\n');
        } else {
            css.push_str(&format!("{} {{\n", selector));
            for declaration in custom.split(';').map(str::trim).filter(|d| !d.is_empty()) {
                css.push_str(&format!("  {};\n", declaration));
            }
            css.push_str("}\n");
        }
    }

    css
}

fn compile_typography(typography: &TypographySettings, css: &mut String) {
    css.push_str(":root {\n");
    css.push_str(&format!("  --pc-heading-font: {};\n", font_stack(&typography.heading_font)));
    css.push_str(&format!("  --pc-body-font: {};\n", font_stack(&typography.body_font)));
    css.push_str(&format!("  --pc-base-size: {}px;\n", typography.base_size_px));
    css.push_str(&format!("  --pc-line-height: {};\n", typography.line_height));

    // h6 is the base size, each level up is one step of the scale
    for level in 1..=6 {
        let steps = (6 - level) as i32;
        let size = typography.base_size_px as f32 * typography.scale_ratio.powi(steps);
        css.push_str(&format!("  --pc-h{}-size: {}px;\n", level, format_number(size)));
    }
    css.push_str("}\n");

    css.push_str("\nbody {\n");
    css.push_str("  font-family: var(--pc-body-font);\n");
    css.push_str("  font-size: var(--pc-base-size);\n");
    css.push_str("  line-height: var(--pc-line-height);\n");
    css.push_str("}\n");

    for level in 1..=6 {
        css.push_str(&format!(
            "\nh{level} {{\n  font-family: var(--pc-heading-font);\n  font-size: var(--pc-h{level}-size);\n}}\n"
        ));
    }

    css.push_str("\n.pc-hidden {\n  opacity: 0.4;\n}\n");
}

fn sanitize_custom_css(custom: &str) -> Option<String> {
    let mut depth = 0usize;
    for c in custom.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.checked_sub(1)?,
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    Some(custom.replace("</", "<\\/"))
}

fn font_stack(font: &str) -> String {
    let font = font.replace(['"', ';', '{', '}', '<', '>'], "");
    format!("\"{}\", sans-serif", font.trim())
}

/// Two decimals at most, without trailing zeros
fn format_number(value: f32) -> String {
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn escape_selector(id: &str) -> String {
    id.replace('\\', "\\\\").replace('"', "\\\"")
}
