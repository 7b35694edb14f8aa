//! Plain-text rendering of HTML event descriptions.

/// Wide enough that `html2text` never wraps a line.
const RENDER_WIDTH: usize = 10_000;

/// Render HTML as plain text with all whitespace runs collapsed to one space.
///
/// Returns `None` for missing or blank input. Markup that `html2text`
/// cannot render is treated as text.
pub fn html_to_plain_text(html: Option<&str>) -> Option<String> {
    let html = html?.trim();
    if html.is_empty() {
        return None;
    }

    let rendered =
        html2text::from_read(html.as_bytes(), RENDER_WIDTH).unwrap_or_else(|_| html.to_string());

    let collapsed = rendered.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}
