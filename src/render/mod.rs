pub mod card;
pub mod grid;

pub use card::render_card;
pub use grid::assemble_grid;

use crate::parser::ItemRecord;

/// Rendered card grid for a list of items, without touching any file.
pub fn render_cards_only(items: &[ItemRecord]) -> String {
    assemble_grid(items)
}

/// Escape text for HTML element content and double-quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}
