use std::sync::LazyLock;

use regex::Regex;

static MONEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\s*([0-9][0-9,]*)").unwrap());
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// Pull the dollar amount out of a price cell ("$1,299" -> "1299").
/// Returns an empty string when there is no `$` amount.
pub fn extract_money(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    MONEY_RE
        .captures(text)
        .map(|caps| caps[1].replace(',', ""))
        .unwrap_or_default()
}

/// First run of digits in a quantity cell; cells without digits pass through trimmed.
pub fn extract_quantity(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    match DIGITS_RE.find(text) {
        Some(m) => m.as_str().to_string(),
        None => text.trim().to_string(),
    }
}

// ── Tests ──
