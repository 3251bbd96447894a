// German number formatting: "." groups thousands, "," marks decimals.

/// Keep digits, commas and dots, then rewrite to a parseable form.
/// "1.234,50 €" becomes "1234.50".
pub fn normalize_number(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .filter(|c| *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

pub fn parse_number(input: &str) -> Option<f64> {
    normalize_number(input).parse::<f64>().ok()
}

pub fn parse_integer(input: &str) -> Option<i64> {
    normalize_number(input).parse::<i64>().ok()
}

/// Text of an element with its whitespace left as the site sent it.
pub fn element_text(el: scraper::ElementRef<'_>) -> String {
    el.text().collect()
}

/// `None` for empty strings, so an empty element counts as absent.
pub fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
