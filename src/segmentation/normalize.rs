/*!
 * Text canonicalization for comparison.
 *
 * Nothing produced here is ever returned as sentence content; it only exists
 * so that two renditions of the same passage can be compared.
 */

/// Returns true for characters that count as whitespace when comparing,
/// including zero-width characters that `char::is_whitespace` misses
fn is_comparison_space(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}')
}

/// Map dash and quote variants to their ASCII forms
fn canonical_char(c: char) -> char {
    match c {
        // Unicode dash block and the minus sign
        '\u{2010}'..='\u{2015}' | '\u{2212}' | '\u{FE58}' | '\u{FE63}' | '\u{FF0D}' => '-',
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' | '\u{2039}'
        | '\u{203A}' | '\u{FF07}' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' | '\u{00AB}'
        | '\u{00BB}' | '\u{FF02}' => '"',
        other => other,
    }
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Canonicalize `text` for comparison.
///
/// Collapses every whitespace class to a single ASCII space, maps dashes and
/// curly/angled quotes to ASCII, strips one layer of surrounding quote
/// characters and trims. Total on all inputs.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if is_comparison_space(c) {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(canonical_char(c));
    }

    let mut trimmed = out.as_str();
    if let Some(rest) = trimmed.strip_prefix(is_quote) {
        trimmed = rest;
    }
    if let Some(rest) = trimmed.strip_suffix(is_quote) {
        trimmed = rest;
    }

    trimmed.trim().to_string()
}

/// Character length of the normalized text
pub fn normalized_len(text: &str) -> usize {
    normalize(text).chars().count()
}

/// Join pieces with single spaces, the reconstruction rule used everywhere
pub fn join_pieces<S: AsRef<str>>(pieces: &[S]) -> String {
    pieces
        .iter()
        .map(|piece| piece.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace line breaks with spaces; cell-embedded breaks must not read as
/// sentence boundaries
pub fn flatten_line_breaks(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
