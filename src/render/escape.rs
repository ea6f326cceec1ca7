//! Escaping helpers shared by the RSS and HTML renderers.

use std::borrow::Cow;

/// Entities XML defines without a DTD.
const PREDEFINED_ENTITIES: &[&str] = &["amp", "lt", "gt", "quot", "apos"];

/// Drop control characters XML 1.0 does not allow.
pub fn strip_invalid_chars(input: &str) -> Cow<'_, str> {
    if input.chars().all(is_xml_char) {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(input.chars().filter(|&c| is_xml_char(c)).collect())
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || c >= '\u{20}'
}

/// Escape a text node: `&`, `<` and `>`.
pub fn escape_text(input: &str) -> String {
    html_escape::encode_text(&strip_invalid_chars(input)).into_owned()
}

/// Escape a double-quoted attribute value: `&`, `<`, `>` and `"`.
pub fn escape_attr(input: &str) -> String {
    html_escape::encode_double_quoted_attribute(&strip_invalid_chars(input)).into_owned()
}

/// Wrap markup in a CDATA section, splitting any `]]>` inside it.
pub fn cdata(input: &str) -> String {
    format!(
        "<![CDATA[{}]]>",
        strip_invalid_chars(input).replace("]]>", "]]]]><![CDATA[>")
    )
}

/// Prepare a URL for an element body or attribute.
///
/// Whitespace is stripped. A `&` that already starts an entity or character
/// reference is left alone so pre-encoded URLs are not escaped twice.
pub fn escape_url(input: &str) -> String {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let mut out = String::with_capacity(cleaned.len());

    for (idx, c) in cleaned.char_indices() {
        match c {
            '&' if starts_with_reference(&cleaned[idx..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }

    out
}

/// True if `s` (starting at `&`) begins with a predefined entity or a
/// numeric character reference.
pub fn starts_with_reference(s: &str) -> bool {
    let Some(body) = s.strip_prefix('&') else {
        return false;
    };
    let Some(end) = body.find(';') else {
        return false;
    };
    let name = &body[..end];

    if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        return is_valid_char_ref(hex, 16);
    }
    if let Some(dec) = name.strip_prefix('#') {
        return is_valid_char_ref(dec, 10);
    }
    PREDEFINED_ENTITIES.contains(&name)
}

/// A character reference must name a code point XML allows in content.
fn is_valid_char_ref(digits: &str, radix: u32) -> bool {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return false;
    }
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .is_some_and(|c| is_xml_char(c) && !matches!(c, '\u{fffe}' | '\u{ffff}'))
}
