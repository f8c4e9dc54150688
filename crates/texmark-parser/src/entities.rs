//! HTML entity and backslash-escape decoding

use std::collections::HashMap;
use std::sync::LazyLock;

/// Named entities, keyed without the surrounding `&` and `;`
static HTML_ENTITIES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    // Markup
    m.insert("amp", "&");
    m.insert("lt", "<");
    m.insert("gt", ">");
    m.insert("quot", "\"");
    m.insert("apos", "'");
    m.insert("nbsp", "\u{a0}");
    // Copyright, trademark, registered
    m.insert("copy", "©");
    m.insert("trade", "™");
    m.insert("reg", "®");
    // Dashes and spaces
    m.insert("mdash", "—");
    m.insert("ndash", "–");
    m.insert("hellip", "…");
    m.insert("ensp", "\u{2002}");
    m.insert("emsp", "\u{2003}");
    m.insert("thinsp", "\u{2009}");
    // Arrows
    m.insert("larr", "←");
    m.insert("rarr", "→");
    m.insert("uarr", "↑");
    m.insert("darr", "↓");
    m.insert("harr", "↔");
    m.insert("rArr", "⇒");
    m.insert("lArr", "⇐");
    // Math
    m.insert("times", "×");
    m.insert("divide", "÷");
    m.insert("plusmn", "±");
    m.insert("minus", "−");
    m.insert("ne", "≠");
    m.insert("le", "≤");
    m.insert("ge", "≥");
    m.insert("infin", "∞");
    m.insert("sum", "∑");
    m.insert("prod", "∏");
    m.insert("radic", "√");
    m.insert("part", "∂");
    m.insert("int", "∫");
    m.insert("asymp", "≈");
    m.insert("equiv", "≡");
    m.insert("forall", "∀");
    m.insert("exist", "∃");
    m.insert("isin", "∈");
    m.insert("empty", "∅");
    m.insert("nabla", "∇");
    // Greek
    m.insert("alpha", "α");
    m.insert("beta", "β");
    m.insert("gamma", "γ");
    m.insert("delta", "δ");
    m.insert("epsilon", "ε");
    m.insert("theta", "θ");
    m.insert("lambda", "λ");
    m.insert("mu", "μ");
    m.insert("pi", "π");
    m.insert("sigma", "σ");
    m.insert("phi", "φ");
    m.insert("omega", "ω");
    m.insert("Delta", "Δ");
    m.insert("Sigma", "Σ");
    m.insert("Omega", "Ω");
    // Currency
    m.insert("euro", "€");
    m.insert("pound", "£");
    m.insert("yen", "¥");
    m.insert("cent", "¢");
    // Other common
    m.insert("deg", "°");
    m.insert("para", "¶");
    m.insert("sect", "§");
    m.insert("bull", "•");
    m.insert("middot", "·");
    m.insert("laquo", "«");
    m.insert("raquo", "»");
    m.insert("ldquo", "“");
    m.insert("rdquo", "”");
    m.insert("lsquo", "‘");
    m.insert("rsquo", "’");
    m.insert("dagger", "†");
    m.insert("Dagger", "‡");
    m.insert("permil", "‰");
    m.insert("prime", "′");
    m.insert("Prime", "″");
    m.insert("auml", "ä");
    m.insert("ouml", "ö");
    m.insert("uuml", "ü");
    m.insert("szlig", "ß");
    m.insert("eacute", "é");
    m.insert("egrave", "è");
    m
});

/// Decode one complete reference such as `&amp;`, `&#169;` or `&#xA9;`.
///
/// Unknown names yield `None`; invalid or zero code points decode to
/// U+FFFD.
pub fn decode_entity(reference: &str) -> Option<String> {
    let body = reference.strip_prefix('&')?.strip_suffix(';')?;

    if let Some(num) = body.strip_prefix('#') {
        let codepoint = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => num.parse::<u32>().ok(),
        }?;
        let c = match codepoint {
            0 => char::REPLACEMENT_CHARACTER,
            cp => char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER),
        };
        return Some(c.to_string());
    }

    HTML_ENTITIES.get(body).map(|s| s.to_string())
}

/// Resolve backslash escapes and entity references, as needed for link
/// destinations and titles.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(idx) = rest.find(['\\', '&']) {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];

        if let Some(after) = rest.strip_prefix('\\') {
            match after.chars().next() {
                Some(c) if c.is_ascii_punctuation() => {
                    out.push(c);
                    rest = &after[1..];
                }
                _ => {
                    out.push('\\');
                    rest = after;
                }
            }
            continue;
        }

        let decoded = crate::scanners::entity(rest)
            .and_then(|len| decode_entity(&rest[..len]).map(|s| (s, len)));
        match decoded {
            Some((s, len)) => {
                out.push_str(&s);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
