//! Escaping for every context user text can land in.
//!
//! - [`html_escape`]: element text and attribute values
//! - [`js_string`] / [`js_value`]: literals inside inline `<script>` code
//! - [`escape_script_text`]: data blobs inside `<script type="text/plain">`;
//!   reversible with [`unescape_script_text`] (the in-page loader applies the
//!   same rule with `/\\([\\/!])/g`)
//! - [`guard_inline_script`]: element script code before it is inlined
//! - [`neutralize_raw_text_tags`]: caller-authored HTML fragments

/// Escape text for HTML element content and quoted attribute values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Encode a string as a JavaScript string literal safe inside `<script>`.
pub fn js_string(s: &str) -> String {
    js_value(&serde_json::Value::String(s.to_string()))
}

/// Encode a JSON value as a JavaScript expression safe inside `<script>`.
///
/// `<` only occurs inside JSON strings, where `<` is an equivalent escape,
/// so no `</script` or `<!--` can survive.
pub fn js_value(value: &serde_json::Value) -> String {
    value.to_string().replace('<', "\\u003c")
}

/// Escape a data blob so it cannot end the `<script>` element holding it.
///
/// `\` doubles, then `</` becomes `<\/` and `<!--` becomes `<\!--`.
pub fn escape_script_text(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace("</", "<\\/")
        .replace("<!--", "<\\!--")
}

/// Invert [`escape_script_text`].
pub fn unescape_script_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(&next) = chars.peek() {
                if matches!(next, '\\' | '/' | '!') {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(ch);
    }
    out
}

/// Break `</` and `<!--` in inline script code.
///
/// Both only occur inside JS string or regex literals, where `<\/` and
/// `<\!--` mean the same thing.
pub fn guard_inline_script(js: &str) -> String {
    js.replace("</", "<\\/").replace("<!--", "<\\!--")
}

const RAW_TEXT_TAGS: [&str; 2] = ["script", "style"];

/// Entity-escape the `<` of every `<script`, `</script`, `<style` and
/// `</style` tag (any case), leaving other markup intact.
pub fn neutralize_raw_text_tags(html: &str) -> String {
    let bytes = html.as_bytes();
    let mut out = String::with_capacity(html.len());
    let mut last = 0;

    for (i, _) in html.match_indices('<') {
        let rest = &bytes[i + 1..];
        let rest = rest.strip_prefix(b"/").unwrap_or(rest);
        let is_raw_text = RAW_TEXT_TAGS.iter().any(|tag| {
            rest.len() >= tag.len() && rest[..tag.len()].eq_ignore_ascii_case(tag.as_bytes())
        });
        if is_raw_text {
            out.push_str(&html[last..i]);
            out.push_str("&lt;");
            last = i + 1;
        }
    }
    out.push_str(&html[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape(r#""quoted""#), "&quot;quoted&quot;");
    }

    #[test]
    fn test_js_string_breaks_close_tags() {
        let lit = js_string("x</script><!--y");
        assert!(!lit.contains("</"));
        assert!(!lit.contains("<!--"));
        let back: String = serde_json::from_str(&lit).unwrap();
        assert_eq!(back, "x</script><!--y");
    }

    #[test]
    fn test_script_text_round_trip() {
        let cases = [
            "plain",
            "a</script>b",
            "<!-- comment -->",
            r"back\slash \/ \! \\",
            "</SCRIPT",
            "",
        ];
        for case in cases {
            let escaped = escape_script_text(case);
            assert!(!escaped.contains("</"), "{}", escaped);
            assert!(!escaped.contains("<!--"), "{}", escaped);
            assert_eq!(unescape_script_text(&escaped), case);
        }
    }

    #[test]
    fn test_guard_inline_script() {
        assert_eq!(
            guard_inline_script("var s = '</script><!--';"),
            "var s = '<\\/script><\\!--';"
        );
    }

    #[test]
    fn test_neutralize_raw_text_tags() {
        let html = r#"<p>ok</p><SCRIPT src="x"></script><style>p{}</Style><span>s</span>"#;
        let out = neutralize_raw_text_tags(html);
        assert_eq!(
            out,
            r#"<p>ok</p>&lt;SCRIPT src="x">&lt;/script>&lt;style>p{}&lt;/Style><span>s</span>"#
        );
    }

    #[test]
    fn test_neutralize_handles_trailing_angle() {
        assert_eq!(neutralize_raw_text_tags("a <"), "a <");
        assert_eq!(neutralize_raw_text_tags("</scr"), "</scr");
    }
}
