//! Property-based tests for the escaping rules.
//!
//! Uses proptest to check that no generated text can end a script element
//! early and that data blobs survive the escape unchanged.

use proptest::prelude::*;
use tv_page::escape::{
    escape_script_text, guard_inline_script, js_string, neutralize_raw_text_tags,
    unescape_script_text,
};

/// Text biased toward the sequences that matter inside `<script>`.
fn hostile_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("</script>".to_string()),
            Just("</SCRIPT".to_string()),
            Just("<!--".to_string()),
            Just("<style>".to_string()),
            Just("\\".to_string()),
            Just("\\/".to_string()),
            "[a-z<>/!\\\\ ]{0,6}",
        ],
        0..12,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Escaped blobs never contain a close-tag or comment opener.
    #[test]
    fn prop_script_text_is_inert(s in hostile_text()) {
        let escaped = escape_script_text(&s);
        prop_assert!(!escaped.contains("</"));
        prop_assert!(!escaped.contains("<!--"));
    }

    /// The in-page unescape restores the original blob.
    #[test]
    fn prop_script_text_round_trips(s in hostile_text()) {
        prop_assert_eq!(unescape_script_text(&escape_script_text(&s)), s);
    }

    /// JS string literals parse back to the original text.
    #[test]
    fn prop_js_string_round_trips(s in hostile_text()) {
        let literal = js_string(&s);
        prop_assert!(!literal.contains("</"));
        let back: String = serde_json::from_str(&literal).unwrap();
        prop_assert_eq!(back, s);
    }

    #[test]
    fn prop_guarded_script_has_no_close_tag(s in hostile_text()) {
        prop_assert!(!guard_inline_script(&s).contains("</"));
    }

    /// Neutralized HTML opens and closes no script or style element.
    #[test]
    fn prop_neutralized_html_has_no_raw_text_tags(s in hostile_text()) {
        let lower = neutralize_raw_text_tags(&s).to_ascii_lowercase();
        prop_assert!(!lower.contains("<script"));
        prop_assert!(!lower.contains("</script"));
        prop_assert!(!lower.contains("<style"));
        prop_assert!(!lower.contains("</style"));
    }
}
