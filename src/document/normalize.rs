//! Whitespace collapsing and case folding for extracted document text.

/// Collapse every whitespace run to a single space, trim both ends and
/// lower-case every character.
///
/// ```
/// use doc_qa::document::normalize;
///
/// assert_eq!(normalize("  Pakistan\n\tIS  a Country "), "pakistan is a country");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for word in raw.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Letters with simple case mappings, digits, punctuation and a mix of
    /// ASCII and Unicode whitespace.
    const TEXT: &str = "[a-zA-Z0-9À-ÖØ-öø-ÿΑ-Ωα-ωА-Яа-я.,;:!?'()-]|[ \t\n\r\u{a0}\u{2003}\u{3000}]";

    fn assert_normalized(s: &str) {
        assert_eq!(s.trim(), s, "leading/trailing whitespace in {s:?}");
        let chars: Vec<char> = s.chars().collect();
        for pair in chars.windows(2) {
            assert!(
                !(pair[0].is_whitespace() && pair[1].is_whitespace()),
                "double whitespace in {s:?}"
            );
        }
        assert!(!s.chars().any(char::is_uppercase), "uppercase in {s:?}");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t "), "");
    }

    #[test]
    fn collapses_mixed_whitespace_runs() {
        assert_eq!(normalize("a \t\n\r b"), "a b");
        assert_eq!(normalize("a\u{00a0}\u{2003}b"), "a b");
    }

    #[test]
    fn lowercases_non_ascii() {
        assert_eq!(normalize("ÉCOLE Straße"), "école straße");
    }

    #[test]
    fn output_has_normal_form_for_varied_inputs() {
        let inputs = [
            "Hello   World",
            "\n\nLeading and trailing\n\n",
            "MiXeD\tCase\u{3000}Ideographic space",
            "İstanbul",
            "line one\r\nline two\r\n",
            "ΣΊΣΥΦΟΣ",
        ];
        for input in inputs {
            assert_normalized(&normalize(input));
        }
    }

    #[test]
    fn idempotent() {
        let inputs = ["  A  b\tC ", "ÀÉÎ õü", "already normal", "İ"];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    proptest! {
        #[test]
        fn any_text_is_trimmed_and_single_spaced(raw in "\\PC*") {
            let out = normalize(&raw);
            prop_assert_eq!(out.trim(), out.as_str());
            prop_assert!(!out.contains("  "));
            prop_assert!(out.chars().all(|c| c == ' ' || !c.is_whitespace()));
        }

        #[test]
        fn document_text_reaches_normal_form(
            raw in proptest::collection::vec(TEXT, 0..80).prop_map(|parts| parts.concat())
        ) {
            let out = normalize(&raw);
            assert_normalized(&out);
            prop_assert_eq!(normalize(&out), out);
        }
    }
}
