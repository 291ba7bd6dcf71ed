//! Locale-aware case folding for key labels and key codes.
//!
//! Key labels are short (usually one code point), so "title case" here means
//! uppercasing the whole label. A single code point may expand to several
//! when uppercased (German sharp-S becomes "SS"); callers that need a single
//! code point must fall back to emitting the label as output text.

use crate::codes;

/// Title-case a key label using the given BCP-47 locale tag.
///
/// Turkic locales map dotless/dotted i pairs specially: `i` uppercases to
/// `İ` (U+0130) instead of `I`.
pub fn to_title_case_of_key_label(label: &str, locale: &str) -> String {
    if is_turkic(locale) {
        let mut upper = String::with_capacity(label.len());
        for ch in label.chars() {
            if ch == 'i' {
                upper.push('\u{0130}');
            } else {
                upper.extend(ch.to_uppercase());
            }
        }
        return upper;
    }
    label.chars().flat_map(char::to_uppercase).collect()
}

/// Title-case a single key code.
///
/// Action codes (negative) pass through unchanged. A letter code whose
/// uppercase form is more than one code point cannot be represented as a
/// code at all and yields `CODE_UNSPECIFIED`; the caller is expected to
/// switch the key to output-text mode.
pub fn to_title_case_of_key_code(code: i32, locale: &str) -> i32 {
    if !codes::is_letter_code(code) {
        return code;
    }
    let Some(ch) = char::from_u32(code as u32) else {
        return code;
    };
    let upper = to_title_case_of_key_label(&ch.to_string(), locale);
    let mut cps = upper.chars();
    match (cps.next(), cps.next()) {
        (Some(first), None) => first as i32,
        _ => codes::CODE_UNSPECIFIED,
    }
}

fn is_turkic(locale: &str) -> bool {
    let lang = locale
        .split(|c| c == '-' || c == '_')
        .next()
        .unwrap_or(locale);
    lang.eq_ignore_ascii_case("tr") || lang.eq_ignore_ascii_case("az")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_label_uppercase() {
        assert_eq!(to_title_case_of_key_label("a", "en"), "A");
        assert_eq!(to_title_case_of_key_label("qu", "en"), "QU");
    }

    #[test]
    fn test_sharp_s_expands() {
        assert_eq!(to_title_case_of_key_label("\u{00DF}", "de"), "SS");
    }

    #[test]
    fn test_turkic_dotted_i() {
        assert_eq!(to_title_case_of_key_label("i", "tr"), "\u{0130}");
        assert_eq!(to_title_case_of_key_label("i", "az_AZ"), "\u{0130}");
        assert_eq!(to_title_case_of_key_label("i", "en"), "I");
        // Dotless i uppercases to plain I everywhere.
        assert_eq!(to_title_case_of_key_label("\u{0131}", "tr"), "I");
    }

    #[test]
    fn test_key_code_upcase() {
        assert_eq!(to_title_case_of_key_code('a' as i32, "en"), 'A' as i32);
        assert_eq!(to_title_case_of_key_code(codes::CODE_DELETE, "en"), codes::CODE_DELETE);
        // Sharp-S cannot stay a single code point.
        assert_eq!(
            to_title_case_of_key_code(0x00DF, "de"),
            codes::CODE_UNSPECIFIED
        );
    }
}
