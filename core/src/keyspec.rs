//! The key-spec mini-language.
//!
//! A key spec describes one key's label, output and code in a single string:
//!
//! - `a` - label "a", code 'a'
//! - `qu` - label "qu", emits the output text "qu"
//! - `.|,` - label ".", but a single-code-point output becomes the code ','
//! - `abc|xyz` - label "abc", output text "xyz"
//! - `!|!code/shift` - label "!", explicit action code
//!
//! `|` separates the label from the output text or `!code/` marker, and `\`
//! escapes the following character (including `,` and `|`). More-keys popup
//! definitions are comma-separated lists of such specs; see
//! [`split_key_specs`].

use thiserror::Error;

use crate::casing;
use crate::codes;

const COMMA: char = ',';
const BACKSLASH: char = '\\';
const VERTICAL_BAR: char = '|';
const PREFIX_CODE: &str = "!code/";
const PREFIX_HEX: &str = "0x";

/// A malformed key spec. Fatal for the single key being built; sibling keys
/// in the same layout are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeySpecError {
    #[error("empty key spec")]
    EmptySpec,
    #[error("empty label in key spec {0:?}")]
    EmptyLabel(String),
    #[error("empty output text in key spec {0:?}")]
    EmptyOutputText(String),
    #[error("unknown key code name {0:?}")]
    UnknownCodeName(String),
    #[error("malformed key code {0:?}")]
    MalformedCode(String),
}

/// Byte index of the first unescaped `|`, if any.
fn index_of_label_end(spec: &str) -> Option<usize> {
    let mut skip = false;
    for (i, ch) in spec.char_indices() {
        if skip {
            skip = false;
            continue;
        }
        if ch == BACKSLASH {
            skip = true;
        } else if ch == VERTICAL_BAR {
            return Some(i);
        }
    }
    None
}

/// Strip escape characters, keeping the escaped characters literal.
fn parse_escape(text: &str) -> String {
    if !text.contains(BACKSLASH) {
        return text.to_string();
    }
    let mut parsed = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == BACKSLASH {
            if let Some(escaped) = chars.next() {
                parsed.push(escaped);
            }
        } else {
            parsed.push(ch);
        }
    }
    parsed
}

fn before_label_end(spec: &str) -> &str {
    match index_of_label_end(spec) {
        Some(end) => &spec[..end],
        None => spec,
    }
}

/// The raw (escape-stripped) text after the label separator, or None when the
/// spec has no output part.
fn output_text_internal(spec: &str) -> Option<String> {
    match index_of_label_end(spec) {
        Some(end) if end > 0 => Some(parse_escape(&spec[end + VERTICAL_BAR.len_utf8()..])),
        _ => None,
    }
}

fn has_code(spec: &str) -> bool {
    match index_of_label_end(spec) {
        Some(end) if end > 0 => spec[end + VERTICAL_BAR.len_utf8()..].starts_with(PREFIX_CODE),
        _ => false,
    }
}

fn code_point_count(text: &str) -> usize {
    text.chars().count()
}

/// The display label of a spec. Labels are mandatory; an empty one is an
/// error for the key being built.
pub fn get_label(spec: &str) -> Result<String, KeySpecError> {
    if spec.is_empty() {
        return Err(KeySpecError::EmptySpec);
    }
    let label = parse_escape(before_label_end(spec));
    if label.is_empty() {
        return Err(KeySpecError::EmptyLabel(spec.to_string()));
    }
    Ok(label)
}

/// The output text of a spec, if it has one.
///
/// A single-code-point output is not output text at all: it becomes the
/// key's code instead (see [`get_code`]), so this returns `None` for it.
/// A multi-code-point label with no explicit output doubles as the output.
pub fn get_output_text(spec: &str) -> Result<Option<String>, KeySpecError> {
    if spec.is_empty() {
        return Err(KeySpecError::EmptySpec);
    }
    if has_code(spec) {
        return Ok(None);
    }
    if let Some(output) = output_text_internal(spec) {
        if code_point_count(&output) == 1 {
            return Ok(None);
        }
        if output.is_empty() {
            return Err(KeySpecError::EmptyOutputText(spec.to_string()));
        }
        return Ok(Some(output));
    }
    let label = get_label(spec)?;
    if code_point_count(&label) == 1 {
        Ok(None)
    } else {
        Ok(Some(label))
    }
}

/// The key code of a spec.
///
/// Resolution order: an explicit `!code/` marker, then a single-code-point
/// output text, then a single-code-point label; anything longer collapses to
/// `CODE_OUTPUT_TEXT`.
pub fn get_code(spec: &str) -> Result<i32, KeySpecError> {
    if spec.is_empty() {
        return Err(KeySpecError::EmptySpec);
    }
    if let Some(end) = index_of_label_end(spec) {
        let after_label = &spec[end + VERTICAL_BAR.len_utf8()..];
        if end > 0 && after_label.starts_with(PREFIX_CODE) {
            return parse_code(after_label);
        }
    }
    if let Some(output) = output_text_internal(spec) {
        if !output.is_empty() {
            return Ok(if code_point_count(&output) == 1 {
                output.chars().next().unwrap() as i32
            } else {
                codes::CODE_OUTPUT_TEXT
            });
        }
    }
    let label = get_label(spec)?;
    Ok(if code_point_count(&label) == 1 {
        label.chars().next().unwrap() as i32
    } else {
        codes::CODE_OUTPUT_TEXT
    })
}

/// Parse an explicit code marker: `!code/0x2c`, `!code/44` or a symbolic
/// name like `!code/delete`.
pub fn parse_code(text: &str) -> Result<i32, KeySpecError> {
    let value = text
        .strip_prefix(PREFIX_CODE)
        .ok_or_else(|| KeySpecError::MalformedCode(text.to_string()))?;
    if let Some(hex) = value.strip_prefix(PREFIX_HEX) {
        return i32::from_str_radix(hex, 16)
            .map_err(|_| KeySpecError::MalformedCode(text.to_string()));
    }
    if let Ok(code) = value.parse::<i32>() {
        return Ok(code);
    }
    match value {
        "enter" => Ok(codes::CODE_ENTER),
        "tab" => Ok(codes::CODE_TAB),
        "space" => Ok(codes::CODE_SPACE),
        "shift" => Ok(codes::CODE_SHIFT),
        "switch_alpha_symbol" => Ok(codes::CODE_SWITCH_ALPHA_SYMBOL),
        "output_text" => Ok(codes::CODE_OUTPUT_TEXT),
        "delete" => Ok(codes::CODE_DELETE),
        "settings" => Ok(codes::CODE_SETTINGS),
        "language_switch" => Ok(codes::CODE_LANGUAGE_SWITCH),
        "shift_enter" => Ok(codes::CODE_SHIFT_ENTER),
        "unspecified" => Ok(codes::CODE_UNSPECIFIED),
        _ => Err(KeySpecError::UnknownCodeName(value.to_string())),
    }
}

/// Split a comma-separated list of key specs into its components.
///
/// `\,` is preserved as a literal comma in the component; every other escape
/// sequence is kept untouched for the per-spec parser. Empty components
/// (leading, trailing or doubled commas) are dropped, and an input with no
/// components at all yields `None`.
pub fn split_key_specs(text: &str) -> Option<Vec<String>> {
    if text.is_empty() {
        return None;
    }
    // Fast path for a one-character list.
    let mut chars = text.chars();
    let first = chars.next()?;
    if chars.next().is_none() {
        return if first == COMMA {
            None
        } else {
            Some(vec![text.to_string()])
        };
    }

    let mut specs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == COMMA {
            if !current.is_empty() {
                specs.push(std::mem::take(&mut current));
            }
        } else if ch == BACKSLASH {
            match chars.next() {
                Some(escaped) if escaped == COMMA => current.push(COMMA),
                Some(escaped) => {
                    current.push(BACKSLASH);
                    current.push(escaped);
                }
                None => current.push(BACKSLASH),
            }
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        specs.push(current);
    }
    if specs.is_empty() {
        None
    } else {
        Some(specs)
    }
}

/// One parsed more-key (popup key) specification.
///
/// The label and output are title-cased up front when the owning keyboard is
/// in a shifted mode, so the popup contents match the base key's case. When
/// upcasing turns a single-code-point key into a multi-code-point string
/// (German sharp-S), the code degrades to `CODE_OUTPUT_TEXT` and the label
/// doubles as the output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MoreKeySpec {
    pub code: i32,
    pub label: String,
    pub output_text: Option<String>,
}

impl MoreKeySpec {
    pub fn new(spec: &str, needs_upper_case: bool, locale: &str) -> Result<Self, KeySpecError> {
        if spec.is_empty() {
            return Err(KeySpecError::EmptySpec);
        }
        let raw_label = get_label(spec)?;
        let label = if needs_upper_case {
            casing::to_title_case_of_key_label(&raw_label, locale)
        } else {
            raw_label
        };
        let code_in_spec = get_code(spec)?;
        let code = if needs_upper_case {
            casing::to_title_case_of_key_code(code_in_spec, locale)
        } else {
            code_in_spec
        };
        if code == codes::CODE_UNSPECIFIED {
            // The upcased form of the code needs more than one code point
            // (e.g. sharp-S), so the key has to emit its label as text.
            return Ok(Self {
                code: codes::CODE_OUTPUT_TEXT,
                output_text: Some(label.clone()),
                label,
            });
        }
        let raw_output = get_output_text(spec)?;
        let output_text = if needs_upper_case {
            raw_output.map(|text| casing::to_title_case_of_key_label(&text, locale))
        } else {
            raw_output
        };
        Ok(Self {
            code,
            label,
            output_text,
        })
    }
}
