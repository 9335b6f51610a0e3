//! Response extraction: recover one JSON object from raw provider text.
//!
//! Repairs are applied only when the unfenced text does not already decode, and in a
//! fixed order. Value repairs never touch the inside of string literals. Anything still
//! undecodable is reported as [`MalformedOutput`].

use crate::error::MalformedOutput;
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z]*[ \t]*\r?\n?").unwrap());
static SIGNED_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(:\s*)\+(\d)").unwrap());
static DOUBLED_QUOTE_COLON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([^"\s])""+(\s*):"#).unwrap());
static DOUBLED_COLON: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""(\s*):\s*:"#).unwrap());
static BARE_WORD_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(:\s*)([A-Za-z_][A-Za-z0-9_\-]*)(\s*[,}\]\r\n])"#).unwrap()
});

/// Strip formatting fences and slice to the outermost braces.
pub fn strip_fences(raw: &str) -> String {
    let mut text = raw.trim();
    text = FENCE_OPEN.find(text).map_or(text, |m| &text[m.end()..]);
    text = text.strip_suffix("```").unwrap_or(text).trim();

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => text[start..=end].to_string(),
        _ => text.to_string(),
    }
}

/// Apply the syntactic repairs, in order.
///
/// Quote-structure repairs run over the whole text first so string literals pair up;
/// the value repairs then only see text outside string literals.
pub fn repair(candidate: &str) -> String {
    let text = DOUBLED_QUOTE_COLON.replace_all(candidate, "${1}\"${2}:");
    let text = DOUBLED_COLON.replace_all(&text, "\"${1}:");
    outside_strings(&text, |segment| {
        let segment = SIGNED_NUMBER.replace_all(segment, "${1}${2}");
        BARE_WORD_VALUE
            .replace_all(&segment, |caps: &Captures| {
                let word = &caps[2];
                if matches!(word, "true" | "false" | "null") {
                    caps[0].to_string()
                } else {
                    format!("{}\"{}\"{}", &caps[1], word, &caps[3])
                }
            })
            .into_owned()
    })
}

/// Rewrite the text between string literals with `f`; literals are copied verbatim.
fn outside_strings(text: &str, f: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                out.push_str(&text[start..=i]);
                start = i + 1;
                in_string = false;
            }
        } else if c == '"' {
            out.push_str(&f(&text[start..i]));
            start = i;
            in_string = true;
        }
    }
    if in_string {
        out.push_str(&text[start..]);
    } else {
        out.push_str(&f(&text[start..]));
    }
    out
}

/// Candidate JSON text for `raw`.
pub fn extract(raw: &str) -> String {
    let candidate = strip_fences(raw);
    if serde_json::from_str::<Value>(&candidate).is_ok() {
        candidate
    } else {
        repair(&candidate)
    }
}

/// Decode `raw` into a JSON object.
pub fn decode(raw: &str) -> Result<Value, MalformedOutput> {
    if raw.trim().is_empty() {
        return Err(MalformedOutput::new("empty output"));
    }
    let candidate = extract(raw);
    let value: Value = serde_json::from_str(&candidate)
        .map_err(|e| MalformedOutput::new(format!("invalid JSON after repair: {}", e)))?;
    if !value.is_object() {
        return Err(MalformedOutput::new("top-level value is not an object"));
    }
    Ok(value)
}
