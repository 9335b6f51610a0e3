//! Content Contract
//!
//! Structural and quality checks applied to decoded provider output before it may be
//! used. Checks run on the untyped JSON so a missing field is reported by name rather
//! than as a decode error; the value is converted to the typed payload only after it
//! passes. Any violation fails the whole payload.

use crate::generation::payload::{GenerationPayload, RequestKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

/// `[validator]` configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    #[serde(default = "default_min_choices")]
    pub min_choices: usize,
    #[serde(default = "default_max_choices")]
    pub max_choices: usize,
    #[serde(default = "default_min_npcs")]
    pub min_npcs: usize,
    #[serde(default = "default_max_npcs")]
    pub max_npcs: usize,
    /// Stats every `player_state` must carry
    #[serde(default = "default_required_stats")]
    pub required_stats: Vec<String>,
    /// Case-insensitive; matched by containment in labels and names
    #[serde(default = "default_disallowed_terms")]
    pub disallowed_terms: Vec<String>,
}

fn default_min_choices() -> usize {
    3
}

fn default_max_choices() -> usize {
    6
}

fn default_min_npcs() -> usize {
    3
}

fn default_max_npcs() -> usize {
    10
}

pub(crate) fn default_required_stats() -> Vec<String> {
    ["energy", "chill", "progress", "suspicion", "connection", "blackmail"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_disallowed_terms() -> Vec<String> {
    [
        "politics",
        "political",
        "government",
        "election",
        "chairman",
        "president",
        "政治",
        "政府",
        "政党",
        "选举",
        "主席",
        "总统",
        "政治局",
        "常委",
        "人大",
        "政协",
        "中纪委",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_choices: default_min_choices(),
            max_choices: default_max_choices(),
            min_npcs: default_min_npcs(),
            max_npcs: default_max_npcs(),
            required_stats: default_required_stats(),
            disallowed_terms: default_disallowed_terms(),
        }
    }
}

impl ValidatorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_choices == 0 || self.min_choices > self.max_choices {
            return Err(format!(
                "choice bounds must satisfy 0 < min <= max, got [{}, {}]",
                self.min_choices, self.max_choices
            ));
        }
        if self.min_npcs > self.max_npcs {
            return Err(format!(
                "npc bounds must satisfy min <= max, got [{}, {}]",
                self.min_npcs, self.max_npcs
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Missing,
    Type,
    Empty,
    Bounds,
    Duplicate,
    Disallowed,
    Schema,
}

/// One failed check, naming the offending field path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    fn new(field: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            ok: violations.is_empty(),
            violations,
        }
    }
}

/// A lowercased disallowed term. ASCII terms match whole words only; other scripts
/// have no word boundaries and match anywhere.
struct DisallowedTerm {
    term: String,
    word: Option<Regex>,
}

impl DisallowedTerm {
    fn new(term: String) -> Self {
        let word = if term.is_ascii() {
            Regex::new(&format!(r"\b{}\b", regex::escape(&term))).ok()
        } else {
            None
        };
        Self { term, word }
    }

    /// `lowered` must already be lowercased.
    fn is_in(&self, lowered: &str) -> bool {
        match &self.word {
            Some(pattern) => pattern.is_match(lowered),
            None => lowered.contains(self.term.as_str()),
        }
    }
}

pub struct ContentValidator {
    config: ValidatorConfig,
    disallowed: Vec<DisallowedTerm>,
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl ContentValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        let disallowed = config
            .disallowed_terms
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .map(DisallowedTerm::new)
            .collect();
        Self { config, disallowed }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Run every check against an untyped payload.
    pub fn validate(&self, value: &Value, kind: RequestKind) -> ValidationReport {
        let mut violations = Vec::new();
        match value.as_object() {
            Some(obj) => self.check_object(obj, kind, &mut violations),
            None => violations.push(Violation::new(
                "$",
                ViolationKind::Type,
                "payload must be a JSON object",
            )),
        }
        ValidationReport::from_violations(violations)
    }

    /// Validate a typed payload through the same rules.
    pub fn validate_payload(&self, payload: &GenerationPayload) -> ValidationReport {
        self.validate(&payload.to_value(), payload.kind())
    }

    /// Validate, then convert into the typed payload.
    pub fn accept(
        &self,
        value: Value,
        kind: RequestKind,
    ) -> Result<GenerationPayload, Vec<Violation>> {
        let report = self.validate(&value, kind);
        if !report.ok {
            warn!(
                kind = %kind,
                violations = ?report.violations.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
                "Payload failed content contract"
            );
            return Err(report.violations);
        }
        GenerationPayload::from_value(kind, value).map_err(|e| {
            vec![Violation::new(
                "$",
                ViolationKind::Schema,
                format!("payload does not match schema: {}", e),
            )]
        })
    }

    fn check_object(&self, obj: &Map<String, Value>, kind: RequestKind, out: &mut Vec<Violation>) {
        match obj.get("story_context") {
            None => out.push(missing("story_context")),
            Some(Value::String(s)) if s.trim().is_empty() => out.push(Violation::new(
                "story_context",
                ViolationKind::Empty,
                "story must not be blank",
            )),
            Some(Value::String(_)) => {}
            Some(_) => out.push(wrong_type("story_context", "string")),
        }

        self.check_choices(obj.get("choices"), out);
        self.check_player_state(obj.get("player_state"), out);

        if kind == RequestKind::Initial {
            self.check_company(obj.get("company_info"), out);
            self.check_npcs(obj.get("npcs"), out);
            match obj.get("game_meta") {
                None => out.push(missing("game_meta")),
                Some(Value::Object(_)) => {}
                Some(_) => out.push(wrong_type("game_meta", "object")),
            }
        }
    }

    fn check_choices(&self, choices: Option<&Value>, out: &mut Vec<Violation>) {
        let Some(choices) = choices else {
            out.push(missing("choices"));
            return;
        };
        let Some(choices) = choices.as_array() else {
            out.push(wrong_type("choices", "array"));
            return;
        };
        let (min, max) = (self.config.min_choices, self.config.max_choices);
        if choices.len() < min || choices.len() > max {
            out.push(Violation::new(
                "choices",
                ViolationKind::Bounds,
                format!("expected {}..={} choices, got {}", min, max, choices.len()),
            ));
        }

        for (i, choice) in choices.iter().enumerate() {
            let path = format!("choices[{}]", i);
            let Some(choice) = choice.as_object() else {
                out.push(wrong_type(&path, "object"));
                continue;
            };
            required_str(choice, "id", &path, out);
            if let Some(text) = required_str(choice, "text", &path, out) {
                self.check_disallowed(text, &format!("{}.text", path), out);
            }
            match choice.get("effects") {
                None => out.push(missing(&format!("{}.effects", path))),
                Some(Value::Object(effects)) => {
                    for (stat, delta) in effects {
                        if !delta.is_i64() {
                            out.push(wrong_type(&format!("{}.effects.{}", path, stat), "integer"));
                        }
                    }
                }
                Some(_) => out.push(wrong_type(&format!("{}.effects", path), "object")),
            }
        }
    }

    fn check_player_state(&self, state: Option<&Value>, out: &mut Vec<Violation>) {
        let Some(state) = state else {
            out.push(missing("player_state"));
            return;
        };
        let Some(state) = state.as_object() else {
            out.push(wrong_type("player_state", "object"));
            return;
        };
        if state.is_empty() {
            out.push(Violation::new(
                "player_state",
                ViolationKind::Empty,
                "player_state must not be empty",
            ));
            return;
        }
        for stat in &self.config.required_stats {
            if !state.contains_key(stat) {
                out.push(missing(&format!("player_state.{}", stat)));
            }
        }
        for (stat, value) in state {
            if !value.is_i64() {
                out.push(wrong_type(&format!("player_state.{}", stat), "integer"));
            }
        }
    }

    fn check_company(&self, company: Option<&Value>, out: &mut Vec<Violation>) {
        let Some(company) = company else {
            out.push(missing("company_info"));
            return;
        };
        let Some(company) = company.as_object() else {
            out.push(wrong_type("company_info", "object"));
            return;
        };
        if let Some(name) = required_str(company, "name", "company_info", out) {
            self.check_disallowed(name, "company_info.name", out);
        }
        for field in ["type", "culture", "atmosphere"] {
            required_str(company, field, "company_info", out);
        }
    }

    fn check_npcs(&self, npcs: Option<&Value>, out: &mut Vec<Violation>) {
        let Some(npcs) = npcs else {
            out.push(missing("npcs"));
            return;
        };
        let Some(npcs) = npcs.as_array() else {
            out.push(wrong_type("npcs", "array"));
            return;
        };
        let (min, max) = (self.config.min_npcs, self.config.max_npcs);
        if npcs.len() < min || npcs.len() > max {
            out.push(Violation::new(
                "npcs",
                ViolationKind::Bounds,
                format!("expected {}..={} npcs, got {}", min, max, npcs.len()),
            ));
        }

        let mut seen = HashSet::new();
        for (i, npc) in npcs.iter().enumerate() {
            let path = format!("npcs[{}]", i);
            let Some(npc) = npc.as_object() else {
                out.push(wrong_type(&path, "object"));
                continue;
            };
            if let Some(name) = required_str(npc, "name", &path, out) {
                let name_path = format!("{}.name", path);
                self.check_disallowed(name, &name_path, out);
                if !seen.insert(name.trim().to_lowercase()) {
                    out.push(Violation::new(
                        name_path,
                        ViolationKind::Duplicate,
                        format!("duplicate npc name '{}'", name),
                    ));
                }
            }
            for field in ["id", "role", "personality"] {
                required_str(npc, field, &path, out);
            }
        }
    }

    fn check_disallowed(&self, text: &str, path: &str, out: &mut Vec<Violation>) {
        let lowered = text.to_lowercase();
        if let Some(term) = self.disallowed.iter().find(|t| t.is_in(&lowered)) {
            out.push(Violation::new(
                path,
                ViolationKind::Disallowed,
                format!("contains disallowed term '{}'", term.term),
            ));
        }
    }
}

fn missing(field: &str) -> Violation {
    Violation::new(field, ViolationKind::Missing, "required field is missing")
}

fn wrong_type(field: &str, expected: &str) -> Violation {
    Violation::new(field, ViolationKind::Type, format!("expected {}", expected))
}

/// A present, non-blank string field, recording a violation otherwise.
fn required_str<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    parent: &str,
    out: &mut Vec<Violation>,
) -> Option<&'a str> {
    let path = format!("{}.{}", parent, key);
    match obj.get(key) {
        None => {
            out.push(missing(&path));
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            out.push(Violation::new(path, ViolationKind::Empty, "must not be blank"));
            None
        }
        Some(Value::String(s)) => Some(s),
        Some(_) => {
            out.push(wrong_type(&path, "string"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stats() -> Value {
        json!({"energy": 100, "chill": 50, "progress": 0, "suspicion": 0, "connection": 0, "blackmail": 0})
    }

    fn choices(n: usize) -> Value {
        Value::Array(
            (0..n)
                .map(|i| json!({"id": format!("c{i}"), "text": format!("Option {i}"), "effects": {"energy": -1}}))
                .collect(),
        )
    }

    fn npc(id: &str, name: &str) -> Value {
        json!({"id": id, "name": name, "role": "colleague", "personality": "quiet"})
    }

    fn initial() -> Value {
        json!({
            "game_meta": {"company_type": "startup"},
            "company_info": {"name": "Acme", "type": "startup", "culture": "fast", "atmosphere": "loud"},
            "npcs": [npc("n1", "Ann"), npc("n2", "Bo"), npc("n3", "Cy")],
            "player_state": stats(),
            "story_context": "Day one.",
            "choices": choices(3)
        })
    }

    fn fields(report: &ValidationReport) -> Vec<&str> {
        report.violations.iter().map(|v| v.field.as_str()).collect()
    }

    #[test]
    fn valid_initial_passes() {
        let report = ContentValidator::default().validate(&initial(), RequestKind::Initial);
        assert!(report.ok, "{:?}", report.violations);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn missing_fields_are_named() {
        let mut value = initial();
        value.as_object_mut().unwrap().remove("npcs");
        value["player_state"].as_object_mut().unwrap().remove("blackmail");
        let report = ContentValidator::default().validate(&value, RequestKind::Initial);
        assert!(!report.ok);
        assert!(fields(&report).contains(&"npcs"));
        assert!(fields(&report).contains(&"player_state.blackmail"));
    }

    #[test]
    fn continuation_ignores_initial_only_fields() {
        let value = json!({"story_context": "Later.", "choices": choices(4), "player_state": stats()});
        let validator = ContentValidator::default();
        assert!(validator.validate(&value, RequestKind::Continuation).ok);
        assert!(!validator.validate(&value, RequestKind::Initial).ok);
    }

    #[test]
    fn choice_bounds_are_enforced() {
        let validator = ContentValidator::default();
        for (n, ok) in [(2, false), (3, true), (6, true), (7, false)] {
            let value = json!({"story_context": "x", "choices": choices(n), "player_state": stats()});
            assert_eq!(validator.validate(&value, RequestKind::Continuation).ok, ok, "n={n}");
        }
    }

    #[test]
    fn non_integer_effects_fail() {
        let mut value = initial();
        value["choices"][1]["effects"]["energy"] = json!(2.5);
        let report = ContentValidator::default().validate(&value, RequestKind::Initial);
        assert_eq!(fields(&report), vec!["choices[1].effects.energy"]);
        assert_eq!(report.violations[0].kind, ViolationKind::Type);
    }

    #[test]
    fn duplicate_npc_names_fail() {
        let mut value = initial();
        value["npcs"][2] = npc("n3", "ann");
        let report = ContentValidator::default().validate(&value, RequestKind::Initial);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].kind, ViolationKind::Duplicate);
    }

    #[test]
    fn disallowed_terms_match_case_insensitively() {
        let mut value = initial();
        value["company_info"]["name"] = json!("Government Solutions Ltd");
        value["choices"][0]["text"] = json!("Talk POLITICS at lunch");
        value["npcs"][0]["name"] = json!("Chairman Meow");
        let report = ContentValidator::default().validate(&value, RequestKind::Initial);
        let kinds: Vec<_> = report.violations.iter().map(|v| v.kind).collect();
        assert_eq!(kinds, vec![ViolationKind::Disallowed; 3]);
    }

    #[test]
    fn english_terms_match_whole_words_only() {
        let validator = ContentValidator::default();
        let mut value = initial();
        value["choices"][0]["text"] = json!("Browse the snack selection");
        value["choices"][1]["text"] = json!("Ask about the reelection of the book club");
        assert!(validator.validate(&value, RequestKind::Initial).ok);

        value["choices"][2]["text"] = json!("Gossip about the election.");
        let report = validator.validate(&value, RequestKind::Initial);
        assert_eq!(fields(&report), vec!["choices[2].text"]);
    }

    #[test]
    fn cjk_terms_match_inside_text() {
        let validator = ContentValidator::new(ValidatorConfig {
            disallowed_terms: vec!["政治".to_string()],
            ..Default::default()
        });
        let mut value = initial();
        value["choices"][0]["text"] = json!("和同事聊政治话题");
        let report = validator.validate(&value, RequestKind::Initial);
        assert_eq!(report.violations[0].kind, ViolationKind::Disallowed);
    }

    #[test]
    fn blank_story_fails() {
        let mut value = initial();
        value["story_context"] = json!("   ");
        let report = ContentValidator::default().validate(&value, RequestKind::Initial);
        assert_eq!(fields(&report), vec!["story_context"]);
    }

    #[test]
    fn accept_converts_or_reports_schema() {
        let validator = ContentValidator::default();
        let payload = validator.accept(initial(), RequestKind::Initial).unwrap();
        assert_eq!(payload.kind(), RequestKind::Initial);
        assert!(validator.validate_payload(&payload).ok);

        let mut value = initial();
        value["npcs"][0]["secrets"] = json!("not a list");
        let violations = validator.accept(value, RequestKind::Initial).unwrap_err();
        assert_eq!(violations[0].kind, ViolationKind::Schema);
    }

    #[test]
    fn non_object_payload() {
        let report = ContentValidator::default().validate(&json!([1]), RequestKind::Continuation);
        assert_eq!(fields(&report), vec!["$"]);
    }
}
