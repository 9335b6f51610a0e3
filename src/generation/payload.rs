//! Turn payload types.
//!
//! Wire names are fixed by the game client; field order follows the JSON the client expects.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Named integer stats (`energy`, `chill`, `progress`, ...)
pub type PlayerState = BTreeMap<String, i64>;

/// Which kind of turn is being produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Initial,
    Continuation,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Initial => "initial",
            RequestKind::Continuation => "continuation",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default)]
    pub effects: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub company_type: String,
    pub culture: String,
    pub atmosphere: String,
    #[serde(default)]
    pub special_rules: Vec<String>,
    #[serde(default)]
    pub magical_elements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub id: String,
    pub name: String,
    pub role: String,
    pub personality: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attitude_toward_player: Option<Value>,
    #[serde(default)]
    pub secrets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameMeta {
    #[serde(default)]
    pub company_type: String,
    #[serde(default)]
    pub style_type: String,
    #[serde(default)]
    pub magical_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_used: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagicalElement {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub description: String,
    pub effect: String,
}

/// Opening turn: world setup plus the first choices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialTurn {
    pub game_meta: GameMeta,
    pub company_info: CompanyInfo,
    pub npcs: Vec<Npc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_magical_element: Option<MagicalElement>,
    pub player_state: PlayerState,
    pub story_context: String,
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npc_updates: Option<Value>,
    #[serde(default)]
    pub is_game_over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_over_reason: Option<String>,
}

/// Any later turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuationTurn {
    pub story_context: String,
    pub choices: Vec<Choice>,
    pub player_state: PlayerState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npc_updates: Option<Value>,
    #[serde(default)]
    pub is_game_over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_over_reason: Option<String>,
}

/// Turn content handed back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerationPayload {
    Initial(InitialTurn),
    Continuation(ContinuationTurn),
}

impl GenerationPayload {
    /// Convert a decoded JSON object into the typed payload for `kind`.
    pub fn from_value(kind: RequestKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            RequestKind::Initial => GenerationPayload::Initial(serde_json::from_value(value)?),
            RequestKind::Continuation => {
                GenerationPayload::Continuation(serde_json::from_value(value)?)
            }
        })
    }

    pub fn to_value(&self) -> Value {
        // Serializing plain maps, strings and integers cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            GenerationPayload::Initial(_) => RequestKind::Initial,
            GenerationPayload::Continuation(_) => RequestKind::Continuation,
        }
    }

    pub fn story_context(&self) -> &str {
        match self {
            GenerationPayload::Initial(turn) => &turn.story_context,
            GenerationPayload::Continuation(turn) => &turn.story_context,
        }
    }

    pub fn choices(&self) -> &[Choice] {
        match self {
            GenerationPayload::Initial(turn) => &turn.choices,
            GenerationPayload::Continuation(turn) => &turn.choices,
        }
    }

    pub fn player_state(&self) -> &PlayerState {
        match self {
            GenerationPayload::Initial(turn) => &turn.player_state,
            GenerationPayload::Continuation(turn) => &turn.player_state,
        }
    }

    pub fn is_game_over(&self) -> bool {
        match self {
            GenerationPayload::Initial(turn) => turn.is_game_over,
            GenerationPayload::Continuation(turn) => turn.is_game_over,
        }
    }

    pub fn game_over_reason(&self) -> Option<&str> {
        match self {
            GenerationPayload::Initial(turn) => turn.game_over_reason.as_deref(),
            GenerationPayload::Continuation(turn) => turn.game_over_reason.as_deref(),
        }
    }

    pub fn find_choice(&self, id_or_text: &str) -> Option<&Choice> {
        self.choices()
            .iter()
            .find(|c| c.id == id_or_text)
            .or_else(|| self.choices().iter().find(|c| c.text == id_or_text))
    }
}
