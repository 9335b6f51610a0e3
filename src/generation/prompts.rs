//! Provider instructions for each request kind.

use crate::types::Seed;

pub const SYSTEM_PROMPT: &str = r#"You are the game master of an office-survival game about slacking off at work.

Rules:
- Core stats are integers: energy (0-100), chill (0-100), progress (0-100), suspicion (0-100), connection, blackmail.
- Suspicion reaching 100 gets the player fired. Energy reaching 0 means burnout.
- Every choice lists its stat effects as integers (no leading plus signs).
- Choice categories: work, slack, skill, social, growth. Offer 3 to 6 varied choices.
- Keep the tone humorous and satirical. No explicit, gory or political content.

Reply with exactly one JSON object and nothing else:
{
  "story_context": "what is happening now",
  "choices": [
    {"id": "lowercase_id", "text": "short label", "category": "work", "hint": "optional", "effects": {"energy": -10, "progress": 8}}
  ],
  "player_state": {"energy": 90, "chill": 50, "progress": 8, "suspicion": 0, "connection": 0, "blackmail": 0},
  "is_game_over": false
}"#;

pub const INITIAL_SHAPE: &str = r#"The opening turn must also include:
"game_meta": {"company_type", "style_type", "magical_level", "seed_used"},
"company_info": {"name", "type", "culture", "atmosphere", "special_rules": [], "magical_elements": [], "style"},
"npcs": 3 to 10 entries of {"id", "name", "role", "personality", "background", "appearance", "attitude_toward_player", "secrets": []},
and optionally "active_magical_element": {"type", "name", "description", "effect"}."#;

pub const SUMMARY_PROMPT: &str = "You summarize game transcripts. Condense the conversation into a short summary that keeps the key plot points, the player's main choices and the current state. It will be used to rebuild context later.";

pub fn initial_instruction(player_name: &str, difficulty: &str, seed: Seed) -> String {
    format!(
        "Create the opening turn of a new game.\n\nPlayer: {}\nDifficulty: {}\nSeed: {}\n\nUse the seed to invent a one-of-a-kind company: its type, characters, magical quirks and writing style are up to you.\n\n{}",
        player_name, difficulty, seed, INITIAL_SHAPE
    )
}

pub fn next_instruction(action: &str) -> String {
    format!(
        "The player chose: {}\nContinue the story from this choice and offer new choices.",
        action
    )
}

pub fn summary_instruction(transcript: &str) -> String {
    format!("Summarize this conversation:\n\n{}", transcript)
}
