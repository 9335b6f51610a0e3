//! Fallback Engine
//!
//! Deterministic, seed-keyed synthesis of contract-valid payloads from the static pools
//! in [`pools`]. Every draw comes from an explicit [`StdRng`] seeded from the session
//! seed, so identical `(seed, kind, facts)` always produce identical payloads.

pub mod pools;

use crate::generation::payload::{
    Choice, CompanyInfo, ContinuationTurn, GameMeta, GenerationPayload, InitialTurn,
    MagicalElement, Npc, PlayerState, RequestKind,
};
use crate::generation::validate::default_required_stats;
use crate::types::Seed;
use pools::{
    ChoiceTemplate, NpcTemplate, BOSSES, CHOICE_CATEGORIES, COLLEAGUES, COMPANIES, ELEMENTS,
    INITIAL_CHOICES, INITIAL_STATE, SCENES,
};
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

const MAGIC_PROBABILITY: f64 = 0.5;
const COLLEAGUE_COUNT: usize = 3;
const CONTINUATION_CHOICES: usize = 4;

/// Weighted sampling over a fixed set of entries with integer shares.
#[derive(Debug, Clone)]
pub struct WeightedPool<T> {
    entries: Vec<(T, u32)>,
}

impl<T> WeightedPool<T> {
    pub fn new(entries: Vec<(T, u32)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One weighted draw; `None` when the pool is empty or all weights are zero.
    pub fn sample(&self, rng: &mut StdRng) -> Option<&T> {
        let weights: Vec<u32> = self.entries.iter().map(|(_, w)| *w).collect();
        let dist = WeightedIndex::new(&weights).ok()?;
        Some(&self.entries[dist.sample(rng)].0)
    }

    /// Up to `count` distinct entries, weighted, without replacement.
    pub fn sample_distinct(&self, rng: &mut StdRng, count: usize) -> Vec<&T> {
        let mut remaining: Vec<usize> = (0..self.entries.len()).collect();
        let mut picked = Vec::with_capacity(count.min(remaining.len()));
        while picked.len() < count && !remaining.is_empty() {
            let weights: Vec<u32> = remaining.iter().map(|&i| self.entries[i].1).collect();
            let Ok(dist) = WeightedIndex::new(&weights) else {
                break;
            };
            let index = remaining.remove(dist.sample(rng));
            picked.push(&self.entries[index].0);
        }
        picked
    }
}

/// What the engine knows about the session it is filling in for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionFacts {
    pub player_name: String,
    pub difficulty: String,
    pub turn: u64,
    pub last_action: Option<String>,
    pub player_state: Option<PlayerState>,
}

impl SessionFacts {
    pub fn new(player_name: impl Into<String>, difficulty: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            difficulty: difficulty.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct FallbackEngine {
    required_stats: Vec<String>,
}

impl Default for FallbackEngine {
    fn default() -> Self {
        Self::with_required_stats(default_required_stats())
    }
}

impl FallbackEngine {
    /// Stats guaranteed present in every synthesized `player_state`.
    pub fn with_required_stats(required_stats: Vec<String>) -> Self {
        Self { required_stats }
    }

    pub fn synthesize(&self, seed: Seed, kind: RequestKind, facts: &SessionFacts) -> GenerationPayload {
        debug!(seed, kind = %kind, turn = facts.turn, "Synthesizing fallback payload");
        match kind {
            RequestKind::Initial => GenerationPayload::Initial(self.initial(seed, facts)),
            RequestKind::Continuation => {
                GenerationPayload::Continuation(self.continuation(seed, facts))
            }
        }
    }

    fn initial(&self, seed: Seed, facts: &SessionFacts) -> InitialTurn {
        let mut company_rng = StdRng::seed_from_u64(seed);
        let companies = WeightedPool::new(COMPANIES.iter().map(|c| (c, c.weight)).collect());
        let company = companies
            .sample(&mut company_rng)
            .copied()
            .unwrap_or(&COMPANIES[0]);
        let style = pools::style_for(company.style);

        let mut npc_rng = StdRng::seed_from_u64(seed.wrapping_add(1));
        let bosses = WeightedPool::new(BOSSES.iter().map(|b| (b, b.weight)).collect());
        let colleagues = WeightedPool::new(COLLEAGUES.iter().map(|c| (c, c.weight)).collect());
        let boss = bosses.sample(&mut npc_rng).copied().unwrap_or(&BOSSES[0]);
        let npcs: Vec<Npc> = std::iter::once(boss)
            .chain(colleagues.sample_distinct(&mut npc_rng, COLLEAGUE_COUNT).into_iter().copied())
            .map(npc_from)
            .collect();

        let mut magic_rng = StdRng::seed_from_u64(seed.wrapping_add(2));
        let element = if magic_rng.gen_bool(MAGIC_PROBABILITY) {
            ELEMENTS.choose(&mut magic_rng).map(|e| MagicalElement {
                kind: e.kind.to_string(),
                name: e.name.to_string(),
                description: e.description.to_string(),
                effect: e.effect.to_string(),
            })
        } else {
            None
        };

        let mut magical_elements: Vec<String> =
            company.magical_elements.iter().map(|s| s.to_string()).collect();
        if let Some(element) = &element {
            magical_elements.push(element.name.clone());
        }

        let company_info = CompanyInfo {
            name: company.name.to_string(),
            company_type: company.company_type.to_string(),
            culture: company.culture.to_string(),
            atmosphere: company.atmosphere.to_string(),
            special_rules: company.special_rules.iter().map(|s| s.to_string()).collect(),
            magical_elements,
            style: Some(style.name.to_string()),
        };

        let game_meta = GameMeta {
            company_type: company.company_type.to_string(),
            style_type: style.name.to_string(),
            magical_level: if element.is_some() { "heavy" } else { "none" }.to_string(),
            seed_used: Some(json!(seed)),
        };

        let story_context = welcome_story(&company_info, element.as_ref(), facts);
        let choices = INITIAL_CHOICES
            .iter()
            .map(|(category, template)| {
                choice_from(format!("choice_{}_{}", category, seed), category, template)
            })
            .collect();

        InitialTurn {
            game_meta,
            company_info,
            npcs,
            active_magical_element: element,
            player_state: self.initial_state(),
            story_context,
            choices,
            npc_updates: None,
            is_game_over: false,
            game_over_reason: None,
        }
    }

    fn continuation(&self, seed: Seed, facts: &SessionFacts) -> ContinuationTurn {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(3).wrapping_add(facts.turn));

        let action = facts
            .last_action
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(lowercase_first)
            .unwrap_or_else(|| "keep your head down".to_string());
        let scene = SCENES.choose(&mut rng).copied().unwrap_or(SCENES[0]);
        let story_context = scene.replace("{action}", &action);

        let categories = WeightedPool::new(
            CHOICE_CATEGORIES
                .iter()
                .map(|c| (c, pools::COMMON))
                .collect(),
        );
        let choices = categories
            .sample_distinct(&mut rng, CONTINUATION_CHOICES)
            .into_iter()
            .filter_map(|category| {
                let template = category.choices.choose(&mut rng)?;
                let id = format!("choice_{}_{}_{}", category.category, seed, facts.turn);
                Some(choice_from(id, category.category, template))
            })
            .collect();

        let player_state = match &facts.player_state {
            Some(snapshot) => self.fill_required(snapshot.clone()),
            None => self.initial_state(),
        };
        let game_over_reason = game_over_reason(&player_state);

        ContinuationTurn {
            story_context,
            choices,
            player_state,
            npc_updates: None,
            is_game_over: game_over_reason.is_some(),
            game_over_reason,
        }
    }

    fn initial_state(&self) -> PlayerState {
        let state = INITIAL_STATE
            .iter()
            .map(|(stat, value)| (stat.to_string(), *value))
            .collect();
        self.fill_required(state)
    }

    fn fill_required(&self, mut state: PlayerState) -> PlayerState {
        for stat in &self.required_stats {
            if !state.contains_key(stat) {
                let initial = INITIAL_STATE
                    .iter()
                    .find(|(name, _)| name == stat)
                    .map_or(0, |(_, value)| *value);
                state.insert(stat.clone(), initial);
            }
        }
        state
    }
}

/// Burnout and getting caught end the game.
fn game_over_reason(state: &PlayerState) -> Option<String> {
    if state.get("energy").is_some_and(|&energy| energy <= 0) {
        Some("You collapsed at your desk from exhaustion. The company found a replacement by Monday.".to_string())
    } else if state.get("suspicion").is_some_and(|&suspicion| suspicion >= 100) {
        Some("HR invited you for a chat. As you pack your things, you feel strangely free.".to_string())
    } else {
        None
    }
}

fn npc_from(template: &NpcTemplate) -> Npc {
    Npc {
        id: template.id.to_string(),
        name: template.name.to_string(),
        role: template.role.to_string(),
        personality: template.personality.to_string(),
        background: Some(template.background.to_string()),
        appearance: Some(template.appearance.to_string()),
        attitude_toward_player: Some(json!(template.attitude)),
        secrets: template.secrets.iter().map(|s| s.to_string()).collect(),
    }
}

fn choice_from(id: String, category: &str, template: &ChoiceTemplate) -> Choice {
    Choice {
        id,
        text: template.text.to_string(),
        category: Some(category.to_string()),
        hint: Some(template.hint.to_string()),
        effects: template
            .effects
            .iter()
            .map(|(stat, delta)| (stat.to_string(), *delta))
            .collect(),
    }
}

fn welcome_story(
    company: &CompanyInfo,
    element: Option<&MagicalElement>,
    facts: &SessionFacts,
) -> String {
    let player = if facts.player_name.trim().is_empty() {
        "newcomer"
    } else {
        facts.player_name.trim()
    };
    let mut story = format!(
        "Welcome to {}, {}!\n\n{}\n\nIt is your first day and you have just found your desk. {}\n\n",
        company.name, player, company.culture, company.atmosphere
    );
    if !facts.difficulty.trim().is_empty() {
        story.push_str(&format!(
            "Your onboarding packet is stamped \"{}\". As the newest hire you will have to survive here.\n\n",
            facts.difficulty.trim()
        ));
    } else {
        story.push_str("As the newest hire you will have to survive here.\n\n");
    }
    if let Some(element) = element {
        story.push_str(&format!(
            "Something feels off: people mention the {} in hushed voices...\n\n",
            element.name
        ));
    }
    story.push_str("What do you do first?");
    story
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
