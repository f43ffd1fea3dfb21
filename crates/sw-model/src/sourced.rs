//! Sourced effect bundles and the player choices they may carry.

use serde::{Deserialize, Serialize};

use crate::effect::Effect;
use crate::facts::Edition;
use crate::predicate::Predicate;

fn one() -> u32 {
    1
}

/// A player decision with labeled options, each carrying its own effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    /// Key looked up in `BaseFacts::choices`.
    pub id: String,
    /// Question shown to the player.
    pub prompt: String,
    /// How many options the player picks.
    #[serde(default = "one")]
    pub count: u32,
    /// Available options.
    pub options: Vec<ChoiceOption>,
    /// The choice is only offered (and only applied) while these hold.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predicates: Vec<Predicate>,
}

impl Choice {
    /// Create a single-pick choice.
    pub fn new(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            count: 1,
            options: Vec::new(),
            predicates: Vec::new(),
        }
    }

    /// Add an option.
    pub fn with_option(mut self, option: ChoiceOption) -> Self {
        self.options.push(option);
        self
    }

    /// Set how many options the player picks.
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Add a guard.
    pub fn when(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Look up an option by id.
    pub fn option(&self, id: &str) -> Option<&ChoiceOption> {
        self.options.iter().find(|o| o.id == id)
    }
}

/// One selectable option of a [`Choice`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Option id recorded in the answer.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Effects applied when this option is selected.
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl ChoiceOption {
    /// Create an option.
    pub fn new(id: impl Into<String>, label: impl Into<String>, effects: Vec<Effect>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            effects,
        }
    }
}

/// A named bundle of effects with provenance and optional gating.
///
/// The `source_id` prefix (`species:`, `class:`, `item:`, ...) decides the
/// phase the bundle is applied in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcedEffect {
    /// Provenance and phase key, e.g. `class:barbarian:rage`.
    pub source_id: String,
    /// Display name.
    pub name: String,
    /// Rules text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Only applies under this edition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<Edition>,
    /// Effects applied unconditionally (subject to their own predicates).
    /// Ignored when `choice` is present: a choice applies its options only.
    #[serde(default)]
    pub effects: Vec<Effect>,
    /// A deferred player decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice: Option<Choice>,
}

impl SourcedEffect {
    /// Create an empty bundle.
    pub fn new(source_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            name: name.into(),
            description: None,
            edition: None,
            effects: Vec::new(),
            choice: None,
        }
    }

    /// Add an effect.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Restrict to an edition.
    pub fn with_edition(mut self, edition: Edition) -> Self {
        self.edition = Some(edition);
        self
    }

    /// Attach a choice.
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choice = Some(choice);
        self
    }
}
