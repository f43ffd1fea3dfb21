//! Player-chosen base facts: the immutable input of one evaluation.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ability::AbilityScores;
use crate::error::ModelError;

/// The rules edition a character is built under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edition {
    /// The 2014 rules.
    #[serde(rename = "2014")]
    Edition2014,
    /// The 2024 rules.
    #[default]
    #[serde(rename = "2024")]
    Edition2024,
}

impl FromStr for Edition {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2014" => Ok(Self::Edition2014),
            "2024" => Ok(Self::Edition2024),
            other => Err(ModelError::UnknownEdition(other.to_string())),
        }
    }
}

impl std::fmt::Display for Edition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Edition2014 => write!(f, "2014"),
            Self::Edition2024 => write!(f, "2024"),
        }
    }
}

/// The answer recorded for one choice: a single option id or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceAnswer {
    /// A single selected option.
    One(String),
    /// Several selected options (multi-select choices).
    Many(Vec<String>),
}

impl ChoiceAnswer {
    /// The selected option ids in the order they were recorded.
    pub fn selections(&self) -> Vec<&str> {
        match self {
            Self::One(id) => vec![id.as_str()],
            Self::Many(ids) => ids.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for ChoiceAnswer {
    fn from(id: &str) -> Self {
        Self::One(id.to_string())
    }
}

/// What the character currently has equipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Equipment {
    /// Worn armor, if any.
    pub armor: Option<String>,
    /// Wielded shield, if any.
    pub shield: Option<String>,
    /// Wielded weapons.
    pub weapons: Vec<String>,
    /// Other equipped items (rings, cloaks, ...).
    pub items: Vec<String>,
}

impl Equipment {
    /// Returns true if the given identifier is equipped in any slot.
    pub fn contains(&self, id: &str) -> bool {
        self.armor.as_deref() == Some(id)
            || self.shield.as_deref() == Some(id)
            || self.weapons.iter().any(|w| w == id)
            || self.items.iter().any(|i| i == id)
    }
}

/// The player's choices for one character.
///
/// Created once per evaluation request and never mutated by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseFacts {
    /// Total character level. When 0, the sum of class levels is used.
    pub level: u32,
    /// Level per class track (supports multiclassing).
    pub class_levels: BTreeMap<String, u32>,
    /// Species identifier.
    pub species: String,
    /// Background identifier.
    pub background: String,
    /// Rules edition.
    pub edition: Edition,
    /// Raw ability scores before any increases.
    pub abilities: AbilityScores,
    /// Resolved choice answers keyed by choice id.
    pub choices: BTreeMap<String, ChoiceAnswer>,
    /// Equipped armor, shield, weapons, and items.
    pub equipped: Equipment,
    /// Active condition identifiers.
    pub conditions: Vec<String>,
    /// Initial tags.
    pub tags: Vec<String>,
    /// Feat identifiers.
    pub feats: Vec<String>,
    /// Attuned item identifiers.
    pub attuned: Vec<String>,
}

impl BaseFacts {
    /// Create facts for a single-class character.
    pub fn new(class: impl Into<String>, level: u32) -> Self {
        let mut class_levels = BTreeMap::new();
        class_levels.insert(class.into(), level);
        Self {
            level,
            class_levels,
            ..Self::default()
        }
    }

    /// Set the raw ability scores.
    pub fn with_abilities(mut self, abilities: AbilityScores) -> Self {
        self.abilities = abilities;
        self
    }

    /// Set the species identifier.
    pub fn with_species(mut self, species: impl Into<String>) -> Self {
        self.species = species.into();
        self
    }

    /// Set the rules edition.
    pub fn with_edition(mut self, edition: Edition) -> Self {
        self.edition = edition;
        self
    }

    /// Record a choice answer.
    pub fn with_choice(mut self, choice: impl Into<String>, answer: ChoiceAnswer) -> Self {
        self.choices.insert(choice.into(), answer);
        self
    }

    /// Total character level, falling back to the sum of class levels.
    pub fn total_level(&self) -> u32 {
        if self.level > 0 {
            self.level
        } else {
            self.class_levels
                .values()
                .fold(0, |total, level| total.saturating_add(*level))
        }
    }

    /// Level in a class track (case-insensitive), 0 if absent.
    pub fn class_level(&self, class: &str) -> u32 {
        self.class_levels
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(class))
            .map_or(0, |(_, level)| *level)
    }
}
