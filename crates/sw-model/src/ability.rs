//! The six abilities, the eighteen skills, and the two numeric laws that
//! tie them to a character's level and scores.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Compute an ability modifier: `floor((score - 10) / 2)`.
pub fn ability_modifier(score: i32) -> i32 {
    score.saturating_sub(10).div_euclid(2)
}

/// Compute the proficiency bonus for a total character level:
/// `floor((level - 1) / 4) + 2`. Levels below 1 are treated as 1.
pub fn proficiency_bonus(level: u32) -> i32 {
    ((level.max(1) - 1) / 4) as i32 + 2
}

/// One of the six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    /// Strength.
    #[serde(alias = "strength")]
    Str,
    /// Dexterity.
    #[serde(alias = "dexterity")]
    Dex,
    /// Constitution.
    #[serde(alias = "constitution")]
    Con,
    /// Intelligence.
    #[serde(alias = "intelligence")]
    Int,
    /// Wisdom.
    #[serde(alias = "wisdom")]
    Wis,
    /// Charisma.
    #[serde(alias = "charisma")]
    Cha,
}

impl Ability {
    /// All abilities in sheet order.
    pub const ALL: [Ability; 6] = [
        Ability::Str,
        Ability::Dex,
        Ability::Con,
        Ability::Int,
        Ability::Wis,
        Ability::Cha,
    ];

    /// The three-letter lowercase tag used in data and formula paths.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Dex => "dex",
            Self::Con => "con",
            Self::Int => "int",
            Self::Wis => "wis",
            Self::Cha => "cha",
        }
    }

    /// The full ability name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Str => "Strength",
            Self::Dex => "Dexterity",
            Self::Con => "Constitution",
            Self::Int => "Intelligence",
            Self::Wis => "Wisdom",
            Self::Cha => "Charisma",
        }
    }
}

impl FromStr for Ability {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Ability::ALL
            .into_iter()
            .find(|a| a.tag() == lower || a.name().to_lowercase() == lower)
            .ok_or_else(|| ModelError::UnknownAbility(s.to_string()))
    }
}

impl std::fmt::Display for Ability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// One of the eighteen skills, each governed by a single ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Skill {
    /// Acrobatics (DEX).
    Acrobatics,
    /// Animal Handling (WIS).
    AnimalHandling,
    /// Arcana (INT).
    Arcana,
    /// Athletics (STR).
    Athletics,
    /// Deception (CHA).
    Deception,
    /// History (INT).
    History,
    /// Insight (WIS).
    Insight,
    /// Intimidation (CHA).
    Intimidation,
    /// Investigation (INT).
    Investigation,
    /// Medicine (WIS).
    Medicine,
    /// Nature (INT).
    Nature,
    /// Perception (WIS).
    Perception,
    /// Performance (CHA).
    Performance,
    /// Persuasion (CHA).
    Persuasion,
    /// Religion (INT).
    Religion,
    /// Sleight of Hand (DEX).
    SleightOfHand,
    /// Stealth (DEX).
    Stealth,
    /// Survival (WIS).
    Survival,
}

impl Skill {
    /// All skills in alphabetical order.
    pub const ALL: [Skill; 18] = [
        Skill::Acrobatics,
        Skill::AnimalHandling,
        Skill::Arcana,
        Skill::Athletics,
        Skill::Deception,
        Skill::History,
        Skill::Insight,
        Skill::Intimidation,
        Skill::Investigation,
        Skill::Medicine,
        Skill::Nature,
        Skill::Perception,
        Skill::Performance,
        Skill::Persuasion,
        Skill::Religion,
        Skill::SleightOfHand,
        Skill::Stealth,
        Skill::Survival,
    ];

    /// The governing ability of this skill.
    pub fn ability(self) -> Ability {
        match self {
            Self::Athletics => Ability::Str,
            Self::Acrobatics | Self::SleightOfHand | Self::Stealth => Ability::Dex,
            Self::Arcana | Self::History | Self::Investigation | Self::Nature | Self::Religion => {
                Ability::Int
            }
            Self::AnimalHandling
            | Self::Insight
            | Self::Medicine
            | Self::Perception
            | Self::Survival => Ability::Wis,
            Self::Deception | Self::Intimidation | Self::Performance | Self::Persuasion => {
                Ability::Cha
            }
        }
    }

    /// The display name of this skill.
    pub fn name(self) -> &'static str {
        match self {
            Self::Acrobatics => "Acrobatics",
            Self::AnimalHandling => "Animal Handling",
            Self::Arcana => "Arcana",
            Self::Athletics => "Athletics",
            Self::Deception => "Deception",
            Self::History => "History",
            Self::Insight => "Insight",
            Self::Intimidation => "Intimidation",
            Self::Investigation => "Investigation",
            Self::Medicine => "Medicine",
            Self::Nature => "Nature",
            Self::Perception => "Perception",
            Self::Performance => "Performance",
            Self::Persuasion => "Persuasion",
            Self::Religion => "Religion",
            Self::SleightOfHand => "Sleight of Hand",
            Self::Stealth => "Stealth",
            Self::Survival => "Survival",
        }
    }
}

/// Lowercase and strip separators so "sleightOfHand", "sleight-of-hand"
/// and "Sleight of Hand" compare equal.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl FromStr for Skill {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Skill::ALL
            .into_iter()
            .find(|skill| normalize(skill.name()) == wanted)
            .ok_or_else(|| ModelError::UnknownSkill(s.to_string()))
    }
}

impl std::fmt::Display for Skill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Raw ability scores as chosen by the player. Missing abilities read as 10.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityScores(BTreeMap<Ability, i32>);

impl AbilityScores {
    /// Build scores from an array in sheet order (STR, DEX, CON, INT, WIS, CHA).
    pub fn from_array(scores: [i32; 6]) -> Self {
        Self(Ability::ALL.into_iter().zip(scores).collect())
    }

    /// Set a single score.
    pub fn with(mut self, ability: Ability, score: i32) -> Self {
        self.0.insert(ability, score);
        self
    }

    /// Get a score, defaulting to 10.
    pub fn get(&self, ability: Ability) -> i32 {
        self.0.get(&ability).copied().unwrap_or(10)
    }
}
