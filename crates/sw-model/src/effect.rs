//! Effect entries: one atomic rule contribution each.
//!
//! [`EffectKind`] is a closed tagged union. Content authored against a
//! newer vocabulary deserializes to [`EffectKind::Unknown`] instead of
//! failing, so one bad entry never rejects a whole corpus.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ability::{Ability, Skill};
use crate::error::ModelError;
use crate::formula::NumericValue;
use crate::predicate::Predicate;

/// How a contribution combines with the running total of its field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StackingRule {
    /// Sum with the running total.
    #[default]
    Stack,
    /// Keep the larger of the running total and this value.
    Max,
}

impl StackingRule {
    /// Combine a running total with a new value under this rule. Sums
    /// saturate at the `i32` bounds.
    pub fn combine(self, total: i32, value: i32) -> i32 {
        match self {
            Self::Stack => total.saturating_add(value),
            Self::Max => total.max(value),
        }
    }
}

/// Resolution tier of an armor-class contribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AcPriority {
    /// A baseline calculation replacing `10 + DEX`; highest wins.
    Base,
    /// A competing full AC calculation (armor, unarmored defense); highest wins.
    #[default]
    Additive,
    /// A multiplier on the running total.
    Multiplicative,
    /// Replaces the running total outright; last one wins.
    Override,
    /// A flat bonus stacked on top (shield, ring of protection).
    Flag,
}

impl AcPriority {
    /// Tiers in resolution order.
    pub const ORDER: [AcPriority; 5] = [
        AcPriority::Base,
        AcPriority::Additive,
        AcPriority::Multiplicative,
        AcPriority::Override,
        AcPriority::Flag,
    ];
}

/// When a resource refills.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Recharge {
    /// Refills on a short or long rest.
    ShortRest,
    /// Refills on a long rest.
    #[default]
    LongRest,
    /// Never depleted.
    Unlimited,
}

/// Category of a proficiency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProficiencyCategory {
    /// Armor types.
    Armor,
    /// Weapons and weapon groups.
    Weapons,
    /// Tools and kits.
    Tools,
    /// Languages.
    Languages,
    /// Skills (also marks the skill record proficient).
    Skills,
    /// Saving throws (also marks the saving-throw record proficient).
    SavingThrows,
}

impl ProficiencyCategory {
    /// Every category, in list order.
    pub const ALL: [Self; 6] = [
        Self::Armor,
        Self::Weapons,
        Self::Tools,
        Self::Languages,
        Self::Skills,
        Self::SavingThrows,
    ];
}

/// A movement mode with its own speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    /// Walking speed.
    Walk,
    /// Flying speed.
    Fly,
    /// Swimming speed.
    Swim,
    /// Climbing speed.
    Climb,
    /// Burrowing speed.
    Burrow,
}

impl MovementType {
    /// All movement types.
    pub const ALL: [MovementType; 5] = [
        MovementType::Walk,
        MovementType::Fly,
        MovementType::Swim,
        MovementType::Climb,
        MovementType::Burrow,
    ];

    /// Lowercase tag used in data and formula paths.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::Fly => "fly",
            Self::Swim => "swim",
            Self::Climb => "climb",
            Self::Burrow => "burrow",
        }
    }
}

impl FromStr for MovementType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        MovementType::ALL
            .into_iter()
            .find(|m| m.tag() == lower)
            .ok_or_else(|| ModelError::UnknownMovement(s.to_string()))
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// One of the four spell-list buckets of a spellcasting block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpellList {
    /// Cantrips known.
    Cantrips,
    /// Spells known.
    #[default]
    Known,
    /// Spells prepared.
    Prepared,
    /// Spells always prepared (domain, oath, ...).
    AlwaysPrepared,
}

/// Equipment the character may not use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RestrictionCategory {
    /// Armor that cannot be worn.
    Armor,
    /// Weapons that cannot be wielded.
    Weapons,
    /// Shields that cannot be wielded.
    Shields,
}

/// Advantage or disadvantage on a roll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RollMode {
    /// Roll twice, keep the higher.
    #[default]
    Advantage,
    /// Roll twice, keep the lower.
    Disadvantage,
}

/// Target of a saving-throw effect: one ability or all six.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AbilityTarget {
    /// Every ability.
    All,
    /// A single ability.
    One(Ability),
}

impl AbilityTarget {
    /// The abilities this target fans out to.
    pub fn abilities(self) -> Vec<Ability> {
        match self {
            Self::All => Ability::ALL.to_vec(),
            Self::One(a) => vec![a],
        }
    }
}

impl TryFrom<String> for AbilityTarget {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::One)
        }
    }
}

impl From<AbilityTarget> for String {
    fn from(target: AbilityTarget) -> Self {
        match target {
            AbilityTarget::All => "all".to_string(),
            AbilityTarget::One(a) => a.tag().to_string(),
        }
    }
}

/// Target of a skill bonus: one skill or all eighteen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SkillTarget {
    /// Every skill.
    All,
    /// A single skill.
    One(Skill),
}

impl SkillTarget {
    /// The skills this target fans out to.
    pub fn skills(self) -> Vec<Skill> {
        match self {
            Self::All => Skill::ALL.to_vec(),
            Self::One(s) => vec![s],
        }
    }
}

impl TryFrom<String> for SkillTarget {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::One)
        }
    }
}

impl From<SkillTarget> for String {
    fn from(target: SkillTarget) -> Self {
        match target {
            SkillTarget::All => "all".to_string(),
            // serde name, e.g. "sleightOfHand"
            SkillTarget::One(s) => {
                let name: String = s.name().split_whitespace().collect();
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            }
        }
    }
}

/// One atomic rule contribution, optionally guarded by predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// Stable identifier for provenance. Defaults to `<sourceId>#<index>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Guards; all must hold. Empty means unconditional.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predicates: Vec<Predicate>,
    /// What the effect does.
    #[serde(flatten)]
    pub kind: EffectKind,
}

impl Effect {
    /// Create an unconditional effect.
    pub fn new(kind: EffectKind) -> Self {
        Self {
            id: None,
            predicates: Vec::new(),
            kind,
        }
    }

    /// Set the effect id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a guard.
    pub fn when(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }
}

/// The closed set of effect kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EffectKind {
    /// Add values to a categorized proficiency list.
    GrantProficiency {
        /// Target list.
        category: ProficiencyCategory,
        /// Values to add.
        values: Vec<String>,
    },
    /// Add a delta to an ability score.
    AbilityScoreIncrease {
        /// Ability to raise.
        ability: Ability,
        /// Delta (may be negative).
        value: NumericValue,
        /// Cap the increase at this score.
        #[serde(default)]
        maximum: Option<i32>,
    },
    /// Advantage or disadvantage on saving throws.
    SavingThrowAdvantage {
        /// Ability or `all`.
        ability: AbilityTarget,
        /// Advantage or disadvantage.
        #[serde(default)]
        mode: RollMode,
    },
    /// A numeric saving-throw bonus.
    SavingThrowBonus {
        /// Ability or `all`.
        ability: AbilityTarget,
        /// Bonus.
        value: NumericValue,
        /// Combination rule.
        #[serde(default)]
        stacking: StackingRule,
    },
    /// Proficiency in skills.
    SkillProficiency {
        /// Skills.
        skills: Vec<Skill>,
    },
    /// Expertise in skills (doubles proficiency).
    SkillExpertise {
        /// Skills.
        skills: Vec<Skill>,
    },
    /// A numeric skill bonus.
    SkillBonus {
        /// Skill or `all`.
        skill: SkillTarget,
        /// Bonus.
        value: NumericValue,
        /// Combination rule.
        #[serde(default)]
        stacking: StackingRule,
    },
    /// A contribution to armor class, resolved by the finalizer.
    ArmorClass {
        /// AC value (full calculation or flat bonus, depending on tier).
        value: NumericValue,
        /// Resolution tier.
        #[serde(default)]
        priority: AcPriority,
        /// Combination rule within the tier.
        #[serde(default)]
        stacking: StackingRule,
    },
    /// A numeric initiative bonus.
    InitiativeBonus {
        /// Bonus.
        value: NumericValue,
        /// Combination rule.
        #[serde(default)]
        stacking: StackingRule,
    },
    /// A movement speed.
    Speed {
        /// Movement type.
        movement: MovementType,
        /// Speed in feet, or a delta when stacking.
        value: NumericValue,
        /// `max` to set a base speed, `stack` to add.
        #[serde(default)]
        stacking: StackingRule,
    },
    /// A special sense such as darkvision.
    Sense {
        /// Sense identifier.
        sense: String,
        /// Range in feet.
        range: NumericValue,
    },
    /// A limited-use resource such as rage or ki.
    Resource {
        /// Resource identifier.
        resource: String,
        /// Display name.
        #[serde(default)]
        name: Option<String>,
        /// Uses granted.
        value: NumericValue,
        /// Refill cadence.
        #[serde(default)]
        recharge: Recharge,
        /// Combination rule for repeat grants.
        #[serde(default)]
        stacking: StackingRule,
    },
    /// Assign the spellcasting ability; initializes the spellcasting block.
    SpellcastingAbility {
        /// Spellcasting ability.
        ability: Ability,
        /// Class the spellcasting belongs to.
        #[serde(default)]
        class: Option<String>,
    },
    /// Add a spell to a spell-list bucket.
    GrantSpell {
        /// Spell identifier.
        spell: String,
        /// Target bucket.
        #[serde(default)]
        list: SpellList,
    },
    /// Spell slots at one spell level.
    SpellSlots {
        /// Spell level (1-9).
        level: u8,
        /// Slots granted.
        value: NumericValue,
        /// Combination rule.
        #[serde(default)]
        stacking: StackingRule,
    },
    /// Grant a named feature.
    GrantFeature {
        /// Feature identifier.
        feature: String,
        /// Display name.
        #[serde(default)]
        name: Option<String>,
        /// Rules text.
        #[serde(default)]
        description: Option<String>,
    },
    /// Free-form tags.
    Tag {
        /// Tags to add.
        tags: Vec<String>,
    },
    /// Equipment the character cannot use.
    EquipmentRestriction {
        /// Restriction list.
        category: RestrictionCategory,
        /// Restricted identifiers.
        values: Vec<String>,
    },
    /// Status conditions.
    Condition {
        /// Conditions to add.
        conditions: Vec<String>,
    },
    /// A base hit-point contribution (hit dice, class base).
    HitPoints {
        /// Hit points.
        value: NumericValue,
    },
    /// A hit-point-maximum delta (toughness-style).
    HitPointMaximum {
        /// Delta.
        value: NumericValue,
        /// Multiply by total character level.
        #[serde(default)]
        per_level: bool,
    },
    /// Damage resistances.
    DamageResistance {
        /// Damage types.
        damage_types: Vec<String>,
    },
    /// Condition immunities.
    ConditionImmunity {
        /// Conditions.
        conditions: Vec<String>,
    },
    /// Extra attunement slots.
    Attunement {
        /// Slots added.
        slots: NumericValue,
    },
    /// An effect kind this build does not know. Logged and skipped.
    #[serde(other)]
    Unknown,
}

impl EffectKind {
    /// The serialized tag of this kind, for logs and provenance.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GrantProficiency { .. } => "grantProficiency",
            Self::AbilityScoreIncrease { .. } => "abilityScoreIncrease",
            Self::SavingThrowAdvantage { .. } => "savingThrowAdvantage",
            Self::SavingThrowBonus { .. } => "savingThrowBonus",
            Self::SkillProficiency { .. } => "skillProficiency",
            Self::SkillExpertise { .. } => "skillExpertise",
            Self::SkillBonus { .. } => "skillBonus",
            Self::ArmorClass { .. } => "armorClass",
            Self::InitiativeBonus { .. } => "initiativeBonus",
            Self::Speed { .. } => "speed",
            Self::Sense { .. } => "sense",
            Self::Resource { .. } => "resource",
            Self::SpellcastingAbility { .. } => "spellcastingAbility",
            Self::GrantSpell { .. } => "grantSpell",
            Self::SpellSlots { .. } => "spellSlots",
            Self::GrantFeature { .. } => "grantFeature",
            Self::Tag { .. } => "tag",
            Self::EquipmentRestriction { .. } => "equipmentRestriction",
            Self::Condition { .. } => "condition",
            Self::HitPoints { .. } => "hitPoints",
            Self::HitPointMaximum { .. } => "hitPointMaximum",
            Self::DamageResistance { .. } => "damageResistance",
            Self::ConditionImmunity { .. } => "conditionImmunity",
            Self::Attunement { .. } => "attunement",
            Self::Unknown => "unknown",
        }
    }

    /// Every numeric field of this kind, for content linting.
    pub fn numeric_values(&self) -> Vec<&NumericValue> {
        match self {
            Self::AbilityScoreIncrease { value, .. }
            | Self::SavingThrowBonus { value, .. }
            | Self::SkillBonus { value, .. }
            | Self::ArmorClass { value, .. }
            | Self::InitiativeBonus { value, .. }
            | Self::Speed { value, .. }
            | Self::Resource { value, .. }
            | Self::SpellSlots { value, .. }
            | Self::HitPoints { value }
            | Self::HitPointMaximum { value, .. } => vec![value],
            Self::Sense { range, .. } => vec![range],
            Self::Attunement { slots } => vec![slots],
            _ => Vec::new(),
        }
    }
}
