//! The derived-state accumulator and eventual evaluation output.
//!
//! A [`DerivedState`] is allocated fresh per evaluation, mutated in place
//! by every applied effect, finalized once, and returned. The deferred
//! [`Contributions`] lists are scratch space consumed by finalization and
//! are never serialized.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ability::{Ability, Skill, ability_modifier};
use crate::effect::{AcPriority, MovementType, ProficiencyCategory, Recharge, StackingRule};
use crate::provenance::ProvenanceEntry;

/// Push `value` unless an equal value is already present. Returns true if pushed.
pub fn insert_unique<T: PartialEq>(list: &mut Vec<T>, value: T) -> bool {
    if list.contains(&value) {
        false
    } else {
        list.push(value);
        true
    }
}

/// An ability score with its modifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityRecord {
    /// Current score.
    pub score: i32,
    /// `floor((score - 10) / 2)`.
    pub modifier: i32,
}

impl AbilityRecord {
    /// Build a record from a score.
    pub fn from_score(score: i32) -> Self {
        Self {
            score,
            modifier: ability_modifier(score),
        }
    }
}

/// Categorized proficiency lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proficiencies {
    /// Armor.
    pub armor: Vec<String>,
    /// Weapons.
    pub weapons: Vec<String>,
    /// Tools.
    pub tools: Vec<String>,
    /// Languages.
    pub languages: Vec<String>,
    /// Skills.
    pub skills: Vec<String>,
    /// Saving throws.
    pub saving_throws: Vec<String>,
}

impl Proficiencies {
    /// The list backing one category.
    pub fn list(&self, category: ProficiencyCategory) -> &Vec<String> {
        match category {
            ProficiencyCategory::Armor => &self.armor,
            ProficiencyCategory::Weapons => &self.weapons,
            ProficiencyCategory::Tools => &self.tools,
            ProficiencyCategory::Languages => &self.languages,
            ProficiencyCategory::Skills => &self.skills,
            ProficiencyCategory::SavingThrows => &self.saving_throws,
        }
    }

    /// Mutable access to the list backing one category.
    pub fn list_mut(&mut self, category: ProficiencyCategory) -> &mut Vec<String> {
        match category {
            ProficiencyCategory::Armor => &mut self.armor,
            ProficiencyCategory::Weapons => &mut self.weapons,
            ProficiencyCategory::Tools => &mut self.tools,
            ProficiencyCategory::Languages => &mut self.languages,
            ProficiencyCategory::Skills => &mut self.skills,
            ProficiencyCategory::SavingThrows => &mut self.saving_throws,
        }
    }

    /// The stored form of a value. Skill and saving-throw values that parse
    /// as a skill or ability become its display name. Everything else is
    /// kept verbatim.
    pub fn canonical(category: ProficiencyCategory, value: &str) -> String {
        let parsed = match category {
            ProficiencyCategory::Skills => value.parse::<Skill>().ok().map(Skill::name),
            ProficiencyCategory::SavingThrows => value.parse::<Ability>().ok().map(Ability::name),
            _ => None,
        };
        parsed.map_or_else(|| value.to_string(), str::to_string)
    }

    /// Case-insensitive membership test on canonical values, in one
    /// category or all of them.
    pub fn contains(&self, category: Option<ProficiencyCategory>, value: &str) -> bool {
        let matches = |category: ProficiencyCategory| {
            let wanted = Self::canonical(category, value);
            self.list(category)
                .iter()
                .any(|v| Self::canonical(category, v).eq_ignore_ascii_case(&wanted))
        };
        match category {
            Some(c) => matches(c),
            None => ProficiencyCategory::ALL.into_iter().any(matches),
        }
    }

    /// Append `value` in canonical form unless already present. Returns
    /// true if pushed.
    pub fn insert(&mut self, category: ProficiencyCategory, value: &str) -> bool {
        if self.contains(Some(category), value) {
            return false;
        }
        self.list_mut(category).push(Self::canonical(category, value));
        true
    }
}

/// One saving throw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingThrow {
    /// Proficient in this save.
    pub proficient: bool,
    /// Accumulated numeric bonus.
    pub bonus: i32,
    /// Final bonus (set by finalization).
    pub total: i32,
    /// Sources granting advantage.
    pub advantage: Vec<String>,
    /// Sources imposing disadvantage.
    pub disadvantage: Vec<String>,
}

/// One skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRecord {
    /// Governing ability.
    pub ability: Ability,
    /// Proficient in this skill.
    pub proficient: bool,
    /// Expertise in this skill.
    pub expertise: bool,
    /// Accumulated numeric bonus.
    pub bonus: i32,
    /// Final bonus (set by finalization).
    pub total: i32,
}

impl SkillRecord {
    /// An untrained record for a skill.
    pub fn untrained(skill: Skill) -> Self {
        Self {
            ability: skill.ability(),
            proficient: false,
            expertise: false,
            bonus: 0,
            total: 0,
        }
    }
}

/// A deferred armor-class contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcContribution {
    /// Contributing source.
    pub source_id: String,
    /// Resolved value.
    pub value: i32,
    /// Resolution tier.
    pub priority: AcPriority,
    /// Combination rule within the tier.
    pub stacking: StackingRule,
}

/// The armor-class record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorClass {
    /// Final armor class.
    pub value: i32,
    /// The contributions the final value was resolved from.
    pub contributions: Vec<AcContribution>,
}

/// The initiative record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiative {
    /// Accumulated numeric bonus.
    pub bonus: i32,
    /// Final bonus (set by finalization).
    pub total: i32,
}

/// Whether a hit-point contribution is part of the base or a bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HpContributionKind {
    /// Base hit points (hit dice).
    Base,
    /// Maximum delta (toughness-style).
    Bonus,
}

/// A deferred hit-point contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HpContribution {
    /// Contributing source.
    pub source_id: String,
    /// Resolved value.
    pub value: i32,
    /// Base or bonus.
    pub kind: HpContributionKind,
}

/// The hit-point record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    /// Sum of base contributions.
    pub base: i32,
    /// Sum of maximum deltas.
    pub bonus: i32,
    /// `base + bonus`.
    pub max: i32,
    /// The contributions the maximum was resolved from.
    pub contributions: Vec<HpContribution>,
}

/// A special sense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sense {
    /// Sense identifier.
    pub sense: String,
    /// Range in feet (largest grant wins).
    pub range: i32,
    /// Granting sources.
    pub sources: Vec<String>,
}

/// A spell-slot pool at one spell level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPool {
    /// Slots available.
    pub max: i32,
    /// Slots remaining.
    pub current: i32,
}

/// The spellcasting block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spellcasting {
    /// Spellcasting ability.
    pub ability: Ability,
    /// Class the spellcasting belongs to.
    pub class: Option<String>,
    /// Source that assigned the ability.
    pub source_id: String,
    /// `8 + proficiency + ability modifier` (set by finalization).
    pub save_dc: i32,
    /// `proficiency + ability modifier` (set by finalization).
    pub attack_bonus: i32,
    /// Slot pools keyed by spell level.
    pub slots: BTreeMap<u8, SlotPool>,
    /// Cantrips known.
    pub cantrips: Vec<String>,
    /// Spells known.
    pub known: Vec<String>,
    /// Spells prepared.
    pub prepared: Vec<String>,
    /// Spells always prepared.
    pub always_prepared: Vec<String>,
}

impl Spellcasting {
    /// A fresh block for an ability.
    pub fn new(ability: Ability, class: Option<String>, source_id: impl Into<String>) -> Self {
        Self {
            ability,
            class,
            source_id: source_id.into(),
            save_dc: 0,
            attack_bonus: 0,
            slots: BTreeMap::new(),
            cantrips: Vec::new(),
            known: Vec::new(),
            prepared: Vec::new(),
            always_prepared: Vec::new(),
        }
    }
}

/// A limited-use resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Maximum uses.
    pub max: i32,
    /// Remaining uses.
    pub current: i32,
    /// Refill cadence.
    pub recharge: Recharge,
    /// Granting sources, without duplicates.
    pub sources: Vec<String>,
}

/// A granted feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    /// Feature id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Rules text.
    pub description: Option<String>,
    /// Granting source.
    pub source_id: String,
}

/// A selectable option of a pending choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOption {
    /// Option id.
    pub id: String,
    /// Display label.
    pub label: String,
}

/// A choice the player still has to make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingChoice {
    /// Source bundle carrying the choice.
    pub source_id: String,
    /// Choice id (key expected in `BaseFacts::choices`).
    pub choice_id: String,
    /// Question shown to the player.
    pub prompt: String,
    /// How many options to pick.
    pub count: u32,
    /// Available options.
    pub options: Vec<PendingOption>,
}

/// Equipment the character may not use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentRestrictions {
    /// Restricted armor.
    pub armor: Vec<String>,
    /// Restricted weapons.
    pub weapons: Vec<String>,
    /// Restricted shields.
    pub shields: Vec<String>,
}

/// Attunement capacity and current attunements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attunement {
    /// Maximum attuned items.
    pub max: u32,
    /// Attuned item ids.
    pub attuned: Vec<String>,
}

/// Deferred contributions consumed by finalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contributions {
    /// Armor-class contributions.
    pub armor_class: Vec<AcContribution>,
    /// Hit-point contributions.
    pub hit_points: Vec<HpContribution>,
}

/// The complete derived character: accumulator during evaluation, output after.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedState {
    /// Total character level.
    pub level: u32,
    /// Level per class track.
    pub class_levels: BTreeMap<String, u32>,
    /// Scores and modifiers.
    pub abilities: BTreeMap<Ability, AbilityRecord>,
    /// Proficiency bonus.
    pub proficiency_bonus: i32,
    /// Categorized proficiencies.
    pub proficiencies: Proficiencies,
    /// Skills with expertise.
    pub expertise: Vec<Skill>,
    /// Saving throws.
    pub saving_throws: BTreeMap<Ability, SavingThrow>,
    /// Skills.
    pub skills: BTreeMap<Skill, SkillRecord>,
    /// Armor class.
    pub armor_class: ArmorClass,
    /// Initiative.
    pub initiative: Initiative,
    /// Hit points.
    pub hit_points: HitPoints,
    /// Speed per movement type.
    pub speeds: BTreeMap<MovementType, i32>,
    /// Special senses.
    pub senses: Vec<Sense>,
    /// Spellcasting block, if any effect assigned one.
    pub spellcasting: Option<Spellcasting>,
    /// Resources by id.
    pub resources: BTreeMap<String, Resource>,
    /// Granted features in grant order.
    pub features: Vec<Feature>,
    /// Choices still to be made.
    pub pending_choices: Vec<PendingChoice>,
    /// Equipment restrictions.
    pub equipment_restrictions: EquipmentRestrictions,
    /// Attunement.
    pub attunement: Attunement,
    /// Active status conditions.
    pub conditions: Vec<String>,
    /// Damage resistances.
    pub damage_resistances: Vec<String>,
    /// Condition immunities.
    pub condition_immunities: Vec<String>,
    /// Tags in insertion order.
    pub tags: Vec<String>,
    /// One entry per effect evaluated, in application order.
    pub provenance: Vec<ProvenanceEntry>,
    /// Scratch lists for finalization.
    #[serde(skip)]
    pub contributions: Contributions,
}

impl DerivedState {
    /// Current modifier of an ability (0 if absent).
    pub fn modifier(&self, ability: Ability) -> i32 {
        self.abilities.get(&ability).map_or(0, |a| a.modifier)
    }

    /// Current score of an ability, if present.
    pub fn score(&self, ability: Ability) -> Option<i32> {
        self.abilities.get(&ability).map(|a| a.score)
    }

    /// Recompute every modifier from its score.
    pub fn recompute_modifiers(&mut self) {
        for record in self.abilities.values_mut() {
            *record = AbilityRecord::from_score(record.score);
        }
    }

    /// Returns true if the tag is present.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Add a tag unless present. Returns true if added.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        insert_unique(&mut self.tags, tag.into())
    }

    /// Returns true if a feature with this id was granted.
    pub fn has_feature(&self, id: &str) -> bool {
        self.features.iter().any(|f| f.id == id)
    }

    /// Returns true if a condition is active.
    pub fn has_condition(&self, condition: &str) -> bool {
        self.conditions.iter().any(|c| c == condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_unique_deduplicates() {
        let mut list = vec!["a".to_string()];
        assert!(!insert_unique(&mut list, "a".to_string()));
        assert!(insert_unique(&mut list, "b".to_string()));
        assert_eq!(list, vec!["a", "b"]);
    }

    #[test]
    fn recompute_modifiers_follows_scores() {
        let mut state = DerivedState::default();
        state
            .abilities
            .insert(Ability::Str, AbilityRecord::from_score(15));
        assert_eq!(state.modifier(Ability::Str), 2);

        state.abilities.get_mut(&Ability::Str).unwrap().score = 16;
        state.recompute_modifiers();
        assert_eq!(state.modifier(Ability::Str), 3);
    }

    #[test]
    fn proficiency_lookup_is_case_insensitive() {
        let mut profs = Proficiencies::default();
        profs
            .list_mut(ProficiencyCategory::Armor)
            .push("Heavy Armor".to_string());
        assert!(profs.contains(Some(ProficiencyCategory::Armor), "heavy armor"));
        assert!(profs.contains(None, "heavy armor"));
        assert!(!profs.contains(Some(ProficiencyCategory::Tools), "heavy armor"));
    }

    #[test]
    fn proficiency_values_are_stored_canonically() {
        let mut profs = Proficiencies::default();
        assert!(profs.insert(ProficiencyCategory::Skills, "sleight-of-hand"));
        assert!(!profs.insert(ProficiencyCategory::Skills, "Sleight of Hand"));
        assert!(profs.insert(ProficiencyCategory::SavingThrows, "dex"));
        assert!(!profs.insert(ProficiencyCategory::SavingThrows, "DEXTERITY"));
        assert!(profs.insert(ProficiencyCategory::Tools, "thieves' tools"));
        assert_eq!(profs.skills, vec!["Sleight of Hand"]);
        assert_eq!(profs.saving_throws, vec!["Dexterity"]);
        assert_eq!(profs.tools, vec!["thieves' tools"]);
        assert!(profs.contains(None, "sleightOfHand"));
        assert!(!profs.contains(Some(ProficiencyCategory::Skills), "dex"));
    }

    #[test]
    fn scratch_lists_are_not_serialized() {
        let mut state = DerivedState::default();
        state.contributions.armor_class.push(AcContribution {
            source_id: "item:shield".to_string(),
            value: 2,
            priority: AcPriority::Flag,
            stacking: StackingRule::Stack,
        });
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("contributions").is_none());
        assert!(json.get("armorClass").is_some());
    }
}
