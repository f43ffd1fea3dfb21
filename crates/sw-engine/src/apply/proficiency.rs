//! Proficiency, skill, and expertise handlers.

use sw_model::ability::{Ability, Skill};
use sw_model::derived::{DerivedState, SkillRecord, insert_unique};
use sw_model::effect::{ProficiencyCategory, SkillTarget, StackingRule};
use sw_model::formula::NumericValue;

use super::{Outcome, resolve_value};

fn skill_record(state: &mut DerivedState, skill: Skill) -> &mut SkillRecord {
    state
        .skills
        .entry(skill)
        .or_insert_with(|| SkillRecord::untrained(skill))
}

/// Append each value to its category list in canonical form. Saving-throw
/// and skill values that name an ability or skill also mark that record
/// proficient.
pub(super) fn grant_proficiency(
    state: &mut DerivedState,
    category: ProficiencyCategory,
    values: &[String],
) -> Outcome {
    for value in values {
        state.proficiencies.insert(category, value);
        match category {
            ProficiencyCategory::SavingThrows => {
                if let Ok(ability) = value.parse::<Ability>() {
                    state.saving_throws.entry(ability).or_default().proficient = true;
                }
            }
            ProficiencyCategory::Skills => {
                if let Ok(skill) = value.parse::<Skill>() {
                    skill_record(state, skill).proficient = true;
                }
            }
            _ => {}
        }
    }
    Ok(None)
}

pub(super) fn skill_proficiency(state: &mut DerivedState, skills: &[Skill]) -> Outcome {
    for &skill in skills {
        skill_record(state, skill).proficient = true;
        state
            .proficiencies
            .insert(ProficiencyCategory::Skills, skill.name());
    }
    Ok(None)
}

pub(super) fn skill_expertise(state: &mut DerivedState, skills: &[Skill]) -> Outcome {
    for &skill in skills {
        skill_record(state, skill).expertise = true;
        insert_unique(&mut state.expertise, skill);
    }
    Ok(None)
}

pub(super) fn skill_bonus(
    state: &mut DerivedState,
    target: SkillTarget,
    value: &NumericValue,
    stacking: StackingRule,
) -> Outcome {
    let value = resolve_value(value, state);
    for skill in target.skills() {
        let record = skill_record(state, skill);
        record.bonus = stacking.combine(record.bonus, value);
    }
    Ok(Some(value))
}
