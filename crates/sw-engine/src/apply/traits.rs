//! Set-like grants: features, tags, restrictions, conditions,
//! resistances, immunities.

use sw_model::derived::{DerivedState, Feature, insert_unique};
use sw_model::effect::RestrictionCategory;
use sw_model::provenance::SkipReason;

use super::Outcome;

fn insert_all(list: &mut Vec<String>, values: &[String]) {
    for value in values {
        insert_unique(list, value.clone());
    }
}

/// First grant of a feature id wins.
pub(super) fn grant_feature(
    state: &mut DerivedState,
    source_id: &str,
    feature: &str,
    name: Option<&str>,
    description: Option<&str>,
) -> Outcome {
    if state.has_feature(feature) {
        return Err(SkipReason::FeatureAlreadyGranted {
            feature: feature.to_string(),
        });
    }
    state.features.push(Feature {
        id: feature.to_string(),
        name: name.unwrap_or(feature).to_string(),
        description: description.map(str::to_string),
        source_id: source_id.to_string(),
    });
    Ok(None)
}

pub(super) fn tag(state: &mut DerivedState, tags: &[String]) -> Outcome {
    insert_all(&mut state.tags, tags);
    Ok(None)
}

pub(super) fn equipment_restriction(
    state: &mut DerivedState,
    category: RestrictionCategory,
    values: &[String],
) -> Outcome {
    let list = match category {
        RestrictionCategory::Armor => &mut state.equipment_restrictions.armor,
        RestrictionCategory::Weapons => &mut state.equipment_restrictions.weapons,
        RestrictionCategory::Shields => &mut state.equipment_restrictions.shields,
    };
    insert_all(list, values);
    Ok(None)
}

pub(super) fn condition(state: &mut DerivedState, conditions: &[String]) -> Outcome {
    insert_all(&mut state.conditions, conditions);
    Ok(None)
}

pub(super) fn damage_resistance(state: &mut DerivedState, damage_types: &[String]) -> Outcome {
    insert_all(&mut state.damage_resistances, damage_types);
    Ok(None)
}

pub(super) fn condition_immunity(state: &mut DerivedState, conditions: &[String]) -> Outcome {
    insert_all(&mut state.condition_immunities, conditions);
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn feature_first_grant_wins() {
        let mut state = DerivedState::default();
        grant_feature(&mut state, "class:monk", "evasion", Some("Evasion"), None).unwrap();
        let again = grant_feature(&mut state, "class:rogue", "evasion", Some("Evasion (Rogue)"), None);
        assert_eq!(
            again,
            Err(SkipReason::FeatureAlreadyGranted {
                feature: "evasion".to_string()
            })
        );
        assert_eq!(state.features.len(), 1);
        assert_eq!(state.features[0].source_id, "class:monk");
    }

    #[test]
    fn feature_name_defaults_to_id() {
        let mut state = DerivedState::default();
        grant_feature(&mut state, "feat:lucky", "lucky", None, Some("Reroll a d20")).unwrap();
        assert_eq!(state.features[0].name, "lucky");
        assert_eq!(state.features[0].description.as_deref(), Some("Reroll a d20"));
    }

    #[test]
    fn set_insertions_are_idempotent() {
        let mut state = DerivedState::default();
        let poison = strings(&["poison"]);
        damage_resistance(&mut state, &poison).unwrap();
        damage_resistance(&mut state, &poison).unwrap();
        condition_immunity(&mut state, &strings(&["charmed", "charmed"])).unwrap();
        condition(&mut state, &strings(&["raging"])).unwrap();
        tag(&mut state, &strings(&["dwarf", "dwarf"])).unwrap();
        equipment_restriction(&mut state, RestrictionCategory::Armor, &strings(&["heavy"])).unwrap();

        assert_eq!(state.damage_resistances, vec!["poison"]);
        assert_eq!(state.condition_immunities, vec!["charmed"]);
        assert_eq!(state.conditions, vec!["raging"]);
        assert_eq!(state.tags, vec!["dwarf"]);
        assert_eq!(state.equipment_restrictions.armor, vec!["heavy"]);
    }
}
