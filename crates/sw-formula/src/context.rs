//! Variable resolution for formulas.
//!
//! A [`FormulaContext`] is a read-only snapshot of the character numbers a
//! formula may reference. Supported paths:
//!
//! - `abilities.<str|dex|con|int|wis|cha>.modifier`
//! - `abilities.<str|dex|con|int|wis|cha>.score`
//! - `proficiencyBonus`
//! - `level`
//! - `classLevels.<class>`
//! - `speeds.<walk|fly|swim|climb|burrow>`

use std::collections::BTreeMap;

use sw_model::ability::{Ability, ability_modifier};
use sw_model::effect::MovementType;

/// Numbers visible to formulas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaContext {
    scores: BTreeMap<Ability, i32>,
    proficiency_bonus: i32,
    level: u32,
    class_levels: BTreeMap<String, u32>,
    speeds: BTreeMap<MovementType, i32>,
}

impl Default for FormulaContext {
    fn default() -> Self {
        Self {
            scores: BTreeMap::new(),
            proficiency_bonus: 2,
            level: 1,
            class_levels: BTreeMap::new(),
            speeds: BTreeMap::new(),
        }
    }
}

impl FormulaContext {
    /// Empty context: scores 10, level 1, proficiency +2.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an ability score.
    pub fn with_score(mut self, ability: Ability, score: i32) -> Self {
        self.scores.insert(ability, score);
        self
    }

    /// Set the proficiency bonus.
    pub fn with_proficiency_bonus(mut self, bonus: i32) -> Self {
        self.proficiency_bonus = bonus;
        self
    }

    /// Set the total character level.
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Set one class's level. Class names are matched case-insensitively.
    pub fn with_class_level(mut self, class: &str, level: u32) -> Self {
        self.class_levels.insert(class.to_lowercase(), level);
        self
    }

    /// Set a movement speed.
    pub fn with_speed(mut self, movement: MovementType, feet: i32) -> Self {
        self.speeds.insert(movement, feet);
        self
    }

    fn score(&self, ability: Ability) -> i32 {
        self.scores.get(&ability).copied().unwrap_or(10)
    }

    /// Resolve a variable path. `None` means the path is not recognized.
    ///
    /// A class the character has no levels in, or a movement type it has no
    /// speed for, resolves to 0.
    pub fn lookup(&self, path: &str) -> Option<f64> {
        let segments: Vec<&str> = path.split('.').collect();
        let value = match segments.as_slice() {
            ["proficiencyBonus"] => self.proficiency_bonus,
            ["level"] => i32::try_from(self.level).unwrap_or(i32::MAX),
            ["abilities", ability, field] => {
                let score = self.score(ability.parse().ok()?);
                match *field {
                    "score" => score,
                    "modifier" => ability_modifier(score),
                    _ => return None,
                }
            }
            ["classLevels", class] => {
                let level = self
                    .class_levels
                    .get(&class.to_lowercase())
                    .copied()
                    .unwrap_or(0);
                i32::try_from(level).unwrap_or(i32::MAX)
            }
            ["speeds", movement] => {
                let movement: MovementType = movement.parse().ok()?;
                self.speeds.get(&movement).copied().unwrap_or(0)
            }
            _ => return None,
        };
        Some(f64::from(value))
    }

    /// Every concrete path this context can resolve.
    pub fn known_paths(&self) -> Vec<String> {
        let mut paths = vec!["proficiencyBonus".to_string(), "level".to_string()];
        for ability in Ability::ALL {
            paths.push(format!("abilities.{}.modifier", ability.tag()));
            paths.push(format!("abilities.{}.score", ability.tag()));
        }
        for class in self.class_levels.keys() {
            paths.push(format!("classLevels.{class}"));
        }
        for movement in MovementType::ALL {
            paths.push(format!("speeds.{}", movement.tag()));
        }
        paths
    }

    /// The closest known path to an unrecognized one, if any is close.
    pub fn suggest(&self, path: &str) -> Option<String> {
        self.known_paths()
            .into_iter()
            .map(|candidate| (strsim::jaro_winkler(path, &candidate), candidate))
            .filter(|(score, _)| *score > 0.8)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, candidate)| candidate)
    }
}

/// Whether `path` has the shape of a supported variable, independent of any
/// particular character.
pub fn is_variable_path(path: &str) -> bool {
    FormulaContext::new().lookup(path).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FormulaContext {
        FormulaContext::new()
            .with_score(Ability::Con, 16)
            .with_score(Ability::Dex, 9)
            .with_proficiency_bonus(3)
            .with_level(7)
            .with_class_level("Barbarian", 5)
            .with_speed(MovementType::Walk, 30)
    }

    #[test]
    fn resolves_ability_paths() {
        let ctx = ctx();
        assert_eq!(ctx.lookup("abilities.con.modifier"), Some(3.0));
        assert_eq!(ctx.lookup("abilities.con.score"), Some(16.0));
        assert_eq!(ctx.lookup("abilities.dex.modifier"), Some(-1.0));
        assert_eq!(ctx.lookup("abilities.wis.modifier"), Some(0.0));
    }

    #[test]
    fn resolves_scalars() {
        let ctx = ctx();
        assert_eq!(ctx.lookup("proficiencyBonus"), Some(3.0));
        assert_eq!(ctx.lookup("level"), Some(7.0));
    }

    #[test]
    fn class_levels_are_case_insensitive() {
        let ctx = ctx();
        assert_eq!(ctx.lookup("classLevels.barbarian"), Some(5.0));
        assert_eq!(ctx.lookup("classLevels.BARBARIAN"), Some(5.0));
        assert_eq!(ctx.lookup("classLevels.wizard"), Some(0.0));
    }

    #[test]
    fn missing_speed_is_zero() {
        let ctx = ctx();
        assert_eq!(ctx.lookup("speeds.walk"), Some(30.0));
        assert_eq!(ctx.lookup("speeds.fly"), Some(0.0));
        assert_eq!(ctx.lookup("speeds.teleport"), None);
    }

    #[test]
    fn unknown_paths() {
        let ctx = ctx();
        assert_eq!(ctx.lookup("abilities.luck.modifier"), None);
        assert_eq!(ctx.lookup("abilities.con.bonus"), None);
        assert_eq!(ctx.lookup("hitPoints"), None);
    }

    #[test]
    fn suggests_near_miss() {
        let ctx = ctx();
        assert_eq!(
            ctx.suggest("abilities.con.modifer"),
            Some("abilities.con.modifier".to_string())
        );
        assert_eq!(ctx.suggest("proficiency"), Some("proficiencyBonus".to_string()));
        assert_eq!(ctx.suggest("zzz"), None);
    }

    #[test]
    fn path_shapes() {
        assert!(is_variable_path("classLevels.anything"));
        assert!(is_variable_path("speeds.swim"));
        assert!(!is_variable_path("abilities.con"));
    }
}
