//! The execution engine: owns one evaluation run from base facts to a
//! finalized derived state.

use sw_model::ability::{Ability, Skill, proficiency_bonus};
use sw_model::derived::{
    AbilityRecord, Attunement, DerivedState, PendingChoice, PendingOption, SavingThrow,
    SkillRecord, insert_unique,
};
use sw_model::facts::BaseFacts;
use sw_model::provenance::ProvenanceLog;
use sw_model::sourced::SourcedEffect;

use crate::apply::apply;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::finalize::finalize_with;
use crate::predicate::{PredicateContext, evaluate_all};
use crate::schedule::{Phase, schedule};

/// Build a blank accumulator from base facts.
///
/// Ability records, proficiency bonus, unarmored armor class, initiative,
/// and tags (including synthetic equipment tags) are seeded here; every
/// other list starts empty.
pub fn initialize(facts: &BaseFacts, config: &EngineConfig) -> DerivedState {
    let level = facts.total_level();
    let mut state = DerivedState {
        level,
        class_levels: facts.class_levels.clone(),
        proficiency_bonus: proficiency_bonus(level),
        attunement: Attunement {
            max: config.attunement_slots,
            attuned: facts.attuned.clone(),
        },
        ..DerivedState::default()
    };

    for ability in Ability::ALL {
        state
            .abilities
            .insert(ability, AbilityRecord::from_score(facts.abilities.get(ability)));
        state.saving_throws.insert(ability, SavingThrow::default());
    }
    for skill in Skill::ALL {
        state.skills.insert(skill, SkillRecord::untrained(skill));
    }

    let dex = state.modifier(Ability::Dex);
    state.armor_class.value = config.base_armor_class.saturating_add(dex);
    state.initiative.total = dex;

    for tag in &facts.tags {
        state.add_tag(tag.clone());
    }
    if facts.equipped.armor.is_some() {
        state.add_tag("wearing-armor");
    }
    if facts.equipped.shield.is_some() {
        state.add_tag("wielding-shield");
    }
    if !facts.equipped.weapons.is_empty() {
        state.add_tag("wielding-weapon");
    }
    for condition in &facts.conditions {
        insert_unique(&mut state.conditions, condition.clone());
    }

    state
}

/// Choices that are unanswered, match the edition, and whose predicates
/// hold against the state as it stands now.
fn pending_choices<'a>(
    facts: &BaseFacts,
    state: &DerivedState,
    effects: impl IntoIterator<Item = &'a SourcedEffect>,
) -> Vec<PendingChoice> {
    let ctx = PredicateContext::with_state(facts, state);
    effects
        .into_iter()
        .filter_map(|sourced| {
            let choice = sourced.choice.as_ref()?;
            if sourced.edition.is_some_and(|e| e != facts.edition)
                || facts.choices.contains_key(&choice.id)
                || !evaluate_all(&choice.predicates, &ctx)
            {
                return None;
            }
            Some(PendingChoice {
                source_id: sourced.source_id.clone(),
                choice_id: choice.id.clone(),
                prompt: choice.prompt.clone(),
                count: choice.count,
                options: choice
                    .options
                    .iter()
                    .map(|o| PendingOption {
                        id: o.id.clone(),
                        label: o.label.clone(),
                    })
                    .collect(),
            })
        })
        .collect()
}

fn run(
    config: &EngineConfig,
    facts: &BaseFacts,
    permanent: &[SourcedEffect],
    temporary: &[SourcedEffect],
) -> DerivedState {
    let mut state = initialize(facts, config);
    let mut log = ProvenanceLog::new();

    let scheduled = schedule(permanent);
    let mut phase: Option<Phase> = None;
    for entry in &scheduled {
        if phase != Some(entry.phase) {
            tracing::debug!(phase = %entry.phase, "entering phase");
            phase = Some(entry.phase);
        }
        apply(facts, &mut state, &mut log, entry.effect);
    }

    tracing::debug!(count = temporary.len(), "applying temporary effects");
    for sourced in temporary {
        apply(facts, &mut state, &mut log, sourced);
    }

    state.pending_choices = pending_choices(
        facts,
        &state,
        scheduled.iter().map(|s| s.effect).chain(temporary),
    );
    state.provenance = log.into_entries();
    finalize_with(&mut state, config);

    tracing::debug!(
        entries = state.provenance.len(),
        pending = state.pending_choices.len(),
        "evaluation complete"
    );
    state
}

/// Evaluates characters under a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Create an engine.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate a character. Temporary effects are applied after every
    /// permanent phase, in the order given.
    pub fn evaluate(
        &self,
        facts: &BaseFacts,
        permanent: &[SourcedEffect],
        temporary: &[SourcedEffect],
    ) -> EngineResult<DerivedState> {
        if !self.config.enabled {
            return Err(EngineError::Disabled);
        }
        Ok(run(&self.config, facts, permanent, temporary))
    }
}

/// Evaluate a character with the default configuration.
pub fn evaluate(
    facts: &BaseFacts,
    permanent: &[SourcedEffect],
    temporary: &[SourcedEffect],
) -> DerivedState {
    run(&EngineConfig::default(), facts, permanent, temporary)
}
