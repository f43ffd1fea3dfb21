//! Phase scheduling: grouping sourced effects into fixed, ordered phases.

use std::fmt;

use sw_model::sourced::SourcedEffect;

/// An ordering bucket. Variants are declared in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// `species:`, `lineage:`, `race:`
    Species,
    /// `background:`
    Background,
    /// `class:`
    Class,
    /// `subclass:`
    Subclass,
    /// `feat:`
    Feat,
    /// `item:`, `equipment:`, `armor:`, `weapon:`
    Item,
    /// `condition:`
    Condition,
    /// `spell:`, `temp:`, `temporary:`
    Temporary,
    /// Unrecognized prefix. Still applied, after every named phase.
    Unknown,
}

impl Phase {
    /// All phases in application order.
    pub const ALL: [Phase; 9] = [
        Phase::Species,
        Phase::Background,
        Phase::Class,
        Phase::Subclass,
        Phase::Feat,
        Phase::Item,
        Phase::Condition,
        Phase::Temporary,
        Phase::Unknown,
    ];

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Species => "species",
            Self::Background => "background",
            Self::Class => "class",
            Self::Subclass => "subclass",
            Self::Feat => "feat",
            Self::Item => "item",
            Self::Condition => "condition",
            Self::Temporary => "temporary",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// The phase a source id belongs to, from the text before its first `:`.
pub fn phase_of(source_id: &str) -> Phase {
    let prefix = source_id.split(':').next().unwrap_or_default();
    match prefix.trim().to_ascii_lowercase().as_str() {
        "species" | "lineage" | "race" => Phase::Species,
        "background" => Phase::Background,
        "class" => Phase::Class,
        "subclass" => Phase::Subclass,
        "feat" => Phase::Feat,
        "item" | "equipment" | "armor" | "weapon" => Phase::Item,
        "condition" => Phase::Condition,
        "spell" | "temp" | "temporary" => Phase::Temporary,
        _ => Phase::Unknown,
    }
}

/// A sourced effect with the phase it was scheduled into.
#[derive(Debug, Clone, Copy)]
pub struct Scheduled<'a> {
    /// Assigned phase.
    pub phase: Phase,
    /// The bundle.
    pub effect: &'a SourcedEffect,
}

/// Order effects by phase, then by `source_id`.
///
/// The sort is stable, so bundles sharing a source id keep their input
/// order.
pub fn schedule(effects: &[SourcedEffect]) -> Vec<Scheduled<'_>> {
    let mut scheduled: Vec<Scheduled<'_>> = effects
        .iter()
        .map(|effect| Scheduled {
            phase: phase_of(&effect.source_id),
            effect,
        })
        .collect();
    scheduled.sort_by(|a, b| {
        a.phase
            .cmp(&b.phase)
            .then_with(|| a.effect.source_id.cmp(&b.effect.source_id))
    });
    scheduled
}
