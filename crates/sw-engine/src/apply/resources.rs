//! Limited-use resources and attunement capacity.

use sw_model::derived::{DerivedState, Resource, insert_unique};
use sw_model::effect::{Recharge, StackingRule};
use sw_model::formula::NumericValue;
use sw_model::provenance::SkipReason;

use super::{Outcome, resolve_value};

/// Fields of a `resource` effect.
pub(super) struct ResourceGrant<'a> {
    pub id: &'a str,
    pub name: Option<&'a str>,
    pub value: &'a NumericValue,
    pub recharge: Recharge,
    pub stacking: StackingRule,
}

/// The first grant creates the pool; later grants combine into both `max`
/// and `current`.
pub(super) fn resource(state: &mut DerivedState, source_id: &str, grant: ResourceGrant<'_>) -> Outcome {
    let value = resolve_value(grant.value, state);
    match state.resources.get_mut(grant.id) {
        Some(existing) => {
            existing.max = grant.stacking.combine(existing.max, value);
            existing.current = grant.stacking.combine(existing.current, value);
            insert_unique(&mut existing.sources, source_id.to_string());
        }
        None => {
            state.resources.insert(
                grant.id.to_string(),
                Resource {
                    id: grant.id.to_string(),
                    name: grant.name.unwrap_or(grant.id).to_string(),
                    max: value,
                    current: value,
                    recharge: grant.recharge,
                    sources: vec![source_id.to_string()],
                },
            );
        }
    }
    Ok(Some(value))
}

/// Raise attunement capacity to at least `slots`.
pub(super) fn attunement(state: &mut DerivedState, slots: &NumericValue) -> Outcome {
    let value = resolve_value(slots, state);
    let Ok(slots) = u32::try_from(value) else {
        return Err(SkipReason::InvalidValue {
            message: format!("attunement slots {value} is negative"),
        });
    };
    state.attunement.max = state.attunement.max.max(slots);
    Ok(Some(value))
}
