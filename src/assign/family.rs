use crate::assign::RunContext;
use crate::block::build_blocks;
use crate::flight::FlightId;
use crate::tat::TatTable;
use std::collections::HashSet;
use tracing::{debug, info};

/// Retries overflowed blocks on tails of sibling types in the same family.
pub(crate) fn substitute(ctx: &mut RunContext) {
    let scenario = ctx.scenario;
    let overflowed: HashSet<FlightId> = ctx.results.overflowed().iter().cloned().collect();
    let blocks = build_blocks(scenario.flights.iter().filter(|f| overflowed.contains(&f.id)));

    let mut recovered: HashSet<FlightId> = HashSet::new();
    for block in blocks.iter().filter(|b| b.is_well_formed()) {
        let Some(family) = scenario.families.family_of(&block.aircraft_type) else {
            continue;
        };
        let tails = scenario.aircraft_of_types(&scenario.families.siblings(&block.aircraft_type));
        if tails.is_empty() {
            continue;
        }
        let tat = scenario
            .tat
            .first_available(&family.types)
            .cloned()
            .unwrap_or_else(|| TatTable::flat(block.aircraft_type.clone(), scenario.config.fallback_tat_minutes));

        if ctx.place(block, &tails, &tat) {
            debug!(leg = %block.first_leg().id, family = %family.name, "placed on sibling type");
            recovered.extend(block.leg_ids().cloned());
        }
    }

    if !recovered.is_empty() {
        info!(legs = recovered.len(), "family substitution recovered overflow");
        ctx.results.retain_overflow(|id| !recovered.contains(id));
    }
}
