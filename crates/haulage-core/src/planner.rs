use crate::assignment::Assignment;
use crate::config::EngineConfig;
use crate::finder::WorkFinder;
use crate::item::ReservedItems;
use crate::world::World;
use tracing::debug;

/// One planning pass: at most one assignment per hub, in arena order.
///
/// Hubs are planned independently. A hub with no idle worker is skipped
/// before any sweep.
pub fn plan_all(world: &World, config: &EngineConfig, reserved: ReservedItems<'_>) -> Vec<Assignment> {
    let finder = WorkFinder::new(world, config, reserved);
    world
        .hubs()
        .filter_map(|(id, hub)| {
            if hub.idle_workers() == 0 {
                debug!(hub = ?id, "no idle workers; skipping hub");
                return None;
            }
            finder.find_project(id, hub.specialization)
        })
        .collect()
}
