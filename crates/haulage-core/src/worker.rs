//! Executing an assignment.
//!
//! Path planning and re-validation happen first; the world is only mutated
//! once everything checks out. A failed execution leaves the world untouched
//! and the plan is simply dropped. The next planning pass finds fresh work.

use crate::assignment::{Assignment, AssignmentKind};
use crate::classify::{Occupant, classify};
use crate::config::EngineConfig;
use crate::container::Container;
use crate::grid::GridPosition;
use crate::id::EntityId;
use crate::item::{ItemStack, ReservedItems};
use crate::producer::{Producer, ProducerState};
use crate::world::World;
use tracing::warn;

/// Locomotion between two known tiles, provided by the host.
pub trait PathPlanner {
    fn try_plan_path(&self, from: GridPosition, to: GridPosition) -> Option<Vec<GridPosition>>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecuteError {
    #[error("no path from {from:?} to {to:?}")]
    Unreachable { from: GridPosition, to: GridPosition },
    #[error("hub {0:?} no longer exists")]
    MissingHub(EntityId),
    #[error("stale assignment: {0}")]
    Stale(&'static str),
}

/// A completed trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    pub to_source: Vec<GridPosition>,
    pub to_target: Vec<GridPosition>,
    pub moved: Vec<ItemStack>,
}

fn stale(assignment: &Assignment, reason: &'static str) -> ExecuteError {
    warn!(
        hub = ?assignment.hub,
        source = ?assignment.source,
        target = ?assignment.target,
        reason,
        "discarding stale assignment"
    );
    ExecuteError::Stale(reason)
}

fn plan<P: PathPlanner + ?Sized>(
    planner: &P,
    from: GridPosition,
    to: GridPosition,
) -> Result<Vec<GridPosition>, ExecuteError> {
    planner
        .try_plan_path(from, to)
        .ok_or(ExecuteError::Unreachable { from, to })
}

fn producer_at(
    world: &World,
    assignment: &Assignment,
    tile: GridPosition,
    id: EntityId,
) -> Result<Producer, ExecuteError> {
    match classify(world, tile) {
        Occupant::Producer(p) if p.entity == id => Ok(p),
        _ => Err(stale(assignment, "producer is gone")),
    }
}

fn container_at(
    world: &World,
    assignment: &Assignment,
    tile: GridPosition,
    id: EntityId,
) -> Result<Container, ExecuteError> {
    match classify(world, tile) {
        Occupant::Container(c) if c.entity == id => Ok(c),
        _ => Err(stale(assignment, "container is gone")),
    }
}

/// Walk hub -> source -> target and move the items.
pub fn execute<P: PathPlanner + ?Sized>(
    world: &mut World,
    config: &EngineConfig,
    assignment: &Assignment,
    planner: &P,
    reserved: ReservedItems<'_>,
) -> Result<Trip, ExecuteError> {
    let start = world
        .hub(assignment.hub)
        .ok_or(ExecuteError::MissingHub(assignment.hub))?
        .access_point;
    let to_source = plan(planner, start, assignment.source_tile)?;
    let to_target = plan(planner, assignment.source_tile, assignment.target_tile)?;

    let moved = match assignment.kind {
        AssignmentKind::Fetch => fetch(world, config, assignment, reserved)?,
        AssignmentKind::Deliver { .. } => deliver(world, assignment, reserved)?,
    };
    Ok(Trip {
        to_source,
        to_target,
        moved,
    })
}

fn fetch(
    world: &mut World,
    config: &EngineConfig,
    assignment: &Assignment,
    reserved: ReservedItems<'_>,
) -> Result<Vec<ItemStack>, ExecuteError> {
    let container = container_at(world, assignment, assignment.source_tile, assignment.source)?;
    let producer = producer_at(world, assignment, assignment.target_tile, assignment.target)?;

    if producer.state(world) != ProducerState::Idle {
        return Err(stale(assignment, "producer is no longer idle"));
    }
    if producer
        .recipe(world, config, &assignment.items, reserved)
        .is_none()
    {
        return Err(stale(assignment, "items no longer form a recipe"));
    }
    if assignment.items.iter().any(|s| reserved.contains(s)) {
        return Err(stale(assignment, "items became reserved"));
    }
    let Some(mut carried) = container.withdraw(world, &assignment.items) else {
        return Err(stale(assignment, "container is short"));
    };

    if !producer.fill(world, config, &mut carried, reserved) {
        if !container.store(world, &carried) {
            warn!(container = ?container.entity, ?carried, "could not return refused items");
        }
        return Err(stale(assignment, "producer refused the items"));
    }
    if !carried.is_empty() && !container.store(world, &carried) {
        warn!(container = ?container.entity, ?carried, "could not return leftover items");
    }
    Ok(assignment.items.clone())
}

fn deliver(
    world: &mut World,
    assignment: &Assignment,
    reserved: ReservedItems<'_>,
) -> Result<Vec<ItemStack>, ExecuteError> {
    let producer = producer_at(world, assignment, assignment.source_tile, assignment.source)?;
    let container = container_at(world, assignment, assignment.target_tile, assignment.target)?;

    if producer.state(world) != ProducerState::AwaitingPickup {
        return Err(stale(assignment, "producer has nothing to collect"));
    }
    match producer.deliverable(world, reserved) {
        Some(products) if products == assignment.items => {}
        _ => return Err(stale(assignment, "held products changed")),
    }
    if !container.fits_all(world, &assignment.items) {
        return Err(stale(assignment, "container has no room"));
    }

    let collected = producer.collect(world);
    if !container.store(world, &collected) {
        warn!(container = ?container.entity, ?collected, "store failed after a successful fit check");
    }
    Ok(collected)
}
