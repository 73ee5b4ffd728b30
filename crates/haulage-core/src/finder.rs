//! The work finder: a bounded breadth-first sweep from a hub that returns the
//! first actionable pairing of a producer and a container.
//!
//! # Sweep
//!
//! 1. Compute the hub's floor set from the access point's orthogonal
//!    neighbors. An empty set means an isolated hub: no work.
//! 2. Seed a FIFO queue with the access point's walkable orthogonal
//!    neighbors.
//! 3. For each dequeued tile, inspect its orthogonal neighbors, then its
//!    diagonal ones. Occupants are classified once per entity. Only
//!    orthogonal walkable tiles are enqueued: a worker can reach into a
//!    diagonal corner but cannot walk diagonally.
//! 4. Every new container is matched against the producers found so far,
//!    and every new producer against the containers found so far. The first
//!    match is returned.
//! 5. When the queue runs dry, a full producer may be paired with any
//!    container that merely has room.
//!
//! Discovery order is proximity order, so the nearest satisfiable pairing
//! wins. Alternatives are never compared.

use crate::assignment::{Assignment, AssignmentKind};
use crate::classify::{Occupant, classify};
use crate::config::EngineConfig;
use crate::container::{Capacity, Container};
use crate::floor::{FloorSet, is_walkable, walkable_floor_set};
use crate::grid::GridPosition;
use crate::id::EntityId;
use crate::item::{ItemStack, ReservedItems};
use crate::producer::{Producer, ProducerState};
use crate::specialization::Specialization;
use crate::world::{World, WorldGrid};
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, trace};

/// Finds work for hubs in one world snapshot. Holds no state between calls.
#[derive(Debug, Clone, Copy)]
pub struct WorkFinder<'w> {
    world: &'w World,
    config: &'w EngineConfig,
    reserved: ReservedItems<'w>,
}

/// Per-call sweep state.
struct Sweep {
    hub: EntityId,
    specialization: Specialization,
    floors: FloorSet,
    queue: VecDeque<GridPosition>,
    visited: BTreeSet<GridPosition>,
    seen: BTreeSet<EntityId>,
    /// Full producers with the products they would deliver.
    full: Vec<(Producer, Vec<ItemStack>)>,
    empty: Vec<Producer>,
    containers: Vec<Container>,
}

impl<'w> WorkFinder<'w> {
    pub fn new(world: &'w World, config: &'w EngineConfig, reserved: ReservedItems<'w>) -> Self {
        Self {
            world,
            config,
            reserved,
        }
    }

    /// The first actionable assignment for `hub`, or `None`.
    pub fn find_project(&self, hub: EntityId, specialization: Specialization) -> Option<Assignment> {
        let access_point = self.world.hub(hub)?.access_point;
        let floors = walkable_floor_set(self.world, access_point);
        if floors.is_empty() {
            trace!(?hub, "hub has no walkable floor around its access point");
            return None;
        }

        let mut sweep = Sweep {
            hub,
            specialization,
            floors,
            queue: VecDeque::new(),
            visited: BTreeSet::from([access_point]),
            seen: BTreeSet::new(),
            full: Vec::new(),
            empty: Vec::new(),
            containers: Vec::new(),
        };
        for tile in access_point.orthogonal_neighbors() {
            if is_walkable(self.world, tile, &sweep.floors) && sweep.visited.insert(tile) {
                sweep.queue.push_back(tile);
            }
        }

        while let Some(tile) = sweep.queue.pop_front() {
            trace!(?hub, x = tile.x, y = tile.y, "sweeping tile");
            for neighbor in tile.orthogonal_neighbors() {
                if let Some(found) = self.inspect(&mut sweep, neighbor, true) {
                    return Some(self.found(found));
                }
            }
            for neighbor in tile.diagonal_neighbors() {
                if let Some(found) = self.inspect(&mut sweep, neighbor, false) {
                    return Some(self.found(found));
                }
            }
        }

        if self.config.fallback_delivery {
            return self.fallback(&sweep).map(|found| {
                debug!(?hub, "no container holds the product; using any container with room");
                self.found(found)
            });
        }
        None
    }

    fn found(&self, assignment: Assignment) -> Assignment {
        debug!(
            hub = ?assignment.hub,
            kind = ?assignment.kind,
            source = ?assignment.source,
            target = ?assignment.target,
            "assignment found"
        );
        assignment
    }

    fn inspect(&self, sweep: &mut Sweep, tile: GridPosition, orthogonal: bool) -> Option<Assignment> {
        if sweep.visited.contains(&tile) {
            return None;
        }
        let Some(id) = self.world.occupant_at(tile) else {
            if orthogonal && is_walkable(self.world, tile, &sweep.floors) {
                sweep.visited.insert(tile);
                sweep.queue.push_back(tile);
            }
            return None;
        };
        sweep.visited.insert(tile);
        if !sweep.seen.insert(id) {
            return None;
        }
        match classify(self.world, tile) {
            Occupant::Container(container) => self.on_container(sweep, container),
            Occupant::Producer(producer) => self.on_producer(sweep, producer),
            Occupant::Inert => None,
        }
    }

    fn on_container(&self, sweep: &mut Sweep, container: Container) -> Option<Assignment> {
        for (producer, products) in &sweep.full {
            let capacity = container.can_hold(self.world, products);
            if capacity >= Capacity::CanHoldAndHasMainProduct {
                return Some(deliver(sweep, producer, products, container, capacity));
            }
        }
        for producer in &sweep.empty {
            if let Some(items) = self.recipe_from(producer, container) {
                return Some(fetch(sweep, container, producer, items));
            }
        }
        sweep.containers.push(container);
        None
    }

    fn on_producer(&self, sweep: &mut Sweep, producer: Producer) -> Option<Assignment> {
        if !producer.is_compatible(self.world, sweep.specialization) {
            return None;
        }
        match producer.state(self.world) {
            ProducerState::Working => None,
            ProducerState::AwaitingPickup => {
                let products = producer.deliverable(self.world, self.reserved)?;
                for container in &sweep.containers {
                    let capacity = container.can_hold(self.world, &products);
                    if capacity >= Capacity::CanHoldAndHasMainProduct {
                        return Some(deliver(sweep, &producer, &products, *container, capacity));
                    }
                }
                sweep.full.push((producer, products));
                None
            }
            ProducerState::Idle => {
                for container in &sweep.containers {
                    if let Some(items) = self.recipe_from(&producer, *container) {
                        return Some(fetch(sweep, *container, &producer, items));
                    }
                }
                sweep.empty.push(producer);
                None
            }
        }
    }

    fn recipe_from(&self, producer: &Producer, container: Container) -> Option<Vec<ItemStack>> {
        producer.recipe(self.world, self.config, container.items(self.world), self.reserved)
    }

    fn fallback(&self, sweep: &Sweep) -> Option<Assignment> {
        for (producer, products) in &sweep.full {
            for container in &sweep.containers {
                let capacity = container.can_hold(self.world, products);
                if capacity.accepts() {
                    return Some(deliver(sweep, producer, products, *container, capacity));
                }
            }
        }
        None
    }
}

fn deliver(
    sweep: &Sweep,
    producer: &Producer,
    products: &[ItemStack],
    container: Container,
    capacity: Capacity,
) -> Assignment {
    Assignment {
        specialization: sweep.specialization,
        hub: sweep.hub,
        kind: AssignmentKind::Deliver { capacity },
        source: producer.entity,
        source_tile: producer.tile,
        target: container.entity,
        target_tile: container.tile,
        items: products.to_vec(),
    }
}

fn fetch(sweep: &Sweep, container: Container, producer: &Producer, items: Vec<ItemStack>) -> Assignment {
    Assignment {
        specialization: sweep.specialization,
        hub: sweep.hub,
        kind: AssignmentKind::Fetch,
        source: container.entity,
        source_tile: container.tile,
        target: producer.entity,
        target_tile: producer.tile,
        items,
    }
}

/// One-shot form of [`WorkFinder::find_project`].
pub fn find_project(
    world: &World,
    config: &EngineConfig,
    hub: EntityId,
    specialization: Specialization,
    reserved: ReservedItems<'_>,
) -> Option<Assignment> {
    WorkFinder::new(world, config, reserved).find_project(hub, specialization)
}
