//! Turn raw tile occupants into producer or container views.
//!
//! Rules apply in priority order:
//!
//! 1. Machines flagged `excluded` (or with no rules, or no definition) are
//!    inert.
//! 2. Crab pots and garden pots get their dedicated producers.
//! 3. Remaining machines become generic data-driven producers.
//! 4. Mini shipping bins and shipping bin buildings become output bins.
//! 5. Standard chests become containers; everything else is inert.
//!
//! Nothing here is an error: content the rules do not recognize is inert.

use crate::container::{ChestKind, Container};
use crate::grid::GridPosition;
use crate::id::EntityId;
use crate::producer::{Producer, ProducerKind};
use crate::registry::Registry;
use crate::world::{Entity, EntityKind, World, WorldGrid};

/// The logistics role of a tile occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant {
    Inert,
    Producer(Producer),
    Container(Container),
}

/// Classify whatever occupies `tile`. Empty tiles are inert.
pub fn classify(world: &World, tile: GridPosition) -> Occupant {
    let Some(id) = world.occupant_at(tile) else {
        return Occupant::Inert;
    };
    match world.entity(id) {
        Some(entity) => classify_entity(world.registry(), id, entity, tile),
        None => Occupant::Inert,
    }
}

pub fn classify_entity(registry: &Registry, id: EntityId, entity: &Entity, tile: GridPosition) -> Occupant {
    let producer = |kind| Occupant::Producer(Producer::new(id, tile, kind));
    match &entity.kind {
        EntityKind::Machine(m) => match registry.get_machine(m.machine) {
            Some(def) if !def.excluded && !def.rules.is_empty() => producer(ProducerKind::Machine),
            _ => Occupant::Inert,
        },
        EntityKind::CrabPot(_) => producer(ProducerKind::Trap),
        EntityKind::GardenPot(_) => producer(ProducerKind::Pot),
        EntityKind::ShippingBin(_) => producer(ProducerKind::OutputBin),
        EntityKind::Chest(chest) => match chest.kind {
            ChestKind::MiniShippingBin => producer(ProducerKind::OutputBin),
            ChestKind::Standard => Occupant::Container(Container::new(id, tile)),
            ChestKind::Locked => Occupant::Inert,
        },
        EntityKind::Hub(_) | EntityKind::Other { .. } => Occupant::Inert,
    }
}
