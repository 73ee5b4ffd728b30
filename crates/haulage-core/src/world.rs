//! The world arena: entities, tile occupancy and terrain.
//!
//! Entities live in a [`SlotMap`] keyed by [`EntityId`]; their tiles live in a
//! [`SpatialIndex`]. Producer and container views are never stored here: they
//! are projected from an entity and its tile on demand (see
//! [`crate::classify`]).

use crate::container::Chest;
use crate::floor::{self, FloorToken};
use crate::grid::{Footprint, GridPosition, SpatialError, SpatialIndex};
use crate::id::{EntityId, FlooringId};
use crate::producer::{CrabPot, GardenPot, MachineInstance, ShippingBin};
use crate::registry::Registry;
use crate::specialization::Specialization;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::BTreeMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

/// Whether the world is a roofed interior or open ground. Interiors treat
/// plain open tiles as floor; outdoors only laid flooring counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    #[default]
    Indoor,
    Outdoor,
}

/// Static properties of one tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terrain {
    pub passable: bool,
    pub placeable: bool,
    pub flooring: Option<FlooringId>,
}

impl Terrain {
    /// Walkable, buildable ground with nothing laid on it.
    pub fn open() -> Self {
        Self {
            passable: true,
            placeable: true,
            flooring: None,
        }
    }

    pub fn floored(flooring: FlooringId) -> Self {
        Self {
            flooring: Some(flooring),
            ..Self::open()
        }
    }

    /// Neither walkable nor buildable. Also the value of unknown tiles.
    pub fn wall() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A worker hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hub {
    /// The tile a worker stands on to service the hub.
    pub access_point: GridPosition,
    pub specialization: Specialization,
    pub workers: u32,
    /// Workers currently out on an assignment.
    pub busy: u32,
}

impl Hub {
    pub fn new(access_point: GridPosition, specialization: Specialization, workers: u32) -> Self {
        Self {
            access_point,
            specialization,
            workers,
            busy: 0,
        }
    }

    pub fn idle_workers(&self) -> u32 {
        self.workers.saturating_sub(self.busy)
    }
}

/// What an entity is. Raw world content; the classifier decides what role,
/// if any, it plays in logistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EntityKind {
    Hub(Hub),
    Machine(MachineInstance),
    CrabPot(CrabPot),
    GardenPot(GardenPot),
    Chest(Chest),
    ShippingBin(ShippingBin),
    /// Anything else (fences, furniture, third-party content).
    Other { name: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    /// Opaque key/value state persisted with the entity.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Entity {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            metadata: BTreeMap::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error(transparent)]
    Spatial(#[from] SpatialError),
    #[error("entity {0:?} not found")]
    NotFound(EntityId),
}

// ---------------------------------------------------------------------------
// WorldGrid
// ---------------------------------------------------------------------------

/// Read-only tile queries the work finder runs against.
pub trait WorldGrid {
    fn occupant_at(&self, tile: GridPosition) -> Option<EntityId>;
    fn floor_token_at(&self, tile: GridPosition) -> Option<FloorToken>;
    fn is_passable_and_placeable(&self, tile: GridPosition) -> bool;
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

pub struct World {
    registry: Arc<Registry>,
    environment: Environment,
    entities: SlotMap<EntityId, Entity>,
    spatial: SpatialIndex,
    terrain: BTreeMap<GridPosition, Terrain>,
}

impl World {
    pub fn new(registry: Arc<Registry>, environment: Environment) -> Self {
        Self {
            registry,
            environment,
            entities: SlotMap::with_key(),
            spatial: SpatialIndex::new(),
            terrain: BTreeMap::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    // -- Terrain --

    pub fn set_terrain(&mut self, tile: GridPosition, terrain: Terrain) {
        self.terrain.insert(tile, terrain);
    }

    /// Set every tile in the inclusive rectangle spanned by `a` and `b`.
    pub fn fill_terrain(&mut self, a: GridPosition, b: GridPosition, terrain: Terrain) {
        for y in a.y.min(b.y)..=a.y.max(b.y) {
            for x in a.x.min(b.x)..=a.x.max(b.x) {
                self.terrain.insert(GridPosition::new(x, y), terrain);
            }
        }
    }

    pub fn terrain(&self, tile: GridPosition) -> Terrain {
        self.terrain.get(&tile).copied().unwrap_or_default()
    }

    // -- Entities --

    /// Place a 1x1 entity.
    pub fn place(&mut self, tile: GridPosition, kind: EntityKind) -> Result<EntityId, WorldError> {
        self.place_with_footprint(tile, Footprint::single(), kind)
    }

    pub fn place_with_footprint(
        &mut self,
        origin: GridPosition,
        footprint: Footprint,
        kind: EntityKind,
    ) -> Result<EntityId, WorldError> {
        let id = self.entities.insert(Entity::new(kind));
        if let Err(e) = self.spatial.place(id, origin, footprint) {
            self.entities.remove(id);
            return Err(e.into());
        }
        Ok(id)
    }

    pub fn remove(&mut self, id: EntityId) -> Result<Entity, WorldError> {
        let entity = self.entities.remove(id).ok_or(WorldError::NotFound(id))?;
        self.spatial.remove(id)?;
        Ok(entity)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Mutable entity access alongside the registry it is defined against.
    pub(crate) fn split_entity_mut(&mut self, id: EntityId) -> Option<(&mut Entity, &Registry)> {
        let entity = self.entities.get_mut(id)?;
        Some((entity, &self.registry))
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Origin tile of an entity.
    pub fn position(&self, id: EntityId) -> Option<GridPosition> {
        self.spatial.get_position(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter()
    }

    pub(crate) fn entities_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut Entity)> {
        self.entities.iter_mut()
    }

    // -- Typed accessors --

    pub fn hubs(&self) -> impl Iterator<Item = (EntityId, &Hub)> {
        self.entities.iter().filter_map(|(id, e)| match &e.kind {
            EntityKind::Hub(hub) => Some((id, hub)),
            _ => None,
        })
    }

    pub fn hub(&self, id: EntityId) -> Option<&Hub> {
        match &self.entities.get(id)?.kind {
            EntityKind::Hub(hub) => Some(hub),
            _ => None,
        }
    }

    pub fn hub_mut(&mut self, id: EntityId) -> Option<&mut Hub> {
        match &mut self.entities.get_mut(id)?.kind {
            EntityKind::Hub(hub) => Some(hub),
            _ => None,
        }
    }

    pub fn chest(&self, id: EntityId) -> Option<&Chest> {
        match &self.entities.get(id)?.kind {
            EntityKind::Chest(chest) => Some(chest),
            _ => None,
        }
    }

    pub fn chest_mut(&mut self, id: EntityId) -> Option<&mut Chest> {
        match &mut self.entities.get_mut(id)?.kind {
            EntityKind::Chest(chest) => Some(chest),
            _ => None,
        }
    }

    pub fn machine(&self, id: EntityId) -> Option<&MachineInstance> {
        match &self.entities.get(id)?.kind {
            EntityKind::Machine(machine) => Some(machine),
            _ => None,
        }
    }

    pub fn machine_mut(&mut self, id: EntityId) -> Option<&mut MachineInstance> {
        match &mut self.entities.get_mut(id)?.kind {
            EntityKind::Machine(machine) => Some(machine),
            _ => None,
        }
    }
}

impl WorldGrid for World {
    fn occupant_at(&self, tile: GridPosition) -> Option<EntityId> {
        self.spatial.entity_at(tile)
    }

    fn floor_token_at(&self, tile: GridPosition) -> Option<FloorToken> {
        floor::floor_token(
            self.environment,
            &self.terrain(tile),
            self.spatial.is_occupied(tile),
        )
    }

    fn is_passable_and_placeable(&self, tile: GridPosition) -> bool {
        let terrain = self.terrain(tile);
        terrain.passable && terrain.placeable
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("environment", &self.environment)
            .field("entities", &self.entities.len())
            .field("terrain_tiles", &self.terrain.len())
            .finish()
    }
}
