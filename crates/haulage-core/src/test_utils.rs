//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::compat::SPECIALIZATION_FIELD;
use crate::container::Chest;
use crate::grid::GridPosition;
use crate::id::*;
use crate::item::{ItemCategory, ItemStack};
use crate::producer::MachineInstance;
use crate::registry::{InputMatch, MachineDef, Registry, RegistryBuilder};
use crate::specialization::Specialization;
use crate::worker::PathPlanner;
use crate::world::{Environment, EntityKind, Hub, Terrain, World};
use std::sync::Arc;

// ===========================================================================
// Item constructors (ids match `sample_registry` registration order)
// ===========================================================================

pub fn copper_ore() -> ItemTypeId {
    ItemTypeId(0)
}
pub fn copper_bar() -> ItemTypeId {
    ItemTypeId(1)
}
pub fn coal() -> ItemTypeId {
    ItemTypeId(2)
}
pub fn milk() -> ItemTypeId {
    ItemTypeId(3)
}
pub fn cheese() -> ItemTypeId {
    ItemTypeId(4)
}
pub fn wheat() -> ItemTypeId {
    ItemTypeId(5)
}
pub fn beer() -> ItemTypeId {
    ItemTypeId(6)
}
pub fn bait() -> ItemTypeId {
    ItemTypeId(7)
}
pub fn crab() -> ItemTypeId {
    ItemTypeId(8)
}
pub fn tomato() -> ItemTypeId {
    ItemTypeId(9)
}
pub fn tomato_seeds() -> ItemTypeId {
    ItemTypeId(10)
}
pub fn pine_tar() -> ItemTypeId {
    ItemTypeId(11)
}
pub fn mystery_box() -> ItemTypeId {
    ItemTypeId(12)
}
pub fn egg() -> ItemTypeId {
    ItemTypeId(13)
}
pub fn mayonnaise() -> ItemTypeId {
    ItemTypeId(14)
}

// ===========================================================================
// Machine constructors
// ===========================================================================

pub fn furnace() -> MachineTypeId {
    MachineTypeId(0)
}
pub fn cheese_press() -> MachineTypeId {
    MachineTypeId(1)
}
pub fn keg() -> MachineTypeId {
    MachineTypeId(2)
}
pub fn incubator() -> MachineTypeId {
    MachineTypeId(3)
}
pub fn worm_bin() -> MachineTypeId {
    MachineTypeId(4)
}
pub fn mayonnaise_machine() -> MachineTypeId {
    MachineTypeId(5)
}
pub fn mystery_machine() -> MachineTypeId {
    MachineTypeId(6)
}

pub fn wood_path() -> FlooringId {
    FlooringId(0)
}
pub fn stone_path() -> FlooringId {
    FlooringId(1)
}

// ===========================================================================
// Registry
// ===========================================================================

pub fn sample_registry() -> Registry {
    let mut b = RegistryBuilder::new();
    let ore = b.register_item("copper_ore", ItemCategory::Metal, &["ore"]);
    let bar = b.register_item("copper_bar", ItemCategory::Metal, &["bar"]);
    let coal = b.register_item("coal", ItemCategory::Mineral, &["coal"]);
    let milk = b.register_item("milk", ItemCategory::Milk, &[]);
    let cheese = b.register_item("cheese", ItemCategory::ArtisanGoods, &[]);
    let wheat = b.register_item("wheat", ItemCategory::Vegetable, &["crop"]);
    let beer = b.register_item("beer", ItemCategory::ArtisanGoods, &[]);
    let bait = b.register_item("bait", ItemCategory::Bait, &[]);
    b.register_item("crab", ItemCategory::Fish, &["fish"]);
    b.register_item("tomato", ItemCategory::Vegetable, &["crop"]);
    b.register_item("tomato_seeds", ItemCategory::Seed, &[]);
    b.register_item("pine_tar", ItemCategory::Syrup, &["sap"]);
    let mystery = b.register_item("mystery_box", ItemCategory::Misc, &[]);
    let egg = b.register_item("egg", ItemCategory::Egg, &["egg"]);
    let mayo = b.register_item("mayonnaise", ItemCategory::ArtisanGoods, &[]);

    b.register_machine(
        MachineDef::new("Furnace")
            .rule(InputMatch::Item(ore), 5, bar, 30)
            .additional_input(InputMatch::Item(coal), 1),
    );
    b.register_machine(MachineDef::new("Cheese Press").rule(InputMatch::Item(milk), 1, cheese, 200));
    b.register_machine(MachineDef::new("Keg").rule(InputMatch::Item(wheat), 1, beer, 100));
    b.register_machine(
        MachineDef::new("Incubator")
            .rule(InputMatch::Item(egg), 1, egg, 600)
            .excluded(),
    );
    b.register_machine(
        MachineDef::new("Worm Bin")
            .rule(InputMatch::Item(wheat), 1, bait, 1440)
            .recalculate_on_collect(),
    );
    b.register_machine(
        MachineDef::new("Mayonnaise Machine")
            .rule(InputMatch::Item(egg), 1, mayo, 180)
            .custom_field(SPECIALIZATION_FIELD, "husbandry"),
    );
    b.register_machine(
        MachineDef::new("Mystery Machine")
            .rule(InputMatch::Item(mystery), 1, mystery, 60)
            .custom_field(SPECIALIZATION_FIELD, "bogus"),
    );

    b.register_flooring("wood_path");
    b.register_flooring("stone_path");

    b.build().expect("sample registry is valid")
}

// ===========================================================================
// World builders
// ===========================================================================

pub fn test_world(environment: Environment) -> World {
    World::new(Arc::new(sample_registry()), environment)
}

/// Indoor world whose only walkable tiles are the row `y = 0`, from
/// `x = -20` to `x = 20`. Entities go on row `y = 1`.
pub fn corridor_world() -> World {
    let mut world = test_world(Environment::Indoor);
    world.fill_terrain(GridPosition::new(-20, 0), GridPosition::new(20, 0), Terrain::open());
    world
}

/// [`corridor_world`] plus a one-worker hub at `(0, -1)` serviced from
/// `(0, 0)`.
pub fn corridor_world_with_hub(specialization: Specialization) -> (World, EntityId) {
    let mut world = corridor_world();
    let hub = place_hub(
        &mut world,
        GridPosition::new(0, -1),
        GridPosition::new(0, 0),
        specialization,
        1,
    );
    (world, hub)
}

/// Outdoor world with a wood path along `y = 0` and the same hub layout as
/// [`corridor_world_with_hub`].
pub fn outdoor_path_world(specialization: Specialization) -> (World, EntityId) {
    let mut world = test_world(Environment::Outdoor);
    world.fill_terrain(
        GridPosition::new(-20, 0),
        GridPosition::new(20, 0),
        Terrain::floored(wood_path()),
    );
    let hub = place_hub(
        &mut world,
        GridPosition::new(0, -1),
        GridPosition::new(0, 0),
        specialization,
        1,
    );
    (world, hub)
}

pub fn place_hub(
    world: &mut World,
    tile: GridPosition,
    access_point: GridPosition,
    specialization: Specialization,
    workers: u32,
) -> EntityId {
    world
        .place(tile, EntityKind::Hub(Hub::new(access_point, specialization, workers)))
        .expect("hub tile is free")
}

pub fn place_chest(world: &mut World, tile: GridPosition, items: Vec<ItemStack>) -> EntityId {
    world
        .place(tile, EntityKind::Chest(Chest::default().with_items(items)))
        .expect("chest tile is free")
}

pub fn place_machine(world: &mut World, tile: GridPosition, machine: MachineInstance) -> EntityId {
    world
        .place(tile, EntityKind::Machine(machine))
        .expect("machine tile is free")
}

// ===========================================================================
// Path planners
// ===========================================================================

/// Every destination is reachable in one step.
pub struct StraightLinePlanner;

impl PathPlanner for StraightLinePlanner {
    fn try_plan_path(&self, from: GridPosition, to: GridPosition) -> Option<Vec<GridPosition>> {
        Some(vec![from, to])
    }
}

/// Nothing is reachable.
pub struct NoPathPlanner;

impl PathPlanner for NoPathPlanner {
    fn try_plan_path(&self, _from: GridPosition, _to: GridPosition) -> Option<Vec<GridPosition>> {
        None
    }
}
