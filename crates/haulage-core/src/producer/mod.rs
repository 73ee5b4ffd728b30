//! The producer family.
//!
//! Every producer kind shares one contract: a three-state lifecycle, recipe
//! resolution against a candidate collection, fill, collect and a
//! compatibility test against a hub specialization. Only the derivation of
//! each differs, so the family is a closed set of kinds dispatched by
//! `match` rather than trait objects.
//!
//! A [`Producer`] is a value projection: an entity id, its tile and the kind
//! the classifier assigned. All state lives in the [`World`].
//!
//! | Kind | Idle | Fill | Collect |
//! |------|------|------|---------|
//! | Machine | nothing held, no timer | resolved rule inputs | held product |
//! | Trap | no bait | one bait item | the catch |
//! | Pot | never | never | one queued harvest |
//! | OutputBin | always | eligible products | panics |

pub mod bin;
pub mod machine;
pub mod pot;
pub mod trap;

pub use bin::ShippingBin;
pub use machine::MachineInstance;
pub use pot::{Crop, GardenPot, POT_QUEUE_KEY};
pub use trap::CrabPot;

use crate::compat;
use crate::config::EngineConfig;
use crate::grid::GridPosition;
use crate::id::EntityId;
use crate::item::{ItemStack, ReservedItems};
use crate::specialization::Specialization;
use crate::world::{EntityKind, World};

/// The only states a producer can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProducerState {
    /// Empty and able to accept input.
    Idle,
    /// Processing; not interactable.
    Working,
    /// Holds a finished product.
    AwaitingPickup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProducerKind {
    /// Generic machine driven by registry rules.
    Machine,
    /// Crab-pot-like: baited, then yields a catch.
    Trap,
    /// Potted plant: push-only harvesting.
    Pot,
    /// Shipping bin or mini shipping bin: always hungry, never yields.
    OutputBin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Producer {
    pub entity: EntityId,
    pub tile: GridPosition,
    pub kind: ProducerKind,
}

impl Producer {
    pub fn new(entity: EntityId, tile: GridPosition, kind: ProducerKind) -> Self {
        Self { entity, tile, kind }
    }

    /// Current lifecycle state. A view whose entity has vanished or changed
    /// kind reads as `Working`, which nothing acts on.
    pub fn state(&self, world: &World) -> ProducerState {
        let Some(entity) = world.entity(self.entity) else {
            return ProducerState::Working;
        };
        match (self.kind, &entity.kind) {
            (ProducerKind::Machine, EntityKind::Machine(m)) => m.state(),
            (ProducerKind::Trap, EntityKind::CrabPot(p)) => p.state(),
            (ProducerKind::Pot, EntityKind::GardenPot(_)) => pot::state(entity),
            (ProducerKind::OutputBin, EntityKind::ShippingBin(_) | EntityKind::Chest(_)) => {
                ProducerState::Idle
            }
            _ => ProducerState::Working,
        }
    }

    /// Products a collect would return. Empty unless `AwaitingPickup`.
    pub fn held_products(&self, world: &World) -> Vec<ItemStack> {
        let Some(entity) = world.entity(self.entity) else {
            return Vec::new();
        };
        let held = match (self.kind, &entity.kind) {
            (ProducerKind::Machine, EntityKind::Machine(m)) => m.held,
            (ProducerKind::Trap, EntityKind::CrabPot(p)) => p.catch,
            (ProducerKind::Pot, EntityKind::GardenPot(_)) => pot::held(entity),
            _ => None,
        };
        held.into_iter().collect()
    }

    /// Held products that may be offered for delivery: all of them, or none
    /// if any is reserved.
    pub fn deliverable(&self, world: &World, reserved: ReservedItems<'_>) -> Option<Vec<ItemStack>> {
        let held = self.held_products(world);
        if held.is_empty() || held.iter().any(|s| reserved.contains(s)) {
            return None;
        }
        Some(held)
    }

    /// The items a fill from `source` would consume, without mutating
    /// anything. `None` when no recipe is available or the producer is not
    /// `Idle`.
    pub fn recipe(
        &self,
        world: &World,
        config: &EngineConfig,
        source: &[ItemStack],
        reserved: ReservedItems<'_>,
    ) -> Option<Vec<ItemStack>> {
        if self.state(world) != ProducerState::Idle {
            return None;
        }
        let registry = world.registry();
        match (self.kind, &world.entity(self.entity)?.kind) {
            (ProducerKind::Machine, EntityKind::Machine(m)) => {
                machine::resolve(registry, registry.get_machine(m.machine)?, source, reserved)
            }
            (ProducerKind::Trap, EntityKind::CrabPot(p)) => p.recipe(registry, source, reserved),
            (ProducerKind::OutputBin, EntityKind::ShippingBin(_)) => {
                bin::shipment(registry, &config.shipping, source, reserved)
            }
            (ProducerKind::OutputBin, EntityKind::Chest(c)) => {
                bin::shipment_for(c, registry, &config.shipping, source, reserved)
            }
            _ => None,
        }
    }

    /// Consume a recipe out of `source` and start processing. Returns
    /// `false`, touching nothing, if the producer is not `Idle` or `source`
    /// holds no recipe.
    pub fn fill(
        &self,
        world: &mut World,
        config: &EngineConfig,
        source: &mut Vec<ItemStack>,
        reserved: ReservedItems<'_>,
    ) -> bool {
        if self.state(world) != ProducerState::Idle {
            return false;
        }
        let Some((entity, registry)) = world.split_entity_mut(self.entity) else {
            return false;
        };
        match (self.kind, &mut entity.kind) {
            (ProducerKind::Machine, EntityKind::Machine(m)) => {
                machine::fill(m, registry, source, reserved)
            }
            (ProducerKind::Trap, EntityKind::CrabPot(p)) => p.fill(registry, source, reserved),
            (ProducerKind::OutputBin, EntityKind::ShippingBin(b)) => {
                bin::fill(&mut b.shipped, registry, &config.shipping, source, reserved)
            }
            (ProducerKind::OutputBin, EntityKind::Chest(c)) => {
                bin::fill_chest(c, registry, &config.shipping, source, reserved)
            }
            _ => false,
        }
    }

    /// Take the held product.
    ///
    /// # Panics
    ///
    /// If the producer is not `AwaitingPickup`, and always for output bins.
    /// Callers must check [`Producer::state`] first.
    pub fn collect(&self, world: &mut World) -> Vec<ItemStack> {
        if self.kind == ProducerKind::OutputBin {
            panic!("collect called on output bin {:?}; output bins never hold product", self.entity);
        }
        let state = self.state(world);
        if state != ProducerState::AwaitingPickup {
            panic!("collect called on producer {:?} in state {state:?}", self.entity);
        }
        let Some((entity, registry)) = world.split_entity_mut(self.entity) else {
            return Vec::new();
        };
        let product = if self.kind == ProducerKind::Pot {
            pot::collect(entity)
        } else {
            match (self.kind, &mut entity.kind) {
                (ProducerKind::Machine, EntityKind::Machine(m)) => {
                    let def = registry.get_machine(m.machine);
                    m.collect(registry, def)
                }
                (ProducerKind::Trap, EntityKind::CrabPot(p)) => p.collect(),
                _ => None,
            }
        };
        product.into_iter().collect()
    }

    /// Whether hubs of `specialization` may service this producer.
    pub fn is_compatible(&self, world: &World, specialization: Specialization) -> bool {
        match self.kind {
            ProducerKind::Trap => specialization == Specialization::Fishing,
            ProducerKind::Pot => specialization == Specialization::Farming,
            ProducerKind::OutputBin => true,
            ProducerKind::Machine => world.machine(self.entity).is_some_and(|m| {
                compat::machine_compatible(world.registry(), m.machine, specialization, m.held.as_ref())
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Chest, ChestKind};
    use crate::test_utils::*;

    fn at(x: i32) -> GridPosition {
        GridPosition::new(x, 1)
    }

    #[test]
    fn machine_view_round_trip() {
        let mut world = corridor_world();
        let id = place_machine(&mut world, at(0), MachineInstance::new(cheese_press()));
        let press = Producer::new(id, at(0), ProducerKind::Machine);
        let config = EngineConfig::default();

        assert_eq!(press.state(&world), ProducerState::Idle);
        let mut source = vec![ItemStack::new(milk(), 2)];
        assert_eq!(
            press.recipe(&world, &config, &source, ReservedItems::none()),
            Some(vec![ItemStack::new(milk(), 1)])
        );
        assert!(press.fill(&mut world, &config, &mut source, ReservedItems::none()));
        assert_eq!(source, vec![ItemStack::new(milk(), 1)]);
        assert_eq!(press.state(&world), ProducerState::Working);
        assert!(!press.fill(&mut world, &config, &mut source, ReservedItems::none()));
        assert_eq!(press.recipe(&world, &config, &source, ReservedItems::none()), None);

        world.advance_minutes(200);
        assert_eq!(press.held_products(&world), vec![ItemStack::new(cheese(), 1)]);
        assert_eq!(press.collect(&mut world), vec![ItemStack::new(cheese(), 1)]);
        assert_eq!(press.state(&world), ProducerState::Idle);
    }

    #[test]
    #[should_panic(expected = "in state Idle")]
    fn collect_outside_awaiting_pickup_panics() {
        let mut world = corridor_world();
        let id = place_machine(&mut world, at(0), MachineInstance::new(cheese_press()));
        Producer::new(id, at(0), ProducerKind::Machine).collect(&mut world);
    }

    #[test]
    #[should_panic(expected = "output bins never hold product")]
    fn collect_on_output_bin_panics() {
        let mut world = corridor_world();
        let id = world
            .place(at(0), EntityKind::ShippingBin(ShippingBin::default()))
            .unwrap();
        Producer::new(id, at(0), ProducerKind::OutputBin).collect(&mut world);
    }

    #[test]
    fn output_bins_are_always_idle_and_fill() {
        let mut world = corridor_world();
        let config = EngineConfig::default();
        let mini = world
            .place(
                at(0),
                EntityKind::Chest(Chest::new(9).with_kind(ChestKind::MiniShippingBin)),
            )
            .unwrap();
        let bin = Producer::new(mini, at(0), ProducerKind::OutputBin);
        let mut source = vec![ItemStack::new(cheese(), 2), ItemStack::new(milk(), 1)];
        assert!(bin.fill(&mut world, &config, &mut source, ReservedItems::none()));
        assert_eq!(bin.state(&world), ProducerState::Idle);
        assert_eq!(source, vec![ItemStack::new(milk(), 1)]);
        assert_eq!(world.chest(mini).map(|c| c.items.clone()), Some(vec![ItemStack::new(cheese(), 2)]));
        assert!(bin.held_products(&world).is_empty());
    }

    #[test]
    fn full_mini_bin_offers_no_recipe() {
        let mut world = corridor_world();
        let config = EngineConfig::default();
        let mini = world
            .place(
                at(0),
                EntityKind::Chest(
                    Chest::new(1)
                        .with_kind(ChestKind::MiniShippingBin)
                        .with_items(vec![ItemStack::new(beer(), 1)]),
                ),
            )
            .unwrap();
        let bin = Producer::new(mini, at(0), ProducerKind::OutputBin);
        let mut source = vec![ItemStack::new(cheese(), 5000)];

        assert_eq!(bin.recipe(&world, &config, &source, ReservedItems::none()), None);
        assert!(!bin.fill(&mut world, &config, &mut source, ReservedItems::none()));
        assert_eq!(world.chest(mini).map(|c| c.items.len()), Some(1));
        assert_eq!(source, vec![ItemStack::new(cheese(), 5000)]);
    }

    #[test]
    fn deliverable_hides_reserved_products() {
        let mut world = corridor_world();
        let product = ItemStack::new(cheese(), 1);
        let id = place_machine(&mut world, at(0), MachineInstance::holding(cheese_press(), product));
        let press = Producer::new(id, at(0), ProducerKind::Machine);
        let all = |_: &ItemStack| true;
        assert_eq!(press.deliverable(&world, ReservedItems::none()), Some(vec![product]));
        assert_eq!(press.deliverable(&world, ReservedItems::new(&all)), None);
    }

    #[test]
    fn specialized_kinds_have_fixed_compatibility() {
        let world = corridor_world();
        let fake = Producer::new(EntityId::default(), at(0), ProducerKind::Trap);
        assert!(fake.is_compatible(&world, Specialization::Fishing));
        assert!(!fake.is_compatible(&world, Specialization::Farming));
        let pot = Producer { kind: ProducerKind::Pot, ..fake };
        assert!(pot.is_compatible(&world, Specialization::Farming));
        let bin = Producer { kind: ProducerKind::OutputBin, ..fake };
        assert!(Specialization::ALL.iter().all(|s| bin.is_compatible(&world, *s)));
    }

    #[test]
    fn stale_view_reads_as_working() {
        let mut world = corridor_world();
        let id = place_machine(&mut world, at(0), MachineInstance::new(cheese_press()));
        let press = Producer::new(id, at(0), ProducerKind::Machine);
        world.remove(id).unwrap();
        assert_eq!(press.state(&world), ProducerState::Working);
        assert!(press.held_products(&world).is_empty());
    }
}
