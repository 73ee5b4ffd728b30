//! Property-based tests for the haulage core engine.
//!
//! Uses proptest to generate random corridor layouts and container contents,
//! then verify planning and transfer invariants hold.

use haulage_core::assignment::AssignmentKind;
use haulage_core::config::EngineConfig;
use haulage_core::container::Chest;
use haulage_core::finder::find_project;
use haulage_core::grid::GridPosition;
use haulage_core::id::*;
use haulage_core::item::{ItemStack, Quality, ReservedItems, total_of};
use haulage_core::planner::plan_all;
use haulage_core::producer::{MachineInstance, Producer, ProducerKind, ProducerState};
use haulage_core::specialization::Specialization;
use haulage_core::test_utils::*;
use haulage_core::world::World;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

/// What sits on one tile of row `y = 1`.
#[derive(Debug, Clone)]
enum Slot {
    Empty,
    IdlePress,
    FullPress(Quality),
    MilkChest(u32, Quality),
    CheeseChest(u32),
}

fn arb_quality() -> impl Strategy<Value = Quality> {
    prop_oneof![Just(Quality::Normal), Just(Quality::Silver), Just(Quality::Gold)]
}

fn arb_slot() -> impl Strategy<Value = Slot> {
    prop_oneof![
        Just(Slot::Empty),
        Just(Slot::IdlePress),
        arb_quality().prop_map(Slot::FullPress),
        (1..5u32, arb_quality()).prop_map(|(q, quality)| Slot::MilkChest(q, quality)),
        (1..5u32).prop_map(Slot::CheeseChest),
    ]
}

fn build_world(slots: &[Slot]) -> (World, EntityId) {
    let (mut world, hub) = corridor_world_with_hub(Specialization::Husbandry);
    for (i, slot) in slots.iter().enumerate() {
        let tile = GridPosition::new(i as i32 - (slots.len() as i32 / 2), 1);
        match slot {
            Slot::Empty => {}
            Slot::IdlePress => {
                place_machine(&mut world, tile, MachineInstance::new(cheese_press()));
            }
            Slot::FullPress(quality) => {
                let product = ItemStack::new(cheese(), 1).with_quality(*quality);
                place_machine(&mut world, tile, MachineInstance::holding(cheese_press(), product));
            }
            Slot::MilkChest(q, quality) => {
                place_chest(&mut world, tile, vec![ItemStack::new(milk(), *q).with_quality(*quality)]);
            }
            Slot::CheeseChest(q) => {
                place_chest(&mut world, tile, vec![ItemStack::new(cheese(), *q)]);
            }
        }
    }
    (world, hub)
}

fn arb_stacks(max_len: usize) -> impl Strategy<Value = Vec<ItemStack>> {
    proptest::collection::vec(
        (0..3u32, 1..12u32).prop_map(|(item, q)| ItemStack::new(ItemTypeId(item), q)),
        0..=max_len,
    )
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Planning twice with no mutation in between gives the same answer.
    #[test]
    fn planning_is_idempotent(slots in proptest::collection::vec(arb_slot(), 1..16)) {
        let (world, hub) = build_world(&slots);
        let config = EngineConfig::default();
        let first = find_project(&world, &config, hub, Specialization::Husbandry, ReservedItems::none());
        let second = find_project(&world, &config, hub, Specialization::Husbandry, ReservedItems::none());
        prop_assert_eq!(first, second);
        prop_assert_eq!(
            plan_all(&world, &config, ReservedItems::none()),
            plan_all(&world, &config, ReservedItems::none())
        );
    }

    /// Gold items are reserved: they are never fetched nor delivered.
    #[test]
    fn reserved_items_never_move(slots in proptest::collection::vec(arb_slot(), 1..16)) {
        let (world, hub) = build_world(&slots);
        let config = EngineConfig::default();
        let gold = |s: &ItemStack| s.quality == Quality::Gold;
        let found = find_project(&world, &config, hub, Specialization::Husbandry, ReservedItems::new(&gold));
        if let Some(assignment) = found {
            prop_assert!(assignment.items.iter().all(|s| s.quality != Quality::Gold));
            if let AssignmentKind::Deliver { capacity } = assignment.kind {
                prop_assert!(capacity.accepts());
            }
        }
    }

    /// A withdraw either takes exactly the list or touches nothing.
    #[test]
    fn withdraw_is_all_or_nothing(items in arb_stacks(8), list in arb_stacks(4)) {
        let mut chest = Chest::new(16).with_items(items.clone());
        let satisfiable = list.iter().all(|line| total_of(&items, line) >= total_of(&list, line));

        match chest.withdraw(&list) {
            Some(taken) => {
                prop_assert!(satisfiable);
                prop_assert_eq!(&taken, &list);
                for line in &list {
                    prop_assert_eq!(
                        total_of(&chest.items, line),
                        total_of(&items, line) - total_of(&list, line)
                    );
                }
            }
            None => {
                prop_assert!(!satisfiable);
                prop_assert_eq!(&chest.items, &items);
            }
        }
    }

    /// Fill on a producer that is not idle never consumes anything.
    #[test]
    fn fill_outside_idle_is_a_no_op(source in arb_stacks(6), holding in any::<bool>()) {
        let mut world = corridor_world();
        let tile = GridPosition::new(0, 1);
        let machine = if holding {
            MachineInstance::holding(furnace(), ItemStack::new(copper_bar(), 1))
        } else {
            let mut m = MachineInstance::new(furnace());
            m.pending = Some(ItemStack::new(copper_bar(), 1));
            m.minutes_until_ready = 10;
            m
        };
        let id = place_machine(&mut world, tile, machine);
        let furnace = Producer::new(id, tile, ProducerKind::Machine);
        prop_assert_ne!(furnace.state(&world), ProducerState::Idle);

        let mut source = source;
        let before = source.clone();
        let config = EngineConfig::default();
        prop_assert!(!furnace.fill(&mut world, &config, &mut source, ReservedItems::none()));
        prop_assert_eq!(source, before);
    }
}
