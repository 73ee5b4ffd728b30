//! Storage entities and the container view over them.

use crate::grid::GridPosition;
use crate::id::EntityId;
use crate::item::{ItemCategory, ItemStack, take_shopping_list};
use crate::registry::Registry;
use crate::world::{EntityKind, World};
use serde::{Deserialize, Serialize};

/// Slot count of an ordinary chest.
pub const DEFAULT_CHEST_SLOTS: usize = 36;

/// How well a container can take a product. Ordered by preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capacity {
    /// Never accepts this class of product.
    Unusable,
    NoSpace,
    CanHold,
    /// Can hold it, and already has a stack of it.
    CanHoldAndHasMainProduct,
    /// Designated for this kind of product.
    Preferred,
}

impl Capacity {
    pub fn accepts(self) -> bool {
        self >= Capacity::CanHold
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChestKind {
    #[default]
    Standard,
    /// A small chest that acts as a shipping bin.
    MiniShippingBin,
    /// Owned by someone else; never touched.
    Locked,
}

/// Category designation on a chest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChestFilter {
    #[default]
    Any,
    /// Accepts anything, prefers this category.
    Prefer(ItemCategory),
    /// Accepts only this category.
    Only(ItemCategory),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chest {
    pub kind: ChestKind,
    #[serde(default)]
    pub filter: ChestFilter,
    pub slots: usize,
    pub items: Vec<ItemStack>,
}

impl Default for Chest {
    fn default() -> Self {
        Self::new(DEFAULT_CHEST_SLOTS)
    }
}

impl Chest {
    pub fn new(slots: usize) -> Self {
        Self {
            kind: ChestKind::Standard,
            filter: ChestFilter::Any,
            slots,
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<ItemStack>) -> Self {
        self.items = items;
        self
    }

    pub fn with_filter(mut self, filter: ChestFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_kind(mut self, kind: ChestKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn free_slots(&self) -> usize {
        self.slots.saturating_sub(self.items.len())
    }

    fn admits(&self, category: Option<ItemCategory>) -> bool {
        match (self.kind, self.filter) {
            (ChestKind::Standard, ChestFilter::Only(only)) => category == Some(only),
            (ChestKind::Standard, _) => true,
            _ => false,
        }
    }

    fn designated_for(&self, category: Option<ItemCategory>) -> bool {
        match self.filter {
            ChestFilter::Prefer(c) | ChestFilter::Only(c) => category == Some(c),
            ChestFilter::Any => false,
        }
    }

    /// Capacity class for one product.
    pub fn capacity_for(&self, registry: &Registry, product: &ItemStack) -> Capacity {
        let category = registry.category(product.item);
        if !self.admits(category) {
            return Capacity::Unusable;
        }
        if self.placed(registry, std::slice::from_ref(product)).is_none() {
            return Capacity::NoSpace;
        }
        if self.designated_for(category) {
            Capacity::Preferred
        } else if self.items.iter().any(|s| s.can_stack_with(product)) {
            Capacity::CanHoldAndHasMainProduct
        } else {
            Capacity::CanHold
        }
    }

    /// Best capacity class across several products offered together.
    pub fn can_hold(&self, registry: &Registry, products: &[ItemStack]) -> Capacity {
        if self.kind != ChestKind::Standard {
            return Capacity::Unusable;
        }
        products
            .iter()
            .map(|p| self.capacity_for(registry, p))
            .max()
            .unwrap_or(Capacity::NoSpace)
    }

    /// The contents after storing `items`, or `None` if any of them fails to
    /// fit. Existing stacks are topped up before new slots are opened.
    fn placed(&self, registry: &Registry, items: &[ItemStack]) -> Option<Vec<ItemStack>> {
        if items.iter().any(|i| !self.admits(registry.category(i.item))) {
            return None;
        }
        self.stowed(registry, items)
    }

    /// Slot and stack placement alone; the chest kind and filter are not
    /// consulted.
    fn stowed(&self, registry: &Registry, items: &[ItemStack]) -> Option<Vec<ItemStack>> {
        let mut contents = self.items.clone();
        for item in items {
            if stow(registry, &mut contents, self.slots, item) < item.quantity {
                return None;
            }
        }
        Some(contents)
    }

    /// The part of `list` that fits, line by line in order. Used by bins
    /// that accept anything but have a fixed slot count.
    pub(crate) fn room_for(&self, registry: &Registry, list: &[ItemStack]) -> Vec<ItemStack> {
        let mut contents = self.items.clone();
        list.iter()
            .filter_map(|item| {
                let moved = stow(registry, &mut contents, self.slots, item);
                (moved > 0).then(|| item.with_quantity(moved))
            })
            .collect()
    }

    /// Like [`Chest::store`] but ignoring the chest kind and filter.
    pub(crate) fn deposit(&mut self, registry: &Registry, items: &[ItemStack]) -> bool {
        match self.stowed(registry, items) {
            Some(contents) => {
                self.items = contents;
                true
            }
            None => false,
        }
    }

    /// Store every item or none of them.
    pub fn store(&mut self, registry: &Registry, items: &[ItemStack]) -> bool {
        match self.placed(registry, items) {
            Some(contents) => {
                self.items = contents;
                true
            }
            None => false,
        }
    }

    /// Whether [`Chest::store`] would succeed.
    pub fn fits_all(&self, registry: &Registry, items: &[ItemStack]) -> bool {
        self.placed(registry, items).is_some()
    }

    /// Remove a shopping list; nothing is removed if any line is short.
    pub fn withdraw(&mut self, list: &[ItemStack]) -> Option<Vec<ItemStack>> {
        take_shopping_list(&mut self.items, list)
    }
}

/// Place as much of `item` into `contents` as `slots` allows and return how
/// many units went in.
fn stow(registry: &Registry, contents: &mut Vec<ItemStack>, slots: usize, item: &ItemStack) -> u32 {
    let max = registry.max_stack(item.item);
    let mut remaining = item.quantity;
    for stack in contents.iter_mut().filter(|s| s.can_stack_with(item)) {
        if remaining == 0 {
            break;
        }
        let moved = max.saturating_sub(stack.quantity).min(remaining);
        stack.quantity += moved;
        remaining -= moved;
    }
    while remaining > 0 && contents.len() < slots {
        let moved = remaining.min(max);
        contents.push(item.with_quantity(moved));
        remaining -= moved;
    }
    item.quantity - remaining
}

// ---------------------------------------------------------------------------
// Container view
// ---------------------------------------------------------------------------

/// A chest seen as a logistics container. Projected from the world on every
/// inspection; holds no state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container {
    pub entity: EntityId,
    pub tile: GridPosition,
}

impl Container {
    pub fn new(entity: EntityId, tile: GridPosition) -> Self {
        Self { entity, tile }
    }

    fn chest<'w>(&self, world: &'w World) -> Option<&'w Chest> {
        world.chest(self.entity)
    }

    pub fn items<'w>(&self, world: &'w World) -> &'w [ItemStack] {
        self.chest(world).map(|c| c.items.as_slice()).unwrap_or(&[])
    }

    pub fn can_hold(&self, world: &World, products: &[ItemStack]) -> Capacity {
        self.chest(world)
            .map(|c| c.can_hold(world.registry(), products))
            .unwrap_or(Capacity::Unusable)
    }

    pub fn fits_all(&self, world: &World, items: &[ItemStack]) -> bool {
        self.chest(world)
            .is_some_and(|c| c.fits_all(world.registry(), items))
    }

    pub fn store(&self, world: &mut World, items: &[ItemStack]) -> bool {
        match world.split_entity_mut(self.entity) {
            Some((entity, registry)) => match &mut entity.kind {
                EntityKind::Chest(chest) => chest.store(registry, items),
                _ => false,
            },
            None => false,
        }
    }

    pub fn withdraw(&self, world: &mut World, list: &[ItemStack]) -> Option<Vec<ItemStack>> {
        world.chest_mut(self.entity)?.withdraw(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Quality;
    use crate::registry::{ItemDef, RegistryBuilder};
    use crate::test_utils::*;

    fn small_stacks() -> (Registry, crate::id::ItemTypeId) {
        let mut b = RegistryBuilder::new();
        let pebble = b.register_item_def(ItemDef {
            name: "pebble".into(),
            category: ItemCategory::Mineral,
            tags: vec![],
            max_stack: 10,
        });
        (b.build().unwrap(), pebble)
    }

    #[test]
    fn capacity_precedence_is_ordered() {
        assert!(Capacity::Preferred > Capacity::CanHoldAndHasMainProduct);
        assert!(Capacity::CanHoldAndHasMainProduct > Capacity::CanHold);
        assert!(Capacity::CanHold > Capacity::NoSpace);
        assert!(Capacity::NoSpace > Capacity::Unusable);
        assert!(Capacity::CanHold.accepts());
        assert!(!Capacity::NoSpace.accepts());
    }

    #[test]
    fn capacity_classes() {
        let reg = sample_registry();
        let chest = Chest::new(2).with_items(vec![ItemStack::new(cheese(), 3)]);
        assert_eq!(
            chest.capacity_for(&reg, &ItemStack::new(cheese(), 1)),
            Capacity::CanHoldAndHasMainProduct
        );
        assert_eq!(chest.capacity_for(&reg, &ItemStack::new(milk(), 1)), Capacity::CanHold);

        let full = Chest::new(1).with_items(vec![ItemStack::new(cheese(), 3)]);
        assert_eq!(full.capacity_for(&reg, &ItemStack::new(milk(), 1)), Capacity::NoSpace);
    }

    #[test]
    fn gold_cheese_does_not_count_as_main_product() {
        let reg = sample_registry();
        let chest = Chest::new(4).with_items(vec![ItemStack::new(cheese(), 3)]);
        let gold = ItemStack::new(cheese(), 1).with_quality(Quality::Gold);
        assert_eq!(chest.capacity_for(&reg, &gold), Capacity::CanHold);
    }

    #[test]
    fn filters_prefer_and_restrict() {
        let reg = sample_registry();
        let artisan = Chest::new(4).with_filter(ChestFilter::Only(ItemCategory::ArtisanGoods));
        assert_eq!(artisan.capacity_for(&reg, &ItemStack::new(cheese(), 1)), Capacity::Preferred);
        assert_eq!(artisan.capacity_for(&reg, &ItemStack::new(milk(), 1)), Capacity::Unusable);

        let fishy = Chest::new(4).with_filter(ChestFilter::Prefer(ItemCategory::Fish));
        assert_eq!(fishy.capacity_for(&reg, &ItemStack::new(crab(), 1)), Capacity::Preferred);
        assert_eq!(fishy.capacity_for(&reg, &ItemStack::new(milk(), 1)), Capacity::CanHold);
    }

    #[test]
    fn special_chests_are_unusable() {
        let reg = sample_registry();
        let product = [ItemStack::new(cheese(), 1)];
        for kind in [ChestKind::Locked, ChestKind::MiniShippingBin] {
            let chest = Chest::new(4).with_kind(kind);
            assert_eq!(chest.can_hold(&reg, &product), Capacity::Unusable);
        }
    }

    #[test]
    fn can_hold_takes_the_best_product() {
        let reg = sample_registry();
        let chest = Chest::new(4).with_items(vec![ItemStack::new(crab(), 1)]);
        let products = [ItemStack::new(milk(), 1), ItemStack::new(crab(), 1)];
        assert_eq!(chest.can_hold(&reg, &products), Capacity::CanHoldAndHasMainProduct);
        assert_eq!(chest.can_hold(&reg, &[]), Capacity::NoSpace);
    }

    #[test]
    fn store_tops_up_then_opens_slots() {
        let (reg, pebble) = small_stacks();
        let mut chest = Chest::new(3).with_items(vec![ItemStack::new(pebble, 8)]);
        assert!(chest.store(&reg, &[ItemStack::new(pebble, 15)]));
        assert_eq!(
            chest.items,
            vec![
                ItemStack::new(pebble, 10),
                ItemStack::new(pebble, 10),
                ItemStack::new(pebble, 3),
            ]
        );
    }

    #[test]
    fn store_is_all_or_nothing() {
        let (reg, pebble) = small_stacks();
        let mut chest = Chest::new(2).with_items(vec![ItemStack::new(pebble, 5)]);
        let before = chest.clone();
        // 5 more fit the first stack, 10 the free slot, the last 1 does not.
        assert!(!chest.store(&reg, &[ItemStack::new(pebble, 5), ItemStack::new(pebble, 11)]));
        assert_eq!(chest, before);
        assert!(!chest.fits_all(&reg, &[ItemStack::new(pebble, 16)]));
        assert!(chest.fits_all(&reg, &[ItemStack::new(pebble, 15)]));
    }

    #[test]
    fn room_for_ignores_kind_but_not_slots() {
        let (reg, pebble) = small_stacks();
        let mini = Chest::new(2)
            .with_kind(ChestKind::MiniShippingBin)
            .with_items(vec![ItemStack::new(pebble, 7)]);
        assert!(!mini.fits_all(&reg, &[ItemStack::new(pebble, 1)]));
        assert_eq!(
            mini.room_for(&reg, &[ItemStack::new(pebble, 20), ItemStack::new(milk(), 1)]),
            vec![ItemStack::new(pebble, 13)]
        );

        let mut mini = mini;
        assert!(!mini.deposit(&reg, &[ItemStack::new(pebble, 14)]));
        assert_eq!(mini.items, vec![ItemStack::new(pebble, 7)]);
        assert!(mini.deposit(&reg, &[ItemStack::new(pebble, 13)]));
        assert_eq!(mini.items, vec![ItemStack::new(pebble, 10), ItemStack::new(pebble, 10)]);
    }

    #[test]
    fn withdraw_splits_and_verifies_first() {
        let mut chest = Chest::new(4).with_items(vec![
            ItemStack::new(milk(), 2),
            ItemStack::new(wheat(), 1),
            ItemStack::new(milk(), 2),
        ]);
        assert!(chest.withdraw(&[ItemStack::new(milk(), 5)]).is_none());
        assert_eq!(chest.items.len(), 3);

        let taken = chest.withdraw(&[ItemStack::new(milk(), 3)]).unwrap();
        assert_eq!(taken, vec![ItemStack::new(milk(), 3)]);
        assert_eq!(
            chest.items,
            vec![ItemStack::new(wheat(), 1), ItemStack::new(milk(), 1)]
        );
    }

    #[test]
    fn view_reads_and_writes_through_world() {
        let mut world = corridor_world();
        let tile = GridPosition::new(1, 1);
        let id = place_chest(&mut world, tile, vec![ItemStack::new(milk(), 2)]);
        let container = Container::new(id, tile);

        assert_eq!(container.items(&world), &[ItemStack::new(milk(), 2)]);
        assert!(container.store(&mut world, &[ItemStack::new(cheese(), 1)]));
        assert_eq!(
            container.withdraw(&mut world, &[ItemStack::new(milk(), 1)]),
            Some(vec![ItemStack::new(milk(), 1)])
        );
        assert_eq!(container.items(&world).len(), 2);
        assert_eq!(
            container.can_hold(&world, &[ItemStack::new(cheese(), 1)]),
            Capacity::CanHoldAndHasMainProduct
        );
    }
}
