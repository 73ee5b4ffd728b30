use crate::id::ItemTypeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality tier of an item. Part of an item's stacking identity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    #[default]
    Normal,
    Silver,
    Gold,
    Iridium,
}

/// Broad item category. Closed set; content that fits nowhere uses `Misc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Gem,
    Mineral,
    Metal,
    BuildingResource,
    MonsterLoot,
    Fish,
    Bait,
    Junk,
    Egg,
    Milk,
    AnimalProduct,
    Seed,
    Vegetable,
    Fruit,
    Flower,
    Fertilizer,
    Forage,
    Syrup,
    ArtisanGoods,
    Cooking,
    Crafting,
    Misc,
}

/// A stack of identical items.
///
/// Two stacks share an identity when item type, quality and visual variant
/// all match; only such stacks merge in a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemTypeId,
    pub quantity: u32,
    #[serde(default)]
    pub quality: Quality,
    /// Optional visual variant (e.g. a tinted flower or a dyed product).
    #[serde(default)]
    pub variant: Option<u32>,
}

impl ItemStack {
    pub fn new(item: ItemTypeId, quantity: u32) -> Self {
        Self {
            item,
            quantity,
            quality: Quality::Normal,
            variant: None,
        }
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_variant(mut self, variant: u32) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Same identity, different quantity.
    pub fn with_quantity(&self, quantity: u32) -> Self {
        Self { quantity, ..*self }
    }

    /// Whether `other` would merge into this stack.
    pub fn can_stack_with(&self, other: &ItemStack) -> bool {
        self.item == other.item && self.quality == other.quality && self.variant == other.variant
    }
}

// ---------------------------------------------------------------------------
// Collection helpers
// ---------------------------------------------------------------------------

/// Total quantity across every stack sharing `like`'s identity.
pub fn total_of(items: &[ItemStack], like: &ItemStack) -> u32 {
    items
        .iter()
        .filter(|s| s.can_stack_with(like))
        .map(|s| s.quantity)
        .sum()
}

/// Merge a list into one entry per identity, keeping first-appearance order.
pub fn aggregate(items: &[ItemStack]) -> Vec<ItemStack> {
    let mut merged: Vec<ItemStack> = Vec::new();
    for stack in items {
        if let Some(existing) = merged.iter_mut().find(|m| m.can_stack_with(stack)) {
            existing.quantity += stack.quantity;
        } else {
            merged.push(*stack);
        }
    }
    merged
}

/// Remove every line of `list` from `items`, splitting stacks as needed.
///
/// Two-phase: aggregate availability is verified for every line before any
/// stack is touched. Returns `None` (and leaves `items` untouched) if any
/// line is short.
pub fn take_shopping_list(items: &mut Vec<ItemStack>, list: &[ItemStack]) -> Option<Vec<ItemStack>> {
    take_shopping_list_where(items, list, |_| true)
}

/// Like [`take_shopping_list`], but only stacks accepted by `eligible` may
/// be drawn from. Eligibility is decided once, before mutation.
pub fn take_shopping_list_where<F>(
    items: &mut Vec<ItemStack>,
    list: &[ItemStack],
    eligible: F,
) -> Option<Vec<ItemStack>>
where
    F: Fn(&ItemStack) -> bool,
{
    let usable: Vec<bool> = items.iter().map(&eligible).collect();

    // Phase 1: verify.
    for needed in aggregate(list) {
        let available: u32 = items
            .iter()
            .zip(&usable)
            .filter(|(s, ok)| **ok && s.can_stack_with(&needed))
            .map(|(s, _)| s.quantity)
            .sum();
        if available < needed.quantity {
            return None;
        }
    }

    // Phase 2: mutate.
    for line in list {
        let mut remaining = line.quantity;
        for (stack, ok) in items.iter_mut().zip(&usable) {
            if remaining == 0 {
                break;
            }
            if !*ok || !stack.can_stack_with(line) {
                continue;
            }
            let taken = remaining.min(stack.quantity);
            stack.quantity -= taken;
            remaining -= taken;
        }
    }
    items.retain(|s| s.quantity > 0);

    Some(list.to_vec())
}

// ---------------------------------------------------------------------------
// Reserved items
// ---------------------------------------------------------------------------

fn never_reserved(_: &ItemStack) -> bool {
    false
}

/// Caller-supplied predicate marking items automation must never touch.
///
/// Honored wherever container contents are scanned for inputs and wherever
/// a held product is offered for delivery.
#[derive(Clone, Copy)]
pub struct ReservedItems<'a> {
    test: &'a dyn Fn(&ItemStack) -> bool,
}

impl<'a> ReservedItems<'a> {
    pub fn new(test: &'a dyn Fn(&ItemStack) -> bool) -> Self {
        Self { test }
    }

    /// Nothing is reserved.
    pub fn none() -> ReservedItems<'static> {
        ReservedItems {
            test: &never_reserved,
        }
    }

    pub fn contains(&self, stack: &ItemStack) -> bool {
        (self.test)(stack)
    }

    /// A copy of `items` with reserved stacks removed, order preserved.
    pub fn filter(&self, items: &[ItemStack]) -> Vec<ItemStack> {
        items.iter().filter(|s| !self.contains(s)).copied().collect()
    }
}

impl fmt::Debug for ReservedItems<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReservedItems").finish_non_exhaustive()
    }
}
