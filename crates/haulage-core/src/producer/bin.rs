//! Output bins: sinks that accept eligible products and never yield.

use crate::config::ShippingConfig;
use crate::container::Chest;
use crate::item::{ItemStack, ReservedItems, aggregate, take_shopping_list_where};
use crate::registry::Registry;
use serde::{Deserialize, Serialize};

/// A shipping bin building.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingBin {
    pub shipped: Vec<ItemStack>,
}

/// Eligible stacks from `source`, in order, capped at `max_per_trip` in total.
pub fn shipment(
    registry: &Registry,
    shipping: &ShippingConfig,
    source: &[ItemStack],
    reserved: ReservedItems<'_>,
) -> Option<Vec<ItemStack>> {
    let mut budget = shipping.max_per_trip;
    let mut list = Vec::new();
    for stack in source {
        if budget == 0 {
            break;
        }
        let eligible = stack.quantity > 0
            && !reserved.contains(stack)
            && registry.category(stack.item).is_some_and(|c| shipping.ships(c));
        if !eligible {
            continue;
        }
        let moved = stack.quantity.min(budget);
        list.push(stack.with_quantity(moved));
        budget -= moved;
    }
    (!list.is_empty()).then_some(list)
}

/// A shipment trimmed to the slots left in a chest-style bin. `None` once
/// nothing more fits.
pub fn shipment_for(
    chest: &Chest,
    registry: &Registry,
    shipping: &ShippingConfig,
    source: &[ItemStack],
    reserved: ReservedItems<'_>,
) -> Option<Vec<ItemStack>> {
    let list = shipment(registry, shipping, source, reserved)?;
    let fitting = chest.room_for(registry, &list);
    (!fitting.is_empty()).then_some(fitting)
}

/// Move a shipment out of `source` into the bin's contents.
pub(crate) fn fill(
    contents: &mut Vec<ItemStack>,
    registry: &Registry,
    shipping: &ShippingConfig,
    source: &mut Vec<ItemStack>,
    reserved: ReservedItems<'_>,
) -> bool {
    let Some(list) = shipment(registry, shipping, source, reserved) else {
        return false;
    };
    let Some(taken) = take_shopping_list_where(source, &list, |s| !reserved.contains(s)) else {
        return false;
    };
    contents.extend(taken);
    *contents = aggregate(contents);
    true
}

/// Move what fits of a shipment out of `source` into a chest-style bin.
pub(crate) fn fill_chest(
    chest: &mut Chest,
    registry: &Registry,
    shipping: &ShippingConfig,
    source: &mut Vec<ItemStack>,
    reserved: ReservedItems<'_>,
) -> bool {
    let Some(list) = shipment_for(chest, registry, shipping, source, reserved) else {
        return false;
    };
    let Some(taken) = take_shopping_list_where(source, &list, |s| !reserved.contains(s)) else {
        return false;
    };
    chest.deposit(registry, &taken)
}
