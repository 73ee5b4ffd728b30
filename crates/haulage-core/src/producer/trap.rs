use super::ProducerState;
use crate::id::ItemTypeId;
use crate::item::{ItemCategory, ItemStack, ReservedItems, take_shopping_list_where};
use crate::registry::Registry;
use serde::{Deserialize, Serialize};

/// Minutes a baited pot soaks before it holds a catch.
pub const SOAK_MINUTES: u32 = 600;

/// A baited trap in the water.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrabPot {
    pub bait: Option<ItemStack>,
    pub catch: Option<ItemStack>,
    pub minutes_until_ready: u32,
    /// Cycled through in order, one entry per catch.
    pub catch_table: Vec<ItemTypeId>,
    #[serde(default)]
    pub catches_made: u32,
}

impl CrabPot {
    pub fn new(catch_table: Vec<ItemTypeId>) -> Self {
        Self {
            catch_table,
            ..Self::default()
        }
    }

    pub fn state(&self) -> ProducerState {
        if self.catch.is_some() {
            ProducerState::AwaitingPickup
        } else if self.bait.is_some() {
            ProducerState::Working
        } else {
            ProducerState::Idle
        }
    }

    /// One unreserved bait item from `source`.
    pub fn recipe(
        &self,
        registry: &Registry,
        source: &[ItemStack],
        reserved: ReservedItems<'_>,
    ) -> Option<Vec<ItemStack>> {
        source
            .iter()
            .find(|s| {
                s.quantity > 0
                    && registry.category(s.item) == Some(ItemCategory::Bait)
                    && !reserved.contains(s)
            })
            .map(|s| vec![s.with_quantity(1)])
    }

    /// Bait the pot, decrementing the bait stack in `source`.
    pub(crate) fn fill(
        &mut self,
        registry: &Registry,
        source: &mut Vec<ItemStack>,
        reserved: ReservedItems<'_>,
    ) -> bool {
        if self.state() != ProducerState::Idle {
            return false;
        }
        let Some(list) = self.recipe(registry, source, reserved) else {
            return false;
        };
        let Some(taken) = take_shopping_list_where(source, &list, |s| !reserved.contains(s)) else {
            return false;
        };
        self.bait = taken.first().copied();
        self.minutes_until_ready = SOAK_MINUTES;
        true
    }

    /// A pot with an empty catch table soaks forever.
    pub fn advance(&mut self, minutes: u32) {
        if self.bait.is_none() || self.catch.is_some() || self.catch_table.is_empty() {
            return;
        }
        self.minutes_until_ready = self.minutes_until_ready.saturating_sub(minutes);
        if self.minutes_until_ready == 0 {
            let index = self.catches_made as usize % self.catch_table.len();
            self.catch = Some(ItemStack::new(self.catch_table[index], 1));
            self.catches_made += 1;
        }
    }

    pub(crate) fn collect(&mut self) -> Option<ItemStack> {
        self.bait = None;
        self.minutes_until_ready = 0;
        self.catch.take()
    }
}
