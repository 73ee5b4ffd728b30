//! Potted plants.
//!
//! A pot is never fed by workers; it only yields. Harvesting a ripe crop can
//! produce several stacks at once, but a worker carries one per trip, so the
//! leftovers wait in a queue stored in the entity's metadata. The pot view
//! is rebuilt on every inspection and the queue must survive that.

use super::ProducerState;
use crate::item::ItemStack;
use crate::world::{Entity, EntityKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Entity metadata key holding the harvested-but-uncollected queue.
pub const POT_QUEUE_KEY: &str = "haulage.pot_queue";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crop {
    pub harvest: ItemStack,
    /// Bonus stacks harvested alongside the main one.
    #[serde(default)]
    pub extra: Vec<ItemStack>,
    pub growth_minutes: u32,
    /// Stays planted after harvest and grows again.
    #[serde(default)]
    pub regrows: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GardenPot {
    pub crop: Option<Crop>,
    pub growth: u32,
}

impl GardenPot {
    pub fn planted(crop: Crop) -> Self {
        Self {
            crop: Some(crop),
            growth: 0,
        }
    }

    pub fn is_ripe(&self) -> bool {
        self.crop
            .as_ref()
            .is_some_and(|c| self.growth >= c.growth_minutes)
    }

    pub fn advance(&mut self, minutes: u32) {
        if let Some(crop) = &self.crop {
            self.growth = self.growth.saturating_add(minutes).min(crop.growth_minutes);
        }
    }

    /// Pick a ripe crop without any of the side effects a player harvest
    /// would have. Regrowing crops restart; others are removed.
    fn harvest(&mut self) -> Option<Vec<ItemStack>> {
        if !self.is_ripe() {
            return None;
        }
        let crop = self.crop.take()?;
        let mut yielded = Vec::with_capacity(1 + crop.extra.len());
        yielded.push(crop.harvest);
        yielded.extend(crop.extra.iter().copied());
        self.growth = 0;
        if crop.regrows {
            self.crop = Some(crop);
        }
        Some(yielded)
    }
}

pub(crate) fn read_queue(metadata: &BTreeMap<String, String>) -> Vec<ItemStack> {
    let Some(raw) = metadata.get(POT_QUEUE_KEY) else {
        return Vec::new();
    };
    match serde_json::from_str(raw) {
        Ok(queue) => queue,
        Err(err) => {
            tracing::warn!(%err, "discarding unreadable pot harvest queue");
            Vec::new()
        }
    }
}

fn write_queue(metadata: &mut BTreeMap<String, String>, queue: &[ItemStack]) {
    if queue.is_empty() {
        metadata.remove(POT_QUEUE_KEY);
        return;
    }
    match serde_json::to_string(queue) {
        Ok(raw) => {
            metadata.insert(POT_QUEUE_KEY.to_string(), raw);
        }
        Err(err) => tracing::warn!(%err, "failed to persist pot harvest queue"),
    }
}

fn pot(entity: &Entity) -> Option<&GardenPot> {
    match &entity.kind {
        EntityKind::GardenPot(pot) => Some(pot),
        _ => None,
    }
}

/// Never `Idle`: pots are push-only.
pub(crate) fn state(entity: &Entity) -> ProducerState {
    if !read_queue(&entity.metadata).is_empty() || pot(entity).is_some_and(GardenPot::is_ripe) {
        ProducerState::AwaitingPickup
    } else {
        ProducerState::Working
    }
}

/// What the next collect will yield.
pub(crate) fn held(entity: &Entity) -> Option<ItemStack> {
    if let Some(front) = read_queue(&entity.metadata).first() {
        return Some(*front);
    }
    pot(entity)
        .filter(|p| p.is_ripe())
        .and_then(|p| p.crop.as_ref())
        .map(|c| c.harvest)
}

/// Pop one queued product, harvesting into the queue first if it is empty.
pub(crate) fn collect(entity: &mut Entity) -> Option<ItemStack> {
    let mut queue = read_queue(&entity.metadata);
    if queue.is_empty()
        && let EntityKind::GardenPot(pot) = &mut entity.kind
        && let Some(harvested) = pot.harvest()
    {
        queue = harvested;
    }
    if queue.is_empty() {
        return None;
    }
    let first = queue.remove(0);
    write_queue(&mut entity.metadata, &queue);
    Some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn tomato_crop(regrows: bool) -> Crop {
        Crop {
            harvest: ItemStack::new(tomato(), 1),
            extra: vec![ItemStack::new(tomato(), 2), ItemStack::new(tomato_seeds(), 1)],
            growth_minutes: 100,
            regrows,
        }
    }

    fn pot_entity(pot: GardenPot) -> Entity {
        Entity::new(EntityKind::GardenPot(pot))
    }

    #[test]
    fn never_idle() {
        assert_eq!(state(&pot_entity(GardenPot::default())), ProducerState::Working);
        assert_eq!(state(&pot_entity(GardenPot::planted(tomato_crop(false)))), ProducerState::Working);
    }

    #[test]
    fn ripe_crop_awaits_pickup() {
        let mut pot = GardenPot::planted(tomato_crop(false));
        pot.advance(250);
        assert_eq!(pot.growth, 100);
        let entity = pot_entity(pot);
        assert_eq!(state(&entity), ProducerState::AwaitingPickup);
        assert_eq!(held(&entity), Some(ItemStack::new(tomato(), 1)));
    }

    #[test]
    fn collect_pops_one_and_persists_the_rest() {
        let mut pot = GardenPot::planted(tomato_crop(false));
        pot.advance(100);
        let mut entity = pot_entity(pot);

        assert_eq!(collect(&mut entity), Some(ItemStack::new(tomato(), 1)));
        assert!(entity.metadata.contains_key(POT_QUEUE_KEY));
        assert_eq!(state(&entity), ProducerState::AwaitingPickup);
        assert_eq!(held(&entity), Some(ItemStack::new(tomato(), 2)));

        // A fresh view over the same entity sees the same queue.
        let rebuilt = entity.clone();
        assert_eq!(held(&rebuilt), Some(ItemStack::new(tomato(), 2)));

        assert_eq!(collect(&mut entity), Some(ItemStack::new(tomato(), 2)));
        assert_eq!(collect(&mut entity), Some(ItemStack::new(tomato_seeds(), 1)));
        assert!(!entity.metadata.contains_key(POT_QUEUE_KEY));
        assert_eq!(state(&entity), ProducerState::Working);
        assert_eq!(collect(&mut entity), None);
    }

    #[test]
    fn regrowing_crop_stays_planted() {
        let mut pot = GardenPot::planted(tomato_crop(true));
        pot.advance(100);
        assert_eq!(pot.harvest().map(|h| h.len()), Some(3));
        assert!(pot.crop.is_some());
        assert_eq!(pot.growth, 0);
    }

    #[test]
    fn corrupt_queue_reads_as_empty() {
        let mut entity = pot_entity(GardenPot::default());
        entity
            .metadata
            .insert(POT_QUEUE_KEY.to_string(), "{not json".to_string());
        assert!(read_queue(&entity.metadata).is_empty());
        assert_eq!(state(&entity), ProducerState::Working);
    }
}
