//! Producer-kind compatibility with hub specializations.
//!
//! A machine kind's compatibility is decided in three tiers:
//!
//! 1. **Override** -- a `haulage.specialization` custom field on the machine
//!    definition names the responsible specialization exactly. A value that
//!    does not parse is logged and ignored.
//! 2. **Known machines** -- a fixed table for kinds whose rule data points the
//!    wrong way (a worm bin eats vegetables but is fishing equipment).
//! 3. **Heuristic** -- the categories and tags of rule inputs and outputs are
//!    intersected with each specialization's tables.
//!
//! Tier verdicts depend only on frozen definitions and are cached in the
//! registry. The one input that is *not* cached is the held product: a
//! product no specialization claims makes a heuristically-incompatible
//! machine compatible with every hub, so unknown content never gets stuck.

use crate::id::{ItemTypeId, MachineTypeId};
use crate::item::ItemStack;
use crate::registry::{InputMatch, MachineDef, Registry};
use crate::specialization::Specialization;
use std::collections::HashMap;
use std::sync::RwLock;

/// Custom-field key carrying an explicit specialization override.
pub const SPECIALIZATION_FIELD: &str = "haulage.specialization";

/// Kinds whose rule data is misleading.
const KNOWN_MACHINES: &[(&str, &[Specialization])] = &[
    ("Worm Bin", &[Specialization::Fishing]),
    ("Bait Maker", &[Specialization::Fishing]),
    ("Recycling Machine", &[Specialization::Fishing]),
    ("Crystalarium", &[Specialization::Mining]),
    ("Tapper", &[Specialization::Forestry]),
    ("Heavy Tapper", &[Specialization::Forestry]),
    ("Mushroom Log", &[Specialization::Forestry]),
    ("Bee House", &[Specialization::Farming]),
    ("Seed Maker", &[Specialization::Farming]),
    ("Cask", &[]),
];

/// Definition-only verdict for one (machine kind, specialization) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KindVerdict {
    Override(bool),
    Known(bool),
    Heuristic(bool),
}

/// Read-through cache of [`KindVerdict`]s, owned by the registry.
#[derive(Debug, Default)]
pub struct CompatCache {
    verdicts: RwLock<HashMap<(MachineTypeId, Specialization), KindVerdict>>,
}

impl CompatCache {
    fn get_or_insert_with(
        &self,
        key: (MachineTypeId, Specialization),
        compute: impl FnOnce() -> KindVerdict,
    ) -> KindVerdict {
        if let Some(v) = self
            .verdicts
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
        {
            return *v;
        }
        let verdict = compute();
        self.verdicts
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, verdict);
        verdict
    }

    /// Number of cached verdicts.
    pub fn len(&self) -> usize {
        self.verdicts
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whether a generic machine may be serviced by a hub of `specialization`.
pub fn machine_compatible(
    registry: &Registry,
    machine: MachineTypeId,
    specialization: Specialization,
    held: Option<&ItemStack>,
) -> bool {
    let verdict = registry
        .compat_cache()
        .get_or_insert_with((machine, specialization), || {
            kind_verdict(registry, machine, specialization)
        });
    match verdict {
        KindVerdict::Override(v) | KindVerdict::Known(v) => v,
        KindVerdict::Heuristic(true) => true,
        KindVerdict::Heuristic(false) => held.is_some_and(|h| registry.is_unclassified(h.item)),
    }
}

pub(crate) fn kind_verdict(
    registry: &Registry,
    machine: MachineTypeId,
    specialization: Specialization,
) -> KindVerdict {
    let Some(def) = registry.get_machine(machine) else {
        return KindVerdict::Known(false);
    };

    if let Some(raw) = def.custom_fields.get(SPECIALIZATION_FIELD) {
        match raw.parse::<Specialization>() {
            Ok(tagged) => return KindVerdict::Override(tagged == specialization),
            Err(err) => tracing::warn!(
                machine = %def.name,
                value = %raw,
                %err,
                "ignoring malformed specialization override"
            ),
        }
    }

    if let Some((_, specs)) = KNOWN_MACHINES.iter().find(|(name, _)| *name == def.name) {
        return KindVerdict::Known(specs.contains(&specialization));
    }

    KindVerdict::Heuristic(heuristic(registry, def, specialization))
}

fn heuristic(registry: &Registry, def: &MachineDef, specialization: Specialization) -> bool {
    def.rules.iter().any(|rule| {
        input_claimed(registry, &rule.trigger.input, specialization)
            || item_claimed(registry, rule.output.item, specialization)
    })
}

fn input_claimed(registry: &Registry, input: &InputMatch, specialization: Specialization) -> bool {
    match input {
        InputMatch::Item(id) => item_claimed(registry, *id, specialization),
        InputMatch::Category(category) => specialization.covers_category(*category),
        InputMatch::Tag(tag) => specialization.covers_tag(tag),
    }
}

fn item_claimed(
    registry: &Registry,
    item: ItemTypeId,
    specialization: Specialization,
) -> bool {
    registry.get_item(item).is_some_and(|def| {
        specialization.covers_category(def.category)
            || def.tags.iter().any(|t| specialization.covers_tag(t))
    })
}
