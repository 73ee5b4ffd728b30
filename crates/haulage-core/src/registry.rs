use crate::compat::CompatCache;
use crate::id::*;
use crate::item::{ItemCategory, ItemStack, Quality};
use crate::specialization;
use std::collections::{BTreeMap, HashMap};

/// Stack size used when an item has no explicit limit.
pub const DEFAULT_MAX_STACK: u32 = 999;

/// An item type definition in the registry.
#[derive(Debug, Clone)]
pub struct ItemDef {
    pub name: String,
    pub category: ItemCategory,
    pub tags: Vec<String>,
    pub max_stack: u32,
}

/// What an input slot of a machine rule accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMatch {
    Item(ItemTypeId),
    Category(ItemCategory),
    Tag(String),
}

impl InputMatch {
    pub fn matches(&self, registry: &Registry, item: ItemTypeId) -> bool {
        match self {
            InputMatch::Item(id) => *id == item,
            InputMatch::Category(category) => registry.category(item) == Some(*category),
            InputMatch::Tag(tag) => registry.has_tag(item, tag),
        }
    }
}

/// A quantity of some matching input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRequirement {
    pub input: InputMatch,
    pub quantity: u32,
}

/// The product a rule emits once processing completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutput {
    pub item: ItemTypeId,
    pub quantity: u32,
    /// Carry the triggering input's quality over to the product.
    pub copy_quality: bool,
}

impl RuleOutput {
    pub fn produce(&self, input: &ItemStack) -> ItemStack {
        let quality = if self.copy_quality {
            input.quality
        } else {
            Quality::Normal
        };
        ItemStack::new(self.item, self.quantity).with_quality(quality)
    }
}

/// A data-driven output rule: `trigger` in, `output` out after `minutes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRule {
    pub trigger: InputRequirement,
    pub output: RuleOutput,
    pub minutes: u32,
}

/// A machine definition: the recipe data a generic producer runs on.
#[derive(Debug, Clone, Default)]
pub struct MachineDef {
    pub name: String,
    pub rules: Vec<OutputRule>,
    /// Always consumed alongside the trigger (fuel and the like).
    pub additional_inputs: Vec<InputRequirement>,
    /// Free-form fields from content packs; see [`crate::compat::SPECIALIZATION_FIELD`].
    pub custom_fields: BTreeMap<String, String>,
    /// Never automated (incubator-like machines).
    pub excluded: bool,
    /// The next output is computed when the current one is collected.
    pub recalculate_on_collect: bool,
}

impl MachineDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn rule(mut self, trigger: InputMatch, quantity: u32, output: ItemTypeId, minutes: u32) -> Self {
        self.rules.push(OutputRule {
            trigger: InputRequirement {
                input: trigger,
                quantity,
            },
            output: RuleOutput {
                item: output,
                quantity: 1,
                copy_quality: false,
            },
            minutes,
        });
        self
    }

    pub fn additional_input(mut self, input: InputMatch, quantity: u32) -> Self {
        self.additional_inputs.push(InputRequirement { input, quantity });
        self
    }

    pub fn custom_field(mut self, key: &str, value: &str) -> Self {
        self.custom_fields.insert(key.to_string(), value.to_string());
        self
    }

    pub fn excluded(mut self) -> Self {
        self.excluded = true;
        self
    }

    pub fn recalculate_on_collect(mut self) -> Self {
        self.recalculate_on_collect = true;
        self
    }
}

/// A flooring material placed on terrain.
#[derive(Debug, Clone)]
pub struct FlooringDef {
    pub name: String,
}

/// Builder for constructing an immutable Registry.
/// Three-phase lifecycle: registration -> mutation -> finalization.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    items: Vec<ItemDef>,
    item_name_to_id: HashMap<String, ItemTypeId>,
    machines: Vec<MachineDef>,
    machine_name_to_id: HashMap<String, MachineTypeId>,
    floorings: Vec<FlooringDef>,
    flooring_name_to_id: HashMap<String, FlooringId>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase 1: Register an item type with the default stack size.
    pub fn register_item(&mut self, name: &str, category: ItemCategory, tags: &[&str]) -> ItemTypeId {
        self.register_item_def(ItemDef {
            name: name.to_string(),
            category,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            max_stack: DEFAULT_MAX_STACK,
        })
    }

    /// Phase 1: Register a fully specified item type.
    pub fn register_item_def(&mut self, def: ItemDef) -> ItemTypeId {
        let id = ItemTypeId(self.items.len() as u32);
        self.item_name_to_id.insert(def.name.clone(), id);
        self.items.push(def);
        id
    }

    /// Phase 1: Register a machine definition.
    pub fn register_machine(&mut self, def: MachineDef) -> MachineTypeId {
        let id = MachineTypeId(self.machines.len() as u32);
        self.machine_name_to_id.insert(def.name.clone(), id);
        self.machines.push(def);
        id
    }

    /// Phase 1: Register a flooring material.
    pub fn register_flooring(&mut self, name: &str) -> FlooringId {
        let id = FlooringId(self.floorings.len() as u32);
        self.floorings.push(FlooringDef {
            name: name.to_string(),
        });
        self.flooring_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Phase 2: Mutate an existing machine definition by name.
    pub fn mutate_machine<F>(&mut self, name: &str, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut MachineDef),
    {
        let id = self
            .machine_name_to_id
            .get(name)
            .ok_or(RegistryError::NotFound(name.to_string()))?;
        f(&mut self.machines[id.0 as usize]);
        Ok(())
    }

    pub fn item_id(&self, name: &str) -> Option<ItemTypeId> {
        self.item_name_to_id.get(name).copied()
    }

    pub fn machine_id(&self, name: &str) -> Option<MachineTypeId> {
        self.machine_name_to_id.get(name).copied()
    }

    /// Phase 3: Finalize and build the immutable registry.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let known = |id: ItemTypeId| (id.0 as usize) < self.items.len();
        for machine in &self.machines {
            let inputs = machine
                .rules
                .iter()
                .map(|r| &r.trigger)
                .chain(machine.additional_inputs.iter());
            for req in inputs {
                if let InputMatch::Item(id) = req.input
                    && !known(id)
                {
                    return Err(RegistryError::InvalidItemRef(id));
                }
            }
            for rule in &machine.rules {
                if !known(rule.output.item) {
                    return Err(RegistryError::InvalidItemRef(rule.output.item));
                }
            }
        }

        Ok(Registry {
            items: self.items,
            item_name_to_id: self.item_name_to_id,
            machines: self.machines,
            machine_name_to_id: self.machine_name_to_id,
            floorings: self.floorings,
            flooring_name_to_id: self.flooring_name_to_id,
            compat: CompatCache::default(),
        })
    }
}

/// Immutable registry. Frozen after build(). Thread-safe to share.
///
/// Also owns the compatibility cache: its entries are derived only from the
/// frozen definitions, so they stay valid for as long as the registry lives.
#[derive(Debug)]
pub struct Registry {
    items: Vec<ItemDef>,
    item_name_to_id: HashMap<String, ItemTypeId>,
    machines: Vec<MachineDef>,
    machine_name_to_id: HashMap<String, MachineTypeId>,
    floorings: Vec<FlooringDef>,
    flooring_name_to_id: HashMap<String, FlooringId>,
    compat: CompatCache,
}

impl Registry {
    pub fn get_item(&self, id: ItemTypeId) -> Option<&ItemDef> {
        self.items.get(id.0 as usize)
    }

    pub fn get_machine(&self, id: MachineTypeId) -> Option<&MachineDef> {
        self.machines.get(id.0 as usize)
    }

    pub fn get_flooring(&self, id: FlooringId) -> Option<&FlooringDef> {
        self.floorings.get(id.0 as usize)
    }

    pub fn item_id(&self, name: &str) -> Option<ItemTypeId> {
        self.item_name_to_id.get(name).copied()
    }

    pub fn machine_id(&self, name: &str) -> Option<MachineTypeId> {
        self.machine_name_to_id.get(name).copied()
    }

    pub fn flooring_id(&self, name: &str) -> Option<FlooringId> {
        self.flooring_name_to_id.get(name).copied()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn machine_count(&self) -> usize {
        self.machines.len()
    }

    pub fn category(&self, id: ItemTypeId) -> Option<ItemCategory> {
        self.get_item(id).map(|d| d.category)
    }

    pub fn has_tag(&self, id: ItemTypeId, tag: &str) -> bool {
        self.get_item(id)
            .is_some_and(|d| d.tags.iter().any(|t| t == tag))
    }

    pub fn max_stack(&self, id: ItemTypeId) -> u32 {
        self.get_item(id)
            .map(|d| d.max_stack.max(1))
            .unwrap_or(DEFAULT_MAX_STACK)
    }

    /// True if no specialization claims this item. Unknown items count as
    /// unclassified.
    pub fn is_unclassified(&self, id: ItemTypeId) -> bool {
        match self.get_item(id) {
            Some(def) => {
                specialization::is_unclassified(def.category, def.tags.iter().map(String::as_str))
            }
            None => true,
        }
    }

    pub(crate) fn compat_cache(&self) -> &CompatCache {
        &self.compat
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid item reference: {0:?}")]
    InvalidItemRef(ItemTypeId),
}
