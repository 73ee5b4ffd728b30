//! Serde data file structs for content definitions.
//!
//! These structs define the on-disk format for items, machines and
//! floorings. They are deserialized from RON, JSON, or TOML data files and
//! then resolved into registry types by the loader. References between
//! definitions are by name.

use haulage_core::item::ItemCategory;
use haulage_core::registry::DEFAULT_MAX_STACK;
use serde::Deserialize;
use std::collections::BTreeMap;

fn default_one() -> u32 {
    1
}

fn default_max_stack() -> u32 {
    DEFAULT_MAX_STACK
}

// ===========================================================================
// Items
// ===========================================================================

/// An item type definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemData {
    pub name: String,
    pub category: ItemCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
}

// ===========================================================================
// Machines
// ===========================================================================

/// What an input slot accepts. Items are referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputData {
    Item(String),
    Category(ItemCategory),
    Tag(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequirementData {
    pub input: InputData,
    #[serde(default = "default_one")]
    pub quantity: u32,
}

/// One output rule of a machine.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleData {
    pub trigger: RequirementData,
    pub output: String,
    #[serde(default = "default_one")]
    pub output_quantity: u32,
    #[serde(default)]
    pub copy_quality: bool,
    pub minutes: u32,
}

/// A machine definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineData {
    pub name: String,
    pub rules: Vec<RuleData>,
    #[serde(default)]
    pub additional_inputs: Vec<RequirementData>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, String>,
    #[serde(default)]
    pub excluded: bool,
    #[serde(default)]
    pub recalculate_on_collect: bool,
}

// ===========================================================================
// Floorings
// ===========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct FlooringData {
    pub name: String,
}

// ===========================================================================
// TOML wrappers (TOML does not support top-level arrays)
// ===========================================================================

/// Wrapper for a list of items in TOML format.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlItems {
    pub items: Vec<ItemData>,
}

/// Wrapper for a list of machines in TOML format.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlMachines {
    pub machines: Vec<MachineData>,
}

/// Wrapper for a list of floorings in TOML format.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlFloorings {
    pub floorings: Vec<FlooringData>,
}

// ===========================================================================
// Tests
// ===========================================================================
