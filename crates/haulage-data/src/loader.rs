//! Resolution pipeline: reads data files, resolves cross-references, builds registry.
//!
//! A data directory holds up to four files, each in RON, JSON or TOML:
//!
//! | Base name   | Required | Contents                         |
//! |-------------|----------|----------------------------------|
//! | `items`     | yes      | [`ItemData`] list                |
//! | `machines`  | yes      | [`MachineData`] list             |
//! | `floorings` | no       | [`FlooringData`] list            |
//! | `config`    | no       | a single [`EngineConfig`] table  |
//!
//! Machines reference items by name; every name must resolve against the
//! items file or loading fails.

use crate::schema::{FlooringData, InputData, ItemData, MachineData, RequirementData};
use haulage_core::config::EngineConfig;
use haulage_core::id::ItemTypeId;
use haulage_core::registry::{
    InputMatch, InputRequirement, ItemDef, MachineDef, OutputRule, Registry, RegistryBuilder,
    RegistryError, RuleOutput,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// The resolved definitions were rejected by the registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, e: impl std::fmt::Display) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: e.to_string(),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list from a file. For TOML files, extracts the array at the
/// given `toml_key` from a top-level table. For RON and JSON, deserializes
/// directly as `Vec<T>`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    if detect_format(path)? != Format::Toml {
        return deserialize_file(path);
    }

    let content = std::fs::read_to_string(path)?;
    let table: toml::Value = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
    let array = table
        .get(toml_key)
        .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?
        .clone();
    array
        .try_into()
        .map_err(|e: toml::de::Error| parse_error(path, e))
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a name in a map, returning an `UnresolvedRef` error if not found.
pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Check whether a name already exists in a map, returning a `DuplicateName`
/// error if so.
pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

// ===========================================================================
// Pipeline
// ===========================================================================

/// Everything loaded from one data directory.
#[derive(Debug)]
pub struct GameData {
    pub registry: Registry,
    pub config: EngineConfig,
}

/// Load items, machines, floorings and the engine configuration from `dir`.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    let mut builder = RegistryBuilder::new();

    let items_path = require_data_file(dir, "items")?;
    let items: Vec<ItemData> = deserialize_list(&items_path, "items")?;
    let item_ids = register_items(&mut builder, items, &items_path)?;

    if let Some(path) = find_data_file(dir, "floorings")? {
        let floorings: Vec<FlooringData> = deserialize_list(&path, "floorings")?;
        let mut seen = HashMap::new();
        for flooring in floorings {
            check_duplicate(&seen, &flooring.name, &path)?;
            let id = builder.register_flooring(&flooring.name);
            seen.insert(flooring.name, id);
        }
    }

    let machines_path = require_data_file(dir, "machines")?;
    let machines: Vec<MachineData> = deserialize_list(&machines_path, "machines")?;
    let mut machine_ids = HashMap::new();
    for machine in machines {
        check_duplicate(&machine_ids, &machine.name, &machines_path)?;
        let def = resolve_machine(&machine, &item_ids, &machines_path)?;
        let id = builder.register_machine(def);
        machine_ids.insert(machine.name, id);
    }

    let config = match find_data_file(dir, "config")? {
        Some(path) => deserialize_file(&path)?,
        None => EngineConfig::default(),
    };

    Ok(GameData {
        registry: builder.build()?,
        config,
    })
}

fn register_items(
    builder: &mut RegistryBuilder,
    items: Vec<ItemData>,
    file: &Path,
) -> Result<HashMap<String, ItemTypeId>, DataLoadError> {
    let mut ids = HashMap::new();
    for item in items {
        check_duplicate(&ids, &item.name, file)?;
        if item.max_stack == 0 {
            return Err(parse_error(file, format!("item '{}' has a max_stack of 0", item.name)));
        }
        let name = item.name.clone();
        let id = builder.register_item_def(ItemDef {
            name: item.name,
            category: item.category,
            tags: item.tags,
            max_stack: item.max_stack,
        });
        ids.insert(name, id);
    }
    Ok(ids)
}

fn resolve_requirement(
    req: &RequirementData,
    items: &HashMap<String, ItemTypeId>,
    file: &Path,
) -> Result<InputRequirement, DataLoadError> {
    let input = match &req.input {
        InputData::Item(name) => InputMatch::Item(*resolve_name(items, name, file, "item")?),
        InputData::Category(category) => InputMatch::Category(*category),
        InputData::Tag(tag) => InputMatch::Tag(tag.clone()),
    };
    Ok(InputRequirement {
        input,
        quantity: req.quantity,
    })
}

fn resolve_machine(
    machine: &MachineData,
    items: &HashMap<String, ItemTypeId>,
    file: &Path,
) -> Result<MachineDef, DataLoadError> {
    let mut def = MachineDef::new(&machine.name);

    for rule in &machine.rules {
        def.rules.push(OutputRule {
            trigger: resolve_requirement(&rule.trigger, items, file)?,
            output: RuleOutput {
                item: *resolve_name(items, &rule.output, file, "item")?,
                quantity: rule.output_quantity,
                copy_quality: rule.copy_quality,
            },
            minutes: rule.minutes,
        });
    }
    for req in &machine.additional_inputs {
        def.additional_inputs.push(resolve_requirement(req, items, file)?);
    }
    def.custom_fields = machine.custom_fields.clone();
    def.excluded = machine.excluded;
    def.recalculate_on_collect = machine.recalculate_on_collect;
    Ok(def)
}

// ===========================================================================
// Tests
// ===========================================================================
