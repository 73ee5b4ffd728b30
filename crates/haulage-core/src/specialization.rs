//! Hub specializations and the category/tag tables behind the compatibility
//! heuristic.
//!
//! The tables are compiled in and never change for the life of the process.

use crate::item::ItemCategory;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of work a hub's workers are allowed to service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialization {
    /// Extraction: ores, bars, gems.
    Mining,
    /// Animal products.
    Husbandry,
    /// Cultivation: crops, seeds, flowers.
    Farming,
    /// Aquatic: fish, bait, crab pots.
    Fishing,
    /// Sylvan: trees, sap, forage.
    Forestry,
}

impl Specialization {
    pub const ALL: [Specialization; 5] = [
        Specialization::Mining,
        Specialization::Husbandry,
        Specialization::Farming,
        Specialization::Fishing,
        Specialization::Forestry,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Specialization::Mining => "mining",
            Specialization::Husbandry => "husbandry",
            Specialization::Farming => "farming",
            Specialization::Fishing => "fishing",
            Specialization::Forestry => "forestry",
        }
    }

    /// Item categories this specialization is responsible for.
    pub fn categories(self) -> &'static [ItemCategory] {
        use ItemCategory::*;
        match self {
            Specialization::Mining => &[Gem, Mineral, Metal, BuildingResource, MonsterLoot],
            Specialization::Husbandry => &[Egg, Milk, AnimalProduct],
            Specialization::Farming => &[Seed, Vegetable, Fruit, Flower, Fertilizer],
            Specialization::Fishing => &[Fish, Bait, Junk],
            Specialization::Forestry => &[Forage, Syrup],
        }
    }

    /// Item tags this specialization is responsible for.
    pub fn tags(self) -> &'static [&'static str] {
        match self {
            Specialization::Mining => &["ore", "bar", "geode", "coal", "stone"],
            Specialization::Husbandry => &["egg", "milk", "wool", "truffle"],
            Specialization::Farming => &["crop", "flower", "honey"],
            Specialization::Fishing => &["fish", "roe", "trash"],
            Specialization::Forestry => &["wood", "sap", "mushroom", "tree_seed"],
        }
    }

    pub fn covers_category(self, category: ItemCategory) -> bool {
        self.categories().contains(&category)
    }

    pub fn covers_tag(self, tag: &str) -> bool {
        self.tags().iter().any(|t| *t == tag)
    }
}

impl fmt::Display for Specialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// True if no specialization claims the category or any of the tags.
pub fn is_unclassified<'a>(category: ItemCategory, tags: impl IntoIterator<Item = &'a str>) -> bool {
    let tags: Vec<&str> = tags.into_iter().collect();
    Specialization::ALL.iter().all(|spec| {
        !spec.covers_category(category) && !tags.iter().any(|t| spec.covers_tag(t))
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown specialization '{0}'")]
pub struct ParseSpecializationError(pub String);

impl FromStr for Specialization {
    type Err = ParseSpecializationError;

    /// Accepts the canonical names plus the descriptive aliases used in
    /// content packs ("extraction", "cultivation", "aquatic", "sylvan").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mining" | "extraction" => Ok(Specialization::Mining),
            "husbandry" | "animals" => Ok(Specialization::Husbandry),
            "farming" | "cultivation" | "crops" => Ok(Specialization::Farming),
            "fishing" | "aquatic" => Ok(Specialization::Fishing),
            "forestry" | "sylvan" => Ok(Specialization::Forestry),
            _ => Err(ParseSpecializationError(s.to_string())),
        }
    }
}
