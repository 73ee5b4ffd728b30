use crate::item::ItemCategory;
use serde::{Deserialize, Serialize};

/// Host-selected engine behavior. Read-only from the engine's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub shipping: ShippingConfig,
    /// Pair a full producer with any container that has room when no
    /// container holding its product was found.
    pub fallback_delivery: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shipping: ShippingConfig::default(),
            fallback_delivery: true,
        }
    }
}

/// Which products output bins accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingConfig {
    pub artisan_goods: bool,
    pub extra_categories: Vec<ItemCategory>,
    /// Cap on the total quantity moved to an output bin in one trip.
    pub max_per_trip: u32,
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            artisan_goods: true,
            extra_categories: Vec::new(),
            max_per_trip: 999,
        }
    }
}

impl ShippingConfig {
    pub fn ships(&self, category: ItemCategory) -> bool {
        (self.artisan_goods && category == ItemCategory::ArtisanGoods)
            || self.extra_categories.contains(&category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_ship_artisan_goods_only() {
        let config = EngineConfig::default();
        assert!(config.fallback_delivery);
        assert!(config.shipping.ships(ItemCategory::ArtisanGoods));
        assert!(!config.shipping.ships(ItemCategory::Fish));
        assert_eq!(config.shipping.max_per_trip, 999);
    }

    #[test]
    fn extra_categories_extend_shipping() {
        let shipping = ShippingConfig {
            artisan_goods: false,
            extra_categories: vec![ItemCategory::Fish],
            ..ShippingConfig::default()
        };
        assert!(shipping.ships(ItemCategory::Fish));
        assert!(!shipping.ships(ItemCategory::ArtisanGoods));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "shipping": { "max_per_trip": 5 } }"#).unwrap();
        assert_eq!(config.shipping.max_per_trip, 5);
        assert!(config.shipping.artisan_goods);
        assert!(config.fallback_delivery);
    }
}
