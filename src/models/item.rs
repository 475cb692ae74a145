use serde::Serialize;

use crate::object::GameObject;

use super::{cryopod::CryopodCreature, quality_name};

/// An inventory item stack.
#[derive(Debug, Clone, Serialize)]
pub struct ItemStack {
    pub class_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub custom_name: String,
    pub quantity: i64,
    pub quality_index: i64,
    pub quality: &'static str,
    pub rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub durability: Option<f64>,
    pub is_blueprint: bool,
    pub is_engram: bool,
    /// Present when this item is a cryopod with a creature inside.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cryopod_creature: Option<CryopodCreature>,
}

impl ItemStack {
    pub fn from_object(object: &GameObject) -> Self {
        let quality_index = object.prop_i64("ItemQualityIndex", None).unwrap_or(0);
        Self {
            class_name: object.short_class().to_owned(),
            custom_name: object
                .prop_str("CustomItemName")
                .unwrap_or_default()
                .to_owned(),
            quantity: object.prop_i64("ItemQuantity", None).unwrap_or(1),
            quality_index,
            quality: quality_name(quality_index),
            rating: object.prop_f64("ItemRating", None).unwrap_or(0.0),
            durability: object.prop_f64("SavedDurability", None),
            is_blueprint: object.prop_bool("bIsBlueprint"),
            is_engram: object.prop_bool("bIsEngram"),
            cryopod_creature: CryopodCreature::from_item_object(object),
        }
    }
}
