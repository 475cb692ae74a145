use serde::Serialize;

use crate::{
    maps::MapConfig,
    object::{GameObject, LocationData},
};

/// A placed structure.
#[derive(Debug, Clone, Serialize)]
pub struct StructureInfo {
    #[serde(rename = "struct")]
    pub class: String,
    pub tribeid: i64,
    pub owner: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub health: f64,
    pub max_health: f64,
    /// Seconds since an ally was last in range, from the save's game clock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decay_elapsed: Option<f64>,
    pub locked: bool,
    pub powered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

impl StructureInfo {
    pub fn from_object(object: &GameObject, game_time: f64, map: Option<&MapConfig>) -> Self {
        let last_in_range = object
            .prop_f64("LastInAllyRangeTimeSerialized", None)
            .or_else(|| object.prop_f64("LastInAllyRangeTime", None));
        let (lat, lon) = match (object.location.as_ref(), map) {
            (Some(loc), Some(map)) => (Some(map.ue_to_lat(loc.y)), Some(map.ue_to_lon(loc.x))),
            _ => (None, None),
        };
        Self {
            class: object.short_class().to_owned(),
            tribeid: object.prop_i64("TargetingTeam", None).unwrap_or(0),
            owner: object.prop_str("OwnerName").unwrap_or_default().to_owned(),
            name: object
                .prop_str("StructureName")
                .or_else(|| object.prop_str("BoxName"))
                .unwrap_or_default()
                .to_owned(),
            health: object.prop_f64("Health", None).unwrap_or(0.0),
            max_health: object.prop_f64("MaxHealth", None).unwrap_or(0.0),
            decay_elapsed: last_in_range.map(|t| game_time - t),
            locked: object.prop_bool("bIsLocked"),
            powered: object.prop_bool("bIsPowered"),
            location: object.location,
            lat,
            lon,
        }
    }
}
