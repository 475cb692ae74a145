use serde::Serialize;

use crate::{
    maps::MapConfig,
    object::{GameObject, LocationData},
    property::PropertyValue,
    structs::StructValue,
};

use super::stats::StatPoints;

/// Compose the 64-bit dino identity from its two serialized halves.
pub fn compose_dino_id(id1: i64, id2: i64) -> u64 {
    ((id1 as u32 as u64) << 32) | (id2 as u32 as u64)
}

/// `"Rex_Character_BP_C"` → `"Rex"`.
pub fn species_from_class(class: &str) -> String {
    let base = class
        .split_once("_Character_BP")
        .map(|(head, _)| head)
        .unwrap_or_else(|| class.strip_suffix("_C").unwrap_or(class));
    base.replace('_', " ")
}

fn colors(object: &GameObject) -> Vec<u8> {
    (0..6)
        .map(|i| object.prop_i64("ColorSetIndices", Some(i)).unwrap_or(0) as u8)
        .collect()
}

fn ancestor_id(object: &GameObject, property: &str) -> Option<u64> {
    let array = object.property(property, None)?.value.as_array()?;
    let elements = match array {
        crate::property::ArrayValue::Struct { elements, .. } => elements,
        _ => return None,
    };
    let props = match elements.first()? {
        StructValue::Properties(props) => props,
        _ => return None,
    };
    let field = |candidates: &[&str]| {
        candidates.iter().find_map(|name| {
            props
                .iter()
                .find(|p| p.name.value() == *name)
                .and_then(|p| p.value.as_i64())
        })
    };
    let id1 = field(&["AncestorsDinoID1", "DinoID1", "MaleDinoID1", "FemaleDinoID1"])?;
    let id2 = field(&["AncestorsDinoID2", "DinoID2", "MaleDinoID2", "FemaleDinoID2"])?;
    Some(compose_dino_id(id1, id2))
}

fn gps(location: Option<&LocationData>, map: Option<&MapConfig>) -> (Option<f64>, Option<f64>) {
    match (location, map) {
        (Some(loc), Some(map)) => (Some(map.ue_to_lat(loc.y)), Some(map.ue_to_lon(loc.x))),
        _ => (None, None),
    }
}

/// A creature under tribe ownership.
#[derive(Debug, Clone, Serialize)]
pub struct TamedCreature {
    #[serde(rename = "id")]
    pub dino_id: u64,
    pub creature: String,
    pub name: String,
    pub sex: &'static str,
    pub base: i64,
    pub lvl: i64,
    pub tribeid: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tribe: Option<String>,
    pub tamer: String,
    pub imprinter: String,
    pub imprint: f64,
    #[serde(rename = "mut-f")]
    pub mutations_female: i64,
    #[serde(rename = "mut-m")]
    pub mutations_male: i64,
    pub colors: Vec<u8>,
    pub wild_stats: StatPoints,
    pub tamed_stats: StatPoints,
    pub cryo: bool,
    pub neutered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub father: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mother: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

impl TamedCreature {
    pub fn from_objects(
        object: &GameObject,
        status: Option<&GameObject>,
        map: Option<&MapConfig>,
    ) -> Self {
        let base = status
            .and_then(|s| s.prop_i64("BaseCharacterLevel", None))
            .unwrap_or(0);
        let extra = status
            .and_then(|s| s.prop_i64("ExtraCharacterLevel", None))
            .unwrap_or(0);
        let imprint = status
            .and_then(|s| s.prop_f64("DinoImprintingQuality", None))
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);
        let (lat, lon) = gps(object.location.as_ref(), map);

        Self {
            dino_id: compose_dino_id(
                object.prop_i64("DinoID1", None).unwrap_or(0),
                object.prop_i64("DinoID2", None).unwrap_or(0),
            ),
            creature: object.short_class().to_owned(),
            name: object.prop_str("TamedName").unwrap_or_default().to_owned(),
            sex: if object.prop_bool("bIsFemale") {
                "Female"
            } else {
                "Male"
            },
            base: 1 + base,
            lvl: 1 + base + extra,
            tribeid: object.prop_i64("TargetingTeam", None).unwrap_or(0),
            tribe: object.prop_str("TribeName").map(str::to_owned),
            tamer: object
                .prop_str("TamerString")
                .or_else(|| status.and_then(|s| s.prop_str("TamerString")))
                .unwrap_or_default()
                .to_owned(),
            imprinter: object
                .prop_str("ImprinterName")
                .unwrap_or_default()
                .to_owned(),
            imprint,
            mutations_female: object.prop_i64("RandomMutationsFemale", None).unwrap_or(0),
            mutations_male: object.prop_i64("RandomMutationsMale", None).unwrap_or(0),
            colors: colors(object),
            wild_stats: status
                .map(|s| StatPoints::from_object(s, "NumberOfLevelUpPointsApplied"))
                .unwrap_or_default(),
            tamed_stats: status
                .map(|s| StatPoints::from_object(s, "NumberOfLevelUpPointsAppliedTamed"))
                .unwrap_or_default(),
            cryo: object.prop_bool("IsInCryo"),
            neutered: object.prop_bool("bNeutered"),
            father: ancestor_id(object, "DinoAncestors"),
            mother: ancestor_id(object, "DinoAncestorsMale"),
            location: object.location,
            lat,
            lon,
        }
    }

    pub fn total_mutations(&self) -> i64 {
        self.mutations_female + self.mutations_male
    }
}

/// A creature nobody has tamed.
#[derive(Debug, Clone, Serialize)]
pub struct WildCreature {
    #[serde(rename = "id")]
    pub dino_id: u64,
    pub creature: String,
    pub sex: &'static str,
    pub lvl: i64,
    pub colors: Vec<u8>,
    pub stats: StatPoints,
    pub tameable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

impl WildCreature {
    pub fn from_objects(
        object: &GameObject,
        status: Option<&GameObject>,
        map: Option<&MapConfig>,
    ) -> Self {
        let base = status
            .and_then(|s| s.prop_i64("BaseCharacterLevel", None))
            .unwrap_or(0);
        let tameable = object
            .property("RequiredTameAffinity", None)
            .map(|p| &p.value)
            .or_else(|| {
                status.and_then(|s| s.property("RequiredTameAffinity", None).map(|p| &p.value))
            })
            .and_then(PropertyValue::as_f64)
            .map(|v| v > 0.0)
            .unwrap_or(false);
        let (lat, lon) = gps(object.location.as_ref(), map);

        Self {
            dino_id: compose_dino_id(
                object.prop_i64("DinoID1", None).unwrap_or(0),
                object.prop_i64("DinoID2", None).unwrap_or(0),
            ),
            creature: object.short_class().to_owned(),
            sex: if object.prop_bool("bIsFemale") {
                "Female"
            } else {
                "Male"
            },
            lvl: 1 + base,
            colors: colors(object),
            stats: status
                .map(|s| StatPoints::from_object(s, "NumberOfLevelUpPointsApplied"))
                .unwrap_or_default(),
            tameable,
            location: object.location,
            lat,
            lon,
        }
    }
}
