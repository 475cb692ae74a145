use serde::Serialize;

use crate::{
    property::{ArrayValue, Property, PropertyValue},
    structs::StructValue,
};

use super::{cryopod::CryopodCreature, parse_display_name, quality_name};

fn find<'a>(props: &'a [Property], name: &str) -> Option<&'a PropertyValue> {
    props
        .iter()
        .find(|p| p.name.value() == name)
        .map(|p| &p.value)
}

fn find_i64(props: &[Property], name: &str) -> i64 {
    find(props, name).and_then(|v| v.as_i64()).unwrap_or(0)
}

fn find_f64(props: &[Property], name: &str) -> f64 {
    find(props, name).and_then(|v| v.as_f64()).unwrap_or(0.0)
}

fn find_bool(props: &[Property], name: &str) -> bool {
    find(props, name).and_then(|v| v.as_bool()).unwrap_or(false)
}

/// A creature parked at an obelisk.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedCreature {
    pub name: String,
    pub species: String,
    pub level: i64,
    pub dino_id1: i64,
    pub dino_id2: i64,
    pub experience: f64,
    pub upload_time: i64,
}

impl UploadedCreature {
    /// Build from one `ArkTamedDinosData` struct entry.
    pub fn from_struct(entry: &StructValue) -> Option<Self> {
        let props = entry.properties()?;
        let display = find(props, "DinoName").and_then(|v| v.as_str()).unwrap_or("");
        let (name, level, species) = parse_display_name(display);
        Some(Self {
            name,
            species: species.unwrap_or_default(),
            level: level.unwrap_or(1),
            dino_id1: find_i64(props, "DinoID1"),
            dino_id2: find_i64(props, "DinoID2"),
            experience: find_f64(props, "DinoExperiencePoints"),
            upload_time: find_i64(props, "UploadTime"),
        })
    }
}

/// An item parked at an obelisk.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedItem {
    pub blueprint: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub custom_name: String,
    pub item_id1: i64,
    pub item_id2: i64,
    pub quantity: i64,
    pub quality_index: i64,
    pub quality: &'static str,
    pub durability: f64,
    pub rating: f64,
    pub is_blueprint: bool,
    pub is_engram: bool,
    pub upload_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cryopod_creature: Option<CryopodCreature>,
}

impl UploadedItem {
    /// Build from one `ArkItems` struct entry, whose payload sits in a nested
    /// `ArkTributeItem` struct.
    pub fn from_struct(entry: &StructValue) -> Option<Self> {
        let outer = entry.properties()?;
        let tribute = find(outer, "ArkTributeItem")?.as_struct()?.properties()?;

        let blueprint = find(tribute, "ItemArchetype")
            .and_then(archetype_path)
            .unwrap_or_default();
        let name = blueprint
            .rsplit('.')
            .next()
            .unwrap_or("")
            .trim_end_matches("_C")
            .to_owned();

        let (item_id1, item_id2) = find(tribute, "ItemId")
            .and_then(|v| v.as_struct())
            .and_then(|s| s.properties())
            .map(|ids| (find_i64(ids, "ItemID1"), find_i64(ids, "ItemID2")))
            .unwrap_or((0, 0));

        let quality_index = find_i64(tribute, "ItemQualityIndex");
        let cryopod_creature = if super::cryopod::is_cryopod_class(&blueprint) {
            find(tribute, "CustomItemDatas")
                .and_then(|v| v.as_array())
                .and_then(CryopodCreature::from_custom_item_datas)
        } else {
            None
        };

        Some(Self {
            name,
            custom_name: find(tribute, "CustomItemName")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_owned(),
            item_id1,
            item_id2,
            quantity: find_i64(tribute, "ItemQuantity").max(1),
            quality_index,
            quality: quality_name(quality_index),
            durability: find_f64(tribute, "ItemDurability"),
            rating: find_f64(tribute, "ItemRating"),
            is_blueprint: find_bool(tribute, "bIsBlueprint"),
            is_engram: find_bool(tribute, "bIsEngram"),
            upload_time: find_f64(outer, "UploadTime"),
            cryopod_creature,
            blueprint,
        })
    }

    pub fn is_cryopod(&self) -> bool {
        super::cryopod::is_cryopod_class(&self.blueprint)
    }

    pub fn display_name(&self) -> &str {
        if self.custom_name.is_empty() {
            &self.name
        } else {
            &self.custom_name
        }
    }
}

/// Item archetypes appear as plain strings, name references or soft object
/// paths depending on the file generation.
fn archetype_path(value: &PropertyValue) -> Option<String> {
    match value {
        PropertyValue::Str(s) => Some(s.clone()),
        PropertyValue::Name(n) => Some(n.to_string()),
        PropertyValue::SoftObject(s) => Some(s.path.clone()),
        PropertyValue::Object(crate::property::ObjectRef::Name(n)) => Some(n.to_string()),
        PropertyValue::Array(ArrayValue::Str(v)) => v.first().cloned(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Name;

    fn str_prop(name: &str, value: &str) -> Property {
        Property {
            name: Name::from(name),
            index: 0,
            value: PropertyValue::Str(value.to_owned()),
        }
    }

    fn int_prop(name: &str, value: i32) -> Property {
        Property {
            name: Name::from(name),
            index: 0,
            value: PropertyValue::Int(value),
        }
    }

    #[test]
    fn uploaded_creature_parses_display_name() {
        let entry = StructValue::Properties(vec![
            str_prop("DinoName", "Crunch - Lvl 226 (Rex)"),
            int_prop("DinoID1", 11),
            int_prop("DinoID2", 22),
        ]);
        let creature = UploadedCreature::from_struct(&entry).unwrap();
        assert_eq!(creature.name, "Crunch");
        assert_eq!(creature.level, 226);
        assert_eq!(creature.species, "Rex");
        assert_eq!((creature.dino_id1, creature.dino_id2), (11, 22));
    }

    #[test]
    fn uploaded_item_reads_tribute_struct() {
        let tribute = StructValue::Properties(vec![
            str_prop(
                "ItemArchetype",
                "BlueprintGeneratedClass /Game/Weapons/WeaponTek.WeaponTek_C",
            ),
            int_prop("ItemQuantity", 3),
            int_prop("ItemQualityIndex", 5),
        ]);
        let entry = StructValue::Properties(vec![Property {
            name: Name::from("ArkTributeItem"),
            index: 0,
            value: PropertyValue::Struct {
                struct_type: crate::structs::StructType::Other("ArkTributeItem".into()),
                value: tribute,
            },
        }]);
        let item = UploadedItem::from_struct(&entry).unwrap();
        assert_eq!(item.name, "WeaponTek");
        assert_eq!(item.quantity, 3);
        assert_eq!(item.quality, "Ascendant");
        assert!(!item.is_cryopod());
        assert!(item.cryopod_creature.is_none());
    }
}
