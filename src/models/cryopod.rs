use serde::Serialize;

use crate::{
    archive::Archive,
    object::GameObject,
    property::{ArrayValue, Property},
    structs::StructValue,
    SaveFormat,
};

use super::{
    creature::{compose_dino_id, species_from_class},
    parse_display_name,
};

/// Item classes that embed a creature in their custom data.
const CRYOPOD_MARKERS: &[&str] = &["cryopod", "soultrap", "vivarium", "dinoball"];

pub fn is_cryopod_class(class: &str) -> bool {
    let class = class.to_ascii_lowercase();
    CRYOPOD_MARKERS.iter().any(|m| class.contains(m))
}

/// A creature frozen inside a cryopod item.
///
/// ASE embeds the creature as a byte blob that is itself a miniature save
/// (object headers plus property lists); ASA embeds structured strings and
/// floats instead. Both routes land here.
#[derive(Debug, Clone, Serialize)]
pub struct CryopodCreature {
    pub class_name: String,
    pub species: String,
    pub name: String,
    pub level: i64,
    pub experience: f64,
    pub dino_id: u64,
    pub tamer: String,
    pub colors: Vec<u8>,
}

impl CryopodCreature {
    /// Decode the payload of a cryopod-like item object. Items without custom
    /// data (an empty pod) yield `None`, never an error.
    pub fn from_item_object(object: &GameObject) -> Option<Self> {
        if !is_cryopod_class(object.class_name.value()) {
            return None;
        }
        let array = object.property("CustomItemDatas", None)?.value.as_array()?;
        Self::from_custom_item_datas(array)
    }

    /// Decode from a `CustomItemDatas` struct array, wherever it was found.
    pub fn from_custom_item_datas(array: &ArrayValue) -> Option<Self> {
        let elements = match array {
            ArrayValue::Struct { elements, .. } => elements,
            _ => return None,
        };
        for element in elements {
            let Some(props) = element.properties() else {
                continue;
            };
            let is_dino_entry = find(props, "CustomDataName")
                .and_then(|v| v.as_str())
                .is_some_and(|name| name == "Dino");
            if !is_dino_entry {
                continue;
            }

            if let Some(bytes) = custom_data_bytes(props) {
                if bytes.is_empty() {
                    return None;
                }
                if let Some(mut creature) = Self::from_embedded_bytes(&bytes) {
                    // The string block sometimes carries a nicer species name.
                    if let Some(species) = custom_string(props, 9) {
                        creature.species = species;
                    }
                    return Some(creature);
                }
            }

            if let Some(strings) = str_array(find(props, "CustomDataStrings")) {
                return Self::from_custom_strings(&strings);
            }
        }
        None
    }

    /// Decode the ASE byte payload: an embedded miniature save with its own
    /// object headers and property lists, run through the regular decoder.
    pub fn from_embedded_bytes(bytes: &[u8]) -> Option<Self> {
        let mut ar = Archive::new(bytes, SaveFormat::Ase);
        let count = ar.reader.read_i32().ok()?;
        if !(1..=64).contains(&count) {
            return None;
        }

        let mut objects = Vec::with_capacity(count as usize);
        for id in 0..count as usize {
            objects.push(GameObject::read_inline_header(&mut ar, id).ok()?);
        }
        let ends: Vec<Option<usize>> = (0..objects.len())
            .map(|i| objects.get(i + 1).map(|next| next.properties_offset))
            .collect();
        for (object, end) in objects.iter_mut().zip(ends) {
            let _ = object.load_properties(&mut ar, 0, end);
        }

        let status = objects
            .iter()
            .find(|o| o.class_name.value().contains("DinoCharacterStatus"));
        let creature = objects.first()?;

        let base = status
            .and_then(|s| s.prop_i64("BaseCharacterLevel", None))
            .unwrap_or(0);
        let extra = status
            .and_then(|s| s.prop_i64("ExtraCharacterLevel", None))
            .unwrap_or(0);

        Some(Self {
            class_name: creature.class_name.value().to_owned(),
            species: species_from_class(creature.short_class()),
            name: creature
                .prop_str("TamedName")
                .unwrap_or_default()
                .to_owned(),
            level: 1 + base + extra,
            experience: status
                .and_then(|s| s.prop_f64("ExperiencePoints", None))
                .unwrap_or(0.0),
            dino_id: compose_dino_id(
                creature.prop_i64("DinoID1", None).unwrap_or(0),
                creature.prop_i64("DinoID2", None).unwrap_or(0),
            ),
            tamer: creature
                .prop_str("TamerString")
                .unwrap_or_default()
                .to_owned(),
            colors: (0..6)
                .map(|i| creature.prop_i64("ColorSetIndices", Some(i)).unwrap_or(0) as u8)
                .collect(),
        })
    }

    /// Decode the ASA string payload:
    /// `[class, "Name - Lvl N (Species)", "c0,c1,...", ...]`.
    fn from_custom_strings(strings: &[String]) -> Option<Self> {
        if strings.len() < 2 {
            return None;
        }
        let class_name = strings[0].clone();
        let (name, level, mut species) = parse_display_name(&strings[1]);
        if let Some(better) = strings.get(9).filter(|s| !s.is_empty()) {
            species = Some(better.clone());
        }
        let colors = strings
            .get(2)
            .map(|s| {
                s.trim_end_matches(',')
                    .split(',')
                    .filter_map(|c| c.trim().parse().ok())
                    .collect()
            })
            .unwrap_or_default();
        Some(Self {
            species: species.unwrap_or_else(|| species_from_class(&class_name)),
            class_name,
            name,
            level: level.unwrap_or(1),
            experience: 0.0,
            dino_id: 0,
            tamer: String::new(),
            colors,
        })
    }
}

fn find<'a>(props: &'a [Property], name: &str) -> Option<&'a crate::property::PropertyValue> {
    props
        .iter()
        .find(|p| p.name.value() == name)
        .map(|p| &p.value)
}

fn str_array(value: Option<&crate::property::PropertyValue>) -> Option<Vec<String>> {
    match value?.as_array()? {
        ArrayValue::Str(v) => Some(v.clone()),
        ArrayValue::Name(v) => Some(v.iter().map(|n| n.to_string()).collect()),
        _ => None,
    }
}

fn custom_string(props: &[Property], index: usize) -> Option<String> {
    str_array(find(props, "CustomDataStrings"))?
        .get(index)
        .filter(|s| !s.is_empty())
        .cloned()
}

/// `CustomDataBytes` → `ByteArrays[0]` → `Bytes`.
fn custom_data_bytes(props: &[Property]) -> Option<Vec<u8>> {
    let data_bytes = find(props, "CustomDataBytes")?.as_struct()?.properties()?;
    let byte_arrays = match find(data_bytes, "ByteArrays")?.as_array()? {
        ArrayValue::Struct { elements, .. } => elements,
        _ => return None,
    };
    let first = match byte_arrays.first() {
        Some(StructValue::Properties(props)) => props,
        _ => return Some(Vec::new()),
    };
    match find(first, "Bytes")?.as_array()? {
        ArrayValue::Byte(bytes) => Some(bytes.clone()),
        _ => None,
    }
}
