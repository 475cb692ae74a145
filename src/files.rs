use std::path::Path;

use tracing::instrument;

use crate::{
    archive::Archive,
    container::ObjectContainer,
    detect::detect,
    models::{CryopodCreature, PlayerInfo, TribeInfo, UploadedCreature, UploadedItem},
    object::GameObject,
    property::{ArrayValue, PropertyValue},
    Error, Result, SaveFormat,
};

const MAX_OBJECTS: i32 = 1_000_000;

/// Common carcass of the header-plus-objects file kinds (profiles, tribes,
/// cloud inventories). World saves have their own walker in [`crate::world`].
#[derive(Debug)]
pub struct SaveFile {
    pub version: i32,
    pub format: SaveFormat,
    pub container: ObjectContainer,
    pub parse_errors: Vec<String>,
}

impl SaveFile {
    #[instrument(skip_all, fields(len = data.len()))]
    fn parse(data: &[u8]) -> Result<Self> {
        let detection = detect(data);
        let format = detection.format;
        let mut ar = Archive::new(data, format);

        let version = ar.reader.read_i32()?;
        let cloud_layout = format.is_asa() && version >= 7;
        if cloud_layout {
            let _unknown1 = ar.reader.read_i32()?;
            let _unknown2 = ar.reader.read_i32()?;
        }

        let object_count = ar.reader.read_i32()?;
        if !(0..=MAX_OBJECTS).contains(&object_count) {
            return Err(Error::Corrupt(format!(
                "implausible object count {object_count}"
            )));
        }

        let mut objects = Vec::with_capacity(object_count as usize);
        for id in 0..object_count as usize {
            let object = if cloud_layout {
                GameObject::read_asa_cloud_header(&mut ar, id, version)?
            } else if format.is_asa() {
                GameObject::read_asa_file_header(&mut ar, id)?
            } else {
                GameObject::read_inline_header(&mut ar, id)?
            };
            objects.push(object);
        }

        // Property offsets are absolute in these file kinds; the next
        // object's offset bounds the block.
        let ends: Vec<Option<usize>> = (0..objects.len())
            .map(|i| objects.get(i + 1).map(|next| next.properties_offset))
            .collect();
        for (object, end) in objects.iter_mut().zip(ends) {
            if let Err(err) = object.load_properties(&mut ar, 0, end) {
                ar.record_error(format!(
                    "properties of object {} ({}): {err}",
                    object.id,
                    object.class_name.value(),
                ));
            }
        }

        let mut container = ObjectContainer::new(objects);
        container.build_relationships();

        Ok(Self {
            version,
            format,
            container,
            parse_errors: ar.parse_errors,
        })
    }

    /// First object whose class name contains `marker`.
    pub fn main_object(&self, marker: &str) -> Option<&GameObject> {
        self.container
            .iter()
            .find(|o| o.class_name.value().contains(marker))
    }

    pub fn parse_error_count(&self) -> usize {
        self.parse_errors.len()
    }
}

/// A `.arkprofile` player profile.
///
/// Player data sits in a `MyData` struct on the `PrimalPlayerData` object;
/// flat layouts seen in stripped-down profiles are handled by falling back to
/// direct properties.
#[derive(Debug)]
pub struct Profile {
    pub file: SaveFile,
}

impl Profile {
    pub const VALID_VERSIONS: &'static [i32] = &[1, 5, 6, 7];

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bytes(&std::fs::read(path)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let file = SaveFile::parse(data)?;
        if !Self::VALID_VERSIONS.contains(&file.version) {
            return Err(Error::Corrupt(format!(
                "unsupported profile version {}",
                file.version
            )));
        }
        Ok(Self { file })
    }

    pub fn main_object(&self) -> Option<&GameObject> {
        self.file.main_object("PrimalPlayerData")
    }

    fn my_data(&self) -> Option<&[crate::property::Property]> {
        self.main_object()?
            .property("MyData", None)?
            .value
            .as_struct()?
            .properties()
    }

    fn persistent_stats(&self) -> Option<&[crate::property::Property]> {
        self.my_data()?
            .iter()
            .find(|p| p.name.value() == "MyPersistentCharacterStats")?
            .value
            .as_struct()?
            .properties()
    }

    /// Look a property up in `MyData`, falling back to the main object.
    fn lookup(&self, name: &str) -> Option<&PropertyValue> {
        if let Some(props) = self.my_data() {
            if let Some(p) = props.iter().find(|p| p.name.value() == name) {
                return Some(&p.value);
            }
        }
        self.main_object()?.property(name, None).map(|p| &p.value)
    }

    fn stat(&self, name: &str) -> Option<&PropertyValue> {
        self.persistent_stats()?
            .iter()
            .find(|p| p.name.value() == name)
            .map(|p| &p.value)
    }

    pub fn player_name(&self) -> Option<&str> {
        self.lookup("PlayerName").and_then(|v| v.as_str())
    }

    pub fn player_id(&self) -> Option<i64> {
        self.lookup("PlayerDataID").and_then(|v| v.as_i64())
    }

    /// ASE writes `TribeId`, ASA `TribeID`.
    pub fn tribe_id(&self) -> Option<i64> {
        self.lookup("TribeId")
            .or_else(|| self.lookup("TribeID"))
            .and_then(|v| v.as_i64())
    }

    pub fn unique_net_id(&self) -> Option<String> {
        match self.lookup("UniqueID")?.as_struct()? {
            crate::structs::StructValue::UniqueNetIdRepl(id) => Some(id.net_id.clone()),
            _ => None,
        }
    }

    pub fn experience(&self) -> f64 {
        self.stat("CharacterStatusComponent_ExperiencePoints")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    pub fn level(&self) -> i64 {
        let base = self
            .stat("CharacterStatusComponent_BaseCharacterLevel")
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        let extra = self
            .stat("CharacterStatusComponent_ExtraCharacterLevel")
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        1 + base + extra
    }

    pub fn total_engram_points(&self) -> i64 {
        self.stat("PlayerState_TotalEngramPoints")
            .and_then(|v| v.as_i64())
            .unwrap_or(0)
    }

    pub fn engram_blueprints(&self) -> Vec<String> {
        let value = self
            .stat("PlayerState_EngramBlueprints")
            .or_else(|| self.stat("EngramBlueprints"));
        let Some(array) = value.and_then(|v| v.as_array()) else {
            return Vec::new();
        };
        match array {
            ArrayValue::Str(v) => v.clone(),
            ArrayValue::Name(v) => v.iter().map(|n| n.to_string()).collect(),
            ArrayValue::Object(v) => v
                .iter()
                .filter_map(|r| match r {
                    crate::property::ObjectRef::Name(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn info(&self) -> Option<PlayerInfo> {
        Some(PlayerInfo::from_profile(self))
    }
}

/// A `.arktribe` tribe snapshot.
#[derive(Debug)]
pub struct Tribe {
    pub file: SaveFile,
}

impl Tribe {
    pub const VALID_VERSIONS: &'static [i32] = &[1, 5, 6, 7];

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bytes(&std::fs::read(path)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let file = SaveFile::parse(data)?;
        if !Self::VALID_VERSIONS.contains(&file.version) {
            return Err(Error::Corrupt(format!(
                "unsupported tribe version {}",
                file.version
            )));
        }
        Ok(Self { file })
    }

    pub fn main_object(&self) -> Option<&GameObject> {
        self.file.main_object("PrimalTribeData")
    }

    /// The decoded tribe: members, logs, alliances, government.
    pub fn info(&self) -> Option<TribeInfo> {
        self.main_object().map(TribeInfo::from_object)
    }
}

/// An obelisk / cloud inventory image (no canonical extension).
#[derive(Debug)]
pub struct CloudInventory {
    pub file: SaveFile,
}

impl CloudInventory {
    pub const VALID_VERSIONS: &'static [i32] = &[1, 2, 3, 4, 5, 6, 7];

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bytes(&std::fs::read(path)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let file = SaveFile::parse(data)?;
        if !Self::VALID_VERSIONS.contains(&file.version) {
            return Err(Error::Corrupt(format!(
                "unsupported cloud inventory version {}",
                file.version
            )));
        }
        Ok(Self { file })
    }

    pub fn main_object(&self) -> Option<&GameObject> {
        self.file.main_object("ArkCloudInventoryData")
    }

    fn ark_data(&self) -> Option<&[crate::property::Property]> {
        self.main_object()?
            .property("MyArkData", None)?
            .value
            .as_struct()?
            .properties()
    }

    fn ark_data_array(&self, name: &str) -> Vec<&crate::structs::StructValue> {
        let Some(props) = self.ark_data() else {
            return Vec::new();
        };
        let Some(array) = props
            .iter()
            .find(|p| p.name.value() == name)
            .and_then(|p| p.value.as_array())
        else {
            return Vec::new();
        };
        match array {
            ArrayValue::Struct { elements, .. } => elements.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Creatures uploaded at an obelisk.
    pub fn uploaded_creatures(&self) -> Vec<UploadedCreature> {
        self.ark_data_array("ArkTamedDinosData")
            .into_iter()
            .filter_map(UploadedCreature::from_struct)
            .collect()
    }

    /// Items uploaded at an obelisk, cryopod payloads included.
    pub fn uploaded_items(&self) -> Vec<UploadedItem> {
        self.ark_data_array("ArkItems")
            .into_iter()
            .filter_map(UploadedItem::from_struct)
            .collect()
    }

    /// Uploaded player characters.
    pub fn characters(&self) -> Vec<&GameObject> {
        self.file.container.by_class_pattern("PlayerPawnTest").collect()
    }

    /// Cryopod payloads found anywhere in the inventory's raw objects.
    pub fn cryopod_creatures(&self) -> Vec<CryopodCreature> {
        self.file
            .container
            .iter()
            .filter_map(CryopodCreature::from_item_object)
            .collect()
    }
}
