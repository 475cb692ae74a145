use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    archive::Archive,
    property::{read_property_list, Property, PropertyValue},
    Guid, Name, Result,
};

/// World position plus rotation. ASE serializes six f32, ASA six f64.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct LocationData {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl LocationData {
    pub fn read(ar: &mut Archive) -> Result<Self> {
        if ar.is_asa() {
            Ok(Self {
                x: ar.reader.read_f64()?,
                y: ar.reader.read_f64()?,
                z: ar.reader.read_f64()?,
                pitch: ar.reader.read_f64()?,
                yaw: ar.reader.read_f64()?,
                roll: ar.reader.read_f64()?,
            })
        } else {
            Ok(Self {
                x: ar.reader.read_f32()? as f64,
                y: ar.reader.read_f32()? as f64,
                z: ar.reader.read_f32()? as f64,
                pitch: ar.reader.read_f32()? as f64,
                yaw: ar.reader.read_f32()? as f64,
                roll: ar.reader.read_f32()? as f64,
            })
        }
    }
}

/// One decoded save object: an actor, a component, or an inventory item.
///
/// Objects are frozen after decoding; only the container's relationship pass
/// fills in `parent` and `components` (arena indices, not pointers).
#[derive(Debug, Clone, Serialize)]
pub struct GameObject {
    /// Position in the container.
    pub id: usize,
    /// All-zero in ASE; the object identity in ASA.
    pub guid: Guid,
    pub class_name: Name,
    /// `names[0]` is the actor's logical name; additional entries mark this
    /// object as a sub-component of the object they name.
    pub names: Vec<Name>,
    pub is_item: bool,
    pub from_data_file: bool,
    pub data_file_index: i32,
    pub location: Option<LocationData>,
    #[serde(skip)]
    pub properties_offset: usize,
    pub should_be_loaded: bool,
    pub properties: Vec<Property>,
    /// Opaque trailing bytes after the property list, kept for classes that
    /// carry native payloads.
    #[serde(skip)]
    pub extra_data: Vec<u8>,
    /// Filled by the relationship pass.
    pub parent: Option<usize>,
    /// Component class name → container index, filled by the relationship pass.
    pub components: IndexMap<String, usize>,
}

impl GameObject {
    fn empty(id: usize) -> Self {
        Self {
            id,
            guid: Guid::nil(),
            class_name: Name::from(""),
            names: Vec::new(),
            is_item: false,
            from_data_file: false,
            data_file_index: 0,
            location: None,
            properties_offset: 0,
            should_be_loaded: true,
            properties: Vec::new(),
            extra_data: Vec::new(),
            parent: None,
            components: IndexMap::new(),
        }
    }

    /// The actor's logical name.
    pub fn primary_name(&self) -> Option<&Name> {
        self.names.first()
    }

    /// True when further name entries identify this object as a component.
    pub fn is_component(&self) -> bool {
        self.names.len() > 1
    }

    /// Last segment of the (possibly path-qualified) class name.
    pub fn short_class(&self) -> &str {
        let class = self.class_name.value();
        class
            .rsplit(|c| c == '.' || c == '/')
            .next()
            .unwrap_or(class)
    }

    pub fn property(&self, name: &str, index: Option<u32>) -> Option<&Property> {
        self.properties.iter().find(|p| {
            p.name.value() == name && index.map_or(true, |i| p.index == i)
        })
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name, None).is_some()
    }

    pub fn prop_i64(&self, name: &str, index: Option<u32>) -> Option<i64> {
        self.property(name, index).and_then(|p| p.value.as_i64())
    }

    pub fn prop_f64(&self, name: &str, index: Option<u32>) -> Option<f64> {
        self.property(name, index).and_then(|p| p.value.as_f64())
    }

    pub fn prop_str(&self, name: &str) -> Option<&str> {
        self.property(name, None).and_then(|p| p.value.as_str())
    }

    pub fn prop_bool(&self, name: &str) -> bool {
        self.property(name, None)
            .and_then(|p| p.value.as_bool())
            .unwrap_or(false)
    }

    /// Sum the values of every same-name property carrying the given index.
    /// Stat arrays serialize one property per point bucket, so the total for a
    /// stat is a sum, not a single lookup.
    pub fn sum_i64(&self, name: &str, index: u32) -> i64 {
        self.properties
            .iter()
            .filter(|p| p.name.value() == name && p.index == index)
            .filter_map(|p| p.value.as_i64())
            .sum()
    }

    /// Read an ASE world-save object header. Names go through the name table.
    pub fn read_world_header(ar: &mut Archive, id: usize) -> Result<Self> {
        let mut object = Self::empty(id);
        object.guid = ar.reader.read_guid()?;
        object.class_name = ar.read_name()?;

        let name_count = ar.reader.read_i32()?.max(0) as usize;
        object.names.reserve(name_count);
        for _ in 0..name_count {
            object.names.push(ar.read_name()?);
        }

        object.is_item = ar.reader.read_bool32()?;

        object.from_data_file = ar.reader.read_bool32()?;
        object.data_file_index = ar.reader.read_i32()?;

        if ar.reader.read_bool32()? {
            object.location = Some(LocationData::read(ar)?);
        }

        object.properties_offset = ar.reader.read_i32()?.max(0) as usize;
        object.should_be_loaded = ar.reader.read_bool32()?;
        Ok(object)
    }

    /// Read an inline-string object header, the layout used by profiles,
    /// tribes, cloud inventories and cryopod payloads.
    pub fn read_inline_header(ar: &mut Archive, id: usize) -> Result<Self> {
        let mut object = Self::empty(id);
        object.guid = ar.reader.read_guid()?;
        object.class_name = Name::from(ar.reader.read_fstring()?);
        object.is_item = ar.reader.read_bool32()?;

        let name_count = ar.reader.read_i32()?.max(0) as usize;
        object.names.reserve(name_count);
        for _ in 0..name_count {
            object.names.push(Name::from(ar.reader.read_fstring()?));
        }

        object.from_data_file = ar.reader.read_bool32()?;
        object.data_file_index = ar.reader.read_i32()?;

        if ar.reader.read_bool32()? {
            object.location = Some(LocationData::read(ar)?);
        }

        object.properties_offset = ar.reader.read_i32()?.max(0) as usize;
        object.should_be_loaded = ar.reader.read_bool32()?;
        Ok(object)
    }

    /// Read an ASA object header as found in profile/tribe/cloud files:
    /// GUID-identified, inline names, followed by an absolute property offset.
    pub fn read_asa_file_header(ar: &mut Archive, id: usize) -> Result<Self> {
        let mut object = Self::empty(id);
        object.guid = ar.reader.read_guid()?;
        object.class_name = Name::from(ar.reader.read_fstring()?);

        let _unknown = ar.reader.read_i32()?;
        let name_count = ar.reader.read_i32()?.max(0) as usize;
        for _ in 0..name_count {
            object.names.push(Name::from(ar.reader.read_fstring()?));
        }

        ar.reader.skip(12)?;
        object.properties_offset = ar.reader.read_i32()?.max(0) as usize;
        ar.reader.skip(4)?;
        Ok(object)
    }

    /// Read an ASA cloud-inventory object header (version 6/7 obelisk files):
    /// GUID, class, two opaque words, an instance name, then padding. The
    /// property block follows the headers sequentially, so the offset is the
    /// cursor position after this header.
    pub fn read_asa_cloud_header(ar: &mut Archive, id: usize, version: i32) -> Result<Self> {
        let mut object = Self::empty(id);
        object.guid = ar.reader.read_guid()?;
        object.class_name = Name::from(ar.reader.read_fstring()?);
        let _field1 = ar.reader.read_i32()?;
        let _field2 = ar.reader.read_i32()?;
        let instance_name = ar.reader.read_fstring()?;
        if !instance_name.is_empty() {
            object.names.push(Name::from(instance_name));
        }
        ar.reader.skip(if version >= 7 { 21 } else { 20 })?;
        object.properties_offset = ar.reader.tell();
        Ok(object)
    }

    /// Seek to this object's property block and decode it. `end` bounds the
    /// block; whatever sits between the list terminator and `end` is kept as
    /// extra data.
    pub fn load_properties(
        &mut self,
        ar: &mut Archive,
        base_offset: usize,
        end: Option<usize>,
    ) -> Result<()> {
        ar.reader.seek(base_offset + self.properties_offset)?;
        self.properties = read_property_list(ar)?;
        if let Some(end) = end {
            let tail = end.saturating_sub(ar.reader.tell());
            if tail > 0 {
                self.extra_data = ar.reader.read_bytes(tail)?;
            }
        }
        Ok(())
    }

    /// Convenience over nested struct properties: the value of `name` inside
    /// the property-list struct stored under `outer`.
    pub fn nested_prop<'a>(&'a self, outer: &str, name: &str) -> Option<&'a PropertyValue> {
        let value = &self.property(outer, None)?.value;
        let props = value.as_struct()?.properties()?;
        props
            .iter()
            .find(|p| p.name.value() == name)
            .map(|p| &p.value)
    }
}
