use serde::Serialize;

use crate::{
    archive::Archive,
    structs::{StructType, StructValue},
    Error, Guid, Name, Result,
};

/// Property tags, dispatched statically from the serialized tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PropertyType {
    BoolProperty,
    ByteProperty,
    Int8Property,
    Int16Property,
    IntProperty,
    Int64Property,
    UInt16Property,
    UInt32Property,
    UInt64Property,
    FloatProperty,
    DoubleProperty,
    StrProperty,
    NameProperty,
    TextProperty,
    EnumProperty,
    ObjectProperty,
    SoftObjectProperty,
    StructProperty,
    ArrayProperty,
    MapProperty,
    SetProperty,
}

impl PropertyType {
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(match name {
            "BoolProperty" => PropertyType::BoolProperty,
            "ByteProperty" => PropertyType::ByteProperty,
            "Int8Property" => PropertyType::Int8Property,
            "Int16Property" => PropertyType::Int16Property,
            "IntProperty" => PropertyType::IntProperty,
            "Int64Property" => PropertyType::Int64Property,
            "UInt16Property" => PropertyType::UInt16Property,
            "UInt32Property" => PropertyType::UInt32Property,
            "UInt64Property" => PropertyType::UInt64Property,
            "FloatProperty" => PropertyType::FloatProperty,
            "DoubleProperty" => PropertyType::DoubleProperty,
            "StrProperty" => PropertyType::StrProperty,
            "NameProperty" => PropertyType::NameProperty,
            "TextProperty" => PropertyType::TextProperty,
            "EnumProperty" => PropertyType::EnumProperty,
            "ObjectProperty" => PropertyType::ObjectProperty,
            "SoftObjectProperty" => PropertyType::SoftObjectProperty,
            "StructProperty" => PropertyType::StructProperty,
            "ArrayProperty" => PropertyType::ArrayProperty,
            "MapProperty" => PropertyType::MapProperty,
            "SetProperty" => PropertyType::SetProperty,
            other => return Err(Error::UnknownProperty(other.to_owned())),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            PropertyType::BoolProperty => "BoolProperty",
            PropertyType::ByteProperty => "ByteProperty",
            PropertyType::Int8Property => "Int8Property",
            PropertyType::Int16Property => "Int16Property",
            PropertyType::IntProperty => "IntProperty",
            PropertyType::Int64Property => "Int64Property",
            PropertyType::UInt16Property => "UInt16Property",
            PropertyType::UInt32Property => "UInt32Property",
            PropertyType::UInt64Property => "UInt64Property",
            PropertyType::FloatProperty => "FloatProperty",
            PropertyType::DoubleProperty => "DoubleProperty",
            PropertyType::StrProperty => "StrProperty",
            PropertyType::NameProperty => "NameProperty",
            PropertyType::TextProperty => "TextProperty",
            PropertyType::EnumProperty => "EnumProperty",
            PropertyType::ObjectProperty => "ObjectProperty",
            PropertyType::SoftObjectProperty => "SoftObjectProperty",
            PropertyType::StructProperty => "StructProperty",
            PropertyType::ArrayProperty => "ArrayProperty",
            PropertyType::MapProperty => "MapProperty",
            PropertyType::SetProperty => "SetProperty",
        }
    }
}

/// Reference to another object: an index into the objects table (ASE), a GUID
/// (ASA), or a by-name reference. `-1` and the all-zero GUID decode to `Null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ObjectRef {
    Null,
    Id(i32),
    Name(Name),
    Guid(Guid),
}

impl ObjectRef {
    pub fn is_null(&self) -> bool {
        matches!(self, ObjectRef::Null)
    }

    pub fn id(&self) -> Option<i32> {
        match self {
            ObjectRef::Id(id) => Some(*id),
            _ => None,
        }
    }

    pub fn guid(&self) -> Option<Guid> {
        match self {
            ObjectRef::Guid(guid) => Some(*guid),
            _ => None,
        }
    }

    fn read(ar: &mut Archive, short_form: bool) -> Result<Self> {
        if ar.is_asa() {
            let guid = ar.reader.read_guid()?;
            return Ok(if guid.is_nil() {
                ObjectRef::Null
            } else {
                ObjectRef::Guid(guid)
            });
        }
        if short_form {
            let id = ar.reader.read_i32()?;
            return Ok(if id == -1 {
                ObjectRef::Null
            } else {
                ObjectRef::Id(id)
            });
        }
        match ar.reader.read_i32()? {
            0 => {
                let id = ar.reader.read_i32()?;
                Ok(if id == -1 {
                    ObjectRef::Null
                } else {
                    ObjectRef::Id(id)
                })
            }
            1 => Ok(ObjectRef::Name(ar.read_name()?)),
            other => Err(Error::Unexpected(format!(
                "object reference discriminator {other}"
            ))),
        }
    }
}

/// A byte that is either raw or the constant of a named enum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ByteValue {
    Raw(u8),
    Enum { enum_type: Name, value: Name },
}

/// Localized text. Only the history variants observed in save files are
/// decoded; anything else is recovered by the size-skip policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub flags: u32,
    pub variant: TextVariant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TextVariant {
    None { culture_invariant: Option<String> },
    Base {
        namespace: String,
        key: String,
        source: String,
    },
}

impl Text {
    fn read(ar: &mut Archive) -> Result<Self> {
        let flags = ar.reader.read_u32()?;
        let history = ar.reader.read_i8()?;
        let variant = match history {
            -1 => TextVariant::None {
                culture_invariant: ar
                    .reader
                    .read_bool32()?
                    .then(|| ar.reader.read_fstring())
                    .transpose()?,
            },
            0 => TextVariant::Base {
                namespace: ar.reader.read_fstring()?,
                key: ar.reader.read_fstring()?,
                source: ar.reader.read_fstring()?,
            },
            other => {
                return Err(Error::Unexpected(format!("text history type {other}")))
            }
        };
        Ok(Self { flags, variant })
    }

    /// The human-readable string, when one is present.
    pub fn as_str(&self) -> Option<&str> {
        match &self.variant {
            TextVariant::None { culture_invariant } => culture_invariant.as_deref(),
            TextVariant::Base { source, .. } => Some(source),
        }
    }
}

/// Soft reference to an asset by path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoftObjectPath {
    pub path: String,
    pub sub_path: String,
}

/// Homogeneous element storage for arrays and sets, vectorized so the tag is
/// not repeated per element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ArrayValue {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int(Vec<i32>),
    Int64(Vec<i64>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Bool(Vec<bool>),
    Byte(Vec<u8>),
    Str(Vec<String>),
    Name(Vec<Name>),
    Enum(Vec<Name>),
    Object(Vec<ObjectRef>),
    SoftObject(Vec<SoftObjectPath>),
    Struct {
        struct_type: StructType,
        elements: Vec<StructValue>,
    },
}

impl ArrayValue {
    pub fn len(&self) -> usize {
        match self {
            ArrayValue::Int8(v) => v.len(),
            ArrayValue::Int16(v) => v.len(),
            ArrayValue::Int(v) => v.len(),
            ArrayValue::Int64(v) => v.len(),
            ArrayValue::UInt16(v) => v.len(),
            ArrayValue::UInt32(v) => v.len(),
            ArrayValue::UInt64(v) => v.len(),
            ArrayValue::Float(v) => v.len(),
            ArrayValue::Double(v) => v.len(),
            ArrayValue::Bool(v) => v.len(),
            ArrayValue::Byte(v) => v.len(),
            ArrayValue::Str(v) => v.len(),
            ArrayValue::Name(v) => v.len(),
            ArrayValue::Enum(v) => v.len(),
            ArrayValue::Object(v) => v.len(),
            ArrayValue::SoftObject(v) => v.len(),
            ArrayValue::Struct { elements, .. } => elements.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapEntry {
    pub key: PropertyValue,
    pub value: PropertyValue,
}

/// Decoded property payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PropertyValue {
    Bool(bool),
    Byte(ByteValue),
    Int8(i8),
    Int16(i16),
    Int(i32),
    Int64(i64),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Str(String),
    Name(Name),
    Text(Text),
    Enum { enum_type: Name, value: Name },
    Object(ObjectRef),
    SoftObject(SoftObjectPath),
    Struct {
        struct_type: StructType,
        value: StructValue,
    },
    Array(ArrayValue),
    Set(ArrayValue),
    Map {
        key_type: PropertyType,
        value_type: PropertyType,
        entries: Vec<MapEntry>,
    },
    /// Value bytes kept verbatim after a recovered decode failure.
    Raw(Vec<u8>),
}

impl PropertyValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Bool(v) => Some(i64::from(*v)),
            PropertyValue::Byte(ByteValue::Raw(v)) => Some(i64::from(*v)),
            PropertyValue::Int8(v) => Some(i64::from(*v)),
            PropertyValue::Int16(v) => Some(i64::from(*v)),
            PropertyValue::Int(v) => Some(i64::from(*v)),
            PropertyValue::Int64(v) => Some(*v),
            PropertyValue::UInt16(v) => Some(i64::from(*v)),
            PropertyValue::UInt32(v) => Some(i64::from(*v)),
            PropertyValue::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(v) => Some(f64::from(*v)),
            PropertyValue::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(v) => Some(v),
            PropertyValue::Name(v) => Some(v.value()),
            PropertyValue::Text(v) => v.as_str(),
            PropertyValue::Enum { value, .. } => Some(value.value()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            PropertyValue::Object(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            PropertyValue::Array(v) | PropertyValue::Set(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            PropertyValue::Struct { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// `(name, index, value)` record of a self-describing property.
///
/// Duplicate names with distinct indices are common (stat arrays), so objects
/// keep properties as an ordered list rather than a map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub name: Name,
    pub index: u32,
    pub value: PropertyValue,
}

#[derive(Debug)]
enum PropertyTagData {
    Bool(bool),
    Byte { enum_type: Name },
    Enum { enum_type: Name },
    Array { inner: PropertyType },
    Set { inner: PropertyType },
    Map {
        key: PropertyType,
        value: PropertyType,
    },
    Struct { struct_type: StructType },
    Plain(PropertyType),
    Unknown(String),
}

#[derive(Debug)]
struct PropertyTag {
    name: Name,
    index: u32,
    size: u64,
    data: PropertyTagData,
}

fn read_inner_type(ar: &mut Archive) -> Result<std::result::Result<PropertyType, String>> {
    let name = ar.read_name()?;
    Ok(PropertyType::from_name(name.value()).map_err(|_| name.value().to_owned()))
}

/// Read a property tag: name, type, size, index, and the tag-specific prelude.
/// Returns `None` at the `"None"` list terminator.
fn read_tag(ar: &mut Archive) -> Result<Option<PropertyTag>> {
    let name = ar.read_name()?;
    if name.is_none() {
        return Ok(None);
    }
    let type_name = ar.read_name()?;
    let size = ar.read_size()?;
    let index = ar.reader.read_u32()?;

    let data = match PropertyType::from_name(type_name.value()) {
        Err(_) => PropertyTagData::Unknown(type_name.value().to_owned()),
        Ok(tag) => match tag {
            PropertyType::BoolProperty => {
                let value = if ar.is_asa() {
                    ar.reader.read_bool16()?
                } else {
                    ar.reader.read_bool8()?
                };
                PropertyTagData::Bool(value)
            }
            PropertyType::ByteProperty => PropertyTagData::Byte {
                enum_type: ar.read_name()?,
            },
            PropertyType::EnumProperty => PropertyTagData::Enum {
                enum_type: ar.read_name()?,
            },
            PropertyType::ArrayProperty => match read_inner_type(ar)? {
                Ok(inner) => PropertyTagData::Array { inner },
                Err(unknown) => PropertyTagData::Unknown(format!("array of {unknown}")),
            },
            PropertyType::SetProperty => match read_inner_type(ar)? {
                Ok(inner) => PropertyTagData::Set { inner },
                Err(unknown) => PropertyTagData::Unknown(format!("set of {unknown}")),
            },
            PropertyType::MapProperty => {
                let key = read_inner_type(ar)?;
                let value = read_inner_type(ar)?;
                match (key, value) {
                    (Ok(key), Ok(value)) => PropertyTagData::Map { key, value },
                    (key, value) => PropertyTagData::Unknown(format!(
                        "map of {:?} to {:?}",
                        key, value
                    )),
                }
            }
            PropertyType::StructProperty => PropertyTagData::Struct {
                struct_type: StructType::from(&ar.read_name()?),
            },
            plain => PropertyTagData::Plain(plain),
        },
    };

    Ok(Some(PropertyTag {
        name,
        index,
        size,
        data,
    }))
}

fn read_soft_object(ar: &mut Archive, trailing_pad: bool) -> Result<SoftObjectPath> {
    let path = ar.reader.read_fstring()?;
    let sub_path = ar.reader.read_fstring()?;
    if trailing_pad {
        let _pad = ar.reader.read_u32()?;
    }
    Ok(SoftObjectPath { path, sub_path })
}

fn read_vector_of(ar: &mut Archive, inner: PropertyType) -> Result<ArrayValue> {
    let count = ar.reader.read_u32()? as usize;
    Ok(match inner {
        PropertyType::Int8Property => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(ar.reader.read_i8()?);
            }
            ArrayValue::Int8(v)
        }
        PropertyType::Int16Property => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(ar.reader.read_i16()?);
            }
            ArrayValue::Int16(v)
        }
        PropertyType::IntProperty => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(ar.reader.read_i32()?);
            }
            ArrayValue::Int(v)
        }
        PropertyType::Int64Property => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(ar.reader.read_i64()?);
            }
            ArrayValue::Int64(v)
        }
        PropertyType::UInt16Property => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(ar.reader.read_u16()?);
            }
            ArrayValue::UInt16(v)
        }
        PropertyType::UInt32Property => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(ar.reader.read_u32()?);
            }
            ArrayValue::UInt32(v)
        }
        PropertyType::UInt64Property => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(ar.reader.read_u64()?);
            }
            ArrayValue::UInt64(v)
        }
        PropertyType::FloatProperty => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(ar.reader.read_f32()?);
            }
            ArrayValue::Float(v)
        }
        PropertyType::DoubleProperty => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(ar.reader.read_f64()?);
            }
            ArrayValue::Double(v)
        }
        PropertyType::BoolProperty => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(ar.reader.read_bool8()?);
            }
            ArrayValue::Bool(v)
        }
        PropertyType::ByteProperty => ArrayValue::Byte(ar.reader.read_bytes(count)?),
        PropertyType::StrProperty => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(ar.reader.read_fstring()?);
            }
            ArrayValue::Str(v)
        }
        PropertyType::NameProperty => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(ar.read_name()?);
            }
            ArrayValue::Name(v)
        }
        PropertyType::EnumProperty => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(ar.read_name()?);
            }
            ArrayValue::Enum(v)
        }
        PropertyType::ObjectProperty => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(ObjectRef::read(ar, false)?);
            }
            ArrayValue::Object(v)
        }
        PropertyType::SoftObjectProperty => {
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(read_soft_object(ar, true)?);
            }
            ArrayValue::SoftObject(v)
        }
        PropertyType::StructProperty => {
            // Inner header: a second property tag describing the element
            // struct, shared by all elements.
            let _inner_name = ar.read_name()?;
            let _inner_type = ar.read_name()?;
            let _inner_size = ar.read_size()?;
            let _inner_index = ar.reader.read_u32()?;
            let struct_type = StructType::from(&ar.read_name()?);
            let mut elements = Vec::with_capacity(count);
            for _ in 0..count {
                elements.push(StructValue::read(ar, &struct_type)?);
            }
            ArrayValue::Struct {
                struct_type,
                elements,
            }
        }
        other => {
            return Err(Error::Unexpected(format!(
                "container element type {}",
                other.name()
            )))
        }
    })
}

/// Read a single map key or value. Composite values decode as anonymous
/// property lists; scalars use their plain decoders.
fn read_map_value(ar: &mut Archive, tag: PropertyType) -> Result<PropertyValue> {
    Ok(match tag {
        PropertyType::StructProperty => PropertyValue::Struct {
            struct_type: StructType::Other("MapValue".to_owned()),
            value: StructValue::Properties(read_property_list(ar)?),
        },
        PropertyType::BoolProperty => PropertyValue::Bool(ar.reader.read_bool8()?),
        PropertyType::ByteProperty => PropertyValue::Byte(ByteValue::Raw(ar.reader.read_u8()?)),
        PropertyType::Int8Property => PropertyValue::Int8(ar.reader.read_i8()?),
        PropertyType::Int16Property => PropertyValue::Int16(ar.reader.read_i16()?),
        PropertyType::IntProperty => PropertyValue::Int(ar.reader.read_i32()?),
        PropertyType::Int64Property => PropertyValue::Int64(ar.reader.read_i64()?),
        PropertyType::UInt16Property => PropertyValue::UInt16(ar.reader.read_u16()?),
        PropertyType::UInt32Property => PropertyValue::UInt32(ar.reader.read_u32()?),
        PropertyType::UInt64Property => PropertyValue::UInt64(ar.reader.read_u64()?),
        PropertyType::FloatProperty => PropertyValue::Float(ar.reader.read_f32()?),
        PropertyType::DoubleProperty => PropertyValue::Double(ar.reader.read_f64()?),
        PropertyType::StrProperty => PropertyValue::Str(ar.reader.read_fstring()?),
        PropertyType::NameProperty => PropertyValue::Name(ar.read_name()?),
        PropertyType::ObjectProperty => PropertyValue::Object(ObjectRef::read(ar, false)?),
        other => {
            return Err(Error::Unexpected(format!(
                "map entry type {}",
                other.name()
            )))
        }
    })
}

fn read_value(ar: &mut Archive, tag: &PropertyTag) -> Result<PropertyValue> {
    Ok(match &tag.data {
        PropertyTagData::Unknown(name) => {
            return Err(Error::UnknownProperty(name.clone()))
        }
        PropertyTagData::Bool(value) => PropertyValue::Bool(*value),
        PropertyTagData::Byte { enum_type } => {
            if enum_type.is_none() {
                PropertyValue::Byte(ByteValue::Raw(ar.reader.read_u8()?))
            } else {
                PropertyValue::Byte(ByteValue::Enum {
                    enum_type: enum_type.clone(),
                    value: ar.read_name()?,
                })
            }
        }
        PropertyTagData::Enum { enum_type } => PropertyValue::Enum {
            enum_type: enum_type.clone(),
            value: ar.read_name()?,
        },
        PropertyTagData::Array { inner } => PropertyValue::Array(read_vector_of(ar, *inner)?),
        PropertyTagData::Set { inner } => PropertyValue::Set(read_vector_of(ar, *inner)?),
        PropertyTagData::Map { key, value } => {
            let _num_removed = ar.reader.read_u32()?;
            let count = ar.reader.read_u32()? as usize;
            let mut entries = Vec::with_capacity(count);
            for _ in 0..count {
                entries.push(MapEntry {
                    key: read_map_value(ar, *key)?,
                    value: read_map_value(ar, *value)?,
                });
            }
            PropertyValue::Map {
                key_type: *key,
                value_type: *value,
                entries,
            }
        }
        PropertyTagData::Struct { struct_type } => PropertyValue::Struct {
            struct_type: struct_type.clone(),
            value: StructValue::read(ar, struct_type)?,
        },
        PropertyTagData::Plain(plain) => match plain {
            PropertyType::Int8Property => PropertyValue::Int8(ar.reader.read_i8()?),
            PropertyType::Int16Property => PropertyValue::Int16(ar.reader.read_i16()?),
            PropertyType::IntProperty => PropertyValue::Int(ar.reader.read_i32()?),
            PropertyType::Int64Property => PropertyValue::Int64(ar.reader.read_i64()?),
            PropertyType::UInt16Property => PropertyValue::UInt16(ar.reader.read_u16()?),
            PropertyType::UInt32Property => PropertyValue::UInt32(ar.reader.read_u32()?),
            PropertyType::UInt64Property => PropertyValue::UInt64(ar.reader.read_u64()?),
            PropertyType::FloatProperty => PropertyValue::Float(ar.reader.read_f32()?),
            PropertyType::DoubleProperty => PropertyValue::Double(ar.reader.read_f64()?),
            PropertyType::StrProperty => PropertyValue::Str(ar.reader.read_fstring()?),
            PropertyType::NameProperty => PropertyValue::Name(ar.read_name()?),
            PropertyType::TextProperty => PropertyValue::Text(Text::read(ar)?),
            PropertyType::ObjectProperty => {
                PropertyValue::Object(ObjectRef::read(ar, tag.size == 4)?)
            }
            PropertyType::SoftObjectProperty => {
                PropertyValue::SoftObject(read_soft_object(ar, ar.is_asa())?)
            }
            other => {
                return Err(Error::Unexpected(format!(
                    "scalar read for composite tag {}",
                    other.name()
                )))
            }
        },
    })
}

/// Read one property, applying the size contract.
///
/// The declared size must equal the bytes the value decoder consumes. On a
/// mismatch, a decode error, or an unknown tag, the cursor jumps to the
/// declared end, the event lands in `parse_errors`, and the value bytes are
/// kept verbatim as [`PropertyValue::Raw`]. Decoding then continues with the
/// next property.
pub fn read_property(ar: &mut Archive) -> Result<Option<Property>> {
    let Some(tag) = read_tag(ar)? else {
        return Ok(None);
    };

    let value_start = ar.reader.tell();
    let declared_end = value_start + tag.size as usize;
    if declared_end > ar.reader.len() {
        return Err(Error::Corrupt(format!(
            "property {} declares {} value bytes at offset {} with only {} in the buffer",
            tag.name,
            tag.size,
            value_start,
            ar.reader.len() - value_start,
        )));
    }

    // A rolled-back value must not leave errors recorded by nested recovery
    // attempts behind; the whole failure counts as one event.
    let errors_before = ar.parse_errors.len();
    let value = match read_value(ar, &tag) {
        Ok(value) if ar.reader.tell() == declared_end => value,
        Ok(_) => {
            let consumed = ar.reader.tell() - value_start;
            ar.parse_errors.truncate(errors_before);
            ar.record_error(format!(
                "property {} at offset {}: consumed {} bytes of a declared {}",
                tag.name, value_start, consumed, tag.size,
            ));
            ar.reader.seek(value_start)?;
            PropertyValue::Raw(ar.reader.read_bytes(tag.size as usize)?)
        }
        Err(err) => {
            ar.parse_errors.truncate(errors_before);
            ar.record_error(format!(
                "property {} at offset {}: {err}",
                tag.name, value_start,
            ));
            ar.reader.seek(value_start)?;
            PropertyValue::Raw(ar.reader.read_bytes(tag.size as usize)?)
        }
    };

    Ok(Some(Property {
        name: tag.name,
        index: tag.index,
        value,
    }))
}

/// Read properties until the `"None"` terminator.
pub fn read_property_list(ar: &mut Archive) -> Result<Vec<Property>> {
    let mut properties = Vec::new();
    while let Some(property) = read_property(ar)? {
        properties.push(property);
    }
    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SaveFormat;

    fn fstring(s: &str) -> Vec<u8> {
        let mut out = ((s.len() + 1) as i32).to_le_bytes().to_vec();
        out.extend_from_slice(s.as_bytes());
        out.push(0);
        out
    }

    fn none_terminator() -> Vec<u8> {
        fstring("None")
    }

    fn int_property(name: &str, value: i32, index: u32) -> Vec<u8> {
        let mut out = fstring(name);
        out.extend(fstring("IntProperty"));
        out.extend_from_slice(&4u32.to_le_bytes());
        out.extend_from_slice(&index.to_le_bytes());
        out.extend_from_slice(&value.to_le_bytes());
        out
    }

    fn str_property(name: &str, value: &str) -> Vec<u8> {
        let mut out = fstring(name);
        out.extend(fstring("StrProperty"));
        out.extend_from_slice(&((value.len() + 5) as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend(fstring(value));
        out
    }

    #[test]
    fn scalar_property_round_trip() {
        let mut data = int_property("BaseCharacterLevel", 150, 0);
        data.extend(none_terminator());
        let mut ar = Archive::new(&data, SaveFormat::Ase);
        let props = read_property_list(&mut ar).unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].name.value(), "BaseCharacterLevel");
        assert_eq!(props[0].value.as_i64(), Some(150));
        assert!(ar.parse_errors.is_empty());
    }

    #[test]
    fn bool_value_lives_in_prelude() {
        let mut data = fstring("bIsFemale");
        data.extend(fstring("BoolProperty"));
        data.extend_from_slice(&0u32.to_le_bytes()); // size 0
        data.extend_from_slice(&0u32.to_le_bytes());
        data.push(1); // value byte in the prelude
        data.extend(none_terminator());
        let mut ar = Archive::new(&data, SaveFormat::Ase);
        let props = read_property_list(&mut ar).unwrap();
        assert_eq!(props[0].value.as_bool(), Some(true));
    }

    #[test]
    fn asa_bool_placeholder_is_two_bytes() {
        let mut data = fstring("bIsBaby");
        data.extend(fstring("BoolProperty"));
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend(none_terminator());
        let mut ar = Archive::new(&data, SaveFormat::Asa);
        let props = read_property_list(&mut ar).unwrap();
        assert_eq!(props[0].value.as_bool(), Some(true));
    }

    #[test]
    fn byte_property_raw_and_enum() {
        let mut data = fstring("ColorSetIndices");
        data.extend(fstring("ByteProperty"));
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&2u32.to_le_bytes()); // stat index 2
        data.extend(fstring("None")); // raw byte marker
        data.push(42);

        data.extend(fstring("BabyGenderOverride"));
        data.extend(fstring("ByteProperty"));
        let value = fstring("EGender::Female");
        data.extend_from_slice(&(value.len() as u32).to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend(fstring("EGender"));
        data.extend(value);
        data.extend(none_terminator());

        let mut ar = Archive::new(&data, SaveFormat::Ase);
        let props = read_property_list(&mut ar).unwrap();
        assert_eq!(props[0].index, 2);
        assert_eq!(props[0].value.as_i64(), Some(42));
        match &props[1].value {
            PropertyValue::Byte(ByteValue::Enum { enum_type, value }) => {
                assert_eq!(enum_type.value(), "EGender");
                assert_eq!(value.value(), "EGender::Female");
            }
            other => panic!("expected enum byte, got {other:?}"),
        }
        assert!(ar.parse_errors.is_empty());
    }

    #[test]
    fn int_array() {
        let mut data = fstring("MembersPlayerDataID");
        data.extend(fstring("ArrayProperty"));
        data.extend_from_slice(&16u32.to_le_bytes()); // count + 3 ints
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend(fstring("IntProperty"));
        data.extend_from_slice(&3u32.to_le_bytes());
        for v in [7i32, 8, 9] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend(none_terminator());
        let mut ar = Archive::new(&data, SaveFormat::Ase);
        let props = read_property_list(&mut ar).unwrap();
        match props[0].value.as_array() {
            Some(ArrayValue::Int(v)) => assert_eq!(v, &[7, 8, 9]),
            other => panic!("expected int array, got {other:?}"),
        }
        assert!(ar.parse_errors.is_empty());
    }

    #[test]
    fn object_ref_minus_one_is_null() {
        let mut data = fstring("MyInventoryComponent");
        data.extend(fstring("ObjectProperty"));
        data.extend_from_slice(&8u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0i32.to_le_bytes());
        data.extend_from_slice(&(-1i32).to_le_bytes());
        data.extend(none_terminator());
        let mut ar = Archive::new(&data, SaveFormat::Ase);
        let props = read_property_list(&mut ar).unwrap();
        assert_eq!(props[0].value.as_object(), Some(&ObjectRef::Null));
        assert!(ar.parse_errors.is_empty());
    }

    #[test]
    fn asa_object_ref_nil_guid_is_null() {
        let mut data = fstring("TargetRef");
        data.extend(fstring("ObjectProperty"));
        data.extend_from_slice(&16u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 16]);
        data.extend(none_terminator());
        let mut ar = Archive::new(&data, SaveFormat::Asa);
        let props = read_property_list(&mut ar).unwrap();
        assert_eq!(props[0].value.as_object(), Some(&ObjectRef::Null));
    }

    #[test]
    fn size_mismatch_recovers_and_counts_once() {
        // A string property whose declared size is 4 bytes short: the decoder
        // consumes more than declared, the policy rewinds and stores raw.
        let mut data = fstring("BrokenOne");
        data.extend(fstring("StrProperty"));
        let value = fstring("Oversized");
        data.extend_from_slice(&((value.len() - 4) as u32).to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend(&value[..value.len() - 4]);
        data.extend(int_property("NextOne", 5, 0));
        data.extend(none_terminator());

        let mut ar = Archive::new(&data, SaveFormat::Ase);
        let props = read_property_list(&mut ar).unwrap();
        assert_eq!(ar.parse_errors.len(), 1);
        assert!(matches!(props[0].value, PropertyValue::Raw(_)));
        assert_eq!(props[1].name.value(), "NextOne");
        assert_eq!(props[1].value.as_i64(), Some(5));
    }

    #[test]
    fn unknown_property_type_is_recovered() {
        let mut data = fstring("Exotic");
        data.extend(fstring("WeakObjectProperty"));
        data.extend_from_slice(&4u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&[0xAA; 4]);
        data.extend(int_property("Sane", 1, 0));
        data.extend(none_terminator());

        let mut ar = Archive::new(&data, SaveFormat::Ase);
        let props = read_property_list(&mut ar).unwrap();
        assert_eq!(ar.parse_errors.len(), 1);
        assert_eq!(props[0].value, PropertyValue::Raw(vec![0xAA; 4]));
        assert_eq!(props[1].value.as_i64(), Some(1));
    }

    #[test]
    fn unknown_struct_class_counts_one_error() {
        // Body bytes that are not a valid property list.
        let body = [0xFFu8; 12];
        let mut data = fstring("Mystery");
        data.extend(fstring("StructProperty"));
        data.extend_from_slice(&(body.len() as u32).to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend(fstring("ModdedStruct"));
        data.extend_from_slice(&body);
        data.extend(int_property("After", 2, 0));
        data.extend(none_terminator());

        let mut ar = Archive::new(&data, SaveFormat::Ase);
        let props = read_property_list(&mut ar).unwrap();
        assert_eq!(ar.parse_errors.len(), 1);
        assert!(ar.parse_errors[0].contains("ModdedStruct"));
        assert!(matches!(props[0].value, PropertyValue::Raw(_)));
        assert_eq!(props[1].value.as_i64(), Some(2));
    }

    #[test]
    fn nested_struct_property_list() {
        let mut inner = str_property("TribeName", "The Swamp People");
        inner.extend(none_terminator());

        let mut data = fstring("TribeData");
        data.extend(fstring("StructProperty"));
        data.extend_from_slice(&(inner.len() as u32).to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend(fstring("TribeData"));
        data.extend(&inner);
        data.extend(none_terminator());

        let mut ar = Archive::new(&data, SaveFormat::Ase);
        let props = read_property_list(&mut ar).unwrap();
        let nested = props[0].value.as_struct().unwrap().properties().unwrap();
        assert_eq!(nested[0].value.as_str(), Some("The Swamp People"));
        assert!(ar.parse_errors.is_empty());
    }

    #[test]
    fn str_property_test_helper_sizes_are_exact() {
        let mut data = str_property("PlayerName", "Alice");
        data.extend(none_terminator());
        let mut ar = Archive::new(&data, SaveFormat::Ase);
        let props = read_property_list(&mut ar).unwrap();
        assert_eq!(props[0].value.as_str(), Some("Alice"));
        assert!(ar.parse_errors.is_empty());
    }
}
