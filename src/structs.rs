use serde::Serialize;

use crate::{
    archive::Archive,
    property::{read_property_list, Property},
    Error, Guid, Name, Result,
};

/// Struct classes with a known binary schema.
///
/// Anything else falls through to [`StructType::Other`] and is decoded as a
/// property list terminated by `"None"`. That covers the game-specific
/// structs (`DinoAncestorsEntry`, `PrimalPlayerDataStruct`, `ArkInventoryData`,
/// `ArkTribeGovernment`, `TribeAlliance`, `CryopodPayload`, ...), whose bodies
/// are property lists on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StructType {
    Vector,
    Vector2D,
    Rotator,
    Quat,
    Transform,
    LinearColor,
    Color,
    Guid,
    DateTime,
    Timespan,
    IntPoint,
    IntVector,
    UniqueNetIdRepl,
    CustomItemDataRef,
    Other(String),
}

impl From<&Name> for StructType {
    fn from(name: &Name) -> Self {
        match name.value() {
            "Vector" => StructType::Vector,
            "Vector2D" => StructType::Vector2D,
            "Rotator" => StructType::Rotator,
            "Quat" => StructType::Quat,
            "Transform" => StructType::Transform,
            "LinearColor" => StructType::LinearColor,
            "Color" => StructType::Color,
            "Guid" => StructType::Guid,
            "DateTime" => StructType::DateTime,
            "Timespan" => StructType::Timespan,
            "IntPoint" => StructType::IntPoint,
            "IntVector" => StructType::IntVector,
            "UniqueNetIdRepl" => StructType::UniqueNetIdRepl,
            "CustomItemDataRef" => StructType::CustomItemDataRef,
            other => StructType::Other(other.to_owned()),
        }
    }
}

impl StructType {
    pub fn as_str(&self) -> &str {
        match self {
            StructType::Vector => "Vector",
            StructType::Vector2D => "Vector2D",
            StructType::Rotator => "Rotator",
            StructType::Quat => "Quat",
            StructType::Transform => "Transform",
            StructType::LinearColor => "LinearColor",
            StructType::Color => "Color",
            StructType::Guid => "Guid",
            StructType::DateTime => "DateTime",
            StructType::Timespan => "Timespan",
            StructType::IntPoint => "IntPoint",
            StructType::IntVector => "IntVector",
            StructType::UniqueNetIdRepl => "UniqueNetIdRepl",
            StructType::CustomItemDataRef => "CustomItemDataRef",
            StructType::Other(name) => name,
        }
    }
}

/// 3-component vector. ASE stores f32, ASA f64.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector {
    fn read(ar: &mut Archive) -> Result<Self> {
        if ar.is_asa() {
            Ok(Self {
                x: ar.reader.read_f64()?,
                y: ar.reader.read_f64()?,
                z: ar.reader.read_f64()?,
            })
        } else {
            Ok(Self {
                x: ar.reader.read_f32()? as f64,
                y: ar.reader.read_f32()? as f64,
                z: ar.reader.read_f32()? as f64,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    fn read(ar: &mut Archive) -> Result<Self> {
        if ar.is_asa() {
            Ok(Self {
                x: ar.reader.read_f64()?,
                y: ar.reader.read_f64()?,
            })
        } else {
            Ok(Self {
                x: ar.reader.read_f32()? as f64,
                y: ar.reader.read_f32()? as f64,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rotator {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Rotator {
    fn read(ar: &mut Archive) -> Result<Self> {
        if ar.is_asa() {
            Ok(Self {
                pitch: ar.reader.read_f64()?,
                yaw: ar.reader.read_f64()?,
                roll: ar.reader.read_f64()?,
            })
        } else {
            Ok(Self {
                pitch: ar.reader.read_f32()? as f64,
                yaw: ar.reader.read_f32()? as f64,
                roll: ar.reader.read_f32()? as f64,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quat {
    fn read(ar: &mut Archive) -> Result<Self> {
        if ar.is_asa() {
            Ok(Self {
                x: ar.reader.read_f64()?,
                y: ar.reader.read_f64()?,
                z: ar.reader.read_f64()?,
                w: ar.reader.read_f64()?,
            })
        } else {
            Ok(Self {
                x: ar.reader.read_f32()? as f64,
                y: ar.reader.read_f32()? as f64,
                z: ar.reader.read_f32()? as f64,
                w: ar.reader.read_f32()? as f64,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub rotation: Quat,
    pub translation: Vector,
    pub scale: Vector,
}

impl Transform {
    fn read(ar: &mut Archive) -> Result<Self> {
        Ok(Self {
            rotation: Quat::read(ar)?,
            translation: Vector::read(ar)?,
            scale: Vector::read(ar)?,
        })
    }
}

/// 8-bit RGBA color. Serialized byte order is BGRA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    fn read(ar: &mut Archive) -> Result<Self> {
        let b = ar.reader.read_u8()?;
        let g = ar.reader.read_u8()?;
        let r = ar.reader.read_u8()?;
        let a = ar.reader.read_u8()?;
        Ok(Self { r, g, b, a })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl LinearColor {
    fn read(ar: &mut Archive) -> Result<Self> {
        Ok(Self {
            r: ar.reader.read_f32()?,
            g: ar.reader.read_f32()?,
            b: ar.reader.read_f32()?,
            a: ar.reader.read_f32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntPoint {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntVector {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Platform identity of a player.
///
/// ASE stores an i32 discriminator and the id string; ASA stores a platform
/// tag plus raw id bytes, kept here as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueNetIdRepl {
    pub value_type: String,
    pub net_id: String,
}

impl UniqueNetIdRepl {
    fn read(ar: &mut Archive) -> Result<Self> {
        if ar.is_asa() {
            let _unknown = ar.reader.read_u8()?;
            let value_type = ar.reader.read_fstring()?;
            let len = ar.reader.read_u8()? as usize;
            let raw = ar.reader.read_bytes(len)?;
            let net_id = raw.iter().map(|b| format!("{b:02x}")).collect();
            Ok(Self { value_type, net_id })
        } else {
            let _unknown = ar.reader.read_i32()?;
            Ok(Self {
                value_type: String::new(),
                net_id: ar.reader.read_fstring()?,
            })
        }
    }
}

/// Reference into per-item custom data, four opaque words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CustomItemDataRef {
    pub values: [i32; 4],
}

/// Decoded struct payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StructValue {
    Vector(Vector),
    Vector2D(Vector2D),
    Rotator(Rotator),
    Quat(Quat),
    Transform(Transform),
    LinearColor(LinearColor),
    Color(Color),
    Guid(Guid),
    DateTime(u64),
    Timespan(i64),
    IntPoint(IntPoint),
    IntVector(IntVector),
    UniqueNetIdRepl(UniqueNetIdRepl),
    CustomItemDataRef(CustomItemDataRef),
    /// A struct whose body is itself a property list.
    Properties(Vec<Property>),
}

impl StructValue {
    pub fn read(ar: &mut Archive, struct_type: &StructType) -> Result<Self> {
        Ok(match struct_type {
            StructType::Vector => StructValue::Vector(Vector::read(ar)?),
            StructType::Vector2D => StructValue::Vector2D(Vector2D::read(ar)?),
            StructType::Rotator => StructValue::Rotator(Rotator::read(ar)?),
            StructType::Quat => StructValue::Quat(Quat::read(ar)?),
            StructType::Transform => StructValue::Transform(Transform::read(ar)?),
            StructType::LinearColor => StructValue::LinearColor(LinearColor::read(ar)?),
            StructType::Color => StructValue::Color(Color::read(ar)?),
            StructType::Guid => StructValue::Guid(ar.reader.read_guid()?),
            StructType::DateTime => StructValue::DateTime(ar.reader.read_u64()?),
            StructType::Timespan => StructValue::Timespan(ar.reader.read_i64()?),
            StructType::IntPoint => StructValue::IntPoint(IntPoint {
                x: ar.reader.read_i32()?,
                y: ar.reader.read_i32()?,
            }),
            StructType::IntVector => StructValue::IntVector(IntVector {
                x: ar.reader.read_i32()?,
                y: ar.reader.read_i32()?,
                z: ar.reader.read_i32()?,
            }),
            StructType::UniqueNetIdRepl => {
                StructValue::UniqueNetIdRepl(UniqueNetIdRepl::read(ar)?)
            }
            StructType::CustomItemDataRef => {
                let mut values = [0i32; 4];
                for v in &mut values {
                    *v = ar.reader.read_i32()?;
                }
                StructValue::CustomItemDataRef(CustomItemDataRef { values })
            }
            StructType::Other(name) => {
                // A struct class outside the closed table. Its body is a
                // nested property list; a body that does not decode surfaces
                // the class name so the enclosing property decoder can record
                // the failure and skip to the declared end.
                let props = read_property_list(ar)
                    .map_err(|_| Error::UnknownStruct(name.clone()))?;
                StructValue::Properties(props)
            }
        })
    }

    /// Borrow the nested property list, if this is a property-list struct.
    pub fn properties(&self) -> Option<&[Property]> {
        match self {
            StructValue::Properties(props) => Some(props),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SaveFormat;

    #[test]
    fn vector_width_follows_format() {
        let mut data = Vec::new();
        for v in [1.0f32, 2.0, 3.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let mut ar = Archive::new(&data, SaveFormat::Ase);
        let v = Vector::read(&mut ar).unwrap();
        assert_eq!((v.x, v.y, v.z), (1.0, 2.0, 3.0));
        assert_eq!(ar.reader.remaining(), 0);

        let mut data = Vec::new();
        for v in [4.0f64, 5.0, 6.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let mut ar = Archive::new(&data, SaveFormat::Asa);
        let v = Vector::read(&mut ar).unwrap();
        assert_eq!((v.x, v.y, v.z), (4.0, 5.0, 6.0));
        assert_eq!(ar.reader.remaining(), 0);
    }

    #[test]
    fn color_is_stored_bgra() {
        let data = [10u8, 20, 30, 40];
        let mut ar = Archive::new(&data, SaveFormat::Ase);
        let c = Color::read(&mut ar).unwrap();
        assert_eq!((c.r, c.g, c.b, c.a), (30, 20, 10, 40));
    }

    #[test]
    fn net_id_ase_layout() {
        let mut data = 8i32.to_le_bytes().to_vec();
        let id = "12345678901234567";
        data.extend_from_slice(&((id.len() + 1) as i32).to_le_bytes());
        data.extend_from_slice(id.as_bytes());
        data.push(0);
        let mut ar = Archive::new(&data, SaveFormat::Ase);
        let n = UniqueNetIdRepl::read(&mut ar).unwrap();
        assert_eq!(n.net_id, id);
        assert!(n.value_type.is_empty());
    }

    #[test]
    fn net_id_asa_layout_is_hex() {
        let mut data = vec![1u8];
        let platform = "RedpointEOS";
        data.extend_from_slice(&((platform.len() + 1) as i32).to_le_bytes());
        data.extend_from_slice(platform.as_bytes());
        data.push(0);
        data.push(2); // id byte length
        data.extend_from_slice(&[0xAB, 0xCD]);
        let mut ar = Archive::new(&data, SaveFormat::Asa);
        let n = UniqueNetIdRepl::read(&mut ar).unwrap();
        assert_eq!(n.value_type, "RedpointEOS");
        assert_eq!(n.net_id, "abcd");
    }

    #[test]
    fn struct_type_table_is_closed() {
        assert_eq!(StructType::from(&Name::from("Vector")), StructType::Vector);
        assert_eq!(
            StructType::from(&Name::from("TribeData")),
            StructType::Other("TribeData".into())
        );
    }
}
