use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 16-byte object identifier stored little-endian on disk.
///
/// ASE writes all-zero GUIDs in object headers; ASA uses GUIDs as the primary
/// object identity. The all-zero GUID doubles as the null object reference.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid {
    a: u32,
    b: u32,
    c: u32,
    d: u32,
}

impl Guid {
    pub fn new(a: u32, b: u32, c: u32, d: u32) -> Self {
        Self { a, b, c, d }
    }

    pub fn nil() -> Self {
        Self::default()
    }

    pub fn is_nil(&self) -> bool {
        self.a == 0 && self.b == 0 && self.c == 0 && self.d == 0
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let word = |i: usize| {
            u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]])
        };
        Self {
            a: word(0),
            b: word(4),
            c: word(8),
            d: word(12),
        }
    }

    pub fn to_bytes(self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[0..4].copy_from_slice(&self.a.to_le_bytes());
        out[4..8].copy_from_slice(&self.b.to_le_bytes());
        out[8..12].copy_from_slice(&self.c.to_le_bytes());
        out[12..16].copy_from_slice(&self.d.to_le_bytes());
        out
    }
}

impl std::fmt::Display for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let b = self.b.to_le_bytes();
        let c = self.c.to_le_bytes();
        write!(
            f,
            "{:08x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:08x}",
            self.a, b[3], b[2], b[1], b[0], c[3], c[2], c[1], c[0], self.d,
        )
    }
}

impl Serialize for Guid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let hex = s.replace('-', "");
        if hex.len() != 32 {
            return Err(serde::de::Error::custom("invalid GUID string length"));
        }
        let a = u32::from_str_radix(&hex[0..8], 16).map_err(serde::de::Error::custom)?;
        let b = u32::from_str_radix(&hex[8..16], 16).map_err(serde::de::Error::custom)?;
        let c = u32::from_str_radix(&hex[16..24], 16).map_err(serde::de::Error::custom)?;
        let d = u32::from_str_radix(&hex[24..32], 16).map_err(serde::de::Error::custom)?;
        Ok(Self { a, b, c, d })
    }
}
