use serde::Serialize;

/// On-disk generation of a save file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SaveFormat {
    /// Legacy pure-binary format (floats, index object references).
    Ase,
    /// SQLite-backed format (doubles, GUID object references).
    Asa,
}

impl SaveFormat {
    pub fn is_asa(self) -> bool {
        matches!(self, SaveFormat::Asa)
    }
}

/// What kind of data a save file carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileKind {
    Profile,
    Tribe,
    CloudInventory,
    WorldSave,
    Unknown,
}

/// Outcome of sniffing a file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub format: SaveFormat,
    pub kind: FileKind,
    /// Header version, or -1 when the container has none (SQLite).
    pub version: i32,
}

const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// ASE world-save versions seen in circulation. 7 and 8 are referenced
/// obliquely in tooling and are accepted by the world decoder, but the sniffer
/// only claims ASE for versions it has actually observed.
pub const KNOWN_ASE_VERSIONS: &[i32] = &[5, 6, 9, 10, 11];

fn header_contains(data: &[u8], marker: &[u8]) -> bool {
    let window = &data[..data.len().min(4096)];
    window.windows(marker.len()).any(|w| w == marker)
}

fn sniff_kind(data: &[u8]) -> FileKind {
    if header_contains(data, b"PrimalPlayerData") {
        FileKind::Profile
    } else if header_contains(data, b"PrimalTribeData") {
        FileKind::Tribe
    } else if header_contains(data, b"ArkCloudInventoryData") {
        FileKind::CloudInventory
    } else {
        FileKind::Unknown
    }
}

/// Sniff format, kind and version from the first bytes of a file.
///
/// The caller decides whether an [`FileKind::Unknown`] result is fatal or
/// grounds for a best-effort parse.
pub fn detect(data: &[u8]) -> Detection {
    if data.len() >= 16 && &data[..16] == SQLITE_MAGIC {
        return Detection {
            format: SaveFormat::Asa,
            kind: FileKind::WorldSave,
            version: -1,
        };
    }
    if data.len() < 4 {
        return Detection {
            format: SaveFormat::Ase,
            kind: FileKind::Unknown,
            version: -1,
        };
    }

    let version = i32::from_le_bytes([data[0], data[1], data[2], data[3]]);

    if KNOWN_ASE_VERSIONS.contains(&version) && sniff_kind(data) == FileKind::Unknown {
        return Detection {
            format: SaveFormat::Ase,
            kind: FileKind::WorldSave,
            version,
        };
    }

    let kind = sniff_kind(data);

    // Profiles, tribes and cloud data: version 7+ is always ASA; versions 1-6
    // are ASA when a GUID is present at bytes 8..24 (ASE leaves zeros there).
    let format = if version >= 7 {
        SaveFormat::Asa
    } else if (1..=6).contains(&version)
        && data.len() >= 24
        && data[8..24].iter().any(|&b| b != 0)
    {
        SaveFormat::Asa
    } else {
        SaveFormat::Ase
    };

    Detection {
        format,
        kind,
        version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fstring(s: &str) -> Vec<u8> {
        let mut out = ((s.len() + 1) as i32).to_le_bytes().to_vec();
        out.extend_from_slice(s.as_bytes());
        out.push(0);
        out
    }

    #[test]
    fn sqlite_magic_is_asa_world() {
        let mut data = SQLITE_MAGIC.to_vec();
        data.extend_from_slice(&[0; 100]);
        let d = detect(&data);
        assert_eq!(d.format, SaveFormat::Asa);
        assert_eq!(d.kind, FileKind::WorldSave);
    }

    #[test]
    fn known_versions_are_ase_worlds() {
        for &v in KNOWN_ASE_VERSIONS {
            let mut data = v.to_le_bytes().to_vec();
            data.extend_from_slice(&[0; 64]);
            let d = detect(&data);
            assert_eq!(d.format, SaveFormat::Ase, "version {v}");
            assert_eq!(d.kind, FileKind::WorldSave);
            assert_eq!(d.version, v);
        }
    }

    #[test]
    fn profile_marker_sets_kind() {
        let mut data = 1i32.to_le_bytes().to_vec();
        data.extend_from_slice(&1i32.to_le_bytes());
        data.extend_from_slice(&[0; 16]);
        data.extend(fstring("PrimalPlayerData"));
        let d = detect(&data);
        assert_eq!(d.kind, FileKind::Profile);
        assert_eq!(d.format, SaveFormat::Ase);
        assert_eq!(d.version, 1);
    }

    #[test]
    fn version_seven_profile_is_asa() {
        let mut data = 7i32.to_le_bytes().to_vec();
        data.extend_from_slice(&[0; 20]);
        data.extend(fstring("ArkCloudInventoryData"));
        let d = detect(&data);
        assert_eq!(d.format, SaveFormat::Asa);
        assert_eq!(d.kind, FileKind::CloudInventory);
    }

    #[test]
    fn low_version_with_guid_is_asa() {
        let mut data = 6i32.to_le_bytes().to_vec();
        data.extend_from_slice(&1i32.to_le_bytes());
        data.extend_from_slice(&[0xAB; 16]);
        data.extend(fstring("PrimalTribeData"));
        let d = detect(&data);
        assert_eq!(d.format, SaveFormat::Asa);
        assert_eq!(d.kind, FileKind::Tribe);
    }
}
