use std::path::Path;

use indexmap::IndexMap;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use tracing::instrument;

use crate::{
    archive::Archive,
    container::ObjectContainer,
    detect::{detect, FileKind},
    names::{Name, NameTable},
    object::{GameObject, LocationData},
    property::read_property_list,
    reader::SaveReader,
    rle::decompress_blob,
    Error, Guid, Result, SaveFormat,
};

/// Knobs for a world-save load.
#[derive(Debug, Default, Clone)]
pub struct LoadOptions {
    /// Cap on decoded objects, to bound work on very large saves.
    pub max_objects: Option<usize>,
}

/// A fully decoded `.ark` world save, either generation.
#[derive(Debug)]
pub struct WorldSave {
    pub format: SaveFormat,
    pub version: i32,
    pub game_time: f64,
    /// Number of times the map was saved (ASE v9+; 0 otherwise).
    pub save_count: i32,
    pub data_files: Vec<String>,
    pub container: ObjectContainer,
    /// GUID → transform rows from the ASA location table; empty for ASE.
    pub actor_locations: IndexMap<Guid, LocationData>,
    pub parse_errors: Vec<String>,
}

impl WorldSave {
    /// Load a world save from disk, auto-detecting the generation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, &LoadOptions::default())
    }

    pub fn load_with(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let detection = detect(&data);
        if detection.format.is_asa() && detection.kind == FileKind::WorldSave {
            drop(data);
            Self::load_asa(path, options)
        } else {
            Self::load_ase(&data, options)
        }
    }

    pub fn parse_error_count(&self) -> usize {
        self.parse_errors.len()
    }

    // ----- ASE (pure binary) -------------------------------------------------

    /// Decode an ASE binary world save held in memory.
    #[instrument(skip_all, fields(len = data.len()))]
    pub fn load_ase(data: &[u8], options: &LoadOptions) -> Result<Self> {
        let mut header = Archive::new(data, SaveFormat::Ase);

        let version = header.reader.read_i32()?;
        if !(5..=11).contains(&version) {
            return Err(Error::Corrupt(format!(
                "unsupported world save version {version}"
            )));
        }
        let save_count = if version >= 9 {
            header.reader.read_i32()?
        } else {
            0
        };
        let game_time = f64::from(header.reader.read_f32()?);
        let name_table_offset = read_offset(&mut header.reader)?;
        let object_count = header.reader.read_i32()?;
        if object_count < 0 {
            return Err(Error::Corrupt(format!("negative object count {object_count}")));
        }
        let objects_offset = read_offset(&mut header.reader)?;
        let properties_offset = read_offset(&mut header.reader)?;

        let file_count = header.reader.read_i32()?.max(0) as usize;
        let mut data_files = Vec::with_capacity(file_count);
        for _ in 0..file_count {
            data_files.push(header.reader.read_fstring()?);
        }

        let table = if version > 5 && name_table_offset > 0 {
            NameTable::read_at(&mut header.reader, name_table_offset)?
        } else {
            NameTable::default()
        };

        let mut ar = Archive::new(data, SaveFormat::Ase);
        if !table.is_empty() {
            ar = ar.with_name_table(&table);
        }

        let count = match options.max_objects {
            Some(max) => (object_count as usize).min(max),
            None => object_count as usize,
        };

        ar.reader.seek(objects_offset)?;
        let mut objects = Vec::with_capacity(count);
        for id in 0..count {
            objects.push(GameObject::read_world_header(&mut ar, id)?);
        }

        let ends: Vec<Option<usize>> = (0..objects.len())
            .map(|i| {
                objects
                    .get(i + 1)
                    .map(|next| properties_offset + next.properties_offset)
            })
            .collect();
        for (object, end) in objects.iter_mut().zip(ends) {
            if let Err(err) = object.load_properties(&mut ar, properties_offset, end) {
                ar.record_error(format!(
                    "properties of object {} ({}): {err}",
                    object.id,
                    object.class_name.value(),
                ));
            }
        }

        let mut container = ObjectContainer::new(objects);
        container.build_relationships();
        let mut parse_errors = ar.parse_errors;
        parse_errors.extend(container.dangling_references());

        Ok(Self {
            format: SaveFormat::Ase,
            version,
            game_time,
            save_count,
            data_files,
            container,
            actor_locations: IndexMap::new(),
            parse_errors,
        })
    }

    // ----- ASA (SQLite container) -------------------------------------------

    /// Decode an ASA world save from its SQLite container.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load_asa(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let schema = AsaSchema::classify(&conn)?;

        let header = AsaHeader::read(&conn, &schema.header_table)?;
        let actor_locations = read_actor_locations(&conn, schema.transforms_table.as_deref())?;

        let mut parse_errors = Vec::new();
        let mut objects = Vec::new();
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM \"{}\"",
            schema.objects_table
        ))?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            if let Some(max) = options.max_objects {
                if objects.len() >= max {
                    break;
                }
            }
            let key: Vec<u8> = row.get(0)?;
            let blob: Vec<u8> = row.get(1)?;
            let guid = guid_from_blob(&key)?;
            let id = objects.len();
            match decode_asa_object(&blob, guid, id, &header.names, &mut parse_errors) {
                Ok(mut object) => {
                    if let Some(location) = actor_locations.get(&guid) {
                        object.location = Some(*location);
                    }
                    objects.push(object);
                }
                Err(err) => {
                    parse_errors.push(format!("object {guid}: {err}"));
                }
            }
        }
        drop(rows);
        drop(stmt);

        let mut container = ObjectContainer::new(objects);
        container.build_relationships();
        parse_errors.extend(container.dangling_references());

        Ok(Self {
            format: SaveFormat::Asa,
            version: header.version,
            game_time: header.game_time,
            save_count: 0,
            data_files: Vec::new(),
            container,
            actor_locations,
            parse_errors,
        })
    }
}

fn read_offset(reader: &mut SaveReader) -> Result<usize> {
    let low = reader.read_u32()?;
    let high = reader.read_u32()?;
    Ok(((u64::from(high) << 32) | u64::from(low)) as usize)
}

fn guid_from_blob(blob: &[u8]) -> Result<Guid> {
    let raw: [u8; 16] = blob
        .try_into()
        .map_err(|_| Error::Corrupt(format!("GUID key of {} bytes", blob.len())))?;
    Ok(Guid::from_bytes(raw))
}

/// Table roles discovered by column shape rather than name; table names vary
/// by game patch.
struct AsaSchema {
    header_table: String,
    transforms_table: Option<String>,
    objects_table: String,
}

impl AsaSchema {
    fn classify(conn: &Connection) -> Result<Self> {
        let mut header_table = None;
        let mut transforms_table = None;
        let mut objects_table = None;

        let mut stmt =
            conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
        let names: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<_, _>>()?;
        drop(stmt);

        for table in names {
            if table.starts_with("sqlite_") {
                continue;
            }
            let mut info = conn.prepare(&format!("PRAGMA table_info(\"{table}\")"))?;
            let columns: Vec<String> = info
                .query_map([], |row| row.get::<_, String>(2))?
                .collect::<std::result::Result<_, _>>()?;
            drop(info);
            if columns.len() != 2 {
                continue;
            }

            let key_type = columns[0].to_ascii_uppercase();
            if key_type.contains("TEXT") || key_type.contains("CHAR") {
                header_table.get_or_insert(table);
                continue;
            }

            // Blob-keyed table: a 16-byte key with a fixed 48/56-byte value is
            // the actor transform table, anything else holds object blobs.
            let first: Option<(Vec<u8>, Vec<u8>)> = conn
                .query_row(&format!("SELECT * FROM \"{table}\" LIMIT 1"), [], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })
                .optional()?;
            match first {
                Some((key, value))
                    if key.len() == 16 && (value.len() == 48 || value.len() == 56) =>
                {
                    transforms_table.get_or_insert(table);
                }
                Some(_) => {
                    objects_table.get_or_insert(table);
                }
                None => {}
            }
        }

        Ok(Self {
            header_table: header_table
                .ok_or_else(|| Error::Corrupt("no header table in container".into()))?,
            transforms_table,
            objects_table: objects_table
                .ok_or_else(|| Error::Corrupt("no object table in container".into()))?,
        })
    }
}

struct AsaHeader {
    version: i32,
    game_time: f64,
    names: NameTable,
}

impl AsaHeader {
    fn read(conn: &Connection, table: &str) -> Result<Self> {
        let mut version = -1;
        let mut game_time = 0.0;
        let mut names = NameTable::default();

        let mut stmt = conn.prepare(&format!("SELECT * FROM \"{table}\""))?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let key: String = row.get(0)?;
            let value: rusqlite::types::Value = row.get(1)?;
            let key = key.to_ascii_lowercase();
            if key.contains("version") {
                version = value_as_i64(&value).unwrap_or(-1) as i32;
            } else if key.contains("time") {
                game_time = value_as_f64(&value).unwrap_or(0.0);
            } else if key.contains("name") {
                let blob = match &value {
                    rusqlite::types::Value::Blob(blob) => blob.as_slice(),
                    _ => {
                        return Err(Error::Corrupt(
                            "name table header row is not a blob".into(),
                        ))
                    }
                };
                let mut reader = SaveReader::new(blob);
                let count = reader.read_i32()?;
                if count < 0 {
                    return Err(Error::Corrupt(format!(
                        "negative name table count {count}"
                    )));
                }
                names = NameTable::read(&mut reader, count as usize)?;
            }
        }

        Ok(Self {
            version,
            game_time,
            names,
        })
    }
}

fn value_as_i64(value: &rusqlite::types::Value) -> Option<i64> {
    use rusqlite::types::Value;
    match value {
        Value::Integer(v) => Some(*v),
        Value::Real(v) => Some(*v as i64),
        Value::Blob(b) if b.len() >= 4 => {
            Some(i64::from(i32::from_le_bytes([b[0], b[1], b[2], b[3]])))
        }
        Value::Blob(b) if b.len() >= 2 => {
            Some(i64::from(i16::from_le_bytes([b[0], b[1]])))
        }
        _ => None,
    }
}

fn value_as_f64(value: &rusqlite::types::Value) -> Option<f64> {
    use rusqlite::types::Value;
    match value {
        Value::Real(v) => Some(*v),
        Value::Integer(v) => Some(*v as f64),
        Value::Blob(b) if b.len() >= 8 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&b[..8]);
            Some(f64::from_le_bytes(raw))
        }
        _ => None,
    }
}

fn read_actor_locations(
    conn: &Connection,
    table: Option<&str>,
) -> Result<IndexMap<Guid, LocationData>> {
    let mut locations = IndexMap::new();
    let Some(table) = table else {
        return Ok(locations);
    };
    let mut stmt = conn.prepare(&format!("SELECT * FROM \"{table}\""))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let key: Vec<u8> = row.get(0)?;
        let blob: Vec<u8> = row.get(1)?;
        let guid = guid_from_blob(&key)?;
        if blob.len() < 48 {
            return Err(Error::Corrupt(format!(
                "transform row for {guid} has {} bytes",
                blob.len()
            )));
        }
        let mut reader = SaveReader::new(&blob);
        locations.insert(
            guid,
            LocationData {
                x: reader.read_f64()?,
                y: reader.read_f64()?,
                z: reader.read_f64()?,
                pitch: reader.read_f64()?,
                yaw: reader.read_f64()?,
                roll: reader.read_f64()?,
            },
        );
    }
    Ok(locations)
}

/// Decode one decompressed ASA object blob: class reference, inline names, an
/// item flag, then the shared property list with 64-bit sizes.
fn decode_asa_object(
    blob: &[u8],
    guid: Guid,
    id: usize,
    names: &NameTable,
    parse_errors: &mut Vec<String>,
) -> Result<GameObject> {
    let data = decompress_blob(blob)?;
    let mut ar = Archive::new(&data, SaveFormat::Asa)
        .with_name_table(names)
        .with_wide_sizes();

    let class_name = ar.read_name()?;
    let name_count = ar.reader.read_i32()?.max(0) as usize;
    let mut object_names = Vec::with_capacity(name_count);
    for _ in 0..name_count {
        object_names.push(Name::from(ar.reader.read_fstring()?));
    }
    let is_item = ar.reader.read_bool16()?;

    let properties_offset = ar.reader.tell();
    let properties = read_property_list(&mut ar)?;
    let extra_data = ar.reader.read_bytes(ar.reader.remaining())?;
    parse_errors.append(&mut ar.parse_errors);

    Ok(GameObject {
        id,
        guid,
        class_name,
        names: object_names,
        is_item,
        from_data_file: false,
        data_file_index: 0,
        location: None,
        properties_offset,
        should_be_loaded: true,
        properties,
        extra_data,
        parent: None,
        components: indexmap::IndexMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_combine_low_and_high_words() {
        let mut data = 0x11223344u32.to_le_bytes().to_vec();
        data.extend_from_slice(&0x1u32.to_le_bytes());
        let mut reader = SaveReader::new(&data);
        assert_eq!(read_offset(&mut reader).unwrap(), 0x1_1122_3344);
    }

    #[test]
    fn guid_blob_must_be_sixteen_bytes() {
        assert!(guid_from_blob(&[0; 16]).is_ok());
        assert!(matches!(guid_from_blob(&[0; 8]), Err(Error::Corrupt(_))));
    }

    #[test]
    fn header_values_accept_multiple_column_affinities() {
        use rusqlite::types::Value;
        assert_eq!(value_as_i64(&Value::Integer(12)), Some(12));
        assert_eq!(
            value_as_i64(&Value::Blob(12i32.to_le_bytes().to_vec())),
            Some(12)
        );
        assert_eq!(value_as_f64(&Value::Real(1.5)), Some(1.5));
        assert_eq!(
            value_as_f64(&Value::Blob(2.5f64.to_le_bytes().to_vec())),
            Some(2.5)
        );
    }
}
