use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use crate::{maps::MapConfig, models, world::WorldSave, Result};

/// The export sections, in their stable output order.
pub const EXPORT_KEYS: &[&str] = &[
    "ASV_Tamed",
    "ASV_Wild",
    "ASV_Players",
    "ASV_Tribes",
    "ASV_Structures",
    "ASV_TribeLogs",
    "ASV_Summary",
];

/// Produce every ASV-compatible section from a decoded world.
///
/// Pure over its input: the same world yields byte-identical JSON, with key
/// order preserved.
pub fn export_all(world: &WorldSave, map: Option<&MapConfig>) -> Result<Value> {
    let mut out = Map::new();
    out.insert(
        "ASV_Tamed".to_owned(),
        serde_json::to_value(models::tamed_creatures(world, map))?,
    );
    out.insert(
        "ASV_Wild".to_owned(),
        serde_json::to_value(models::wild_creatures(world, map))?,
    );
    out.insert(
        "ASV_Players".to_owned(),
        serde_json::to_value(models::players(world, map))?,
    );
    out.insert(
        "ASV_Tribes".to_owned(),
        serde_json::to_value(models::tribes(world))?,
    );
    out.insert(
        "ASV_Structures".to_owned(),
        serde_json::to_value(models::structures(world, map))?,
    );
    out.insert("ASV_TribeLogs".to_owned(), tribe_logs(world));
    out.insert("ASV_Summary".to_owned(), summary(world));
    Ok(Value::Object(out))
}

fn tribe_logs(world: &WorldSave) -> Value {
    let sections: Vec<Value> = models::tribes(world)
        .into_iter()
        .map(|tribe| {
            let logs: Vec<Value> = tribe
                .logs
                .iter()
                .map(|entry| {
                    json!({
                        "day": entry.day,
                        "time": entry.time,
                        "message": entry.message,
                        "clean_message": entry.clean_message(),
                    })
                })
                .collect();
            json!({
                "tribeid": tribe.tribeid,
                "tribe": tribe.tribe,
                "logs": logs,
            })
        })
        .collect();
    Value::Array(sections)
}

fn summary(world: &WorldSave) -> Value {
    json!({
        "format": world.format,
        "version": world.version,
        "game_time": world.game_time,
        "save_count": world.save_count,
        "objects": world.container.len(),
        "tamed": world.container.tamed_creatures().len(),
        "wild": world.container.wild_creatures().len(),
        "structures": world.container.structures().len(),
        "players": world.container.player_pawns().len(),
        "parse_errors": world.parse_error_count(),
    })
}

/// Write one JSON file per export section into `dir`.
pub fn export_to_files(
    world: &WorldSave,
    dir: impl AsRef<Path>,
    map: Option<&MapConfig>,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let all = export_all(world, map)?;
    let mut written = Vec::new();
    if let Value::Object(sections) = all {
        for (key, value) in sections {
            let path = dir.join(format!("{key}.json"));
            std::fs::write(&path, serde_json::to_string_pretty(&value)?)?;
            written.push(path);
        }
    }
    Ok(written)
}
