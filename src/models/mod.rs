//! Typed projections over the raw object graph.
//!
//! Models are pure values: extraction reads the container and its
//! relationship links, and keeps no back-references into it.

pub mod creature;
pub mod cryopod;
pub mod item;
pub mod player;
pub mod stats;
pub mod structure;
pub mod tribe;
pub mod uploads;

pub use creature::{TamedCreature, WildCreature};
pub use cryopod::CryopodCreature;
pub use item::ItemStack;
pub use player::PlayerInfo;
pub use stats::{StatPoints, STAT_NAMES};
pub use structure::StructureInfo;
pub use tribe::{TribeInfo, TribeLogEntry, TribeMember};
pub use uploads::{UploadedCreature, UploadedItem};

use crate::{maps::MapConfig, world::WorldSave};

/// Item quality tiers by index.
pub fn quality_name(index: i64) -> &'static str {
    match index {
        0 => "Primitive",
        1 => "Ramshackle",
        2 => "Apprentice",
        3 => "Journeyman",
        4 => "Mastercraft",
        5 => "Ascendant",
        _ => "Unknown",
    }
}

/// Split a `"Name - Lvl N (Species)"` display string into its parts. Strings
/// that do not follow the pattern come back as a bare name.
pub(crate) fn parse_display_name(display: &str) -> (String, Option<i64>, Option<String>) {
    let Some((name, rest)) = display.split_once(" - Lvl ") else {
        return (display.to_owned(), None, None);
    };
    let (level_text, species) = match rest.split_once(" (") {
        Some((level, species)) => (level, Some(species.trim_end_matches(')').to_owned())),
        None => (rest, None),
    };
    (name.to_owned(), level_text.trim().parse().ok(), species)
}

/// Tamed creatures with their status components resolved.
pub fn tamed_creatures(world: &WorldSave, map: Option<&MapConfig>) -> Vec<TamedCreature> {
    world
        .container
        .tamed_creatures()
        .into_iter()
        .map(|object| {
            TamedCreature::from_objects(object, world.container.status_component(object), map)
        })
        .collect()
}

/// Wild creatures with their status components resolved.
pub fn wild_creatures(world: &WorldSave, map: Option<&MapConfig>) -> Vec<WildCreature> {
    world
        .container
        .wild_creatures()
        .into_iter()
        .map(|object| {
            WildCreature::from_objects(object, world.container.status_component(object), map)
        })
        .collect()
}

/// Players present on the map as pawns.
pub fn players(world: &WorldSave, map: Option<&MapConfig>) -> Vec<PlayerInfo> {
    world
        .container
        .player_pawns()
        .into_iter()
        .map(|object| {
            PlayerInfo::from_pawn(object, world.container.status_component(object), map)
        })
        .collect()
}

/// Placed structures, decay measured against the save's game clock.
pub fn structures(world: &WorldSave, map: Option<&MapConfig>) -> Vec<StructureInfo> {
    world
        .container
        .structures()
        .into_iter()
        .map(|object| StructureInfo::from_object(object, world.game_time, map))
        .collect()
}

/// Tribe snapshots embedded in the world save.
pub fn tribes(world: &WorldSave) -> Vec<TribeInfo> {
    world
        .container
        .by_class_pattern("PrimalTribeData")
        .map(TribeInfo::from_object)
        .collect()
}

/// Item stacks, cryopod payloads decoded.
pub fn items(world: &WorldSave) -> Vec<ItemStack> {
    world
        .container
        .items()
        .into_iter()
        .map(ItemStack::from_object)
        .collect()
}
