/*!
Reader for ARK save files across both generations of the game: the legacy
pure-binary format ("ASE") and the SQLite-backed format with compressed object
blobs ("ASA").

The decoder turns on-disk bytes into a typed object graph of players, tribes,
creatures, structures, items, cryopod payloads and world objects, and offers
an export pass producing ASV-compatible JSON with optional world-to-GPS
coordinate mapping.

# Example

```no_run
use arksave::{export_all, map_config_for, WorldSave};

let world = WorldSave::load("TheIsland.ark")?;
println!("{} objects, {} parse errors", world.container.len(), world.parse_error_count());

let map = map_config_for("theisland.ark");
let json = export_all(&world, map)?;
println!("{}", serde_json::to_string_pretty(&json)?);
# Ok::<(), Box<dyn std::error::Error>>(())
```

Profiles, tribes and obelisk data have their own entry points:

```no_run
use arksave::{Profile, Tribe};

let profile = Profile::load("steamid.arkprofile")?;
println!("{:?} level {}", profile.player_name(), profile.level());

let tribe = Tribe::load("1446520645.arktribe")?;
if let Some(info) = tribe.info() {
    println!("{} has {} members", info.tribe, info.member_count());
}
# Ok::<(), Box<dyn std::error::Error>>(())
```

Decoding is single-threaded and synchronous; the full graph lives in memory.
Per-property decode failures are recovered (skip to the declared end, record
the event) so a damaged save still yields its readable objects alongside a
`parse_errors` list.
*/

mod archive;
mod error;

pub mod container;
pub mod detect;
pub mod export;
pub mod files;
pub mod guid;
pub mod maps;
pub mod models;
pub mod names;
pub mod object;
pub mod property;
pub mod reader;
pub mod rle;
pub mod structs;
pub mod world;

pub use container::ObjectContainer;
pub use detect::{detect, Detection, FileKind, SaveFormat};
pub use error::Error;
pub use export::{export_all, export_to_files};
pub use files::{CloudInventory, Profile, SaveFile, Tribe};
pub use guid::Guid;
pub use maps::{map_config_for, MapConfig, MAP_CONFIGS};
pub use names::{Name, NameTable};
pub use object::{GameObject, LocationData};
pub use property::{ArrayValue, ObjectRef, Property, PropertyType, PropertyValue};
pub use structs::{StructType, StructValue};
pub use world::{LoadOptions, WorldSave};

pub type Result<T, E = Error> = std::result::Result<T, E>;
