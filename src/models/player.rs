use serde::Serialize;

use crate::{
    files::Profile,
    maps::MapConfig,
    object::{GameObject, LocationData},
};

use super::stats::StatPoints;

/// Decoded player, from a profile file or an in-world pawn.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerInfo {
    pub playerid: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steam: Option<String>,
    pub tribeid: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tribe: Option<String>,
    pub sex: &'static str,
    pub lvl: i64,
    pub stats: StatPoints,
    pub engram_points: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

impl PlayerInfo {
    pub fn from_profile(profile: &Profile) -> Self {
        let is_female = profile
            .main_object()
            .map(|o| o.prop_bool("bIsFemale"))
            .unwrap_or(false);
        Self {
            playerid: profile.player_id().unwrap_or(0),
            name: profile.player_name().unwrap_or_default().to_owned(),
            steam: profile.unique_net_id(),
            tribeid: profile.tribe_id().unwrap_or(0),
            tribe: None,
            sex: if is_female { "Female" } else { "Male" },
            lvl: profile.level(),
            stats: StatPoints::default(),
            engram_points: profile.total_engram_points(),
            location: None,
            lat: None,
            lon: None,
        }
    }

    /// Build from a player pawn on the map plus its status component.
    pub fn from_pawn(
        object: &GameObject,
        status: Option<&GameObject>,
        map: Option<&MapConfig>,
    ) -> Self {
        let base = status
            .and_then(|s| s.prop_i64("BaseCharacterLevel", None))
            .unwrap_or(0);
        let extra = status
            .and_then(|s| s.prop_i64("ExtraCharacterLevel", None))
            .unwrap_or(0);
        let (lat, lon) = match (object.location.as_ref(), map) {
            (Some(loc), Some(map)) => (Some(map.ue_to_lat(loc.y)), Some(map.ue_to_lon(loc.x))),
            _ => (None, None),
        };
        Self {
            playerid: object.prop_i64("LinkedPlayerDataID", None).unwrap_or(0),
            name: object.prop_str("PlayerName").unwrap_or_default().to_owned(),
            steam: object.prop_str("PlatformProfileName").map(str::to_owned),
            tribeid: object.prop_i64("TargetingTeam", None).unwrap_or(0),
            tribe: object.prop_str("TribeName").map(str::to_owned),
            sex: if object.prop_bool("bIsFemale") {
                "Female"
            } else {
                "Male"
            },
            lvl: 1 + base + extra,
            stats: status
                .map(|s| StatPoints::from_object(s, "NumberOfLevelUpPointsApplied"))
                .unwrap_or_default(),
            engram_points: object.prop_i64("TotalEngramPoints", None).unwrap_or(0),
            location: object.location,
            lat,
            lon,
        }
    }
}
