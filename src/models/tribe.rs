use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::{
    object::GameObject,
    property::{ArrayValue, Property},
};

static LOG_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^Day\s+(\d+),?\s+([\d:]+):\s*(.*)$").unwrap());
static RICH_COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"<RichColor[^>]*>|</>").unwrap());

/// One line of the tribe log, `"Day D, HH:MM:SS: body"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TribeLogEntry {
    pub day: i64,
    pub time: String,
    /// The raw line as stored, rich-color markup included.
    pub message: String,
}

impl TribeLogEntry {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match LOG_LINE.captures(raw) {
            Some(caps) => Self {
                day: caps[1].parse().unwrap_or(0),
                time: caps[2].trim_end_matches(':').to_owned(),
                message: raw.to_owned(),
            },
            None => Self {
                day: 0,
                time: String::new(),
                message: raw.to_owned(),
            },
        }
    }

    /// The body with `<RichColor ...>` / `</>` markup stripped.
    pub fn clean_message(&self) -> String {
        let body = LOG_LINE
            .captures(&self.message)
            .map(|caps| caps[3].to_owned())
            .unwrap_or_else(|| self.message.clone());
        RICH_COLOR.replace_all(&body, "").trim().to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TribeMember {
    pub player_id: i64,
    pub name: String,
    pub rank: i64,
}

/// Decoded tribe snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct TribeInfo {
    pub tribeid: i64,
    pub tribe: String,
    pub owner_id: i64,
    pub members: Vec<TribeMember>,
    pub logs: Vec<TribeLogEntry>,
    pub alliances: Vec<i64>,
    pub government: i64,
}

impl TribeInfo {
    pub fn from_object(object: &GameObject) -> Self {
        let data = tribe_data(object);
        let find = |name: &str| data.iter().find(|p| p.name.value() == name);

        let ids = int_array(find("MembersPlayerDataID"));
        let names = str_array(find("MembersPlayerName"));
        let ranks = int_array(find("MembersRankGroups"));
        let members = ids
            .iter()
            .enumerate()
            .map(|(i, &player_id)| TribeMember {
                player_id,
                name: names.get(i).cloned().unwrap_or_default(),
                rank: ranks.get(i).copied().unwrap_or(0),
            })
            .collect();

        let logs = str_array(find("TribeLog"))
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| TribeLogEntry::parse(line))
            .collect();

        let scalar = |names: &[&str]| {
            names
                .iter()
                .find_map(|n| find(n).and_then(|p| p.value.as_i64()))
                .unwrap_or(0)
        };

        Self {
            tribeid: scalar(&["TribeID", "TribeId"]),
            tribe: find("TribeName")
                .and_then(|p| p.value.as_str())
                .unwrap_or_default()
                .to_owned(),
            owner_id: scalar(&["OwnerPlayerDataID", "OwnerPlayerDataId"]),
            members,
            logs,
            alliances: int_array(find("TribeAlliances")),
            government: scalar(&["TribeGovernment"]),
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// The `TribeData` struct body, or the object's own properties when the
/// snapshot is flat.
fn tribe_data(object: &GameObject) -> &[Property] {
    object
        .property("TribeData", None)
        .and_then(|p| p.value.as_struct())
        .and_then(|s| s.properties())
        .unwrap_or(&object.properties)
}

fn int_array(property: Option<&Property>) -> Vec<i64> {
    match property.and_then(|p| p.value.as_array()) {
        Some(ArrayValue::Int(v)) => v.iter().map(|&x| i64::from(x)).collect(),
        Some(ArrayValue::UInt32(v)) => v.iter().map(|&x| i64::from(x)).collect(),
        Some(ArrayValue::Int64(v)) => v.clone(),
        Some(ArrayValue::Byte(v)) => v.iter().map(|&x| i64::from(x)).collect(),
        _ => Vec::new(),
    }
}

fn str_array(property: Option<&Property>) -> Vec<String> {
    match property.and_then(|p| p.value.as_array()) {
        Some(ArrayValue::Str(v)) => v.clone(),
        Some(ArrayValue::Name(v)) => v.iter().map(|n| n.to_string()).collect(),
        _ => Vec::new(),
    }
}
