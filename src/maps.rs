use serde::Serialize;

/// Affine transform from Unreal world coordinates to the in-game GPS grid.
///
/// `latitude = lat_shift + y / lat_div`, `longitude = lon_shift + x / lon_div`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapConfig {
    pub name: &'static str,
    pub filename: &'static str,
    pub lat_shift: f64,
    pub lat_div: f64,
    pub lon_shift: f64,
    pub lon_div: f64,
}

impl MapConfig {
    pub const fn new(
        name: &'static str,
        filename: &'static str,
        lat_shift: f64,
        lat_div: f64,
        lon_shift: f64,
        lon_div: f64,
    ) -> Self {
        Self {
            name,
            filename,
            lat_shift,
            lat_div,
            lon_shift,
            lon_div,
        }
    }

    /// Build a config from the map's world origin and edge length: a map from
    /// `origin` to `origin + size` covers GPS 0..100 on both axes.
    pub fn from_bounds(origin: (f64, f64), size: f64) -> Self {
        let div = size / 100.0;
        Self {
            name: "Custom",
            filename: "",
            lat_shift: -origin.1 / div,
            lat_div: div,
            lon_shift: -origin.0 / div,
            lon_div: div,
        }
    }

    pub fn ue_to_lat(&self, y: f64) -> f64 {
        self.lat_shift + y / self.lat_div
    }

    pub fn ue_to_lon(&self, x: f64) -> f64 {
        self.lon_shift + x / self.lon_div
    }

    pub fn ue_to_gps(&self, x: f64, y: f64) -> (f64, f64) {
        (self.ue_to_lat(y), self.ue_to_lon(x))
    }
}

/// Per-map transforms for the official maps of both generations.
pub const MAP_CONFIGS: &[MapConfig] = &[
    MapConfig::new("The Island", "theisland.ark", 50.0, 8000.0, 50.0, 8000.0),
    MapConfig::new("Scorched Earth", "scorchedearth_p.ark", 50.0, 8000.0, 50.0, 8000.0),
    MapConfig::new("Aberration", "aberration_p.ark", 50.0, 8000.0, 50.0, 8000.0),
    MapConfig::new("Extinction", "extinction.ark", 50.0, 8000.0, 50.0, 8000.0),
    MapConfig::new("The Center", "thecenter.ark", 30.34223747253418, 9584.0, 55.10416793823242, 9600.0),
    MapConfig::new("Ragnarok", "ragnarok.ark", 50.009388, 13100.0, 50.009388, 13100.0),
    MapConfig::new("Valguero", "valguero_p.ark", 50.0, 8161.0, 50.0, 8161.0),
    MapConfig::new("Crystal Isles", "crystalisles.ark", 48.687, 15882.02, 49.9481, 16988.76),
    MapConfig::new("Genesis", "genesis.ark", 50.0, 10500.0, 50.0, 10500.0),
    MapConfig::new("Genesis 2", "gen2.ark", 49.6, 14500.0, 49.6, 14500.0),
    MapConfig::new("Lost Island", "lostisland.ark", 51.6, 15300.0, 49.0, 15300.0),
    MapConfig::new("Fjordur", "fjordur.ark", 50.0, 7140.0, 50.0, 7140.0),
    MapConfig::new("The Island (Ascended)", "theisland_wp.ark", 50.0, 6850.0, 50.0, 6850.0),
    MapConfig::new("The Center (Ascended)", "thecenter_wp.ark", 32.5, 10380.52, 50.5, 10374.29),
    MapConfig::new("Scorched Earth (Ascended)", "scorchedearth_wp.ark", 50.0, 8000.0, 50.0, 8000.0),
    MapConfig::new("Aberration (Ascended)", "aberration_wp.ark", 50.0, 8000.0, 50.0, 8000.0),
    MapConfig::new("Extinction (Ascended)", "extinction_wp.ark", 50.0, 6850.0, 50.0, 6850.0),
    MapConfig::new("Ragnarok (Ascended)", "ragnarok_wp.ark", 50.009388, 13100.0, 50.009388, 13100.0),
    MapConfig::new("Valguero (Ascended)", "valguero_wp.ark", 50.0, 8161.0, 50.0, 8161.0),
];

/// Look a map up by save file name, case-insensitive.
pub fn map_config_for(filename: &str) -> Option<&'static MapConfig> {
    MAP_CONFIGS
        .iter()
        .find(|cfg| cfg.filename.eq_ignore_ascii_case(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn island_center_is_fifty_fifty() {
        let cfg = map_config_for("TheIsland.ark").unwrap();
        assert_eq!(cfg.ue_to_gps(0.0, 0.0), (50.0, 50.0));
    }

    #[test]
    fn bounds_constructor_matches_shift_and_div() {
        let cfg = MapConfig::from_bounds((-400000.0, -400000.0), 800000.0);
        assert_eq!(cfg.lat_div, 8000.0);
        assert_eq!(cfg.lat_shift, 50.0);
        assert_eq!(cfg.ue_to_gps(0.0, 0.0), (50.0, 50.0));
        assert_eq!(cfg.ue_to_gps(400000.0, -400000.0), (0.0, 100.0));
    }

    #[test]
    fn unknown_map_is_none() {
        assert!(map_config_for("moon_base.ark").is_none());
    }
}
