use serde::Serialize;

use crate::object::GameObject;

/// The twelve stat slots, in their fixed serialized order.
pub const STAT_NAMES: [&str; 12] = [
    "Health",
    "Stamina",
    "Torpidity",
    "Oxygen",
    "Food",
    "Water",
    "Temperature",
    "Weight",
    "Melee",
    "Speed",
    "Fortitude",
    "Crafting",
];

/// Points applied per stat slot. Each slot is the sum of the same-name
/// properties carrying that slot's index, since stat arrays serialize one
/// property per bucket.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatPoints {
    pub health: i64,
    pub stamina: i64,
    pub torpidity: i64,
    pub oxygen: i64,
    pub food: i64,
    pub water: i64,
    pub temperature: i64,
    pub weight: i64,
    pub melee: i64,
    pub speed: i64,
    pub fortitude: i64,
    pub crafting: i64,
}

impl StatPoints {
    pub fn from_object(object: &GameObject, property: &str) -> Self {
        Self::from_fn(|i| object.sum_i64(property, i))
    }

    pub fn from_fn(mut get: impl FnMut(u32) -> i64) -> Self {
        Self {
            health: get(0),
            stamina: get(1),
            torpidity: get(2),
            oxygen: get(3),
            food: get(4),
            water: get(5),
            temperature: get(6),
            weight: get(7),
            melee: get(8),
            speed: get(9),
            fortitude: get(10),
            crafting: get(11),
        }
    }

    pub fn to_array(self) -> [i64; 12] {
        [
            self.health,
            self.stamina,
            self.torpidity,
            self.oxygen,
            self.food,
            self.water,
            self.temperature,
            self.weight,
            self.melee,
            self.speed,
            self.fortitude,
            self.crafting,
        ]
    }

    /// Total allocated points, torpidity excluded (it levels on its own).
    pub fn total(self) -> i64 {
        self.to_array().iter().sum::<i64>() - self.torpidity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_fn_maps_slots_in_order() {
        let stats = StatPoints::from_fn(|i| i64::from(i));
        assert_eq!(stats.health, 0);
        assert_eq!(stats.melee, 8);
        assert_eq!(stats.crafting, 11);
        assert_eq!(stats.to_array(), [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn total_skips_torpidity() {
        let stats = StatPoints::from_fn(|i| if i == 2 { 100 } else { 1 });
        assert_eq!(stats.total(), 11);
    }
}
