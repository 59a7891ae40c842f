use std::collections::BTreeMap;
use std::error::Error;

use serde::Deserialize;

/// How a light block gets written into its target cell.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Look the cell up and issue one fill for the material found there.
    #[default]
    Dispatch,
    /// Issue one fill per replaceable material, regardless of outcome.
    Sequential,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Held item identifier -> light level (0..=15).
    pub light_items: BTreeMap<String, u8>,
    pub light_block: String,
    pub light_level_property: String,
    /// Materials a light may replace, in attempt order.
    pub replaceable: Vec<String>,
    pub air_block: String,
    pub tag_key: String,
    pub placement: Placement,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            light_items: BTreeMap::from([("minecraft:torch".to_string(), 10)]),
            light_block: "light_block".into(),
            light_level_property: "block_light_level".into(),
            replaceable: vec!["air".into(), "water".into(), "flowing_water".into()],
            air_block: "air".into(),
            tag_key: "lastLightLocation".into(),
            placement: Placement::Dispatch,
        }
    }
}

#[derive(Deserialize, Default)]
struct TrackerFile {
    #[serde(default)]
    tracker: TrackerConfig,
}

impl TrackerConfig {
    /// Reads the `[tracker]` table; a missing table yields the defaults.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let file: TrackerFile = toml::from_str(toml_str)?;
        Ok(file.tracker)
    }

    /// Light level for a held item, clamped to the valid range.
    pub fn light_level_for(&self, item: Option<&str>) -> Option<u8> {
        item.and_then(|id| self.light_items.get(id))
            .map(|&l| l.min(15))
    }

    pub fn is_replaceable(&self, block: &str) -> bool {
        self.replaceable.iter().any(|m| m == block)
    }
}
