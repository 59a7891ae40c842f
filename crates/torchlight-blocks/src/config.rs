use serde::Deserialize;

// Top-level blocks config file
#[derive(Deserialize, Debug)]
pub struct BlocksConfig {
    pub blocks: Vec<BlockDef>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct BlockDef {
    pub name: String,
    #[serde(default)]
    pub id: Option<u16>,
    #[serde(default)]
    pub emission: Option<u8>,
    // Numeric state property the block emits at, e.g. `level_property = "block_light_level"`
    // with `levels = 16` accepts "0".."15".
    #[serde(default)]
    pub level_property: Option<String>,
    #[serde(default)]
    pub levels: Option<u16>,
}
