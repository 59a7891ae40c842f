use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use super::config::BlocksConfig;
use super::types::{Block, BlockId, BlockState};

/// Light levels run 0..=15; a level property never needs more values than this.
pub const MAX_LEVELS: u16 = 16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("block `{0}` is defined more than once")]
    DuplicateName(String),
    #[error("blocks `{first}` and `{second}` share id {id}")]
    DuplicateId {
        id: BlockId,
        first: String,
        second: String,
    },
    #[error("block `{block}` declares {levels} levels (expected 1..={max})", max = MAX_LEVELS)]
    BadLevels { block: String, levels: u16 },
    #[error("block `{block}` has no state property `{prop}`")]
    UnknownProperty { block: String, prop: String },
    #[error("block `{block}` property `{prop}` does not accept `{value}`")]
    UnknownValue {
        block: String,
        prop: String,
        value: String,
    },
}

#[derive(Default, Clone, Debug)]
pub struct BlockRegistry {
    pub blocks: Vec<BlockType>,
    pub by_name: HashMap<String, BlockId>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&BlockType> {
        self.blocks.get(id as usize)
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    /// Name of the block type, or `None` for ids the registry doesn't know.
    pub fn name_of(&self, block: Block) -> Option<&str> {
        self.get(block.id)
            .filter(|ty| !ty.name.is_empty())
            .map(|ty| ty.name.as_str())
    }

    pub fn load_from_path(blocks_path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(blocks_path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: BlocksConfig = toml::from_str(toml_str)?;
        Ok(Self::from_config(cfg)?)
    }

    /// Ids default to the next free slot; explicit ids may leave unnamed gaps.
    pub fn from_config(cfg: BlocksConfig) -> Result<Self, RegistryError> {
        let mut reg = BlockRegistry::new();
        for def in cfg.blocks {
            if reg.by_name.contains_key(&def.name) {
                return Err(RegistryError::DuplicateName(def.name));
            }
            let id = def.id.unwrap_or(reg.blocks.len() as u16);
            if let Some(taken) = reg.name_of(Block { id, state: 0 }) {
                return Err(RegistryError::DuplicateId {
                    id,
                    first: taken.to_string(),
                    second: def.name,
                });
            }
            let level = match def.level_property {
                Some(prop) => {
                    let levels = def.levels.unwrap_or(MAX_LEVELS);
                    if levels == 0 || levels > MAX_LEVELS {
                        return Err(RegistryError::BadLevels {
                            block: def.name,
                            levels,
                        });
                    }
                    Some(LevelProperty { name: prop, levels })
                }
                None => None,
            };
            let ty = BlockType {
                id,
                name: def.name,
                emission: def.emission.unwrap_or(0),
                level,
            };
            if reg.blocks.len() <= id as usize {
                reg.blocks
                    .resize(id as usize + 1, BlockType::placeholder(id));
            }
            reg.by_name.insert(ty.name.clone(), id);
            reg.blocks[id as usize] = ty;
        }
        Ok(reg)
    }

    /// Builds a block with the given properties; an unset level property reads as level 0.
    pub fn make_block_by_name(
        &self,
        name: &str,
        props: &[(String, String)],
    ) -> Option<Result<Block, RegistryError>> {
        let id = self.id_by_name(name)?;
        let ty = self.get(id)?;
        Some(ty.try_pack_state(props).map(|state| Block { id, state }))
    }
}

/// The one numeric state property a block can carry; state is the level itself.
#[derive(Clone, Debug)]
pub struct LevelProperty {
    pub name: String,
    pub levels: u16,
}

#[derive(Clone, Debug)]
pub struct BlockType {
    pub id: BlockId,
    pub name: String,
    pub emission: u8,
    pub level: Option<LevelProperty>,
}

impl BlockType {
    fn placeholder(id: BlockId) -> Self {
        BlockType {
            id,
            name: String::new(),
            emission: 0,
            level: None,
        }
    }

    /// Emitted light: the packed level for level blocks, else the fixed emission.
    pub fn light_emission(&self, state: BlockState) -> u8 {
        match &self.level {
            Some(_) => state.min(MAX_LEVELS - 1) as u8,
            None => self.emission,
        }
    }

    pub fn try_pack_state(&self, props: &[(String, String)]) -> Result<BlockState, RegistryError> {
        let mut state: BlockState = 0;
        for (prop, value) in props {
            let Some(level) = self.level.as_ref().filter(|l| &l.name == prop) else {
                return Err(RegistryError::UnknownProperty {
                    block: self.name.clone(),
                    prop: prop.clone(),
                });
            };
            state = value
                .parse::<u16>()
                .ok()
                .filter(|v| *v < level.levels)
                .ok_or_else(|| RegistryError::UnknownValue {
                    block: self.name.clone(),
                    prop: prop.clone(),
                    value: value.clone(),
                })?;
        }
        Ok(state)
    }
}
