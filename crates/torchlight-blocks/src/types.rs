// Compact block representation used by the edit store
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub struct Block {
    pub id: BlockId,
    pub state: BlockState,
}

pub type BlockId = u16;
pub type BlockState = u16;

impl Block {
    pub const AIR: Block = Block { id: 0, state: 0 };
}
