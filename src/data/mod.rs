pub mod catalog;
pub mod character_index;
pub mod player;
pub mod registry;
pub mod skill_index;

pub use catalog::{
    classify_buff_effect, BuffDefinition, BuffDisplay, CatalogError, EvolvePhase, GameCatalog,
    RoomKind, SkillSlot, UnitDefinition, UnlockItem, UnlockRequirement,
};
pub use character_index::CharacterIndex;
pub use player::{
    LaborStatus, ManufactureRoom, OrderStrategy, PlayerDataError, PlayerState, RoomState,
    RosterEntry, TradingBuff, TradingRoom,
};
pub use registry::GameDataRegistry;
pub use skill_index::{SkillIndex, UnlockState};
