//! Player document model: roster, owned facility rooms, labor status. Field
//! names follow the game's player-data export. Parsed per optimizer run and
//! immutable afterwards; never validated against the catalog at parse time.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::catalog::{BuffDisplay, EvolvePhase};

#[derive(Debug)]
pub enum PlayerDataError {
    Parse(serde_json::Error),
    UnrecognizedRoomState(u8),
    UnrecognizedOrderStrategy(String),
}

impl fmt::Display for PlayerDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerDataError::Parse(err) => write!(f, "player data parse error: {err}"),
            PlayerDataError::UnrecognizedRoomState(value) => {
                write!(f, "unrecognized room state: {value}")
            }
            PlayerDataError::UnrecognizedOrderStrategy(value) => {
                write!(f, "unrecognized trading order strategy '{value}'")
            }
        }
    }
}

impl std::error::Error for PlayerDataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlayerDataError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PlayerDataError {
    fn from(err: serde_json::Error) -> Self {
        PlayerDataError::Parse(err)
    }
}

/// Operational state of an owned room, decoded from the export's integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RoomState {
    Idle,
    Working,
    Complete,
}

impl TryFrom<u8> for RoomState {
    type Error = PlayerDataError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RoomState::Idle),
            1 => Ok(RoomState::Working),
            2 => Ok(RoomState::Complete),
            other => Err(PlayerDataError::UnrecognizedRoomState(other)),
        }
    }
}

impl From<RoomState> for u8 {
    fn from(state: RoomState) -> u8 {
        match state {
            RoomState::Idle => 0,
            RoomState::Working => 1,
            RoomState::Complete => 2,
        }
    }
}

/// Which tradeable a trading room is configured to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OrderStrategy {
    Gold,
    Orundum,
}

impl OrderStrategy {
    /// Decode the export's strategy string. Unknown values are a typed error
    /// so batch runs can skip one bad record instead of aborting.
    pub fn from_code(code: &str) -> Result<Self, PlayerDataError> {
        match code {
            "O_GOLD" => Ok(OrderStrategy::Gold),
            "O_DIAMOND" => Ok(OrderStrategy::Orundum),
            other => Err(PlayerDataError::UnrecognizedOrderStrategy(other.to_string())),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            OrderStrategy::Gold => "O_GOLD",
            OrderStrategy::Orundum => "O_DIAMOND",
        }
    }
}

impl TryFrom<String> for OrderStrategy {
    type Error = PlayerDataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        OrderStrategy::from_code(&value)
    }
}

impl From<OrderStrategy> for String {
    fn from(strategy: OrderStrategy) -> String {
        strategy.code().to_string()
    }
}

impl fmt::Display for OrderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStrategy::Gold => f.write_str("GOLD"),
            OrderStrategy::Orundum => f.write_str("ORUNDUM"),
        }
    }
}

/// Facility-wide labor pool. `buff_speed` scales all production rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborStatus {
    #[serde(rename = "buffSpeed")]
    pub buff_speed: f64,
    pub value: i32,
    #[serde(rename = "maxValue")]
    pub max_value: i32,
    #[serde(rename = "ProcessPoint", default)]
    pub process_point: f64,
}

/// One roster unit. `evolve_phase`/`level` and `buffs` are optional: when the
/// upgrade state is absent, the observed buff set is resolved through the
/// skill index instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub char_id: String,
    #[serde(default)]
    pub room_slot_id: String,
    #[serde(default)]
    pub last_ap_add_time: i64,
    pub ap: i32,
    #[serde(default)]
    pub index: i32,
    #[serde(default)]
    pub change_scale: i32,
    #[serde(default)]
    pub work_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolve_phase: Option<EvolvePhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufactureRoom {
    pub state: RoomState,
    pub formula_id: String,
    pub remain_solution_cnt: i32,
    pub output_solution_cnt: i32,
    pub capacity: i32,
    pub ap_cost: i32,
    pub process_point: f64,
    #[serde(default)]
    pub last_update_time: i64,
    #[serde(default)]
    pub complete_work_time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradingBuff {
    pub speed: f64,
    pub limit: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingRoom {
    pub buff: TradingBuff,
    pub state: RoomState,
    pub stock_limit: i32,
    pub display: BuffDisplay,
    #[serde(rename = "strategy")]
    pub order_strategy: OrderStrategy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomInventory {
    #[serde(rename = "MANUFACTURE", default)]
    pub manufacture: HashMap<String, ManufactureRoom>,
    #[serde(rename = "TRADING", default)]
    pub trading: HashMap<String, TradingRoom>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatus {
    pub labor: LaborStatus,
}

/// Aggregate roster + facility state for one optimizer run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub status: PlayerStatus,
    #[serde(default)]
    pub chars: HashMap<String, RosterEntry>,
    pub rooms: RoomInventory,
}

impl PlayerState {
    pub fn parse(text: &str) -> Result<Self, PlayerDataError> {
        let state: PlayerState = serde_json::from_str(text)?;
        log::info!(
            "player data: {} roster units, {} manufacture rooms, {} trading rooms",
            state.chars.len(),
            state.rooms.manufacture.len(),
            state.rooms.trading.len()
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_strategy_codes_round_trip() {
        assert_eq!(OrderStrategy::from_code("O_GOLD").expect("gold"), OrderStrategy::Gold);
        assert_eq!(
            OrderStrategy::from_code("O_DIAMOND").expect("orundum"),
            OrderStrategy::Orundum
        );
        assert_eq!(OrderStrategy::Gold.code(), "O_GOLD");
        assert_eq!(OrderStrategy::Orundum.code(), "O_DIAMOND");
    }

    #[test]
    fn unknown_order_strategy_is_a_typed_error() {
        let err = OrderStrategy::from_code("O_PLUTONIUM").expect_err("must reject");
        assert!(matches!(err, PlayerDataError::UnrecognizedOrderStrategy(ref code) if code == "O_PLUTONIUM"));
    }

    #[test]
    fn unknown_room_state_is_rejected() {
        assert!(RoomState::try_from(1).is_ok());
        assert!(matches!(
            RoomState::try_from(9),
            Err(PlayerDataError::UnrecognizedRoomState(9))
        ));
    }
}
