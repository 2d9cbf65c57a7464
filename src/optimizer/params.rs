//! Parameter assembly: join the player state with the catalog and skill
//! index into the operator and room lists one optimizer run consumes. Pure
//! over read-only inputs, so runs may assemble concurrently.

use crate::data::catalog::{classify_buff_effect, RoomKind};
use crate::data::player::{OrderStrategy, PlayerState, RosterEntry};
use crate::data::registry::GameDataRegistry;

/// Seconds of facility duty one action point pays for.
pub const SECONDS_PER_AP: f64 = 3600.0;

/// Operator slots of a trading post (the export carries no capacity field
/// for trading rooms).
pub const TRADING_SLOT_CAPACITY: i32 = 3;
/// Action points an operator must hold to take a trading duty.
pub const TRADING_DUTY_COST: i32 = 1;
/// Base seconds per trading order at rate 1.0.
pub const BASE_ORDER_SECONDS: f64 = 7200.0;

/// Gold-equivalent value of one trading order under each strategy.
pub fn strategy_unit_value(strategy: OrderStrategy) -> f64 {
    match strategy {
        OrderStrategy::Gold => 500.0,
        OrderStrategy::Orundum => 450.0,
    }
}

/// Build seconds and gold-equivalent value per solution, by formula id.
/// Unknown formulas fall back to the baseline line.
fn formula_params(formula_id: &str) -> (f64, f64) {
    match formula_id {
        "1" => (2700.0, 100.0),
        "2" => (5400.0, 200.0),
        "3" => (10800.0, 400.0),
        "4" => (4320.0, 500.0),
        _ => (3600.0, 100.0),
    }
}

/// Optimizer-facing view of one roster unit.
#[derive(Debug, Clone)]
pub struct Operator {
    pub char_id: String,
    pub ap: i32,
    pub manufacture_bonus: f64,
    pub trading_bonus: f64,
    pub active_buffs: Vec<String>,
}

impl Operator {
    /// How long this operator can hold a duty with the given AP cost, capped
    /// by the modeled horizon.
    pub fn duty_seconds(&self, duty_cost: i32, horizon_seconds: f64) -> f64 {
        if self.ap <= 0 {
            return 0.0;
        }
        let affordable = f64::from(self.ap) * SECONDS_PER_AP / f64::from(duty_cost.max(1));
        affordable.min(horizon_seconds)
    }
}

/// Optimizer-facing view of one owned facility room.
#[derive(Debug, Clone)]
pub struct RoomModel {
    pub id: String,
    pub kind: RoomKind,
    /// Operator slot capacity.
    pub capacity: i32,
    /// AP an operator must be able to pay to take this duty.
    pub duty_cost: i32,
    /// Room-level production rate bonus (trading speed buff).
    pub speed_bonus: f64,
    /// Seconds per output unit at rate 1.0.
    pub produce_seconds: f64,
    /// Output units the room may still commit (solutions or stock).
    pub output_cap: f64,
    /// Gold-equivalent value per unit; trading rooms value by strategy
    /// through [strategy_unit_value] instead.
    pub unit_value: f64,
    /// The strategy the room is currently configured with (trading only);
    /// the optimizer is free to choose a different one.
    pub configured_strategy: Option<OrderStrategy>,
}

#[derive(Debug, Clone)]
pub struct ParameterSet {
    pub operators: Vec<Operator>,
    pub rooms: Vec<RoomModel>,
    /// Facility-wide labor speed multiplier.
    pub labor_speed: f64,
}

pub fn assemble_parameters(registry: &GameDataRegistry, player: &PlayerState) -> ParameterSet {
    let mut operators: Vec<Operator> = player
        .chars
        .values()
        .map(|entry| build_operator(registry, entry))
        .collect();
    // Parameter order must not depend on hash-map iteration, or identical
    // inputs could tie-break to different optimal assignments.
    operators.sort_by(|left, right| {
        left.char_id
            .cmp(&right.char_id)
            .then_with(|| left.ap.cmp(&right.ap))
    });

    let mut rooms: Vec<RoomModel> = Vec::new();
    for (id, room) in &player.rooms.manufacture {
        let (produce_seconds, unit_value) = formula_params(&room.formula_id);
        rooms.push(RoomModel {
            id: id.clone(),
            kind: RoomKind::Manufacture,
            capacity: room.capacity,
            duty_cost: room.ap_cost.max(1),
            speed_bonus: 0.0,
            produce_seconds,
            output_cap: f64::from(room.remain_solution_cnt),
            unit_value,
            configured_strategy: None,
        });
    }
    for (id, room) in &player.rooms.trading {
        rooms.push(RoomModel {
            id: id.clone(),
            kind: RoomKind::Trading,
            capacity: TRADING_SLOT_CAPACITY,
            duty_cost: TRADING_DUTY_COST,
            speed_bonus: room.buff.speed - 1.0,
            produce_seconds: BASE_ORDER_SECONDS,
            output_cap: f64::from(room.stock_limit + room.buff.limit),
            unit_value: 0.0,
            configured_strategy: Some(room.order_strategy),
        });
    }
    rooms.sort_by(|left, right| left.id.cmp(&right.id));

    ParameterSet {
        operators,
        rooms,
        labor_speed: player.status.labor.buff_speed.max(0.0),
    }
}

fn build_operator(registry: &GameDataRegistry, entry: &RosterEntry) -> Operator {
    let active_buffs = resolve_active_buffs(registry, entry);

    let mut manufacture_bonus = 0.0;
    let mut trading_bonus = 0.0;
    for buff_id in &active_buffs {
        let magnitude = registry
            .catalog()
            .buff(buff_id)
            .map(|buff| buff.display.buff as f64 / 100.0)
            .unwrap_or(0.0);
        match classify_buff_effect(buff_id) {
            Some(RoomKind::Manufacture) => manufacture_bonus += magnitude,
            Some(RoomKind::Trading) => trading_bonus += magnitude,
            None => {}
        }
    }

    Operator {
        char_id: entry.char_id.clone(),
        ap: entry.ap,
        manufacture_bonus,
        trading_bonus,
        active_buffs,
    }
}

/// Active buff ids for a roster unit. Prefers an explicit upgrade state;
/// otherwise recovers one from the observed buff set through the skill
/// index; otherwise uses the observed set as-is (catalog defaults).
fn resolve_active_buffs(registry: &GameDataRegistry, entry: &RosterEntry) -> Vec<String> {
    let catalog = registry.catalog();

    if let (Some(phase), Some(level)) = (entry.evolve_phase, entry.level) {
        if let Some(unit) = catalog.unit(&entry.char_id) {
            return unit
                .active_buffs(phase, level)
                .into_iter()
                .map(str::to_string)
                .collect();
        }
    }

    if entry.buffs.is_empty() {
        return Vec::new();
    }

    let keys: Vec<&str> = entry.buffs.iter().map(String::as_str).collect();
    let skills = registry.skills();
    let resolved = if let [only] = keys.as_slice() {
        skills
            .resolve_single(only, Some(entry.char_id.as_str()))
            .or_else(|| skills.resolve_single(only, None))
    } else {
        skills
            .resolve_combination(&keys, Some(entry.char_id.as_str()))
            .or_else(|| skills.resolve_combination(&keys, None))
    };

    if let Some(state) = resolved {
        // An unqualified hit may belong to a different unit's upgrade path;
        // only a state for this unit can be expanded through its slots.
        if state.char_id == entry.char_id {
            if let Some(unit) = catalog.unit(&entry.char_id) {
                return unit
                    .active_buffs(state.phase, state.level)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
            }
        }
    }

    log::debug!(
        "buff set of {} did not resolve through the skill index; using it as-is",
        entry.char_id
    );
    entry.buffs.clone()
}
