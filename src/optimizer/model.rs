//! Integer-program formulation. Decision variables are binary
//! operator-to-room assignments; trading rooms additionally get one gate
//! variable per order strategy so the strategy choice stays linear.

use crate::data::catalog::RoomKind;
use crate::data::player::OrderStrategy;
use crate::solver::IlpModel;

use super::params::{strategy_unit_value, ParameterSet};
use super::SolverConfig;

/// What one model variable stands for; indexed in lockstep with the model's
/// variable list so solutions can be read back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariableRole {
    Assign {
        operator: usize,
        room: usize,
        strategy: Option<OrderStrategy>,
    },
    StrategyGate {
        room: usize,
        strategy: OrderStrategy,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ModelMap {
    pub roles: Vec<VariableRole>,
}

/// Build the assignment program for one run.
///
/// Constraints: at most one duty per operator, per-room slot capacity,
/// per-room output caps (remaining solutions / stock limit), and the
/// strategy gates for trading rooms. Only operator-driven production enters
/// the objective, so an all-idle roster scores exactly zero.
pub fn build_model(params: &ParameterSet, config: &SolverConfig) -> (IlpModel, ModelMap) {
    let horizon_seconds = config.model_time_limit.max(0.0);
    let mut model = IlpModel::new();
    let mut map = ModelMap::default();
    let mut duties_per_operator: Vec<Vec<(usize, f64)>> =
        vec![Vec::new(); params.operators.len()];

    for (room_index, room) in params.rooms.iter().enumerate() {
        let mut capacity_terms: Vec<(usize, f64)> = Vec::new();
        let mut output_terms: Vec<(usize, f64)> = Vec::new();

        match room.kind {
            RoomKind::Manufacture => {
                for (operator_index, operator) in params.operators.iter().enumerate() {
                    if operator.ap < room.duty_cost {
                        continue;
                    }
                    let duration = operator.duty_seconds(room.duty_cost, horizon_seconds);
                    if duration <= 0.0 {
                        continue;
                    }
                    let units = duration / room.produce_seconds
                        * (1.0 + operator.manufacture_bonus + room.speed_bonus)
                        * params.labor_speed;
                    let variable = model.add_variable(
                        format!("x{}_{}", operator_index, room.id),
                        units * room.unit_value,
                    );
                    map.roles.push(VariableRole::Assign {
                        operator: operator_index,
                        room: room_index,
                        strategy: None,
                    });
                    capacity_terms.push((variable, 1.0));
                    output_terms.push((variable, units));
                    duties_per_operator[operator_index].push((variable, 1.0));
                }
            }
            RoomKind::Trading => {
                let mut gate_terms: Vec<(usize, f64)> = Vec::new();
                for strategy in [OrderStrategy::Gold, OrderStrategy::Orundum] {
                    let gate =
                        model.add_variable(format!("y_{}_{}", room.id, strategy.code()), 0.0);
                    map.roles.push(VariableRole::StrategyGate {
                        room: room_index,
                        strategy,
                    });
                    gate_terms.push((gate, 1.0));

                    for (operator_index, operator) in params.operators.iter().enumerate() {
                        if operator.ap < room.duty_cost {
                            continue;
                        }
                        let duration = operator.duty_seconds(room.duty_cost, horizon_seconds);
                        if duration <= 0.0 {
                            continue;
                        }
                        let orders = duration / room.produce_seconds
                            * (1.0 + operator.trading_bonus + room.speed_bonus)
                            * params.labor_speed;
                        let variable = model.add_variable(
                            format!("x{}_{}_{}", operator_index, room.id, strategy.code()),
                            orders * strategy_unit_value(strategy),
                        );
                        map.roles.push(VariableRole::Assign {
                            operator: operator_index,
                            room: room_index,
                            strategy: Some(strategy),
                        });
                        // An operator works under a strategy only when the
                        // room has committed to it.
                        model.add_constraint(
                            format!("link{}_{}_{}", operator_index, room.id, strategy.code()),
                            vec![(variable, 1.0), (gate, -1.0)],
                            0.0,
                        );
                        capacity_terms.push((variable, 1.0));
                        output_terms.push((variable, orders));
                        duties_per_operator[operator_index].push((variable, 1.0));
                    }
                }
                model.add_constraint(format!("strategy_{}", room.id), gate_terms, 1.0);
            }
        }

        model.add_constraint(
            format!("cap_{}", room.id),
            capacity_terms,
            f64::from(room.capacity),
        );
        model.add_constraint(format!("out_{}", room.id), output_terms, room.output_cap);
    }

    for (operator_index, terms) in duties_per_operator.into_iter().enumerate() {
        if !terms.is_empty() {
            model.add_constraint(format!("op{operator_index}"), terms, 1.0);
        }
    }

    (model, map)
}
