use foreman::data::{OrderStrategy, PlayerDataError, PlayerState, RoomState};

fn player_json() -> &'static str {
    r#"{
        "status": { "labor": { "buffSpeed": 1.05, "value": 78, "maxValue": 99, "ProcessPoint": 0.5 } },
        "chars": {
            "1": { "charId": "char_0001", "roomSlotId": "slot_m1", "lastApAddTime": 1600000000,
                   "ap": 8640, "index": 3, "changeScale": 12, "workTime": 7200,
                   "evolvePhase": 2, "level": 30 },
            "2": { "charId": "char_0002", "ap": 24, "index": 4,
                   "buffs": ["trade_ord_spd[000]"] }
        },
        "rooms": {
            "MANUFACTURE": {
                "slot_m1": { "state": 1, "formulaId": "4", "remainSolutionCnt": 73,
                             "outputSolutionCnt": 2, "capacity": 24, "apCost": 1, "processPoint": 0.25,
                             "lastUpdateTime": 1600000100, "completeWorkTime": 1600007300 }
            },
            "TRADING": {
                "slot_t1": { "buff": { "speed": 1.15, "limit": 2 }, "state": 2,
                             "stockLimit": 6, "display": { "base": 0, "buff": 1 },
                             "strategy": "O_DIAMOND" }
            }
        }
    }"#
}

#[test]
fn parses_every_documented_field() {
    let state = PlayerState::parse(player_json()).expect("player document should parse");

    assert_eq!(state.status.labor.value, 78);
    assert_eq!(state.status.labor.max_value, 99);
    assert!((state.status.labor.buff_speed - 1.05).abs() < 1e-12);

    let worker = &state.chars["1"];
    assert_eq!(worker.char_id, "char_0001");
    assert_eq!(worker.room_slot_id, "slot_m1");
    assert_eq!(worker.last_ap_add_time, 1_600_000_000);
    assert_eq!(worker.ap, 8640);
    assert_eq!(worker.index, 3);
    assert_eq!(worker.change_scale, 12);
    assert_eq!(worker.work_time, 7200);
    assert_eq!(worker.level, Some(30));

    let trader = &state.chars["2"];
    assert_eq!(trader.room_slot_id, "");
    assert_eq!(trader.evolve_phase, None);
    assert_eq!(trader.buffs, vec!["trade_ord_spd[000]".to_string()]);

    let manufacture = &state.rooms.manufacture["slot_m1"];
    assert_eq!(manufacture.state, RoomState::Working);
    assert_eq!(manufacture.formula_id, "4");
    assert_eq!(manufacture.remain_solution_cnt, 73);
    assert_eq!(manufacture.output_solution_cnt, 2);
    assert_eq!(manufacture.capacity, 24);
    assert_eq!(manufacture.ap_cost, 1);
    assert_eq!(manufacture.complete_work_time, 1_600_007_300);

    let trading = &state.rooms.trading["slot_t1"];
    assert_eq!(trading.state, RoomState::Complete);
    assert_eq!(trading.stock_limit, 6);
    assert_eq!(trading.buff.limit, 2);
    assert_eq!(trading.display.buff, 1);
    assert_eq!(trading.order_strategy, OrderStrategy::Orundum);
}

#[test]
fn room_state_serializes_back_and_reparses_identically() {
    let state = PlayerState::parse(player_json()).expect("player document should parse");

    let manufacture = &state.rooms.manufacture["slot_m1"];
    let serialized = serde_json::to_string(manufacture).expect("manufacture should serialize");
    let reparsed: foreman::data::ManufactureRoom =
        serde_json::from_str(&serialized).expect("serialized manufacture should reparse");
    assert_eq!(manufacture, &reparsed);

    let trading = &state.rooms.trading["slot_t1"];
    let serialized = serde_json::to_string(trading).expect("trading should serialize");
    assert!(serialized.contains("\"strategy\":\"O_DIAMOND\""));
    let reparsed: foreman::data::TradingRoom =
        serde_json::from_str(&serialized).expect("serialized trading should reparse");
    assert_eq!(trading, &reparsed);

    // The whole document round-trips as well.
    let serialized = serde_json::to_string(&state).expect("player state should serialize");
    let reparsed: PlayerState =
        serde_json::from_str(&serialized).expect("serialized state should reparse");
    assert_eq!(state, reparsed);
}

#[test]
fn unknown_order_strategy_fails_the_record_with_a_typed_error() {
    let bad = player_json().replace("O_DIAMOND", "O_PLUTONIUM");
    let err = PlayerState::parse(&bad).expect_err("unknown strategy must fail the parse");
    assert!(matches!(err, PlayerDataError::Parse(_)));
    assert!(err
        .to_string()
        .contains("unrecognized trading order strategy 'O_PLUTONIUM'"));
}

#[test]
fn unknown_room_state_fails_the_record() {
    let bad = player_json().replace("\"state\": 2", "\"state\": 250");
    let err = PlayerState::parse(&bad).expect_err("unknown room state must fail the parse");
    assert!(err.to_string().contains("unrecognized room state: 250"));
}

#[test]
fn missing_required_sections_are_parse_errors() {
    assert!(PlayerState::parse("{}").is_err());
    assert!(PlayerState::parse("{\"status\":{\"labor\":{}}}").is_err());
    assert!(PlayerState::parse("not json").is_err());
}
