use foreman::data::{EvolvePhase, GameDataRegistry};

/// Two units: one with replacement inside a slot plus a second slot, one
/// with a single buff. Phases appear both as integers and PHASE_n strings.
fn registry() -> std::sync::Arc<GameDataRegistry> {
    GameDataRegistry::load(
        r#"{
            "chars": {
                "char_0001": {
                    "name": "Worker",
                    "appellation": "Wrk",
                    "buffChar": [
                        { "buffData": [
                            { "buffId": "manu_prod_spd[000]", "cond": { "phase": 0, "level": 1 } },
                            { "buffId": "manu_prod_spd[001]", "cond": { "phase": "PHASE_1", "level": 1 } }
                        ] },
                        { "buffData": [
                            { "buffId": "manu_prod_limit[000]", "cond": { "phase": 0, "level": 30 } }
                        ] }
                    ]
                },
                "char_0002": {
                    "name": "Trader",
                    "appellation": "Trd",
                    "buffChar": [
                        { "buffData": [
                            { "buffId": "trade_ord_spd[000]", "cond": { "phase": 0, "level": 1 } }
                        ] }
                    ]
                }
            },
            "buffs": {
                "manu_prod_spd[000]": { "buffName": "Production+15%", "display": { "base": 0, "buff": 15 } },
                "manu_prod_spd[001]": { "buffName": "Production+30%", "display": { "base": 0, "buff": 30 } },
                "manu_prod_limit[000]": { "buffName": "Capacity+10", "display": { "base": 0, "buff": 10 } },
                "trade_ord_spd[000]": { "buffName": "Order+20%", "display": { "base": 0, "buff": 20 } }
            }
        }"#,
    )
    .expect("fixture catalog should load")
}

#[test]
fn breakpoints_resolve_to_their_unlock_state() {
    let registry = registry();
    let skills = registry.skills();

    // First breakpoint: only the base production buff.
    let state = skills
        .resolve_single("manu_prod_spd[000]", None)
        .expect("single-buff entry");
    assert_eq!(state.char_id, "char_0001");

    // Mid-path breakpoint: base production buff + capacity buff.
    let state = skills
        .resolve_combination(&["manu_prod_spd[000]", "manu_prod_limit[000]"], None)
        .expect("mid-path combination");
    assert_eq!(state.char_id, "char_0001");
    assert_eq!(state.phase, EvolvePhase::Phase0);
    assert_eq!(state.level, 30);

    // Final breakpoint: the slot-0 buff was replaced by its upgrade.
    let state = skills
        .resolve_combination(&["manu_prod_spd[001]", "manu_prod_limit[000]"], None)
        .expect("final combination");
    assert_eq!(state.char_id, "char_0001");
    assert_eq!(state.phase, EvolvePhase::Phase1);
    assert_eq!(state.level, 1);

    // The pre-replacement pair never coexists.
    assert!(skills
        .resolve_combination(&["manu_prod_spd[000]", "manu_prod_spd[001]"], None)
        .is_none());
}

#[test]
fn resolution_is_order_independent() {
    let registry = registry();
    let skills = registry.skills();

    let forward = skills.resolve_combination(&["manu_prod_spd[001]", "manu_prod_limit[000]"], None);
    let backward = skills.resolve_combination(&["manu_prod_limit[000]", "manu_prod_spd[001]"], None);
    assert_eq!(forward, backward);
    assert!(forward.is_some());
}

#[test]
fn buff_names_and_unit_qualifiers_also_resolve() {
    let registry = registry();
    let skills = registry.skills();

    let by_names = skills
        .resolve_combination(&["Production+30%", "Capacity+10"], None)
        .expect("name-keyed combination");
    assert_eq!(by_names.char_id, "char_0001");

    let by_unit_id = skills
        .resolve_combination(
            &["manu_prod_spd[001]", "manu_prod_limit[000]"],
            Some("char_0001"),
        )
        .expect("unit-id qualified combination");
    let by_unit_name = skills
        .resolve_combination(
            &["manu_prod_spd[001]", "manu_prod_limit[000]"],
            Some("Worker"),
        )
        .expect("unit-name qualified combination");
    assert_eq!(by_unit_id, by_unit_name);

    // Qualifying by the wrong unit is a miss, not an error.
    assert!(skills
        .resolve_combination(
            &["manu_prod_spd[001]", "manu_prod_limit[000]"],
            Some("char_0002"),
        )
        .is_none());
}

#[test]
fn cross_unit_collisions_are_purged_but_qualified_entries_survive() {
    let registry = GameDataRegistry::load(
        r#"{
            "chars": {
                "char_a": {
                    "name": "First",
                    "buffChar": [
                        { "buffData": [ { "buffId": "manu_shared[000]", "cond": { "phase": 0, "level": 1 } } ] }
                    ]
                },
                "char_b": {
                    "name": "Second",
                    "buffChar": [
                        { "buffData": [ { "buffId": "manu_shared[000]", "cond": { "phase": 0, "level": 1 } } ] }
                    ]
                }
            },
            "buffs": {
                "manu_shared[000]": { "buffName": "Shared", "display": { "base": 0, "buff": 5 } }
            }
        }"#,
    )
    .expect("collision fixture should load");
    let skills = registry.skills();

    // Both units produce the same unqualified key with different states, so
    // the entry must be gone after cleanup.
    assert!(skills.resolve_single("manu_shared[000]", None).is_none());
    assert!(skills.resolve_combination(&["manu_shared[000]"], None).is_none());

    let first = skills
        .resolve_single("manu_shared[000]", Some("char_a"))
        .expect("qualified entry for char_a");
    assert_eq!(first.char_id, "char_a");
    let second = skills
        .resolve_single("manu_shared[000]", Some("char_b"))
        .expect("qualified entry for char_b");
    assert_eq!(second.char_id, "char_b");
}

#[test]
fn empty_and_unknown_queries_miss_without_panicking() {
    let registry = registry();
    let skills = registry.skills();

    assert!(skills.resolve_combination(&[], None).is_none());
    assert!(skills.resolve_combination(&[], Some("char_0001")).is_none());
    assert!(skills.resolve_single("", None).is_none());
    assert!(skills.resolve_single("no_such_buff", None).is_none());
    assert!(skills
        .resolve_combination(&["no_such_buff", "manu_prod_spd[000]"], None)
        .is_none());
}

#[test]
fn buff_name_lookup_surface_matches_the_catalog() {
    let registry = registry();
    let skills = registry.skills();

    assert!(skills.has_id("trade_ord_spd[000]"));
    assert!(skills.has_name("Order+20%"));
    assert_eq!(skills.name_to_id("Order+20%"), Some("trade_ord_spd[000]"));
    assert_eq!(skills.id_to_name("trade_ord_spd[000]"), Some("Order+20%"));
    assert!(!skills.has_id("Order+20%"));
    assert_eq!(skills.name_to_id("no such name"), None);
}
