//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use duel_ccg::{CardRegistry, EngineConfig, PlayerId, SharedCatalog, TurnStateMachine};
use tracing_subscriber::EnvFilter;

/// A small catalog covering every ability kind.
pub const CARDS_JSON: &str = r#"[
    { "id": 1, "name": "Squire",      "cost": 1, "power": 1 },
    { "id": 2, "name": "Pickpocket",  "cost": 1, "power": 0, "ability": { "type": "StealPoints", "value": 2 } },
    { "id": 3, "name": "Saboteur",    "cost": 2, "power": 1, "ability": { "type": "DestroyOpponentCardInPlay", "value": 1 } },
    { "id": 4, "name": "Scholar",     "cost": 2, "power": 1, "ability": { "type": "DrawExtraCard", "value": 1 } },
    { "id": 5, "name": "Thief",       "cost": 3, "power": 2, "ability": { "type": "DiscardOpponentRandomCard", "value": 1 } },
    { "id": 6, "name": "Champion",    "cost": 4, "power": 3, "ability": { "type": "DoublePower", "value": 2 } },
    { "id": 7, "name": "Patron",      "cost": 3, "power": 1, "ability": { "type": "GainPoints", "value": 3 } },
    { "id": 8, "name": "Colossus",    "cost": 6, "power": 9 }
]"#;

/// Route engine logs to the test harness. Set `RUST_LOG` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn catalog() -> SharedCatalog {
    Arc::new(CardRegistry::from_json_str(CARDS_JSON).expect("bundled test catalog parses"))
}

pub fn host() -> PlayerId {
    PlayerId::new("host")
}

pub fn guest() -> PlayerId {
    PlayerId::new("guest")
}

pub fn players() -> Vec<PlayerId> {
    vec![host(), guest()]
}

pub fn started(config: EngineConfig) -> TurnStateMachine {
    init_tracing();
    let mut machine = TurnStateMachine::new(config, catalog()).expect("valid config");
    machine.start_game(&players()).expect("game starts");
    machine
}
