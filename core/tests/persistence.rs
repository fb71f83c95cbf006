//! Snapshot persistence — round-trips, the lenient load policy, and
//! reset purging the store.

use tapharvest_core::{
    clock::FixedClock,
    engine::GameEngine,
    repository::{GameRepository, MemoryRepository, SqliteRepository, SAVE_KEY},
    state::GameState,
    store::SaveStore,
};

const T0: i64 = 1_700_000_000_000;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn engine_over(repo: MemoryRepository, now: i64) -> GameEngine {
    GameEngine::initialize(Box::new(repo), Box::new(FixedClock::at(now))).expect("initialize")
}

#[test]
fn round_trip_preserves_every_field_modulo_last_saved() {
    init_logging();
    let repo = MemoryRepository::new();

    let saved = {
        let mut engine = engine_over(repo.clone(), T0);
        for _ in 0..20 {
            engine.click();
        }
        assert!(engine.buy_upgrade("basic_miner").purchased());
        engine.persist().expect("persist");
        engine.state().clone()
    };

    // Reload 3 s later — inside the offline threshold, so only the
    // timestamp may differ.
    let reloaded = engine_over(repo, T0 + 3_000);
    let mut expected = saved;
    expected.last_saved = T0 + 3_000;
    assert_eq!(reloaded.state(), &expected);
}

#[test]
fn original_browser_save_loads_unchanged() {
    init_logging();
    // Verbatim layout of a save written by the browser build.
    let fixture = format!(
        r#"{{"tokens":42.5,"tokensPerClick":3.0,"tokensPerSecond":0.2,
            "totalTokensEarned":512.0,"clicks":77,"lastSaved":{},
            "upgrades":[
              {{"id":"click_power","name":"Better Mouse","description":"Earn more tokens per click",
                "baseCost":10.0,"cost":13.0,"level":2,"effect":1.0,"type":"click"}},
              {{"id":"basic_miner","name":"Basic Miner","description":"A simple mining rig that earns tokens automatically",
                "baseCost":15.0,"cost":19.0,"level":2,"effect":0.1,"type":"passive"}}
            ]}}"#,
        T0
    );

    let store = SaveStore::in_memory().expect("in-memory store");
    store.set(SAVE_KEY, &fixture).expect("seed save");

    let engine = GameEngine::initialize(
        Box::new(SqliteRepository::new(store)),
        Box::new(FixedClock::at(T0 + 1_000)),
    )
    .expect("initialize");

    let state = engine.state();
    assert!((state.tokens - 42.5).abs() < 1e-9);
    assert!((state.tokens_per_click - 3.0).abs() < 1e-9);
    assert_eq!(state.clicks, 77);
    assert_eq!(state.upgrades.len(), 2);
    assert_eq!(state.upgrade("click_power").expect("entry").level, 2);
    assert_eq!(state.upgrade("basic_miner").expect("entry").max_level, None);
}

#[test]
fn unknown_fields_are_ignored() {
    init_logging();
    let fixture = format!(
        r#"{{"tokens":100.0,"tokensPerClick":1.0,"tokensPerSecond":0.0,
            "totalTokensEarned":100.0,"clicks":100,"lastSaved":{},
            "upgrades":[],"walletAddress":"0x07d36857d6A48841193c131e735B24ADe93bDa37"}}"#,
        T0
    );

    let store = SaveStore::in_memory().expect("in-memory store");
    store.set(SAVE_KEY, &fixture).expect("seed save");

    let engine = GameEngine::initialize(
        Box::new(SqliteRepository::new(store)),
        Box::new(FixedClock::at(T0 + 1_000)),
    )
    .expect("initialize");

    assert!((engine.state().tokens - 100.0).abs() < 1e-9);
    assert!(engine.state().upgrades.is_empty());
}

#[test]
fn missing_fields_fall_back_to_catalog_defaults() {
    init_logging();
    let store = SaveStore::in_memory().expect("in-memory store");
    store
        .set(SAVE_KEY, r#"{"tokens":50.0}"#)
        .expect("seed save");

    let engine = GameEngine::initialize(
        Box::new(SqliteRepository::new(store)),
        Box::new(FixedClock::at(T0)),
    )
    .expect("initialize");

    let state = engine.state();
    assert!((state.tokens - 50.0).abs() < 1e-9);
    assert_eq!(state.clicks, 0);
    assert!((state.tokens_per_click - 1.0).abs() < 1e-9);
    assert_eq!(state.upgrades.len(), 5, "catalog defaults fill the gap");
    assert_eq!(state.upgrade("click_power").expect("entry").level, 1);
}

#[test]
fn corrupt_save_is_discarded_and_removed() {
    init_logging();
    // Shared-cache URI so a probe connection can watch the same
    // in-memory database.
    let uri = "file:corrupt_save_test?mode=memory&cache=shared";
    let store = SaveStore::open(uri).expect("open store");
    let probe = SaveStore::open(uri).expect("open probe");
    store.set(SAVE_KEY, "{ this is not json").expect("seed junk");

    let engine = GameEngine::initialize(
        Box::new(SqliteRepository::new(store)),
        Box::new(FixedClock::at(T0)),
    )
    .expect("initialize must not fail on junk");

    let mut expected = GameState::default();
    expected.last_saved = T0;
    assert_eq!(engine.state(), &expected, "junk save yields a fresh game");
    assert_eq!(
        probe.get(SAVE_KEY).expect("probe read"),
        None,
        "the unreadable snapshot is removed"
    );
}

#[test]
fn reset_purges_the_snapshot_and_restores_defaults() {
    init_logging();
    let repo = MemoryRepository::new();
    let mut engine = engine_over(repo.clone(), T0);

    for _ in 0..20 {
        engine.click();
    }
    assert!(engine.buy_upgrade("basic_miner").purchased());
    engine.persist().expect("persist");
    assert!(repo.load().expect("load").is_some());

    engine.reset().expect("reset");

    let mut expected = GameState::default();
    expected.last_saved = T0;
    assert_eq!(engine.state(), &expected);
    assert!(
        repo.load().expect("load").is_none(),
        "reset must purge the persisted snapshot"
    );
}

#[test]
fn each_persist_overwrites_the_previous_snapshot() {
    init_logging();
    let repo = MemoryRepository::new();
    let mut engine = engine_over(repo.clone(), T0);

    engine.click();
    engine.persist().expect("first persist");
    engine.click();
    engine.persist().expect("second persist");

    let reloaded = repo.load().expect("load").expect("snapshot present");
    assert_eq!(reloaded.clicks, 2, "last writer wins");
}
