//! game-runner: headless driver for the Tap Harvest progression engine.
//!
//! Usage:
//!   game-runner --db save.db --ticks 600 --clicks 25
//!   game-runner --db save.db --ipc-mode
//!   game-runner --catalog balance/experiment.json --ticks 3600
//!
//! Fast-forward mode applies the requested clicks and ticks back to
//! back and prints an end-of-run summary. IPC mode reads one JSON
//! command per stdin line and answers each with the state snapshot,
//! while a ticker thread runs the real cadences (tick every 100 ms,
//! autosave every 10 s); both sides lock the same engine mutex, so
//! tick, autosave, and commands never interleave partially.

use anyhow::Result;
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tapharvest_core::{
    catalog,
    clock::{Clock, SystemClock, AUTOSAVE_INTERVAL_MS, TICK_INTERVAL_MS},
    command::PlayerCommand,
    engine::GameEngine,
    repository::SqliteRepository,
    state::{GameState, UpgradeKind},
    store::SaveStore,
    types::Millis,
};

/// Standalone last-seen timestamp for the welcome-back summary. Kept
/// deliberately separate from the snapshot's own `lastSaved`; the two
/// are not reconciled.
const LAST_SEEN_KEY: &str = "btc-clicker-lastSeen";

/// Away time at or below this gets no welcome-back summary.
const WELCOME_BACK_THRESHOLD_MS: Millis = 60_000;

/// Wire commands accepted on stdin, one JSON object per line.
#[derive(serde::Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Click,
    BuyUpgrade { id: String },
    Reset,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ticks = parse_arg(&args, "--ticks", 0u64);
    let clicks = parse_arg(&args, "--clicks", 0u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or("tapharvest.db");
    let catalog_path = args
        .windows(2)
        .find(|w| w[0] == "--catalog")
        .map(|w| w[1].clone());

    let upgrades = match &catalog_path {
        Some(path) => catalog::load_catalog_file(path)?,
        None => catalog::default_upgrades(),
    };

    let now = SystemClock.now_millis();
    let store = SaveStore::open(db)?;
    let engine = GameEngine::with_catalog(
        Box::new(SqliteRepository::new(store)),
        Box::new(SystemClock),
        upgrades,
    )?;

    // The last-seen key lives beside the snapshot but belongs to the
    // presentation layer, so it gets its own connection.
    let seen_store = SaveStore::open(db)?;
    welcome_back(&seen_store, &engine, now)?;
    seen_store.set(LAST_SEEN_KEY, &now.to_string())?;

    if ipc_mode {
        run_ipc_loop(engine)?;
    } else {
        run_fast_forward(engine, ticks, clicks)?;
    }

    Ok(())
}

/// Report how much the passive rigs produced while the player was
/// away, from the standalone last-seen timestamp. Reporting only — the
/// engine settles actual accrual against the snapshot's own timestamp.
fn welcome_back(store: &SaveStore, engine: &GameEngine, now: Millis) -> Result<()> {
    let Some(seen) = store.get(LAST_SEEN_KEY)? else {
        return Ok(());
    };
    let Ok(seen) = seen.parse::<Millis>() else {
        return Ok(());
    };
    let away_ms = now - seen;
    let per_second = engine.state().tokens_per_second;
    if away_ms > WELCOME_BACK_THRESHOLD_MS && per_second > 0.0 {
        let earned = (away_ms as f64 / 1000.0 * per_second).floor();
        if earned > 0.0 {
            println!("Welcome back! You earned {earned:.0} tokens while away.");
        }
    }
    Ok(())
}

fn run_fast_forward(mut engine: GameEngine, ticks: u64, clicks: u64) -> Result<()> {
    let ticks_per_save = AUTOSAVE_INTERVAL_MS / TICK_INTERVAL_MS;

    for _ in 0..clicks {
        engine.click();
    }
    for n in 0..ticks {
        engine.tick();
        // Same cadence ratio as real time: one autosave per hundred ticks.
        if (n + 1) % ticks_per_save == 0 {
            engine.persist()?;
        }
    }
    engine.persist()?;

    print_summary(engine.state(), ticks, clicks);
    Ok(())
}

fn run_ipc_loop(engine: GameEngine) -> Result<()> {
    let engine = Arc::new(Mutex::new(engine));
    let running = Arc::new(AtomicBool::new(true));

    let ticker = {
        let engine = Arc::clone(&engine);
        let running = Arc::clone(&running);
        thread::spawn(move || {
            let ticks_per_save = AUTOSAVE_INTERVAL_MS / TICK_INTERVAL_MS;
            let mut n: u64 = 0;
            while running.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_millis(TICK_INTERVAL_MS));
                let mut engine = engine.lock().expect("engine lock");
                engine.tick();
                n += 1;
                if n % ticks_per_save == 0 {
                    match engine.persist() {
                        Ok(()) => log::debug!("Autosaved after tick {n}"),
                        Err(e) => log::warn!("Autosave failed: {e}"),
                    }
                }
            }
        })
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cmd: IpcCommand = match serde_json::from_str(&line) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{err_json}")?;
                stdout.flush()?;
                continue;
            }
        };

        let mut locked = engine.lock().expect("engine lock");
        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {}
            IpcCommand::Click => locked.apply(&PlayerCommand::Click)?,
            IpcCommand::BuyUpgrade { id } => locked.apply(&PlayerCommand::BuyUpgrade { id })?,
            IpcCommand::Reset => locked.apply(&PlayerCommand::Reset)?,
        }
        writeln!(stdout, "{}", serde_json::to_string(locked.state())?)?;
        drop(locked);
        stdout.flush()?;
    }

    running.store(false, Ordering::Relaxed);
    let _ = ticker.join();
    engine.lock().expect("engine lock").persist()?;
    Ok(())
}

fn print_summary(state: &GameState, ticks: u64, clicks: u64) {
    println!("=== SESSION SUMMARY ===");
    println!("  ticks applied:   {ticks}");
    println!("  clicks applied:  {clicks}");
    println!("  tokens:          {:.1}", state.tokens);
    println!("  per click:       {:.1}", state.tokens_per_click);
    println!("  per second:      {:.1}", state.tokens_per_second);
    println!("  lifetime earned: {:.1}", state.total_tokens_earned);
    println!("  lifetime clicks: {}", state.clicks);
    println!();
    println!("=== UPGRADES ===");
    for u in &state.upgrades {
        let kind = match u.kind {
            UpgradeKind::Click => "click",
            UpgradeKind::Passive => "passive",
        };
        println!(
            "  {:<14} level {:<4} next cost {:>10.0}  ({kind})",
            u.id, u.level, u.cost
        );
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
