use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use td_core::{Game, UserProfile};
use td_server::{GameSessionService, InMemoryScoreStore, InMemoryTransport, ServerConfig};
use td_sim::factory::CONFIG_PATH;
use td_sim::tower::tower_id_to_u64;
use td_sim::{
    GameSession, JsonResourceProvider, Point, ResourceProvider, SessionFactory, TdConfig, TdEvent,
};
use td_types::SessionSnapshot;
use tracing_subscriber::EnvFilter;

const TICK: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "headless-runner")]
#[command(about = "Run a tower-defense session without any network")]
struct Args {
    /// Directory holding maps, catalogs and config
    #[arg(long, default_value = "resources")]
    resources: PathBuf,

    /// Base seed for wave generation
    #[arg(long, default_value = "12345")]
    seed: u64,

    /// Maximum number of ticks to simulate
    #[arg(long, default_value = "6000")]
    ticks: u64,

    /// Number of players in the session
    #[arg(long, default_value = "2")]
    players: u64,

    /// Drive the session through the registry and executor at wall-clock pace
    #[arg(long, short)]
    realtime: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let resources = JsonResourceProvider::new(&args.resources);
    let mut config = match resources.load_resource::<TdConfig>(CONFIG_PATH) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(error = %err, "using default session config");
            TdConfig::default()
        }
    };
    config.seed = args.seed;

    let factory = SessionFactory::load(&resources, config)
        .with_context(|| format!("loading resources from {}", args.resources.display()))?;
    let users: Vec<UserProfile> = (1..=args.players)
        .map(|id| UserProfile::new(id, format!("player{id}")))
        .collect();
    let mut session = factory.create_session_for_users(&users)?;

    let placed = place_towers(&mut session);
    println!("Placed {} towers", placed);

    if args.realtime {
        run_realtime(session, args.ticks).await
    } else {
        run_fast(session, args.ticks)
    }
}

/// Line the first path with towers, owners taking turns.
fn place_towers(session: &mut GameSession) -> usize {
    let Some(kind) = session.tower_catalog().first().map(|spec| spec.kind.clone()) else {
        return 0;
    };
    let Some(path) = session.map().path(0).cloned() else {
        return 0;
    };
    let owners: Vec<u64> = session.players().iter().map(|p| p.id).collect();

    let mut placed = 0;
    let mut along = 2.0;
    while along < path.length() {
        let p = path.point_at(along);
        let owner = owners[placed % owners.len()];
        match session.place_tower(owner, &kind, Point::new(p.x, p.y + 1.5)) {
            Ok(_) => placed += 1,
            Err(err) => tracing::debug!(error = %err, "tower not placed"),
        }
        along += 4.0;
    }
    placed
}

fn run_fast(mut session: GameSession, max_ticks: u64) -> anyhow::Result<()> {
    let mut all_events = Vec::new();

    for _ in 0..max_ticks {
        session.step(TICK)?;
        for event in session.last_events() {
            print_event(session.tick(), event);
        }
        all_events.extend_from_slice(session.last_events());
        if session.is_terminal().is_some() {
            break;
        }
    }

    println!("=== Tower Defense Simulation Complete ===");
    println!("Outcome: {:?}", session.is_terminal());
    print_snapshot(&session.snapshot());
    print_event_summary(&all_events);
    Ok(())
}

async fn run_realtime(session: GameSession, max_ticks: u64) -> anyhow::Result<()> {
    let transport = Arc::new(InMemoryTransport::<SessionSnapshot>::new());
    for player in session.players() {
        transport.connect(player.id);
    }
    let scores = Arc::new(InMemoryScoreStore::new());
    let service = Arc::new(GameSessionService::new(
        ServerConfig::default(),
        Arc::clone(&transport),
        Arc::clone(&scores),
    ));

    let player_ids: Vec<u64> = session.players().iter().map(|p| p.id).collect();
    service.start_game(session).await?;
    let handle = service
        .get_session_for_user(player_ids[0])
        .await
        .context("session vanished right after start")?;

    println!("=== Running in Real-Time Mode ({}ms step) ===", TICK.as_millis());
    println!("Press Ctrl+C to stop\n");

    let executor = service.spawn_executor();
    let deadline = TICK * u32::try_from(max_ticks).unwrap_or(u32::MAX);
    let started = tokio::time::Instant::now();
    while service.session_count().await > 0 && started.elapsed() < deadline {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let snapshot = handle.snapshot().await;
        println!(
            "  [{:>5.1}s] Wave {}, Monsters: {}, Towers: {}, Leaks: {}/{}",
            snapshot.elapsed_ms as f64 / 1000.0,
            snapshot.wave,
            snapshot.monsters.len(),
            snapshot.towers.len(),
            snapshot.leaks,
            snapshot.max_leaks
        );
    }

    executor.shutdown().await;
    service.shutdown().await;

    println!("\n=== Tower Defense Simulation Complete ===");
    println!("Outcome: {:?}", handle.lock().await.is_terminal());
    print_snapshot(&handle.snapshot().await);
    for player in player_ids {
        println!(
            "Stored score for player {}: {}",
            player,
            scores.total(player).unwrap_or(0)
        );
    }
    Ok(())
}

fn print_event(tick: u64, event: &TdEvent) {
    match event {
        TdEvent::TowerPlaced { id, owner } => println!(
            "[{:>6}] Tower {} placed by player {}",
            tick,
            tower_id_to_u64(*id),
            owner
        ),
        TdEvent::MonsterSpawned { id, path } => {
            println!("[{:>6}] Monster {} spawned on path {}", tick, id.0, path)
        }
        TdEvent::MonsterKilled {
            id,
            owner,
            reward,
            ..
        } => println!(
            "[{:>6}] Monster {} killed, +{} for player {}",
            tick, id.0, reward, owner
        ),
        TdEvent::MonsterEscaped { id } => println!("[{:>6}] Monster {} escaped!", tick, id.0),
        TdEvent::WaveStarted { wave } => println!("[{:>6}] === Wave {} started ===", tick, wave),
        TdEvent::WaveCleared { wave } => println!("[{:>6}] === Wave {} cleared ===", tick, wave),
    }
}

fn print_snapshot(snapshot: &SessionSnapshot) {
    println!("Final tick: {}", snapshot.tick);
    println!("Current wave: {}", snapshot.wave);
    println!("Leaks: {}/{}", snapshot.leaks, snapshot.max_leaks);
    println!("Towers: {}", snapshot.towers.len());
    println!("Monsters remaining: {}", snapshot.monsters.len());
    for player in &snapshot.players {
        println!("  {} ({}): {}", player.name, player.class, player.score);
    }
}

fn print_event_summary(events: &[TdEvent]) {
    let mut monsters_spawned = 0;
    let mut monsters_killed = 0;
    let mut monsters_escaped = 0;
    let mut waves_cleared = 0;

    for event in events {
        match event {
            TdEvent::MonsterSpawned { .. } => monsters_spawned += 1,
            TdEvent::MonsterKilled { .. } => monsters_killed += 1,
            TdEvent::MonsterEscaped { .. } => monsters_escaped += 1,
            TdEvent::WaveCleared { .. } => waves_cleared += 1,
            TdEvent::TowerPlaced { .. } | TdEvent::WaveStarted { .. } => {}
        }
    }

    println!("\n=== Event Summary ===");
    println!("Monsters spawned: {}", monsters_spawned);
    println!("Monsters killed: {}", monsters_killed);
    println!("Monsters escaped: {}", monsters_escaped);
    println!("Waves cleared: {}", waves_cleared);
}
