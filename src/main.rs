use tracing::info;
use tracing_subscriber::EnvFilter;

use agar_engine::game::constants::timing;
use agar_engine::game::persistence;
use agar_engine::{Engine, GameConfig, HungryBot};

/// Ticks between leaderboard reports
const REPORT_INTERVAL: u32 = 300;

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Agar Engine v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = GameConfig::load_or_default();
    config.validate()?;
    info!(
        "Configuration loaded: {}x{} arena, {} pellets, {} viruses, seed={}",
        config.arena_width,
        config.arena_height,
        config.target_pellets,
        config.target_viruses,
        config.seed
    );

    let bot_count: u32 = env_or("BOT_COUNT", 8);
    let total_ticks: u32 = env_or("TICKS", 3000);

    let mut engine = Engine::new(config)?;
    for i in 0..bot_count {
        engine.add_bot(format!("bot-{}", i), Box::new(HungryBot));
    }

    let mut remaining = total_ticks;
    while remaining > 0 {
        let chunk = remaining.min(REPORT_INTERVAL);
        engine.step(chunk, timing::DT);
        remaining -= chunk;

        let leader = engine.leaderboard().first().copied();
        if let Some((id, mass)) = leader {
            let name = &engine.player(id)?.name;
            info!(
                tick = engine.ticks(),
                leader = %name,
                mass,
                pellets = engine.pellet_count(),
                viruses = engine.virus_count(),
                "progress"
            );
        }
    }

    for (rank, (id, mass)) in engine.leaderboard().into_iter().enumerate() {
        let player = engine.player(id)?;
        info!(
            "#{} {} mass={} highest={} food={} cells={} viruses={}",
            rank + 1,
            player.name,
            mass,
            player.stats.highest_mass,
            player.stats.food_eaten,
            player.stats.cells_eaten,
            player.stats.viruses_eaten
        );
    }

    if let Ok(path) = std::env::var("SNAPSHOT_PATH") {
        persistence::save(engine.game_state(), &path)?;
        info!("Snapshot written to {}", path);
    }

    Ok(())
}

/// Parse an environment variable, falling back to `default`
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
