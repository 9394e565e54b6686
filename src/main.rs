//! Tank Souls headless runner
//!
//! Plays one level with a scripted pilot and reports the result. Usage:
//!
//! ```text
//! tank-souls [level] [max_ticks] [seed]
//! ```
//!
//! Set `RUST_LOG=debug` to follow spawns, boss phases and bite states.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tank Souls (headless) starting...");

    if let Err(e) = native::run(std::env::args().skip(1).collect()) {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts drive `tank_souls::sim::tick` directly
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;

    use tank_souls::Settings;
    use tank_souls::consts::TICKS_PER_SECOND;
    use tank_souls::sim::{
        Direction, DirectionStack, GameEvent, GameState, LevelOutcome, TickInput, rng, tick,
    };

    /// Movement script: (direction, ticks to hold it)
    const ROUTE: [(Direction, u32); 6] = [
        (Direction::Up, 90),
        (Direction::Left, 40),
        (Direction::Up, 60),
        (Direction::Right, 80),
        (Direction::Down, 50),
        (Direction::Left, 40),
    ];

    fn arg<T: std::str::FromStr>(args: &[String], index: usize, default: T) -> Result<T, String> {
        match args.get(index) {
            None => Ok(default),
            Some(raw) => raw
                .parse()
                .map_err(|_| format!("argument {} ({:?}) is not a valid number", index + 1, raw)),
        }
    }

    pub fn run(args: Vec<String>) -> Result<(), Box<dyn Error>> {
        let level: u32 = arg(&args, 0, 1)?;
        let max_ticks: u64 = arg(&args, 1, 60 * u64::from(TICKS_PER_SECOND))?;
        let seed: Option<u64> = args.get(2).map(|s| s.parse()).transpose()?;

        let settings = Settings {
            heal_unlocked: true,
            unlocked_level: level.clamp(1, 4),
            ..Settings::default()
        };
        let source = match seed {
            Some(seed) => rng::seeded(seed),
            None => rng::from_entropy(),
        };
        let mut state = GameState::with_rng(level, settings, source)?;

        let mut keys = DirectionStack::default();
        let mut leg = 0;
        let mut held_for = 0;
        keys.press(ROUTE[0].0);

        let mut kills = 0u32;
        let mut hits_taken = 0u32;

        while state.outcome() == LevelOutcome::Playing && state.time_ticks < max_ticks {
            held_for += 1;
            if held_for >= ROUTE[leg].1 {
                keys.release(ROUTE[leg].0);
                leg = (leg + 1) % ROUTE.len();
                held_for = 0;
                keys.press(ROUTE[leg].0);
            }

            let input = TickInput {
                move_dir: keys.current(),
                fire: true,
                heal: state.player_hp() <= 1.0,
                ..TickInput::default()
            };
            tick(&mut state, &input)?;

            for event in state.drain_events() {
                match event {
                    GameEvent::EnemyDestroyed | GameEvent::BossDefeated { .. } => kills += 1,
                    GameEvent::PlayerHurt { .. } | GameEvent::PlayerKilled => hits_taken += 1,
                    GameEvent::MedusaPhaseChanged { phase } => {
                        log::info!("Medusa entered phase {}", phase)
                    }
                    _ => {}
                }
            }
        }

        let seconds = state.time_ticks as f32 / TICKS_PER_SECOND as f32;
        println!("Level {}: {:?} after {:.1}s", level, state.outcome(), seconds);
        println!(
            "  score {}  kills {}  hits taken {}  hp {}  enemies remaining {}",
            state.score,
            kills,
            hits_taken,
            state.player_hp(),
            state.enemies_remaining()
        );
        println!("  unlocked level {}", state.settings.unlocked_level);
        Ok(())
    }
}
