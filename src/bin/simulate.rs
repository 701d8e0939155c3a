//! Duel simulator CLI.
//!
//! Resolve a single duel or predict a matchup's win rate from a JSON file.
//!
//! Usage:
//!   cargo run --bin simulate -- duel <matchup.json> [OPTIONS]
//!   cargo run --bin simulate -- predict <matchup.json> [OPTIONS]
//!
//! Examples:
//!   cargo run --bin simulate -- duel goblin_vs_ogre.json --seed 7 --events
//!   cargo run --bin simulate -- predict goblin_vs_ogre.json -n 1000 --seed 42
//!   RUST_LOG=debug cargo run --bin simulate -- predict goblin_vs_ogre.json --quick

use anyhow::{bail, Context, Result};
use mobduel::combat::{resolve_duel_with_events, CombatEvent, DuelError, Side};
use mobduel::simulator::{predict_win_rate, MatchupFile, SimConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::env;

#[derive(Debug)]
enum Command {
    Duel {
        seed: Option<u64>,
        show_events: bool,
    },
    Predict {
        config: SimConfig,
        save_json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let (command, path) = parse_args(&args)?;

    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read matchup file {}", path))?;
    let matchup = MatchupFile::from_json(&json)
        .map_err(log_setup_error)
        .with_context(|| format!("invalid matchup file {}", path))?;
    let registry = matchup.registry();

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              MOBDUEL SIMULATOR                                ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Matchup:");
    println!("  A: {} (id {})", label(&matchup.a.name, "A"), matchup.a.id);
    println!("  B: {} (id {})", label(&matchup.b.name, "B"), matchup.b.id);
    println!();

    match command {
        Command::Duel { seed, show_events } => {
            let mut rng = match seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            let (outcome, events) =
                resolve_duel_with_events(&matchup.a, &matchup.b, &registry, &mut rng)
                    .map_err(log_setup_error)?;

            if show_events {
                println!("── EVENTS ───────────────────────────────────────────────────────");
                for (i, event) in events.iter().enumerate() {
                    println!("  {:>4}  {}", i + 1, describe(event));
                }
                println!();
            }

            println!("── RESULT ───────────────────────────────────────────────────────");
            println!(
                "  Winner:       {} ({} HP left)",
                side_label(&matchup, outcome.winner),
                outcome.winner_hp()
            );
            println!("  Final HP:     A {} / B {}", outcome.final_hp[0], outcome.final_hp[1]);
            println!("  Resolutions:  {}", outcome.resolutions);
            if outcome.capped {
                println!("  ⚠️  Safety cap reached, decided on HP");
            }
        }
        Command::Predict { config, save_json } => {
            println!("Configuration:");
            println!("  Trials:         {}", config.trials);
            println!("  Max Resolutions:{:>6}", config.max_resolutions);
            if let Some(seed) = config.seed {
                println!("  Seed:           {}", seed);
            }
            println!();
            println!("Running prediction...");
            println!();

            let report = predict_win_rate(&matchup.a, &matchup.b, &registry, &config)
                .map_err(log_setup_error)?;
            println!("{}", report.to_text());

            if save_json {
                let filename = format!(
                    "prediction_{}.json",
                    chrono::Utc::now().format("%Y%m%d_%H%M%S")
                );
                std::fs::write(&filename, report.to_json())
                    .with_context(|| format!("failed to write {}", filename))?;
                println!("JSON report saved to: {}", filename);
            }
        }
    }

    Ok(())
}

fn parse_args(args: &[String]) -> Result<(Command, String)> {
    let Some(sub) = args.get(1) else {
        print_help();
        std::process::exit(0);
    };
    if sub == "-h" || sub == "--help" {
        print_help();
        std::process::exit(0);
    }
    let Some(path) = args.get(2).cloned() else {
        bail!("missing matchup file, see --help");
    };

    let mut seed: Option<u64> = None;
    let mut trials: Option<u32> = None;
    let mut cap: Option<u32> = None;
    let mut verbose = false;
    let mut show_events = false;
    let mut save_json = false;
    let mut config = SimConfig::default();

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            flag @ ("-s" | "--seed") => {
                seed = Some(flag_value(args, i, flag)?);
                i += 1;
            }
            flag @ ("-n" | "--trials") => {
                trials = Some(flag_value(args, i, flag)?);
                i += 1;
            }
            flag @ "--cap" => {
                cap = Some(flag_value(args, i, flag)?);
                i += 1;
            }
            "--events" => {
                show_events = true;
            }
            "--json" => {
                save_json = true;
            }
            "-v" | "--verbose" => {
                verbose = true;
            }
            "--quick" => {
                config = SimConfig::quick();
            }
            "--sweep" => {
                config = SimConfig::balance_sweep();
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                tracing::warn!(arg = other, "ignoring unknown argument");
            }
        }
        i += 1;
    }

    // Explicit flags win over presets regardless of order
    if let Some(trials) = trials {
        config.trials = trials;
    }
    if let Some(cap) = cap {
        config.max_resolutions = cap;
    }
    if verbose {
        config.verbosity = 2;
    }

    let command = match sub.as_str() {
        "duel" => Command::Duel { seed, show_events },
        "predict" => {
            if seed.is_some() {
                config.seed = seed;
            }
            Command::Predict { config, save_json }
        }
        other => bail!("unknown command '{}', expected 'duel' or 'predict'", other),
    };
    Ok((command, path))
}

/// Parse the value following `flag` at `args[i]`.
fn flag_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> Result<T> {
    let Some(raw) = args.get(i + 1) else {
        bail!("{} needs a value", flag);
    };
    match raw.parse() {
        Ok(value) => Ok(value),
        Err(_) => bail!("invalid value '{}' for {}", raw, flag),
    }
}

/// Log the error category before handing the error to anyhow.
fn log_setup_error(err: DuelError) -> DuelError {
    tracing::error!(kind = err.as_str(), "duel setup rejected: {}", err);
    err
}

fn label<'a>(name: &'a str, fallback: &'a str) -> &'a str {
    if name.is_empty() {
        fallback
    } else {
        name
    }
}

fn side_label(matchup: &MatchupFile, side: Side) -> String {
    let profile = match side {
        Side::A => &matchup.a,
        Side::B => &matchup.b,
    };
    format!("{} [{}]", label(&profile.name, "?"), side)
}

fn describe(event: &CombatEvent) -> String {
    match event {
        CombatEvent::TurnSkipped { side } => format!("{} is stunned and loses the turn", side),
        CombatEvent::WeaponDrawn { side, weapon } => format!("{} draws {}", side, weapon),
        CombatEvent::WeaponThrown {
            attacker,
            weapon,
            hit,
            damage,
        } => {
            if *hit {
                format!("{} throws {} for {}", attacker, weapon, damage)
            } else {
                format!("{} throws {} and misses", attacker, weapon)
            }
        }
        CombatEvent::Attack {
            attacker,
            defender,
            damage,
            crit,
            blocked,
        } => {
            let mut line = format!("{} hits {} for {}", attacker, defender, damage);
            if *crit {
                line.push_str(" (crit)");
            }
            if *blocked {
                line.push_str(" (blocked)");
            }
            line
        }
        CombatEvent::Dodge { attacker, defender } => {
            format!("{} dodges {}'s attack", defender, attacker)
        }
        CombatEvent::CounterAttack {
            attacker,
            defender,
            damage,
            trigger,
        } => format!(
            "{} counters {} for {} ({:?})",
            attacker, defender, damage, trigger
        ),
        CombatEvent::ShieldAbsorbed {
            side,
            absorbed,
            remaining,
        } => format!(
            "{}'s guardian absorbs {} ({} left)",
            side, absorbed, remaining
        ),
        CombatEvent::DamageReflected { from, to, damage } => {
            format!("{}'s thorns reflect {} to {}", from, damage, to)
        }
        CombatEvent::WeaponDropped { side, weapon } => format!("{} drops {}", side, weapon),
        CombatEvent::WeaponStolen { from, to, weapon } => {
            format!("{} steals {} from {}", to, weapon, from)
        }
        CombatEvent::Stunned { side } => format!("{} is stunned", side),
        CombatEvent::RageActivated { side } => format!("{} flies into a rage", side),
        CombatEvent::Blinded { side, stacks } => format!("{} is blinded ({})", side, stacks),
        CombatEvent::CompanionStrike {
            owner,
            companion,
            damage,
        } => format!("{}'s {} strikes for {}", owner, companion, damage),
        CombatEvent::Sabotage { owner, effect } => format!("{}'s saboteur: {:?}", owner, effect),
        CombatEvent::Death { side } => format!("{} falls", side),
    }
}

fn print_help() {
    println!("Mobduel Simulator");
    println!();
    println!("USAGE:");
    println!("    cargo run --bin simulate -- duel <matchup.json> [OPTIONS]");
    println!("    cargo run --bin simulate -- predict <matchup.json> [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -s, --seed <S>      Random seed for reproducibility");
    println!("    --events            (duel) Print every combat event");
    println!("    -n, --trials <N>    (predict) Number of trials (default: 200)");
    println!("    --cap <N>           (predict) Max resolutions per trial (default: 1000)");
    println!("    --json              (predict) Save JSON report");
    println!("    --quick             (predict) Quick run (50 trials)");
    println!("    --sweep             (predict) Balance sweep (5000 trials, seed 0)");
    println!("    -v, --verbose       Log every trial (with RUST_LOG=debug)");
    println!("    -h, --help          Show this help");
    println!();
    println!("MATCHUP FILE:");
    println!("    {{ \"a\": <profile>, \"b\": <profile>, \"registry\": <optional tables> }}");
}
