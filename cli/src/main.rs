use anyhow::bail;
use clap::{Parser, Subcommand};
use engine::api::{load_sheet, SheetConfig};
use engine::{
    evaluate, Characteristic, Dice, DiceCount, DiceFormula, EffectRollResult, Hero,
    PhaseSchedule, Roll,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Subcommand)]
enum PhasesCmd {
    /// Pack six slot flags (000100 or 0,0,0,1,0,0) into a mask
    Encode {
        /// Slot flags, most significant first
        flags: String,
    },
    /// Unpack a mask (0-63) into its six slot flags
    Decode {
        #[arg(allow_negative_numbers = true)]
        mask: i64,
    },
}

#[derive(Subcommand)]
enum Cmd {
    /// Roll an effect roll: N d6 read as a sum and on the effect scale
    Effect {
        /// RNG seed for determinism
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Number of dice; anything below 1 rolls a single die
        #[arg(long, default_value = "3", allow_hyphen_values = true)]
        count: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Roll a dice formula such as 3d6, 2d6+1 or 4d6kh3
    Roll {
        /// RNG seed for determinism
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// The formula to roll
        formula: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load a hero sheet, resolve its combat record and print it as JSON
    Resolve {
        /// Hero sheet (.json, otherwise YAML)
        #[arg(long, conflicts_with = "id")]
        file: Option<PathBuf>,
        /// Built-in hero id
        #[arg(long, default_value = "sample_hero")]
        id: String,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Print a freshly created hero as JSON
    HeroDump {
        #[arg(long, default_value = "New Hero")]
        name: String,
        /// Resolve derived combat stats before printing
        #[arg(long)]
        resolve: bool,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Effect roll of a hero's rolled characteristic (strength or presence)
    Characteristic {
        /// Hero sheet (.json, otherwise YAML)
        #[arg(long, conflicts_with = "id")]
        file: Option<PathBuf>,
        /// Built-in hero id
        #[arg(long, default_value = "sample_hero")]
        id: String,
        /// Characteristic to roll
        #[arg(long, default_value = "strength")]
        name: String,
        /// RNG seed for determinism
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Encode or decode the six-slot phase mask
    Phases {
        #[command(subcommand)]
        cmd: PhasesCmd,
    },
}

#[derive(Parser)]
#[command(name = "champions")]
#[command(about = "Champions Now rules harness")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Serialize)]
struct RollReport<'a> {
    roll: &'a Roll,
    effect: EffectRollResult,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Effect { seed, count, json } => {
            let count: DiceCount = count.parse()?;
            let mut dice = Dice::from_seed(seed);
            let res = evaluate(&mut dice, count);
            if json {
                println!("{}", serde_json::to_string_pretty(&res)?);
            } else {
                println!("{}", res);
            }
        }
        Cmd::Roll {
            seed,
            formula,
            json,
        } => {
            let formula: DiceFormula = formula.parse()?;
            let mut dice = Dice::from_seed(seed);
            let roll = formula.roll(&mut dice);
            let effect = EffectRollResult::from_roll(&roll);
            if json {
                let report = RollReport {
                    roll: &roll,
                    effect,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", roll);
                if !effect.raw_faces().is_empty() {
                    println!("effect {}", effect.effect_total());
                }
            }
        }
        Cmd::Resolve { file, id, compact } => {
            let hero = load_hero(file.as_deref(), &id)?;
            print_json(&hero, compact)?;
        }
        Cmd::HeroDump {
            name,
            resolve,
            compact,
        } => {
            let mut hero = Hero::new(name);
            if resolve {
                hero.prepare_derived()?;
            }
            print_json(&hero, compact)?;
        }
        Cmd::Characteristic {
            file,
            id,
            name,
            seed,
        } => {
            let hero = load_hero(file.as_deref(), &id)?;
            let characteristic: Characteristic = name.parse()?;
            let mut dice = Dice::from_seed(seed);
            let res = hero.roll_characteristic(&mut dice, characteristic)?;
            println!("{} {}: {}", hero.name, characteristic, res);
        }
        Cmd::Phases { cmd } => match cmd {
            PhasesCmd::Encode { flags } => {
                let flags = parse_flags(&flags)?;
                let schedule = PhaseSchedule::try_from(flags.as_slice())?;
                println!("{}", schedule.mask());
            }
            PhasesCmd::Decode { mask } => {
                let schedule = PhaseSchedule::from_mask(mask)?;
                let bits: String = schedule
                    .flags()
                    .iter()
                    .map(|&on| if on { '1' } else { '0' })
                    .collect();
                println!("{}", bits);
            }
        },
    }
    Ok(())
}

fn print_json(hero: &Hero, compact: bool) -> anyhow::Result<()> {
    if compact {
        println!("{}", serde_json::to_string(hero)?);
    } else {
        println!("{}", serde_json::to_string_pretty(hero)?);
    }
    Ok(())
}

fn load_hero(file: Option<&Path>, id: &str) -> anyhow::Result<Hero> {
    let cfg = match file {
        Some(path) => SheetConfig {
            hero_path: Some(path.to_string_lossy().into_owned()),
            ..SheetConfig::default()
        },
        None => SheetConfig {
            hero_id: Some(id.to_string()),
            ..SheetConfig::default()
        },
    };
    load_sheet(cfg)
}

fn parse_flags(s: &str) -> anyhow::Result<Vec<bool>> {
    let tokens: Vec<String> = if s.contains([',', ' ']) {
        s.split([',', ' '])
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect()
    } else {
        s.chars().map(String::from).collect()
    };
    tokens
        .iter()
        .map(|t| match t.as_str() {
            "1" | "true" => Ok(true),
            "0" | "false" => Ok(false),
            other => bail!("invalid phase flag '{}'", other),
        })
        .collect()
}
