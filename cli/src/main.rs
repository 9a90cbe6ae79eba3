mod bot;

use clap::{Parser, Subcommand};
use rand::Rng;

#[derive(Parser)]
#[command(name = "jiguso", version, about = "Headless driver for the jiguso puzzle engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scramble a board and auto-solve it through the drag surface
    Solve {
        #[arg(long, default_value_t = 6)]
        cols: u32,
        #[arg(long, default_value_t = 4)]
        rows: u32,
        #[arg(long, default_value_t = 100.0)]
        piece_width: f32,
        #[arg(long, default_value_t = 100.0)]
        piece_height: f32,
        /// Scramble seed (decimal or 0x-prefixed hex); random when omitted
        #[arg(long)]
        seed: Option<String>,
        /// Scramble the rotation of a few pieces too
        #[arg(long)]
        rotate: bool,
        /// Pointer samples per drag
        #[arg(long, default_value_t = 12)]
        drag_steps: u32,
        /// Drag budget before giving up; 0 derives one from the board size
        #[arg(long, default_value_t = 0)]
        max_drags: u32,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            cols,
            rows,
            piece_width,
            piece_height,
            seed,
            rotate,
            drag_steps,
            max_drags,
            json,
        } => {
            let seed = match seed.as_deref() {
                Some(raw) => parse_seed_arg(raw)?,
                None => rand::rng().random(),
            };
            let report = bot::run_solve(bot::SolveConfig {
                cols,
                rows,
                piece_width,
                piece_height,
                seed,
                rotate,
                drag_steps,
                max_drags,
            })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{} {} pieces in {} drags ({} moves, {} merges, {} ticks, {:.1}s play time, seed 0x{:08X})",
                    if report.solved { "solved" } else { "gave up on" },
                    report.pieces,
                    report.drags,
                    report.moves,
                    report.merges,
                    report.ticks,
                    report.play_time_secs,
                    report.seed,
                );
            }
        }
    }

    Ok(())
}

fn parse_seed_arg(raw: &str) -> Result<u32, Box<dyn std::error::Error>> {
    let trimmed = raw.trim();
    let value = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16)?
    } else {
        trimmed.parse::<u32>()?
    };
    Ok(value)
}
