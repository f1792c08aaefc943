//! Tapis CLI - FIR/IIR Filter Bank
//!
//! Command-line interface for the Tapis filter bank.

use clap::Parser;
use env_logger::Env;
use log::{info, warn};

use tapis::cli::commands::{self, SweepOverrides};
use tapis::cli::{Cli, Commands};
use tapis::engine::ExportFormat;
use tapis::Result;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("Tapis v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => {
            let name = command_name(&cmd);
            handle_command(cmd)
                .map_err(|e| {
                    for suggestion in e.recovery_suggestions() {
                        warn!("  - {}", suggestion);
                    }
                    let code = e.error_code();
                    anyhow::Error::new(e).context(format!("'{}' failed [{}]", name, code))
                })
        }
        None => {
            println!("Tapis v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn command_name(cmd: &Commands) -> &'static str {
    match cmd {
        Commands::Sweep { .. } => "sweep",
        Commands::Fir { .. } => "fir",
        Commands::Iir { .. } => "iir",
        Commands::Inspect { .. } => "inspect",
    }
}

fn handle_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Sweep {
            input,
            output_dir,
            config,
            taps,
            order,
            low,
            high,
            reports,
        } => {
            let overrides = SweepOverrides {
                taps,
                order,
                low,
                high,
                reports,
            };
            commands::sweep(&input, &output_dir, config.as_deref(), &overrides)
        }
        Commands::Fir {
            input,
            output,
            pass,
            cutoff,
            window,
            taps,
            bit_depth,
        } => commands::fir(
            &input,
            &output,
            pass,
            cutoff,
            window,
            taps,
            ExportFormat::new(bit_depth),
        ),
        Commands::Iir {
            input,
            output,
            pass,
            cutoff,
            family,
            order,
            rp,
            rs,
            bit_depth,
        } => commands::iir(
            &input,
            &output,
            pass,
            cutoff,
            &family,
            order,
            rp,
            rs,
            ExportFormat::new(bit_depth),
        ),
        Commands::Inspect { input } => commands::inspect(&input),
    }
}
