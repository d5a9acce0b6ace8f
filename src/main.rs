use clap::Parser;
use designer_step_editor::cli::commands::{cmd_export, cmd_run_test, cmd_sync, cmd_watch};
use designer_step_editor::cli::config::{Cli, Commands, load_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());
    let script_override = cli.server_script.as_deref();

    match cli.command {
        Commands::Export { url, output } => {
            cmd_export(&url, output.as_deref(), &config, script_override, cli.verbose)?;
        }
        Commands::Sync { url, json } => {
            let success = cmd_sync(&url, &json, &config, script_override, cli.verbose)?;
            if !success {
                std::process::exit(1);
            }
        }
        Commands::RunTest { url } => {
            let triggered = cmd_run_test(&url, &config, script_override, cli.verbose)?;
            if !triggered {
                std::process::exit(1);
            }
        }
        Commands::Watch {
            url,
            interval_ms,
            max_polls,
        } => {
            cmd_watch(&url, interval_ms, max_polls, &config, script_override, cli.verbose)?;
        }
    }

    Ok(())
}
