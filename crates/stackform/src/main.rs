mod backend;
mod policy;
mod program;
mod site;

use clap::{Parser, Subcommand};
use colored::Colorize;
use stackform_config::Settings;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stackform")]
#[command(
    about = "Compose a desired-state infrastructure graph for the reconciliation engine",
    long_about = None
)]
struct Cli {
    /// Configuration file (defaults to stackform.toml when present)
    #[arg(short, long, global = true, env = "STACKFORM_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the desired-state manifest
    Render {
        /// Write the manifest to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Emit compact JSON
        #[arg(long)]
        compact: bool,
    },
    /// Compose the graph and check it without rendering
    Validate,
    /// List the exported outputs
    Outputs,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = Settings::load_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Render { out, compact } => {
            let stack = program::build(&settings)?;
            let manifest = stack.render();
            let json = if compact {
                manifest.to_json()?
            } else {
                manifest.to_json_pretty()?
            };
            match out {
                Some(path) => {
                    std::fs::write(&path, &json)?;
                    println!(
                        "{} wrote {} ({})",
                        "✓".green(),
                        path.display(),
                        manifest.summary()
                    );
                }
                None => println!("{json}"),
            }
        }
        Commands::Validate => {
            let stack = program::build(&settings)?;
            let summary = stack.render().summary();
            println!("{} {} is valid: {}", "✓".green(), stack.name().bold(), summary);
        }
        Commands::Outputs => {
            let stack = program::build(&settings)?;
            for (name, value) in stack.outputs() {
                println!("{} = {}", name.bold(), value);
            }
        }
    }

    Ok(())
}
