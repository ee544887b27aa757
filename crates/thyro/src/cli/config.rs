//! The `thyro config` command: inspect the active settings and prompt set.
//!
//! Settings resolve from `--config`, then the platform config file, then the
//! built-in defaults (`-P0` marker, local chat-completions endpoint).

use clap::{Args, Subcommand};
use thyro_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the resolved configuration as TOML
    Show,

    /// Print the default config file location
    Path,

    /// Print the active prompt set as TOML (a starting point for `prompts.file`)
    Prompts,

    /// Write the default `[dataset]`, `[labels]`, `[inference]`, `[prompts]`
    /// and `[logging]` sections to the default location
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Run a `config` subcommand against the already-resolved `config`.
pub fn execute(args: ConfigArgs, config: &Config) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", Config::default_path().display());
        }

        ConfigCommand::Prompts => {
            println!("{}", config.prompt_set()?.to_toml()?);
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            std::fs::write(&path, Config::default().to_toml()?)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
            println!(
                "Edit [labels] marker and [inference] endpoint/model to match your setup."
            );
        }
    }

    Ok(())
}
