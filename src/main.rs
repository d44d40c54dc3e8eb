//! halo - a terminal audio player with a beat-reactive radial visualizer.
//!
//! The player reads a TOML playlist, plays the selected track and draws its
//! spectrum as radial bars around a cover block. Every track carries its own
//! accent colors, which tint the bars, the cover and the ambient background.
//! Beats pulse the cover, flash a ring of markers and light up background
//! circles.
//!
//! Besides playback the binary can validate a playlist (`halo check`) and
//! manage the configuration file that tunes the visualizer.

use clap::{CommandFactory, Parser, Subcommand, builder::PossibleValuesParser};
use clap_complete::{Generator, Shell, generate};
use std::error::Error;
use std::io;
use std::path::PathBuf;

mod cli;

#[cfg(feature = "player")]
mod player;

use halo_player::config::CONFIG_KEYS;

#[derive(Parser)]
#[command(name = "halo")]
#[command(about = "Terminal audio player with a beat-reactive radial visualizer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the configuration file with default settings
    Init,
    /// Show or change the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Play a playlist
    Play {
        /// Path to the playlist TOML file
        playlist: PathBuf,
        /// Start playing this track right away (1-based)
        #[arg(short, long)]
        track: Option<usize>,
    },
    /// Validate a playlist without playing it
    Check {
        /// Path to the playlist TOML file
        playlist: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// View current configuration
    View,
    /// Set a configuration value
    Set {
        /// Configuration key
        #[arg(value_parser = PossibleValuesParser::new(CONFIG_KEYS.iter().copied()))]
        key: String,
        /// Configuration value
        value: String,
    },
    /// Edit configuration file in your editor
    Edit,
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            cli::init::handle_init()?;
        }
        Commands::Config { action } => match action {
            ConfigAction::View => {
                cli::config::handle_config_view()?;
            }
            ConfigAction::Set { key, value } => {
                cli::config::handle_config_set(&key, &value)?;
            }
            ConfigAction::Edit => {
                cli::config::handle_config_edit()?;
            }
        },
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            print_completions(shell, &mut cmd);
        }
        Commands::Play { playlist, track } => {
            cli::play::handle_play(&playlist, track)?;
        }
        Commands::Check { playlist } => {
            cli::check::handle_check(&playlist)?;
        }
    }

    Ok(())
}
