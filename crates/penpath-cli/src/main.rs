//! Command line front end for penpath.

mod script;

use anyhow::Result;
use clap::{Parser, Subcommand};
use penpath_core::{EditorConfig, Path};
use std::path::PathBuf;

/// penpath CLI arguments
///
/// Examples:
///   penpath normalize "M 10,10 L 20 20 junk"   # Prints "M 10 10 L 20 20"
///   penpath replay gesture.json               # Prints the resulting document
///   penpath replay gesture.json --config editor.json
#[derive(Parser, Debug)]
#[command(
    name = "penpath",
    version,
    about = "Vector path editing engine",
    long_about = "Parses and normalizes path text, and replays scripted pointer and key events through the pen editor."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse path text and print its canonical form
    Normalize {
        /// Path text, e.g. "M 0 0 L 10 10"
        text: String,
    },
    /// Replay a JSON script of editor events and print the document
    Replay {
        /// JSON array of script steps
        script: PathBuf,
        /// Editor config JSON; missing fields use defaults
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Normalize { text } => {
            let path: Path = text.parse()?;
            println!("{}", path.data());
        }
        Command::Replay { script, config } => {
            let config = match config {
                Some(path) => script::load_config(&path)?,
                None => EditorConfig::default(),
            };
            let steps = script::load_script(&script)?;
            log::info!("Replaying {} steps from {}", steps.len(), script.display());
            let editor = script::replay(&steps, config)?;
            println!("{}", editor.document.to_json()?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from(["penpath", "replay", "steps.json", "--config", "c.json"]).unwrap();
        match cli.command {
            Command::Replay { script, config } => {
                assert_eq!(script, PathBuf::from("steps.json"));
                assert_eq!(config, Some(PathBuf::from("c.json")));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["penpath"]).is_err());
    }
}
