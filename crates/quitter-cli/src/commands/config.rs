use clap::Subcommand;
use quitter_core::storage::Config;

use super::CmdResult;

/// Keys use the `section.field` form of `config.toml`, e.g. `user.id`,
/// `streak.reset_start_on_missed_day` or `sync.reconcile_policy`.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value
    Get {
        /// Dotted key, e.g. "sync.backend"
        key: String,
    },
    /// Change one value and save the file
    Set {
        /// Dotted key, e.g. "user.id"
        key: String,
        /// Value; an empty string clears optional keys such as "sync.api_key"
        value: String,
    },
    /// Print the whole configuration as TOML
    List,
    /// Print where config.toml lives
    Path,
    /// Overwrite config.toml with the defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CmdResult {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or_else(|| format!("unknown config key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            Config::load()?.set(&key, &value)?;
            println!("{key} = {value}");
        }
        ConfigAction::List => print!("{}", toml::to_string_pretty(&Config::load()?)?),
        ConfigAction::Path => println!("{}", Config::file_path()?.display()),
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("restored default streak and sync settings");
        }
    }
    Ok(())
}
