use std::path::PathBuf;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgMatches, ColorChoice, Command,
};
use thiserror::Error;

/// What the user asked the binary to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Status,
    Login { username: String, password: String },
    Logout,
    Refresh,
    Navigate { path: String },
    Schema,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),
    #[error("unknown command")]
    UnknownCommand,
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("bazaar")
        .about("Marketplace session client")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to the YAML configuration file")
                .default_value("config.yaml")
                .env("BAZAAR_CONFIG")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .subcommand(Command::new("status").about("Show the current session"))
        .subcommand(
            Command::new("login")
                .about("Log in and persist the session")
                .arg(
                    Arg::new("username")
                        .short('u')
                        .long("username")
                        .help("Account name")
                        .env("BAZAAR_USERNAME")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Account password")
                        .env("BAZAAR_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
        .subcommand(Command::new("logout").about("Sign out and forget the session"))
        .subcommand(Command::new("refresh").about("Trade the refresh token for a new access token"))
        .subcommand(
            Command::new("navigate")
                .about("Check whether a path may be visited")
                .arg(Arg::new("path").help("Target path, e.g. /my-listings").required(true)),
        )
        .subcommand(Command::new("schema").about("Print the configuration JSON schema"))
}

pub fn handler(matches: &ArgMatches) -> Result<Action, CliError> {
    let string = |m: &ArgMatches, name: &'static str| -> Result<String, CliError> {
        m.get_one::<String>(name)
            .cloned()
            .ok_or(CliError::MissingArgument(name))
    };

    match matches.subcommand() {
        Some(("status", _)) => Ok(Action::Status),
        Some(("login", sub)) => Ok(Action::Login {
            username: string(sub, "username")?,
            password: string(sub, "password")?,
        }),
        Some(("logout", _)) => Ok(Action::Logout),
        Some(("refresh", _)) => Ok(Action::Refresh),
        Some(("navigate", sub)) => Ok(Action::Navigate {
            path: string(sub, "path")?,
        }),
        Some(("schema", _)) => Ok(Action::Schema),
        _ => Err(CliError::UnknownCommand),
    }
}

/// The configuration file chosen on the command line or environment.
pub fn config_path(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "bazaar");
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_login_arguments() {
        let matches = new().get_matches_from(vec![
            "bazaar",
            "--config",
            "/etc/bazaar.yaml",
            "login",
            "-u",
            "adam",
            "-p",
            "secret",
        ]);

        assert_eq!(config_path(&matches), PathBuf::from("/etc/bazaar.yaml"));
        assert_eq!(
            handler(&matches).unwrap(),
            Action::Login {
                username: "adam".to_string(),
                password: "secret".to_string()
            }
        );
    }

    #[test]
    fn test_navigate_requires_path() {
        let result = new().try_get_matches_from(vec!["bazaar", "navigate"]);
        assert!(result.is_err());

        let matches = new().get_matches_from(vec!["bazaar", "navigate", "/admin"]);
        assert_eq!(
            handler(&matches).unwrap(),
            Action::Navigate {
                path: "/admin".to_string()
            }
        );
    }
}
