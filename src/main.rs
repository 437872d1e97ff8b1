use std::process::ExitCode;
use std::sync::Arc;

use bazaar::cli::{self, Action};
use bazaar::config::{load_config, schema_json};
use bazaar::guard::Navigation;
use bazaar::models::Credentials;
use bazaar::startup;
use bazaar::state::AppState;
use bazaar::utils::logger::init_logging;
use tracing::error;

type BoxError = Box<dyn std::error::Error>;

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli::new().get_matches();

    match run(&matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(matches: &clap::ArgMatches) -> Result<(), BoxError> {
    let action = cli::handler(matches)?;
    if action == Action::Schema {
        println!("{}", schema_json()?);
        return Ok(());
    }

    let config = Arc::new(load_config(&cli::config_path(matches))?);
    init_logging(&config.logging)?;

    let state = startup::run(config).await?;
    execute(&state, action).await
}

async fn execute(state: &AppState, action: Action) -> Result<(), BoxError> {
    let session = &state.session;

    match action {
        Action::Status => match session.current_user() {
            Some(user) => println!(
                "logged in as {}{}",
                user.username,
                if user.is_admin { " (admin)" } else { "" }
            ),
            None => println!("not logged in"),
        },
        Action::Login { username, password } => {
            let outcome = session.login(&Credentials::new(username, password)).await?;
            println!("logged in as {}", outcome.user.username);
        }
        Action::Logout => {
            session.sign_out().await;
            println!("logged out");
        }
        Action::Refresh => {
            session.refresh_access_token().await?;
            println!("access token refreshed");
        }
        Action::Navigate { path } => match state.navigate(&path) {
            Navigation::Proceed => println!("proceed {}", path),
            Navigation::Redirect(redirect) => println!("redirect {}", redirect.location()),
        },
        Action::Schema => println!("{}", schema_json()?),
    }
    Ok(())
}
