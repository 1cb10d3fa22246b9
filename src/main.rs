mod api;
mod auth;
mod commands;
mod config;
mod db;
mod debounce;
mod error;
mod handlers;
mod models;
mod voting;

use api::HttpPollApi;
use auth::ConfiguredAuthenticator;
use commands::App;
use config::Config;
use db::SqliteSessionStore;
use handlers::{AdminScreen, VoteScreen};
use log::{error, info};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    info!("Using poll server at {}", config.api_url);

    let store = match SqliteSessionStore::connect(&config.database_url).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("Failed to open session store: {}", e);
            return Err(e.into());
        }
    };
    let api = Arc::new(HttpPollApi::new(&config.api_url));
    let auth = Arc::new(ConfiguredAuthenticator::new(
        config.admin_username.clone(),
        config.admin_password.clone(),
    ));

    let vote = VoteScreen::new(api.clone(), store.clone());
    let mut admin = AdminScreen::new(api, store, auth, config.search_debounce);
    if let Err(e) = admin.restore_session().await {
        error!("Failed to restore admin session: {}", e);
    }

    let mut app = App::new(vote, admin);
    print_lines(&app.handle_line("refresh").await.lines);
    println!("Type 'help' for commands.");

    let mut search_updates = app.admin.search_updates();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let reply = app.handle_line(&line).await;
                print_lines(&reply.lines);
                if reply.quit {
                    break;
                }
            }
            changed = search_updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let settled = !search_updates.borrow_and_update().pending;
                if settled {
                    print_lines(&commands::show_books(&app.admin));
                }
            }
        }
    }

    info!("Client stopped");
    Ok(())
}
