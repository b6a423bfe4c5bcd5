use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use seaport_market::api::HttpBackend;
use seaport_market::app::App;
use seaport_market::chain::LocalEnvironment;
use seaport_market::commands::{self, parse_command};
use seaport_market::config::Config;
use seaport_market::events::Event;
use seaport_market::logging;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::load("config.toml")?;
    logging::init(&config.general.log_level);
    info!(
        "Backend {} | chain {} ({}) | collection {}",
        config.backend_url(),
        config.chain.name,
        config.chain.id,
        config.contracts.nft
    );
    if config.credentials.private_key.is_none() {
        warn!("MARKET_PRIVATE_KEY not set, connect will find no wallet");
    }

    let backend = Arc::new(HttpBackend::new(config.backend_url()));
    let env = Arc::new(LocalEnvironment::new(
        config.credentials.private_key.clone(),
        config.chain.rpc_url.clone(),
    ));
    let (mut app, mut rx) = App::new(config, backend, env);

    // Typed commands play the part of clicks and scrolling
    let tx = app.sender();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_command(&line) {
                Ok(events) => {
                    for event in events {
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                }
                Err(message) => println!("{}", message),
            }
        }
        let _ = tx.send(Event::Shutdown).await;
    });

    let ctrl_c = app.sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = ctrl_c.send(Event::Shutdown).await;
        }
    });

    println!("{}", commands::HELP);
    println!("{}", app.view());

    while let Some(event) = rx.recv().await {
        if !app.handle(event) {
            println!("Shutting down...");
            break;
        }
        for alert in app.take_alerts() {
            println!("!! {}", alert);
        }
        println!("{}", app.view());
    }
    Ok(())
}
