use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use teloxide::error_handlers::IgnoringErrorHandlerSafe;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks::{self, Options};
use tracing::level_filters;
use tracing_subscriber::fmt::format::FmtSpan;

mod api;
mod bot;
mod catalog;
mod commands;
mod config;
mod driver;
mod error;
mod identity;
mod keyboard;
mod scoring;
mod store;

use api::ApiContext;
use catalog::QuestionCatalog;
use config::AppConfig;
use store::postgres::Connection;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;

#[tokio::main]
async fn main() {
    dotenv().ok();
    let log_level = std::env::var("LOG_LEVEL").unwrap_or("info".into());
    tracing_subscriber::fmt()
        .with_max_level(level_filters::LevelFilter::from_level(
            log_level.parse().unwrap(),
        ))
        .json()
        .with_span_events(FmtSpan::ENTER)
        .log_internal_errors(true)
        .with_ansi(true)
        .with_line_number(true)
        .with_target(false)
        .init();

    let config = AppConfig::from_env();

    let connection = Arc::new(Connection::connect(&config.database_url).await);
    connection.run_migrations().await;

    let catalog = Arc::new(QuestionCatalog::load(connection.as_ref()).await);
    if catalog.is_empty() {
        log::error!("Question catalog is empty, quiz flows will degrade.");
    }

    let bot = Bot::new(&config.bot_token);
    log::info!("Starting placement test bot...");

    let mut dispatcher = Dispatcher::builder(bot.clone(), bot::schema())
        .dependencies(dptree::deps![connection.clone(), catalog.clone()])
        .enable_ctrlc_handler()
        .build();

    let api = api::router(ApiContext {
        store: connection,
        catalog,
        api_token: config.api_token.clone(),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    match config.webhook_url {
        Some(webhook_url) => {
            let (listener, stop_flag, bot_router) =
                webhooks::axum_to_router(bot, Options::new(addr, webhook_url))
                    .await
                    .expect("Failed to build a webhook listener.");
            let app = api.merge(bot_router);

            tokio::spawn(async move {
                let tcp = tokio::net::TcpListener::bind(addr)
                    .await
                    .expect("Failed to bind the server address.");
                axum::serve(tcp, app)
                    .with_graceful_shutdown(stop_flag)
                    .await
                    .expect("The HTTP server failed.");
            });

            dispatcher
                .dispatch_with_listener(listener, Arc::new(IgnoringErrorHandlerSafe))
                .await
        }
        None => {
            tokio::spawn(async move {
                let tcp = tokio::net::TcpListener::bind(addr)
                    .await
                    .expect("Failed to bind the server address.");
                axum::serve(tcp, api).await.expect("The HTTP server failed.");
            });

            dispatcher.dispatch().await
        }
    }
}
