mod announcement;
mod commands;
mod config;
mod domain;
mod handlers;
mod metrics;
mod repo;

use std::net::SocketAddr;
use teloxide::prelude::*;
use teloxide::dptree::deps;
use crate::announcement::AnnouncementService;
use crate::handlers::{checks, AdminCommands};
use crate::repo::CounterStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(debug_assertions)]
    dotenvy::dotenv()?;

    pretty_env_logger::init();

    let app_config = config::AppConfig::from_env()?;
    let store = CounterStore::new(&app_config.counter_file);
    let announcement = AnnouncementService::new(&app_config);

    let handler = dptree::entry()
        .branch(Update::filter_message().filter_command::<AdminCommands>().filter(checks::is_target_channel).endpoint(handlers::admin_cmd_handler))
        .branch(Update::filter_channel_post().filter_command::<AdminCommands>().filter(checks::is_target_channel).endpoint(handlers::admin_cmd_handler))
        .branch(Update::filter_message().filter(checks::is_target_channel).endpoint(handlers::detection_handler))
        .branch(Update::filter_channel_post().filter(checks::is_target_channel).endpoint(handlers::detection_handler));

    let bot = Bot::new(app_config.bot_token.clone());
    bot.delete_webhook().await?;

    commands::set_my_commands(&bot, app_config.channel_id)
        .await
        .map_err(|e| format!("couldn't set the bot's commands: {e}"))?;

    // resolve the announcement before the first event arrives
    match announcement.reconcile(&bot, &store).await {
        Ok(count) => log::info!("the announcement is in place, the counter starts at {count}"),
        Err(e) => log::warn!("couldn't reconcile the announcement at startup: {e}"),
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    let metrics_router = metrics::init();

    let ignore_unknown_updates = |_| Box::pin(async {});
    let deps = deps![app_config, store, announcement];

    log::info!("The polling dispatcher is activating...");

    let bot_fut = tokio::spawn(async move {
        Dispatcher::builder(bot, handler)
            .default_handler(ignore_unknown_updates)
            .dependencies(deps)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await
    });

    let srv = tokio::spawn(async move {
        axum::Server::bind(&addr)
            .serve(metrics_router.into_make_service())
            .with_graceful_shutdown(async {
                tokio::signal::ctrl_c()
                    .await
                    .expect("failed to install CTRL+C signal handler");
                log::info!("Shutdown of the metrics server")
            })
            .await
    });

    let (res, _) = futures::join!(srv, bot_fut);
    res?.map_err(Into::into)
}
