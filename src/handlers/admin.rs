use teloxide::Bot;
use teloxide::macros::BotCommands;
use teloxide::types::Message;
use crate::announcement::AnnouncementService;
use crate::config::AppConfig;
use crate::domain::VouchCount;
use crate::handlers::{delete_command_message, is_admin, HandlerResult};
use crate::metrics;
use crate::repo::CounterStore;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum AdminCommands {
    #[command(description = "decrease the vouch counter by one")]
    Dec,
    #[command(description = "reset the vouch counter to zero")]
    Reset,
    #[command(description = "set the vouch counter to a value")]
    Set(String),
}

pub async fn admin_cmd_handler(bot: Bot, msg: Message, cmd: AdminCommands, app_config: AppConfig,
                               announcement: AnnouncementService, store: CounterStore) -> HandlerResult {
    let authorized = match msg.from() {
        Some(user) => is_admin(&bot, app_config.channel_id, user.id).await,
        None => false,
    };
    if !authorized {
        log::info!("ignoring a privileged command from a non-admin sender in {}", msg.chat.id);
        return Ok(());
    }

    let count = match announcement.reconcile(&bot, &store).await {
        Ok(count) => count,
        Err(e) => {
            log::error!("couldn't reconcile the announcement of {}: {e}", msg.chat.id);
            return Ok(());
        }
    };

    let changed = match cmd {
        AdminCommands::Dec => {
            metrics::CMD_DEC_COUNTER.inc();
            if count.is_zero() {
                false
            } else {
                let count = store.decrement().await?;
                log::info!("the counter of {} has been decremented to {count}", msg.chat.id);
                true
            }
        }
        AdminCommands::Reset => {
            metrics::CMD_RESET_COUNTER.inc();
            store.reset().await?;
            log::info!("the counter of {} has been reset", msg.chat.id);
            true
        }
        AdminCommands::Set(arg) => {
            metrics::CMD_SET_COUNTER.inc();
            match arg.trim().parse::<VouchCount>() {
                Ok(value) => {
                    store.set(value).await?;
                    log::info!("the counter of {} has been set to {value}", msg.chat.id);
                    true
                }
                Err(_) => {
                    // malformed argument, discarded silently to keep the channel clean
                    log::info!("discarding /set with a malformed argument: {arg:?}");
                    false
                }
            }
        }
    };

    if changed {
        if let Err(e) = announcement.refresh(&bot, &store).await {
            log::error!("couldn't update the announcement of {}: {e}", msg.chat.id);
        }
    }

    delete_command_message(&bot, &msg).await;
    Ok(())
}
