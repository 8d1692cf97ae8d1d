mod admin;
mod detection;

use teloxide::Bot;
use teloxide::prelude::*;
use teloxide::types::{ChatId, Message, UserId};

pub use admin::*;
pub use detection::*;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// A live lookup against the channel's administrator list. Never cached, so
/// a revoked admin loses the commands immediately; a failed lookup denies.
pub(crate) async fn is_admin(bot: &Bot, channel_id: ChatId, user_id: UserId) -> bool {
    match bot.get_chat_administrators(channel_id).await {
        Ok(admins) => admins.into_iter().any(|m| m.user.id == user_id),
        Err(e) => {
            log::warn!("couldn't fetch the administrator list of {channel_id}, denying the command: {e}");
            false
        }
    }
}

/// Keeps the channel clean of bot-command noise. Failures are swallowed.
pub(crate) async fn delete_command_message(bot: &Bot, msg: &Message) {
    if let Err(e) = bot.delete_message(msg.chat.id, msg.id).await {
        log::warn!("couldn't delete the command message {} in {}: {e}", msg.id, msg.chat.id);
    }
}

pub mod checks {
    use teloxide::types::Message;
    use crate::config::AppConfig;

    /// Everything outside the configured channel is ignored entirely.
    pub fn is_target_channel(msg: Message, app_config: AppConfig) -> bool {
        msg.chat.id == app_config.channel_id
    }
}
