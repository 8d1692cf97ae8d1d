use teloxide::{Bot, RequestError};
use teloxide::requests::Requester;
use teloxide::types::{BotCommandScope, ChatId, Recipient};
use teloxide::utils::command::BotCommands;
use crate::handlers::AdminCommands;

/// Registers the admin commands with the platform, scoped to the channel's
/// administrators only.
pub async fn set_my_commands(bot: &Bot, channel_id: ChatId) -> Result<(), RequestError> {
    let commands = AdminCommands::bot_commands();
    let mut request = bot.set_my_commands(commands);
    request.scope.replace(BotCommandScope::ChatAdministrators {
        chat_id: Recipient::Id(channel_id),
    });
    request.await?;
    Ok(())
}
