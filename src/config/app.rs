use std::path::PathBuf;
use reqwest::Url;
use teloxide::types::ChatId;
use crate::config::env::*;
use crate::domain::TriggerWords;

const DEFAULT_DISPLAY_NAME: &str = "Vouch Counter";
const DEFAULT_COUNTER_FILE: &str = "counter.txt";

#[derive(Clone)]
pub struct AppConfig {
    pub bot_token: String,
    pub channel_id: ChatId,
    pub counter_file: PathBuf,
    pub triggers: TriggerWords,
    pub announcement: AnnouncementConfig,
}

/// How the pinned announcement looks like.
#[derive(Clone)]
pub struct AnnouncementConfig {
    pub display_name: String,
    pub photo_url: Option<Url>,
    pub footer: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bot_token = get_env_mandatory_value("BOT_TOKEN")?;
        let channel_id = get_env_mandatory_value("CHANNEL_ID").map(ChatId)?;
        let counter_file = get_env_value_or_default("COUNTER_FILE", DEFAULT_COUNTER_FILE.to_owned());
        let display_name = get_env_value_or_default("BOT_DISPLAY_NAME", DEFAULT_DISPLAY_NAME.to_owned());
        let photo_url = get_optional_env_url("ANNOUNCEMENT_PHOTO_URL");
        let footer = get_optional_env_string("FOOTER_TEXT");
        let extra_trigger = get_optional_env_string("EXTRA_TRIGGER_WORD");
        Ok(Self {
            bot_token,
            channel_id,
            counter_file: PathBuf::from(counter_file),
            triggers: TriggerWords::new(extra_trigger),
            announcement: AnnouncementConfig {
                display_name,
                photo_url,
                footer,
            },
        })
    }
}

#[cfg(test)]
impl Default for AnnouncementConfig {
    fn default() -> Self {
        Self {
            display_name: DEFAULT_DISPLAY_NAME.to_owned(),
            photo_url: None,
            footer: None,
        }
    }
}
