use teloxide::Bot;
use teloxide::types::{ForwardedFrom, Message};
use crate::announcement::AnnouncementService;
use crate::config::AppConfig;
use crate::handlers::HandlerResult;
use crate::metrics;
use crate::repo::CounterStore;

/// Counts forwarded messages containing a trigger keyword.
pub async fn detection_handler(bot: Bot, msg: Message, app_config: AppConfig,
                               announcement: AnnouncementService, store: CounterStore) -> HandlerResult {
    if let Err(e) = announcement.reconcile(&bot, &store).await {
        log::error!("couldn't reconcile the announcement of {}: {e}", msg.chat.id);
        return Ok(());
    }

    // direct, non-forwarded chat activity never counts
    if !is_forwarded(&msg) {
        return Ok(());
    }

    let payload = match msg.text().or_else(|| msg.caption()) {
        Some(payload) => payload,
        None => return Ok(()),
    };
    if !app_config.triggers.matches(payload) {
        return Ok(());
    }

    metrics::VOUCHES_COUNTER.inc();
    let count = store.increment().await?;
    log::info!("a vouch has been detected in {}, the counter is now {count}", msg.chat.id);

    if let Err(e) = announcement.refresh(&bot, &store).await {
        log::error!("couldn't update the announcement of {}: {e}", msg.chat.id);
    }
    Ok(())
}

fn is_forwarded(msg: &Message) -> bool {
    matches!(
        msg.forward().map(|fwd| &fwd.from),
        Some(ForwardedFrom::User(_) | ForwardedFrom::Chat(_))
    )
}

#[cfg(test)]
mod test {
    use teloxide::types::Message;
    use super::is_forwarded;

    fn message(forward_fields: &str) -> Message {
        let json = format!(r#"{{
            "message_id": 1,
            "date": 1700000000,
            "chat": {{"id": -1001234567890, "title": "Vouches", "type": "channel"}},
            "text": "vouch for him"{forward_fields}
        }}"#);
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn direct_messages_are_not_forwards() {
        assert!(!is_forwarded(&message("")));
    }

    #[test]
    fn forwards_from_users_and_chats_count() {
        let from_user = message(r#",
            "forward_date": 1700000000,
            "forward_from": {"id": 42, "is_bot": false, "first_name": "Alice"}"#);
        assert!(is_forwarded(&from_user));

        let from_chat = message(r#",
            "forward_date": 1700000000,
            "forward_from_chat": {"id": -1009999, "title": "Source", "type": "channel"}"#);
        assert!(is_forwarded(&from_chat));
    }

    #[test]
    fn forwards_from_hidden_senders_do_not_count() {
        let hidden = message(r#",
            "forward_date": 1700000000,
            "forward_sender_name": "Hidden Sender""#);
        assert!(!is_forwarded(&hidden));
    }
}
