mod template;

use std::sync::Arc;
use std::time::Duration;
use teloxide::Bot;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, Message, MessageId};
use teloxide::types::ParseMode::Html;
use tokio::sync::Mutex;
use tokio::time::Instant;
use crate::config::{AnnouncementConfig, AppConfig};
use crate::domain::VouchCount;
use crate::metrics;
use crate::repo::CounterStore;

/// Minimal spacing between two announcement edits, to stay clear of the
/// Bot API throttling limits.
const EDIT_INTERVAL: Duration = Duration::from_millis(1200);

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum AnnouncementError {
    #[display("no announcement has been resolved for the channel yet")]
    NotResolved,
    #[display("the announcement edit was rejected: {_0}")]
    Edit(teloxide::RequestError),
}

/// Keeps the pinned announcement of the channel in sync with the counter.
///
/// Cloneable handle over shared state: the resolved announcement message,
/// the instant of the last edit, and the last count that was rendered into
/// the announcement. The state is behind a single lock since handlers run
/// concurrently.
#[derive(Clone)]
pub struct AnnouncementService {
    channel_id: ChatId,
    config: AnnouncementConfig,
    state: Arc<Mutex<AnnouncementState>>,
}

#[derive(Default)]
struct AnnouncementState {
    message: Option<TrackedAnnouncement>,
    last_edit: Option<Instant>,
    last_rendered: Option<VouchCount>,
}

#[derive(Copy, Clone)]
struct TrackedAnnouncement {
    id: MessageId,
    has_photo: bool,
}

impl TrackedAnnouncement {
    fn of(msg: &Message) -> Self {
        Self {
            id: msg.id,
            has_photo: msg.photo().is_some(),
        }
    }
}

impl AnnouncementService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            channel_id: config.channel_id,
            config: config.announcement.clone(),
            state: Arc::default(),
        }
    }

    /// Makes sure exactly one pinned announcement exists and returns the count
    /// it agrees on. Idempotent; must run before any counter mutation so an
    /// announcement id is always available to [`Self::refresh`].
    ///
    /// The count displayed by an already pinned announcement wins over the
    /// locally persisted value: that's what carries the counter across
    /// restarts and lost counter files.
    pub async fn reconcile(&self, bot: &Bot, store: &CounterStore) -> anyhow::Result<VouchCount> {
        let mut state = self.state.lock().await;
        let chat = bot.get_chat(self.channel_id).await?;
        match chat.pinned_message {
            Some(pinned) => {
                state.message.replace(TrackedAnnouncement::of(&pinned));
                let displayed = pinned.text().or_else(|| pinned.caption());
                match adopt_displayed_count(displayed, store).await? {
                    Some(count) => {
                        state.last_rendered.replace(count);
                        Ok(count)
                    }
                    None => {
                        log::warn!("the pinned message of {} displays no recognizable count", self.channel_id);
                        state.last_rendered.take();
                        Ok(store.load().await)
                    }
                }
            }
            None => {
                let count = store.load().await;
                let body = template::render(&self.config, count);
                let sent = self.send_announcement(bot, body).await?;
                bot.pin_chat_message(self.channel_id, sent.id).await?;
                log::info!("a new announcement {} has been pinned in {} with the count {count}", sent.id, self.channel_id);
                state.message.replace(TrackedAnnouncement::of(&sent));
                state.last_rendered.replace(count);
                Ok(count)
            }
        }
    }

    /// Re-renders the announcement from the currently persisted count.
    ///
    /// Edits are spaced by [`EDIT_INTERVAL`]: a caller arriving early blocks
    /// until the window elapses rather than dropping the edit. An unchanged
    /// count returns immediately without consuming a window slot; see
    /// [`prepare_edit`] for the ordering.
    pub async fn refresh(&self, bot: &Bot, store: &CounterStore) -> Result<(), AnnouncementError> {
        let mut state = self.state.lock().await;
        let tracked = state.message.ok_or(AnnouncementError::NotResolved)?;

        let (count, body) = match prepare_edit(&mut state, &self.config, store).await {
            Some(prepared) => prepared,
            None => return Ok(()),
        };

        let edit_result = if tracked.has_photo {
            let mut req = bot.edit_message_caption(self.channel_id, tracked.id);
            req.caption.replace(body);
            req.parse_mode.replace(Html);
            req.await.map(drop)
        } else {
            let mut req = bot.edit_message_text(self.channel_id, tracked.id, body);
            req.parse_mode.replace(Html);
            req.await.map(drop)
        };
        match edit_result {
            Ok(()) => {
                metrics::ANNOUNCEMENT_EDITS.updated();
                state.last_rendered.replace(count);
                Ok(())
            }
            Err(e) => {
                metrics::ANNOUNCEMENT_EDITS.failed();
                Err(AnnouncementError::Edit(e))
            }
        }
    }

    async fn send_announcement(&self, bot: &Bot, body: String) -> Result<Message, teloxide::RequestError> {
        match &self.config.photo_url {
            Some(url) => {
                let mut req = bot.send_photo(self.channel_id, InputFile::url(url.clone()));
                req.caption.replace(body);
                req.parse_mode.replace(Html);
                req.await
            }
            None => {
                let mut req = bot.send_message(self.channel_id, body);
                req.parse_mode.replace(Html);
                req.await
            }
        }
    }
}

/// Adopts the count the pinned announcement displays: the remote value
/// overwrites the persisted one, carrying the counter across restarts.
/// `None` when the text carries no recognizable count.
async fn adopt_displayed_count(displayed: Option<&str>, store: &CounterStore) -> anyhow::Result<Option<VouchCount>> {
    match displayed.and_then(template::extract_count) {
        Some(count) => {
            store.save(count).await?;
            Ok(Some(count))
        }
        None => Ok(None)
    }
}

/// Decides whether an edit is due and renders its body.
///
/// An unchanged count is skipped before the rate window is consulted, so a
/// no-op refresh neither blocks the caller nor delays the next real edit.
/// The count is re-read after the wait: it may have moved on while we were
/// blocked, and the last edit after a burst must show the final value.
async fn prepare_edit(state: &mut AnnouncementState, config: &AnnouncementConfig,
                      store: &CounterStore) -> Option<(VouchCount, String)> {
    if state.last_rendered == Some(store.load().await) {
        return None;
    }

    wait_for_window(&mut state.last_edit).await;

    let count = store.load().await;
    if state.last_rendered == Some(count) {
        return None;
    }
    Some((count, template::render(config, count)))
}

/// Blocks until [`EDIT_INTERVAL`] has passed since the previous call,
/// then stamps the current instant.
async fn wait_for_window(last_edit: &mut Option<Instant>) {
    if let Some(last) = *last_edit {
        tokio::time::sleep_until(last + EDIT_INTERVAL).await;
    }
    last_edit.replace(Instant::now());
}

#[cfg(test)]
mod test {
    use tokio::time::Instant;
    use super::{adopt_displayed_count, prepare_edit, wait_for_window, AnnouncementState, EDIT_INTERVAL};
    use crate::config::AnnouncementConfig;
    use crate::repo::CounterStore;

    fn store_in(dir: &tempfile::TempDir) -> CounterStore {
        CounterStore::new(dir.path().join("counter.txt"))
    }

    #[tokio::test]
    async fn displayed_count_wins_over_stale_local_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save("3".parse().unwrap()).await.unwrap();

        let displayed = "🔥 Vouch Counter 🔥\n\nTotal Vouches: 7\n\n(Forward messages containing the word 'vouch')";
        let adopted = adopt_displayed_count(Some(displayed), &store).await.unwrap();

        assert_eq!(adopted, Some("7".parse().unwrap()));
        assert_eq!(store.load().await, "7".parse().unwrap());
    }

    #[tokio::test]
    async fn unrecognizable_display_keeps_the_local_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save("3".parse().unwrap()).await.unwrap();

        assert_eq!(adopt_displayed_count(Some("no counter here"), &store).await.unwrap(), None);
        assert_eq!(adopt_displayed_count(None, &store).await.unwrap(), None);
        assert_eq!(store.load().await, "3".parse().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_count_skips_without_consuming_the_window() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save("5".parse().unwrap()).await.unwrap();

        let mut state = AnnouncementState::default();
        state.last_rendered.replace("5".parse().unwrap());

        let started = Instant::now();
        assert!(prepare_edit(&mut state, &AnnouncementConfig::default(), &store).await.is_none());
        assert_eq!(Instant::now(), started);
        assert!(state.last_edit.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn changed_count_renders_after_the_window() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save("6".parse().unwrap()).await.unwrap();

        let mut state = AnnouncementState::default();
        state.last_rendered.replace("5".parse().unwrap());
        state.last_edit.replace(Instant::now());

        let started = Instant::now();
        let (count, body) = prepare_edit(&mut state, &AnnouncementConfig::default(), &store).await
            .expect("a changed count must produce an edit");

        assert_eq!(count, "6".parse().unwrap());
        assert!(body.contains("6"));
        assert!(Instant::now() - started >= EDIT_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_edits_are_spaced() {
        let mut last_edit = None;

        wait_for_window(&mut last_edit).await;
        let first = last_edit.expect("the first call must stamp the instant");
        assert!(first.elapsed() < EDIT_INTERVAL);

        wait_for_window(&mut last_edit).await;
        let second = last_edit.unwrap();
        assert!(second - first >= EDIT_INTERVAL);

        let far_in_the_future = Instant::now() + 10 * EDIT_INTERVAL;
        tokio::time::sleep_until(far_in_the_future).await;
        wait_for_window(&mut last_edit).await;
        // no extra wait once the window has already elapsed
        assert!(last_edit.unwrap() - far_in_the_future < EDIT_INTERVAL);
    }
}
