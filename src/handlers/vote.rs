use log::{error, info, warn};
use std::sync::Arc;

use crate::api::PollApi;
use crate::db::{ALREADY_VOTED_KEY, SessionStore};
use crate::error::VoteError;
use crate::models::{Poll, StatRecord, VoteRequest};
use crate::voting::{Selection, current_poll, merge_poll};

/// State behind the voting screen: the current poll, its stats, the merged
/// view shown to the visitor and the options they have ticked.
pub struct VoteScreen {
    api: Arc<dyn PollApi>,
    store: Arc<dyn SessionStore>,
    poll: Option<Poll>,
    stats: Vec<StatRecord>,
    merged: Option<Poll>,
    selection: Selection,
}

impl VoteScreen {
    pub fn new(api: Arc<dyn PollApi>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            store,
            poll: None,
            stats: Vec::new(),
            merged: None,
            selection: Selection::new(),
        }
    }

    #[cfg(test)]
    pub fn poll(&self) -> Option<&Poll> {
        self.poll.as_ref()
    }

    /// The poll with vote counts filled in from the latest stats.
    pub fn merged(&self) -> Option<&Poll> {
        self.merged.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    fn recompute(&mut self) {
        self.merged = merge_poll(self.poll.as_ref(), &self.stats);
    }

    /// Fetches the poll list and makes its last entry current, then loads its stats.
    /// Failures are logged and leave the screen as it was.
    pub async fn load_poll(&mut self) {
        let polls = match self.api.list_polls().await {
            Ok(polls) => polls,
            Err(e) => {
                error!("Failed to fetch polls: {}", e);
                return;
            }
        };

        let Some(poll) = current_poll(polls) else {
            warn!("Server returned no polls");
            return;
        };

        let switched = self.poll.as_ref().map(|p| p.id != poll.id).unwrap_or(true);
        if switched {
            info!("Current poll is {}", poll.id);
            // stats and choices belong to the previous poll
            self.stats.clear();
            self.selection.clear();
        }
        self.poll = Some(poll);
        self.recompute();
        self.load_stats().await;
    }

    pub async fn load_stats(&mut self) {
        let Some(poll_id) = self.poll.as_ref().map(|p| p.id.clone()) else {
            return;
        };

        match self.api.poll_stats(&poll_id).await {
            Ok(stats) => {
                self.stats = stats;
                self.recompute();
            }
            Err(e) => error!("Failed to fetch stats for poll {}: {}", poll_id, e),
        }
    }

    pub async fn already_voted(&self) -> bool {
        let Some(poll) = &self.poll else {
            return false;
        };
        match self.store.get(ALREADY_VOTED_KEY).await {
            Ok(voted) => voted.as_deref() == Some(poll.id.as_str()),
            Err(e) => {
                error!("Failed to read vote marker: {}", e);
                false
            }
        }
    }

    /// Whether ticking more options is blocked.
    pub async fn is_locked(&self) -> bool {
        self.selection.is_full() || self.already_voted().await
    }

    /// Ticks or unticks the option at a 1-based display position.
    /// Returns false when the option was not added because three are already chosen.
    pub async fn toggle(&mut self, position: usize) -> Result<bool, VoteError> {
        let option_id = {
            let poll = self.merged.as_ref().ok_or(VoteError::NoPoll)?;
            let option = position
                .checked_sub(1)
                .and_then(|i| poll.options.get(i))
                .ok_or(VoteError::NoSuchOption(position))?;
            option.id.clone()
        };
        if self.already_voted().await {
            return Err(VoteError::AlreadyVoted);
        }
        Ok(self.selection.toggle(&option_id))
    }

    pub fn reset_choices(&mut self) {
        self.selection.clear();
    }

    /// Sends the chosen options as this client's vote.
    pub async fn submit(&mut self) -> Result<(), VoteError> {
        if self.selection.is_empty() {
            return Err(VoteError::NothingChosen);
        }
        let poll_id = self.poll.as_ref().map(|p| p.id.clone()).ok_or(VoteError::NoPoll)?;
        if self.already_voted().await {
            return Err(VoteError::AlreadyVoted);
        }

        let request = VoteRequest {
            poll_id: poll_id.clone(),
            option_ids: self.selection.ids().to_vec(),
        };
        if let Err(e) = self.api.vote(&request).await {
            error!("Failed to submit vote for poll {}: {}", poll_id, e);
            return Err(e.into());
        }
        info!("Voted in poll {} for {} option(s)", poll_id, request.option_ids.len());

        self.load_stats().await;
        self.selection.clear();
        // the server has counted the vote, so a lost marker is not a failed vote
        if let Err(e) = self.store.set(ALREADY_VOTED_KEY, &poll_id).await {
            error!("Failed to remember vote in poll {}: {}", poll_id, e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakePollApi;
    use crate::db::MemorySessionStore;
    use crate::error::StoreError;
    use crate::models::PollOption;
    use async_trait::async_trait;
    use chrono::Utc;

    // Reads nothing back and refuses every write.
    struct ReadOnlyStore;

    #[async_trait]
    impl SessionStore for ReadOnlyStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn clear(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn poll(id: &str, option_ids: &[&str]) -> Poll {
        Poll {
            id: id.to_string(),
            is_active: true,
            options: option_ids
                .iter()
                .map(|o| PollOption {
                    id: o.to_string(),
                    title: format!("Book {}", o),
                    vote_count: 0,
                    percentage: String::new(),
                })
                .collect(),
            version: 0,
            date: Utc::now(),
        }
    }

    fn stat(option_id: &str, count: u64, percentage: &str) -> StatRecord {
        StatRecord {
            option_id: option_id.to_string(),
            count,
            percentage: percentage.to_string(),
            title: String::new(),
        }
    }

    fn screen_with(api: FakePollApi) -> (VoteScreen, Arc<FakePollApi>, Arc<MemorySessionStore>) {
        let api = Arc::new(api);
        let store = Arc::new(MemorySessionStore::new());
        let screen = VoteScreen::new(api.clone(), store.clone());
        (screen, api, store)
    }

    fn backend() -> FakePollApi {
        let api = FakePollApi::default();
        *api.polls.lock().unwrap() = vec![poll("old", &["x"]), poll("p1", &["a", "b", "c", "d"])];
        *api.stats.lock().unwrap() = vec![stat("a", 3, "75"), stat("b", 1, "25")];
        api
    }

    #[tokio::test]
    async fn load_poll_merges_stats_of_last_poll() {
        let (mut screen, api, _) = screen_with(backend());
        screen.load_poll().await;

        let merged = screen.merged().unwrap();
        assert_eq!(merged.id, "p1");
        assert_eq!(merged.options[0].vote_count, 3);
        assert_eq!(merged.options[1].percentage, "25");
        assert_eq!(merged.options[2].vote_count, 0);
        assert_eq!(*api.stats_calls.lock().unwrap(), vec!["p1".to_string()]);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_screen_empty() {
        let api = backend();
        api.failing();
        let (mut screen, _, _) = screen_with(api);
        screen.load_poll().await;
        assert!(screen.poll().is_none());
        assert!(screen.merged().is_none());
    }

    #[tokio::test]
    async fn stats_are_not_requested_without_a_poll() {
        let (mut screen, api, _) = screen_with(FakePollApi::default());
        screen.load_poll().await;
        screen.load_stats().await;
        assert!(api.stats_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_vote_is_rejected_before_any_request() {
        let (mut screen, api, _) = screen_with(backend());
        screen.load_poll().await;

        assert!(matches!(screen.submit().await, Err(VoteError::NothingChosen)));
        assert!(api.votes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn at_most_three_options() {
        let (mut screen, _, _) = screen_with(backend());
        screen.load_poll().await;

        for position in 1..=3 {
            assert!(screen.toggle(position).await.unwrap());
        }
        assert!(screen.is_locked().await);
        assert!(!screen.toggle(4).await.unwrap());
        assert!(matches!(screen.toggle(9).await, Err(VoteError::NoSuchOption(9))));
        assert!(matches!(screen.toggle(0).await, Err(VoteError::NoSuchOption(0))));

        screen.reset_choices();
        assert!(!screen.is_locked().await);
    }

    #[tokio::test]
    async fn vote_is_sent_once_and_remembered() {
        let (mut screen, api, store) = screen_with(backend());
        screen.load_poll().await;
        screen.toggle(2).await.unwrap();
        screen.toggle(1).await.unwrap();

        screen.submit().await.unwrap();

        let votes = api.votes.lock().unwrap().clone();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].poll_id, "p1");
        assert_eq!(votes[0].option_ids, vec!["b".to_string(), "a".to_string()]);
        assert!(screen.selection().is_empty());
        assert_eq!(store.get(ALREADY_VOTED_KEY).await.unwrap().as_deref(), Some("p1"));
        assert!(screen.already_voted().await);
        assert!(screen.is_locked().await);
        // stats refreshed after voting
        assert_eq!(api.stats_calls.lock().unwrap().len(), 2);

        assert!(matches!(screen.toggle(1).await, Err(VoteError::AlreadyVoted)));
    }

    #[tokio::test]
    async fn failed_vote_keeps_choices() {
        let (mut screen, api, store) = screen_with(backend());
        screen.load_poll().await;
        screen.toggle(1).await.unwrap();
        api.failing();

        assert!(matches!(screen.submit().await, Err(VoteError::Api(_))));
        assert_eq!(screen.selection().ids().len(), 1);
        assert_eq!(store.get(ALREADY_VOTED_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn vote_marker_only_locks_its_own_poll() {
        let (mut screen, _, store) = screen_with(backend());
        store.set(ALREADY_VOTED_KEY, "old").await.unwrap();
        screen.load_poll().await;
        assert!(!screen.already_voted().await);
        assert!(screen.toggle(1).await.unwrap());
    }

    #[tokio::test]
    async fn vote_counts_even_if_marker_cannot_be_saved() {
        let api = Arc::new(backend());
        let mut screen = VoteScreen::new(api.clone(), Arc::new(ReadOnlyStore));
        screen.load_poll().await;
        screen.toggle(1).await.unwrap();

        assert!(screen.submit().await.is_ok());
        assert_eq!(api.votes.lock().unwrap().len(), 1);
        assert!(screen.selection().is_empty());
    }

    #[tokio::test]
    async fn failed_reload_keeps_loaded_poll_and_choices() {
        let (mut screen, api, _) = screen_with(backend());
        screen.load_poll().await;
        screen.toggle(2).await.unwrap();
        let before = screen.merged().cloned();
        api.failing();

        screen.load_poll().await;

        assert_eq!(screen.poll().map(|p| p.id.as_str()), Some("p1"));
        assert_eq!(screen.merged().cloned(), before);
        assert_eq!(screen.selection().ids(), ["b"]);
    }

    #[tokio::test]
    async fn failed_stats_refresh_keeps_previous_counts() {
        let (mut screen, api, _) = screen_with(backend());
        screen.load_poll().await;
        *api.stats.lock().unwrap() = vec![stat("c", 9, "90")];
        api.failing();

        screen.load_stats().await;

        let merged = screen.merged().unwrap();
        assert_eq!(merged.options[0].vote_count, 3);
        assert_eq!(merged.options[0].percentage, "75");
        assert_eq!(merged.options[1].vote_count, 1);
        assert_eq!(merged.options[2].vote_count, 0);
    }
}
