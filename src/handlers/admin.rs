use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::api::PollApi;
use crate::auth::{AdminSession, Authenticator, Credentials};
use crate::db::{ADMIN_TOKEN_KEY, SessionStore};
use crate::debounce::{DebounceState, Debouncer};
use crate::error::AdminError;
use crate::models::{Book, BookRef, NewPollRequest};

/// State behind the admin screen: the book catalogue, the debounced search
/// box and the draft of the next poll.
pub struct AdminScreen {
    api: Arc<dyn PollApi>,
    store: Arc<dyn SessionStore>,
    auth: Arc<dyn Authenticator>,
    books: Vec<Book>,
    query: Debouncer<String>,
    draft: Vec<BookRef>,
    active: bool,
    session: Option<AdminSession>,
}

impl AdminScreen {
    pub fn new(
        api: Arc<dyn PollApi>,
        store: Arc<dyn SessionStore>,
        auth: Arc<dyn Authenticator>,
        search_delay: Duration,
    ) -> Self {
        Self {
            api,
            store,
            auth,
            books: Vec::new(),
            query: Debouncer::new(String::new(), search_delay),
            draft: Vec::new(),
            active: false,
            session: None,
        }
    }

    /// Picks up a stored admin token if it is still valid, and forgets it otherwise.
    pub async fn restore_session(&mut self) -> Result<(), AdminError> {
        let Some(token) = self.store.get(ADMIN_TOKEN_KEY).await? else {
            return Ok(());
        };
        if self.auth.validate(&token) {
            self.session = Some(AdminSession { token });
        } else {
            info!("Dropping expired admin session");
            self.store.clear(ADMIN_TOKEN_KEY).await?;
        }
        Ok(())
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), AdminError> {
        let session = self.auth.login(&Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        self.store.set(ADMIN_TOKEN_KEY, &session.token).await?;
        self.session = Some(session);
        Ok(())
    }

    pub async fn logout(&mut self) -> Result<(), AdminError> {
        if let Some(session) = self.session.take() {
            self.auth.revoke(&session.token);
        }
        self.store.clear(ADMIN_TOKEN_KEY).await?;
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| self.auth.validate(&session.token))
    }

    fn ensure_authenticated(&self) -> Result<(), AdminError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(AdminError::NotAuthenticated)
        }
    }

    pub async fn load_books(&mut self) {
        match self.api.list_books().await {
            Ok(books) => {
                info!("Loaded {} book(s)", books.len());
                self.books = books;
            }
            Err(e) => error!("Failed to fetch books: {}", e),
        }
    }

    /// Feeds the search box; results follow once typing pauses.
    pub fn search(&mut self, text: &str) {
        self.query.set(text.to_string());
    }

    pub fn is_searching(&self) -> bool {
        self.query.is_pending()
    }

    pub fn query(&self) -> String {
        self.query.value()
    }

    pub fn search_updates(&self) -> watch::Receiver<DebounceState<String>> {
        self.query.subscribe()
    }

    #[cfg(test)]
    pub async fn search_settled(&self) -> String {
        self.query.settled().await
    }

    /// Books matching the settled query that are not already in the draft.
    /// Empty while a search is still pending.
    pub fn visible_books(&self) -> Vec<&Book> {
        if self.is_searching() {
            return Vec::new();
        }
        let needle = self.query.value().to_lowercase();
        self.books
            .iter()
            .filter(|book| book.title.to_lowercase().contains(&needle))
            .filter(|book| !self.draft.iter().any(|picked| picked.id == book.id))
            .collect()
    }

    pub fn draft(&self) -> &[BookRef] {
        &self.draft
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Adds the book at a 1-based position of [`visible_books`](Self::visible_books) to the draft.
    pub fn pick(&mut self, position: usize) -> Result<BookRef, AdminError> {
        self.ensure_authenticated()?;
        let picked = {
            let visible = self.visible_books();
            let book = position
                .checked_sub(1)
                .and_then(|i| visible.get(i))
                .ok_or(AdminError::NoSuchBook(position))?;
            BookRef::from(*book)
        };
        self.draft.push(picked.clone());
        Ok(picked)
    }

    /// Removes the draft entry at a 1-based position.
    pub fn unpick_at(&mut self, position: usize) -> Result<BookRef, AdminError> {
        self.ensure_authenticated()?;
        match position.checked_sub(1).filter(|i| *i < self.draft.len()) {
            Some(i) => Ok(self.draft.remove(i)),
            None => Err(AdminError::NoSuchBook(position)),
        }
    }

    pub fn set_active(&mut self, active: bool) -> Result<(), AdminError> {
        self.ensure_authenticated()?;
        self.active = active;
        Ok(())
    }

    /// Publishes the draft as a new poll and starts a fresh draft.
    pub async fn create_poll(&mut self) -> Result<(), AdminError> {
        self.ensure_authenticated()?;
        if self.draft.is_empty() {
            return Err(AdminError::EmptyDraft);
        }

        let request = NewPollRequest {
            options: self.draft.clone(),
            active_poll: self.active,
        };
        if let Err(e) = self.api.create_poll(&request).await {
            error!("Failed to create poll: {}", e);
            return Err(e.into());
        }
        info!(
            "Created poll with {} option(s), active: {}",
            request.options.len(),
            request.active_poll
        );

        self.draft.clear();
        self.active = false;
        Ok(())
    }
}
