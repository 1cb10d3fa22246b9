use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::models::{Book, NewPollRequest, Poll, StatRecord, VoteRequest};

/// The poll backend as seen by the client.
#[async_trait]
pub trait PollApi: Send + Sync {
    async fn list_polls(&self) -> Result<Vec<Poll>, ApiError>;
    async fn poll_stats(&self, poll_id: &str) -> Result<Vec<StatRecord>, ApiError>;
    async fn vote(&self, request: &VoteRequest) -> Result<(), ApiError>;
    async fn list_books(&self) -> Result<Vec<Book>, ApiError>;
    async fn create_poll(&self, request: &NewPollRequest) -> Result<(), ApiError>;
}

pub struct HttpPollApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPollApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        let body = checked_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn post_json<B: serde::Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self.client.post(&url).json(body).send().await?;
        // the response body carries nothing we need
        checked_body(response).await?;
        Ok(())
    }
}

async fn checked_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

#[async_trait]
impl PollApi for HttpPollApi {
    async fn list_polls(&self) -> Result<Vec<Poll>, ApiError> {
        self.get_json("/api/polls").await
    }

    async fn poll_stats(&self, poll_id: &str) -> Result<Vec<StatRecord>, ApiError> {
        self.get_json(&format!("/api/polls/{}/stats", poll_id)).await
    }

    async fn vote(&self, request: &VoteRequest) -> Result<(), ApiError> {
        self.post_json("/api/vote", request).await
    }

    async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        self.get_json("/api/books").await
    }

    async fn create_poll(&self, request: &NewPollRequest) -> Result<(), ApiError> {
        self.post_json("/api/new_poll", request).await
    }
}

#[cfg(test)]
pub mod fake {
    //! In-process stand-in for the backend, shared by the screen tests.

    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakePollApi {
        pub polls: Mutex<Vec<Poll>>,
        pub stats: Mutex<Vec<StatRecord>>,
        pub books: Mutex<Vec<Book>>,
        pub votes: Mutex<Vec<VoteRequest>>,
        pub created: Mutex<Vec<NewPollRequest>>,
        pub stats_calls: Mutex<Vec<String>>,
        pub fail: Mutex<bool>,
    }

    impl FakePollApi {
        pub fn failing(&self) {
            *self.fail.lock().unwrap() = true;
        }

        fn check(&self) -> Result<(), ApiError> {
            if *self.fail.lock().unwrap() {
                return Err(ApiError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PollApi for FakePollApi {
        async fn list_polls(&self) -> Result<Vec<Poll>, ApiError> {
            self.check()?;
            Ok(self.polls.lock().unwrap().clone())
        }

        async fn poll_stats(&self, poll_id: &str) -> Result<Vec<StatRecord>, ApiError> {
            self.check()?;
            self.stats_calls.lock().unwrap().push(poll_id.to_string());
            Ok(self.stats.lock().unwrap().clone())
        }

        async fn vote(&self, request: &VoteRequest) -> Result<(), ApiError> {
            self.check()?;
            self.votes.lock().unwrap().push(request.clone());
            Ok(())
        }

        async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
            self.check()?;
            Ok(self.books.lock().unwrap().clone())
        }

        async fn create_poll(&self, request: &NewPollRequest) -> Result<(), ApiError> {
            self.check()?;
            self.created.lock().unwrap().push(request.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalised() {
        let api = HttpPollApi::new("http://localhost:3000/");
        assert_eq!(api.url("/api/polls"), "http://localhost:3000/api/polls");
    }
}
