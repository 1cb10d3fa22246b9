use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "active_poll", default)]
    pub is_active: bool,
    pub options: Vec<PollOption>,
    #[serde(rename = "__v", default)]
    pub version: i64,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollOption {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(rename = "votes", default)]
    pub vote_count: u64,
    #[serde(default)]
    pub percentage: String,
}

// One row of GET /api/polls/{id}/stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatRecord {
    pub option_id: String,
    pub count: u64,
    #[serde(default)]
    pub percentage: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "__v", default)]
    pub version: i64,
}

// A book picked into a new poll draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
}

impl From<&Book> for BookRef {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub poll_id: String,
    pub option_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPollRequest {
    pub options: Vec<BookRef>,
    pub active_poll: bool,
}
