use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("admin credentials are not configured")]
    NotConfigured,
}

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("choose at least one option")]
    NothingChosen,
    #[error("you have already voted in this poll")]
    AlreadyVoted,
    #[error("no poll is loaded")]
    NoPoll,
    #[error("there is no option {0}")]
    NoSuchOption(usize),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("log in as admin first")]
    NotAuthenticated,
    #[error("the new poll has no books")]
    EmptyDraft,
    #[error("there is no book {0}")]
    NoSuchBook(usize),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
