mod admin;
mod vote;

pub use admin::AdminScreen;
pub use vote::VoteScreen;
