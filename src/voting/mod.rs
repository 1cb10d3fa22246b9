pub mod display;
pub mod merge;
pub mod selection;

pub use display::render_lines;
pub use merge::merge_poll;
pub use selection::{MAX_CHOICES, Selection};

use crate::models::Poll;

// The server lists polls oldest first, so the current poll is the last one.
// There is no explicit "active poll" id in the API.
pub fn current_poll(polls: Vec<Poll>) -> Option<Poll> {
    polls.into_iter().last()
}
