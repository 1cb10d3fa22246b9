use crate::error::VoteError;
use crate::handlers::VoteScreen;
use crate::voting::{MAX_CHOICES, render_lines};

pub(super) async fn show(screen: &VoteScreen) -> Vec<String> {
    let Some(poll) = screen.merged() else {
        return vec!["No poll loaded. Try 'refresh'.".to_string()];
    };

    let mut lines = vec!["Choose a book".to_string()];
    if screen.already_voted().await {
        lines.push("You have already voted.".to_string());
    } else if screen.is_locked().await {
        lines.push(format!(
            "You can choose only {} options. Type 'reset' to start over.",
            MAX_CHOICES
        ));
    }
    lines.extend(render_lines(poll, screen.selection()));
    lines
}

pub(super) async fn refresh(screen: &mut VoteScreen) -> Vec<String> {
    screen.load_poll().await;
    show(screen).await
}

pub(super) async fn choose(screen: &mut VoteScreen, position: usize) -> Vec<String> {
    match screen.toggle(position).await {
        Ok(true) => show(screen).await,
        Ok(false) => vec![format!(
            "You can choose only {} options. Type 'reset' to start over.",
            MAX_CHOICES
        )],
        Err(e) => vec![vote_error_message(&e)],
    }
}

pub(super) async fn reset(screen: &mut VoteScreen) -> Vec<String> {
    screen.reset_choices();
    show(screen).await
}

pub(super) async fn vote(screen: &mut VoteScreen) -> Vec<String> {
    match screen.submit().await {
        Ok(()) => {
            let mut lines = vec!["Thanks, your vote is counted.".to_string()];
            lines.extend(show(screen).await);
            lines
        }
        Err(e) => vec![vote_error_message(&e)],
    }
}

fn vote_error_message(error: &VoteError) -> String {
    match error {
        VoteError::NothingChosen => "Choose at least one option.".to_string(),
        VoteError::AlreadyVoted => "You have already voted.".to_string(),
        VoteError::Api(_) | VoteError::Store(_) => format!("Vote failed: {}", error),
        other => format!("{}.", capitalize(&other.to_string())),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
