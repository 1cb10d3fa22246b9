use crate::error::AdminError;
use crate::handlers::AdminScreen;

const LOGIN_HINT: &str = "Log in first: login <user> <pass>";

pub(super) async fn login(screen: &mut AdminScreen, username: &str, password: &str) -> Vec<String> {
    match screen.login(username, password).await {
        Ok(()) => {
            screen.load_books().await;
            let mut lines = vec![format!("Logged in as {}.", username)];
            lines.extend(show_books(screen));
            lines
        }
        Err(e) => vec![format!("Login failed: {}", e)],
    }
}

pub(super) async fn logout(screen: &mut AdminScreen) -> Vec<String> {
    match screen.logout().await {
        Ok(()) => vec!["Logged out.".to_string()],
        Err(e) => vec![format!("Logout failed: {}", e)],
    }
}

/// The search results, or a placeholder while the search box is still settling.
pub fn show_books(screen: &AdminScreen) -> Vec<String> {
    if !screen.is_authenticated() {
        return vec![LOGIN_HINT.to_string()];
    }
    if screen.is_searching() {
        return vec!["Searching...".to_string()];
    }

    let visible = screen.visible_books();
    if visible.is_empty() {
        return vec![format!("No books match '{}'.", screen.query())];
    }
    visible
        .iter()
        .enumerate()
        .map(|(i, book)| format!("{:>2}. {}", i + 1, book.title))
        .collect()
}

pub(super) fn search(screen: &mut AdminScreen, text: &str) -> Vec<String> {
    if !screen.is_authenticated() {
        return vec![LOGIN_HINT.to_string()];
    }
    screen.search(text);
    vec!["Searching...".to_string()]
}

pub(super) fn add(screen: &mut AdminScreen, position: usize) -> Vec<String> {
    match screen.pick(position) {
        Ok(book) => {
            let mut lines = vec![format!("Added '{}'.", book.title)];
            lines.extend(show_draft(screen));
            lines
        }
        Err(e) => vec![admin_error_message(&e)],
    }
}

pub(super) fn remove(screen: &mut AdminScreen, position: usize) -> Vec<String> {
    match screen.unpick_at(position) {
        Ok(book) => {
            let mut lines = vec![format!("Removed '{}'.", book.title)];
            lines.extend(show_draft(screen));
            lines
        }
        Err(e) => vec![admin_error_message(&e)],
    }
}

pub(super) fn set_active(screen: &mut AdminScreen, active: bool) -> Vec<String> {
    match screen.set_active(active) {
        Ok(()) => show_draft(screen),
        Err(e) => vec![admin_error_message(&e)],
    }
}

pub(super) fn show_draft(screen: &AdminScreen) -> Vec<String> {
    if !screen.is_authenticated() {
        return vec![LOGIN_HINT.to_string()];
    }
    let mut lines = vec![format!(
        "New poll ({}active):",
        if screen.is_active() { "" } else { "not " }
    )];
    if screen.draft().is_empty() {
        lines.push("  (no books yet, use 'add <n>')".to_string());
    }
    lines.extend(
        screen
            .draft()
            .iter()
            .enumerate()
            .map(|(i, book)| format!("{:>2}. {}", i + 1, book.title)),
    );
    lines
}

pub(super) async fn create(screen: &mut AdminScreen) -> Vec<String> {
    match screen.create_poll().await {
        Ok(()) => vec!["Poll created.".to_string()],
        Err(e) => vec![admin_error_message(&e)],
    }
}

fn admin_error_message(error: &AdminError) -> String {
    match error {
        AdminError::NotAuthenticated => LOGIN_HINT.to_string(),
        AdminError::EmptyDraft => "Add at least one book first.".to_string(),
        AdminError::NoSuchBook(n) => format!("There is no entry {}.", n),
        other => format!("Request failed: {}", other),
    }
}
