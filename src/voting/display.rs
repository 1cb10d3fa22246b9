use crate::models::Poll;
use crate::voting::Selection;

const BAR_WIDTH: usize = 20;

// Leading integer of a percentage string, clamped to 0..=100.
// Servers send values like "33.33"; an empty or garbled string counts as 0,
// a digit run too long for u64 counts as 100.
pub fn percent_value(percentage: &str) -> u8 {
    let digits: String = percentage
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse::<u64>().map(|p| p.min(100) as u8).unwrap_or(100)
}

pub fn percent_label(percentage: &str) -> String {
    if percentage.is_empty() {
        "0%".to_string()
    } else {
        format!("{}%", percentage)
    }
}

fn bar(percentage: &str) -> String {
    let filled = percent_value(percentage) as usize * BAR_WIDTH / 100;
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// One display line per option, numbered from 1.
pub fn render_lines(poll: &Poll, selection: &Selection) -> Vec<String> {
    poll.options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let mark = if selection.contains(&option.id) { "x" } else { " " };
            format!(
                "{:>2}. [{}] {} {} [{}] ({} votes)",
                i + 1,
                mark,
                option.title,
                percent_label(&option.percentage),
                bar(&option.percentage),
                option.vote_count
            )
        })
        .collect()
}
