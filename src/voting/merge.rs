use crate::models::{Poll, StatRecord};

/// Joins a poll with its separately fetched vote statistics.
///
/// Every option of the returned copy starts from zero votes and an empty
/// percentage, then takes the count and percentage of the stat record with a
/// matching `option_id`. Records for unknown options are skipped, and when
/// several records name the same option the last one wins. Option order and
/// ids are always those of `poll`.
pub fn merge_poll(poll: Option<&Poll>, stats: &[StatRecord]) -> Option<Poll> {
    let poll = poll?;

    let mut merged = poll.clone();
    for option in &mut merged.options {
        option.vote_count = 0;
        option.percentage.clear();
    }

    for stat in stats {
        if let Some(option) = merged.options.iter_mut().find(|o| o.id == stat.option_id) {
            option.vote_count = stat.count;
            option.percentage = stat.percentage.clone();
        }
    }

    Some(merged)
}
