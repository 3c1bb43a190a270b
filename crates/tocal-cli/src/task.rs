//! Task words from the command line.
//!
//! `@N` sets the duration in minutes and `+N` the day offset. Only the first
//! word carrying each prefix is taken, and only its leading digits count, so
//! `@15min` is fifteen minutes. Everything else is the summary.

use std::str::FromStr;

use anyhow::{anyhow, Result};
use tocal_engine::TaskRequest;

const DURATION_PREFIX: char = '@';
const OFFSET_PREFIX: char = '+';

/// Split the positional words into a [`TaskRequest`].
///
/// Words are re-split on whitespace, so a quoted summary and separate words
/// give the same result. A blank summary is left for the scheduler to
/// reject.
pub fn parse_task_args(args: &[String]) -> Result<TaskRequest> {
    let mut words: Vec<&str> = args.iter().flat_map(|arg| arg.split_whitespace()).collect();

    let duration = take_number::<i64>(&mut words, DURATION_PREFIX)?;
    let offset = take_number::<u32>(&mut words, OFFSET_PREFIX)?;

    let mut request = TaskRequest::new(words.join(" "));
    request.duration_minutes = duration;
    request.offset_days = offset;
    Ok(request)
}

/// Remove the first word that starts with `prefix` followed by a digit and
/// return the number it carries.
fn take_number<N: FromStr>(words: &mut Vec<&str>, prefix: char) -> Result<Option<N>> {
    let found = words.iter().enumerate().find_map(|(i, &word)| {
        let digits = leading_digits(word.strip_prefix(prefix)?);
        (!digits.is_empty()).then_some((i, word, digits))
    });
    let Some((index, word, digits)) = found else {
        return Ok(None);
    };

    let value = digits
        .parse::<N>()
        .map_err(|_| anyhow!("number in '{word}' is out of range"))?;
    words.remove(index);
    Ok(Some(value))
}

fn leading_digits(s: &str) -> &str {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    &s[..end]
}

// ── Tests ───────────────────────────────────────────────────────────────────
