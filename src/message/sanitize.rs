//! Normalization and deduplication of candidate commit messages.

/// Sanitize raw candidates from a backend.
///
/// Per message: trim surrounding whitespace, strip embedded newline and
/// carriage-return characters, then remove exactly one trailing period when
/// it immediately follows a word character (periods inside version numbers
/// and the like are preserved). Empty results are dropped and duplicates
/// collapse to their first occurrence, preserving the order of the
/// surviving distinct messages. Idempotent.
pub fn sanitize_messages(raw: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(raw.len());
    for message in raw {
        let sanitized = sanitize_message(&message);
        if sanitized.is_empty() {
            continue;
        }
        if !result.contains(&sanitized) {
            result.push(sanitized);
        }
    }
    result
}

fn sanitize_message(raw: &str) -> String {
    let mut message: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .collect();

    if message.ends_with('.') {
        let before_period = message.chars().rev().nth(1);
        if before_period.is_some_and(is_word_char) {
            message.pop();
        }
    }

    message
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
