//! Splitting a typed line into tokens the way a chat-style host does.

/// Tokens for execution: whitespace-separated, empty pieces dropped.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split_whitespace().map(String::from).collect()
}

/// Tokens for completion. A line ending in whitespace yields a trailing
/// empty token, which is the (empty) token being typed.
pub fn tokenize_partial(line: &str) -> Vec<String> {
    let mut tokens = tokenize(line);
    if line.is_empty() || line.ends_with(char::is_whitespace) {
        tokens.push(String::new());
    }
    tokens
}
