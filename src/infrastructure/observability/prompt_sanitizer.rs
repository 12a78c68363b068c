const MAX_VISIBLE_CHARS: usize = 100;

const SECRET_MARKERS: [&str; 5] = ["Bearer ", "sk-", "api_key=", "password=", "token="];

/// Shortens and redacts user-supplied text before it reaches the logs.
pub fn sanitize_prompt(prompt: &str) -> String {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let total = trimmed.chars().count();
    let visible = if total > MAX_VISIBLE_CHARS {
        let head: String = trimmed.chars().take(MAX_VISIBLE_CHARS).collect();
        format!("{head}... ({total} chars total)")
    } else {
        trimmed.to_string()
    };

    redact_secrets(&visible)
}

fn redact_secrets(text: &str) -> String {
    let mut result = text.to_string();
    for marker in SECRET_MARKERS {
        let mut from = 0;
        while let Some(found) = result[from..].find(marker) {
            let start = from + found + marker.len();
            let end = result[start..]
                .find(|c: char| c.is_whitespace() || matches!(c, '&' | '"' | '\''))
                .map(|i| start + i)
                .unwrap_or(result.len());
            result.replace_range(start..end, "[REDACTED]");
            from = start + "[REDACTED]".len();
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_api_key_in_prompt_when_sanitizing_then_key_is_redacted() {
        let sanitized = sanitize_prompt("my key is sk-or-v1-deadbeef please");
        assert_eq!(sanitized, "my key is sk-[REDACTED] please");
    }

    #[test]
    fn given_long_prompt_when_sanitizing_then_truncated_with_total() {
        let sanitized = sanitize_prompt(&"a".repeat(150));
        assert!(sanitized.ends_with("... (150 chars total)"));
    }

    #[test]
    fn given_blank_prompt_when_sanitizing_then_marked_empty() {
        assert_eq!(sanitize_prompt("  \n"), "[EMPTY]");
    }
}
