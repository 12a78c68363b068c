use std::sync::LazyLock;

use regex::Regex;

pub const REASONING_OPEN: &str = "[REASONING]";
pub const REASONING_CLOSE: &str = "[/REASONING]";
pub const ERROR_PREFIX: &str = "[ERROR] ";

static REASONING_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[REASONING\][\s\S]*?\[/REASONING\]").expect("reasoning pattern is valid")
});

/// Removes every `[REASONING]...[/REASONING]` segment and trims the remainder.
pub fn strip_reasoning(text: &str) -> String {
    REASONING_SEGMENT.replace_all(text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_wrapped_reasoning_when_stripping_then_only_visible_text_remains() {
        assert_eq!(strip_reasoning("[REASONING]x[/REASONING]visible"), "visible");
    }

    #[test]
    fn given_stripped_text_when_stripping_again_then_unchanged() {
        let once = strip_reasoning("  [REASONING]a\nb[/REASONING] hi [REASONING]c[/REASONING] ");
        assert_eq!(once, "hi");
        assert_eq!(strip_reasoning(&once), once);
    }

    #[test]
    fn given_unterminated_marker_when_stripping_then_text_is_kept() {
        assert_eq!(strip_reasoning("[REASONING]partial"), "[REASONING]partial");
    }
}
