use chrono::{DateTime, FixedOffset, Locale};

use crate::domain::Message;

pub const DEFAULT_USER_NAME: &str = "l'utilisateur";
pub const DEFAULT_TEMPLATE: &str = "Tu es un assistant conversationnel serviable et précis. \
Tu échanges avec {user}. Nous sommes le {now}. \
Réponds dans la langue de l'utilisateur et formate tes réponses en Markdown.";

const TIMESTAMP_FORMAT: &str = "%A %d %B %Y %H:%M";

/// Who is asking and when, supplied by the calling layer.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub user_name: Option<String>,
    pub now: DateTime<FixedOffset>,
}

impl PromptContext {
    pub fn new(user_name: Option<String>, now: DateTime<FixedOffset>) -> Self {
        Self { user_name, now }
    }
}

/// Renders the system message prepended to every completion request.
#[derive(Debug, Clone)]
pub struct SystemPrompt {
    template: String,
    locale: Locale,
}

impl SystemPrompt {
    pub fn new(template: impl Into<String>, locale: &str) -> Self {
        let locale = Locale::try_from(locale).unwrap_or_else(|_| {
            tracing::warn!(locale, "Unknown prompt locale, falling back to POSIX");
            Locale::POSIX
        });
        Self {
            template: template.into(),
            locale,
        }
    }

    pub fn render(&self, context: &PromptContext) -> Message {
        let user = context
            .user_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_USER_NAME);
        let now = context
            .now
            .format_localized(TIMESTAMP_FORMAT, self.locale)
            .to_string();

        Message::system(
            self.template
                .replace("{user}", user)
                .replace("{now}", &now),
        )
    }

    /// Prefixes `messages` with the rendered system message.
    pub fn prepend(&self, context: &PromptContext, messages: &[Message]) -> Vec<Message> {
        std::iter::once(self.render(context))
            .chain(messages.iter().cloned())
            .collect()
    }
}

impl Default for SystemPrompt {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE, "fr_FR")
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::MessageRole;

    fn context(user_name: Option<&str>) -> PromptContext {
        let offset = FixedOffset::east_opt(3600).unwrap();
        PromptContext::new(
            user_name.map(str::to_string),
            offset.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap(),
        )
    }

    #[test]
    fn given_french_locale_when_rendering_then_timestamp_is_localized() {
        let prompt = SystemPrompt::new("{user} / {now}", "fr_FR");
        let message = prompt.render(&context(Some("Alice")));
        assert_eq!(message.role, MessageRole::System);
        assert_eq!(message.content.text(), "Alice / vendredi 15 mars 2024 09:30");
    }

    #[test]
    fn given_no_user_name_when_rendering_then_uses_default_name() {
        let prompt = SystemPrompt::new("{user}", "en_US");
        assert_eq!(prompt.render(&context(None)).content.text(), DEFAULT_USER_NAME);
    }
}
