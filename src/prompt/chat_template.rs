//! Chat template support using Jinja2 templates
//!
//! Renders a conversation into a single prompt string, the way HuggingFace's
//! `apply_chat_template` does when asked for text instead of token IDs.

use anyhow::{anyhow, Result};
use minijinja::{context, Environment, Value};
use serde::{Deserialize, Serialize};

use crate::config::ChatMarkers;

/// ChatML: every turn is `<start>{role}\n{content}<end>\n`
pub const CHATML_TEMPLATE: &str = concat!(
    "{% for message in messages %}",
    "{{ start_marker }}{{ message.role }}\n{{ message.content }}{{ end_marker }}\n",
    "{% endfor %}",
    "{% if add_generation_prompt %}{{ start_marker }}assistant\n{% endif %}"
);

/// Represents a chat message with role and content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        ChatMessage {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

/// Chat template processor using Jinja2
#[derive(Debug, Clone)]
pub struct ChatTemplateProcessor {
    template: String,
    markers: ChatMarkers,
}

impl ChatTemplateProcessor {
    /// Create a processor for a custom template.
    ///
    /// The template sees `messages`, `add_generation_prompt`, `start_marker`
    /// and `end_marker`.
    pub fn new(template: impl Into<String>, markers: ChatMarkers) -> Self {
        ChatTemplateProcessor {
            template: template.into(),
            markers,
        }
    }

    /// ChatML processor with the given role markers
    pub fn chatml(markers: ChatMarkers) -> Self {
        Self::new(CHATML_TEMPLATE, markers)
    }

    pub fn markers(&self) -> &ChatMarkers {
        &self.markers
    }

    /// Apply the chat template to a list of messages
    pub fn apply_chat_template(
        &self,
        messages: &[ChatMessage],
        add_generation_prompt: bool,
    ) -> Result<String> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);

        env.add_template("chat", &self.template)
            .map_err(|e| anyhow!("Failed to add template: {}", e))?;

        let tmpl = env
            .get_template("chat")
            .map_err(|e| anyhow!("Failed to get template: {}", e))?;

        let messages_value: Vec<Value> = messages
            .iter()
            .map(|msg| {
                context! {
                    role => msg.role.clone(),
                    content => msg.content.clone()
                }
            })
            .collect();

        let rendered = tmpl
            .render(context! {
                messages => messages_value,
                add_generation_prompt => add_generation_prompt,
                start_marker => self.markers.start.clone(),
                end_marker => self.markers.end.clone()
            })
            .map_err(|e| anyhow!("Failed to render template: {}", e))?;

        Ok(rendered)
    }
}

impl Default for ChatTemplateProcessor {
    fn default() -> Self {
        Self::chatml(ChatMarkers::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_creation() {
        let msg = ChatMessage::system("You are a helpful assistant");
        assert_eq!(msg.role, "system");
        assert_eq!(msg.content, "You are a helpful assistant");

        let user_msg = ChatMessage::user("Hello!");
        assert_eq!(user_msg.role, "user");

        let assistant_msg = ChatMessage::assistant("Hi there!");
        assert_eq!(assistant_msg.role, "assistant");
    }

    #[test]
    fn test_chatml_rendering() {
        let processor = ChatTemplateProcessor::default();
        let messages = vec![
            ChatMessage::system("You are helpful"),
            ChatMessage::user("Hello <b>there</b>\n"),
        ];

        let result = processor.apply_chat_template(&messages, true).unwrap();
        assert_eq!(
            result,
            "<|im_start|>system\nYou are helpful<|im_end|>\n\
             <|im_start|>user\nHello <b>there</b>\n<|im_end|>\n\
             <|im_start|>assistant\n"
        );
    }

    #[test]
    fn test_without_generation_prompt() {
        let processor = ChatTemplateProcessor::default();
        let result = processor
            .apply_chat_template(&[ChatMessage::user("Test")], false)
            .unwrap();
        assert_eq!(result, "<|im_start|>user\nTest<|im_end|>\n");
    }

    #[test]
    fn test_custom_template_and_markers() {
        let template = "{% for m in messages %}{{ start_marker }}{{ m.role }}: {{ m.content }}{{ end_marker }}{% endfor %}";
        let processor = ChatTemplateProcessor::new(
            template,
            ChatMarkers {
                start: "<s>".to_string(),
                end: "</s>".to_string(),
            },
        );

        let result = processor
            .apply_chat_template(&[ChatMessage::user("Test")], false)
            .unwrap();
        assert_eq!(result, "<s>user: Test</s>");
    }

    #[test]
    fn test_invalid_template_is_an_error() {
        let processor = ChatTemplateProcessor::new("{% for %}", ChatMarkers::default());
        assert!(processor.apply_chat_template(&[], true).is_err());
    }
}
