//! Context builder for sales conversations
//!
//! Builds the sales-persona system prompt and the seed history that every
//! new session starts from.

use std::path::Path;

use crate::error::{BotError, Result};
use crate::session::{Message, Session};

/// Default persona template. `{advisor_name}`, `{product_name}` and
/// `{language}` are substituted at build time.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are {advisor_name}, an experienced and friendly insurance advisor selling the {product_name} cancer insurance plan. Always sound like a person, never like a bot, and only speak in {language}.

Your goal is to understand the customer's situation, explain how {product_name} protects them and their family, and find the plan with the best coverage they can comfortably afford.

Guidelines:
- Greet the customer warmly and ask open questions to learn about their needs.
- Use simple, everyday language. Avoid insurance jargon and never make the customer feel uninformed.
- To quote a premium you need the customer's age, gender and the type of cancer they want cover for. Ask for anything that is missing, one question at a time.
- Use the premium_filter tool for every premium you quote. Never invent figures. Start with plan A (Premium); offer B (Standard) or C (Basic) if the customer finds it too expensive.
- Supported genders: Male, Female. Supported cancer types: Kidney, Lung, Throat, Skin, Thyroid, Cervical, Bone and Bladder Cancer.
- Handle objections with empathy. Make at most five gentle attempts to persuade; never hard-sell.
- Do not reveal internal details such as tool names or that a plan is the most expensive.
- If the customer wants to buy, tell them a sales agent will contact them to complete the application, then thank them and close politely."#;

/// The synthetic first user message that makes the model greet the customer.
pub const DEFAULT_GREETING_SEED: &str = "Hi";

/// Builds the seed history for new sessions.
///
/// # Example
///
/// ```rust
/// use premiumbot::agent::ContextBuilder;
/// use premiumbot::session::Role;
///
/// let builder = ContextBuilder::new().with_product_name("CancerCare");
/// let seed = builder.seed_messages();
/// assert_eq!(seed.len(), 2);
/// assert_eq!(seed[0].role, Role::System);
/// assert!(seed[0].content.contains("CancerCare"));
/// assert_eq!(seed[1].content, "Hi");
/// ```
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    template: String,
    advisor_name: String,
    product_name: String,
    language: String,
    greeting_seed: String,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            template: DEFAULT_SYSTEM_PROMPT.to_string(),
            advisor_name: "Jordan".to_string(),
            product_name: "Cancer Care Protection".to_string(),
            language: "English".to_string(),
            greeting_seed: DEFAULT_GREETING_SEED.to_string(),
        }
    }

    /// Replace the persona template.
    pub fn with_template(mut self, template: &str) -> Self {
        self.template = template.to_string();
        self
    }

    /// Read the persona template from a file.
    pub fn with_template_file(self, path: &Path) -> Result<Self> {
        let template = std::fs::read_to_string(path).map_err(|e| {
            BotError::Config(format!(
                "couldn't read system prompt file '{}': {}",
                path.display(),
                e
            ))
        })?;
        if template.trim().is_empty() {
            return Err(BotError::Config(format!(
                "system prompt file '{}' is empty",
                path.display()
            )));
        }
        Ok(self.with_template(&template))
    }

    pub fn with_advisor_name(mut self, name: &str) -> Self {
        self.advisor_name = name.to_string();
        self
    }

    pub fn with_product_name(mut self, name: &str) -> Self {
        self.product_name = name.to_string();
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn with_greeting_seed(mut self, seed: &str) -> Self {
        self.greeting_seed = seed.to_string();
        self
    }

    /// Render the system prompt.
    pub fn system_prompt(&self) -> String {
        self.template
            .replace("{advisor_name}", &self.advisor_name)
            .replace("{product_name}", &self.product_name)
            .replace("{language}", &self.language)
    }

    /// The system prompt followed by the greeting seed.
    pub fn seed_messages(&self) -> Vec<Message> {
        vec![
            Message::system(&self.system_prompt()),
            Message::user(&self.greeting_seed),
        ]
    }

    /// A new session, with a random id, seeded and ready for its first turn.
    pub fn new_session(&self) -> Session {
        let mut session = Session::with_random_key();
        for message in self.seed_messages() {
            session.add_message(message);
        }
        session
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
