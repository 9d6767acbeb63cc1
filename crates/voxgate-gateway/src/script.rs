use serde::Deserialize;

/// Fixed prompts, spoken lines and escalation policy for a call.
///
/// The hand-off policy itself lives in `system_prompt`: the model is told to
/// answer with the escalation sentinel when a human should take over.
#[derive(Debug, Clone, Deserialize)]
pub struct CallScript {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Spoken on pickup. Never generated by the language model.
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// Number the caller is transferred to on escalation.
    #[serde(default)]
    pub operator_number: String,
    #[serde(default = "default_transfer_timeout_secs")]
    pub transfer_timeout_secs: u32,
    /// Escalation count at which the call ends instead of transferring.
    #[serde(default = "default_max_escalations")]
    pub max_escalations: u32,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_reprompt")]
    pub reprompt: String,
    #[serde(default = "default_transfer_notice")]
    pub transfer_notice: String,
    #[serde(default = "default_manager_unavailable")]
    pub manager_unavailable: String,
    #[serde(default = "default_transfer_failed")]
    pub transfer_failed: String,
    #[serde(default = "default_apology")]
    pub apology: String,
}

fn default_system_prompt() -> String {
    "You are Neela, a friendly and knowledgeable phone call assistant from the Albany Hindu Temple in Albany, NY. \
     Provide concise and helpful responses that are no longer than 2 lines. \
     If there are any questions that are not related to the temple, tell them you can only answer questions related to the temple. \
     For anyone who wants to make a puja booking, collect their name, email address and puja name. \
     If you cannot answer a question or if the user asks for a manager or human, respond with exactly \"TRANSFER_TO_MANAGER\" as your message. \
     If you detect frustration or multiple repeated questions from the user, respond with \"TRANSFER_TO_MANAGER\"."
        .to_string()
}

fn default_greeting() -> String {
    "Hello, I'm Neela from Albany Hindu Temple. How can I assist you today?".to_string()
}

fn default_transfer_timeout_secs() -> u32 {
    20
}

fn default_max_escalations() -> u32 {
    3
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_reprompt() -> String {
    "Sorry, I didn't catch that. Could you please repeat?".to_string()
}

fn default_transfer_notice() -> String {
    "I'll transfer you to our manager now. Please hold.".to_string()
}

fn default_manager_unavailable() -> String {
    "I apologize, but our manager seems unavailable at the moment. Please try calling back later."
        .to_string()
}

fn default_transfer_failed() -> String {
    "I apologize, but I couldn't reach our manager. Let me try to help you instead.".to_string()
}

fn default_apology() -> String {
    "An error occurred. Please try again later.".to_string()
}

impl Default for CallScript {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            greeting: default_greeting(),
            operator_number: String::new(),
            transfer_timeout_secs: default_transfer_timeout_secs(),
            max_escalations: default_max_escalations(),
            language: default_language(),
            reprompt: default_reprompt(),
            transfer_notice: default_transfer_notice(),
            manager_unavailable: default_manager_unavailable(),
            transfer_failed: default_transfer_failed(),
            apology: default_apology(),
        }
    }
}
