//! Rate-limited, forecast-grounded chat.
//!
//! Every admitted question is sent as a fresh system turn (persona plus the
//! current grounding payload) followed by the full visible history. System
//! turns never enter the history itself.

use skywatch_config::AppConfig;
use skywatch_core::provider::{Provider, ProviderRequest};
use skywatch_core::{Conversation, Message};
use skywatch_forecast::{ContextAssembler, GroundingInput, Persona};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::rate_limit::{InteractionRateLimiter, ThrottleNotice};

/// Quick prompts offered before the user types anything.
pub const SUGGESTIONS: [&str; 4] = [
    "Do I need an umbrella today?",
    "What should I wear this afternoon?",
    "Is it a good time to go for a run?",
    "How strong will the wind get?",
];

/// Assistant turn appended when the provider cannot be reached.
pub const OFFLINE_REPLY: &str =
    "I can't reach the assistant service right now (offline). Please try again in a moment.";

/// What happened to one question.
#[derive(Debug, Clone)]
pub enum ChatOutcome {
    /// Empty or whitespace-only input; nothing was recorded.
    Ignored,
    /// Rejected by the rate limiter; history is unchanged.
    Throttled(ThrottleNotice),
    /// The provider answered.
    Reply(Message),
    /// The provider failed; an offline turn was appended.
    Unavailable(Message),
}

pub struct ChatSession {
    provider: Arc<dyn Provider>,
    limiter: InteractionRateLimiter,
    conversation: Conversation,
    assembler: ContextAssembler,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        let chat = &config.chat;
        let mut persona = Persona::named(&chat.assistant_name);
        if let Some(preamble) = &chat.persona_override {
            persona.preamble = preamble.clone();
        }

        Self {
            provider,
            limiter: InteractionRateLimiter::from_config(chat),
            conversation: Conversation::with_greeting(greeting(&chat.assistant_name)),
            assembler: ContextAssembler::new(config.forecast.brief_hours, persona),
            model: config.chat_model_id.clone(),
            temperature: chat.temperature,
            max_tokens: chat.max_tokens,
        }
    }

    /// Ask one question grounded in `grounding`, at wall-clock `now`.
    pub async fn ask(&mut self, text: &str, grounding: &GroundingInput<'_>, now: Instant) -> ChatOutcome {
        let text = text.trim();
        if text.is_empty() {
            return ChatOutcome::Ignored;
        }

        if !self.limiter.try_admit(now) {
            let notice = self.limiter.notice(now);
            warn!(retry_after_ms = notice.retry_after.as_millis() as u64, "Chat request throttled");
            return ChatOutcome::Throttled(notice);
        }

        self.conversation.push(Message::user(text));

        let payload = self.assembler.build_grounding_payload(grounding);
        let mut messages = Vec::with_capacity(self.conversation.len() + 1);
        messages.push(Message::system(self.assembler.system_prompt(&payload)));
        messages.extend(self.conversation.messages.iter().cloned());

        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(
            provider = self.provider.name(),
            turns = request.messages.len(),
            "Sending grounded chat request"
        );

        match self.provider.complete(request).await {
            Ok(response) => {
                self.conversation.push(response.message.clone());
                ChatOutcome::Reply(response.message)
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Chat request failed");
                let offline = Message::assistant(OFFLINE_REPLY);
                self.conversation.push(offline.clone());
                ChatOutcome::Unavailable(offline)
            }
        }
    }

    pub fn history(&self) -> &Conversation {
        &self.conversation
    }

    pub fn limiter(&self) -> &InteractionRateLimiter {
        &self.limiter
    }

    pub fn suggestions(&self) -> &'static [&'static str] {
        &SUGGESTIONS
    }
}

fn greeting(assistant_name: &str) -> String {
    format!("Hi, I'm {assistant_name} 🦊. How can I help you today?")
}
