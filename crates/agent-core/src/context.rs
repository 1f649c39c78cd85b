//! Context Window
//!
//! Selects which part of the transcript is sent to the model. The log itself
//! is never edited.

use std::borrow::Cow;

use crate::message::{Message, Role};

/// Strategy choosing the messages transmitted on each model call
pub trait ContextWindow: Send + Sync {
    fn select<'a>(&self, messages: &'a [Message]) -> Cow<'a, [Message]>;
}

/// Send the whole transcript every time
#[derive(Clone, Copy, Debug, Default)]
pub struct FullHistory;

impl ContextWindow for FullHistory {
    fn select<'a>(&self, messages: &'a [Message]) -> Cow<'a, [Message]> {
        Cow::Borrowed(messages)
    }
}

/// Drop the oldest non-system messages until the estimate fits
#[derive(Clone, Copy, Debug)]
pub struct TokenBudget {
    pub max_tokens: u32,
}

impl TokenBudget {
    pub const fn new(max_tokens: u32) -> Self {
        Self { max_tokens }
    }
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self::new(8192)
    }
}

impl ContextWindow for TokenBudget {
    fn select<'a>(&self, messages: &'a [Message]) -> Cow<'a, [Message]> {
        let total: u32 = messages.iter().map(Message::estimate_tokens).sum();
        if total <= self.max_tokens {
            return Cow::Borrowed(messages);
        }

        let mut kept = messages.to_vec();
        let mut used = total;
        while used > self.max_tokens && kept.len() > 2 {
            // Never remove the newest message
            match kept.iter().position(|m| m.role != Role::System) {
                Some(pos) if pos < kept.len() - 1 => {
                    used -= kept.remove(pos).estimate_tokens();
                }
                _ => break,
            }
        }

        tracing::debug!(
            original = messages.len(),
            kept = kept.len(),
            "Trimmed context window"
        );
        Cow::Owned(kept)
    }
}
