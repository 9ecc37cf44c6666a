//! Outbound replies

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

use crate::error::Result;

/// Where a request's replies are delivered, in order
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<()>;

    async fn send_image(&self, png: Vec<u8>, caption: &str) -> Result<()>;
}

/// A single reply message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotReply {
    Text(String),
    Image { png: Vec<u8>, caption: String },
}

impl BotReply {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Image { .. } => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }
}

/// Collects replies in memory
#[derive(Debug, Default)]
pub struct ReplyBuffer {
    replies: Mutex<Vec<BotReply>>,
}

impl ReplyBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, reply: BotReply) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(reply);
    }

    /// Drain everything collected so far
    pub fn take(&self) -> Vec<BotReply> {
        std::mem::take(&mut *self.replies.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[async_trait]
impl ReplySink for ReplyBuffer {
    async fn send_text(&self, text: &str) -> Result<()> {
        self.push(BotReply::Text(text.to_string()));
        Ok(())
    }

    async fn send_image(&self, png: Vec<u8>, caption: &str) -> Result<()> {
        self.push(BotReply::Image {
            png,
            caption: caption.to_string(),
        });
        Ok(())
    }
}
