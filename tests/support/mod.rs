//! Scripted in-memory completion service for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use memoduet::completion::{CompletionService, ModelTier};
use memoduet::types::Conversation;
use memoduet::{DialogueError, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One recorded call
#[derive(Debug, Clone)]
pub struct Request {
    pub messages: Conversation,
    pub tier: ModelTier,
    pub max_tokens: usize,
}

/// Replays queued replies, then falls back to a fixed reply (or an error)
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<Result<String>>>,
    fallback: Option<String>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedCompletion {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every call returns `reply`
    pub fn repeating(reply: impl Into<String>) -> Self {
        Self::new(Vec::new()).with_fallback(reply)
    }

    pub fn with_fallback(mut self, reply: impl Into<String>) -> Self {
        self.fallback = Some(reply.into());
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn tiers(&self) -> Vec<ModelTier> {
        self.requests().iter().map(|r| r.tier).collect()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, messages: &Conversation, tier: ModelTier, max_tokens: usize) -> Result<String> {
        self.requests.lock().unwrap().push(Request {
            messages: messages.clone(),
            tier,
            max_tokens,
        });

        match self.replies.lock().unwrap().pop_front() {
            Some(reply) => reply,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| DialogueError::Completion("script exhausted".to_string())),
        }
    }
}

pub fn ok(text: impl Into<String>) -> Result<String> {
    Ok(text.into())
}

pub fn fail(message: &str) -> Result<String> {
    Err(DialogueError::Completion(message.to_string()))
}

/// Reply text the estimator prices at `tokens` content tokens
pub fn reply_of_tokens(tokens: usize) -> String {
    "w".repeat(tokens * 4)
}
