//! Messages and the ordered conversation log

use super::effect::Effect;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque unique message token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One entry of the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_error: bool,
}

impl Message {
    pub fn user(id: MessageId, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            role: Role::User,
            text: text.into(),
            created_at,
            is_error: false,
        }
    }

    pub fn model(id: MessageId, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            role: Role::Model,
            text: text.into(),
            created_at,
            is_error: false,
        }
    }

    /// Empty model reply that fragments are appended to
    pub fn placeholder(id: MessageId, created_at: DateTime<Utc>) -> Self {
        Self::model(id, String::new(), created_at)
    }
}

/// What a log effect changed, for client notification
#[derive(Debug, Clone, PartialEq)]
pub enum LogChange {
    Added(Message),
    Updated(Message),
    Replaced,
}

/// Chronological message log; insertion order is display order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    /// A log holding only the given greeting
    pub fn with_greeting(greeting: Message) -> Self {
        Self {
            messages: vec![greeting],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[allow(dead_code)] // Pairs with len()
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().rev().find(|m| &m.id == id)
    }

    fn get_mut(&mut self, id: &MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().rev().find(|m| &m.id == id)
    }

    /// Apply a log-mutating effect. Effects that do not touch the log, or
    /// that name a message no longer present, change nothing.
    pub fn apply(&mut self, effect: &Effect) -> Option<LogChange> {
        match effect {
            Effect::AppendMessage(message) => {
                self.messages.push(message.clone());
                Some(LogChange::Added(message.clone()))
            }
            Effect::AppendFragment { message_id, text } => {
                let message = self.get_mut(message_id)?;
                message.text.push_str(text);
                Some(LogChange::Updated(message.clone()))
            }
            Effect::MarkFailed { message_id, text } => {
                let message = self.get_mut(message_id)?;
                message.text.clone_from(text);
                message.is_error = true;
                Some(LogChange::Updated(message.clone()))
            }
            Effect::ReplaceLog { greeting } => {
                self.messages = vec![greeting.clone()];
                Some(LogChange::Replaced)
            }
            Effect::OpenStream { .. } | Effect::ResetSession { .. } | Effect::CancelStream => None,
        }
    }
}
