use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::language::Language;

/// An utterance delivered by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Stable conversation identifier (chat id, session id, ...).
    pub conversation_id: String,
    /// Raw user text.
    pub text: String,
    /// Client locale, if the transport knows it (e.g., "it-IT").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale_hint: Option<String>,
    /// Region the transport already knows for this user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_hint: Option<String>,
}

impl IncomingMessage {
    pub fn new(conversation_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            text: text.into(),
            locale_hint: None,
            region_hint: None,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale_hint = Some(locale.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region_hint = Some(region.into());
        self
    }
}

/// What kind of reply the pipeline produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Link,
    Disambiguation,
    NoMatch,
    Smalltalk,
    OffTopic,
    TransientError,
    InvalidInput,
    Command,
}

/// A link button rendered under the reply text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

/// Reply payload handed back to the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    /// Unique reply ID (UUIDv7 for time-sortability).
    pub request_id: Uuid,
    pub conversation_id: String,
    pub kind: ReplyKind,
    pub language: Language,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<LinkButton>,
    pub responded_at: DateTime<Utc>,
}

impl Reply {
    pub fn new(
        conversation_id: impl Into<String>,
        kind: ReplyKind,
        language: Language,
        text: impl Into<String>,
    ) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            conversation_id: conversation_id.into(),
            kind,
            language,
            text: text.into(),
            buttons: Vec::new(),
            responded_at: Utc::now(),
        }
    }

    pub fn with_buttons(mut self, buttons: Vec<LinkButton>) -> Self {
        self.buttons = buttons;
        self
    }
}
