use crate::config::WispConfig;
use crate::error::WispError;
use crate::model::{Collection, Prompt};

pub mod collections;
pub mod config;
pub mod create;
pub mod refresh;
pub mod tags;
pub mod update;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-visible notification produced by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_prompts: Vec<Prompt>,
    pub affected_collections: Vec<Collection>,
    pub tags: Vec<String>,
    pub config: Option<WispConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_affected_prompts(mut self, prompts: Vec<Prompt>) -> Self {
        self.affected_prompts = prompts;
        self
    }

    pub fn with_affected_collections(mut self, collections: Vec<Collection>) -> Self {
        self.affected_collections = collections;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_config(mut self, config: WispConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}

/// Turns a failed mutation into the notification shown for it and logs the cause.
///
/// Validation failures never reached the gateway and read as warnings.
pub fn failure(action: &str, err: &WispError) -> CmdMessage {
    match err {
        WispError::Validation(reason) => {
            tracing::debug!(action, %reason, "rejected before request");
            CmdMessage::warning(reason.clone())
        }
        WispError::Unauthorized => {
            tracing::error!(action, "not authorized");
            CmdMessage::error(format!(
                "Could not {}: you are not signed in or the session expired.",
                action
            ))
        }
        other => {
            tracing::error!(action, error = %other, "gateway call failed");
            CmdMessage::error(format!("Could not {}. Please try again.", action))
        }
    }
}

/// Value of a failed read, logged and replaced by the empty value.
pub(crate) fn or_empty<T: Default>(what: &str, result: crate::error::Result<T>) -> T {
    result.unwrap_or_else(|e| {
        tracing::error!(what, error = %e, "read failed, showing nothing");
        T::default()
    })
}
