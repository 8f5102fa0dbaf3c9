//! Events published by the kernel to notebook front-ends.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Well-known MIME types.
pub mod mime {
    pub const TEXT_PLAIN: &str = "text/plain";
    pub const TEXT_HTML: &str = "text/html";
    pub const APPLICATION_JSON: &str = "application/json";
    pub const IMAGE_PNG: &str = "image/png";
    pub const IMAGE_SVG: &str = "image/svg+xml";
}

/// Identifier of the kernel command an event originates from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(String);

impl CommandId {
    /// A fresh random command id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CommandId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for CommandId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A value rendered to one MIME type.
///
/// Binary payloads (images) are base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedValue {
    pub mime_type: String,
    pub value: String,
}

impl FormattedValue {
    pub fn new(mime_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            value: value.into(),
        }
    }

    pub fn plain(value: impl Into<String>) -> Self {
        Self::new(mime::TEXT_PLAIN, value)
    }
}

/// Events sent from the kernel to front-ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KernelEvent {
    /// A value was displayed.
    DisplayedValueProduced {
        /// Command that displayed the value.
        command_id: CommandId,
        /// Identifies the display slot for later updates.
        value_id: Uuid,
        /// Representations, one per MIME type.
        formatted_values: Vec<FormattedValue>,
    },

    /// A previously displayed value was replaced.
    DisplayedValueUpdated {
        /// Command that performed the update.
        command_id: CommandId,
        /// Slot being updated.
        value_id: Uuid,
        /// New representations.
        formatted_values: Vec<FormattedValue>,
    },

    /// The project package has a valid build.
    ProjectBuilt {
        command_id: CommandId,
        /// Project directory.
        project_dir: String,
        /// Project name from the workspace model.
        project_name: String,
        /// Documents in the workspace.
        documents: Vec<String>,
    },

    /// Building the project package failed.
    ProjectBuildFailed {
        command_id: CommandId,
        project_dir: String,
        /// Build error with recovery hint.
        message: String,
    },

    /// A file change invalidated the project build.
    ProjectInvalidated {
        project_dir: String,
        /// `created`, `changed`, `deleted` or `renamed`.
        change: String,
        /// Path the invalidation was decided on.
        path: String,
    },
}

impl KernelEvent {
    /// The originating command, for events that have one.
    pub fn command_id(&self) -> Option<&CommandId> {
        match self {
            Self::DisplayedValueProduced { command_id, .. }
            | Self::DisplayedValueUpdated { command_id, .. }
            | Self::ProjectBuilt { command_id, .. }
            | Self::ProjectBuildFailed { command_id, .. } => Some(command_id),
            Self::ProjectInvalidated { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_displayed_value_json_shape() {
        let event = KernelEvent::DisplayedValueProduced {
            command_id: CommandId::from("cmd-1"),
            value_id: Uuid::nil(),
            formatted_values: vec![FormattedValue::plain("42")],
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "displayed_value_produced");
        assert_eq!(json["command_id"], "cmd-1");
        assert_eq!(json["formatted_values"][0]["mime_type"], "text/plain");
        assert_eq!(json["formatted_values"][0]["value"], "42");
    }

    #[test]
    fn test_deserialize_invalidated() {
        let json = r#"{"type":"project_invalidated","project_dir":"/p","change":"created","path":"/p/A.cs"}"#;
        let event: KernelEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, KernelEvent::ProjectInvalidated { ref change, .. } if change == "created"));
        assert!(event.command_id().is_none());
    }

    #[test]
    fn test_command_ids_are_unique() {
        assert_ne!(CommandId::new(), CommandId::new());
    }
}
