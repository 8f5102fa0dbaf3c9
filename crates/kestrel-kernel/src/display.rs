//! Display helpers bound to a kernel command.

use uuid::Uuid;

use crate::bus::EventBus;
use crate::error::KernelResult;
use crate::events::{CommandId, FormattedValue, KernelEvent};
use crate::render::{Render, formatted_values};

/// The command currently executing, and the bus its output goes to.
#[derive(Debug, Clone)]
pub struct KernelContext {
    command_id: CommandId,
    bus: EventBus,
}

impl KernelContext {
    pub fn new(command_id: CommandId, bus: EventBus) -> Self {
        Self { command_id, bus }
    }

    pub fn command_id(&self) -> &CommandId {
        &self.command_id
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Display `value` as the given MIME types (all available when empty).
    ///
    /// Publishes [`KernelEvent::DisplayedValueProduced`] and returns a handle
    /// that can replace the value in place.
    pub fn display(&self, value: &dyn Render, mime_types: &[&str]) -> KernelResult<DisplayedValue> {
        let formatted = formatted_values(value, mime_types)?;
        Ok(self.produce(formatted))
    }

    /// Display text that is already in `mime_type`.
    pub fn display_as(&self, text: impl Into<String>, mime_type: &str) -> DisplayedValue {
        self.produce(vec![FormattedValue::new(mime_type, text)])
    }

    fn produce(&self, formatted_values: Vec<FormattedValue>) -> DisplayedValue {
        let value_id = Uuid::new_v4();
        tracing::trace!(
            "Command {} displayed value {} ({} formats)",
            self.command_id,
            value_id,
            formatted_values.len()
        );

        self.bus.publish(KernelEvent::DisplayedValueProduced {
            command_id: self.command_id.clone(),
            value_id,
            formatted_values,
        });

        DisplayedValue {
            value_id,
            mime_types: Vec::new(),
            context: self.clone(),
        }
    }
}

/// Handle to a value shown on the front-end.
#[derive(Debug, Clone)]
pub struct DisplayedValue {
    value_id: Uuid,
    /// MIME types used for updates; empty means all available.
    mime_types: Vec<String>,
    context: KernelContext,
}

impl DisplayedValue {
    pub fn value_id(&self) -> Uuid {
        self.value_id
    }

    /// Restrict later updates to these MIME types.
    pub fn with_mime_types<I, S>(mut self, mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mime_types = mime_types.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the displayed value, keeping the same value id.
    pub fn update(&self, value: &dyn Render) -> KernelResult<()> {
        let mime_types: Vec<&str> = self.mime_types.iter().map(String::as_str).collect();
        let formatted_values = formatted_values(value, &mime_types)?;

        self.context.bus.publish(KernelEvent::DisplayedValueUpdated {
            command_id: self.context.command_id.clone(),
            value_id: self.value_id,
            formatted_values,
        });
        Ok(())
    }
}
