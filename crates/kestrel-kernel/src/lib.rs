//! Kernel-side glue for Kestrel.
//!
//! Display helpers publish MIME-formatted values to the notebook event bus,
//! and [`ProjectPackage`] exposes a watched project build to the kernel,
//! reporting build outcomes and invalidations on the same bus.

pub mod bus;
pub mod display;
pub mod error;
pub mod events;
pub mod package;
pub mod render;

pub use bus::EventBus;
pub use display::{DisplayedValue, KernelContext};
pub use error::{KernelError, KernelResult};
pub use events::{CommandId, FormattedValue, KernelEvent, mime};
pub use package::ProjectPackage;
pub use render::{ImageOutput, Json, Render, formatted_values};
