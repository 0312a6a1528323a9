//! Services layer (ports + adapters).
//!
//! - `ports`: pure contracts/types used across the app (kernel-facing).
//! - `adapters`: OS/runtime specific implementations (IO/async).
//! - `auth`, `completion`: the connection manager and request pipeline
//!   built on top of the ports.

pub mod adapters;
pub mod auth;
pub mod bus;
pub mod completion;
pub mod host;
pub mod ports;

pub use auth::{AuthError, AuthManager, ConnectionSnapshot};
pub use bus::{kernel_bus, KernelBusReceiver, KernelBusSender, KernelMessage};
pub use completion::{CompletionError, CompletionPipeline};
pub use host::{KernelServiceContext, KernelServiceHost};
