//! Async runtime adapter: runs spawned kernel tasks on tokio.

mod runtime;

pub use runtime::AsyncRuntime;
