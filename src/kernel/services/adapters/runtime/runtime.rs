use std::future::Future;
use std::io;

use crate::kernel::services::ports::{AsyncExecutor, TaskFuture};

/// Owns the tokio runtime background requests run on. Results are not
/// returned here; tasks report back through the kernel bus.
pub struct AsyncRuntime {
    runtime: tokio::runtime::Runtime,
}

impl AsyncRuntime {
    pub fn new() -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("whisperline-rt")
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        Ok(Self { runtime })
    }

    pub fn tokio_handle(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    /// Runs `future` to completion on the calling thread. Not for use from
    /// inside a runtime task.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

impl AsyncExecutor for AsyncRuntime {
    fn spawn(&self, task: TaskFuture) {
        drop(self.runtime.spawn(task));
    }
}
