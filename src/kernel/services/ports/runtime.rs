use std::future::Future;
use std::pin::Pin;

/// Fire-and-forget unit of async work. Results travel back over the kernel bus.
pub type TaskFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

pub trait AsyncExecutor: Send + Sync {
    fn spawn(&self, task: TaskFuture);
}
