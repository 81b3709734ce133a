use futures::future::BoxFuture;
use parking_lot::Mutex;
use tracing::Instrument;

/// Background unit of work; owns everything it touches
pub type Task = BoxFuture<'static, ()>;

/// Fire-and-forget scheduling of background work
pub trait TaskDispatcher: Send + Sync {
    fn enqueue(&self, name: &'static str, task: Task);
}

/// Runs each task on the tokio runtime
#[derive(Debug, Default)]
pub struct TokioDispatcher;

impl TaskDispatcher for TokioDispatcher {
    fn enqueue(&self, name: &'static str, task: Task) {
        tracing::debug!(task = name, "Background task scheduled");
        tokio::spawn(task.instrument(tracing::info_span!("background_task", task = name)));
    }
}

/// Holds tasks until `run_pending` is awaited, for deterministic tests
#[derive(Default)]
pub struct QueuedDispatcher {
    queue: Mutex<Vec<(&'static str, Task)>>,
}

impl QueuedDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Vec<&'static str> {
        self.queue.lock().iter().map(|(name, _)| *name).collect()
    }

    /// Run queued tasks in order, including any they enqueue; returns how many ran
    pub async fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let batch: Vec<(&'static str, Task)> = std::mem::take(&mut *self.queue.lock());
            if batch.is_empty() {
                return ran;
            }
            for (_, task) in batch {
                task.await;
                ran += 1;
            }
        }
    }
}

impl TaskDispatcher for QueuedDispatcher {
    fn enqueue(&self, name: &'static str, task: Task) {
        self.queue.lock().push((name, task));
    }
}
