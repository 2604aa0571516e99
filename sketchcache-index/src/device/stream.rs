use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_STREAM_ID: AtomicU64 = AtomicU64::new(0);

struct StreamState {
    id: u64,
    issued: AtomicU64,
    completed: AtomicU64,
    // Held while work is numbered and executed
    execution: Mutex<()>,
}

/// Ordered queue of accelerator work
///
/// Operations enqueued on one stream take effect in issue order, so a later
/// operation on the same stream always observes the results of earlier ones.
/// Consumers on a different stream must call [`ExecutionStream::wait_for`]
/// before reading results produced here. Clones refer to the same stream and
/// may be used from several threads; their work is serialized in the order it
/// was issued. Work must not enqueue on the stream it is running on.
#[derive(Clone)]
pub struct ExecutionStream {
    state: Arc<StreamState>,
}

impl ExecutionStream {
    pub fn new() -> Self {
        Self {
            state: Arc::new(StreamState {
                id: NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed),
                issued: AtomicU64::new(0),
                completed: AtomicU64::new(0),
                execution: Mutex::new(()),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.state.id
    }

    /// Issue `work` on this stream and return its result
    pub fn enqueue<R>(&self, label: &str, work: impl FnOnce() -> R) -> R {
        let _execution = self.state.execution.lock();
        let position = self.state.issued.fetch_add(1, Ordering::AcqRel);
        tracing::trace!("stream {}: #{} {}", self.state.id, position, label);
        let result = work();
        self.state.completed.fetch_add(1, Ordering::AcqRel);
        result
    }

    /// Number of operations issued so far
    pub fn issued(&self) -> u64 {
        self.state.issued.load(Ordering::Acquire)
    }

    /// Number of operations that have taken effect
    pub fn completed(&self) -> u64 {
        self.state.completed.load(Ordering::Acquire)
    }

    /// Block until every operation issued so far has taken effect
    pub fn synchronize(&self) {
        drop(self.state.execution.lock());
    }

    /// Make work issued after this call on `self` wait for everything issued
    /// so far on `other`
    pub fn wait_for(&self, other: &ExecutionStream) {
        if self.state.id == other.state.id {
            return;
        }
        other.synchronize();
        self.enqueue("wait_for", || ());
    }
}

impl Default for ExecutionStream {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ExecutionStream {
    fn eq(&self, other: &Self) -> bool {
        self.state.id == other.state.id
    }
}

impl Eq for ExecutionStream {}

impl fmt::Debug for ExecutionStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionStream")
            .field("id", &self.state.id)
            .field("issued", &self.issued())
            .field("completed", &self.completed())
            .finish()
    }
}
