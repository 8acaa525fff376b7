//! Bridge between tokio tasks and the egui frame loop.
//!
//! A spawned call writes its result into a shared slot; the UI thread polls
//! the slot once per frame and applies the result to its own state.

use std::future::Future;
use std::sync::{Arc, Mutex};

pub fn spawn_async<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(future);
}

/// One-shot result of a background task.
#[derive(Debug)]
pub struct AsyncSlot<T> {
    value: Arc<Mutex<Option<T>>>,
}

impl<T: Send + 'static> AsyncSlot<T> {
    /// Run `future` on the runtime and park its output in the returned slot.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let value = Arc::new(Mutex::new(None));
        let writer = Arc::clone(&value);

        spawn_async(async move {
            let result = future.await;
            if let Ok(mut slot) = writer.lock() {
                *slot = Some(result);
            }
        });

        Self { value }
    }

    /// Take the result if the task has finished. Never blocks the frame.
    pub fn take(&self) -> Option<T> {
        self.value.try_lock().ok().and_then(|mut slot| slot.take())
    }
}
