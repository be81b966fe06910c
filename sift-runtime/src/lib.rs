//! Tokio runtime owned by the `sift` binary, with one shutdown token.
//!
//! Long-lived helpers (terminal event feeders, the TUI tick) are spawned with
//! [`SiftHandle::spawn_until_cancelled`] and stop when the runtime shuts down.
//! A pipeline run is spawned plainly: it always runs to completion or error.
use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct SiftHandle {
    inner: Handle,
    cancel: CancellationToken,
}

pub struct SiftRuntime {
    runtime: Runtime,
    cancel: CancellationToken,
}

impl SiftRuntime {
    /// Build a multi-threaded runtime.
    ///
    /// ```
    /// use sift_runtime::SiftRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = SiftRuntime::build("doctest-runtime", Some(1))
    ///     .expect("runtime builds");
    /// let value = runtime.block_on(async { 2 + 2 });
    /// assert_eq!(value, 4);
    /// runtime.shutdown(Duration::from_millis(10));
    /// ```
    pub fn build(thread_name: &str, worker_threads: Option<usize>) -> Result<Self> {
        let mut builder = Builder::new_multi_thread();
        builder.enable_all().thread_name(thread_name);

        if let Some(workers) = worker_threads {
            builder.worker_threads(workers.max(1));
        }

        let runtime = builder.build()?;
        Ok(Self {
            runtime,
            cancel: CancellationToken::new(),
        })
    }

    pub fn handle(&self) -> SiftHandle {
        SiftHandle {
            inner: self.runtime.handle().clone(),
            cancel: self.cancel.clone(),
        }
    }

    pub fn block_on<F: Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    /// Cancel the shared token, then give tasks `graceful` to wind down.
    pub fn shutdown(self, graceful: Duration) {
        tracing::debug!(graceful_ms = graceful.as_millis() as u64, "runtime.shutdown");
        self.cancel.cancel();
        self.runtime.shutdown_timeout(graceful);
    }
}

impl SiftHandle {
    pub fn spawn<F, T>(&self, fut: F) -> JoinHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.inner.spawn(fut)
    }

    /// Spawn a task that is dropped once the shared token is cancelled.
    /// Resolves to `None` when cancellation won the race.
    ///
    /// ```
    /// use sift_runtime::SiftRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = SiftRuntime::build("cancel-example", Some(1)).unwrap();
    /// let handle = runtime.handle();
    /// let task = handle.spawn_until_cancelled(std::future::pending::<()>());
    /// handle.cancellation().cancel();
    /// let out = runtime.block_on(async move { task.await.unwrap() });
    /// assert_eq!(out, None);
    /// runtime.shutdown(Duration::from_millis(5));
    /// ```
    pub fn spawn_until_cancelled<F, T>(&self, fut: F) -> JoinHandle<Option<T>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let cancel = self.cancel.clone();
        self.inner.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => None,
                out = fut => Some(out),
            }
        })
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }
}
