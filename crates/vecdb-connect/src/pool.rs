//! Worker pool for managed-cloud request fan-out.
//!
//! A [`WorkerPool`] is a dedicated multi-thread tokio runtime with a fixed
//! number of worker threads. Remote connections dispatch their requests onto
//! it, so a batch of queries runs in parallel on at most that many threads.
//!
//! Ownership follows [`PoolSpec`]: a pool built from a worker count belongs to
//! the connection and is shut down with it; a pool handed in by the caller is
//! shared and left running.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::ConnectError;

/// Upper bound on the default worker count.
pub const MAX_DEFAULT_WORKERS: usize = 32;

/// Default worker count: available parallelism plus four, capped at
/// [`MAX_DEFAULT_WORKERS`].
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_add(4)
        .min(MAX_DEFAULT_WORKERS)
}

/// Bounded pool of worker threads.
#[derive(Debug)]
pub struct WorkerPool {
    workers: usize,
    runtime: Mutex<Option<Runtime>>,
}

impl WorkerPool {
    /// Build a pool with exactly `workers` threads.
    ///
    /// # Errors
    ///
    /// Returns `ConnectError::InvalidConfig` when `workers` is zero.
    pub fn new(workers: usize) -> Result<Self, ConnectError> {
        if workers == 0 {
            return Err(ConnectError::InvalidConfig(
                "request thread pool size must be > 0".to_string(),
            ));
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(workers)
            .thread_name("vecdb-request")
            .enable_all()
            .build()?;

        debug!(workers, "Created request worker pool");
        Ok(Self {
            workers,
            runtime: Mutex::new(Some(runtime)),
        })
    }

    /// Build a pool with [`default_worker_count`] threads.
    pub fn with_default_workers() -> Result<Self, ConnectError> {
        Self::new(default_worker_count())
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn is_shutdown(&self) -> bool {
        self.runtime().is_none()
    }

    /// Stop accepting work and release the worker threads.
    ///
    /// Tasks still in flight are cancelled. Safe to call from async code and
    /// more than once.
    pub fn shutdown(&self) {
        if let Some(runtime) = self.runtime().take() {
            runtime.shutdown_background();
            info!(workers = self.workers, "Request worker pool shut down");
        }
    }

    /// Spawn `future` onto the pool.
    pub fn spawn<F>(&self, future: F) -> Result<JoinHandle<F::Output>, ConnectError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let runtime = self.runtime();
        let runtime = runtime.as_ref().ok_or(ConnectError::PoolShutdown)?;
        Ok(runtime.spawn(future))
    }

    /// Run `future` on the pool and wait for its output.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, ConnectError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.spawn(future)?
            .await
            .map_err(|e| ConnectError::Worker(e.to_string()))
    }

    /// Run every future in `futures` on the pool concurrently.
    ///
    /// Outputs are returned in input order. Nothing is spawned if the pool is
    /// already shut down.
    pub async fn run_all<I, F>(&self, futures: I) -> Result<Vec<F::Output>, ConnectError>
    where
        I: IntoIterator<Item = F>,
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let handles = {
            let runtime = self.runtime();
            let runtime = runtime.as_ref().ok_or(ConnectError::PoolShutdown)?;
            futures
                .into_iter()
                .map(|future| runtime.spawn(future))
                .collect::<Vec<_>>()
        };

        join_all(handles)
            .await
            .into_iter()
            .map(|result| result.map_err(|e| ConnectError::Worker(e.to_string())))
            .collect()
    }

    fn runtime(&self) -> MutexGuard<'_, Option<Runtime>> {
        self.runtime.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// How a remote connection obtains its worker pool.
#[derive(Debug, Clone)]
pub enum PoolSpec {
    /// Build a new pool with this many workers; owned by the connection
    WorkerCount(usize),
    /// Use a pool the caller already built; never shut down by the connection
    Existing(Arc<WorkerPool>),
}

impl From<usize> for PoolSpec {
    fn from(workers: usize) -> Self {
        PoolSpec::WorkerCount(workers)
    }
}

impl From<Arc<WorkerPool>> for PoolSpec {
    fn from(pool: Arc<WorkerPool>) -> Self {
        PoolSpec::Existing(pool)
    }
}

/// A pool provisioned for one connection.
///
/// Dropping an owned pool shuts it down even if clones of the inner `Arc` are
/// still alive; dropping a shared pool leaves it running.
#[derive(Debug)]
pub struct ProvisionedPool {
    pool: Arc<WorkerPool>,
    owned: bool,
}

impl ProvisionedPool {
    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }

    pub fn workers(&self) -> usize {
        self.pool.workers()
    }
}

impl Drop for ProvisionedPool {
    fn drop(&mut self) {
        if self.owned {
            self.pool.shutdown();
        }
    }
}

/// Turn an optional [`PoolSpec`] into a pool for a remote connection.
///
/// # Errors
///
/// Returns `ConnectError::InvalidConfig` for a zero worker count.
pub fn provision(spec: Option<PoolSpec>) -> Result<ProvisionedPool, ConnectError> {
    let provisioned = match spec {
        Some(PoolSpec::WorkerCount(workers)) => ProvisionedPool {
            pool: Arc::new(WorkerPool::new(workers)?),
            owned: true,
        },
        Some(PoolSpec::Existing(pool)) => ProvisionedPool { pool, owned: false },
        None => ProvisionedPool {
            pool: Arc::new(WorkerPool::with_default_workers()?),
            owned: true,
        },
    };
    debug!(
        workers = provisioned.workers(),
        owned = provisioned.owned,
        "Provisioned request worker pool"
    );
    Ok(provisioned)
}
