//! Per-view cancellation of in-flight fetches.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{AbortHandle, Abortable};
use shared_types::AppError;

#[derive(Default)]
struct ScopeInner {
    cancelled: AtomicBool,
    handles: Mutex<Vec<AbortHandle>>,
}

/// Owned by one view. Every fetch the view starts goes through
/// [`FetchScope::guard`]; cancelling the scope on unmount makes those
/// fetches resolve to [`AppError::cancelled`] instead of touching state.
#[derive(Clone, Default)]
pub struct FetchScope {
    inner: Arc<ScopeInner>,
}

impl FetchScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Abort everything in flight and refuse future work. Idempotent.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        let handles = match self.inner.handles.lock() {
            Ok(mut handles) => std::mem::take(&mut *handles),
            Err(_) => return,
        };
        tracing::debug!(in_flight = handles.len(), "fetch scope cancelled");
        for handle in handles {
            handle.abort();
        }
    }

    /// Run `fut` under this scope. Resolves to `Cancelled` if the scope is
    /// cancelled before or while the future runs.
    pub async fn guard<T, F>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        let (handle, registration) = AbortHandle::new_pair();
        {
            let mut handles = match self.inner.handles.lock() {
                Ok(handles) => handles,
                Err(_) => return Err(AppError::cancelled()),
            };
            // Checked under the lock so a concurrent `cancel` cannot miss us.
            if self.is_cancelled() {
                return Err(AppError::cancelled());
            }
            handles.retain(|h| !h.is_aborted());
            handles.push(handle.clone());
        }

        let result = match Abortable::new(fut, registration).await {
            Ok(result) => result,
            Err(_aborted) => Err(AppError::cancelled()),
        };
        // Finished work no longer needs to be aborted; marking it lets the
        // next `guard` prune it.
        handle.abort();

        if self.is_cancelled() {
            return Err(AppError::cancelled());
        }
        result
    }
}

/// Cancels the scope when dropped. Views hold one for their lifetime.
pub struct ScopeGuard(FetchScope);

impl ScopeGuard {
    pub fn new(scope: FetchScope) -> Self {
        Self(scope)
    }

    pub fn scope(&self) -> &FetchScope {
        &self.0
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.0.cancel();
    }
}
