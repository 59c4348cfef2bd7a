//! Fixed-size pool of rendering sessions.
//!
//! The pool is created once per batch with N sessions. `acquire` waits for a
//! free session and returns a [`SessionGuard`]; dropping the guard returns
//! the session synchronously, whatever path the holder took out (success,
//! error, timeout or panic). `shutdown` waits for every session to come back,
//! closes each exactly once, then tears down the browser.

mod launch;

use crate::browser_profile::remove_profile_dir;
use crate::browser_setup::LaunchedBrowser;
use crate::error::{ResolveError, ResolveResult};
use crate::session::PageSession;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

// =============================================================================
// Pool
// =============================================================================

struct PoolInner {
    idle: Mutex<VecDeque<Box<dyn PageSession>>>,
    permits: Arc<Semaphore>,
    size: usize,
    checked_out: AtomicUsize,
    peak: AtomicUsize,
    browser: tokio::sync::Mutex<Option<LaunchedBrowser>>,
    shut_down: AtomicBool,
}

/// Cloneable handle to a shared session pool
#[derive(Clone)]
pub struct SessionPool {
    inner: Arc<PoolInner>,
}

impl std::fmt::Debug for SessionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPool")
            .field("size", &self.inner.size)
            .field("in_use", &self.in_use())
            .finish_non_exhaustive()
    }
}

impl SessionPool {
    /// Pool over pre-created sessions, with no browser to tear down
    pub fn from_sessions(sessions: Vec<Box<dyn PageSession>>) -> Self {
        Self::with_browser(sessions, None)
    }

    pub(crate) fn with_browser(
        sessions: Vec<Box<dyn PageSession>>,
        browser: Option<LaunchedBrowser>,
    ) -> Self {
        let size = sessions.len();
        Self {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(sessions.into_iter().collect()),
                permits: Arc::new(Semaphore::new(size)),
                size,
                checked_out: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                browser: tokio::sync::Mutex::new(browser),
                shut_down: AtomicBool::new(false),
            }),
        }
    }

    /// Number of sessions the pool was created with
    #[must_use]
    pub fn size(&self) -> usize {
        self.inner.size
    }

    /// Sessions currently checked out
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.inner.checked_out.load(Ordering::SeqCst)
    }

    /// Highest simultaneous checkout count seen so far
    #[must_use]
    pub fn peak_in_use(&self) -> usize {
        self.inner.peak.load(Ordering::SeqCst)
    }

    /// Wait for a free session
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Browser`] once the pool has been shut down.
    pub async fn acquire(&self) -> ResolveResult<SessionGuard> {
        let permit = Arc::clone(&self.inner.permits)
            .acquire_owned()
            .await
            .map_err(|_| ResolveError::Browser("session pool is shut down".to_string()))?;

        let Some(session) = self.inner.idle.lock().pop_front() else {
            // A permit without an idle session means a session was lost
            return Err(ResolveError::Browser("no idle session behind permit".to_string()));
        };

        let now = self.inner.checked_out.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.peak.fetch_max(now, Ordering::SeqCst);
        debug!(in_use = now, size = self.inner.size, "session acquired");

        Ok(SessionGuard {
            session: Some(session),
            pool: Arc::clone(&self.inner),
            _permit: permit,
        })
    }

    /// Close every session exactly once, then the browser.
    ///
    /// Waits for all outstanding guards to be dropped first. Calling it again
    /// is a no-op.
    pub async fn shutdown(&self) -> ResolveResult<()> {
        if self.inner.shut_down.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!(size = self.inner.size, "shutting down session pool");

        let size = u32::try_from(self.inner.size).unwrap_or(u32::MAX);
        let all = self
            .inner
            .permits
            .acquire_many(size)
            .await
            .map_err(|_| ResolveError::Browser("session pool closed during shutdown".to_string()))?;

        let sessions: Vec<Box<dyn PageSession>> = self.inner.idle.lock().drain(..).collect();
        for session in &sessions {
            if let Err(e) = session.close().await {
                warn!("Failed to close session: {e}");
            }
        }
        drop(sessions);
        all.forget();
        self.inner.permits.close();

        if let Some(mut launched) = self.inner.browser.lock().await.take() {
            if let Err(e) = launched.browser.close().await {
                warn!("Failed to close browser: {e}");
            }
            let _ = launched.browser.wait().await;
            launched.handler.abort();
            remove_profile_dir(&launched.user_data_dir);
        }

        info!("session pool shutdown complete");
        Ok(())
    }
}

// =============================================================================
// RAII Guard
// =============================================================================

/// Exclusive use of one pooled session until dropped
pub struct SessionGuard {
    session: Option<Box<dyn PageSession>>,
    pool: Arc<PoolInner>,
    // Dropped after `Drop::drop` has put the session back
    _permit: OwnedSemaphorePermit,
}

impl Deref for SessionGuard {
    type Target = dyn PageSession;

    fn deref(&self) -> &Self::Target {
        match self.session.as_deref() {
            Some(session) => session,
            // Only `drop` takes the session out
            None => unreachable!("session guard used after release"),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.pool.idle.lock().push_back(session);
            let left = self.pool.checked_out.fetch_sub(1, Ordering::SeqCst) - 1;
            debug!(in_use = left, "session released");
        }
    }
}
