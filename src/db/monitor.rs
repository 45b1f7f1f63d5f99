//! Background idle-connection monitor.
//!
//! A single tokio task polls on a fixed cadence, independent of the
//! request/response cycle, and force-closes the shared connection once the
//! foreground has been quiet longer than the idle timeout. The monitor is
//! one-way: once stopped it never restarts; a fresh session creates a fresh
//! monitor.

use crate::db::connection::ConnectionHandle;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How often the monitor wakes up to compare timestamps.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Bound on how long `stop` waits for the poller to exit.
const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// State shared between the foreground turn path and the poller.
struct MonitorState {
    last_activity: StdMutex<Instant>,
    stop_requested: AtomicBool,
    wake: Notify,
}

impl MonitorState {
    fn idle_elapsed(&self) -> Duration {
        self.last_activity
            .lock()
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    fn touch(&self) {
        if let Ok(mut t) = self.last_activity.lock() {
            *t = Instant::now();
        }
    }
}

/// Watches a [`ConnectionHandle`] and closes it after inactivity.
pub struct ConnectionMonitor {
    handle: Arc<ConnectionHandle>,
    state: Arc<MonitorState>,
    task: StdMutex<Option<JoinHandle<()>>>,
    idle_timeout: Duration,
}

impl ConnectionMonitor {
    /// Start monitoring with the default 30-second poll cadence.
    pub fn start(handle: Arc<ConnectionHandle>, idle_timeout: Duration) -> Self {
        Self::start_with_poll_interval(handle, idle_timeout, POLL_INTERVAL)
    }

    /// Start monitoring with an explicit poll cadence (tests use short ones).
    pub fn start_with_poll_interval(
        handle: Arc<ConnectionHandle>,
        idle_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        let state = Arc::new(MonitorState {
            last_activity: StdMutex::new(Instant::now()),
            stop_requested: AtomicBool::new(false),
            wake: Notify::new(),
        });

        let task = tokio::spawn(Self::run_loop(
            Arc::clone(&handle),
            Arc::clone(&state),
            idle_timeout,
            poll_interval,
        ));

        info!(
            idle_timeout_secs = idle_timeout.as_secs(),
            poll_interval_secs = poll_interval.as_secs(),
            "Connection monitor started"
        );

        Self {
            handle,
            state,
            task: StdMutex::new(Some(task)),
            idle_timeout,
        }
    }

    async fn run_loop(
        handle: Arc<ConnectionHandle>,
        state: Arc<MonitorState>,
        idle_timeout: Duration,
        poll_interval: Duration,
    ) {
        loop {
            tokio::select! {
                _ = state.wake.notified() => {}
                _ = tokio::time::sleep(poll_interval) => {}
            }

            // Stop flag is observed at the top of each iteration.
            if state.stop_requested.load(Ordering::SeqCst) {
                break;
            }

            let idle = state.idle_elapsed();
            if idle > idle_timeout {
                // Forced close, even if a turn is logically "about to"
                // happen; the handle reconnects on demand.
                if handle.close(true).await {
                    info!(
                        idle_secs = idle.as_secs(),
                        "Closed idle database connection"
                    );
                }
            } else {
                debug!(idle_secs = idle.as_secs(), "Connection monitor sweep");
            }
        }
        debug!("Connection monitor loop exited");
    }

    /// Reset the inactivity clock. Called on every user turn.
    pub fn update_activity(&self) {
        self.state.touch();
    }

    /// Whether `stop` has been requested.
    pub fn is_stopped(&self) -> bool {
        self.state.stop_requested.load(Ordering::SeqCst)
    }

    /// The idle timeout this monitor enforces.
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Stop the monitor: one-way transition.
    ///
    /// Sets the stop flag, wakes the poller, joins it with a bounded
    /// timeout, then force-closes the connection. Safe to call more than
    /// once; later calls only repeat the forced close.
    pub async fn stop(&self) {
        self.state.stop_requested.store(true, Ordering::SeqCst);
        self.state.wake.notify_waiters();

        let task = self.task.lock().ok().and_then(|mut t| t.take());
        if let Some(mut task) = task {
            if tokio::time::timeout(STOP_JOIN_TIMEOUT, &mut task)
                .await
                .is_err()
            {
                warn!("Connection monitor did not exit within the join timeout");
                task.abort();
            }
        }

        self.handle.close(true).await;
        info!("Connection monitor stopped");
    }
}

/// Abort the poller if the session was dropped without an explicit `stop`.
/// The socket itself is released when the handle drops; explicit `stop`
/// remains the supported teardown path.
impl Drop for ConnectionMonitor {
    fn drop(&mut self) {
        if let Ok(mut task) = self.task.lock() {
            if let Some(task) = task.take() {
                task.abort();
            }
        }
    }
}
