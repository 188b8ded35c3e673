use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Sliding one-second per-session click counter (§4.I). The check is atomic
/// with respect to concurrent reads on the same session: the window is
/// guarded by a single lock, held only for the duration of the compare.
pub struct RateLimiter {
    cap: u32,
    window: Mutex<Window>,
}

struct Window {
    started_at: Instant,
    count: u32,
}

impl RateLimiter {
    pub fn new(cap: u32) -> Self {
        Self {
            cap,
            window: Mutex::new(Window {
                started_at: Instant::now(),
                count: 0,
            }),
        }
    }

    /// Returns `true` if this click is allowed under the cap, `false` if the
    /// session has exceeded it within the current one-second window.
    pub async fn try_acquire(&self) -> bool {
        let mut window = self.window.lock().await;
        let now = Instant::now();
        if now.duration_since(window.started_at) >= Duration::from_secs(1) {
            window.started_at = now;
            window.count = 1;
            return true;
        }
        window.count += 1;
        window.count <= self.cap
    }
}
