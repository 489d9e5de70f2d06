use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Per-IP window state: accepted count and when the window resets.
#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window connection limiter. Per-IP tracking.
///
/// The first accepted connection from an address opens a window of
/// `window`; at most `limit` connections are accepted until it expires.
pub struct FixedWindowRateLimiter {
    limit: u32,
    window: Duration,
    entries: Mutex<HashMap<IpAddr, Window>>,
}

impl FixedWindowRateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<IpAddr, Window>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns true if the connection is allowed, false if rate-limited.
    /// A limit of 0 means unlimited (always allows).
    pub fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        if self.limit == 0 {
            return true;
        }

        let mut entries = self.entries();
        let window = entries.entry(ip).or_insert(Window {
            count: 0,
            reset_at: now + self.window,
        });

        if now >= window.reset_at {
            window.count = 0;
            window.reset_at = now + self.window;
        }

        if window.count >= self.limit {
            return false;
        }

        window.count += 1;
        true
    }

    /// Remove IPs whose window has expired (call periodically).
    pub fn sweep(&self) {
        let now = Instant::now();
        self.entries().retain(|_, w| now < w.reset_at);
    }

    /// Number of tracked IPs.
    pub fn entry_count(&self) -> usize {
        self.entries().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn localhost() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
    }

    fn other_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))
    }

    #[test]
    fn test_zero_limit_allows_all() {
        let limiter = FixedWindowRateLimiter::new(0, Duration::from_secs(60));
        for _ in 0..200 {
            assert!(limiter.check(localhost()));
        }
        assert_eq!(limiter.entry_count(), 0);
    }

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = FixedWindowRateLimiter::new(3, Duration::from_secs(60));
        assert!(limiter.check(localhost()));
        assert!(limiter.check(localhost()));
        assert!(limiter.check(localhost()));
        assert!(!limiter.check(localhost())); // 4th denied
        assert!(!limiter.check(localhost())); // denials don't extend anything
    }

    #[test]
    fn test_different_ips_independent() {
        let limiter = FixedWindowRateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check(localhost()));
        assert!(limiter.check(other_ip()));
        assert!(!limiter.check(localhost()));
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let limiter = FixedWindowRateLimiter::new(2, Duration::from_secs(3600));
        let t0 = Instant::now();
        assert!(limiter.check_at(localhost(), t0));
        assert!(limiter.check_at(localhost(), t0 + Duration::from_secs(10)));
        assert!(!limiter.check_at(localhost(), t0 + Duration::from_secs(3599)));
        // Fixed window: the reset is measured from the first connection.
        assert!(limiter.check_at(localhost(), t0 + Duration::from_secs(3600)));
        assert!(limiter.check_at(localhost(), t0 + Duration::from_secs(3601)));
        assert!(!limiter.check_at(localhost(), t0 + Duration::from_secs(3602)));
    }

    #[test]
    fn test_sweep_clears_stale_ips() {
        let limiter = FixedWindowRateLimiter::new(1, Duration::from_millis(1));
        assert!(limiter.check(localhost()));
        std::thread::sleep(Duration::from_millis(5));
        limiter.sweep();
        assert_eq!(limiter.entry_count(), 0);
    }

    #[test]
    fn test_sweep_keeps_live_windows() {
        let limiter = FixedWindowRateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check(localhost()));
        limiter.sweep();
        assert_eq!(limiter.entry_count(), 1);
    }
}
