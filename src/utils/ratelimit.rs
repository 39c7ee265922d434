use std::collections::{HashMap, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use serenity::model::id::UserId;
use tokio::sync::Mutex;

const COOLDOWN_SECONDS: u64 = 5;
const GLOBAL_RATE_LIMIT: usize = 50; // requests per window
const RATE_WINDOW_MS: u64 = 1000;

lazy_static! {
    static ref COMMAND_COOLDOWNS: Mutex<Cooldowns> = Mutex::new(Cooldowns::new(COOLDOWN_SECONDS));
    static ref GLOBAL_REQUESTS: Mutex<SlidingWindow> =
        Mutex::new(SlidingWindow::new(GLOBAL_RATE_LIMIT, RATE_WINDOW_MS));
}

/// Per (user, command) cooldown bookkeeping
pub struct Cooldowns {
    seconds: u64,
    last_used: HashMap<(UserId, String), u64>,
    // last time a user was told about an active cooldown, to avoid warning spam
    last_warned: HashMap<(UserId, String), u64>,
}

impl Cooldowns {
    pub fn new(seconds: u64) -> Self {
        Self {
            seconds,
            last_used: HashMap::new(),
            last_warned: HashMap::new(),
        }
    }

    /// `Err((remaining_seconds, should_warn))` while the cooldown is active;
    /// `should_warn` is true only for the first rejection in a cooldown period
    pub fn check(&mut self, user_id: UserId, command: &str, now: u64) -> Result<(), (u64, bool)> {
        let key = (user_id, command.to_string());

        if let Some(&last_time) = self.last_used.get(&key) {
            let elapsed = now.saturating_sub(last_time);
            if elapsed < self.seconds {
                let should_warn = match self.last_warned.get(&key) {
                    Some(&warned_at) => warned_at < last_time,
                    None => true,
                };
                if should_warn {
                    self.last_warned.insert(key, now);
                }
                return Err((self.seconds - elapsed, should_warn));
            }
        }

        self.last_used.insert(key, now);
        Ok(())
    }
}

/// At most `limit` requests in any `window_ms` span
pub struct SlidingWindow {
    limit: usize,
    window_ms: u64,
    requests: VecDeque<u64>,
}

impl SlidingWindow {
    pub fn new(limit: usize, window_ms: u64) -> Self {
        Self {
            limit,
            window_ms,
            requests: VecDeque::new(),
        }
    }

    /// Record a request at `now_ms`, or `Err(ms until a slot frees up)`
    pub fn check(&mut self, now_ms: u64) -> Result<(), u64> {
        let window_start = now_ms.saturating_sub(self.window_ms);
        while matches!(self.requests.front(), Some(&t) if t <= window_start) {
            self.requests.pop_front();
        }

        if self.requests.len() >= self.limit {
            let oldest = self.requests.front().copied().unwrap_or(now_ms);
            return Err((oldest + self.window_ms).saturating_sub(now_ms));
        }

        self.requests.push_back(now_ms);
        Ok(())
    }
}

fn unix_now() -> std::time::Duration {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default()
}

/// Check if a user can execute a command (cooldown not active)
pub async fn check_cooldown(user_id: UserId, command: &str) -> Result<(), (u64, bool)> {
    let now = unix_now().as_secs();
    COMMAND_COOLDOWNS.lock().await.check(user_id, command, now)
}

/// Check the global request rate across all users
pub async fn check_global_rate_limit() -> Result<(), u64> {
    let now = unix_now().as_millis() as u64;
    GLOBAL_REQUESTS.lock().await.check(now)
}

pub fn get_cooldown_seconds() -> u64 {
    COOLDOWN_SECONDS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_blocks_then_expires() {
        let mut cooldowns = Cooldowns::new(5);
        let user = UserId::new(42);

        assert!(cooldowns.check(user, "$chart", 100).is_ok());
        assert_eq!(cooldowns.check(user, "$chart", 102), Err((3, true)));
        // second rejection in the same period is silent
        assert_eq!(cooldowns.check(user, "$chart", 103), Err((2, false)));
        // other commands and users are independent
        assert!(cooldowns.check(user, "$help", 103).is_ok());
        assert!(cooldowns.check(UserId::new(7), "$chart", 103).is_ok());

        assert!(cooldowns.check(user, "$chart", 105).is_ok());
        assert_eq!(cooldowns.check(user, "$chart", 106), Err((4, true)));
    }

    #[test]
    fn test_sliding_window() {
        let mut window = SlidingWindow::new(3, 1000);
        assert!(window.check(1000).is_ok());
        assert!(window.check(1100).is_ok());
        assert!(window.check(1200).is_ok());
        assert_eq!(window.check(1300), Err(700));
        assert!(window.check(2000).is_ok());
        assert_eq!(window.check(2050), Err(50));
    }
}
