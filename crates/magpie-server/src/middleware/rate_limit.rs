//! Login rate limiting.
//!
//! Tracks failed login attempts per identifier and locks the identifier
//! out once the attempt quota inside the window is exhausted. Attempts
//! are recorded before credential validation so probing wrong passwords
//! counts against the quota.

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct LoginRateLimitConfig {
    /// Attempts allowed inside the window before lockout.
    pub max_attempts: u32,
    /// Sliding window over which attempts accumulate.
    pub window: Duration,
    /// How long an identifier stays locked once the quota is exhausted.
    pub lockout_duration: Duration,
    /// Whether limiting is enforced at all.
    pub enabled: bool,
}

impl Default for LoginRateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::from_secs(60),
            lockout_duration: Duration::from_secs(300),
            enabled: true,
        }
    }
}

#[derive(Debug)]
struct LoginAttemptEntry {
    attempts: u32,
    first_attempt: Instant,
    locked_until: Option<Instant>,
}

pub struct LoginRateLimiter {
    attempts: DashMap<String, LoginAttemptEntry>,
    config: LoginRateLimitConfig,
}

impl LoginRateLimiter {
    pub fn new(config: LoginRateLimitConfig) -> Self {
        Self {
            attempts: DashMap::new(),
            config,
        }
    }

    /// Checks whether the identifier is currently locked out.
    ///
    /// Returns the remaining lockout duration when it is.
    pub fn check_attempt(&self, identifier: &str) -> Result<(), Duration> {
        if !self.config.enabled {
            return Ok(());
        }

        let now = Instant::now();

        if let Some(entry) = self.attempts.get(identifier)
            && let Some(locked_until) = entry.locked_until
            && now < locked_until
        {
            return Err(locked_until - now);
        }

        Ok(())
    }

    /// Records a login attempt for the identifier.
    ///
    /// Call this before validating credentials so failed guesses always
    /// count. A successful login clears the slate via [`record_success`].
    ///
    /// [`record_success`]: LoginRateLimiter::record_success
    pub fn record_attempt(&self, identifier: &str) {
        if !self.config.enabled {
            return;
        }

        let now = Instant::now();

        let mut entry = self
            .attempts
            .entry(identifier.to_string())
            .or_insert_with(|| LoginAttemptEntry {
                attempts: 0,
                first_attempt: now,
                locked_until: None,
            });

        if now.duration_since(entry.first_attempt) > self.config.window
            && entry.locked_until.is_none_or(|locked_until| now >= locked_until)
        {
            entry.attempts = 0;
            entry.first_attempt = now;
            entry.locked_until = None;
        }

        entry.attempts += 1;

        if entry.attempts >= self.config.max_attempts && entry.locked_until.is_none() {
            entry.locked_until = Some(now + self.config.lockout_duration);
            warn!(
                "login identifier {} locked out after {} attempts",
                identifier, entry.attempts
            );
        }
    }

    /// Clears the attempt history after a successful login.
    pub fn record_success(&self, identifier: &str) {
        self.attempts.remove(identifier);
    }

    /// Drops entries whose window and lockout have both expired.
    pub fn cleanup(&self) {
        let now = Instant::now();
        let before = self.attempts.len();

        self.attempts.retain(|_, entry| {
            if let Some(locked_until) = entry.locked_until
                && now < locked_until
            {
                return true;
            }

            now.duration_since(entry.first_attempt)
                < self.config.window + self.config.lockout_duration
        });

        let removed = before.saturating_sub(self.attempts.len());
        if removed > 0 {
            debug!("login rate limiter dropped {} stale entries", removed);
        }
    }

    pub fn tracked_identifiers(&self) -> usize {
        self.attempts.len()
    }
}

pub static LOGIN_RATE_LIMITER: LazyLock<LoginRateLimiter> =
    LazyLock::new(|| LoginRateLimiter::new(LoginRateLimitConfig::default()));

pub fn check_login_rate_limit(identifier: &str) -> Result<(), Duration> {
    LOGIN_RATE_LIMITER.check_attempt(identifier)
}

pub fn record_login_attempt(identifier: &str) {
    LOGIN_RATE_LIMITER.record_attempt(identifier);
}

pub fn record_login_success(identifier: &str) {
    LOGIN_RATE_LIMITER.record_success(identifier);
}

/// Spawns the periodic cleanup task for the global limiter.
pub fn start_cleanup_task() {
    tokio::spawn(async {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            LOGIN_RATE_LIMITER.cleanup();
        }
    });
}
