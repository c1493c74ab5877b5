use std::sync::Mutex;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Upstream chat-completions endpoint configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4.1-mini".to_string(),
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("PARSONS_LLM_BASE_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("PARSONS_LLM_API_KEY").ok(),
            model: std::env::var("PARSONS_LLM_MODEL").unwrap_or(defaults.model),
        }
    }
}

/// Fixed-window request limiter with one shared window and per-client
/// counts. State is constructor-provided and scoped to this instance.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    window_start: Mutex<Instant>,
    counts: DashMap<String, u32>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            window_start: Mutex::new(Instant::now()),
            counts: DashMap::new(),
        }
    }

    /// Returns true when `key` has exhausted the current window. Counts the
    /// request otherwise.
    pub fn is_limited(&self, key: &str) -> bool {
        self.is_limited_at(key, Instant::now())
    }

    pub fn is_limited_at(&self, key: &str, now: Instant) -> bool {
        let mut start = match self.window_start.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if now.duration_since(*start) > self.window {
            *start = now;
            self.counts.clear();
        }
        drop(start);

        let mut count = self.counts.entry(key.to_string()).or_insert(0);
        if *count >= self.max_requests {
            return true;
        }
        *count += 1;
        false
    }
}

/// Shared application state.
pub struct AppState {
    pub http: reqwest::Client,
    pub limiter: RateLimiter,
    pub llm: LlmConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_cap() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 3);
        let now = Instant::now();
        for _ in 0..3 {
            assert!(!limiter.is_limited_at("1.2.3.4", now));
        }
        assert!(limiter.is_limited_at("1.2.3.4", now));
    }

    #[test]
    fn clients_are_counted_separately() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        let now = Instant::now();
        assert!(!limiter.is_limited_at("a", now));
        assert!(!limiter.is_limited_at("b", now));
        assert!(limiter.is_limited_at("a", now));
    }

    #[test]
    fn window_rollover_resets_counts() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        let t0 = Instant::now();
        assert!(!limiter.is_limited_at("a", t0));
        assert!(limiter.is_limited_at("a", t0));
        assert!(!limiter.is_limited_at("a", t0 + Duration::from_secs(61)));
    }
}
