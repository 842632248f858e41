//! Token-bucket rate limiter keyed by client identity
//!
//! Each (client key, tier) pair owns a bucket that refills continuously at
//! `capacity / refill_period`. Buckets are created lazily, dropped by a
//! scheduled sweep once idle, and the store is capped at `max_keys` entries by
//! evicting the least recently used bucket.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info, warn};

use crate::error::AuthResult;

/// Request class a bucket is accounted against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitTier {
    /// Credential endpoints (register, login)
    Auth,
    /// Every other endpoint
    General,
}

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Bucket size for the auth tier
    pub auth_capacity: u32,
    /// Bucket size for the general tier
    pub general_capacity: u32,
    /// Time for an empty bucket to refill completely
    pub refill_period: Duration,
    /// Buckets untouched for this long are removed by the sweep
    pub idle_timeout: Duration,
    /// Upper bound on stored buckets
    pub max_keys: usize,
    /// Cron expression (with seconds) for the idle sweep
    pub sweep_schedule: String,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            auth_capacity: 5,
            general_capacity: 100,
            refill_period: Duration::from_secs(60),
            idle_timeout: Duration::from_secs(600),
            max_keys: 10_000,
            sweep_schedule: "0 * * * * *".to_string(),
        }
    }
}

impl RateLimiterConfig {
    /// Load the configuration from `RATE_LIMIT_*` environment variables,
    /// falling back to the defaults for anything unset or unparsable
    pub fn from_env() -> Self {
        let defaults = Self::default();

        fn parse<T: std::str::FromStr>(name: &str, default: T) -> T {
            std::env::var(name)
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(default)
        }

        Self {
            auth_capacity: parse("RATE_LIMIT_AUTH_CAPACITY", defaults.auth_capacity).max(1),
            general_capacity: parse("RATE_LIMIT_GENERAL_CAPACITY", defaults.general_capacity)
                .max(1),
            refill_period: Duration::from_secs(
                parse(
                    "RATE_LIMIT_REFILL_SECONDS",
                    defaults.refill_period.as_secs(),
                )
                .max(1),
            ),
            idle_timeout: Duration::from_secs(parse(
                "RATE_LIMIT_IDLE_SECONDS",
                defaults.idle_timeout.as_secs(),
            )),
            max_keys: parse("RATE_LIMIT_MAX_KEYS", defaults.max_keys).max(1),
            sweep_schedule: std::env::var("RATE_LIMIT_SWEEP_SCHEDULE")
                .unwrap_or(defaults.sweep_schedule),
        }
    }

    fn capacity(&self, tier: RateLimitTier) -> u32 {
        match tier {
            RateLimitTier::Auth => self.auth_capacity,
            RateLimitTier::General => self.general_capacity,
        }
    }
}

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateLimitDecision {
    /// Request admitted; whole tokens left in the bucket
    Allowed { remaining: u32 },
    /// Request rejected; a token becomes available after `retry_after`
    Limited { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
    last_seen: Instant,
}

type BucketKey = (String, RateLimitTier);

/// Rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    buckets: Arc<Mutex<HashMap<BucketKey, Bucket>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Take a token for `key` in `tier`
    pub async fn check(&self, key: &str, tier: RateLimitTier) -> RateLimitDecision {
        self.check_at(key, tier, Instant::now()).await
    }

    /// Take a token as of `now`
    pub async fn check_at(&self, key: &str, tier: RateLimitTier, now: Instant) -> RateLimitDecision {
        let capacity = f64::from(self.config.capacity(tier));
        let rate = capacity / self.config.refill_period.as_secs_f64();

        let mut buckets = self.buckets.lock().await;
        let bucket_key = (key.to_string(), tier);

        if !buckets.contains_key(&bucket_key) && buckets.len() >= self.config.max_keys {
            evict_least_recent(&mut buckets);
        }

        let bucket = buckets.entry(bucket_key).or_insert(Bucket {
            tokens: capacity,
            last_refill: now,
            last_seen: now,
        });

        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * rate).min(capacity);
        bucket.last_refill = now;
        bucket.last_seen = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            RateLimitDecision::Allowed {
                remaining: bucket.tokens.floor() as u32,
            }
        } else {
            let retry_after = Duration::from_secs_f64((1.0 - bucket.tokens) / rate);
            debug!("Rate limited key {} on {:?} tier", key, tier);
            RateLimitDecision::Limited { retry_after }
        }
    }

    /// Remove buckets idle for longer than the idle timeout
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Instant::now()).await
    }

    /// Remove buckets idle as of `now`, returning how many were dropped
    pub async fn sweep_at(&self, now: Instant) -> usize {
        let mut buckets = self.buckets.lock().await;
        let before = buckets.len();
        let idle_timeout = self.config.idle_timeout;

        buckets.retain(|_, bucket| now.saturating_duration_since(bucket.last_seen) < idle_timeout);

        before - buckets.len()
    }

    /// Number of buckets currently held
    pub async fn len(&self) -> usize {
        self.buckets.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Schedule the idle sweep on the configured cron expression
    pub async fn start_sweeper(&self) -> AuthResult<JobScheduler> {
        let limiter = self.clone();
        let scheduler = JobScheduler::new().await?;

        let job = Job::new_async(self.config.sweep_schedule.as_str(), move |_, _| {
            let limiter = limiter.clone();
            Box::pin(async move {
                let removed = limiter.sweep().await;
                if removed > 0 {
                    debug!("Rate limiter sweep removed {} idle buckets", removed);
                }
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        info!(
            "Started rate limiter sweep with schedule: {}",
            self.config.sweep_schedule
        );
        Ok(scheduler)
    }

    /// Get the rate limiter configuration
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }
}

fn evict_least_recent(buckets: &mut HashMap<BucketKey, Bucket>) {
    let oldest = buckets
        .iter()
        .min_by_key(|(_, bucket)| bucket.last_seen)
        .map(|(key, _)| key.clone());

    if let Some(key) = oldest {
        warn!("Rate limiter at capacity, evicting bucket for {}", key.0);
        buckets.remove(&key);
    }
}
