//! Process-wide pacing delay applied between successive outbound requests.
//! Set in seconds, stored and read in milliseconds. Last write wins; readers
//! never lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::{SessionError, SessionResult};

static PAUSE_MS: AtomicU64 = AtomicU64::new(0);

/// Store `seconds * 1000` and return the stored milliseconds. Negative values
/// (and values that overflow) are rejected, leaving the setting unchanged.
pub fn set_pause(seconds: i64) -> SessionResult<u64> {
    if seconds < 0 {
        return Err(SessionError::InvalidPause(seconds));
    }
    let millis = (seconds as u64)
        .checked_mul(1000)
        .ok_or(SessionError::InvalidPause(seconds))?;
    PAUSE_MS.store(millis, Ordering::Relaxed);
    tracing::info!(target: "ssui::session", "request pause set to {}ms", millis);
    Ok(millis)
}

pub fn pause_ms() -> u64 {
    PAUSE_MS.load(Ordering::Relaxed)
}

pub fn pause_duration() -> Duration {
    Duration::from_millis(pause_ms())
}

/// Wait out the current pause; returns immediately when it is zero.
pub async fn throttle() {
    let d = pause_duration();
    if !d.is_zero() {
        tokio::time::sleep(d).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial(pause)]
    fn seconds_to_millis() {
        assert_eq!(set_pause(20).unwrap(), 20_000);
        assert_eq!(pause_ms(), 20_000);
        assert_eq!(pause_duration(), Duration::from_secs(20));
        assert_eq!(set_pause(0).unwrap(), 0);
        assert_eq!(pause_ms(), 0);
    }

    #[test]
    #[serial(pause)]
    fn negative_is_rejected_and_keeps_previous_value() {
        set_pause(3).unwrap();
        let err = set_pause(-1).expect_err("negative");
        assert!(matches!(err, SessionError::InvalidPause(-1)));
        assert_eq!(pause_ms(), 3_000);
        assert!(set_pause(i64::MAX).is_err());
        assert_eq!(pause_ms(), 3_000);
        set_pause(0).unwrap();
    }

    #[tokio::test(start_paused = true)]
    #[serial(pause)]
    async fn throttle_waits_for_pause() {
        set_pause(2).unwrap();
        let start = tokio::time::Instant::now();
        throttle().await;
        assert!(start.elapsed() >= Duration::from_secs(2));
        set_pause(0).unwrap();
        let start = tokio::time::Instant::now();
        throttle().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
