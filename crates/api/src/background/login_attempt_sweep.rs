//! Periodic pruning of expired failed-login entries.
//!
//! Lockouts expire on their own when checked, but keys that never log in
//! again would otherwise stay in the tracker until capacity eviction.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use entyre_core::login_limiter::LoginAttemptTracker;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(
    tracker: Arc<Mutex<LoginAttemptTracker>>,
    every: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = every.as_secs(), "Login attempt sweep started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Login attempt sweep stopping");
                break;
            }
            _ = interval.tick() => {
                let mut tracker = tracker.lock().await;
                let removed = tracker.sweep(Utc::now());
                if removed > 0 {
                    tracing::info!(removed, remaining = tracker.len(), "Login attempt sweep: pruned expired entries");
                } else {
                    tracing::debug!("Login attempt sweep: nothing to prune");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sweep_prunes_and_stops_on_cancel() {
        let mut tracker = LoginAttemptTracker::new(3, chrono::Duration::seconds(60), 100);
        let key = LoginAttemptTracker::key("10.0.0.1", "alice");
        tracker.record_failure(&key, Utc::now() - chrono::Duration::seconds(600));
        let tracker = Arc::new(Mutex::new(tracker));

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            Arc::clone(&tracker),
            Duration::from_millis(10),
            cancel.clone(),
        ));

        // The first tick fires immediately.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(tracker.lock().await.len(), 0);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweep task should stop")
            .expect("sweep task should not panic");
    }
}
