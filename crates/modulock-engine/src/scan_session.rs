//! Most recent card scan, kept for the registration workflow.

use std::time::{Duration, Instant};

use modulock_core::Uid;

use crate::config::ControllerConfig;

/// A single observed card identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    pub uid: Uid,
    pub observed_at: Instant,
}

/// Remembers the last scanned UID for a limited time.
///
/// Each scan overwrites the previous one. Authorization never consults the
/// session; it only helps an administrator copy a freshly tapped UID into the
/// registration form.
#[derive(Debug, Clone)]
pub struct ScanSession {
    last: Option<ScanEvent>,
    staleness: Duration,
}

impl ScanSession {
    pub fn new(staleness: Duration) -> Self {
        Self {
            last: None,
            staleness,
        }
    }

    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.scan_staleness)
    }

    pub fn record_scan(&mut self, uid: Uid, now: Instant) {
        self.last = Some(ScanEvent {
            uid,
            observed_at: now,
        });
    }

    /// The last scanned UID, if it is younger than the staleness window.
    ///
    /// ```
    /// use std::time::{Duration, Instant};
    /// use modulock_core::Uid;
    /// use modulock_engine::ScanSession;
    ///
    /// let mut session = ScanSession::new(Duration::from_secs(30));
    /// let t0 = Instant::now();
    /// session.record_scan(Uid::parse("AB12CD34").unwrap(), t0);
    ///
    /// assert!(session.last_uid(t0 + Duration::from_millis(29_999)).is_some());
    /// assert!(session.last_uid(t0 + Duration::from_secs(30)).is_none());
    /// ```
    pub fn last_uid(&self, now: Instant) -> Option<&Uid> {
        self.last
            .as_ref()
            .filter(|event| now.saturating_duration_since(event.observed_at) < self.staleness)
            .map(|event| &event.uid)
    }

    /// The last scan regardless of age.
    pub fn last_event(&self) -> Option<&ScanEvent> {
        self.last.as_ref()
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::from_config(&ControllerConfig::default())
    }
}
