#[cfg(feature = "metrics")]
use std::time::Instant;

/// Logs how long the enclosing scope took, once it's dropped.
///
/// Does nothing unless the `metrics` feature is enabled.
#[must_use]
pub struct Metric {
    #[cfg(feature = "metrics")]
    name: &'static str,
    #[cfg(feature = "metrics")]
    started_at: Instant,
}

pub fn metric(name: &'static str) -> Metric {
    #[cfg(not(feature = "metrics"))]
    let _ = name;

    Metric {
        #[cfg(feature = "metrics")]
        name,
        #[cfg(feature = "metrics")]
        started_at: Instant::now(),
    }
}

#[cfg(feature = "metrics")]
impl Drop for Metric {
    fn drop(&mut self) {
        log::info!(
            "{}: {}",
            self.name,
            humantime::format_duration(self.started_at.elapsed())
        );
    }
}
