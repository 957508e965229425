use std::time::{Duration, Instant};

/// A wall-clock countdown.
///
/// The countdown starts when the timer is built and is given a time limit
/// in seconds; [f64::INFINITY] stands for the absence of a limit. A limit
/// of zero makes the timer expired from the start.
///
/// # Example
///
/// ```
/// # use rupaco::utils::CountdownTimer;
/// let timer = CountdownTimer::new(f64::INFINITY);
/// assert!(!timer.is_expired());
/// ```
pub struct CountdownTimer {
    start: Instant,
    limit: Option<Duration>,
}

impl CountdownTimer {
    /// Builds a new countdown timer given its limit in seconds.
    ///
    /// Limits too large to be represented by a [Duration] are handled as
    /// the absence of a limit.
    pub fn new(max_time: f64) -> Self {
        CountdownTimer {
            start: Instant::now(),
            limit: Duration::try_from_secs_f64(max_time.max(0.)).ok(),
        }
    }

    /// Returns `true` if and only if the time limit has been reached.
    pub fn is_expired(&self) -> bool {
        match self.limit {
            Some(limit) => self.start.elapsed() >= limit,
            None => false,
        }
    }

    /// Returns the time elapsed since the timer was built.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
