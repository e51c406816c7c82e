use std::time::{Duration, Instant};

/// Spacing guard for take-offs and flips. The Tello drops (or worse, half
/// executes) a flip sent while the previous one is still in progress.
#[derive(Debug)]
pub struct CommandRateLimit {
    last_takeoff: Option<Instant>,
    last_flip: Option<Instant>,
    min_interval: Duration,
}

impl CommandRateLimit {
    pub fn new(min_interval: Duration) -> Self {
        Self { last_takeoff: None, last_flip: None, min_interval }
    }

    pub fn allow_takeoff(&mut self) -> bool {
        allow(&mut self.last_takeoff, self.min_interval)
    }

    pub fn allow_flip(&mut self) -> bool {
        allow(&mut self.last_flip, self.min_interval)
    }
}

fn allow(last: &mut Option<Instant>, min_interval: Duration) -> bool {
    let now = Instant::now();
    if let Some(t) = *last {
        if now.duration_since(t) < min_interval { return false; }
    }
    *last = Some(now);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_flip_inside_interval_is_refused() {
        let mut lim = CommandRateLimit::new(Duration::from_secs(60));
        assert!(lim.allow_flip());
        assert!(!lim.allow_flip());
        // independent bucket
        assert!(lim.allow_takeoff());
    }

    #[test]
    fn zero_interval_never_limits() {
        let mut lim = CommandRateLimit::new(Duration::ZERO);
        assert!(lim.allow_flip());
        assert!(lim.allow_flip());
        assert!(lim.allow_takeoff());
        assert!(lim.allow_takeoff());
    }
}
