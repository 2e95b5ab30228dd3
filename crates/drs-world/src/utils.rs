/// Triggers an event at most once every `interval` frames.
#[derive(Debug, Clone)]
pub struct IntervalTrigger {
    interval: u64,
    next_trigger: Option<u64>,
}

impl IntervalTrigger {
    /// Creates a new `IntervalTrigger` with the given interval, due immediately.
    pub fn new(interval: u64) -> Self {
        Self {
            interval,
            next_trigger: None,
        }
    }

    /// Whether the event is due at the given frame.
    pub fn is_due(&self, frame: u64) -> bool {
        self.next_trigger.map_or(true, |next| frame >= next)
    }

    /// Record that the event happened at `frame`.
    pub fn fire(&mut self, frame: u64) {
        self.next_trigger = Some(frame + self.interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger() {
        let mut trigger = IntervalTrigger::new(30);
        assert!(trigger.is_due(5));
        trigger.fire(5);
        assert!(!trigger.is_due(6));
        assert!(!trigger.is_due(34));
        assert!(trigger.is_due(35));
        // stays due until fired again
        assert!(trigger.is_due(80));
        trigger.fire(80);
        assert!(!trigger.is_due(109));
        assert!(trigger.is_due(110));
    }
}
