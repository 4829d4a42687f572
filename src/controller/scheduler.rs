use crate::model::ObstacleDescriptor;

/// Monotonic scene time in milliseconds, advanced by the frame loop
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SceneClock {
    now_ms: f64,
}

impl SceneClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Negative or NaN deltas are ignored so time never runs backwards
    pub fn advance(&mut self, dt_ms: f64) {
        if dt_ms > 0.0 {
            self.now_ms += dt_ms;
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }
}

#[derive(Debug, Clone)]
struct PendingSpawn {
    deadline_ms: f64,
    order: usize,
    descriptor: ObstacleDescriptor,
}

/// One-shot spawn deadlines checked against the scene clock.
///
/// Every armed descriptor is handed out by [`due`](Self::due) exactly once,
/// on the first call where the clock has reached its deadline.
#[derive(Debug, Clone, Default)]
pub struct ObstacleScheduler {
    pending: Vec<PendingSpawn>,
    fired: usize,
}

impl ObstacleScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm one deadline per descriptor, relative to `start_ms`.
    pub fn arm(&mut self, descriptors: &[ObstacleDescriptor], start_ms: f64) {
        let base = self.pending.len() + self.fired;
        self.pending.extend(descriptors.iter().enumerate().map(|(i, d)| PendingSpawn {
            deadline_ms: start_ms + d.delay_ms as f64,
            order: base + i,
            descriptor: d.clone(),
        }));
        // latest deadline first, so due ones pop off the end
        self.pending.sort_by(|a, b| {
            b.deadline_ms
                .total_cmp(&a.deadline_ms)
                .then(b.order.cmp(&a.order))
        });
    }

    /// Remove and return everything due at `now_ms`, earliest deadline first;
    /// equal deadlines keep list order.
    pub fn due(&mut self, now_ms: f64) -> Vec<ObstacleDescriptor> {
        let mut fired = Vec::new();
        while self.pending.last().is_some_and(|p| p.deadline_ms <= now_ms) {
            if let Some(p) = self.pending.pop() {
                fired.push(p.descriptor);
            }
        }
        self.fired += fired.len();
        fired
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn fired(&self) -> usize {
        self.fired
    }

    /// Deadline of the next spawn, if any remain
    pub fn next_deadline_ms(&self) -> Option<f64> {
        self.pending.last().map(|p| p.deadline_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level() -> Vec<ObstacleDescriptor> {
        vec![
            ObstacleDescriptor::new(2200.0, 880.0, "rockObstacle", "rock", 1000),
            ObstacleDescriptor::new(2200.0, 880.0, "rockObstacle", "rock", 4000),
            ObstacleDescriptor::new(2200.0, 930.0, "obstacle-ship", "ship", 7000),
        ]
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut clock = SceneClock::new();
        clock.advance(16.0);
        clock.advance(-5.0);
        clock.advance(f64::NAN);
        assert_eq!(clock.now_ms(), 16.0);
    }

    #[test]
    fn test_nothing_fires_early() {
        let mut s = ObstacleScheduler::new();
        s.arm(&level(), 0.0);
        assert!(s.due(0.0).is_empty());
        assert!(s.due(999.9).is_empty());
        assert_eq!(s.pending(), 3);
    }

    #[test]
    fn test_fires_at_deadline_exactly_once() {
        let mut s = ObstacleScheduler::new();
        s.arm(&level(), 0.0);
        let fired = s.due(1000.0);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].delay_ms, 1000);
        assert!(s.due(1000.0).is_empty());
        assert!(s.due(3999.0).is_empty());
        assert_eq!(s.fired(), 1);
        assert_eq!(s.next_deadline_ms(), Some(4000.0));
    }

    #[test]
    fn test_late_tick_fires_all_due_in_order() {
        let mut s = ObstacleScheduler::new();
        s.arm(&level(), 0.0);
        let fired = s.due(10_000.0);
        let delays: Vec<u64> = fired.iter().map(|d| d.delay_ms).collect();
        assert_eq!(delays, vec![1000, 4000, 7000]);
        assert_eq!(s.pending(), 0);
        assert_eq!(s.fired(), 3);
        assert!(s.due(20_000.0).is_empty());
    }

    #[test]
    fn test_equal_deadlines_keep_list_order() {
        let mut s = ObstacleScheduler::new();
        let same = vec![
            ObstacleDescriptor::new(1.0, 0.0, "a", "rock", 500),
            ObstacleDescriptor::new(2.0, 0.0, "b", "rock", 500),
            ObstacleDescriptor::new(3.0, 0.0, "c", "rock", 0),
        ];
        s.arm(&same, 0.0);
        let keys: Vec<String> = s.due(500.0).into_iter().map(|d| d.sprite_key).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_deadlines_relative_to_scene_start() {
        let mut s = ObstacleScheduler::new();
        s.arm(&level(), 250.0);
        assert!(s.due(1000.0).is_empty(), "scene started at 250ms");
        assert_eq!(s.due(1250.0).len(), 1);
    }
}
