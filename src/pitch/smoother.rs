use std::collections::VecDeque;

/// Linearly weighted moving average over the most recent estimates.
///
/// The oldest sample in the window weighs 1 and the newest weighs `len`.
/// "No signal" samples stay in the window and count as 0 Hz, which pulls the
/// average down while the singer drops out.
#[derive(Debug, Clone)]
pub struct FrequencySmoother {
    history: VecDeque<Option<f32>>,
    capacity: usize,
}

impl FrequencySmoother {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records `estimate` and returns the refreshed average.
    pub fn push(&mut self, estimate: Option<f32>) -> Option<f32> {
        self.history.push_back(estimate.filter(|hz| hz.is_finite()));
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }
        self.current()
    }

    /// Weighted average of the window; `None` while empty or silent.
    pub fn current(&self) -> Option<f32> {
        let mut weighted = 0.0f64;
        let mut total = 0.0f64;
        for (index, sample) in self.history.iter().enumerate() {
            let weight = (index + 1) as f64;
            weighted += weight * f64::from(sample.unwrap_or(0.0));
            total += weight;
        }
        if total == 0.0 || weighted <= 0.0 {
            return None;
        }
        Some((weighted / total) as f32)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}
