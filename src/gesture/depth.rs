use std::collections::VecDeque;

/// Fixed-window moving average for the palm-width depth proxy
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: VecDeque<f32>,
    size: usize,
}

impl MovingAverage {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            window: VecDeque::with_capacity(size),
            size,
        }
    }

    /// Add a reading and return the updated average
    pub fn push(&mut self, value: f32) -> f32 {
        if self.window.len() == self.size {
            self.window.pop_front();
        }
        self.window.push_back(value);
        self.mean()
    }

    pub fn value(&self) -> Option<f32> {
        (!self.window.is_empty()).then(|| self.mean())
    }

    // Summed from the window on every read
    fn mean(&self) -> f32 {
        self.window.iter().sum::<f32>() / self.window.len() as f32
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }
}
