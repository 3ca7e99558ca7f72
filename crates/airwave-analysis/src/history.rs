//! Rolling energy history.

/// Fixed-capacity ring of scalar energies.
///
/// Statistics cover however many samples have been pushed so far, so they
/// are available (if unstable) during warm-up.
#[derive(Debug, Clone)]
pub struct EnergyHistory {
    values: Vec<f32>,
    capacity: usize,
    next: usize,
}

impl EnergyHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: Vec::with_capacity(capacity),
            capacity,
            next: 0,
        }
    }

    /// Push a value, evicting the oldest once full.
    pub fn push(&mut self, value: f32) {
        let value = if value.is_finite() { value } else { 0.0 };
        if self.values.len() < self.capacity {
            self.values.push(value);
        } else {
            self.values[self.next] = value;
        }
        self.next = (self.next + 1) % self.capacity;
    }

    pub fn moving_average(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.values.iter().map(|&v| f64::from(v)).sum();
        (sum / self.values.len() as f64) as f32
    }

    /// Population variance around the moving average.
    pub fn variance(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let avg = f64::from(self.moving_average());
        let sum: f64 = self
            .values
            .iter()
            .map(|&v| {
                let d = f64::from(v) - avg;
                d * d
            })
            .sum();
        (sum / self.values.len() as f64) as f32
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.next = 0;
    }
}
