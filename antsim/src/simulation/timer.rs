// Tick counter for periodic behavior in the simulation.
// Counts up from 0 to max_value

#[derive(Debug, Clone)]
pub struct Timer {
    pub max_value: u32,
    pub value: u32,
}

impl Timer {
    /// Create a new timer with a max value and an initial value
    pub fn new(max_value: u32, initial_value: u32) -> Self {
        Self {
            max_value,
            value: initial_value,
        }
    }

    /// Returns true if the timer has reached the max value
    pub fn is_ready(&self) -> bool {
        self.value >= self.max_value
    }

    /// Advance the timer by a number of ticks
    pub fn update(&mut self, ticks: u32) {
        self.value = self.value.saturating_add(ticks);
    }

    /// Wraps the timer value back within bounds.
    pub fn wrap(&mut self) {
        if self.max_value == 0 {
            self.value = 0;
        } else {
            self.value %= self.max_value;
        }
    }

    /// Force the timer to be ready
    pub fn force_ready(&mut self) {
        self.value = self.max_value;
    }
}
