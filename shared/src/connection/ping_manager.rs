use std::collections::VecDeque;

/// Schedules pings and keeps a rolling window of round-trip samples.
pub struct PingManager {
    interval: f32,
    elapsed: f32,
    capacity: usize,
    samples: VecDeque<f32>,
    filled: bool,
}

impl PingManager {
    pub fn new(interval: f32, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            interval,
            // the first tick pings immediately
            elapsed: interval,
            capacity,
            samples: VecDeque::with_capacity(capacity),
            filled: false,
        }
    }

    /// Advances the ping timer, returns true when a ping is due
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed < self.interval {
            return false;
        }
        self.elapsed = 0.0;
        true
    }

    pub fn record(&mut self, rtt_ms: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(rtt_ms);
        if self.samples.len() == self.capacity {
            self.filled = true;
        }
    }

    /// Mean round-trip time in milliseconds, once the window has filled
    pub fn average_rtt(&self) -> Option<f32> {
        if !self.filled {
            return None;
        }
        Some(self.samples.iter().sum::<f32>() / self.samples.len() as f32)
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// Ping timestamp: the channel clock in milliseconds, wrapping
pub fn timestamp_ms(clock: f64) -> u32 {
    ((clock * 1000.0) as u64 & u64::from(u32::MAX)) as u32
}

/// Round trip between a returned timestamp and now, tolerant of wrap-around
pub fn round_trip_ms(sent: u32, now: u32) -> f32 {
    now.wrapping_sub(sent) as f32
}
