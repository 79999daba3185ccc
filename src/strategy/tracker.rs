/// High-water mark of the bytes an executor holds at once.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PeakTracker {
    current: u64,
    peak: u64,
}

impl PeakTracker {
    pub fn add(&mut self, bytes: u64) {
        self.current = self.current.saturating_add(bytes);
        self.peak = self.peak.max(self.current);
    }

    pub fn remove(&mut self, bytes: u64) {
        self.current = self.current.saturating_sub(bytes);
    }

    pub fn current_bytes(&self) -> u64 {
        self.current
    }

    pub fn peak_bytes(&self) -> u64 {
        self.peak
    }
}
