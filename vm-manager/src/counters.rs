use std::fmt;

/// Event counts for one run. They only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub hit_count: u64,
    pub miss_count: u64,
    pub ref_count: u64,
    pub evict_clean_count: u64,
    pub evict_dirty_count: u64,
}

impl Counters {
    pub fn evictions(&self) -> u64 {
        self.evict_clean_count + self.evict_dirty_count
    }

    /// Hits as a percentage of references.
    pub fn hit_rate(&self) -> f64 {
        if self.ref_count == 0 {
            return 0.0;
        }
        self.hit_count as f64 / self.ref_count as f64 * 100.0
    }

    pub fn miss_rate(&self) -> f64 {
        if self.ref_count == 0 {
            return 0.0;
        }
        self.miss_count as f64 / self.ref_count as f64 * 100.0
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hit count: {}", self.hit_count)?;
        writeln!(f, "Miss count: {}", self.miss_count)?;
        writeln!(f, "Clean evictions: {}", self.evict_clean_count)?;
        writeln!(f, "Dirty evictions: {}", self.evict_dirty_count)?;
        writeln!(f, "Total references : {}", self.ref_count)?;
        writeln!(f, "Hit rate: {:.4}", self.hit_rate())?;
        write!(f, "Miss rate: {:.4}", self.miss_rate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_of_empty_run_are_zero() {
        let counters = Counters::default();
        assert_eq!(counters.hit_rate(), 0.0);
        assert_eq!(counters.miss_rate(), 0.0);
    }

    #[test]
    fn test_summary_format() {
        let counters = Counters {
            hit_count: 3,
            miss_count: 1,
            ref_count: 4,
            evict_clean_count: 0,
            evict_dirty_count: 1,
        };
        assert_eq!(
            counters.to_string(),
            "Hit count: 3\n\
             Miss count: 1\n\
             Clean evictions: 0\n\
             Dirty evictions: 1\n\
             Total references : 4\n\
             Hit rate: 75.0000\n\
             Miss rate: 25.0000"
        );
    }
}
