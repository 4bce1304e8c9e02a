//! Last accepted level per channel

/// Holds the most recent accepted level for each channel.
///
/// Only an accepted reading changes an entry; nothing decays.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelCache {
    levels: Vec<f64>,
}

impl LevelCache {
    /// Create a cache with every channel at 0.0
    pub fn new(channels: usize) -> Self {
        Self {
            levels: vec![0.0; channels],
        }
    }

    pub fn get(&self, channel: usize) -> Option<f64> {
        self.levels.get(channel).copied()
    }

    pub fn store(&mut self, channel: usize, level: f64) {
        if let Some(slot) = self.levels.get_mut(channel) {
            *slot = level;
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_starts_at_zero() {
        let cache = LevelCache::new(3);
        assert_eq!(cache.as_slice(), &[0.0, 0.0, 0.0]);
        assert_eq!(cache.get(3), None);
    }

    #[test]
    fn test_store_ignores_unknown_channel() {
        let mut cache = LevelCache::new(2);
        cache.store(1, 0.4);
        cache.store(5, 0.9);
        assert_eq!(cache.as_slice(), &[0.0, 0.4]);
    }
}
