//! Mapper trait and pipeline

/// Turns a key level into a playback parameter
pub trait Mapper: Send + Sync {
    /// Get the name of this mapper
    fn name(&self) -> &str;

    /// Map a level to an output value
    fn map(&self, level: f64) -> f64;
}

/// Mappers applied one after another
pub struct MappingPipeline {
    mappers: Vec<Box<dyn Mapper>>,
}

impl MappingPipeline {
    /// Create an empty pipeline (passes levels through untouched)
    pub fn new() -> Self {
        Self { mappers: Vec::new() }
    }

    /// Append a mapper (builder pattern)
    pub fn with<M: Mapper + 'static>(mut self, mapper: M) -> Self {
        self.mappers.push(Box::new(mapper));
        self
    }

    /// Apply all mappers in sequence
    pub fn apply(&self, level: f64) -> f64 {
        self.mappers.iter().fold(level, |value, mapper| mapper.map(value))
    }

    /// Apply to every level of a pass
    pub fn apply_all(&self, levels: &[f64]) -> Vec<f64> {
        levels.iter().map(|&level| self.apply(level)).collect()
    }

    /// Names of the mappers, in order
    pub fn names(&self) -> Vec<&str> {
        self.mappers.iter().map(|m| m.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

impl Default for MappingPipeline {
    fn default() -> Self {
        Self::new()
    }
}
