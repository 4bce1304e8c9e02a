//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<TofkeysConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: TofkeysConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("parsing {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::KeyAssignment;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config() {
        let yaml = r#"
keyboard:
  channels: 3
  sentinel_min: 1000

poll:
  interval_ms: 50

keys:
  - 60
  - [62, 66, 69]

simulation:
  - glitch_every: 7
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.keyboard.channels, 3);
        assert_eq!(config.poll.interval_ms, 50);
        assert_eq!(config.keys[1], KeyAssignment::Chord(vec![62, 66, 69]));
        assert_eq!(config.simulated(0).glitch_every, 7);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"keyboard:\n  channels: 0\n").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_example_config_is_valid() {
        let config: TofkeysConfig =
            serde_yaml::from_str(include_str!("../../tofkeys.example.yaml")).unwrap();
        assert!(config.validate().is_ok());
    }
}
