use crate::waves::WaveManagerConfig;

mod cli;

pub use cli::Opt;

impl Opt {
    /// Command line values take precedence over the schedule file.
    pub fn apply_overrides(&self, config: &mut WaveManagerConfig) {
        config.map_name = self.map.clone();
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(capacity) = self.capacity {
            config.pool_capacity = capacity;
        }
    }

    pub fn frame_seconds(&self) -> f64 {
        1.0 / f64::from(self.fps.max(1))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_overrides_replace_schedule_values() {
        let opt = Opt::parse_from(["tankfront", "--map", "jungle", "--batch-size", "5"]);
        let mut config = WaveManagerConfig::new("desert");
        config.pool_capacity = 32;

        opt.apply_overrides(&mut config);

        assert_eq!(config.map_name, "jungle");
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.pool_capacity, 32);
    }

    #[test]
    fn test_defaults() {
        let opt = Opt::parse_from(["tankfront"]);
        assert_eq!(opt.map, "desert");
        assert_eq!(opt.frames, 7200);
        assert!((opt.frame_seconds() - 1.0 / 60.0).abs() < 1e-12);
    }
}
