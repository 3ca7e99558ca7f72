//! Engine configuration.

use airwave_analysis::BeatConfig;
use airwave_core::{Domain, PortConfig};
use airwave_render::FallbackConfig;

/// Settings shared by everything the engine owns.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct EngineConfig {
    /// Beat detector tuning
    pub beat: BeatConfig,
    /// Port feeding the beat detector; must be frequency domain
    pub beat_port: PortConfig,
    /// Synthetic motion for widgets without a port
    pub fallback: FallbackConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            beat: BeatConfig::default(),
            // Light smoothing keeps onsets sharp.
            beat_port: PortConfig::frequency(256).with_smoothing(0.3),
            fallback: FallbackConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> crate::Result<()> {
        self.beat.validate()?;
        self.beat_port.validate()?;
        if self.beat_port.domain() != Domain::Frequency {
            return Err(airwave_core::Error::InvalidConfig(
                "beat detection needs a frequency-domain port".into(),
            )
            .into());
        }
        self.fallback.validate()?;
        Ok(())
    }
}
