/// Highest level a channel may be set to (4.0 = +12 dB-ish overdrive).
pub const MAX_LEVEL: f64 = 4.0;

/// Multi-channel volume carried opaquely through the engine.
///
/// The engine never converts levels to decibels or hardware units; it only
/// validates and forwards them. 1.0 is the server's nominal level.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    levels: Vec<f64>,
}

impl Volume {
    /// Create a volume from per-channel levels.
    ///
    /// # Errors
    /// Returns an error if any level is outside `0.0..=MAX_LEVEL`.
    pub fn new(levels: Vec<f64>) -> Result<Self, VolumeError> {
        for (channel, &level) in levels.iter().enumerate() {
            if !(0.0..=MAX_LEVEL).contains(&level) {
                return Err(VolumeError::InvalidLevel { channel, level });
            }
        }
        Ok(Self { levels })
    }

    /// Create a volume with the same level on every channel.
    ///
    /// # Errors
    /// Returns an error if the level is outside `0.0..=MAX_LEVEL`.
    pub fn uniform(level: f64, channels: usize) -> Result<Self, VolumeError> {
        Self::new(vec![level; channels])
    }

    /// Single-channel volume.
    ///
    /// # Errors
    /// Returns an error if the level is outside `0.0..=MAX_LEVEL`.
    pub fn mono(level: f64) -> Result<Self, VolumeError> {
        Self::new(vec![level])
    }

    /// Two-channel volume.
    ///
    /// # Errors
    /// Returns an error if either level is outside `0.0..=MAX_LEVEL`.
    pub fn stereo(left: f64, right: f64) -> Result<Self, VolumeError> {
        Self::new(vec![left, right])
    }

    /// Level of one channel, if it exists.
    pub fn level(&self, channel: usize) -> Option<f64> {
        self.levels.get(channel).copied()
    }

    /// Replace the level of one channel.
    ///
    /// # Errors
    /// Returns an error for an out-of-range level or a missing channel.
    pub fn set_level(&mut self, channel: usize, level: f64) -> Result<(), VolumeError> {
        if !(0.0..=MAX_LEVEL).contains(&level) {
            return Err(VolumeError::InvalidLevel { channel, level });
        }
        match self.levels.get_mut(channel) {
            Some(slot) => {
                *slot = level;
                Ok(())
            }
            None => Err(VolumeError::NoSuchChannel { channel }),
        }
    }

    /// Mean level across all channels, 0.0 for an empty map.
    pub fn average(&self) -> f64 {
        if self.levels.is_empty() {
            0.0
        } else {
            self.levels.iter().sum::<f64>() / self.levels.len() as f64
        }
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.levels.len()
    }

    /// All channel levels.
    pub fn as_slice(&self) -> &[f64] {
        &self.levels
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self { levels: vec![1.0] }
    }
}

/// Volume validation errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum VolumeError {
    /// Level outside the accepted range.
    #[error("invalid level {level} for channel {channel} (must be 0.0-{MAX_LEVEL})")]
    InvalidLevel {
        /// Channel index.
        channel: usize,
        /// Rejected level.
        level: f64,
    },

    /// Channel index past the end of the map.
    #[error("no channel {channel} in volume")]
    NoSuchChannel {
        /// Channel index.
        channel: usize,
    },
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn rejects_out_of_range_levels() {
        assert!(Volume::mono(-0.1).is_err());
        assert!(Volume::mono(MAX_LEVEL + 0.1).is_err());
        assert!(Volume::mono(MAX_LEVEL).is_ok());
    }

    #[test]
    fn average_over_channels() {
        let volume = Volume::stereo(0.5, 1.5).unwrap();
        assert!((volume.average() - 1.0).abs() < f64::EPSILON);
        assert_eq!(Volume::new(vec![]).unwrap().average(), 0.0);
    }

    #[test]
    fn set_level_validates_channel_and_range() {
        let mut volume = Volume::stereo(1.0, 1.0).unwrap();
        assert!(volume.set_level(1, 0.25).is_ok());
        assert_eq!(volume.level(1), Some(0.25));
        assert!(matches!(
            volume.set_level(2, 0.5),
            Err(VolumeError::NoSuchChannel { channel: 2 })
        ));
        assert!(matches!(
            volume.set_level(0, 9.0),
            Err(VolumeError::InvalidLevel { channel: 0, .. })
        ));
    }
}
