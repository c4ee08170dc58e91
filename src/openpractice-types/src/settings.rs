use crate::PracticeError;
use crate::keys;

/// Kettlebell sizes the catalog accepts, in kilograms.
pub const AVAILABLE_WEIGHTS: [u32; 6] = [8, 16, 24, 32, 40, 48];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeSettings {
    pub squat_weight: u32,
    pub halo_weight: u32,
    pub swing_weight: u32,
    pub get_up_weight: u32,
    pub two_handed_swings: bool,
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            squat_weight: 16,
            halo_weight: 16,
            swing_weight: 24,
            get_up_weight: 24,
            two_handed_swings: false,
        }
    }
}

impl PracticeSettings {
    pub fn weight(&self, key: &str) -> Result<u32, PracticeError> {
        match key {
            keys::SQUAT_WEIGHT => Ok(self.squat_weight),
            keys::HALO_WEIGHT => Ok(self.halo_weight),
            keys::SWING_WEIGHT => Ok(self.swing_weight),
            keys::GET_UP_WEIGHT => Ok(self.get_up_weight),
            other => Err(PracticeError::UnknownSettingsKey(other.to_string())),
        }
    }

    pub fn set_weight(&mut self, key: &str, weight: u32) -> Result<(), PracticeError> {
        if !AVAILABLE_WEIGHTS.contains(&weight) {
            return Err(PracticeError::InvalidWeight(weight));
        }
        let slot = match key {
            keys::SQUAT_WEIGHT => &mut self.squat_weight,
            keys::HALO_WEIGHT => &mut self.halo_weight,
            keys::SWING_WEIGHT => &mut self.swing_weight,
            keys::GET_UP_WEIGHT => &mut self.get_up_weight,
            other => return Err(PracticeError::UnknownSettingsKey(other.to_string())),
        };
        *slot = weight;
        Ok(())
    }

    pub fn weight_keys() -> [&'static str; 4] {
        [
            keys::SQUAT_WEIGHT,
            keys::HALO_WEIGHT,
            keys::SWING_WEIGHT,
            keys::GET_UP_WEIGHT,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_catalog() {
        let settings = PracticeSettings::default();
        assert_eq!(settings.squat_weight, 16);
        assert_eq!(settings.halo_weight, 16);
        assert_eq!(settings.swing_weight, 24);
        assert_eq!(settings.get_up_weight, 24);
        assert!(!settings.two_handed_swings);
    }

    #[test]
    fn set_weight_validates() {
        let mut settings = PracticeSettings::default();
        settings.set_weight("swing", 32).unwrap();
        assert_eq!(settings.swing_weight, 32);

        assert!(matches!(
            settings.set_weight("swing", 20),
            Err(PracticeError::InvalidWeight(20))
        ));
        assert!(matches!(
            settings.set_weight("bench", 16),
            Err(PracticeError::UnknownSettingsKey(_))
        ));
        assert_eq!(settings.swing_weight, 32, "failed set must not change state");
    }

    #[test]
    fn weight_lookup_by_key() {
        let settings = PracticeSettings::default();
        assert_eq!(settings.weight("getUp").unwrap(), 24);
        assert!(settings.weight("deadlift").is_err());
    }
}
