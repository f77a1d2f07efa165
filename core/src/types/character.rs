use serde::{Deserialize, Serialize};

/// The character picked on the character-select screen.
///
/// Filled by the character server flow before the map connection starts; the map session only
/// reads it (apart from `gid`, which the map server may confirm or override).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CharacterProfile {
    pub gid: u32,
    pub name: String,
    pub level: u32,
    pub job_level: u32,
    pub money: u32,
    pub job: u16,
    pub sex: u8,
    pub base_exp: u64,
    pub base_exp_next: u64,
}

impl CharacterProfile {
    /// Base experience progress in tenths of a percent (0..=1000), `None` before the server
    /// sent the next-level requirement.
    pub fn base_exp_permille(&self) -> Option<u64> {
        if self.base_exp_next == 0 {
            return None;
        }
        Some(((self.base_exp as f64 / self.base_exp_next as f64) * 1000.0).floor() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::CharacterProfile;

    #[test]
    fn permille_requires_next_level_requirement() {
        let mut profile = CharacterProfile::default();
        assert_eq!(profile.base_exp_permille(), None);

        profile.base_exp = 250;
        profile.base_exp_next = 1000;
        assert_eq!(profile.base_exp_permille(), Some(250));
    }

    #[test]
    fn deserializes_partial_json() {
        let profile: CharacterProfile =
            serde_json::from_str(r#"{"gid": 150001, "name": "Poring"}"#).unwrap();
        assert_eq!(profile.gid, 150001);
        assert_eq!(profile.name, "Poring");
        assert_eq!(profile.level, 0);
    }
}
