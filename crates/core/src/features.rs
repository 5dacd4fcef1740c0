//! Platform feature keys, the global settings record, and per-project flags.
//!
//! Project flags use opt-out semantics: a key missing from a project's map
//! reads as enabled. A feature is effectively enabled for a project only
//! when neither the global flag nor the project flag is `false`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Feature keys
// ---------------------------------------------------------------------------

/// The fixed set of platform features an administrator can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKey {
    Chat,
    Files,
    Timeline,
    Testing,
    ResponseBot,
    Obeya,
    Wiki,
}

impl FeatureKey {
    pub const ALL: [FeatureKey; 7] = [
        FeatureKey::Chat,
        FeatureKey::Files,
        FeatureKey::Timeline,
        FeatureKey::Testing,
        FeatureKey::ResponseBot,
        FeatureKey::Obeya,
        FeatureKey::Wiki,
    ];

    /// Keys that also live in each project's `features_enabled` map.
    pub const PROJECT_SCOPED: [FeatureKey; 5] = [
        FeatureKey::Chat,
        FeatureKey::Files,
        FeatureKey::Timeline,
        FeatureKey::Testing,
        FeatureKey::ResponseBot,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureKey::Chat => "chat",
            FeatureKey::Files => "files",
            FeatureKey::Timeline => "timeline",
            FeatureKey::Testing => "testing",
            FeatureKey::ResponseBot => "response_bot",
            FeatureKey::Obeya => "obeya",
            FeatureKey::Wiki => "wiki",
        }
    }

    /// Column of the `global_settings` table holding this flag.
    pub fn settings_column(self) -> &'static str {
        match self {
            FeatureKey::Chat => "chat_enabled",
            FeatureKey::Files => "files_enabled",
            FeatureKey::Timeline => "timeline_enabled",
            FeatureKey::Testing => "testing_enabled",
            FeatureKey::ResponseBot => "response_bot_enabled",
            FeatureKey::Obeya => "obeya_enabled",
            FeatureKey::Wiki => "wiki_enabled",
        }
    }

    pub fn is_project_scoped(self) -> bool {
        Self::PROJECT_SCOPED.contains(&self)
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = FeatureKey::ALL.iter().map(|k| k.as_str()).collect();
                CoreError::Validation(format!(
                    "Unknown feature '{s}'. Valid features: {}",
                    valid.join(", ")
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Global settings
// ---------------------------------------------------------------------------

/// Platform-wide feature switches. A single row exists per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
    pub chat_enabled: bool,
    pub files_enabled: bool,
    pub timeline_enabled: bool,
    pub testing_enabled: bool,
    pub response_bot_enabled: bool,
    pub obeya_enabled: bool,
    pub wiki_enabled: bool,
}

impl Default for GlobalSettings {
    /// Everything is on until an administrator turns it off.
    fn default() -> Self {
        Self {
            chat_enabled: true,
            files_enabled: true,
            timeline_enabled: true,
            testing_enabled: true,
            response_bot_enabled: true,
            obeya_enabled: true,
            wiki_enabled: true,
        }
    }
}

impl GlobalSettings {
    pub fn flag(&self, key: FeatureKey) -> bool {
        match key {
            FeatureKey::Chat => self.chat_enabled,
            FeatureKey::Files => self.files_enabled,
            FeatureKey::Timeline => self.timeline_enabled,
            FeatureKey::Testing => self.testing_enabled,
            FeatureKey::ResponseBot => self.response_bot_enabled,
            FeatureKey::Obeya => self.obeya_enabled,
            FeatureKey::Wiki => self.wiki_enabled,
        }
    }

    pub fn set_flag(&mut self, key: FeatureKey, value: bool) {
        let slot = match key {
            FeatureKey::Chat => &mut self.chat_enabled,
            FeatureKey::Files => &mut self.files_enabled,
            FeatureKey::Timeline => &mut self.timeline_enabled,
            FeatureKey::Testing => &mut self.testing_enabled,
            FeatureKey::ResponseBot => &mut self.response_bot_enabled,
            FeatureKey::Obeya => &mut self.obeya_enabled,
            FeatureKey::Wiki => &mut self.wiki_enabled,
        };
        *slot = value;
    }

    pub fn with_flag(mut self, key: FeatureKey, value: bool) -> Self {
        self.set_flag(key, value);
        self
    }
}

// ---------------------------------------------------------------------------
// Per-project flags
// ---------------------------------------------------------------------------

/// A project's `features_enabled` map, stored as JSON keyed by feature name.
///
/// Unknown keys are preserved so older rows survive a round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectFeatures(BTreeMap<String, bool>);

impl ProjectFeatures {
    /// Seed a new project's map from the current global switches.
    pub fn seeded_from(settings: &GlobalSettings) -> Self {
        let mut features = Self::default();
        for key in FeatureKey::PROJECT_SCOPED {
            features.set(key, settings.flag(key));
        }
        features
    }

    /// The explicit value stored for `key`, if any.
    pub fn flag(&self, key: FeatureKey) -> Option<bool> {
        self.0.get(key.as_str()).copied()
    }

    /// Opt-out read: anything but an explicit `false` is enabled.
    pub fn is_enabled(&self, key: FeatureKey) -> bool {
        self.flag(key) != Some(false)
    }

    pub fn set(&mut self, key: FeatureKey, value: bool) {
        self.0.insert(key.as_str().to_string(), value);
    }

    pub fn with(mut self, key: FeatureKey, value: bool) -> Self {
        self.set(key, value);
        self
    }
}

impl From<BTreeMap<String, bool>> for ProjectFeatures {
    fn from(map: BTreeMap<String, bool>) -> Self {
        Self(map)
    }
}

// ---------------------------------------------------------------------------
// Effective enablement
// ---------------------------------------------------------------------------

/// Whether `key` is visible inside a project.
///
/// Global-only features (`obeya`, `wiki`) follow the global switch alone.
pub fn effective_enabled(
    settings: &GlobalSettings,
    project: &ProjectFeatures,
    key: FeatureKey,
) -> bool {
    if !settings.flag(key) {
        return false;
    }
    !key.is_project_scoped() || project.is_enabled(key)
}

/// The effective value of every feature for one project.
pub fn effective_features(
    settings: &GlobalSettings,
    project: &ProjectFeatures,
) -> BTreeMap<FeatureKey, bool> {
    FeatureKey::ALL
        .into_iter()
        .map(|key| (key, effective_enabled(settings, project, key)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parse_known_keys() {
        for key in FeatureKey::ALL {
            assert_eq!(key.as_str().parse::<FeatureKey>().unwrap(), key);
        }
    }

    #[test]
    fn parse_unknown_key_rejects() {
        assert_matches!("boards".parse::<FeatureKey>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&FeatureKey::ResponseBot).unwrap();
        assert_eq!(json, "\"response_bot\"");
    }

    #[test]
    fn default_settings_enable_everything() {
        let settings = GlobalSettings::default();
        assert!(FeatureKey::ALL.iter().all(|k| settings.flag(*k)));
    }

    #[test]
    fn set_flag_touches_only_that_flag() {
        let settings = GlobalSettings::default().with_flag(FeatureKey::Testing, false);
        assert!(!settings.testing_enabled);
        assert!(settings.chat_enabled);
        assert!(settings.wiki_enabled);
    }

    #[test]
    fn missing_project_key_reads_enabled() {
        let project = ProjectFeatures::default();
        assert_eq!(project.flag(FeatureKey::Chat), None);
        assert!(project.is_enabled(FeatureKey::Chat));
    }

    #[test]
    fn global_off_overrides_project_on() {
        let settings = GlobalSettings::default().with_flag(FeatureKey::Chat, false);
        let project = ProjectFeatures::default().with(FeatureKey::Chat, true);
        assert!(!effective_enabled(&settings, &project, FeatureKey::Chat));
    }

    #[test]
    fn project_off_overrides_global_on() {
        let settings = GlobalSettings::default();
        let project = ProjectFeatures::default().with(FeatureKey::Files, false);
        assert!(!effective_enabled(&settings, &project, FeatureKey::Files));
        assert!(effective_enabled(&settings, &project, FeatureKey::Chat));
    }

    #[test]
    fn global_only_features_ignore_project_map() {
        let settings = GlobalSettings::default().with_flag(FeatureKey::Wiki, false);
        let project = ProjectFeatures::from(BTreeMap::from([("obeya".to_string(), false)]));
        assert!(!effective_enabled(&settings, &project, FeatureKey::Wiki));
        assert!(effective_enabled(&settings, &project, FeatureKey::Obeya));
    }

    #[test]
    fn seeded_features_mirror_global_switches() {
        let settings = GlobalSettings::default().with_flag(FeatureKey::Testing, false);
        let features = ProjectFeatures::seeded_from(&settings);
        assert_eq!(features.flag(FeatureKey::Testing), Some(false));
        assert_eq!(features.flag(FeatureKey::Chat), Some(true));
        assert_eq!(features.flag(FeatureKey::Wiki), None);
    }

    #[test]
    fn effective_features_covers_every_key() {
        let map = effective_features(&GlobalSettings::default(), &ProjectFeatures::default());
        assert_eq!(map.len(), FeatureKey::ALL.len());
        assert!(map.values().all(|v| *v));
    }
}
