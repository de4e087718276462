use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::machine::SessionContext;

/// Minimum words-per-minute goal when the exercise sets none.
pub const DEFAULT_MINIMUM_WPM: f64 = 20.0;
/// Maximum tolerated error percentage when neither the exercise nor the
/// global settings set one.
pub const DEFAULT_ERRORS_COEFFICIENT: f64 = 2.0;

/// Global overlay for a per-exercise boolean. `Inherit` defers to the
/// exercise; the two forced values win over it unconditionally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriState {
    #[default]
    Inherit,
    ForceOn,
    ForceOff,
}

impl TriState {
    /// Collapse against the per-exercise flag. An exercise that never set
    /// its flag counts as enabled.
    pub fn resolve(self, per_exercise: Option<bool>) -> bool {
        match self {
            TriState::ForceOn => true,
            TriState::ForceOff => false,
            TriState::Inherit => per_exercise.unwrap_or(true),
        }
    }
}

/// Process-wide settings, persisted as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    #[serde(default)]
    pub tutor_visibility: TriState,
    #[serde(default)]
    pub keyboard_visibility: TriState,
    /// Overrides every exercise's error tolerance when set.
    #[serde(default)]
    pub errors_coefficient_override: Option<f64>,
}

/// Per-exercise behavior after overlaying the global settings on the
/// session context. Computed on demand for the renderer; never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveSettings {
    pub tutor_active: bool,
    pub keyboard_visible: bool,
    pub errors_coefficient: f64,
    pub minimum_wpm: f64,
}

impl EffectiveSettings {
    pub fn resolve(global: &GlobalSettings, context: &SessionContext) -> Self {
        Self {
            tutor_active: global
                .tutor_visibility
                .resolve(context.tutor_active_for_exercise),
            keyboard_visible: global
                .keyboard_visibility
                .resolve(context.keyboard_visible_for_exercise),
            errors_coefficient: global
                .errors_coefficient_override
                .unwrap_or(context.errors_coefficient_percent),
            minimum_wpm: context.minimum_wpm,
        }
    }
}

pub trait SettingsStore {
    fn load(&self) -> GlobalSettings;
    fn save(&self, settings: &GlobalSettings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "mecamatic") {
            pd.config_dir().join("settings.json")
        } else {
            PathBuf::from("mecamatic_settings.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> GlobalSettings {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(settings) = serde_json::from_slice::<GlobalSettings>(&bytes) {
                return settings;
            }
        }
        GlobalSettings::default()
    }

    fn save(&self, settings: &GlobalSettings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn tri_state_resolution() {
        assert!(TriState::ForceOn.resolve(Some(false)));
        assert!(TriState::ForceOn.resolve(None));
        assert!(!TriState::ForceOff.resolve(Some(true)));
        assert!(!TriState::ForceOff.resolve(None));
        assert!(TriState::Inherit.resolve(Some(true)));
        assert!(!TriState::Inherit.resolve(Some(false)));
        // Unset per-exercise flag defaults to enabled
        assert!(TriState::Inherit.resolve(None));
    }

    #[test]
    fn effective_settings_inherit_from_context() {
        let context = SessionContext {
            tutor_active_for_exercise: Some(false),
            keyboard_visible_for_exercise: Some(true),
            errors_coefficient_percent: 1.5,
            minimum_wpm: 30.0,
            ..SessionContext::default()
        };
        let effective = EffectiveSettings::resolve(&GlobalSettings::default(), &context);
        assert!(!effective.tutor_active);
        assert!(effective.keyboard_visible);
        assert_eq!(effective.errors_coefficient, 1.5);
        assert_eq!(effective.minimum_wpm, 30.0);
    }

    #[test]
    fn global_overrides_win_over_exercise_values() {
        let context = SessionContext {
            tutor_active_for_exercise: Some(false),
            keyboard_visible_for_exercise: Some(true),
            errors_coefficient_percent: 1.5,
            ..SessionContext::default()
        };
        let global = GlobalSettings {
            tutor_visibility: TriState::ForceOn,
            keyboard_visibility: TriState::ForceOff,
            errors_coefficient_override: Some(5.0),
        };
        let effective = EffectiveSettings::resolve(&global, &context);
        assert!(effective.tutor_active);
        assert!(!effective.keyboard_visible);
        assert_eq!(effective.errors_coefficient, 5.0);
    }

    #[test]
    fn defaults_apply_before_any_selection() {
        let effective =
            EffectiveSettings::resolve(&GlobalSettings::default(), &SessionContext::default());
        assert!(effective.tutor_active);
        assert!(effective.keyboard_visible);
        assert_eq!(effective.errors_coefficient, DEFAULT_ERRORS_COEFFICIENT);
        assert_eq!(effective.minimum_wpm, DEFAULT_MINIMUM_WPM);
    }

    #[test]
    fn roundtrip_default_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = FileSettingsStore::with_path(&path);
        let settings = GlobalSettings::default();
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn save_and_load_custom_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = FileSettingsStore::with_path(&path);
        let settings = GlobalSettings {
            tutor_visibility: TriState::ForceOff,
            keyboard_visibility: TriState::ForceOn,
            errors_coefficient_override: Some(3.0),
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn missing_or_invalid_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = FileSettingsStore::with_path(&path);
        assert_eq!(store.load(), GlobalSettings::default());

        fs::write(&path, b"not json").unwrap();
        assert_eq!(store.load(), GlobalSettings::default());
    }
}
