use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::shared::errors::StorageError;
use crate::shared::paths::ensure_dir;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub work_style: String,
    #[serde(default)]
    pub motivation_factors: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalData {
    pub average_tasks_per_week: u32,
    #[serde(default)]
    pub common_projects: Vec<String>,
    #[serde(default)]
    pub productivity_peaks: Vec<String>,
}

/// User profile and preferences, fed into the weekly-analysis prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub historical_data: HistoricalData,
    #[serde(default)]
    pub has_completed_onboarding: bool,
}

fn get_profile_path(dir: &Path) -> PathBuf {
    dir.join("profile.json")
}

/// Loads the profile, failing closed to the default on any read or parse
/// problem.
pub fn load_profile(dir: &Path) -> Profile {
    let path = get_profile_path(dir);
    if !path.exists() {
        return Profile::default();
    }

    std::fs::read_to_string(&path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_else(|| {
            tracing::warn!(target: "profile", "Could not load profile, using defaults");
            Profile::default()
        })
}

pub fn save_profile(dir: &Path, profile: &Profile) -> Result<(), StorageError> {
    ensure_dir(dir).map_err(|e| StorageError::directory(e.to_string()))?;

    let path = get_profile_path(dir);
    let content = serde_json::to_string_pretty(profile)?;
    std::fs::write(&path, content)?;
    Ok(())
}

pub fn set_onboarding_complete(dir: &Path) -> Result<(), StorageError> {
    let mut profile = load_profile(dir);
    profile.has_completed_onboarding = true;
    save_profile(dir, &profile)
}

pub fn reset_profile(dir: &Path) -> Result<(), StorageError> {
    let path = get_profile_path(dir);
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile {
            name: "Ana".to_string(),
            preferences: Preferences {
                work_style: "deep focus mornings".to_string(),
                motivation_factors: vec!["progress".to_string()],
            },
            historical_data: HistoricalData {
                average_tasks_per_week: 12,
                common_projects: vec!["Finance".to_string()],
                productivity_peaks: vec!["morning".to_string()],
            },
            has_completed_onboarding: false,
        };

        save_profile(dir.path(), &profile).unwrap();
        let loaded = load_profile(dir.path());
        assert_eq!(loaded.name, "Ana");
        assert_eq!(loaded.historical_data.average_tasks_per_week, 12);
    }

    #[test]
    fn test_onboarding_flag() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!load_profile(dir.path()).has_completed_onboarding);

        set_onboarding_complete(dir.path()).unwrap();
        assert!(load_profile(dir.path()).has_completed_onboarding);

        reset_profile(dir.path()).unwrap();
        assert!(!load_profile(dir.path()).has_completed_onboarding);
    }

    #[test]
    fn test_malformed_profile_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("profile.json"), "[]").unwrap();
        let profile = load_profile(dir.path());
        assert!(profile.name.is_empty());
    }
}
