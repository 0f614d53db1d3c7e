use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

fn default_input_lang() -> String {
    "en".to_string()
}

fn default_output_lang() -> String {
    "zh-CN".to_string()
}

fn default_true() -> bool {
    true
}

fn default_locale() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_input_lang")]
    pub input_lang: String,
    #[serde(default = "default_output_lang")]
    pub output_lang: String,
    #[serde(default = "default_true")]
    pub translate_when_pressing_enter: bool,
    #[serde(default)]
    pub preventing_screen_lock: bool,
    #[serde(default)]
    pub launch_count: i64,
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_lang: default_input_lang(),
            output_lang: default_output_lang(),
            translate_when_pressing_enter: true,
            preventing_screen_lock: false,
            launch_count: 0,
            locale: default_locale(),
        }
    }
}

/// Partial update from the settings screen; absent fields stay untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    pub input_lang: Option<String>,
    pub output_lang: Option<String>,
    pub translate_when_pressing_enter: Option<bool>,
    pub preventing_screen_lock: Option<bool>,
    pub locale: Option<String>,
}

pub fn apply_patch(mut cur: Settings, patch: SettingsPatch) -> Settings {
    if let Some(v) = patch.input_lang {
        cur.input_lang = v;
    }
    if let Some(v) = patch.output_lang {
        cur.output_lang = v;
    }
    if let Some(v) = patch.translate_when_pressing_enter {
        cur.translate_when_pressing_enter = v;
    }
    if let Some(v) = patch.preventing_screen_lock {
        cur.preventing_screen_lock = v;
    }
    if let Some(v) = patch.locale {
        cur.locale = v;
    }
    cur
}

pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("settings.json")
}

pub fn load_settings(data_dir: &Path) -> Result<Settings> {
    let p = settings_path(data_dir);
    if !p.exists() {
        return Ok(Settings::default());
    }
    let s = fs::read_to_string(&p).context("read settings.json failed")?;
    let v: Settings = serde_json::from_str(&s).context("parse settings.json failed")?;
    Ok(v)
}

/// Like [`load_settings`], but a corrupt file is backed up and replaced with
/// defaults instead of wedging startup.
pub fn load_settings_or_recover(data_dir: &Path) -> Settings {
    match load_settings(data_dir) {
        Ok(s) => s,
        Err(_) => {
            let p = settings_path(data_dir);
            let _ = fs::rename(&p, data_dir.join("settings.json.bad"));
            Settings::default()
        }
    }
}

pub fn save_settings(data_dir: &Path, settings: &Settings) -> Result<()> {
    std::fs::create_dir_all(data_dir).ok();
    let p = settings_path(data_dir);
    let s = serde_json::to_string_pretty(settings).context("serialize settings failed")?;
    fs::write(&p, s).context("write settings.json failed")?;
    Ok(())
}

/// Bump the launch counter and persist it. Returns the new count.
pub fn increment_launch_count(data_dir: &Path) -> Result<i64> {
    let mut s = load_settings_or_recover(data_dir);
    s.launch_count = s.launch_count.saturating_add(1);
    save_settings(data_dir, &s)?;
    Ok(s.launch_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let td = tempfile::tempdir().expect("tempdir");
        let s = load_settings(td.path()).expect("load");
        assert_eq!(s.input_lang, "en");
        assert_eq!(s.output_lang, "zh-CN");
        assert!(s.translate_when_pressing_enter);
        assert!(!s.preventing_screen_lock);
        assert_eq!(s.launch_count, 0);
    }

    #[test]
    fn save_load_round_trip() {
        let td = tempfile::tempdir().expect("tempdir");
        let mut s = Settings::default();
        s.input_lang = "ja".to_string();
        s.preventing_screen_lock = true;
        save_settings(td.path(), &s).expect("save");
        let back = load_settings(td.path()).expect("load");
        assert_eq!(back.input_lang, "ja");
        assert!(back.preventing_screen_lock);
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let cur = Settings::default();
        let next = apply_patch(
            cur,
            SettingsPatch {
                output_lang: Some("fr".to_string()),
                ..SettingsPatch::default()
            },
        );
        assert_eq!(next.output_lang, "fr");
        assert_eq!(next.input_lang, "en");
        assert!(next.translate_when_pressing_enter);
    }

    #[test]
    fn corrupt_file_is_backed_up_and_replaced() {
        let td = tempfile::tempdir().expect("tempdir");
        fs::write(settings_path(td.path()), "{not json").expect("write");
        let s = load_settings_or_recover(td.path());
        assert_eq!(s.input_lang, "en");
        assert!(td.path().join("settings.json.bad").exists());
    }

    #[test]
    fn launch_count_increments_and_persists() {
        let td = tempfile::tempdir().expect("tempdir");
        assert_eq!(increment_launch_count(td.path()).expect("inc"), 1);
        assert_eq!(increment_launch_count(td.path()).expect("inc"), 2);
        assert_eq!(load_settings(td.path()).expect("load").launch_count, 2);
    }
}
