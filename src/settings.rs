use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::drawer::error::{invalid, Result};
use crate::drawer::model::Color;
use crate::drawer::stats::DEFAULT_STATS_WINDOW;

/// Drawer configuration, stored as JSON. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawerSettings {
    pub width: u32,
    pub height: u32,
    pub continuous_update: bool,
    pub redundant_mouse: bool,
    pub scale: i32,
    pub background: Color,
    pub tick_interval_ms: u64,
    pub close_timeout_ms: u64,
    pub stats_window: usize,
    pub title: String,
    pub log_file: Option<PathBuf>,
    pub debug_logging: bool,
}

impl Default for DrawerSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            continuous_update: true,
            redundant_mouse: false,
            scale: 1,
            background: Color::BLACK,
            tick_interval_ms: 10,
            close_timeout_ms: 5000,
            stats_window: DEFAULT_STATS_WINDOW,
            title: "GDIDrawer".to_string(),
            log_file: None,
            debug_logging: false,
        }
    }
}

impl DrawerSettings {
    /// Reads settings from `path`; a missing or empty file yields defaults.
    /// Missing or empty files give defaults; unreadable files are an error.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("failed to read {}", path.display())))
            }
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(invalid(format!(
                "window size {}x{} must be at least 1x1",
                self.width, self.height
            )));
        }
        if self.scale < 1 || self.scale as i64 > self.width as i64 {
            return Err(invalid(format!(
                "scale {} is outside 1..={}",
                self.scale, self.width
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(invalid("tick interval must be at least 1ms"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        DrawerSettings::default().validate().unwrap();
    }

    #[test]
    fn scale_wider_than_window_is_rejected() {
        let settings = DrawerSettings {
            width: 10,
            scale: 11,
            ..DrawerSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let settings: DrawerSettings =
            serde_json::from_str(r#"{ "width": 320, "background": { "r": 1, "g": 2, "b": 3, "a": 255 } }"#)
                .unwrap();
        assert_eq!(settings.width, 320);
        assert_eq!(settings.height, 600);
        assert_eq!(settings.background, Color::rgb(1, 2, 3));
        assert!(settings.continuous_update);
    }
}
