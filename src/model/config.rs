use std::ops::RangeInclusive;

use chrono::NaiveDate;

/// Window dimensions remembered for the desktop widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSize {
    fn default() -> Self {
        WindowSize {
            width: 400,
            height: 600,
        }
    }
}

/// Five independent font sizes (points)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSizes {
    pub title: u32,
    pub event: u32,
    pub task: u32,
    pub countdown: u32,
    pub quadrant_title: u32,
}

impl Default for FontSizes {
    fn default() -> Self {
        FontSizes {
            title: 20,
            event: 12,
            task: 12,
            countdown: 30,
            quadrant_title: 12,
        }
    }
}

/// Board configuration: everything persisted besides the tasks themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub main_title: String,
    pub event_name: String,
    pub target_date: NaiveDate,
    pub is_locked: bool,
    pub auto_start: bool,
    pub window_size: WindowSize,
    pub font_sizes: FontSizes,
}

pub const DEFAULT_TITLE: &str = "计划";
pub const DEFAULT_EVENT_NAME: &str = "截止日期";

pub fn default_target_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 6).unwrap_or_default()
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            main_title: DEFAULT_TITLE.to_string(),
            event_name: DEFAULT_EVENT_NAME.to_string(),
            target_date: default_target_date(),
            is_locked: false,
            auto_start: false,
            window_size: WindowSize::default(),
            font_sizes: FontSizes::default(),
        }
    }
}

/// Keys accepted by [`Configuration::set`]
pub const CONFIG_KEYS: &[&str] = &[
    "main_title",
    "event_name",
    "target_date",
    "is_locked",
    "auto_start",
    "window_size.width",
    "window_size.height",
    "font_sizes.title",
    "font_sizes.event",
    "font_sizes.task",
    "font_sizes.countdown",
    "font_sizes.quadrant_title",
];

/// Error from setting a configuration value
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown config key: {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
    #[error("{key} must be between {min} and {max}")]
    OutOfRange { key: String, min: u32, max: u32 },
}

/// Accepted range for a numeric key
pub fn numeric_range(key: &str) -> Option<RangeInclusive<u32>> {
    match key {
        "window_size.width" => Some(400..=3000),
        "window_size.height" => Some(300..=2000),
        "font_sizes.title" => Some(12..=60),
        "font_sizes.event" => Some(10..=40),
        "font_sizes.task" => Some(8..=30),
        "font_sizes.countdown" => Some(20..=100),
        "font_sizes.quadrant_title" => Some(8..=30),
        _ => None,
    }
}

impl Configuration {
    /// Set a single field from its textual form (`key` as in [`CONFIG_KEYS`]).
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        if let Some(range) = numeric_range(key) {
            let n: u32 = value.trim().parse().map_err(|_| invalid())?;
            if !range.contains(&n) {
                return Err(ConfigError::OutOfRange {
                    key: key.to_string(),
                    min: *range.start(),
                    max: *range.end(),
                });
            }
            match key {
                "window_size.width" => self.window_size.width = n,
                "window_size.height" => self.window_size.height = n,
                "font_sizes.title" => self.font_sizes.title = n,
                "font_sizes.event" => self.font_sizes.event = n,
                "font_sizes.task" => self.font_sizes.task = n,
                "font_sizes.countdown" => self.font_sizes.countdown = n,
                _ => self.font_sizes.quadrant_title = n,
            }
            return Ok(());
        }

        match key {
            "main_title" => self.main_title = value.to_string(),
            "event_name" => self.event_name = value.to_string(),
            "target_date" => {
                self.target_date =
                    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
            }
            "is_locked" => self.is_locked = parse_bool(value).ok_or_else(invalid)?,
            "auto_start" => self.auto_start = parse_bool(value).ok_or_else(invalid)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Textual value of a key, as accepted by [`Configuration::set`]
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "main_title" => self.main_title.clone(),
            "event_name" => self.event_name.clone(),
            "target_date" => self.target_date.format("%Y-%m-%d").to_string(),
            "is_locked" => self.is_locked.to_string(),
            "auto_start" => self.auto_start.to_string(),
            "window_size.width" => self.window_size.width.to_string(),
            "window_size.height" => self.window_size.height.to_string(),
            "font_sizes.title" => self.font_sizes.title.to_string(),
            "font_sizes.event" => self.font_sizes.event.to_string(),
            "font_sizes.task" => self.font_sizes.task.to_string(),
            "font_sizes.countdown" => self.font_sizes.countdown.to_string(),
            "font_sizes.quadrant_title" => self.font_sizes.quadrant_title.to_string(),
            _ => return None,
        };
        Some(value)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_widget() {
        let c = Configuration::default();
        assert_eq!(c.main_title, "计划");
        assert_eq!(c.event_name, "截止日期");
        assert_eq!(c.target_date, NaiveDate::from_ymd_opt(2026, 2, 6).unwrap());
        assert!(!c.is_locked);
        assert!(!c.auto_start);
        assert_eq!(c.window_size, WindowSize { width: 400, height: 600 });
        assert_eq!(c.font_sizes.title, 20);
        assert_eq!(c.font_sizes.countdown, 30);
        assert_eq!(c.font_sizes.quadrant_title, 12);
    }

    #[test]
    fn set_and_get_every_key() {
        let mut c = Configuration::default();
        c.set("main_title", "Sprint").unwrap();
        c.set("target_date", "2026-03-01").unwrap();
        c.set("is_locked", "yes").unwrap();
        c.set("window_size.height", "900").unwrap();
        c.set("font_sizes.task", "14").unwrap();
        assert_eq!(c.get("main_title").as_deref(), Some("Sprint"));
        assert_eq!(c.get("target_date").as_deref(), Some("2026-03-01"));
        assert_eq!(c.get("is_locked").as_deref(), Some("true"));
        assert_eq!(c.window_size.height, 900);
        assert_eq!(c.font_sizes.task, 14);
        for key in CONFIG_KEYS {
            assert!(c.get(key).is_some(), "missing getter for {}", key);
        }
    }

    #[test]
    fn set_rejects_out_of_range_sizes() {
        let mut c = Configuration::default();
        let err = c.set("font_sizes.countdown", "10").unwrap_err();
        assert_eq!(
            err,
            ConfigError::OutOfRange {
                key: "font_sizes.countdown".into(),
                min: 20,
                max: 100
            }
        );
        assert_eq!(c.font_sizes.countdown, 30);
    }

    #[test]
    fn set_rejects_bad_values_and_keys() {
        let mut c = Configuration::default();
        assert!(matches!(
            c.set("target_date", "next friday"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            c.set("auto_start", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            c.set("colour", "red"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert_eq!(c, Configuration::default());
    }
}
