use anyhow::Context;
use pgb_core::Button;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A button state change applied just before the given frame starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledInput {
    pub frame: u64,
    pub button: Button,
    #[serde(default = "default_pressed")]
    pub pressed: bool,
}

fn default_pressed() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_frames")]
    pub frames: u64,

    #[serde(default)]
    pub realtime: bool,

    pub screenshot_path: Option<String>,

    pub boot_rom_path: Option<String>,

    #[serde(default)]
    pub inputs: Vec<ScheduledInput>,
}

fn default_frames() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            frames: default_frames(),
            realtime: bool::default(),
            screenshot_path: Option::default(),
            boot_rom_path: Option::default(),
            inputs: Vec::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_file<P>(path: P) -> Result<Self, anyhow::Error>
    where
        P: AsRef<Path> + std::fmt::Debug,
    {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("error reading TOML config file from '{path:?}'"))?;
        let config: Self = toml::from_str(&config_str)
            .with_context(|| format!("error parsing app config from TOML file at '{path:?}'"))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").expect("empty config should parse");
        assert_eq!(AppConfig::default(), config);
        assert_eq!(300, config.frames);
        assert!(!config.realtime);
    }

    #[test]
    fn scheduled_inputs() {
        let config: AppConfig = toml::from_str(
            r#"
            frames = 60
            screenshot_path = "out.png"

            [[inputs]]
            frame = 10
            button = "start"

            [[inputs]]
            frame = 20
            button = "Start"
            pressed = false

            [[inputs]]
            frame = 30
            button = "A"
            "#,
        )
        .expect("config should parse");

        assert_eq!(60, config.frames);
        assert_eq!(Some("out.png".into()), config.screenshot_path);
        assert_eq!(
            vec![
                ScheduledInput {
                    frame: 10,
                    button: Button::Start,
                    pressed: true,
                },
                ScheduledInput {
                    frame: 20,
                    button: Button::Start,
                    pressed: false,
                },
                ScheduledInput {
                    frame: 30,
                    button: Button::A,
                    pressed: true,
                },
            ],
            config.inputs
        );
    }

    #[test]
    fn invalid_button_name() {
        let result: Result<AppConfig, _> = toml::from_str(
            r#"
            [[inputs]]
            frame = 1
            button = "Turbo"
            "#,
        );

        let err = result.expect_err("unknown button should be rejected");
        assert!(err.to_string().contains("Turbo"), "{err}");
    }

    #[test]
    fn read_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file should be created");
        writeln!(file, "realtime = true\nboot_rom_path = \"dmg_boot.bin\"")
            .expect("temp file should be writable");

        let config = AppConfig::from_toml_file(file.path()).expect("config file should load");
        assert!(config.realtime);
        assert_eq!(Some("dmg_boot.bin".into()), config.boot_rom_path);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let result = AppConfig::from_toml_file(dir.path().join("missing.toml"));
        assert!(result.is_err());
    }
}
