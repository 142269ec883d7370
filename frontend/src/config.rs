//! TOML-backed user configuration, loaded from
//! `~/.config/genesis-frontend/config.toml`. CLI flags always override
//! whatever this holds, which in turn overrides the built-in defaults;
//! a missing or malformed file is logged and ignored.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoMode {
    Pal,
    Ntsc,
    Auto,
}

impl Default for VideoMode {
    fn default() -> Self {
        VideoMode::Auto
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub video_mode: VideoMode,
    pub scale: u32,
    pub save_state_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            video_mode: VideoMode::default(),
            scale: 3,
            save_state_dir: None,
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("genesis-frontend").join("config.toml"))
}

/// Load the config file, falling back to defaults on any error (missing
/// file, bad TOML, no config dir on this platform).
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    match std::fs::read_to_string(&path) {
        Ok(text) => match toml::from_str(&text) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("config: failed to parse {}: {e}", path.display());
                Config::default()
            }
        },
        Err(_) => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_ntsc_auto_scale_three() {
        let cfg = Config::default();
        assert_eq!(cfg.video_mode, VideoMode::Auto);
        assert_eq!(cfg.scale, 3);
    }

    #[test]
    fn parses_a_minimal_toml_document() {
        let cfg: Config = toml::from_str("video_mode = \"pal\"\nscale = 4\n").unwrap();
        assert_eq!(cfg.video_mode, VideoMode::Pal);
        assert_eq!(cfg.scale, 4);
    }
}
