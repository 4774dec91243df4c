//! Engine configuration.
//!
//! Settings loaded from an INI configuration file. Defaults are safe to start
//! with; a missing file or key keeps them.
//!
//! # Configuration File Format
//!
//! ```ini
//! [view]
//! width = 256
//! height = 240
//! scale = 3
//!
//! [audio]
//! sample_rate = 44100
//! buffer_frames = 1024
//! max_volume = 0.25
//!
//! [physics]
//! gravity_y = 0
//! ```

use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

const DEFAULT_VIEW_WIDTH: u32 = 256;
const DEFAULT_VIEW_HEIGHT: u32 = 240;
const DEFAULT_VIEW_SCALE: u32 = 3;
const DEFAULT_SAMPLE_RATE: u32 = 44_100;
const DEFAULT_BUFFER_FRAMES: u32 = 1024;
const DEFAULT_MAX_VOLUME: f32 = 0.25;
const DEFAULT_GRAVITY_Y: f32 = 0.0;
const DEFAULT_CONFIG_PATH: &str = "./arcadecore.ini";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Logical view width in world units.
    pub view_width: u32,
    /// Logical view height in world units.
    pub view_height: u32,
    /// Window pixels per world unit.
    pub view_scale: u32,
    /// Samples per second requested from the platform's audio output.
    pub sample_rate: u32,
    /// Samples per audio callback buffer.
    pub buffer_frames: u32,
    /// Volume used by `play_sound` when none is given, in `[0, 1]`.
    pub max_volume: f32,
    /// Default vertical gravity for new physics components.
    pub gravity_y: f32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            view_width: DEFAULT_VIEW_WIDTH,
            view_height: DEFAULT_VIEW_HEIGHT,
            view_scale: DEFAULT_VIEW_SCALE,
            sample_rate: DEFAULT_SAMPLE_RATE,
            buffer_frames: DEFAULT_BUFFER_FRAMES,
            max_volume: DEFAULT_MAX_VOLUME,
            gravity_y: DEFAULT_GRAVITY_Y,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [view] section
        if let Some(width) = config.getuint("view", "width").ok().flatten() {
            self.view_width = width as u32;
        }
        if let Some(height) = config.getuint("view", "height").ok().flatten() {
            self.view_height = height as u32;
        }
        if let Some(scale) = config.getuint("view", "scale").ok().flatten() {
            self.view_scale = (scale as u32).max(1);
        }

        // [audio] section
        if let Some(rate) = config.getuint("audio", "sample_rate").ok().flatten() {
            self.sample_rate = rate as u32;
        }
        if let Some(frames) = config.getuint("audio", "buffer_frames").ok().flatten() {
            self.buffer_frames = frames as u32;
        }
        if let Some(volume) = config.getfloat("audio", "max_volume").ok().flatten() {
            self.max_volume = (volume as f32).clamp(0.0, 1.0);
        }

        // [physics] section
        if let Some(gravity) = config.getfloat("physics", "gravity_y").ok().flatten() {
            self.gravity_y = gravity as f32;
        }

        info!(
            "Loaded config: {}x{} view (x{}), {} Hz audio, {} frames, volume={}, gravity={}",
            self.view_width,
            self.view_height,
            self.view_scale,
            self.sample_rate,
            self.buffer_frames,
            self.max_volume,
            self.gravity_y
        );

        Ok(())
    }

    /// Save configuration to the INI file, creating it if needed.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("view", "width", Some(self.view_width.to_string()));
        config.set("view", "height", Some(self.view_height.to_string()));
        config.set("view", "scale", Some(self.view_scale.to_string()));

        config.set("audio", "sample_rate", Some(self.sample_rate.to_string()));
        config.set("audio", "buffer_frames", Some(self.buffer_frames.to_string()));
        config.set("audio", "max_volume", Some(self.max_volume.to_string()));

        config.set("physics", "gravity_y", Some(self.gravity_y.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    pub fn view_size(&self) -> (u32, u32) {
        (self.view_width, self.view_height)
    }

    pub fn window_size(&self) -> (u32, u32) {
        (
            self.view_width * self.view_scale,
            self.view_height * self.view_scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = EngineConfig::new();
        assert_eq!(config.view_size(), (256, 240));
        assert_eq!(config.window_size(), (768, 720));
        assert_eq!(config.sample_rate, 44_100);
    }

    #[test]
    fn missing_file_keeps_defaults() {
        let mut config = EngineConfig::with_path("/nonexistent/arcadecore.ini");
        assert!(config.load_from_file().is_err());
        assert_eq!(config.view_width, DEFAULT_VIEW_WIDTH);
        assert_eq!(config.max_volume, DEFAULT_MAX_VOLUME);
    }
}
