//! Saved view state
//!
//! The minimal state a host persists across a view being torn down and
//! rebuilt: the style plus which keys are highlighted. Highlights from the
//! on-down press mode are transient and are never saved.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::paint::Color;
use crate::style::{PianoStyle, ShowPressMode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    pub pressed_keys: Vec<usize>,
    pub show_press_mode: ShowPressMode,
    pub multi_key_highlighting: bool,

    pub number_of_keys: usize,
    pub white_key_color: Color,
    pub black_key_color: Color,
    pub pressed_key_color: Color,
    pub key_stroke_color: Color,

    pub key_corner_radius: u32,
    pub key_stroke_width: u32,

    pub black_key_width_scale: f32,
    pub black_key_height_scale: f32,
}

impl SavedState {
    /// Capture a style and its highlighted keys
    pub fn new(style: &PianoStyle, pressed_keys: impl IntoIterator<Item = usize>) -> Self {
        let pressed_keys = if style.show_press_mode == ShowPressMode::OnDown {
            Vec::new()
        } else {
            pressed_keys.into_iter().collect()
        };
        Self {
            pressed_keys,
            show_press_mode: style.show_press_mode,
            multi_key_highlighting: style.multi_key_highlighting,
            number_of_keys: style.number_of_keys,
            white_key_color: style.white_key_color,
            black_key_color: style.black_key_color,
            pressed_key_color: style.pressed_key_color,
            key_stroke_color: style.key_stroke_color,
            key_corner_radius: style.key_corner_radius,
            key_stroke_width: style.key_stroke_width,
            black_key_width_scale: style.black_key_width_scale,
            black_key_height_scale: style.black_key_height_scale,
        }
    }

    /// The style this state describes
    pub fn style(&self) -> PianoStyle {
        PianoStyle {
            number_of_keys: self.number_of_keys,
            black_key_width_scale: self.black_key_width_scale,
            black_key_height_scale: self.black_key_height_scale,
            white_key_color: self.white_key_color,
            black_key_color: self.black_key_color,
            pressed_key_color: self.pressed_key_color,
            key_stroke_color: self.key_stroke_color,
            key_stroke_width: self.key_stroke_width,
            key_corner_radius: self.key_corner_radius,
            show_press_mode: self.show_press_mode,
            multi_key_highlighting: self.multi_key_highlighting,
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Write the state to a file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_down_highlights_are_not_saved() {
        let style = PianoStyle::default();
        let state = SavedState::new(&style, [1, 2]);
        assert!(state.pressed_keys.is_empty());

        let style = PianoStyle {
            show_press_mode: ShowPressMode::Off,
            ..PianoStyle::default()
        };
        let state = SavedState::new(&style, [1, 2]);
        assert_eq!(state.pressed_keys, vec![1, 2]);
    }

    #[test]
    fn test_style_roundtrip() {
        let style = PianoStyle {
            number_of_keys: 37,
            key_stroke_width: 0,
            multi_key_highlighting: false,
            ..PianoStyle::default()
        };
        assert_eq!(SavedState::new(&style, Vec::new()).style(), style);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.toml");
        let style = PianoStyle {
            show_press_mode: ShowPressMode::OnClick,
            ..PianoStyle::default()
        };
        let state = SavedState::new(&style, [0, 5, 17]);
        state.save_to(&path).unwrap();
        assert_eq!(SavedState::load_from(&path).unwrap(), state);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(SavedState::from_toml("pressed_keys = \"nope\"").is_err());
    }
}
