//! Declarative piano style
//!
//! Everything a host configures about a piano view, supplied at
//! construction. The same fields can be changed later through the view's
//! setters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::key::{MAX_NUMBER_OF_KEYS, MIN_NUMBER_OF_KEYS};
use crate::paint::Color;

/// Smallest allowed black key scale
pub const SCALE_MIN: f32 = 0.05;

/// Largest allowed black key scale
pub const SCALE_MAX: f32 = 1.0;

/// Default number of keys (two octaves)
pub const DEFAULT_NUMBER_OF_KEYS: usize = 24;

/// When keys are drawn in the pressed colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowPressMode {
    /// Highlight keys while they are held down
    #[default]
    OnDown,
    /// Toggle a key's highlight every time it is clicked
    OnClick,
    /// Never highlight from touch input
    Off,
}

impl ShowPressMode {
    /// The mode after this one, wrapping around
    pub fn next(self) -> Self {
        match self {
            Self::OnDown => Self::OnClick,
            Self::OnClick => Self::Off,
            Self::Off => Self::OnDown,
        }
    }
}

impl fmt::Display for ShowPressMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OnDown => "on_down",
            Self::OnClick => "on_click",
            Self::Off => "off",
        };
        f.write_str(name)
    }
}

impl FromStr for ShowPressMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "on_down" | "down" => Ok(Self::OnDown),
            "on_click" | "click" => Ok(Self::OnClick),
            "off" | "none" => Ok(Self::Off),
            _ => Err(Error::Config(format!(
                "Unknown show press mode {:?} (expected on_down, on_click or off)",
                s
            ))),
        }
    }
}

/// Piano view style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PianoStyle {
    /// Total number of keys (1-88)
    pub number_of_keys: usize,
    /// Black key width relative to white key width (0.05-1.0)
    pub black_key_width_scale: f32,
    /// Black key height relative to the view height (0.05-1.0)
    pub black_key_height_scale: f32,
    /// Fill of white keys
    pub white_key_color: Color,
    /// Fill of black keys
    pub black_key_color: Color,
    /// Fill of highlighted keys
    pub pressed_key_color: Color,
    /// Key border colour, also used for the background
    pub key_stroke_color: Color,
    /// Key border width in pixels; 0 disables borders and background
    pub key_stroke_width: u32,
    /// Corner radius of keys and background in pixels
    pub key_corner_radius: u32,
    /// When touch input highlights keys
    pub show_press_mode: ShowPressMode,
    /// Whether several keys may be highlighted at once
    pub multi_key_highlighting: bool,
}

impl Default for PianoStyle {
    fn default() -> Self {
        Self {
            number_of_keys: DEFAULT_NUMBER_OF_KEYS,
            black_key_width_scale: 0.6,
            black_key_height_scale: 0.6,
            white_key_color: Color::WHITE,
            black_key_color: Color::BLACK,
            pressed_key_color: Color::rgb(0x4F, 0xC3, 0xF7),
            key_stroke_color: Color::BLACK,
            key_stroke_width: 4,
            key_corner_radius: 8,
            show_press_mode: ShowPressMode::OnDown,
            multi_key_highlighting: true,
        }
    }
}

impl PianoStyle {
    /// Check every ranged field
    pub fn validate(&self) -> Result<()> {
        validate_number_of_keys(self.number_of_keys)?;
        validate_scale("blackKeyWidthScale", self.black_key_width_scale)?;
        validate_scale("blackKeyHeightScale", self.black_key_height_scale)?;
        Ok(())
    }
}

/// Reject key counts outside 1..=88
pub fn validate_number_of_keys(number_of_keys: usize) -> Result<()> {
    if (MIN_NUMBER_OF_KEYS..=MAX_NUMBER_OF_KEYS).contains(&number_of_keys) {
        Ok(())
    } else {
        Err(Error::InvalidNumberOfKeys {
            actual: number_of_keys,
            min: MIN_NUMBER_OF_KEYS,
            max: MAX_NUMBER_OF_KEYS,
        })
    }
}

/// Reject black key scales outside 0.05..=1.0 (NaN included)
pub fn validate_scale(name: &'static str, scale: f32) -> Result<()> {
    if (SCALE_MIN..=SCALE_MAX).contains(&scale) {
        Ok(())
    } else {
        Err(Error::InvalidScale {
            name,
            actual: scale,
            min: SCALE_MIN,
            max: SCALE_MAX,
        })
    }
}
