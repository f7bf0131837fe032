//! Painting
//!
//! The view never draws by itself. [`display_list`] turns the layout, the
//! pressed-key set and the style into an ordered list of rounded rectangles,
//! and hosts hand that list to whatever can draw them through [`Canvas`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::highlight::Highlight;
use crate::key::is_white_key;
use crate::layout::{KeyboardLayout, Rect};
use crate::style::PianoStyle;

/// 32-bit ARGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);

    /// Opaque colour from its components
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub fn alpha(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn red(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn green(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn blue(&self) -> u8 {
        self.0 as u8
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parse a colour name, `#RRGGBB` or `#AARRGGBB`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let named = match lower.as_str() {
            "black" => Some(Color::BLACK),
            "white" => Some(Color::WHITE),
            "red" => Some(Color::rgb(0xF4, 0x43, 0x36)),
            "green" => Some(Color::rgb(0x4C, 0xAF, 0x50)),
            "yellow" => Some(Color::rgb(0xFF, 0xEB, 0x3B)),
            "blue" => Some(Color::rgb(0x21, 0x96, 0xF3)),
            "magenta" => Some(Color::rgb(0xE9, 0x1E, 0x63)),
            "cyan" => Some(Color::rgb(0x00, 0xBC, 0xD4)),
            "gray" | "grey" => Some(Color::rgb(0x9E, 0x9E, 0x9E)),
            "dark_gray" | "dark_grey" | "darkgray" | "darkgrey" => {
                Some(Color::rgb(0x42, 0x42, 0x42))
            }
            "light_blue" | "lightblue" => Some(Color::rgb(0x4F, 0xC3, 0xF7)),
            _ => None,
        };
        if let Some(color) = named {
            return Ok(color);
        }

        let hex = lower
            .strip_prefix('#')
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| Error::InvalidColor(s.to_string()))?;
        let value =
            u32::from_str_radix(hex, 16).map_err(|_| Error::InvalidColor(s.to_string()))?;
        match hex.len() {
            6 => Ok(Color(0xFF00_0000 | value)),
            8 => Ok(Color(value)),
            _ => Err(Error::InvalidColor(s.to_string())),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alpha() == 0xFF {
            write!(f, "#{:06X}", self.0 & 0x00FF_FFFF)
        } else {
            write!(f, "#{:08X}", self.0)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// What a painted rectangle stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Stroke-coloured area behind the keys
    Background,
    /// The key with this index
    Key(usize),
}

/// One rectangle to paint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundedRect {
    pub shape: Shape,
    pub bounds: Rect,
    pub fill: Color,
    pub stroke_color: Color,
    /// Zero means no stroke
    pub stroke_width: u32,
    pub corner_radius: u32,
}

/// Something that can paint rounded rectangles
pub trait Canvas {
    fn draw_rounded_rect(&mut self, rect: &RoundedRect);
}

impl Canvas for Vec<RoundedRect> {
    fn draw_rounded_rect(&mut self, rect: &RoundedRect) {
        self.push(*rect);
    }
}

/// Fill colour for a key given whether it is highlighted
pub fn key_fill(style: &PianoStyle, key: usize, pressed: bool) -> Color {
    if pressed {
        style.pressed_key_color
    } else if is_white_key(key) {
        style.white_key_color
    } else {
        style.black_key_color
    }
}

/// Everything to paint, back to front
///
/// The background only shows up with a visible stroke. White keys come
/// before black keys so the black keys end up on top.
pub fn display_list(
    layout: &KeyboardLayout,
    highlight: &Highlight,
    style: &PianoStyle,
) -> Vec<RoundedRect> {
    let mut list = Vec::with_capacity(layout.number_of_keys() + 1);
    if style.key_stroke_width > 0 {
        list.push(RoundedRect {
            shape: Shape::Background,
            bounds: layout.background(),
            fill: style.key_stroke_color,
            stroke_color: style.key_stroke_color,
            stroke_width: 0,
            corner_radius: style.key_corner_radius,
        });
    }
    for key in layout.white_keys().chain(layout.black_keys()) {
        if let Some(bounds) = layout.key_bounds(key) {
            list.push(RoundedRect {
                shape: Shape::Key(key),
                bounds,
                fill: key_fill(style, key, highlight.is_pressed(key)),
                stroke_color: style.key_stroke_color,
                stroke_width: style.key_stroke_width,
                corner_radius: style.key_corner_radius,
            });
        }
    }
    list
}
