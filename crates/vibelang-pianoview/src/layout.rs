//! Key layout engine
//!
//! Fits `number_of_keys` keys into a fixed pixel width. White keys are laid
//! out first, left to right, overlapping by one stroke width so neighbouring
//! borders coincide. Black keys are centred over the border between the
//! white keys around them. Integer rounding leftovers are handed out one
//! pixel at a time to the leftmost white keys, so the right edge of the
//! rightmost key always lands on the right edge of the view.

use crate::key::{black_key_index, count_keys, is_white_key, white_key_index};

/// Integer pixel rectangle, inclusive on every edge for hit testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Check if the point lies inside, edges included
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Round a pointer coordinate to the pixel it falls in (half-up)
pub fn to_pixel(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}

/// Round half-up, the way key dimensions are derived from their scales
fn round_half_up(v: f32) -> i64 {
    (v + 0.5).floor() as i64
}

/// Clamp a computed coordinate into pixel range
fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Everything the geometry depends on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// View width in pixels
    pub width: i32,
    /// View height in pixels
    pub height: i32,
    /// Total number of keys, 1..=88
    pub number_of_keys: usize,
    /// Black key width relative to white key width
    pub black_key_width_scale: f32,
    /// Black key height relative to view height
    pub black_key_height_scale: f32,
    /// Key border width in pixels
    pub stroke_width: i32,
}

/// Computed key geometry for one view size and key count
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardLayout {
    params: LayoutParams,
    keys: Vec<Rect>,
    background: Rect,
    number_of_white_keys: usize,
    number_of_black_keys: usize,
    white_key_width: i32,
    white_key_height: i32,
    black_key_width: i32,
    black_key_height: i32,
    width_remainder: i32,
}

impl KeyboardLayout {
    /// Lay out every key for the given parameters
    ///
    /// `params.number_of_keys` must be at least 1; the view validates it
    /// before it gets here.
    pub fn compute(params: LayoutParams) -> Self {
        let n = params.number_of_keys.max(1);
        let (number_of_white_keys, number_of_black_keys) = count_keys(n);
        // Widths are worked out in i64: stroke and view width products
        // overflow i32 long before the final coordinates do.
        let w = i64::from(params.width);
        let s = i64::from(params.stroke_width);
        let n_white = number_of_white_keys as i64;
        let scale = params.black_key_width_scale;

        let (white_key_width, black_key_width, width_remainder) = if is_white_key(n - 1) {
            let white_key_width = (w + (n_white - 1) * s) / n_white;
            let black_key_width = round_half_up(white_key_width as f32 * scale);
            let remainder = w - (white_key_width * n_white - s * (n_white - 1));
            (white_key_width, black_key_width, remainder)
        } else {
            // The rightmost black key sticks out half its width past the last
            // white key, which has to be paid for out of the white keys.
            let remainder_for = |white_key_width: i64, black_key_width: i64| {
                w - ((white_key_width * n_white - s * (n_white - 1))
                    + (black_key_width / 2 - s / 2))
            };
            let numerator = (2 * w + 2 * n_white * s - s) as f32;
            let denominator = (2 * n_white) as f32 + scale;
            let mut white_key_width = (numerator / denominator) as i64;
            let mut black_key_width = round_half_up(white_key_width as f32 * scale);
            let mut remainder = remainder_for(white_key_width, black_key_width);
            // Past f32 precision the estimate can leave the last key short of
            // the right edge; widen until the remainder fits the white keys.
            while remainder > n_white + (black_key_width & 1) {
                white_key_width += 1;
                black_key_width = round_half_up(white_key_width as f32 * scale);
                remainder = remainder_for(white_key_width, black_key_width);
            }
            (white_key_width, black_key_width, remainder)
        };
        let white_key_height = i64::from(params.height);
        let black_key_height =
            round_half_up(params.height as f32 * params.black_key_height_scale);

        // (left, right, bottom) per key
        let mut bounds = vec![(0i64, 0i64, 0i64); n];

        let mut left = 0;
        let mut key_width = white_key_width + 1;
        for i in 0..number_of_white_keys {
            if i as i64 == width_remainder {
                key_width -= 1;
            }
            bounds[white_key_index(i)] = (left, left + key_width, white_key_height);
            left += key_width - s;
        }

        for i in 0..number_of_black_keys {
            let ix = black_key_index(i);
            let left = bounds[ix - 1].1 - black_key_width / 2 - s / 2;
            bounds[ix] = (left, left + black_key_width, black_key_height);
        }

        // Rounding can leave a trailing black key one pixel past the edge
        let last = &mut bounds[n - 1];
        last.1 = last.1.min(w);

        let keys: Vec<Rect> = bounds
            .iter()
            .map(|&(left, right, bottom)| {
                Rect::new(saturate(left), 0, saturate(right), saturate(bottom))
            })
            .collect();

        let background = if is_white_key(n - 1) {
            Rect::new(0, 0, params.width, params.height)
        } else {
            Rect::new(0, 0, keys[n - 2].right, params.height)
        };

        let white_key_width = saturate(white_key_width);
        let white_key_height = params.height;
        let black_key_width = saturate(black_key_width);
        let black_key_height = saturate(black_key_height);
        let width_remainder = saturate(width_remainder);

        log::debug!(
            "Piano layout: {}x{} px, {} keys ({} white, {} black), white {}x{} (+1 for {}), black {}x{}",
            params.width,
            params.height,
            n,
            number_of_white_keys,
            number_of_black_keys,
            white_key_width,
            white_key_height,
            width_remainder,
            black_key_width,
            black_key_height
        );

        Self {
            params,
            keys,
            background,
            number_of_white_keys,
            number_of_black_keys,
            white_key_width,
            white_key_height,
            black_key_width,
            black_key_height,
            width_remainder,
        }
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn number_of_keys(&self) -> usize {
        self.keys.len()
    }

    pub fn number_of_white_keys(&self) -> usize {
        self.number_of_white_keys
    }

    pub fn number_of_black_keys(&self) -> usize {
        self.number_of_black_keys
    }

    /// Nominal white key width, before remainder distribution
    pub fn white_key_width(&self) -> i32 {
        self.white_key_width
    }

    pub fn white_key_height(&self) -> i32 {
        self.white_key_height
    }

    pub fn black_key_width(&self) -> i32 {
        self.black_key_width
    }

    pub fn black_key_height(&self) -> i32 {
        self.black_key_height
    }

    /// Number of leftmost white keys that got one extra pixel
    pub fn width_remainder(&self) -> i32 {
        self.width_remainder
    }

    /// Area painted with the stroke colour behind the keys
    pub fn background(&self) -> Rect {
        self.background
    }

    /// Bounds of the key at `index`
    pub fn key_bounds(&self, index: usize) -> Option<Rect> {
        self.keys.get(index).copied()
    }

    /// All key bounds, indexed by key
    pub fn keys(&self) -> &[Rect] {
        &self.keys
    }

    /// White key indices, left to right
    pub fn white_keys(&self) -> impl Iterator<Item = usize> {
        (0..self.number_of_white_keys).map(white_key_index)
    }

    /// Black key indices, left to right
    pub fn black_keys(&self) -> impl Iterator<Item = usize> {
        (0..self.number_of_black_keys).map(black_key_index)
    }

    /// Find the key under a pixel, if any
    ///
    /// Black keys are drawn on top, so they are tested first. White keys
    /// give up the right half of their shared border to the next white key;
    /// the last white key keeps its full bounds.
    pub fn touched_key(&self, x: i32, y: i32) -> Option<usize> {
        if let Some(ix) = self.black_keys().find(|&ix| self.keys[ix].contains(x, y)) {
            return Some(ix);
        }

        let last_white = white_key_index(self.number_of_white_keys - 1);
        let half_stroke = self.params.stroke_width / 2;
        self.white_keys().find(|&ix| {
            let bounds = self.keys[ix];
            if ix == last_white {
                bounds.contains(x, y)
            } else {
                Rect {
                    right: bounds.right.saturating_sub(half_stroke),
                    ..bounds
                }
                .contains(x, y)
            }
        })
    }
}
