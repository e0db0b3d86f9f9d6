/// Shared geometric and color primitives used across scene, session and
/// render modules.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn channels(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa` hex notation.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        match digits.len() {
            3 => {
                let r = hex_nibble(digits, 0)?;
                let g = hex_nibble(digits, 1)?;
                let b = hex_nibble(digits, 2)?;
                Some(Self::new(r * 17, g * 17, b * 17, 255))
            }
            6 => Some(Self::new(
                hex_byte(digits, 0)?,
                hex_byte(digits, 1)?,
                hex_byte(digits, 2)?,
                255,
            )),
            8 => Some(Self::new(
                hex_byte(digits, 0)?,
                hex_byte(digits, 1)?,
                hex_byte(digits, 2)?,
                hex_byte(digits, 3)?,
            )),
            _ => None,
        }
    }
}

fn hex_nibble(digits: &str, index: usize) -> Option<u8> {
    let digit = digits.get(index..index + 1)?;
    u8::from_str_radix(digit, 16).ok()
}

fn hex_byte(digits: &str, index: usize) -> Option<u8> {
    let pair = digits.get(index * 2..index * 2 + 2)?;
    u8::from_str_radix(pair, 16).ok()
}

/// Axis-aligned crop region in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Shrinks the region so it lies entirely inside `canvas`.
    pub fn clamped_to(self, canvas: CanvasSize) -> Self {
        let x = self.x.min(canvas.width.saturating_sub(1));
        let y = self.y.min(canvas.height.saturating_sub(1));
        Self {
            x,
            y,
            width: self.width.min(canvas.width - x),
            height: self.height.min(canvas.height - y),
        }
    }
}

pub const CROP_MIN_SIZE: u32 = 16;

/// Uniform scale that fits `content` inside `container` while preserving the
/// content's aspect ratio. The smaller of the two axis ratios wins.
pub fn fit_scale(container: CanvasSize, content_width: u32, content_height: u32) -> f64 {
    if content_width == 0 || content_height == 0 {
        return 1.0;
    }
    let horizontal = f64::from(container.width) / f64::from(content_width);
    let vertical = f64::from(container.height) / f64::from(content_height);
    horizontal.min(vertical)
}

/// Offset that centers a span of `scaled` pixels inside `container` pixels.
pub fn centered_offset(container: u32, scaled: f64) -> f64 {
    (f64::from(container) - scaled) / 2.0
}

/// Canvas dimensions matching the image's aspect ratio inside `bounds`.
///
/// The wider axis of the image pins the corresponding bound; the other axis
/// is derived from the aspect ratio and rounded to the nearest pixel.
pub fn fit_canvas_to_image(image_width: u32, image_height: u32, bounds: CanvasSize) -> CanvasSize {
    if image_width == 0 || image_height == 0 {
        return bounds;
    }

    let image_aspect = f64::from(image_width) / f64::from(image_height);
    let bounds_aspect = f64::from(bounds.width) / f64::from(bounds.height);

    if image_aspect > bounds_aspect {
        let height = f64::from(bounds.width) / image_aspect;
        CanvasSize::new(bounds.width, round_dimension(height))
    } else {
        let width = f64::from(bounds.height) * image_aspect;
        CanvasSize::new(round_dimension(width), bounds.height)
    }
}

fn round_dimension(value: f64) -> u32 {
    let rounded = value.round().max(1.0);
    if rounded >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        rounded as u32
    }
}
