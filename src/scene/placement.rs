use serde::{Deserialize, Serialize};

/// Quarter-turn rotation applied after scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    None,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Default for Rotation {
    fn default() -> Self {
        Self::None
    }
}

impl Rotation {
    pub const fn quarter_turn(self) -> Self {
        match self {
            Self::None => Self::Quarter,
            Self::Quarter => Self::Half,
            Self::Half => Self::ThreeQuarter,
            Self::ThreeQuarter => Self::None,
        }
    }

    pub const fn degrees(self) -> u16 {
        match self {
            Self::None => 0,
            Self::Quarter => 90,
            Self::Half => 180,
            Self::ThreeQuarter => 270,
        }
    }

    /// Whether the rotated object's width and height trade places.
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Quarter | Self::ThreeQuarter)
    }
}

const SCALE_MIN: f64 = 0.01;
const SCALE_MAX: f64 = 20.0;

/// Position and transform of one scene object on the canvas.
///
/// Transforms compose as scale first, then rotation; `left`/`top` locate the
/// top-left corner of the transformed object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation: Rotation,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Placement {
    pub fn at(left: f64, top: f64) -> Self {
        Self {
            left,
            top,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: Rotation::None,
            flip_x: false,
            flip_y: false,
        }
    }

    pub fn with_uniform_scale(mut self, scale: f64) -> Self {
        let scale = scale.clamp(SCALE_MIN, SCALE_MAX);
        self.scale_x = scale;
        self.scale_y = scale;
        self
    }

    /// Width on canvas for an object with the given intrinsic width, before
    /// rotation is applied.
    pub fn scaled_width(&self, intrinsic_width: u32) -> f64 {
        f64::from(intrinsic_width) * self.scale_x
    }

    pub fn scaled_height(&self, intrinsic_height: u32) -> f64 {
        f64::from(intrinsic_height) * self.scale_y
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.left += dx;
        self.top += dy;
    }

    /// Multiplies both scale axes, clamping the result to a workable range.
    pub fn scale_by(&mut self, factor: f64) {
        self.scale_x = (self.scale_x * factor).clamp(SCALE_MIN, SCALE_MAX);
        self.scale_y = (self.scale_y * factor).clamp(SCALE_MIN, SCALE_MAX);
    }

    pub fn toggle_flip_x(&mut self) {
        self.flip_x = !self.flip_x;
    }

    pub fn toggle_flip_y(&mut self) {
        self.flip_y = !self.flip_y;
    }

    pub fn rotate_quarter_turn(&mut self) {
        self.rotation = self.rotation.quarter_turn();
    }
}
