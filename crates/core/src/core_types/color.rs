//! Color value types shared by the mapper, the frame buffers, and the FFI.

use serde::{Deserialize, Serialize};

#[inline]
fn unit(channel: f32) -> f32 {
    if channel.is_nan() {
        0.0
    } else {
        channel.clamp(0.0, 1.0)
    }
}

/// Linear RGB color. Channels are nominally in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const GRAY: Rgb = Rgb::new(0.7, 0.7, 0.7);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation towards `other`; `t` is clamped to [0, 1].
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = unit(t);
        Rgb::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    pub fn scale(self, factor: f32) -> Rgb {
        Rgb::new(self.r * factor, self.g * factor, self.b * factor)
    }

    /// Clamp every channel into [0, 1]; NaN channels become 0.
    pub fn clamped(self) -> Rgb {
        Rgb::new(unit(self.r), unit(self.g), unit(self.b))
    }

    pub fn with_alpha(self, a: f32) -> Rgba {
        Rgba::new(self.r, self.g, self.b, a)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// RGB plus a separate alpha/fade factor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }

    pub fn with_alpha(self, a: f32) -> Rgba {
        Rgba { a, ..self }
    }

    /// Color channels multiplied by alpha, for sinks that blend without an
    /// alpha channel.
    pub fn premultiplied(self) -> Rgb {
        self.rgb().scale(self.a).clamped()
    }

    pub fn clamped(self) -> Rgba {
        Rgba::new(unit(self.r), unit(self.g), unit(self.b), unit(self.a))
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints_and_clamp() {
        let a = Rgb::new(0.0, 0.3, 1.0);
        let b = Rgb::new(0.0, 0.7, 0.7);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        // Out-of-range t is clamped rather than extrapolated
        assert_eq!(a.lerp(b, 4.0), b);
        assert_eq!(a.lerp(b, -1.0), a);
    }

    #[test]
    fn test_clamped_handles_nan_and_overflow() {
        let c = Rgb::new(f32::NAN, 1.5, -0.2).clamped();
        assert_eq!(c, Rgb::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_premultiplied() {
        let c = Rgba::new(1.0, 0.5, 0.0, 0.5).premultiplied();
        assert_eq!(c, Rgb::new(0.5, 0.25, 0.0));
    }
}
