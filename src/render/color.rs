//! 颜色

use serde::{Deserialize, Serialize};

fn opaque() -> u8 {
    255
}

/// 8位 RGBA 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// HSB 转 RGB
    ///
    /// `hue` 取 0–360 度，`saturation` 与 `brightness` 取 0–100。
    pub fn from_hsb(hue: f32, saturation: f32, brightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = (saturation / 100.0).clamp(0.0, 1.0);
        let v = (brightness / 100.0).clamp(0.0, 1.0);

        let c = v * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = v - c;

        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let to_u8 = |f: f32| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(to_u8(r), to_u8(g), to_u8(b))
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// 源在上的 alpha 混合
    pub fn blend_over(self, dst: [u8; 4]) -> [u8; 4] {
        if self.a == 255 {
            return self.to_array();
        }
        let a = self.a as f32 / 255.0;
        let mix = |s: u8, d: u8| (s as f32 * a + d as f32 * (1.0 - a)).round() as u8;
        [
            mix(self.r, dst[0]),
            mix(self.g, dst[1]),
            mix(self.b, dst[2]),
            dst[3].max(self.a),
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}
