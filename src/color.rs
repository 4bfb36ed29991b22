//! Color helpers on top of [`iced::Color`].
//!
//! Every color built here is fully opaque unless an alpha is given explicitly.
use crate::Color;

const fn opaque(r: f32, g: f32, b: f32) -> Color {
    Color { r, g, b, a: 1.0 }
}

pub const RED: Color = opaque(1.0, 0.0, 0.0);
pub const GREEN: Color = opaque(0.0, 1.0, 0.0);
pub const BLUE: Color = opaque(0.0, 0.0, 1.0);
pub const YELLOW: Color = opaque(1.0, 1.0, 0.0);
pub const CYAN: Color = opaque(0.0, 1.0, 1.0);
pub const MAGENTA: Color = opaque(1.0, 0.0, 1.0);
pub const WHITE: Color = opaque(1.0, 1.0, 1.0);
pub const BLACK: Color = opaque(0.0, 0.0, 0.0);
pub const GRAY: Color = opaque(0.5, 0.5, 0.5);
pub const LIGHT_GRAY: Color = opaque(0.75, 0.75, 0.75);
pub const DARK_GRAY: Color = opaque(0.25, 0.25, 0.25);
pub const ORANGE: Color = opaque(1.0, 0.5, 0.0);
pub const PURPLE: Color = opaque(0.5, 0.0, 0.5);
pub const PINK: Color = opaque(1.0, 0.75, 0.8);
pub const BROWN: Color = opaque(0.6, 0.3, 0.0);
pub const VIOLET: Color = opaque(0.93, 0.51, 0.93);

/// A color in hue/saturation/value form.
///
/// `h` is in degrees `[0, 360)`, `s` and `v` are in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Hsv {
    pub fn new(h: f32, s: f32, v: f32) -> Self {
        Self { h, s, v }
    }

    /// Converts to an opaque RGB color.
    pub fn to_rgb(self) -> Color {
        hsv_to_rgb(self)
    }
}

impl From<Hsv> for Color {
    fn from(hsv: Hsv) -> Self {
        hsv_to_rgb(hsv)
    }
}

/// Converts HSV to an opaque RGB color. Hue wraps around 360 degrees.
pub fn hsv_to_rgb(hsv: Hsv) -> Color {
    let s = hsv.s.clamp(0.0, 1.0);
    let v = hsv.v.clamp(0.0, 1.0);
    if s == 0.0 {
        return opaque(v, v, v);
    }

    let h = hsv.h.rem_euclid(360.0) / 60.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector as u8 {
        0 => opaque(v, t, p),
        1 => opaque(q, v, p),
        2 => opaque(p, v, t),
        3 => opaque(p, q, v),
        4 => opaque(t, p, v),
        _ => opaque(v, p, q),
    }
}

/// Converts an RGB color to HSV, ignoring alpha.
pub fn rgb_to_hsv(color: Color) -> Hsv {
    let max = color.r.max(color.g).max(color.b);
    let min = color.r.min(color.g).min(color.b);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta / max } else { 0.0 };
    if delta == 0.0 {
        return Hsv::new(0.0, s, v);
    }

    let h = if max == color.r {
        60.0 * ((color.g - color.b) / delta)
    } else if max == color.g {
        60.0 * ((color.b - color.r) / delta + 2.0)
    } else {
        60.0 * ((color.r - color.g) / delta + 4.0)
    };

    Hsv::new(h.rem_euclid(360.0), s, v)
}

/// Moves `color` towards white by `amount` in `[0, 1]`. Alpha is kept.
pub fn lighten(color: Color, amount: f32) -> Color {
    let t = amount.clamp(0.0, 1.0);
    Color {
        r: color.r + (1.0 - color.r) * t,
        g: color.g + (1.0 - color.g) * t,
        b: color.b + (1.0 - color.b) * t,
        a: color.a,
    }
}

/// Linear blend between two colors, `t` clamped to `[0, 1]`.
pub fn mix(from: Color, to: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    Color {
        r: from.r + (to.r - from.r) * t,
        g: from.g + (to.g - from.g) * t,
        b: from.b + (to.b - from.b) * t,
        a: from.a + (to.a - from.a) * t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < 1e-5 && (a.g - b.g).abs() < 1e-5 && (a.b - b.b).abs() < 1e-5
    }

    #[test]
    fn primary_hues() {
        assert!(close(hsv_to_rgb(Hsv::new(0.0, 1.0, 1.0)), RED));
        assert!(close(hsv_to_rgb(Hsv::new(120.0, 1.0, 1.0)), GREEN));
        assert!(close(hsv_to_rgb(Hsv::new(240.0, 1.0, 1.0)), BLUE));
        assert!(close(hsv_to_rgb(Hsv::new(360.0, 1.0, 1.0)), RED));
    }

    #[test]
    fn hsv_back_and_forth() {
        let c = opaque(0.2, 0.6, 0.9);
        assert!(close(rgb_to_hsv(c).to_rgb(), c));
    }

    #[test]
    fn lighten_black_gives_gray() {
        let g = lighten(BLACK, 0.7);
        assert!(close(g, opaque(0.7, 0.7, 0.7)));
        assert_eq!(g.a, 1.0);
    }

    #[test]
    fn named_colors_are_opaque() {
        for c in [RED, GREEN, BLUE, YELLOW, CYAN, MAGENTA, ORANGE, VIOLET] {
            assert_eq!(c.a, 1.0);
        }
    }
}
