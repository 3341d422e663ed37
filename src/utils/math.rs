// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

/// Clamp a value between min and max
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    min.max(max.min(value))
}

/// Linear interpolation
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Remainder that always takes the sign of the divisor
pub fn positive_mod(a: f64, b: f64) -> f64 {
    ((a % b) + b) % b
}

/// Round half toward positive infinity
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Wrap an integer index into `0..len`
pub fn wrap_index(index: f64, len: usize) -> usize {
    if len == 0 || !index.is_finite() {
        return 0;
    }
    (index.trunc() as i64).rem_euclid(len as i64) as usize
}

/// Convert HSV to a `#rrggbb` color string.
///
/// Hue in `[0, 1]` is read as a fraction of a turn, anything larger as degrees.
/// Saturation and value are in `[0, 1]`.
pub fn hsv_to_hex(h: f64, s: f64, v: f64) -> String {
    let mut hue = if h <= 1.0 { h * 360.0 } else { h };
    hue = positive_mod(hue, 360.0);

    let c = v * s;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if hue < 60.0 {
        (c, x, 0.0)
    } else if hue < 120.0 {
        (x, c, 0.0)
    } else if hue < 180.0 {
        (0.0, c, x)
    } else if hue < 240.0 {
        (0.0, x, c)
    } else if hue < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    let channel = |f: f64| round_half_up((f + m) * 255.0).clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(15.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);
    }

    #[test]
    fn test_positive_mod() {
        assert_eq!(positive_mod(-1.0, 3.0), 2.0);
        assert_eq!(positive_mod(7.0, 3.0), 1.0);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
    }

    #[test]
    fn test_wrap_index() {
        assert_eq!(wrap_index(5.0, 3), 2);
        assert_eq!(wrap_index(-1.0, 3), 2);
        assert_eq!(wrap_index(f64::NAN, 3), 0);
    }

    #[test]
    fn test_hsv_to_hex() {
        assert_eq!(hsv_to_hex(0.0, 1.0, 1.0), "#ff0000");
        assert_eq!(hsv_to_hex(120.0, 1.0, 1.0), "#00ff00");
        assert_eq!(hsv_to_hex(240.0, 1.0, 1.0), "#0000ff");
        assert_eq!(hsv_to_hex(0.5, 0.0, 1.0), "#ffffff");
    }
}
