//! Jet colormap.

use image::Rgb;

/// Map an intensity level to the jet palette.
///
/// Runs dark blue (0) through cyan, yellow and red to dark red (255). Each
/// channel is a clipped triangle: `clamp(1.5 - |4v - k|)` with `k = 3, 2, 1` for
/// red, green, blue and `v = level / 255`.
#[must_use]
pub fn jet(level: u8) -> Rgb<u8> {
    let v = f32::from(level) / 255.0;
    let channel = |center: f32| {
        let c = (1.5 - (4.0 * v - center).abs()).clamp(0.0, 1.0);
        (c * 255.0).round() as u8
    };
    Rgb([channel(3.0), channel(2.0), channel(1.0)])
}

/// All 256 jet colors, indexed by level.
#[must_use]
pub fn jet_lut() -> [Rgb<u8>; 256] {
    let mut lut = [Rgb([0, 0, 0]); 256];
    for (level, color) in (0..=u8::MAX).zip(lut.iter_mut()) {
        *color = jet(level);
    }
    lut
}

/// Quantize a `[0, 1]` intensity to a colormap level.
///
/// Truncates, so only an intensity of exactly 1.0 reaches level 255.
#[must_use]
pub fn quantize(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jet_endpoints() {
        assert_eq!(jet(0), Rgb([0, 0, 128]));
        assert_eq!(jet(255), Rgb([128, 0, 0]));
    }

    #[test]
    fn test_jet_midpoint_is_green_dominant() {
        let Rgb([r, g, b]) = jet(128);
        assert_eq!(g, 255);
        assert!(r > 100 && r < 160);
        assert!(b > 100 && b < 160);
    }

    #[test]
    fn test_jet_hue_order() {
        // blue peaks before green before red
        let peak = |channel: usize| {
            (0..=u8::MAX)
                .max_by_key(|&l| (jet(l).0[channel], std::cmp::Reverse(l)))
                .unwrap()
        };
        assert!(peak(2) < peak(1));
        assert!(peak(1) < peak(0));
    }

    #[test]
    fn test_lut_matches_jet() {
        let lut = jet_lut();
        for level in [0u8, 1, 63, 64, 127, 200, 255] {
            assert_eq!(lut[level as usize], jet(level));
        }
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(0.999), 254);
        assert_eq!(quantize(1.0), 255);
        assert_eq!(quantize(-3.0), 0);
        assert_eq!(quantize(7.0), 255);
    }
}
