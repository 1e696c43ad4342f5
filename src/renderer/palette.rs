//! Colours shared by the GPU scene and the DOM overlay

use crate::sim::ParticleStatus;

/// Linear RGBA indexed by `ParticleStatus::as_index` (pass, deflect, rebound)
pub const STATUS_COLORS: [[f32; 4]; 3] = [
    [0.2, 1.0, 0.2, 1.0],
    [1.0, 1.0, 0.2, 1.0],
    [1.0, 0.2, 0.2, 1.0],
];

/// CSS colour for labels and legend swatches
pub fn status_css(status: ParticleStatus) -> &'static str {
    match status {
        ParticleStatus::Passed => "#33ff33",
        ParticleStatus::Deflected => "#ffff33",
        ParticleStatus::Rebounded => "#ff3333",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_matches_gpu_palette() {
        for status in [
            ParticleStatus::Passed,
            ParticleStatus::Deflected,
            ParticleStatus::Rebounded,
        ] {
            let rgb = STATUS_COLORS[status.as_index() as usize];
            let css = status_css(status);
            let channel = |i: usize| u8::from_str_radix(&css[1 + i * 2..3 + i * 2], 16).unwrap();
            for i in 0..3 {
                assert_eq!(channel(i), (rgb[i] * 255.0).round() as u8);
            }
        }
    }
}
