use tubely_core::types::AspectRatio;

use crate::MediaError;

/// Maximum absolute distance between a stream's ratio and a target ratio.
pub const RATIO_TOLERANCE: f64 = 0.01;

const LANDSCAPE: f64 = 16.0 / 9.0;
const PORTRAIT: f64 = 9.0 / 16.0;

/// Classify a width/height pair as landscape (16:9), portrait (9:16) or other.
pub fn classify(width: u32, height: u32) -> Result<AspectRatio, MediaError> {
    if width == 0 || height == 0 {
        return Err(MediaError::InvalidDimensions { width, height });
    }

    let ratio = f64::from(width) / f64::from(height);
    if (ratio - LANDSCAPE).abs() <= RATIO_TOLERANCE {
        Ok(AspectRatio::Landscape)
    } else if (ratio - PORTRAIT).abs() <= RATIO_TOLERANCE {
        Ok(AspectRatio::Portrait)
    } else {
        Ok(AspectRatio::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_landscape_sizes() {
        for (w, h) in [(1280, 720), (1920, 1080), (3840, 2160), (854, 480)] {
            assert_eq!(classify(w, h).unwrap(), AspectRatio::Landscape, "{w}x{h}");
        }
    }

    #[test]
    fn common_portrait_sizes() {
        for (w, h) in [(720, 1280), (1080, 1920), (608, 1080)] {
            assert_eq!(classify(w, h).unwrap(), AspectRatio::Portrait, "{w}x{h}");
        }
    }

    #[test]
    fn everything_else_is_other() {
        for (w, h) in [(640, 480), (1080, 1080), (2560, 1080), (480, 640)] {
            assert_eq!(classify(w, h).unwrap(), AspectRatio::Other, "{w}x{h}");
        }
    }

    #[test]
    fn tolerance_boundary() {
        // 1.7886 is 0.0108 away from 16:9
        assert_eq!(classify(1252, 700).unwrap(), AspectRatio::Other);
        // 1.7829 is 0.0051 away
        assert_eq!(classify(1248, 700).unwrap(), AspectRatio::Landscape);
    }

    #[test]
    fn zero_dimension_rejected() {
        assert!(matches!(
            classify(0, 720),
            Err(MediaError::InvalidDimensions { width: 0, height: 720 })
        ));
        assert!(classify(1280, 0).is_err());
    }
}
