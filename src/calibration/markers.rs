//! Calibration marker palette
//!
//! The colors are deliberately unusual so that user drawings are unlikely
//! to produce pixels near them. The document preparation step draws each
//! marker at its document coordinate.

use serde::Serialize;

use crate::domain::WorldPoint;

/// Max RGB distance for a pixel to count as a marker pixel
pub const MATCH_DISTANCE: u32 = 40;

/// The three calibration markers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    /// Document (0, 0)
    Origin,
    /// Document (1, 0)
    AxisX,
    /// Document (0, 1)
    AxisY,
}

impl Marker {
    pub const ALL: [Marker; 3] = [Marker::Origin, Marker::AxisX, Marker::AxisY];

    /// Fill color as 8-bit RGB
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Marker::Origin => [253, 17, 251],
            Marker::AxisX => [19, 251, 233],
            Marker::AxisY => [241, 251, 17],
        }
    }

    /// Document coordinate the marker is drawn at
    pub fn position(self) -> WorldPoint {
        match self {
            Marker::Origin => WorldPoint::new(0.0, 0.0),
            Marker::AxisX => WorldPoint::new(1.0, 0.0),
            Marker::AxisY => WorldPoint::new(0.0, 1.0),
        }
    }

    /// Short label used in log lines
    pub fn label(self) -> &'static str {
        match self {
            Marker::Origin => "R",
            Marker::AxisX => "G",
            Marker::AxisY => "B",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::cluster::color_distance_sq;

    #[test]
    fn test_marker_colors_are_mutually_distant() {
        let limit = (2 * MATCH_DISTANCE) * (2 * MATCH_DISTANCE);
        for a in Marker::ALL {
            for b in Marker::ALL {
                if a != b {
                    assert!(color_distance_sq(a.rgb(), b.rgb()) > limit, "{a:?} vs {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_marker_colors_avoid_primaries_and_greys() {
        let common = [
            [0, 0, 0],
            [255, 255, 255],
            [255, 0, 0],
            [0, 255, 0],
            [0, 0, 255],
            [128, 128, 128],
        ];
        for marker in Marker::ALL {
            for c in common {
                assert!(
                    color_distance_sq(marker.rgb(), c) > MATCH_DISTANCE * MATCH_DISTANCE,
                    "{marker:?} collides with {c:?}"
                );
            }
        }
    }
}
