use serde::{Deserialize, Serialize};

/// Axis-aligned box in normalized image coordinates (0.0-1.0).
///
/// This is the shape the vision service reports for label instances and
/// faces, and the shape persisted on appearance records.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// The same box expressed as edges, used for containment tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxCorners {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn corners(&self) -> BoxCorners {
        BoxCorners {
            left: self.left,
            top: self.top,
            right: self.left + self.width,
            bottom: self.top + self.height,
        }
    }

    /// Pixel rectangle `(x, y, width, height)` of this box inside an image
    /// of the given size.
    ///
    /// Coordinates are clamped to the image and the rectangle is never
    /// smaller than one pixel, so a degenerate box still yields a crop.
    pub fn pixel_rect(&self, image_width: u32, image_height: u32) -> (u32, u32, u32, u32) {
        let iw = image_width as f64;
        let ih = image_height as f64;

        let x1 = (self.left * iw).clamp(0.0, iw) as u32;
        let y1 = (self.top * ih).clamp(0.0, ih) as u32;
        let x2 = ((self.left + self.width) * iw).clamp(0.0, iw) as u32;
        let y2 = ((self.top + self.height) * ih).clamp(0.0, ih) as u32;

        let x = x1.min(image_width.saturating_sub(1));
        let y = y1.min(image_height.saturating_sub(1));
        let w = x2.saturating_sub(x).max(1);
        let h = y2.saturating_sub(y).max(1);
        (x, y, w, h)
    }
}

impl BoxCorners {
    /// True when this box's top-left corner is on or after `outer`'s.
    ///
    /// Only the top-left corner is compared; right and bottom edges are
    /// ignored. Face-to-person attribution relies on exactly this check.
    pub fn top_left_within(&self, outer: &BoxCorners) -> bool {
        self.left >= outer.left && self.top >= outer.top
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_corners_add_extent_to_origin() {
        let c = BoundingBox::new(0.1, 0.2, 0.3, 0.4).corners();
        assert_relative_eq!(c.left, 0.1);
        assert_relative_eq!(c.top, 0.2);
        assert_relative_eq!(c.right, 0.4, epsilon = 1e-12);
        assert_relative_eq!(c.bottom, 0.6, epsilon = 1e-12);
    }

    #[rstest]
    #[case::inside(0.3, 0.3, true)]
    #[case::same_corner(0.2, 0.2, true)]
    #[case::left_of(0.1, 0.3, false)]
    #[case::above(0.3, 0.1, false)]
    // Far outside the right edge still counts; only the corner is checked.
    #[case::beyond_right_edge(0.95, 0.95, true)]
    fn test_top_left_within(#[case] left: f64, #[case] top: f64, #[case] expected: bool) {
        let person = BoundingBox::new(0.2, 0.2, 0.3, 0.3).corners();
        let face = BoundingBox::new(left, top, 0.01, 0.01).corners();
        assert_eq!(face.top_left_within(&person), expected);
    }

    #[test]
    fn test_pixel_rect_scales_to_image() {
        let b = BoundingBox::new(0.25, 0.5, 0.5, 0.25);
        assert_eq!(b.pixel_rect(200, 100), (50, 50, 100, 25));
    }

    #[test]
    fn test_pixel_rect_clamps_outside_image() {
        let b = BoundingBox::new(-0.1, 0.9, 0.5, 0.5);
        assert_eq!(b.pixel_rect(100, 100), (0, 90, 40, 10));
    }

    #[test]
    fn test_pixel_rect_never_empty() {
        let b = BoundingBox::new(0.5, 0.5, 0.0, 0.0);
        let (_, _, w, h) = b.pixel_rect(100, 100);
        assert_eq!((w, h), (1, 1));
    }

    #[test]
    fn test_serializes_with_lowercase_fields() {
        let json = serde_json::to_value(BoundingBox::new(0.1, 0.2, 0.3, 0.4)).unwrap();
        assert_eq!(json["left"], 0.1);
        assert_eq!(json["height"], 0.4);
    }
}
