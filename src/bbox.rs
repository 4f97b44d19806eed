use crate::my_types::*;

/// Axis-aligned face box in pixel coordinates.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct BoundingBox {
    pub x_1: f64,
    pub y_1: f64,
    pub x_2: f64,
    pub y_2: f64,
}

impl BoundingBox {
    pub fn new(x_1: f64, y_1: f64, x_2: f64, y_2: f64) -> Self {
        if x_1 > x_2 || y_1 > y_2 {
            return BoundingBox {
                x_1: 0.0,
                y_1: 0.0,
                x_2: 0.0,
                y_2: 0.0,
            };
        }
        BoundingBox { x_1, y_1, x_2, y_2 }
    }

    /// Geometric center, the only feature used for frame-to-frame matching.
    pub fn centroid(&self) -> Vector2d {
        Vector2d::new((self.x_1 + self.x_2) / 2.0, (self.y_1 + self.y_2) / 2.0)
    }

    pub fn width(&self) -> f64 {
        (self.x_2 - self.x_1).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.y_2 - self.y_1).max(0.0)
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.area() == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_new_bbox_returns_zero_bbox() {
        let bbox = BoundingBox::new(3.0, 4.0, 2.0, 5.0);

        assert_eq!(bbox.x_1, 0.0);
        assert_eq!(bbox.y_1, 0.0);
        assert_eq!(bbox.x_2, 0.0);
        assert_eq!(bbox.y_2, 0.0);
        assert!(bbox.is_empty());
    }

    #[test]
    fn test_centroid_is_box_center() {
        let bbox = BoundingBox::new(10.0, 10.0, 30.0, 30.0);
        let c = bbox.centroid();

        assert_eq!(c, Vector2d::new(20.0, 20.0));
    }

    #[test]
    fn test_area_and_empty() {
        let bbox = BoundingBox::new(0.0, 0.0, 4.0, 2.0);
        assert_eq!(bbox.area(), 8.0);
        assert!(!bbox.is_empty());

        let degenerate = BoundingBox::new(5.0, 5.0, 5.0, 9.0);
        assert!(degenerate.is_empty());
    }
}
