use crate::bbox::BoundingBox;

/// Row-major grayscale image storage
#[derive(Clone, Debug)]
pub struct Image {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl Image {
    /// Create an empty image
    pub fn empty() -> Image {
        Image {
            data: vec![],
            width: 0,
            height: 0,
        }
    }

    pub fn zeros(width: usize, height: usize) -> Image {
        Image {
            data: vec![0; width * height],
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline(always)]
    pub fn value(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Copy out the region covered by `bbox`, clamped to the image bounds.
    /// Returns an empty image when the clamped region has no pixels.
    pub fn crop(&self, bbox: &BoundingBox) -> Image {
        let x1 = (bbox.x_1.max(0.0) as usize).min(self.width);
        let y1 = (bbox.y_1.max(0.0) as usize).min(self.height);
        let x2 = (bbox.x_2.max(0.0) as usize).min(self.width);
        let y2 = (bbox.y_2.max(0.0) as usize).min(self.height);
        if x2 <= x1 || y2 <= y1 {
            return Image::empty();
        }

        let width = x2 - x1;
        let height = y2 - y1;
        let mut data = Vec::with_capacity(width * height);
        for y in y1..y2 {
            let row = y * self.width;
            data.extend_from_slice(&self.data[row + x1..row + x2]);
        }
        Image {
            data,
            width,
            height,
        }
    }
}
