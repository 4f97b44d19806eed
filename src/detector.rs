use std::collections::VecDeque;

use anyhow::Result;

use crate::bbox::BoundingBox;
use crate::image::Image;

/// External face-region detector contract. Boxes come back in arbitrary
/// order and the list may be empty.
pub trait FaceDetector {
    fn detect(&mut self, frame: &Image) -> Result<Vec<BoundingBox>>;
}

/// Replays pre-recorded detections, standing in for the camera-facing
/// detector during offline runs. Ignores the frame contents and yields the
/// next recorded box list per call, then empty lists once exhausted.
pub struct ReplayDetector {
    pending: VecDeque<Vec<BoundingBox>>,
}

impl ReplayDetector {
    pub fn new(frames: Vec<Vec<BoundingBox>>) -> Self {
        Self {
            pending: frames.into(),
        }
    }
}

impl FaceDetector for ReplayDetector {
    fn detect(&mut self, _frame: &Image) -> Result<Vec<BoundingBox>> {
        Ok(self.pending.pop_front().unwrap_or_default())
    }
}
