use anyhow::Result;
use chrono::Local;
use tracing::{debug, info, warn};

use crate::bbox::BoundingBox;
use crate::classifier::FaceClassifier;
use crate::config::Config;
use crate::detector::FaceDetector;
use crate::export::SummarySink;
use crate::image::Image;
use crate::metrics::{LiveEstimate, VisitMetrics};
use crate::my_types::ObjectId;
use crate::tracker::CentroidTracker;

/// One visible identity as seen after a frame, for display.
#[derive(Clone, Debug)]
pub struct TrackView {
    pub id: ObjectId,
    pub bbox: BoundingBox,
    pub estimate: Option<LiveEstimate>,
}

impl TrackView {
    pub fn label(&self) -> String {
        match &self.estimate {
            Some(e) => format!("ID:{} {} {} {}", self.id, e.age, e.gender, e.expression),
            None => format!("ID:{} ? ? ?", self.id),
        }
    }
}

#[derive(Debug, Default)]
pub struct FrameReport {
    pub tracks: Vec<TrackView>,
    /// Visit summaries successfully exported during this frame.
    pub exported: usize,
}

/// Per-frame orchestration: detect, track, finalize departures, classify a
/// rotating subset of the visible identities, aggregate.
///
/// Frames are processed strictly one at a time; classification results are
/// recorded within the same frame they were produced in, so a result can
/// never land on an identity that has already been dropped.
pub struct Pipeline<D, C, E> {
    tracker: CentroidTracker,
    metrics: VisitMetrics,
    detector: D,
    classifier: C,
    exporter: E,
    classify_stride: u64,
    frame_counter: u64,
}

impl<D, C, E> Pipeline<D, C, E>
where
    D: FaceDetector,
    C: FaceClassifier,
    E: SummarySink,
{
    pub fn new(detector: D, classifier: C, exporter: E, config: &Config) -> Self {
        Self {
            tracker: CentroidTracker::new(config.max_disappeared),
            metrics: VisitMetrics::new(
                config.window_capacity,
                config.recent_window,
                config.dwell_threshold,
            ),
            detector,
            classifier,
            exporter,
            classify_stride: config.classify_stride.max(1),
            frame_counter: 0,
        }
    }

    pub fn exporter(&self) -> &E {
        &self.exporter
    }

    pub fn process_frame(&mut self, frame: &Image, now: f64) -> Result<FrameReport> {
        let rects = self.detector.detect(frame)?;
        let removed = self.tracker.update(&rects, now);

        let mut report = FrameReport::default();

        // Departures first: read the final summary, then release the window.
        for id in removed {
            if let Some(summary) = self.metrics.final_summary(id) {
                match self.exporter.export(Local::now(), &summary) {
                    Ok(()) => {
                        info!(
                            "visit {} ended: {} {} {} {} after {:.2}s",
                            id,
                            summary.gender,
                            summary.age,
                            summary.expression,
                            summary.result,
                            summary.dwell_seconds
                        );
                        report.exported += 1;
                    }
                    Err(err) => warn!("failed to export visit {}: {:#}", id, err),
                }
            }
            self.metrics.drop_identity(id);
        }

        for (&id, identity) in self.tracker.identities() {
            // Round-robin the slow classifier call over the visible set so
            // per-frame cost stays constant.
            let scheduled = id.0 % self.classify_stride == self.frame_counter % self.classify_stride;
            if scheduled {
                let crop = frame.crop(&identity.bbox);
                if !crop.is_empty() {
                    match self.classifier.classify(&crop) {
                        Ok(attrs) => self.metrics.record_observation(
                            id,
                            &attrs.dominant_expression,
                            attrs.age,
                            &attrs.dominant_gender,
                            now,
                        ),
                        Err(err) => debug!("no observation for {} this frame: {:#}", id, err),
                    }
                }
            }

            report.tracks.push(TrackView {
                id,
                bbox: identity.bbox,
                estimate: self.metrics.current_estimate(id),
            });
        }

        self.frame_counter += 1;
        Ok(report)
    }
}
