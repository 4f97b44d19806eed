use std::collections::BTreeMap;

use tracing::debug;

use crate::bbox::BoundingBox;
use crate::my_types::*;

/// One currently-visible visitor.
#[derive(Clone, Debug)]
pub struct TrackedIdentity {
    pub centroid: Vector2d,
    pub bbox: BoundingBox,
    /// Consecutive frames since the last successful match.
    pub disappeared: u32,
    pub created_at: f64,
}

/// Greedy nearest-centroid assignment between existing identities (rows)
/// and incoming detections (columns).
#[derive(Debug, Default, PartialEq)]
pub struct Assignment {
    /// (row, column) pairs, each side claimed at most once.
    pub matches: Vec<(usize, usize)>,
    pub unmatched_rows: Vec<usize>,
    pub unmatched_cols: Vec<usize>,
}

/// Rows are visited in order of their minimum distance to any column, and
/// each row proposes only its single nearest column. A row whose nearest
/// column was already claimed stays unmatched, so the total assignment
/// distance is not globally minimal. Ties resolve by row index, which makes
/// repeated calls on identical input deterministic.
pub fn assign_by_centroid(existing: &[Vector2d], incoming: &[Vector2d]) -> Assignment {
    if existing.is_empty() || incoming.is_empty() {
        return Assignment {
            matches: vec![],
            unmatched_rows: (0..existing.len()).collect(),
            unmatched_cols: (0..incoming.len()).collect(),
        };
    }

    let mut distances = Matrixd::zeros(existing.len(), incoming.len());
    for (row, a) in existing.iter().enumerate() {
        for (col, b) in incoming.iter().enumerate() {
            distances[(row, col)] = (a - b).norm();
        }
    }

    // For every row the nearest column and its distance.
    let mut proposals = Vec::with_capacity(existing.len());
    for row in 0..existing.len() {
        let (col, dist) = (0..incoming.len())
            .map(|col| (col, distances[(row, col)]))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        proposals.push((dist, row, col));
    }
    proposals.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut used_rows = vec![false; existing.len()];
    let mut used_cols = vec![false; incoming.len()];
    let mut matches = vec![];
    for (_, row, col) in proposals {
        if used_rows[row] || used_cols[col] {
            continue;
        }
        used_rows[row] = true;
        used_cols[col] = true;
        matches.push((row, col));
    }

    Assignment {
        matches,
        unmatched_rows: (0..existing.len()).filter(|&r| !used_rows[r]).collect(),
        unmatched_cols: (0..incoming.len()).filter(|&c| !used_cols[c]).collect(),
    }
}

/// Tracks anonymous visitors across frames by centroid proximity.
///
/// Iteration over the active set follows id order, which equals creation
/// order because ids are assigned monotonically and never reused.
pub struct CentroidTracker {
    identities: BTreeMap<ObjectId, TrackedIdentity>,
    next_id: u64,
    max_disappeared: u32,
}

impl CentroidTracker {
    pub fn new(max_disappeared: u32) -> Self {
        Self {
            identities: BTreeMap::new(),
            next_id: 0,
            max_disappeared,
        }
    }

    pub fn identities(&self) -> &BTreeMap<ObjectId, TrackedIdentity> {
        &self.identities
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    fn register(&mut self, bbox: BoundingBox, now: f64) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.identities.insert(
            id,
            TrackedIdentity {
                centroid: bbox.centroid(),
                bbox,
                disappeared: 0,
                created_at: now,
            },
        );
        debug!("registered identity {}", id);
        id
    }

    fn deregister(&mut self, id: ObjectId) {
        self.identities.remove(&id);
        debug!("deregistered identity {}", id);
    }

    /// Advance one frame. Returns the ids deregistered during this call;
    /// every identity still in the active set has
    /// `disappeared <= max_disappeared`.
    pub fn update(&mut self, rects: &[BoundingBox], now: f64) -> Vec<ObjectId> {
        let mut removed = vec![];

        if rects.is_empty() {
            let ids: Vec<ObjectId> = self.identities.keys().copied().collect();
            for id in ids {
                let identity = self.identities.get_mut(&id).unwrap();
                identity.disappeared += 1;
                if identity.disappeared > self.max_disappeared {
                    self.deregister(id);
                    removed.push(id);
                }
            }
            return removed;
        }

        if self.identities.is_empty() {
            for rect in rects {
                self.register(*rect, now);
            }
            return removed;
        }

        let ids: Vec<ObjectId> = self.identities.keys().copied().collect();
        let existing: Vec<Vector2d> = ids.iter().map(|id| self.identities[id].centroid).collect();
        let incoming: Vec<Vector2d> = rects.iter().map(|r| r.centroid()).collect();
        let assignment = assign_by_centroid(&existing, &incoming);

        for (row, col) in assignment.matches {
            let identity = self.identities.get_mut(&ids[row]).unwrap();
            identity.centroid = incoming[col];
            identity.bbox = rects[col];
            identity.disappeared = 0;
        }

        for row in assignment.unmatched_rows {
            let id = ids[row];
            let identity = self.identities.get_mut(&id).unwrap();
            identity.disappeared += 1;
            if identity.disappeared > self.max_disappeared {
                self.deregister(id);
                removed.push(id);
            }
        }

        // Unmatched detections count as new arrivals only when detections
        // outnumber the identities that entered this frame.
        if ids.len() < rects.len() {
            for col in assignment.unmatched_cols {
                self.register(rects[col], now);
            }
        }

        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f64, y: f64) -> BoundingBox {
        BoundingBox::new(x, y, x + 20.0, y + 20.0)
    }

    #[test]
    fn test_empty_update_is_noop() {
        let mut tracker = CentroidTracker::new(30);
        let removed = tracker.update(&[], 0.0);

        assert!(removed.is_empty());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_registration_order_matches_input_order() {
        let mut tracker = CentroidTracker::new(30);
        tracker.update(&[rect(0.0, 0.0), rect(100.0, 0.0)], 0.0);

        let ids: Vec<ObjectId> = tracker.identities().keys().copied().collect();
        assert_eq!(ids, vec![ObjectId(0), ObjectId(1)]);
        assert_eq!(
            tracker.identities()[&ObjectId(0)].centroid,
            Vector2d::new(10.0, 10.0)
        );
        assert_eq!(
            tracker.identities()[&ObjectId(1)].centroid,
            Vector2d::new(110.0, 10.0)
        );
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut tracker = CentroidTracker::new(0);
        tracker.update(&[rect(0.0, 0.0)], 0.0);
        // One empty frame exceeds max_disappeared = 0.
        let removed = tracker.update(&[], 1.0);
        assert_eq!(removed, vec![ObjectId(0)]);

        tracker.update(&[rect(0.0, 0.0)], 2.0);
        let ids: Vec<ObjectId> = tracker.identities().keys().copied().collect();
        assert_eq!(ids, vec![ObjectId(1)]);
    }

    #[test]
    fn test_disappearance_bound_is_inclusive() {
        let max_disappeared = 3;
        let mut tracker = CentroidTracker::new(max_disappeared);
        tracker.update(&[rect(0.0, 0.0)], 0.0);

        for frame in 0..max_disappeared {
            let removed = tracker.update(&[], 1.0 + frame as f64);
            assert!(removed.is_empty());
            assert_eq!(tracker.identities().len(), 1);
        }

        let removed = tracker.update(&[], 10.0);
        assert_eq!(removed, vec![ObjectId(0)]);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_match_follows_moving_centroid() {
        let mut tracker = CentroidTracker::new(30);
        tracker.update(&[rect(10.0, 10.0)], 0.0);
        tracker.update(&[rect(14.0, 10.0)], 1.0);
        tracker.update(&[rect(18.0, 11.0)], 2.0);

        let ids: Vec<ObjectId> = tracker.identities().keys().copied().collect();
        assert_eq!(ids, vec![ObjectId(0)]);
        let identity = &tracker.identities()[&ObjectId(0)];
        assert_eq!(identity.disappeared, 0);
        assert_eq!(identity.bbox, rect(18.0, 11.0));
    }

    #[test]
    fn test_no_new_ids_when_identities_outnumber_detections() {
        let mut tracker = CentroidTracker::new(30);
        tracker.update(&[rect(0.0, 0.0), rect(200.0, 0.0)], 0.0);

        // Both identities propose the single detection; the nearer one wins,
        // the other only ages.
        let removed = tracker.update(&[rect(4.0, 0.0)], 1.0);
        assert!(removed.is_empty());
        assert_eq!(tracker.identities().len(), 2);
        assert_eq!(tracker.identities()[&ObjectId(0)].disappeared, 0);
        assert_eq!(tracker.identities()[&ObjectId(1)].disappeared, 1);
    }

    #[test]
    fn test_extra_detections_register_as_new_arrivals() {
        let mut tracker = CentroidTracker::new(30);
        tracker.update(&[rect(0.0, 0.0)], 0.0);

        let removed = tracker.update(&[rect(2.0, 0.0), rect(300.0, 300.0)], 1.0);
        assert!(removed.is_empty());
        let ids: Vec<ObjectId> = tracker.identities().keys().copied().collect();
        assert_eq!(ids, vec![ObjectId(0), ObjectId(1)]);
        assert_eq!(
            tracker.identities()[&ObjectId(1)].centroid,
            Vector2d::new(310.0, 310.0)
        );
    }

    #[test]
    fn test_assignment_is_deterministic() {
        let existing = vec![
            Vector2d::new(0.0, 0.0),
            Vector2d::new(10.0, 0.0),
            Vector2d::new(20.0, 0.0),
        ];
        let incoming = vec![Vector2d::new(5.0, 0.0), Vector2d::new(15.0, 0.0)];

        let first = assign_by_centroid(&existing, &incoming);
        for _ in 0..10 {
            assert_eq!(assign_by_centroid(&existing, &incoming), first);
        }
    }

    #[test]
    fn test_assignment_row_with_claimed_column_stays_unmatched() {
        // Both rows are nearest to column 0; row 0 is closer and claims it.
        // Row 1 does not fall back to column 1.
        let existing = vec![Vector2d::new(0.0, 0.0), Vector2d::new(2.0, 0.0)];
        let incoming = vec![Vector2d::new(1.0, 0.0), Vector2d::new(100.0, 0.0)];

        let assignment = assign_by_centroid(&existing, &incoming);
        assert_eq!(assignment.matches, vec![(0, 0)]);
        assert_eq!(assignment.unmatched_rows, vec![1]);
        assert_eq!(assignment.unmatched_cols, vec![1]);
    }

    #[test]
    fn test_assignment_distance_ties_resolve_by_row_index() {
        // Rows equidistant from the single column.
        let existing = vec![Vector2d::new(-1.0, 0.0), Vector2d::new(1.0, 0.0)];
        let incoming = vec![Vector2d::new(0.0, 0.0)];

        let assignment = assign_by_centroid(&existing, &incoming);
        assert_eq!(assignment.matches, vec![(0, 0)]);
        assert_eq!(assignment.unmatched_rows, vec![1]);
    }
}
