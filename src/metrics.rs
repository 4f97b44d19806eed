use std::collections::{HashMap, VecDeque};

use crate::my_types::*;

/// One timestamped attribute reading for an identity.
#[derive(Clone, Debug)]
pub struct Observation {
    pub time: f64,
    pub expression: String,
    pub age: u32,
    pub gender: String,
}

/// Running best guess over the most recent observations, for live display.
#[derive(Clone, Debug, PartialEq)]
pub struct LiveEstimate {
    pub age: u32,
    pub gender: String,
    pub expression: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisitResult {
    Stay,
    Pass,
}

impl std::fmt::Display for VisitResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisitResult::Stay => write!(f, "stay"),
            VisitResult::Pass => write!(f, "pass"),
        }
    }
}

/// Final per-visit record, computed over the whole observation window when
/// an identity leaves the frame.
#[derive(Clone, Debug, PartialEq)]
pub struct VisitSummary {
    pub gender: String,
    pub age: u32,
    pub expression: String,
    pub result: VisitResult,
    pub dwell_seconds: f64,
}

/// Maps classifier synonyms onto the two canonical labels. Unrecognized
/// labels are stored verbatim.
pub fn normalize_gender(raw: &str) -> String {
    match raw {
        "Man" | "man" | "male" | "M" => "Male".to_string(),
        "Woman" | "woman" | "female" | "F" => "Female".to_string(),
        _ => raw.to_string(),
    }
}

/// Integer median; an even-length input averages the two middle values and
/// truncates, matching how ages round in the exported records.
fn median_age(ages: &mut Vec<u32>) -> u32 {
    ages.sort_unstable();
    let mid = ages.len() / 2;
    if ages.len() % 2 == 1 {
        ages[mid]
    } else {
        (ages[mid - 1] + ages[mid]) / 2
    }
}

/// Most frequent category; frequency ties resolve to the category seen
/// first, which is deterministic but not otherwise meaningful.
fn most_frequent<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let mut counts: Vec<(&str, usize)> = vec![];
    for item in items {
        match counts.iter_mut().find(|(seen, _)| *seen == item) {
            Some((_, n)) => *n += 1,
            None => counts.push((item, 1)),
        }
    }
    counts
        .into_iter()
        .reduce(|best, cur| if cur.1 > best.1 { cur } else { best })
        .map(|(s, _)| s.to_string())
        .unwrap_or_default()
}

/// Per-identity attribute aggregation over bounded observation windows.
///
/// Windows are created lazily on the first observation and must be dropped
/// explicitly once the tracker reports the identity gone; queries after the
/// drop return `None`.
pub struct VisitMetrics {
    windows: HashMap<ObjectId, VecDeque<Observation>>,
    window_capacity: usize,
    recent_window: usize,
    dwell_threshold: f64,
}

impl VisitMetrics {
    pub fn new(window_capacity: usize, recent_window: usize, dwell_threshold: f64) -> Self {
        Self {
            windows: HashMap::new(),
            window_capacity,
            recent_window,
            dwell_threshold,
        }
    }

    pub fn is_tracked(&self, id: ObjectId) -> bool {
        self.windows.contains_key(&id)
    }

    #[cfg(test)]
    fn window_len(&self, id: ObjectId) -> usize {
        self.windows.get(&id).map_or(0, |w| w.len())
    }

    /// Append one reading, evicting the oldest entry when the window is at
    /// capacity. Always succeeds.
    pub fn record_observation(
        &mut self,
        id: ObjectId,
        expression: &str,
        age: u32,
        gender: &str,
        now: f64,
    ) {
        let window = self.windows.entry(id).or_default();
        if window.len() == self.window_capacity {
            window.pop_front();
        }
        window.push_back(Observation {
            time: now,
            expression: expression.to_string(),
            age,
            gender: normalize_gender(gender),
        });
    }

    /// Best guess from the most recent observations only, or `None` when
    /// nothing has been recorded for the id yet.
    pub fn current_estimate(&self, id: ObjectId) -> Option<LiveEstimate> {
        let window = self.windows.get(&id)?;
        if window.is_empty() {
            return None;
        }
        let start = window.len().saturating_sub(self.recent_window);
        let recent: Vec<&Observation> = window.iter().skip(start).collect();

        let mut ages: Vec<u32> = recent.iter().map(|o| o.age).collect();
        Some(LiveEstimate {
            age: median_age(&mut ages),
            gender: most_frequent(recent.iter().map(|o| o.gender.as_str())),
            expression: most_frequent(recent.iter().map(|o| o.expression.as_str())),
        })
    }

    /// Summary over the entire window, or `None` when the id was never
    /// observed (or already dropped). Does not mutate state.
    pub fn final_summary(&self, id: ObjectId) -> Option<VisitSummary> {
        let window = self.windows.get(&id)?;
        let first = window.front()?;
        let last = window.back()?;

        let dwell_seconds = last.time - first.time;
        let result = if dwell_seconds >= self.dwell_threshold {
            VisitResult::Stay
        } else {
            VisitResult::Pass
        };

        let mut ages: Vec<u32> = window.iter().map(|o| o.age).collect();
        Some(VisitSummary {
            gender: most_frequent(window.iter().map(|o| o.gender.as_str())),
            age: median_age(&mut ages),
            expression: most_frequent(window.iter().map(|o| o.expression.as_str())),
            result,
            dwell_seconds,
        })
    }

    /// Release the window for an id reported gone by the tracker.
    pub fn drop_identity(&mut self, id: ObjectId) {
        self.windows.remove(&id);
    }
}
