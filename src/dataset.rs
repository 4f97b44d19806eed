use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context as AnyhowContext, Result};
use serde::Deserialize;

use crate::bbox::BoundingBox;

/// One recorded frame: a capture time and the detector output for it.
#[derive(Debug)]
pub struct FrameRecord {
    pub time: f64,
    pub rects: Vec<BoundingBox>,
}

#[derive(Deserialize)]
struct RawRecord {
    time: f64,
    rects: Vec<[f64; 4]>,
}

fn parse_line(line: &str) -> Result<FrameRecord> {
    let raw: RawRecord = serde_json::from_str(line)
        .context(format!("JSON deserialization failed for line: {}", line))?;
    Ok(FrameRecord {
        time: raw.time,
        rects: raw
            .rects
            .iter()
            .map(|r| BoundingBox::new(r[0], r[1], r[2], r[3]))
            .collect(),
    })
}

/// Load a JSONL replay file, one frame per line:
/// `{"time": 3.2, "rects": [[x1,y1,x2,y2], ...]}`.
/// Frames must be in non-decreasing time order.
pub fn load(path: &Path) -> Result<Vec<FrameRecord>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let mut frames: Vec<FrameRecord> = vec![];
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = parse_line(&line)?;
        if let Some(previous) = frames.last() {
            if record.time < previous.time {
                bail!("frames out of order at time {}", record.time);
            }
        }
        frames.push(record);
    }
    Ok(frames)
}
