//! Recognition stats for the current session

use std::collections::BTreeMap;
use std::time::Duration;

use crate::recognizer::FrameReport;
use crate::signs::Label;

#[derive(Clone, Default)]
pub struct FrameStats {
    pub frames: u64,
    pub frames_with_hands: u64,
    pub dropped_predictions: u64,
    pub predictions: BTreeMap<Label, u64>,
    pub commits: BTreeMap<Label, u64>,
    pub timing: Timing,
}

/// Running aggregate of per-frame recognition time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Timing {
    pub count: u64,
    pub total: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl Timing {
    pub fn record(&mut self, elapsed: Duration) {
        if self.count == 0 || elapsed < self.min {
            self.min = elapsed;
        }
        self.max = self.max.max(elapsed);
        self.total += elapsed;
        self.count += 1;
    }

    pub fn avg(&self) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos((self.total.as_nanos() / u128::from(self.count)) as u64)
    }
}

impl FrameStats {
    pub fn record_frame(&mut self, report: &FrameReport) {
        self.frames += 1;
        if report.hands.is_empty() {
            return;
        }
        self.frames_with_hands += 1;
        for prediction in &report.predictions {
            match prediction {
                Some(label) => *self.predictions.entry(*label).or_default() += 1,
                None => self.dropped_predictions += 1,
            }
        }
        self.timing.record(report.elapsed);
    }

    pub fn record_empty_frame(&mut self) {
        self.frames += 1;
    }

    pub fn record_commit(&mut self, label: Label) {
        *self.commits.entry(label).or_default() += 1;
    }

    pub fn total_commits(&self) -> u64 {
        self.commits.values().sum()
    }

    pub fn summary(&self) -> String {
        let mut out = String::new();

        if self.frames > 0 {
            out.push_str(&format!(
                "Frames (n={}): with hands={} ({:.0}%)\n",
                self.frames,
                self.frames_with_hands,
                100.0 * self.frames_with_hands as f64 / self.frames as f64
            ));
        }

        if self.timing.count > 0 {
            let t = &self.timing;
            out.push_str(&format!(
                "Recognition (n={}): avg={}µs min={}µs max={}µs total={:.1}ms\n",
                t.count,
                t.avg().as_micros(),
                t.min.as_micros(),
                t.max.as_micros(),
                t.total.as_secs_f64() * 1000.0
            ));
        }

        if !self.predictions.is_empty() || self.dropped_predictions > 0 {
            out.push_str(&format!(
                "Predictions: {} unrecognized={}\n",
                Self::counts(&self.predictions),
                self.dropped_predictions
            ));
        }

        if !self.commits.is_empty() {
            out.push_str(&format!(
                "Commits (n={}): {}\n",
                self.total_commits(),
                Self::counts(&self.commits)
            ));
        }

        if out.is_empty() {
            out.push_str("No stats recorded yet.\n");
        }
        out
    }

    fn counts(map: &BTreeMap<Label, u64>) -> String {
        map.iter()
            .map(|(label, n)| format!("{}={}", label, n))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
