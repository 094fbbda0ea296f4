//! Consecutive-read confirmation.
//!
//! A payload is accepted only after [`REQUIRED_READS`] identical reads in a
//! row. A differing read restarts the count at 1 for the new payload, and a
//! confirmation empties the buffer so the next confirmation of the same code
//! needs a full run of reads again. There is no time-based expiry: a stale
//! pending payload simply gets overwritten by the next differing read.

use serde::Serialize;

use crate::decoder::normalize_payload;

pub const REQUIRED_READS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterState {
    Empty,
    Accumulating,
    /// Transient: reported only by the observation that emitted.
    Confirmed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationBuffer {
    pub pending_payload: String,
    pub match_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ConfirmationFilter {
    buffer: ConfirmationBuffer,
}

/// Result of feeding one read into the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Whitespace-only read, buffer untouched.
    Ignored,
    Pending { payload: String, count: u32 },
    Confirmed(String),
}

impl Observation {
    /// Filter state this observation moved into, `None` when ignored.
    pub fn state(&self) -> Option<FilterState> {
        match self {
            Observation::Ignored => None,
            Observation::Pending { .. } => Some(FilterState::Accumulating),
            Observation::Confirmed(_) => Some(FilterState::Confirmed),
        }
    }
}

impl ConfirmationFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &ConfirmationBuffer {
        &self.buffer
    }

    pub fn state(&self) -> FilterState {
        if self.buffer.match_count == 0 {
            FilterState::Empty
        } else {
            FilterState::Accumulating
        }
    }

    /// Feed one read and return the payload if it is now confirmed.
    pub fn observe(&mut self, payload: &str) -> Option<String> {
        match self.observe_detailed(payload) {
            Observation::Confirmed(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn observe_detailed(&mut self, payload: &str) -> Observation {
        let Some(payload) = normalize_payload(payload) else {
            return Observation::Ignored;
        };

        if self.buffer.match_count > 0 && self.buffer.pending_payload == payload {
            self.buffer.match_count += 1;
        } else {
            self.buffer.pending_payload = payload;
            self.buffer.match_count = 1;
        }

        if self.buffer.match_count >= REQUIRED_READS {
            let confirmed = std::mem::take(&mut self.buffer).pending_payload;
            Observation::Confirmed(confirmed)
        } else {
            Observation::Pending {
                payload: self.buffer.pending_payload.clone(),
                count: self.buffer.match_count,
            }
        }
    }

    pub fn reset(&mut self) {
        self.buffer = ConfirmationBuffer::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirmations(reads: &[&str]) -> Vec<String> {
        let mut filter = ConfirmationFilter::new();
        reads
            .iter()
            .filter_map(|read| filter.observe(read))
            .collect()
    }

    #[test]
    fn two_consecutive_reads_confirm() {
        assert_eq!(confirmations(&["A", "A"]), vec!["A"]);
    }

    #[test]
    fn only_the_consecutive_payload_confirms() {
        assert_eq!(confirmations(&["A", "B", "B"]), vec!["B"]);
        assert_eq!(confirmations(&["A", "B", "A", "A"]), vec!["A"]);
        assert!(confirmations(&["A", "B", "A", "B"]).is_empty());
    }

    #[test]
    fn confirmation_is_not_sticky() {
        assert_eq!(confirmations(&["A", "A", "A"]), vec!["A"]);
        assert_eq!(confirmations(&["A", "A", "A", "A"]), vec!["A", "A"]);
    }

    #[test]
    fn whitespace_is_normalized() {
        assert_eq!(
            confirmations(&["  DELL7440F-ABC125  ", "DELL7440F-ABC125"]),
            vec!["DELL7440F-ABC125"]
        );
    }

    #[test]
    fn empty_reads_neither_advance_nor_reset() {
        let mut filter = ConfirmationFilter::new();
        assert_eq!(filter.observe_detailed("   "), Observation::Ignored);
        assert_eq!(filter.state(), FilterState::Empty);

        filter.observe("A");
        assert_eq!(filter.observe_detailed(""), Observation::Ignored);
        assert_eq!(filter.buffer().match_count, 1);
        assert_eq!(filter.observe("A").as_deref(), Some("A"));
    }

    #[test]
    fn reports_states() {
        let mut filter = ConfirmationFilter::new();
        assert_eq!(filter.state(), FilterState::Empty);
        assert_eq!(
            filter.observe_detailed("X"),
            Observation::Pending {
                payload: "X".into(),
                count: 1
            }
        );
        assert_eq!(filter.state(), FilterState::Accumulating);
        let confirmed = filter.observe_detailed("X");
        assert_eq!(confirmed, Observation::Confirmed("X".into()));
        assert_eq!(confirmed.state(), Some(FilterState::Confirmed));
        assert_eq!(filter.state(), FilterState::Empty);
        assert_eq!(filter.buffer(), &ConfirmationBuffer::default());
    }

    #[test]
    fn reset_clears_partial_run() {
        let mut filter = ConfirmationFilter::new();
        filter.observe("A");
        filter.reset();
        assert_eq!(filter.observe("A"), None);
    }
}
