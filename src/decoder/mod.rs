//! Frame decoding: a fixed-rate loop over the live stream that reports every
//! successfully decoded payload, undeduplicated.

pub mod adapter;
pub mod config;
pub mod engine;
pub mod multi;
pub mod qr;
mod worker;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use adapter::FrameDecoder;
pub use config::{
    roi_for_viewport, DecoderConfig, RegionOfInterest, Symbology, Viewport, DEFAULT_FPS,
    DEFAULT_SYMBOLOGIES,
};
pub use engine::{DecodeEngine, DecodeRequest, RawDecode};
pub use multi::{CompositeEngine, MultiFormatEngine};
pub use qr::QrEngine;

/// A single frame's decode result on its way to the confirmation filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRead {
    pub payload: String,
    pub symbology: Option<Symbology>,
    pub timestamp: DateTime<Utc>,
}

impl CandidateRead {
    /// Trim the engine's text; whitespace-only results are dropped.
    pub fn from_raw(raw: RawDecode) -> Option<Self> {
        let payload = normalize_payload(&raw.text)?;
        Some(Self {
            payload,
            symbology: raw.symbology,
            timestamp: Utc::now(),
        })
    }
}

pub fn normalize_payload(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payloads_are_trimmed() {
        assert_eq!(
            normalize_payload("  DELL7440F-ABC125  ").as_deref(),
            Some("DELL7440F-ABC125")
        );
        assert_eq!(normalize_payload("\t\n "), None);
        assert_eq!(normalize_payload(""), None);
    }

    #[test]
    fn candidate_keeps_symbology() {
        let read =
            CandidateRead::from_raw(RawDecode::new(" 4006381333931\n", Some(Symbology::Ean13)))
                .unwrap();
        assert_eq!(read.payload, "4006381333931");
        assert_eq!(read.symbology, Some(Symbology::Ean13));
        assert!(CandidateRead::from_raw(RawDecode::new("  ", None)).is_none());
    }
}
