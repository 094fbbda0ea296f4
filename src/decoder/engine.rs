use image::GrayImage;

use crate::camera::Frame;

use super::{RegionOfInterest, Symbology};

/// One successful decode as reported by an engine, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDecode {
    pub text: String,
    pub symbology: Option<Symbology>,
}

impl RawDecode {
    pub fn new(text: impl Into<String>, symbology: Option<Symbology>) -> Self {
        Self {
            text: text.into(),
            symbology,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodeRequest {
    pub roi: Option<RegionOfInterest>,
    pub symbologies: Vec<Symbology>,
}

impl DecodeRequest {
    pub fn accepts(&self, symbology: Symbology) -> bool {
        self.symbologies.contains(&symbology)
    }

    /// Pixels the engine should look at: the centered ROI, or the whole frame.
    pub fn region(&self, frame: &Frame) -> GrayImage {
        match self.roi {
            Some(roi) => frame.center_crop(roi.width, roi.height),
            None => frame.clone().into_gray_image(),
        }
    }
}

/// A per-frame barcode decoder.
///
/// `None` is a miss. Misses are expected on most frames and are never
/// treated as errors; engines should log their own internal failures and
/// return `None`.
pub trait DecodeEngine: Send + Sync + 'static {
    fn decode(&self, frame: &Frame, request: &DecodeRequest) -> Option<RawDecode>;
}
