use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Symbology {
    Code128,
    Code39,
    Code93,
    Ean13,
    Ean8,
    UpcA,
    UpcE,
    Itf,
    QrCode,
    DataMatrix,
}

impl Symbology {
    pub fn is_two_dimensional(&self) -> bool {
        matches!(self, Symbology::QrCode | Symbology::DataMatrix)
    }
}

pub const DEFAULT_SYMBOLOGIES: [Symbology; 10] = [
    Symbology::Code128,
    Symbology::Code39,
    Symbology::Code93,
    Symbology::Ean13,
    Symbology::Ean8,
    Symbology::UpcA,
    Symbology::UpcE,
    Symbology::Itf,
    Symbology::QrCode,
    Symbology::DataMatrix,
];

pub const DEFAULT_FPS: u32 = 10;
pub const RELAXED_FPS: u32 = 5;
pub const DEFAULT_ASPECT_RATIO: f32 = 16.0 / 9.0;
/// Share of the viewport's shorter edge covered by the scan box.
pub const ROI_VIEWPORT_SHARE: f32 = 0.7;
pub const MAX_ROI_EDGE: u32 = 400;
pub const MIN_ROI_EDGE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionOfInterest {
    pub width: u32,
    pub height: u32,
}

/// Scan box for a viewport: a share of the shorter edge, capped so it stays
/// usable on large displays. Linear-only allow-lists get a wide box.
pub fn roi_for_viewport(viewport: Viewport, symbologies: &[Symbology]) -> RegionOfInterest {
    let shorter = viewport.width.min(viewport.height) as f32;
    let edge = ((shorter * ROI_VIEWPORT_SHARE).floor() as u32).clamp(MIN_ROI_EDGE, MAX_ROI_EDGE);

    if symbologies.iter().any(Symbology::is_two_dimensional) || symbologies.is_empty() {
        RegionOfInterest {
            width: edge,
            height: edge,
        }
    } else {
        RegionOfInterest {
            width: edge,
            height: (edge / 2).max(MIN_ROI_EDGE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoderConfig {
    pub fps: u32,
    pub roi: Option<RegionOfInterest>,
    /// Requested from the camera with the preferred stream profile.
    pub aspect_ratio: Option<f32>,
    pub symbologies: Vec<Symbology>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            roi: None,
            aspect_ratio: Some(DEFAULT_ASPECT_RATIO),
            symbologies: DEFAULT_SYMBOLOGIES.to_vec(),
        }
    }
}

impl DecoderConfig {
    pub fn for_viewport(viewport: Viewport, symbologies: &[Symbology], fps: u32) -> Self {
        let symbologies = if symbologies.is_empty() {
            DEFAULT_SYMBOLOGIES.to_vec()
        } else {
            symbologies.to_vec()
        };
        Self {
            fps: fps.max(1),
            roi: Some(roi_for_viewport(viewport, &symbologies)),
            aspect_ratio: Some(DEFAULT_ASPECT_RATIO),
            symbologies,
        }
    }

    /// Minimal variant used after an overconstrained failure: lower rate,
    /// whole-frame analysis, no aspect ratio request.
    pub fn relaxed(&self) -> Self {
        Self {
            fps: self.fps.min(RELAXED_FPS).max(1),
            roi: None,
            aspect_ratio: None,
            symbologies: self.symbologies.clone(),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roi_scales_with_viewport() {
        let roi = roi_for_viewport(Viewport::new(360, 640), &DEFAULT_SYMBOLOGIES);
        assert_eq!(roi, RegionOfInterest { width: 252, height: 252 });
    }

    #[test]
    fn roi_is_capped_on_large_displays() {
        let roi = roi_for_viewport(Viewport::new(3840, 2160), &DEFAULT_SYMBOLOGIES);
        assert_eq!(roi.width, MAX_ROI_EDGE);
        assert_eq!(roi.height, MAX_ROI_EDGE);
    }

    #[test]
    fn roi_never_collapses() {
        let roi = roi_for_viewport(Viewport::new(20, 10), &DEFAULT_SYMBOLOGIES);
        assert_eq!(roi.width, MIN_ROI_EDGE);
    }

    #[test]
    fn linear_only_allow_list_gets_wide_box() {
        let roi = roi_for_viewport(
            Viewport::new(800, 600),
            &[Symbology::Code128, Symbology::Ean13],
        );
        assert_eq!(roi, RegionOfInterest { width: 400, height: 200 });
    }

    #[test]
    fn empty_allow_list_means_defaults() {
        let config = DecoderConfig::for_viewport(Viewport::default(), &[], 10);
        assert_eq!(config.symbologies, DEFAULT_SYMBOLOGIES.to_vec());
    }

    #[test]
    fn relaxed_config_drops_constraints() {
        let config = DecoderConfig::for_viewport(Viewport::default(), &[Symbology::QrCode], 15);
        let relaxed = config.relaxed();
        assert_eq!(relaxed.fps, RELAXED_FPS);
        assert!(relaxed.roi.is_none());
        assert!(relaxed.aspect_ratio.is_none());
        assert_eq!(relaxed.symbologies, vec![Symbology::QrCode]);
        assert_eq!(relaxed.frame_interval(), Duration::from_millis(200));
    }
}
