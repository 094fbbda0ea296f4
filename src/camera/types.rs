use serde::{Deserialize, Serialize};

/// A video input device as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraDevice {
    pub id: String,
    pub label: String,
}

impl CameraDevice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FacingMode {
    Environment,
    User,
}

/// Which camera a stream request targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraSelection {
    /// A concrete device picked from enumeration.
    Device(String),
    /// Let the platform choose a camera facing this way.
    Facing(FacingMode),
}

/// How demanding the stream request is.
///
/// `Relaxed` is used for the single automatic retry after an
/// overconstrained failure and carries no constraint beyond the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StreamProfile {
    Preferred,
    Relaxed,
}

impl Default for StreamProfile {
    fn default() -> Self {
        StreamProfile::Preferred
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamRequest {
    pub selection: CameraSelection,
    pub profile: StreamProfile,
    /// Width over height the preferred profile asks for.
    pub aspect_ratio: Option<f32>,
}

pub const PREFERRED_RESOLUTION: (u32, u32) = (1280, 720);

impl StreamRequest {
    pub fn new(selection: CameraSelection, profile: StreamProfile) -> Self {
        Self {
            selection,
            profile,
            aspect_ratio: None,
        }
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: Option<f32>) -> Self {
        self.aspect_ratio = aspect_ratio.filter(|ratio| ratio.is_finite() && *ratio > 0.0);
        self
    }

    /// Resolution to ask for, `None` means whatever the device defaults to.
    ///
    /// The preferred width is kept and the height follows the aspect ratio.
    pub fn ideal_resolution(&self) -> Option<(u32, u32)> {
        match self.profile {
            StreamProfile::Preferred => {
                let (width, height) = PREFERRED_RESOLUTION;
                let height = self
                    .aspect_ratio
                    .map(|ratio| (width as f32 / ratio).round() as u32)
                    .unwrap_or(height);
                Some((width, height.max(1)))
            }
            StreamProfile::Relaxed => None,
        }
    }
}

/// Characteristics of the live track, read once after acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraCapability {
    pub facing: Option<FacingMode>,
    pub continuous_focus_supported: bool,
    pub continuous_focus_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(profile: StreamProfile) -> StreamRequest {
        StreamRequest::new(CameraSelection::Facing(FacingMode::Environment), profile)
    }

    #[test]
    fn preferred_resolution_follows_aspect_ratio() {
        assert_eq!(
            request(StreamProfile::Preferred).ideal_resolution(),
            Some((1280, 720))
        );
        assert_eq!(
            request(StreamProfile::Preferred)
                .with_aspect_ratio(Some(16.0 / 9.0))
                .ideal_resolution(),
            Some((1280, 720))
        );
        assert_eq!(
            request(StreamProfile::Preferred)
                .with_aspect_ratio(Some(4.0 / 3.0))
                .ideal_resolution(),
            Some((1280, 960))
        );
    }

    #[test]
    fn relaxed_requests_ignore_aspect_ratio() {
        let relaxed = request(StreamProfile::Relaxed).with_aspect_ratio(Some(4.0 / 3.0));
        assert_eq!(relaxed.ideal_resolution(), None);
    }

    #[test]
    fn nonsensical_ratios_are_dropped() {
        let preferred = request(StreamProfile::Preferred).with_aspect_ratio(Some(0.0));
        assert_eq!(preferred.aspect_ratio, None);
        assert_eq!(preferred.ideal_resolution(), Some((1280, 720)));
    }
}
