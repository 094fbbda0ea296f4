use crate::camera::Frame;

use super::{DecodeEngine, DecodeRequest, RawDecode, Symbology};

const ENABLE_LOGS: bool = false;

use crate::log_debug;

/// QR decoding on the CPU through `rqrr`.
///
/// Only QR symbols are recognized; requests whose allow-list excludes QR
/// always miss.
#[derive(Debug, Default, Clone, Copy)]
pub struct QrEngine;

impl QrEngine {
    pub fn new() -> Self {
        Self
    }
}

impl DecodeEngine for QrEngine {
    fn decode(&self, frame: &Frame, request: &DecodeRequest) -> Option<RawDecode> {
        if !request.accepts(Symbology::QrCode) {
            return None;
        }

        let image = request.region(frame);

        let (width, height) = image.dimensions();
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
                image.get_pixel(x as u32, y as u32).0[0]
            });
        let grids = prepared.detect_grids();
        log_debug!("found {} potential QR grids", grids.len());

        for grid in grids {
            match grid.decode() {
                Ok((_, content)) => return Some(RawDecode::new(content, Some(Symbology::QrCode))),
                Err(err) => log_debug!("grid decode failed: {err:?}"),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::DEFAULT_SYMBOLOGIES;

    #[test]
    fn blank_frames_miss() {
        let request = DecodeRequest {
            roi: None,
            symbologies: DEFAULT_SYMBOLOGIES.to_vec(),
        };
        assert!(QrEngine::new().decode(&Frame::blank(64, 48), &request).is_none());
    }

    #[test]
    fn qr_outside_allow_list_is_skipped() {
        let request = DecodeRequest {
            roi: None,
            symbologies: vec![Symbology::Code128],
        };
        assert!(QrEngine::new().decode(&Frame::blank(64, 48), &request).is_none());
    }
}
