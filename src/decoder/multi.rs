use std::sync::Arc;

use rxing::BarcodeFormat;

use crate::camera::Frame;

use super::{DecodeEngine, DecodeRequest, RawDecode, Symbology};

const ENABLE_LOGS: bool = false;

use crate::log_debug;

fn symbology_of(format: &BarcodeFormat) -> Option<Symbology> {
    match format {
        BarcodeFormat::CODE_128 => Some(Symbology::Code128),
        BarcodeFormat::CODE_39 => Some(Symbology::Code39),
        BarcodeFormat::CODE_93 => Some(Symbology::Code93),
        BarcodeFormat::EAN_13 => Some(Symbology::Ean13),
        BarcodeFormat::EAN_8 => Some(Symbology::Ean8),
        BarcodeFormat::UPC_A => Some(Symbology::UpcA),
        BarcodeFormat::UPC_E => Some(Symbology::UpcE),
        BarcodeFormat::ITF => Some(Symbology::Itf),
        BarcodeFormat::QR_CODE => Some(Symbology::QrCode),
        BarcodeFormat::DATA_MATRIX => Some(Symbology::DataMatrix),
        _ => None,
    }
}

/// Linear and 2D decoding through `rxing`.
///
/// Results in a format outside the request's allow-list are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct MultiFormatEngine;

impl MultiFormatEngine {
    pub fn new() -> Self {
        Self
    }
}

impl DecodeEngine for MultiFormatEngine {
    fn decode(&self, frame: &Frame, request: &DecodeRequest) -> Option<RawDecode> {
        if request.symbologies.is_empty() {
            return None;
        }

        let image = request.region(frame);
        let (width, height) = image.dimensions();
        let result = match rxing::helpers::detect_in_luma(image.into_raw(), width, height, None) {
            Ok(result) => result,
            Err(err) => {
                log_debug!("no barcode in frame: {err:?}");
                return None;
            }
        };

        let symbology = symbology_of(result.getBarcodeFormat())?;
        if !request.accepts(symbology) {
            log_debug!("ignoring {symbology:?} outside the allow-list");
            return None;
        }
        Some(RawDecode::new(result.getText(), Some(symbology)))
    }
}

/// Asks each engine in turn; the first decode wins.
pub struct CompositeEngine {
    engines: Vec<Arc<dyn DecodeEngine>>,
}

impl CompositeEngine {
    pub fn new(engines: Vec<Arc<dyn DecodeEngine>>) -> Self {
        Self { engines }
    }

    /// QR through rqrr first, everything else through rxing.
    pub fn standard() -> Self {
        Self::new(vec![
            Arc::new(super::QrEngine::new()),
            Arc::new(MultiFormatEngine::new()),
        ])
    }
}

impl DecodeEngine for CompositeEngine {
    fn decode(&self, frame: &Frame, request: &DecodeRequest) -> Option<RawDecode> {
        self.engines
            .iter()
            .find_map(|engine| engine.decode(frame, request))
    }
}
