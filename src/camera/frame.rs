use image::{imageops, GrayImage};

/// One 8-bit luma video frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    luma: Vec<u8>,
}

impl Frame {
    /// Build a frame from a tightly packed luma buffer.
    /// Returns `None` when the buffer length does not match the dimensions.
    pub fn from_luma(width: u32, height: u32, luma: Vec<u8>) -> Option<Self> {
        if luma.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            luma,
        })
    }

    /// Convert an interleaved RGB buffer using Y = 0.299 R + 0.587 G + 0.114 B.
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> Option<Self> {
        if rgb.len() != (width as usize) * (height as usize) * 3 {
            return None;
        }
        let luma = rgb
            .chunks_exact(3)
            .map(|px| ((px[0] as u32 * 299 + px[1] as u32 * 587 + px[2] as u32 * 114) / 1000) as u8)
            .collect();
        Self::from_luma(width, height, luma)
    }

    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            luma: vec![0; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn luma(&self) -> &[u8] {
        &self.luma
    }

    pub fn into_gray_image(self) -> GrayImage {
        // Dimensions are checked on construction.
        GrayImage::from_raw(self.width, self.height, self.luma)
            .unwrap_or_else(|| GrayImage::new(0, 0))
    }

    /// Centered crop of at most `width` x `height`, clamped to the frame.
    pub fn center_crop(&self, width: u32, height: u32) -> GrayImage {
        let w = width.min(self.width);
        let h = height.min(self.height);
        let x = (self.width - w) / 2;
        let y = (self.height - h) / 2;
        let full = self.clone().into_gray_image();
        imageops::crop_imm(&full, x, y, w, h).to_image()
    }
}

impl From<GrayImage> for Frame {
    fn from(image: GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            luma: image.into_raw(),
        }
    }
}
