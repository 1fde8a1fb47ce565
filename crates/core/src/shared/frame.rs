use image::RgbImage;
use ndarray::{s, ArrayView3};

use super::region::Region;

/// A single camera frame: contiguous RGB bytes in row-major order.
///
/// Pixel format conversion (BGR from capture devices, encoded JPEG from
/// snapshot endpoints) happens at the source adapters only; the pipeline
/// always sees RGB or single-channel luminance.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// Wraps a decoded RGB image as frame `index`.
    pub fn from_rgb_image(image: RgbImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, 3, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies the part of `region` that lies inside the frame.
    ///
    /// Returns `None` when the region does not intersect the frame at all.
    /// The crop keeps this frame's index.
    pub fn crop(&self, region: &Region) -> Option<Frame> {
        let clamped = region.clamp_to(self.width, self.height)?;
        let x0 = clamped.x as usize;
        let y0 = clamped.y as usize;
        let x1 = x0 + clamped.width as usize;
        let y1 = y0 + clamped.height as usize;

        let view = self.as_ndarray();
        let data: Vec<u8> = view.slice(s![y0..y1, x0..x1, ..]).iter().copied().collect();
        Some(Frame::new(
            data,
            clamped.width as u32,
            clamped.height as u32,
            self.channels,
            self.index,
        ))
    }

    /// Single-channel luminance (ITU-R BT.601 weights).
    pub fn to_luma(&self) -> Frame {
        if self.channels == 1 {
            return self.clone();
        }
        let channels = self.channels as usize;
        let data = self
            .data
            .chunks_exact(channels)
            .map(|px| luma(px[0], px[1], px[2]))
            .collect();
        Frame::new(data, self.width, self.height, 1, self.index)
    }

    /// Luminance replicated into three channels.
    pub fn luma_as_rgb(&self) -> Frame {
        let gray = self.to_luma();
        let data = gray.data.iter().flat_map(|&v| [v, v, v]).collect();
        Frame::new(data, self.width, self.height, 3, self.index)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
    ((weighted + 500) / 1000) as u8
}
