/// Viola-Jones face locator backed by OpenCV's `CascadeClassifier`.
///
/// Detection runs on the luminance image with fixed [`CascadeParams`];
/// any OpenCV failure is logged and treated as an empty result.
use std::path::{Path, PathBuf};

use opencv::core::{Mat, Rect, Size, Vector};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use thiserror::Error;

use crate::detection::domain::face_locator::{CascadeParams, FaceLocator};
use crate::shared::frame::Frame;
use crate::shared::region::Region;

#[derive(Error, Debug)]
pub enum LocatorInitError {
    #[error("failed to load cascade {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: opencv::Error,
    },
    #[error("cascade {0} contains no stages")]
    Empty(PathBuf),
}

pub struct HaarCascadeLocator {
    classifier: CascadeClassifier,
    params: CascadeParams,
}

// Safety: the classifier is owned by the single pipeline thread and never
// shared; OpenCV only requires that it is not used concurrently.
unsafe impl Send for HaarCascadeLocator {}

impl HaarCascadeLocator {
    pub fn new(cascade_path: &Path, params: CascadeParams) -> Result<Self, LocatorInitError> {
        let load_error = |source| LocatorInitError::Load {
            path: cascade_path.to_path_buf(),
            source,
        };
        let classifier =
            CascadeClassifier::new(&cascade_path.to_string_lossy()).map_err(load_error)?;
        if classifier.empty().map_err(load_error)? {
            return Err(LocatorInitError::Empty(cascade_path.to_path_buf()));
        }
        Ok(Self { classifier, params })
    }

    fn detect(&mut self, frame: &Frame) -> opencv::Result<Vec<Region>> {
        let gray = luma_mat(frame)?;
        let min = self.params.min_size;
        let mut faces = Vector::<Rect>::new();
        self.classifier.detect_multi_scale(
            &gray,
            &mut faces,
            self.params.scale_factor,
            self.params.min_neighbors,
            0,
            Size::new(min, min),
            Size::new(0, 0),
        )?;
        Ok(to_regions(&faces))
    }
}

impl FaceLocator for HaarCascadeLocator {
    fn locate(&mut self, frame: &Frame) -> Vec<Region> {
        if frame.is_empty() {
            return Vec::new();
        }
        match self.detect(frame) {
            Ok(regions) => regions,
            Err(e) => {
                log::warn!("Face location failed on frame {}: {e}", frame.index());
                Vec::new()
            }
        }
    }
}

/// Single-channel 8-bit `Mat` holding the frame's luminance.
fn luma_mat(frame: &Frame) -> opencv::Result<Mat> {
    let gray = frame.to_luma();
    let view = Mat::new_rows_cols_with_data(gray.height() as i32, gray.width() as i32, gray.data())?;
    view.try_clone()
}

fn to_regions(rects: &Vector<Rect>) -> Vec<Region> {
    rects
        .iter()
        .map(|r| Region::new(r.x, r.y, r.width, r.height))
        .collect()
}
