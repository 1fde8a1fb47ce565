/// Polls a network camera's still-image endpoint, one GET per frame.
///
/// Every failure (transport, status, decode) is logged and turned into an
/// absent frame so the loop simply tries again next iteration.
use crate::capture::domain::frame_source::{FrameAcquisitionError, FrameSource};
use crate::shared::frame::Frame;

pub struct HttpSnapshotSource {
    client: reqwest::blocking::Client,
    url: String,
    next_index: usize,
}

impl HttpSnapshotSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            url: url.into(),
            next_index: 0,
        }
    }

    /// Fetches and decodes one snapshot.
    pub fn fetch(&mut self) -> Result<Frame, FrameAcquisitionError> {
        let fetch_error = |source| FrameAcquisitionError::Fetch {
            url: self.url.clone(),
            source,
        };
        let response = self.client.get(&self.url).send().map_err(fetch_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FrameAcquisitionError::Status {
                url: self.url.clone(),
                status,
            });
        }
        let body = response.bytes().map_err(fetch_error)?;
        let image = image::load_from_memory(&body)
            .map_err(FrameAcquisitionError::Decode)?
            .to_rgb8();

        let frame = Frame::from_rgb_image(image, self.next_index);
        self.next_index += 1;
        Ok(frame)
    }
}

impl FrameSource for HttpSnapshotSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, FrameAcquisitionError> {
        match self.fetch() {
            Ok(frame) => Ok(Some(frame)),
            Err(e) => {
                log::warn!("Failed to get frame from camera: {e}");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut img = RgbImage::new(width, height);
        img.put_pixel(0, 0, Rgb([200, 10, 20]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_decodes_snapshot_and_numbers_frames() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/cam-hi.jpg");
            then.status(200)
                .header("content-type", "image/png")
                .body(png_bytes(8, 6));
        });

        let mut source = HttpSnapshotSource::new(server.url("/cam-hi.jpg"));
        let first = source.next_frame().unwrap().unwrap();
        let second = source.next_frame().unwrap().unwrap();

        mock.assert_hits(2);
        assert_eq!((first.width(), first.height(), first.channels()), (8, 6, 3));
        assert_eq!(&first.data()[..3], &[200, 10, 20]);
        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);
    }

    #[test]
    fn test_error_status_is_absent() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/cam-hi.jpg");
            then.status(503);
        });

        let mut source = HttpSnapshotSource::new(server.url("/cam-hi.jpg"));
        assert!(matches!(
            source.fetch(),
            Err(FrameAcquisitionError::Status { .. })
        ));
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_undecodable_body_is_absent() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/cam-hi.jpg");
            then.status(200).body("not an image");
        });

        let mut source = HttpSnapshotSource::new(server.url("/cam-hi.jpg"));
        assert!(matches!(
            source.fetch(),
            Err(FrameAcquisitionError::Decode(_))
        ));
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_unreachable_camera_is_absent() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/cam-hi.jpg", listener.local_addr().unwrap());
        drop(listener);

        let mut source = HttpSnapshotSource::new(url);
        assert!(source.next_frame().unwrap().is_none());
    }
}
