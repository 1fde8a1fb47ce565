pub const CASCADE_MODEL_NAME: &str = "haarcascade_frontalface_default.xml";
pub const CASCADE_MODEL_URL: &str =
    "https://raw.githubusercontent.com/opencv/opencv/4.x/data/haarcascades/haarcascade_frontalface_default.xml";

pub const EMOTION_MODEL_NAME: &str = "emotion-ferplus-8.onnx";
pub const EMOTION_MODEL_URL: &str =
    "https://github.com/onnx/models/raw/main/validated/vision/body_analysis/emotion_ferplus/model/emotion-ferplus-8.onnx";

/// Default remote device (the access point address of the receiver board).
pub const DEFAULT_ENDPOINT: &str = "192.168.4.1";

/// Default network camera still-image endpoint.
pub const DEFAULT_SNAPSHOT_URL: &str = "http://192.168.4.5/cam-hi.jpg";

pub const DEFAULT_CAMERA_INDEX: i32 = 0;

pub const DEFAULT_SCALE_FACTOR: f64 = 1.1;
pub const DEFAULT_MIN_NEIGHBORS: i32 = 5;
pub const DEFAULT_MIN_FACE_SIZE: i32 = 30;

pub const WINDOW_TITLE: &str = "Real-time Emotion Detection";

/// Key that ends the loop in windowed mode.
pub const QUIT_KEY: char = 'q';

/// Arming square size in pixels (width, height).
pub const ARMING_SQUARE_SIZE: (i32, i32) = (250, 180);
pub const CAMERA_ARMING_SQUARE_ORIGIN: (i32, i32) = (210, 100);
pub const SNAPSHOT_ARMING_SQUARE_ORIGIN: (i32, i32) = (300, 200);
pub const ARMING_SQUARE_CAPTION: &str = "Place your hand here";
