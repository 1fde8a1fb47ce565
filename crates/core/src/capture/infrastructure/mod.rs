pub mod http_snapshot_source;
pub mod opencv_camera_source;
