pub mod opencv_window_display;
