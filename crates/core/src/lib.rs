//! Face emotion → device signal pipeline.
//!
//! Frames are pulled from a [`capture`] source, faces are located by the
//! [`detection`] context, classified by [`classification`], mapped to a
//! numeric code and dispatched by [`signal`]. The [`pipeline`] context drives
//! the loop; [`display`] draws the overlay and polls for an operator stop.

pub mod capture {
    pub mod domain {
        pub mod frame_source;
    }
    pub mod infrastructure;
}

pub mod detection {
    pub mod domain {
        pub mod face_locator;
    }
    pub mod infrastructure;
}

pub mod classification {
    pub mod domain {
        pub mod emotion_classifier;
        pub mod emotion_label;
    }
    pub mod infrastructure;
}

pub mod signal {
    pub mod domain {
        pub mod arming_gate;
        pub mod emotion_mapper;
        pub mod signal_reporter;
    }
    pub mod infrastructure;
}

pub mod display {
    pub mod domain {
        pub mod frame_display;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod emotion_signal_use_case;
    pub mod pipeline_logger;
}

pub mod shared {
    pub mod config;
    pub mod constants;
    pub mod face_report;
    pub mod frame;
    pub mod model_resolver;
    pub mod region;
}
