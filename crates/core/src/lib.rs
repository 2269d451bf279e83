//! Cast indexing for episodic video.
//!
//! Reference face images enroll identities into one face collection per
//! series; uploaded episodes are cut at shot boundaries, and every
//! extracted frame is resolved into per-subject appearance records.

pub mod shared {
    pub mod bounding_box;
    pub mod config;
    pub mod constants;
    pub mod error;
    pub mod frame;
    pub mod storage_path;
    pub mod video_metadata;
}

pub mod vision {
    pub mod domain {
        pub mod face_collection_service;
        pub mod frame_analyzer;
        pub mod segment_detector;
        pub mod service_error;
        pub mod vision_types;
    }
    pub mod infrastructure;
}

pub mod storage {
    pub mod domain {
        pub mod object_store;
        pub mod record_store;
        pub mod store_error;
    }
    pub mod infrastructure;
}

pub mod identity {
    pub mod domain {
        pub mod identity;
    }
    pub mod identity_collection_manager;
}

pub mod video {
    pub mod domain {
        pub mod frame_encoder;
        pub mod shot_frame_selector;
        pub mod video_reader;
    }
    pub mod infrastructure;
}

pub mod appearance {
    pub mod domain {
        pub mod appearance_record;
        pub mod appearance_resolver;
        pub mod detection;
    }
    pub mod face_identifier;
}

pub mod pipeline {
    pub mod detection_job;
    pub mod extract_frames_use_case;
    pub mod handle_storage_event_use_case;
    pub mod pipeline_launcher;
    pub mod process_frame_use_case;
    pub mod record_job_use_case;
    pub mod start_shot_detection_use_case;
    pub mod storage_event;
    pub mod infrastructure;
}

#[cfg(test)]
mod test_support;
