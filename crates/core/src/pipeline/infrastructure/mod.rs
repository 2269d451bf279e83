pub mod video_pipeline;
