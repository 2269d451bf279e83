pub mod ffmpeg_reader;
pub mod jpeg_frame_encoder;
