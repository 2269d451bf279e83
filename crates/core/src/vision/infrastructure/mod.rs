pub mod http_vision_client;
pub mod wire;
