pub mod json_record_store;
pub mod local_object_store;
