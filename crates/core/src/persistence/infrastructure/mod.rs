pub mod json_file_store;
pub mod json_input_loader;
pub mod mirrored_json_writer;
