pub mod checkpoint_record;
pub mod checkpoint_writer;
pub mod document_writer;
pub mod output_layout;
pub mod record_store;
