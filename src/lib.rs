pub mod catalog_source;
pub mod config;
pub mod data_layer_error;
pub mod hash_svc;
pub mod metadata_store;
pub mod record_store;
pub mod sync_service;
pub mod time_provider;
