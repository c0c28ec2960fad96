// Library interface, mainly to allow integration tests to work

pub mod api_model;
pub mod command_line_interface;
pub mod configuration;
pub mod constants;
pub mod data_model;
pub mod database_api;
pub mod database_migrate_refinery;
pub mod database_pool;
pub mod error;
pub mod file_api;
pub mod internal_api;
pub mod warp_api;
pub mod warp_endpoints;
