pub mod air_client;
pub mod api_server;
pub mod poll_driver;
pub mod session_tracker;
