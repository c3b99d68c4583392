pub mod configuration;
pub mod controller;
pub mod error_handling;
pub mod live_detection;
pub mod notification;
pub mod service_client;
pub mod upload_analysis;
