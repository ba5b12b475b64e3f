// Application layer - Use cases around the live-window controller
pub mod dashboard_service;
pub mod live_window;
pub mod poller;
pub mod sensor_repository;
