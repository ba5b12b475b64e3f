// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::sensor_repository::SensorRepository;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub repository: Arc<dyn SensorRepository>,
}
