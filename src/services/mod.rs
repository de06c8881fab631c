pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, ClientInfo, LoginResult, RegisterResult};
pub use auth_service_impl::SeaOrmAuthService;

pub mod dashboard_service;
pub mod dashboard_service_impl;
pub use dashboard_service::{
    DashboardData, DashboardError, DashboardService, NewsItem, PositionRequest,
};
pub use dashboard_service_impl::SeaOrmDashboardService;
