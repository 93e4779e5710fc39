pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult};
pub use auth_service_impl::SeaOrmAuthService;

pub mod request_service;
pub mod request_service_impl;
pub use request_service::{CreateRequestInput, RequestError, RequestService};
pub use request_service_impl::SeaOrmRequestService;

pub mod master_data_service;
pub mod master_data_service_impl;
pub use master_data_service::{MasterDataError, MasterDataService};
pub use master_data_service_impl::SeaOrmMasterDataService;

pub mod analytics_service;
pub mod analytics_service_impl;
pub use analytics_service::{
    AnalyticsError, AnalyticsService, DateRange, DepartmentCount, Stats, StatusCount, TrendPoint,
};
pub use analytics_service_impl::SeaOrmAnalyticsService;
