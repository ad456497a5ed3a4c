pub mod analytics_service;
pub mod analytics_service_impl;
pub use analytics_service::{AnalyticsError, AnalyticsService};
pub use analytics_service_impl::SeaOrmAnalyticsService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, Registration, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod catalog_service;
pub mod catalog_service_impl;
pub use catalog_service::{CatalogError, CatalogService};
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod import_service;
pub mod import_service_impl;
pub use import_service::{BackfillSummary, ImportError, ImportService, ImportSummary};
pub use import_service_impl::SeaOrmImportService;
