pub mod account_service;
pub mod account_service_impl;
pub mod mailer;
pub mod report_service;
pub mod report_service_impl;
pub mod templates;
pub mod token;

pub use account_service::{AccountError, AccountService, AddUser, Signin, Signup};
pub use account_service_impl::SeaOrmAccountService;
pub use mailer::Mailer;
pub use report_service::{ReportError, ReportService, StatusAction};
pub use report_service_impl::SeaOrmReportService;
pub use token::{Claims, TokenError, TokenService};
