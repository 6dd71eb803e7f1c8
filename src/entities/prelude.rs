pub use super::reports::Entity as Reports;
pub use super::uploads::Entity as Uploads;
pub use super::users::Entity as Users;
