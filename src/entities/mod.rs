pub mod prelude;

pub mod reports;
pub mod uploads;
pub mod users;
