pub mod report;
pub mod upload;
pub mod user;
