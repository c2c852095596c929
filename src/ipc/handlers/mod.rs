pub mod backup_exchange;
pub mod core;
pub mod dashboard;
pub mod grading;
pub mod navigation;
pub mod reports;
pub mod session;
pub mod students;
