mod service;

pub use service::{AdminOrderRow, AdminService, AdminStats, AdminUserRow};
