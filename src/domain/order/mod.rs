mod service;

pub use service::OrderStatusService;
