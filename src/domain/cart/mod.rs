mod service;
pub mod view;

pub use service::CartService;
