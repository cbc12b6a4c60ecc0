pub mod admin;
pub mod cart;
pub mod order;
