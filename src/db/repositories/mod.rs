pub mod comment;
pub mod laptop;
pub mod user;
