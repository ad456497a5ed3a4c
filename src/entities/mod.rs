pub mod prelude;

pub mod comments;
pub mod laptops;
pub mod users;
