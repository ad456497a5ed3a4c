pub use super::comments::Entity as Comments;
pub use super::laptops::Entity as Laptops;
pub use super::users::Entity as Users;
