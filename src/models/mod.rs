pub mod comment;
pub mod laptop;

pub use comment::Comment;
pub use laptop::{Laptop, LaptopFilter, LaptopRecord, Page};
