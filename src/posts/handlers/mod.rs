// src/posts/handlers/mod.rs

mod categories;
mod posts;
mod tags;

pub use categories::*;
pub use posts::*;
pub use tags::*;
