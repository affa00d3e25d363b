pub mod lifecycle;
pub mod model;

pub use model::*;
