pub mod input;
pub mod model;
