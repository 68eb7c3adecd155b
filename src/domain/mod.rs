pub mod entities;
pub mod errors;
pub mod target;
pub mod value_objects;
