pub mod fs;
pub mod validate;
