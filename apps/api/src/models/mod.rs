pub mod resume;
pub mod seed;
