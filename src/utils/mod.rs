pub mod signal;
pub mod youtube;
