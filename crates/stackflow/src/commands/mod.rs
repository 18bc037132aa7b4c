pub mod plan;
pub mod resolve;
pub mod validate;
