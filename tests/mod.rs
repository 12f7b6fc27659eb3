pub mod codec;
pub mod context;
pub mod types;
