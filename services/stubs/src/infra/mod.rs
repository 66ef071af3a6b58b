pub mod codec;
pub mod memory;
