pub mod hash;
pub mod placeholder;
