pub mod chain;
pub mod registry;
