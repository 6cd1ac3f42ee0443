pub mod diagnostics;
pub mod recommend;
pub mod spectrum;
