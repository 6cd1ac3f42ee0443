pub mod analysis;
pub mod collector;
pub mod decode;
pub mod dft;
pub mod features;
pub mod snapshot;
