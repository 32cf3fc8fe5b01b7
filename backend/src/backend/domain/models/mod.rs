pub mod catalog;
pub mod subscription;

pub use catalog::*;
pub use subscription::*;
