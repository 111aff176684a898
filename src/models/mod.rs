mod integration;
mod payment;
mod plan;
mod profile;
mod subscription;

pub use integration::*;
pub use payment::*;
pub use plan::*;
pub use profile::*;
pub use subscription::*;
