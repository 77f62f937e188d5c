//! Data models for paged imagery.

mod image;
mod leaf;
mod manifest;
mod pair;

pub use image::*;
pub use leaf::*;
pub use manifest::*;
pub use pair::*;
