//! Data models for the application
//!
//! Records owned by the record store and the value types the upload pipeline
//! derives from uploaded content.

mod media;
mod video;

pub use media::*;
pub use video::*;
