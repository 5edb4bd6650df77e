pub mod camera;
pub mod frame;
pub mod instance;
pub mod raster;
pub mod traits;

// Re-export key types for convenient access
pub use traits::{RenderTier, StaticProbe, SurfaceProbe};
