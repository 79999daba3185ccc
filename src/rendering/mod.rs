mod renderer;
mod surface;

pub use renderer::{filter_quality, Renderer};
pub use surface::{DrawState, Surface, SurfaceLimits};
pub(crate) use surface::{InUseIds, Lease};
