pub mod guard;
pub mod surface;

pub use guard::{ALLOC_ALIGN, GUARD_PIXELS, GuardRegion, PixelBuffer};
pub use surface::{MaskView, Surface, SurfaceMut};
