mod surface;

pub use surface::NannouSurface;
