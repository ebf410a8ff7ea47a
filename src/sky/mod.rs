mod format;
mod raster;
mod renderer;
mod view;

pub use format::{decimal_deg, dms_adapt, hms_adapt};
pub use renderer::{SkyLayers, SkyRenderer};
pub use view::SkyView;
