use crate::sky::{decimal_deg, dms_adapt, hms_adapt, SkyRenderer, SkyView};

/// Application state
pub struct App {
    pub view: SkyView,
    pub sky_renderer: SkyRenderer,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for cursor readout
    pub mouse_pos: Option<(u16, u16)>,
}

impl App {
    pub fn new(width: usize, height: usize) -> Self {
        let (w, h) = canvas_dots(width, height);
        Self {
            view: SkyView::new(w, h),
            sky_renderer: SkyRenderer::new(),
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
        }
    }

    /// Update view size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (w, h) = canvas_dots(width, height);
        self.view.width = w;
        self.view.height = h;
    }

    /// Back to the initial view, keeping the canvas size and layer settings.
    pub fn reset(&mut self) {
        self.view = SkyView::new(self.view.width, self.view.height);
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.view.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_dots(col, row);
        self.view.zoom_in_at(px, py);
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_dots(col, row);
        self.view.zoom_out_at(px, py);
    }

    pub fn cycle_projection(&mut self) {
        self.view.cycle_projection();
    }

    pub fn cycle_frame(&mut self) {
        self.view.cycle_frame();
    }

    pub fn flip_horizontal(&mut self) {
        self.view.flip_horz = !self.view.flip_horz;
    }

    pub fn flip_vertical(&mut self) {
        self.view.flip_vert = !self.view.flip_vert;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Pan by the distance dragged since the last event
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            // One cell is 2x4 dots
            self.pan(dx * 2, dy * 4);
        }
        self.last_mouse = Some((x, y));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Field of view as a string
    pub fn fov_text(&self) -> String {
        if self.view.fov >= 1.0 {
            format!("{:.1}°", self.view.fov)
        } else {
            format!("{:.2}'", self.view.fov * 60.0)
        }
    }

    /// Longitude and latitude in the conventions of the current frame
    fn coords_text(&self, lon: f64, lat: f64) -> String {
        let (lon, lat) = (lon.to_radians(), lat.to_radians());
        let frame = self.view.frame;
        let lon = if frame.azimuth_from_north() { std::f64::consts::PI - lon } else { lon };
        if self.sky_renderer.settings.decimal_degrees {
            let lon = lon.rem_euclid(std::f64::consts::TAU);
            format!("{} {}", decimal_deg(lon, false), decimal_deg(lat, true))
        } else if frame.uses_hour_angle() {
            format!("{} {}", hms_adapt(lon), dms_adapt(lat, true))
        } else {
            let lon = lon.rem_euclid(std::f64::consts::TAU);
            format!("{} {}", dms_adapt(lon, false), dms_adapt(lat, true))
        }
    }

    /// View center as a string
    pub fn center_coords(&self) -> String {
        self.coords_text(self.view.center_lon, self.view.center_lat)
    }

    /// Sky position under the mouse, if it is on the sky
    pub fn cursor_coords(&self) -> Option<String> {
        let (col, row) = self.mouse_pos?;
        let (px, py) = cell_to_dots(col, row);
        let (lon, lat) = self.view.unproject(px, py)?;
        Some(self.coords_text(lon, lat))
    }
}

/// Braille canvas size in dots for a terminal size.
///
/// Accounts for the border (2 chars each way) and the status bar row.
fn canvas_dots(width: usize, height: usize) -> (usize, usize) {
    (width.saturating_sub(2) * 2, height.saturating_sub(3) * 4)
}

/// Terminal cell to canvas dot, skipping the one-cell border.
fn cell_to_dots(col: u16, row: u16) -> (i32, i32) {
    ((col.saturating_sub(1)) as i32 * 2, (row.saturating_sub(1)) as i32 * 4)
}
