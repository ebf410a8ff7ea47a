use super::format::label_text;
use super::raster::{draw_marker, draw_vertex_array};
use super::view::SkyView;
use crate::braille::BrailleCanvas;
use glam::DVec3;
use log::debug;
use skyproj::grid::GridLabel;
use skyproj::{SkyGrid, SkyLine, SkyLineKind, Tessellator};

/// Display settings for sky layers
#[derive(Debug, Clone)]
pub struct DisplaySettings {
    pub show_grid: bool,
    pub show_lines: bool,
    pub show_labels: bool,
    pub decimal_degrees: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_lines: true,
            show_labels: true,
            decimal_degrees: false,
        }
    }
}

/// Braille layers for one frame, drawn back to front.
pub struct SkyLayers {
    pub grid: BrailleCanvas,
    pub lines: BrailleCanvas,
    /// Text overlay as (column, row, text)
    pub labels: Vec<(u16, u16, String)>,
}

/// Draws the coordinate grid and reference lines of a [`SkyView`].
pub struct SkyRenderer {
    pub settings: DisplaySettings,
    pub lines: Vec<SkyLine>,
}

impl SkyRenderer {
    pub fn new() -> Self {
        let lines = [
            SkyLineKind::EquatorJ2000,
            SkyLineKind::EclipticJ2000,
            SkyLineKind::GalacticEquator,
            SkyLineKind::Horizon,
            SkyLineKind::Meridian,
        ]
        .into_iter()
        .map(SkyLine::new)
        .collect();
        Self {
            settings: DisplaySettings::default(),
            lines,
        }
    }

    /// Render all layers for a canvas of `cols` x `rows` characters.
    ///
    /// `view` must already be sized to the canvas in dots.
    pub fn render(&self, cols: usize, rows: usize, view: &SkyView) -> SkyLayers {
        let mut layers = SkyLayers {
            grid: BrailleCanvas::new(cols, rows),
            lines: BrailleCanvas::new(cols, rows),
            labels: Vec::new(),
        };
        let mut anchors = Vec::new();

        if self.settings.show_grid {
            let prj = view.projector();
            let tess = Tessellator::new(&prj);
            let strips = SkyGrid::new(view.frame).draw(&tess, |l| anchors.push(l));
            debug!("grid: {} strips, {} labels", strips.len(), anchors.len());
            for strip in &strips {
                draw_vertex_array(&mut layers.grid, strip);
            }
            for pole in [DVec3::Z, DVec3::NEG_Z] {
                let (win, visible) = prj.project_check(pole);
                if visible {
                    draw_marker(&mut layers.grid, win.x.round() as i32, win.y.round() as i32, 2);
                }
            }
        }

        if self.settings.show_lines {
            for line in &self.lines {
                let prj = view.projector_for(line.frame());
                let tess = Tessellator::new(&prj);
                for strip in &line.draw(&tess, |l| anchors.push(l)) {
                    draw_vertex_array(&mut layers.lines, strip);
                }
            }
        }

        if self.settings.show_labels {
            layers.labels = anchors
                .into_iter()
                .filter_map(|a| self.place_label(&a, cols, rows))
                .collect();
        }
        layers
    }

    /// Character cell for a label so that it reads inward from the edge.
    fn place_label(
        &self,
        anchor: &GridLabel,
        cols: usize,
        rows: usize,
    ) -> Option<(u16, u16, String)> {
        if cols == 0 || rows == 0 || !anchor.pos.is_finite() {
            return None;
        }
        let text = label_text(anchor.value, self.settings.decimal_degrees);
        let len = text.chars().count().min(cols);
        let col = (anchor.pos.x / 2.0).floor().max(0.0) as usize;
        let row = ((anchor.pos.y / 4.0).floor().max(0.0) as usize).min(rows - 1);
        let start = if anchor.flipped { (col + 1).saturating_sub(len) } else { col };
        let start = start.min(cols - len);
        Some((start as u16, row as u16, text))
    }

    pub fn toggle_grid(&mut self) {
        self.settings.show_grid = !self.settings.show_grid;
    }

    pub fn toggle_lines(&mut self) {
        self.settings.show_lines = !self.settings.show_lines;
    }

    pub fn toggle_labels(&mut self) {
        self.settings.show_labels = !self.settings.show_labels;
    }

    pub fn toggle_decimal(&mut self) {
        self.settings.decimal_degrees = !self.settings.decimal_degrees;
    }
}

impl Default for SkyRenderer {
    fn default() -> Self {
        Self::new()
    }
}
