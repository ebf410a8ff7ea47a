use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::sky::SkyLayers;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Sky
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_sky(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_sky(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" {} · {} ", app.view.kind.name(), app.view.frame.name());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Braille gives 2x4 resolution per character
    let mut view = app.view.clone();
    view.width = inner.width as usize * 2;
    view.height = inner.height as usize * 4;

    let layers = app.sky_renderer.render(inner.width as usize, inner.height as usize, &view);

    let cursor_pos = app.mouse_pos.and_then(|(col, row)| {
        let cx = col.checked_sub(inner.x)?;
        let cy = row.checked_sub(inner.y)?;
        (cx < inner.width && cy < inner.height).then_some((cx, cy))
    });

    frame.render_widget(SkyWidget { layers, cursor_pos }, inner);
}

/// Braille sky layers with text labels overlaid
struct SkyWidget {
    layers: SkyLayers,
    cursor_pos: Option<(u16, u16)>,
}

impl SkyWidget {
    /// Render a braille canvas layer with a specific color
    fn render_layer(&self, canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        if canvas.is_blank() {
            return;
        }
        for (row_idx, row_str) in canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for SkyWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.render_layer(&self.layers.grid, Color::Blue, area, buf);
        self.render_layer(&self.layers.lines, Color::Yellow, area, buf);

        let label_style = Style::default().fg(Color::White);
        for (lx, ly, text) in &self.layers.labels {
            if *ly >= area.height || *lx >= area.width {
                continue;
            }
            let y = area.y + *ly;
            let max_len = area.width.saturating_sub(*lx) as usize;
            for (i, ch) in text.chars().take(max_len).enumerate() {
                buf[(area.x + *lx + i as u16, y)].set_char(ch).set_style(label_style);
            }
        }

        if let Some((cx, cy)) = self.cursor_pos {
            buf[(area.x + cx, area.y + cy)].set_char('╋').set_fg(Color::Red);
        }
    }
}

fn toggle_span(on: bool, on_text: &'static str, off_text: &'static str) -> Span<'static> {
    Span::styled(
        if on { on_text } else { off_text },
        Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
    )
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.sky_renderer.settings;

    let mut spans = vec![
        Span::styled(" FOV: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.fov_text(), Style::default().fg(Color::Yellow)),
        Span::styled(" ", Style::default()),
        toggle_span(settings.show_grid, "[G]rid ", "[g]rid "),
        toggle_span(settings.show_lines, "[N]lines ", "[n]lines "),
        toggle_span(settings.show_labels, "[L]abels ", "[l]abels "),
        toggle_span(settings.decimal_degrees, "[D]ecimal ", "[d]ecimal "),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
    ];
    if let Some(cursor) = app.cursor_coords() {
        spans.push(Span::styled(" ╋ ", Style::default().fg(Color::Red)));
        spans.push(Span::styled(cursor, Style::default().fg(Color::Magenta)));
    }
    spans.push(Span::styled(
        " | hjkl:pan +/-:zoom p:proj f:frame x/y:flip r:reset q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
