mod app;
mod braille;
mod sky;
mod ui;

use anyhow::{anyhow, Result};
use app::App;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use log::LevelFilter;
use ratatui::DefaultTerminal;
use simple_logger::SimpleLogger;
use std::time::Duration;

/// Environment variable holding the log level. Logs go to stderr, so redirect
/// it when enabling this (`SKYVIEW_LOG=debug skyview 2>sky.log`).
const LOG_ENV: &str = "SKYVIEW_LOG";

fn main() -> Result<()> {
    if let Ok(level) = std::env::var(LOG_ENV) {
        let level: LevelFilter = level.parse().map_err(|e| anyhow!("{LOG_ENV}={level}: {e}"))?;
        SimpleLogger::new().with_level(level).init().map_err(|e| anyhow!("logger: {e}"))?;
    }

    let mut terminal = ratatui::init();
    terminal.clear()?;

    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Handle mouse events for panning and zooming
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel zooms towards the mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => {
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag();
        }
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(size.width as usize, size.height as usize);

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            // Pan with hjkl or arrow keys
                            KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                            KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                            KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
                            KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

                            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                            KeyCode::Char('p') | KeyCode::Char('P') => app.cycle_projection(),
                            KeyCode::Char('f') | KeyCode::Char('F') => app.cycle_frame(),
                            KeyCode::Char('x') | KeyCode::Char('X') => app.flip_horizontal(),
                            KeyCode::Char('y') | KeyCode::Char('Y') => app.flip_vertical(),

                            // Layer toggles
                            KeyCode::Char('g') | KeyCode::Char('G') => {
                                app.sky_renderer.toggle_grid()
                            }
                            KeyCode::Char('n') | KeyCode::Char('N') => {
                                app.sky_renderer.toggle_lines()
                            }
                            KeyCode::Char('L') => app.sky_renderer.toggle_labels(),
                            KeyCode::Char('d') | KeyCode::Char('D') => {
                                app.sky_renderer.toggle_decimal()
                            }

                            KeyCode::Char('r') | KeyCode::Char('0') => app.reset(),

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width as usize, height as usize);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
