// SPDX-License-Identifier: GPL-3.0-only

//! Terminal-based camera front end
//!
//! Renders the live preview with Unicode half-block characters and the
//! controller's [`UiState`] as overlays. Keys are mapped to [`Message`]s.

use crate::app::{CameraController, CaptureMode, ClickTarget, FilterType, Message, Runtime, UiState};
use crate::backends::camera::types::CameraFrame;
use crate::backends::virtual_camera::{MjpegRecorder, TorchBackend, VirtualCamera, VirtualCameraOptions};
use crate::config::Config;
use crate::constants::{self, RESOLUTION_PRESETS};
use crate::pipelines::photo::{PostProcessingConfig, PostProcessor};
use crate::storage::DirectorySink;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const HELP: &str = "space capture | m mode | s switch | t torch | p pause | x stop | f filter | c capture mode | r resolution | tab menu | q quit";

/// Run the terminal camera front end
///
/// Confirmed capture-mode and resolution choices are written to
/// `config_path`.
pub async fn run(
    config: Config,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, config, config_path.as_deref()).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Host input reduced to what the loop cares about
enum Input {
    Key(KeyEvent),
    Resize,
}

/// Read crossterm events on a blocking thread until the receiver goes away
fn spawn_input_reader() -> mpsc::UnboundedReceiver<Input> {
    let (sender, receiver) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        while !sender.is_closed() {
            match event::poll(Duration::from_millis(100)) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    warn!(error = %err, "Terminal input polling failed");
                    break;
                }
            }
            let input = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => Input::Key(key),
                Ok(Event::Resize(..)) => Input::Resize,
                Ok(_) => continue,
                Err(err) => {
                    warn!(error = %err, "Terminal input read failed");
                    break;
                }
            };
            if sender.send(input).is_err() {
                break;
            }
        }
    });
    receiver
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: Config,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let camera = Arc::new(VirtualCamera::new(VirtualCameraOptions {
        torch: TorchBackend::detect(),
        deny_permission: false,
    }));
    let recorder = Arc::new(MjpegRecorder::new(camera.clone()));
    let sink = DirectorySink::new(config.output_dir());
    info!(output = %sink.dir().display(), "Terminal front end starting");

    let mut saved = config.clone();
    let controller = CameraController::new(camera.clone(), recorder, Arc::new(sink.clone()), config);
    let mut runtime = Runtime::new(controller);
    runtime.dispatch(Message::Init);

    let mut input = spawn_input_reader();
    let mut frame_ticker = tokio::time::interval(constants::ui::TERMINAL_FRAME);
    frame_ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            event = input.recv() => match event {
                Some(Input::Key(key)) => {
                    if is_quit(&key) {
                        break;
                    }
                    if let Some(message) = key_message(&key, runtime.controller()) {
                        debug!(?message, "Key mapped");
                        runtime.dispatch(message);
                    }
                }
                Some(Input::Resize) => {}
                None => break,
            },
            _ = runtime.step(), if runtime.pending() > 0 => {}
            _ = frame_ticker.tick() => {}
        }

        let controller = runtime.controller();
        persist_if_changed(&mut saved, controller.config(), config_path);
        let ui = controller.ui();
        let preview = controller.stream().and_then(|stream| {
            let area = terminal.size().ok()?;
            let width = u32::from(area.width.max(1));
            let height = u32::from(area.height.saturating_sub(2).max(1)) * 2;
            camera.render_preview(stream, width, height).ok()
        });
        let preview = preview.map(|frame| filtered_preview(frame, &ui, controller.filter()));

        terminal.draw(|f| {
            let area = f.area();
            let camera_area = Rect {
                height: area.height.saturating_sub(1),
                ..area
            };
            f.render_widget(&FrameWidget { frame: preview.as_ref() }, camera_area);
            render_overlays(f, camera_area, &ui, controller);

            let status_area = Rect {
                y: area.height.saturating_sub(1),
                height: 1,
                ..area
            };
            f.render_widget(StatusBar { message: HELP }, status_area);
        })?;
    }

    // Captures in flight and a running recording are saved before exit
    if !runtime.shutdown(constants::ui::SHUTDOWN_GRACE).await {
        warn!("Exiting with captures unsaved");
    }
    sink.flush().await;
    persist_if_changed(&mut saved, runtime.controller().config(), config_path);
    info!("Terminal front end exiting");
    Ok(())
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('q')
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Map a key press to a controller message
fn key_message(key: &KeyEvent, controller: &CameraController) -> Option<Message> {
    let message = match key.code {
        KeyCode::Char(' ') | KeyCode::Enter => Message::Capture,
        KeyCode::Char('m') => Message::ToggleMode,
        KeyCode::Char('s') => Message::SwitchCamera,
        KeyCode::Char('t') => Message::ToggleTorch,
        KeyCode::Char('p') => Message::TogglePause,
        KeyCode::Char('x') => Message::StopRecording,
        KeyCode::Char('f') => Message::SelectFilter(next_filter(controller.filter())),
        KeyCode::Char('c') => Message::SetCaptureMode(controller.capture_mode().next()),
        KeyCode::Char('r') => {
            let current = controller.resolution();
            let index = RESOLUTION_PRESETS
                .iter()
                .position(|preset| preset.resolution == current)
                .map_or(0, |i| (i + 1) % RESOLUTION_PRESETS.len());
            Message::SelectResolution(RESOLUTION_PRESETS[index].resolution.value())
        }
        KeyCode::Tab => Message::ToggleMenu,
        KeyCode::Esc => Message::DocumentClick(ClickTarget::Elsewhere),
        _ => return None,
    };
    Some(message)
}

fn next_filter(current: FilterType) -> FilterType {
    let index = FilterType::ALL
        .iter()
        .position(|filter| *filter == current)
        .map_or(0, |i| (i + 1) % FilterType::ALL.len());
    FilterType::ALL[index]
}

/// Write the controller's settings once they differ from the last save
///
/// The controller only records a resolution after the camera confirmed it,
/// so failed changes never reach the file.
fn persist_if_changed(saved: &mut Config, current: &Config, path: Option<&Path>) {
    if saved == current {
        return;
    }
    *saved = current.clone();
    let Some(path) = path else {
        debug!("No config path, settings not saved");
        return;
    };
    match current.save_to(path) {
        Ok(()) => debug!(path = %path.display(), "Config saved"),
        Err(err) => warn!(error = %err, "Failed to save config"),
    }
}

/// Preview as the user should see it: mirrored for the front camera, filtered
fn filtered_preview(frame: CameraFrame, ui: &UiState, filter: FilterType) -> CameraFrame {
    let processor = PostProcessor::new(PostProcessingConfig {
        mirror: ui.preview_mirrored,
        filter_type: filter,
    });
    match processor.process(&frame) {
        Ok(image) => {
            let (width, height) = image.dimensions();
            CameraFrame::from_rgba(width, height, image.into_raw()).unwrap_or(frame)
        }
        Err(err) => {
            debug!(error = %err, "Preview filter failed");
            frame
        }
    }
}

fn render_overlays(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    ui: &UiState,
    controller: &CameraController,
) {
    // Top bar: mode, torch, capture mode, recording timer
    let mut top = vec![
        format!("[{}] {}", ui.mode_button.icon, ui.mode_button.title),
        format!("mode: {}", ui.capture_mode),
        format!("{}", controller.resolution()),
    ];
    if let Some(torch) = ui.torch_button {
        top.push(format!("torch: {}{}", torch.icon, if torch.active { " *" } else { "" }));
    }
    if let Some(class) = &ui.preview_class {
        top.push(class.clone());
    }
    if ui.recording_indicator {
        let timer = ui.timer.as_deref().unwrap_or("00:00");
        top.push(format!("● REC {} [{}]", timer, ui.pause_button.title));
    }
    let top_style = if ui.capture_button.recording {
        Style::default().fg(Color::White).bg(Color::Red)
    } else {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    };
    let top_area = Rect { height: 1, ..area };
    f.render_widget(Paragraph::new(top.join(" | ")).style(top_style), top_area);

    if let Some(value) = ui.countdown {
        let countdown_area = centered(area, 9, 3);
        f.render_widget(Clear, countdown_area);
        f.render_widget(
            Paragraph::new(value.to_string())
                .centered()
                .style(Style::default().add_modifier(Modifier::BOLD))
                .block(Block::default().borders(Borders::ALL)),
            countdown_area,
        );
    }

    if let Some(toast) = &ui.toast {
        let width = (toast.chars().count() as u16 + 4).min(area.width);
        let toast_area = Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(4),
            width,
            height: 3,
        };
        f.render_widget(Clear, toast_area);
        f.render_widget(
            Paragraph::new(toast.as_str())
                .centered()
                .block(Block::default().borders(Borders::ALL)),
            toast_area,
        );
    }

    if ui.menu_open {
        let mut lines = vec![Line::from("Filters (f)")];
        for button in &ui.filters {
            let marker = if button.active { ">" } else { " " };
            lines.push(Line::from(format!("{} {}", marker, button.filter)));
        }
        lines.push(Line::from(""));
        lines.push(Line::from("Resolution (r)"));
        for option in &ui.resolution_options {
            let marker = if option.selected { ">" } else { " " };
            lines.push(Line::from(format!("{} {}", marker, option.label)));
        }
        lines.push(Line::from(""));
        lines.push(Line::from("Capture mode (c)"));
        for mode in CaptureMode::ALL {
            let marker = if mode == ui.capture_mode { ">" } else { " " };
            lines.push(Line::from(format!("{} {}", marker, mode)));
        }

        let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(1));
        let menu_area = Rect {
            x: area.x + area.width.saturating_sub(26),
            y: area.y + 1,
            width: 26.min(area.width),
            height,
        };
        f.render_widget(Clear, menu_area);
        f.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Menu")),
            menu_area,
        );
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

struct FrameWidget<'a> {
    frame: Option<&'a CameraFrame>,
}

impl Widget for &FrameWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = self.frame else {
            // No frame yet - show placeholder
            let msg = "Waiting for camera...";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, Style::default());
            }
            return;
        };

        if frame.width == 0 || frame.height == 0 || area.width == 0 || area.height == 0 {
            return;
        }

        // Each terminal cell displays 2 vertical pixels using half-block characters
        let x_scale = frame.width as f64 / area.width as f64;
        let y_scale = frame.height as f64 / (area.height as f64 * 2.0);

        for ty in 0..area.height {
            for tx in 0..area.width {
                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let [r, g, b, _] = frame.pixel(src_x, src_y_top);
                let top_color = Color::Rgb(r, g, b);
                let [r, g, b, _] = frame.pixel(src_x, src_y_bottom);
                let bottom_color = Color::Rgb(r, g, b);

                if let Some(cell) = buf.cell_mut((area.x + tx, area.y + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(top_color);
                    cell.set_bg(bottom_color);
                }
            }
        }
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(
            area.x,
            area.y,
            text,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn filter_cycle_wraps() {
        assert_eq!(next_filter(FilterType::None), FilterType::Sepia);
        assert_eq!(next_filter(FilterType::Invert), FilterType::None);
    }

    #[test]
    fn quit_keys() {
        assert!(is_quit(&key(KeyCode::Char('q'))));
        assert!(is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit(&key(KeyCode::Char('c'))));
    }

    #[test]
    fn settings_saved_only_when_changed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        let mut saved = Config::default();

        persist_if_changed(&mut saved, &Config::default(), Some(&path));
        assert!(!path.exists());

        let current = Config {
            capture_mode: CaptureMode::Continuous,
            ..Config::default()
        };
        persist_if_changed(&mut saved, &current, Some(&path));
        assert_eq!(saved, current);
        assert_eq!(Config::load_from(&path), current);
    }

    #[test]
    fn frame_widget_fills_area() {
        let frame = CameraFrame::from_rgba(2, 2, vec![255; 16]).unwrap();
        let widget = FrameWidget { frame: Some(&frame) };
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        (&widget).render(area, &mut buf);
        let cell = &buf[(3, 1)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(255, 255, 255));
    }
}
