use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use bottom_panel::BottomPanel;
use bottom_panel::config::{MemoryRows, MemorySettings, RowsFile, RowsStore};
use bottom_panel::constants::{MAX_WORKSPACES, MIN_WORKSPACES};
use bottom_panel::drivers::OutputDriver;
use bottom_panel::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use bottom_panel::event_loop::{ControlFlow, EventLoop};
use bottom_panel::logging::{self, LogBuffer};
use bottom_panel::shell::{Monitor, MotionDirection, Shell};
use bottom_panel::sim::SimShell;
use bottom_panel::tooltip::TextDirection;
use bottom_panel::ui::UiFrame;
use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use indoc::indoc;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tracing::Level;

const HELP: &str = indoc! {"
    n  new window          c  close focused window
    t  retitle focused     m  post tray message
    d  dismiss message     Ctrl+arrows  switch workspace
    Shift+arrows  move focused window    q  quit
    right-click the workspace buttons to configure them
"};

const APPS: [&str; 5] = ["terminal", "editor", "browser", "mail", "files"];
const TRAY_HEIGHT: u16 = 4;
const LOG_LINES: usize = 6;

#[derive(Debug, Parser)]
#[command(version, about = "Bottom panel demo over a simulated window manager")]
struct Args {
    /// Number of workspaces to start with.
    #[arg(long, default_value_t = 4)]
    workspaces: usize,
    /// File holding the switcher row count (defaults to ~/.bottom_panel_rows).
    #[arg(long)]
    rows_file: Option<PathBuf>,
    /// Windows to open on the first workspace.
    #[arg(long, default_value_t = 3)]
    windows: usize,
    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
    /// Write logs to this file instead of the on-screen strip.
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Lay tooltips out for a right-to-left locale.
    #[arg(long)]
    rtl: bool,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let logs = LogBuffer::new_default();
    match &args.log_file {
        Some(path) => {
            logging::use_file(path)?;
        }
        None => {
            logging::use_buffer(logs.clone());
        }
    }
    logging::init(args.log_level);

    let rows_store: Box<dyn RowsStore> = match args.rows_file {
        Some(path) => Box::new(RowsFile::new(path)),
        None => match RowsFile::default_location() {
            Ok(file) => Box::new(file),
            Err(err) => {
                tracing::warn!(%err, "row count will not be saved");
                Box::new(MemoryRows::default())
            }
        },
    };

    let mut host = SimShell::new(args.workspaces.clamp(MIN_WORKSPACES, MAX_WORKSPACES));
    let (width, height) = crossterm::terminal::size()?;
    host.set_monitor(monitor(width, height));
    let mut demo = Demo {
        host,
        panel: None,
        logs,
        opened: 0,
    };
    for _ in 0..args.windows {
        demo.open_window();
    }
    demo.host.clear_deliveries();
    let mut panel = BottomPanel::enable(&mut demo.host, rows_store, Box::new(MemorySettings::new()));
    if args.rtl {
        panel.set_text_direction(TextDirection::RightToLeft);
    }
    demo.panel = Some(panel);

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let mut event_loop = EventLoop::new(ConsoleInputDriver::new(), Duration::from_millis(16));
    let result = event_loop.run(|_, event| {
        let flow = demo.step(event.as_ref(), Instant::now());
        output.draw(|mut frame| demo.render(&mut frame))?;
        Ok(flow)
    });

    if let Some(panel) = demo.panel.take() {
        panel.disable(&mut demo.host);
    }
    output.exit()?;
    result
}

fn monitor(width: u16, height: u16) -> Monitor {
    Monitor {
        x: 0,
        y: 0,
        width: u32::from(width),
        height: u32::from(height),
    }
}

struct Demo {
    host: SimShell,
    panel: Option<BottomPanel>,
    logs: LogBuffer,
    opened: usize,
}

impl Demo {
    fn open_window(&mut self) {
        let app = APPS[self.opened % APPS.len()];
        self.opened += 1;
        let title = format!("{app} {}", self.opened);
        let index = self.host.active_workspace_index();
        let window = self.host.add_window(index, app, &title);
        self.host.activate_window(window);
    }

    fn step(&mut self, event: Option<&Event>, now: Instant) -> ControlFlow {
        let Some(panel) = self.panel.as_mut() else {
            return ControlFlow::Quit;
        };
        let mut flow = ControlFlow::Continue;
        match event {
            Some(Event::Resize(width, height)) => self.host.set_monitor(monitor(*width, *height)),
            Some(event) if panel.handle_event(&mut self.host, event, now) => {}
            Some(Event::Key(key)) => flow = self.handle_key(key, now),
            _ => {}
        }
        self.pump();
        if let Some(panel) = self.panel.as_mut() {
            panel.tick(now);
        }
        flow
    }

    fn handle_key(&mut self, key: &KeyEvent, now: Instant) -> ControlFlow {
        let direction = match key.code {
            KeyCode::Left => Some(MotionDirection::Left),
            KeyCode::Right => Some(MotionDirection::Right),
            KeyCode::Up => Some(MotionDirection::Up),
            KeyCode::Down => Some(MotionDirection::Down),
            _ => None,
        };
        if let Some(direction) = direction {
            let action = if key.modifiers.contains(KeyModifiers::SHIFT) {
                "move"
            } else if key.modifiers.contains(KeyModifiers::CONTROL) {
                "switch"
            } else {
                return ControlFlow::Continue;
            };
            let name = format!("{action}-to-workspace-{}", direction.as_str());
            if let Some(panel) = self.panel.as_mut() {
                panel.keybinding(&mut self.host, &name, now);
            }
            return ControlFlow::Continue;
        }
        match key.code {
            KeyCode::Char('q') => return ControlFlow::Quit,
            KeyCode::Char('n') => self.open_window(),
            KeyCode::Char('c') => {
                if let Some(window) = self.host.focus_window() {
                    self.host.close_window(window);
                }
            }
            KeyCode::Char('t') => {
                if let Some(window) = self.host.focus_window()
                    && let Some(info) = self.host.window_info(window)
                {
                    let title = format!("{} *", info.title);
                    self.host.set_title(window, &title);
                }
            }
            KeyCode::Char('m') => self.host.add_tray_item(),
            KeyCode::Char('d') => self.host.remove_tray_item(),
            _ => {}
        }
        ControlFlow::Continue
    }

    fn pump(&mut self) {
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        while let Some((id, event)) = self.host.next_delivery() {
            panel.dispatch(&mut self.host, id, &event);
        }
    }

    fn render(&mut self, frame: &mut UiFrame<'_>) {
        let area = frame.area();
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        let desktop = Rect {
            height: area.height.saturating_sub(panel.height()),
            ..area
        };
        frame.fill(
            desktop,
            Style::default()
                .bg(bottom_panel::theme::desktop_bg())
                .fg(bottom_panel::theme::desktop_fg()),
        );
        let mut lines: Vec<Line> = vec![Line::from(format!(
            "workspace {} of {}",
            self.host.active_workspace_index() + 1,
            self.host.n_workspaces()
        ))];
        lines.extend(HELP.lines().map(Line::from));
        lines.push(Line::from(""));
        lines.extend(self.logs.tail(LOG_LINES).into_iter().map(Line::from));
        frame.render_widget(Paragraph::new(lines), desktop);

        if self.host.tray_summary_shown() {
            let offset = panel.tray_target_y(i32::from(TRAY_HEIGHT));
            let top = (i32::from(area.y) + i32::from(area.height) + offset).max(0) as u16;
            let tray = Rect {
                x: area.x,
                y: top,
                width: area.width,
                height: TRAY_HEIGHT.min(area.height.saturating_sub(top)),
            };
            let count = self.host.tray_summary_len();
            frame.render_widget(Clear, tray);
            frame.render_widget(
                Paragraph::new(format!("{count} message(s)"))
                    .block(Block::default().borders(Borders::ALL).title("Messages")),
                tray,
            );
        }
        panel.render(frame);
    }
}
