//! vibe-piano - Terminal piano keyboard demo
//!
//! Hosts a piano view in the terminal. Click and drag with the mouse to play
//! keys; the listener event stream is shown under the keyboard.

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossbeam_channel::Receiver;
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Clear};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Duration;

use vibelang_pianoview::{
    config::Config,
    listener::ChannelListener,
    state::SavedState,
    style::ShowPressMode,
    touch::{PianoEvent, PointerEvent, PointerSample},
    ui::{fit_view, render_piano_standalone, standalone_grid, CellGrid},
    view::PianoView,
};

/// The terminal has one mouse
const MOUSE_POINTER: u32 = 0;

#[derive(Parser)]
#[command(name = "vibe-piano")]
#[command(author, version, about = "Terminal piano keyboard for VibeLang", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path (default: ~/.config/vibe-piano/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of keys (1-88)
    #[arg(short, long)]
    keys: Option<usize>,

    /// When touches highlight keys (on_down, on_click, off)
    #[arg(short, long)]
    press_mode: Option<ShowPressMode>,

    /// Allow only one highlighted key (and one pointer) at a time
    #[arg(long)]
    single_highlight: bool,

    /// File used by the save and restore commands
    #[arg(long)]
    state_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default configuration file
    Init,
    /// Show the configuration file path
    ConfigPath,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            let path = Config::create_default_config_file()?;
            println!("Created default config at: {}", path.display());
            return Ok(());
        }
        Some(Commands::ConfigPath) => {
            let path = Config::config_path()?;
            println!("{}", path.display());
            return Ok(());
        }
        None => {}
    }

    // Load config
    let mut config = if let Some(path) = cli.config {
        Config::load_from(&path)?
    } else {
        Config::load_or_default()
    };

    // Apply CLI overrides
    if let Some(keys) = cli.keys {
        config.piano.number_of_keys = keys;
    }
    if let Some(mode) = cli.press_mode {
        config.piano.show_press_mode = mode;
    }
    if cli.single_highlight {
        config.piano.multi_key_highlighting = false;
    }
    if cli.state_file.is_some() {
        config.terminal.state_file = cli.state_file;
    }

    let mut view = PianoView::new(config.piano.clone())?;
    let (sender, receiver) = crossbeam_channel::unbounded();
    view.add_listener(ChannelListener::new(sender));

    // Run the TUI
    run_tui(&config, view, receiver)
}

fn run_tui(config: &Config, mut view: PianoView, events: Receiver<PianoEvent>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App {
        config,
        view: &mut view,
        events,
        log: Vec::new(),
        grid: None,
    };
    let result = app.run(&mut terminal);

    // Cleanup
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;

    result
}

struct App<'a> {
    config: &'a Config,
    view: &'a mut PianoView,
    events: Receiver<PianoEvent>,
    log: Vec<String>,
    /// Keyboard area of the last frame, for mouse mapping
    grid: Option<CellGrid>,
}

impl App<'_> {
    fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let config = self.config;
        let settings = &config.terminal;
        let mut needs_draw = true;

        loop {
            self.drain_events();

            if needs_draw || self.view.take_redraw_request() {
                let view = &mut *self.view;
                let log = &self.log;
                let mut grid = None;
                terminal.draw(|frame| {
                    let area = frame.area();
                    let piano_grid = standalone_grid(area, settings);
                    fit_view(view, &piano_grid);
                    view.take_redraw_request();
                    grid = Some(piano_grid);

                    // Clear the screen with a dark background
                    frame.render_widget(Clear, area);
                    let bg_block =
                        Block::default().style(Style::default().bg(Color::Rgb(20, 20, 30)));
                    frame.render_widget(bg_block, area);

                    render_piano_standalone(frame, area, view, settings, log);
                })?;
                self.grid = grid;
                needs_draw = false;
            }

            if !event::poll(Duration::from_millis(16))? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let quit = matches!(key.code, KeyCode::Esc | KeyCode::Char('q'))
                        || (key.code == KeyCode::Char('c')
                            && key.modifiers.contains(KeyModifiers::CONTROL));
                    if quit {
                        self.view.on_pointer_event(&PointerEvent::CancelAll);
                        return Ok(());
                    }
                    if let KeyCode::Char(c) = key.code {
                        self.command(c);
                    }
                    needs_draw = true;
                }
                Event::Mouse(mouse) => self.mouse(mouse),
                Event::FocusLost => {
                    // Release everything when losing focus
                    self.view.on_pointer_event(&PointerEvent::CancelAll);
                }
                Event::Resize(_, _) => needs_draw = true,
                _ => {}
            }
        }
    }

    fn mouse(&mut self, mouse: MouseEvent) {
        let Some(grid) = self.grid else {
            return;
        };
        let (x, y) = grid.cell_center(mouse.column, mouse.row);
        let sample = PointerSample::new(MOUSE_POINTER, x, y);
        let event = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => PointerEvent::Down(sample),
            MouseEventKind::Drag(MouseButton::Left) => PointerEvent::Move(vec![sample]),
            MouseEventKind::Up(MouseButton::Left) => PointerEvent::Up(sample),
            _ => return,
        };
        self.view.on_pointer_event(&event);
    }

    fn command(&mut self, c: char) {
        match c {
            '+' | '=' => {
                let keys = self.view.number_of_keys() + 1;
                self.set_number_of_keys(keys);
            }
            '-' => {
                let keys = self.view.number_of_keys().saturating_sub(1);
                self.set_number_of_keys(keys);
            }
            'm' => {
                let enabled = !self.view.is_multi_key_highlighting_enabled();
                self.view.set_multi_key_highlighting(enabled);
                self.status(format!("multi key highlighting: {}", enabled));
            }
            'p' => {
                let mode = self.view.show_press_mode().next();
                self.view.set_show_press_mode(mode);
                self.status(format!("show press mode: {}", mode));
            }
            'c' => self.view.clear_pressed_keys(),
            's' => self.save_state(),
            'r' => self.restore_state(),
            _ => {}
        }
    }

    fn set_number_of_keys(&mut self, keys: usize) {
        if let Err(e) = self.view.set_number_of_keys(keys) {
            log::warn!("{}", e);
            self.status(e.to_string());
        }
    }

    fn save_state(&mut self) {
        let result = self.config.state_file().and_then(|path| {
            self.view.save_state().save_to(&path)?;
            Ok(path)
        });
        match result {
            Ok(path) => self.status(format!("saved state to {}", path.display())),
            Err(e) => {
                log::warn!("Failed to save piano state: {}", e);
                self.status(format!("save failed: {}", e));
            }
        }
    }

    fn restore_state(&mut self) {
        let result = self.config.state_file().and_then(|path| {
            let state = SavedState::load_from(&path)?;
            self.view.restore_state(&state)?;
            Ok(path)
        });
        match result {
            Ok(path) => self.status(format!("restored state from {}", path.display())),
            Err(e) => {
                log::warn!("Failed to restore piano state: {}", e);
                self.status(format!("restore failed: {}", e));
            }
        }
    }

    fn drain_events(&mut self) {
        let events: Vec<PianoEvent> = self.events.try_iter().collect();
        for event in events {
            let line = match event {
                PianoEvent::KeyDown(key) => format!("key down   {}", key),
                PianoEvent::KeyUp(key) => format!("key up     {}", key),
                PianoEvent::KeyClick(key) => format!("key click  {}", key),
                // Raw reports are too chatty for the log
                PianoEvent::Touch(_) | PianoEvent::Click(_) => continue,
            };
            self.status(line);
        }
    }

    fn status(&mut self, line: String) {
        self.log.push(line);
        let keep = self.config.terminal.event_log_len.max(1);
        if self.log.len() > keep {
            let excess = self.log.len() - keep;
            self.log.drain(..excess);
        }
    }
}
