use std::fs::File;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crossterm::event::{Event, KeyCode, MouseButton, MouseEventKind};
use notes_tree::{
    fetcher_for, load_with, Click, Host, LoadError, LoadOptions, Node, NotesTree, Ticket,
    DEFAULT_SOURCE,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Scrollbar, ScrollbarOrientation};
use ratatui::Terminal;
use simplelog::{Config, LevelFilter, WriteLogger};

type Loaded = (Ticket, Result<Vec<Node>, LoadError>);

struct App {
    host: Host,
    options: LoadOptions,
    sender: Sender<Loaded>,
    receiver: Receiver<Loaded>,
    status: String,
}

impl App {
    fn new(options: LoadOptions) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            host: Host::default(),
            options,
            sender,
            receiver,
            status: String::new(),
        }
    }

    /// Start loading in the background. A later reload wins over an earlier one still running.
    fn reload(&mut self) {
        let ticket = self.host.begin();
        let options = self.options.clone();
        let sender = self.sender.clone();
        self.status = format!("loading {}", options.get_source());
        std::thread::spawn(move || {
            let fetcher = fetcher_for(options.get_source());
            let result = load_with(&*fetcher, &options);
            // The receiver is gone when the app was closed meanwhile
            let _ = sender.send((ticket, result));
        });
    }

    fn apply_loaded(&mut self) {
        while let Ok((ticket, result)) = self.receiver.try_recv() {
            let applied = self.host.finish(ticket, result);
            self.status = format!("{applied:?}");
        }
    }

    fn follow(&mut self, click: Click) {
        if let Click::Link(link) = click {
            log::info!("opening {}", link.href());
            // The system browser shares nothing with this viewer
            match open::that_detached(link.href()) {
                Ok(()) => self.status = format!("opened {}", link.href()),
                Err(err) => {
                    log::error!("could not open {}: {err}", link.href());
                    self.status = format!("could not open {}", link.href());
                }
            }
        }
    }
}

fn main() -> std::io::Result<()> {
    let log_file = File::create("notes.log")?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let source = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SOURCE.to_owned());

    // Terminal initialization
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    // App
    let mut app = App::new(LoadOptions::new(source));
    app.reload();
    let res = run_app(&mut terminal, app);

    // restore terminal
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::event::DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> std::io::Result<()> {
    loop {
        app.apply_loaded();

        terminal.draw(|frame| {
            let area = frame.size();
            let widget = NotesTree::new()
                .block(
                    Block::bordered()
                        .title(format!("Notes: {}", app.options.get_source()))
                        .title_bottom(app.status.as_str()),
                )
                .experimental_scrollbar(Some(
                    Scrollbar::new(ScrollbarOrientation::VerticalRight)
                        .begin_symbol(None)
                        .track_symbol(None)
                        .end_symbol(None),
                ))
                .highlight_style(
                    Style::new()
                        .fg(Color::Black)
                        .bg(Color::LightMagenta)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol(">> ")
                .link_style(Style::new().add_modifier(Modifier::UNDERLINED))
                .fallback_style(Style::new().fg(Color::DarkGray));
            frame.render_stateful_widget(widget, area, &mut app.host);
        })?;

        if !crossterm::event::poll(Duration::from_millis(100))? {
            continue;
        }

        match crossterm::event::read()? {
            Event::Key(key) => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('r') => app.reload(),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    let click = app.host.activate_selected(&mut ());
                    app.follow(click);
                }
                KeyCode::Left => {
                    app.host.key_left();
                }
                KeyCode::Right => {
                    app.host.key_right();
                }
                KeyCode::Down => {
                    app.host.key_down();
                }
                KeyCode::Up => {
                    app.host.key_up();
                }
                KeyCode::Home => {
                    app.host.select_first();
                }
                KeyCode::End => {
                    app.host.select_last();
                }
                KeyCode::PageDown => {
                    app.host.expansion_mut().scroll_down(3);
                }
                KeyCode::PageUp => {
                    app.host.expansion_mut().scroll_up(3);
                }
                _ => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => {
                    app.host.expansion_mut().scroll_down(1);
                }
                MouseEventKind::ScrollUp => {
                    app.host.expansion_mut().scroll_up(1);
                }
                MouseEventKind::Down(MouseButton::Left) => {
                    let click = app.host.click_at(mouse.column, mouse.row, &mut ());
                    app.follow(click);
                }
                _ => {}
            },
            _ => {}
        }
    }
}
