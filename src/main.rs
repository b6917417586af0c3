mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{debug, info};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    sync::mpsc::{self, Sender},
    time::Duration,
};
use tapr::{
    passages::PassageSet,
    runtime::{spawn_input_thread, ChannelEventSource, Runner, TickTimer, TrainerEvent},
    session::{Phase, SessionError, TypingSession},
};

const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// minimal typing-speed trainer with live per-character feedback
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A minimal typing-speed trainer: type the displayed passage and watch live words-per-minute and accuracy, with a per-second breakdown when you finish."
)]
pub struct Cli {
    /// print the embedded practice passages and exit
    #[clap(long)]
    list_passages: bool,
}

pub struct App {
    pub session: TypingSession,
    pub passages: PassageSet,
    pub buffer: String,
    pub last_text: Option<String>,
}

impl App {
    pub fn new() -> Self {
        let passages = PassageSet::load();
        debug!("loaded {} practice passages", passages.len());

        Self {
            session: TypingSession::new(),
            passages,
            buffer: String::new(),
            last_text: None,
        }
    }

    /// Start a test over a freshly drawn passage.
    pub fn start_new_test(&mut self) -> Result<(), SessionError> {
        let text = self.passages.choose_random().to_owned();
        self.start_test(text)
    }

    /// Re-run the previous passage, or draw one if there is none yet.
    pub fn retry_test(&mut self) -> Result<(), SessionError> {
        match self.last_text.clone() {
            Some(text) => self.start_test(text),
            None => self.start_new_test(),
        }
    }

    fn start_test(&mut self, text: String) -> Result<(), SessionError> {
        self.buffer.clear();
        self.session.start(&text)?;
        debug!("session started over {} characters", text.chars().count());
        self.last_text = Some(text);
        Ok(())
    }

    /// Bail out of a running test without drawing new text.
    pub fn abort_test(&mut self) {
        self.buffer.clear();
        self.session.reset();
    }

    /// Append one character to the typed buffer and feed the whole buffer to
    /// the session.
    pub fn push_char(&mut self, c: char) {
        self.buffer.push(c);
        self.session.submit_input(&self.buffer);
    }

    /// Erase the last character. An empty buffer emits no edit event, so a
    /// stray backspace before the first keystroke does not start the clock.
    pub fn pop_char(&mut self) {
        if self.buffer.pop().is_some() {
            self.session.submit_input(&self.buffer);
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list_passages {
        let passages = PassageSet::load();
        for passage in passages.passages() {
            println!("{passage}");
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    let res = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let (tx, rx) = mpsc::channel();
    spawn_input_thread(tx.clone());
    let runner = Runner::new(ChannelEventSource::new(rx));
    let mut tick_timer: Option<TickTimer> = None;

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    while let Some(event) = runner.step() {
        match event {
            TrainerEvent::Tick => app.session.tick(),
            TrainerEvent::Resize => {}
            TrainerEvent::Key(key) => {
                if !handle_key(app, key, &tx, &mut tick_timer)? {
                    break;
                }
            }
        }

        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    cancel_timer(&mut tick_timer);

    Ok(())
}

/// Dispatch one key event. Returns false when the app should exit.
fn handle_key(
    app: &mut App,
    key: KeyEvent,
    tx: &Sender<TrainerEvent>,
    tick_timer: &mut Option<TickTimer>,
) -> Result<bool, Box<dyn Error>> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Ok(false);
    }

    match app.session.phase() {
        Phase::Inactive => match key.code {
            KeyCode::Enter => app.start_new_test()?,
            KeyCode::Esc => return Ok(false),
            _ => {}
        },
        Phase::Active => match key.code {
            KeyCode::Esc => {
                cancel_timer(tick_timer);
                app.abort_test();
            }
            KeyCode::Backspace => app.pop_char(),
            KeyCode::Char(c) => {
                app.push_char(c);

                // The display timer starts with the first processed
                // character and never outlives the session
                if tick_timer.is_none() && app.session.has_started() {
                    *tick_timer = Some(TickTimer::spawn(TICK_INTERVAL, tx.clone()));
                }

                if app.session.phase() == Phase::Complete {
                    cancel_timer(tick_timer);
                    if let Some(summary) = app.session.completion() {
                        info!(
                            "session complete: {} wpm, {}% accuracy",
                            summary.metrics.wpm, summary.metrics.accuracy
                        );
                    }
                }
            }
            _ => {}
        },
        Phase::Complete => match key.code {
            KeyCode::Char('r') => app.retry_test()?,
            KeyCode::Char('n') => app.start_new_test()?,
            KeyCode::Esc => return Ok(false),
            _ => {}
        },
    }

    Ok(true)
}

fn cancel_timer(tick_timer: &mut Option<TickTimer>) {
    if let Some(timer) = tick_timer.take() {
        timer.cancel();
    }
}
