use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
};

use mecamatic::{
    lessons::LessonCatalog,
    machine::{KeyInput, SessionEvent, SessionMachine},
    runtime::{AppEvent, CrosstermEventSource, Runner},
    settings::{FileSettingsStore, GlobalSettings, SettingsStore, TriState},
    ui::SessionView,
};

/// retro terminal typing tutor with guided lessons and per-exercise goals
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A retro terminal typing tutor: guided lessons with per-exercise speed and error-tolerance goals, a one-second exercise timer, and live gross/net keystroke metrics."
)]
pub struct Cli {
    /// lesson category to pull exercises from
    #[clap(short = 'c', long, value_enum, default_value_t = Category::Learning)]
    category: Category,

    /// lesson number (ignored for flat categories such as practice)
    #[clap(short = 'l', long, default_value_t = 1)]
    lesson: u32,

    /// exercise number within the lesson
    #[clap(short = 'e', long, default_value_t = 1)]
    exercise: u32,

    /// list available lessons and exercises, then exit
    #[clap(long)]
    list: bool,

    /// override the tutor hint visibility for this run
    #[clap(long, value_enum)]
    tutor: Option<OverrideArg>,

    /// override the keyboard strip visibility for this run
    #[clap(long, value_enum)]
    keyboard: Option<OverrideArg>,

    /// override the maximum tolerated error percentage for this run
    #[clap(long)]
    max_errors: Option<f64>,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Learning,
    Practice,
}

impl Category {
    fn manifest(&self) -> String {
        self.to_string()
    }

    /// Flat categories address exercises without a lesson number.
    fn lesson_key(&self, lesson: u32) -> Option<u32> {
        match self {
            Category::Learning => Some(lesson),
            Category::Practice => None,
        }
    }
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OverrideArg {
    Inherit,
    On,
    Off,
}

impl From<OverrideArg> for TriState {
    fn from(arg: OverrideArg) -> Self {
        match arg {
            OverrideArg::Inherit => TriState::Inherit,
            OverrideArg::On => TriState::ForceOn,
            OverrideArg::Off => TriState::ForceOff,
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub machine: SessionMachine,
    pub settings: GlobalSettings,
    pub catalog: LessonCatalog,
}

impl App {
    fn select(&mut self, lesson: Option<u32>, exercise: u32) -> bool {
        match self.catalog.find(lesson, exercise) {
            Some(selection) => {
                self.machine
                    .handle(SessionEvent::ExerciseSelected(selection));
                true
            }
            None => false,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list {
        return list_exercises();
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileSettingsStore::new();
    let mut settings = store.load();
    if let Some(tutor) = cli.tutor {
        settings.tutor_visibility = tutor.into();
    }
    if let Some(keyboard) = cli.keyboard {
        settings.keyboard_visibility = keyboard.into();
    }
    if let Some(max_errors) = cli.max_errors {
        settings.errors_coefficient_override = Some(max_errors);
    }

    let catalog = LessonCatalog::load(&cli.category.manifest())?;
    let lesson = cli.category.lesson_key(cli.lesson);

    let mut app = App {
        machine: SessionMachine::new(),
        settings,
        catalog,
    };
    if !app.select(lesson, cli.exercise) {
        let mut cmd = Cli::command();
        cmd.error(
            ErrorKind::InvalidValue,
            format!(
                "no exercise {} in {} lesson {}",
                cli.exercise, cli.category, cli.lesson
            ),
        )
        .exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

#[derive(Debug)]
enum ExitType {
    Repeat,
    Next,
    Quit,
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new());

    loop {
        let mut exit_type = ExitType::Quit;
        terminal.draw(|f| ui(app, f))?;

        loop {
            match runner.step(app.machine.tick_timer()) {
                AppEvent::Tick => {
                    app.machine.handle(SessionEvent::Tick);
                    terminal.draw(|f| ui(app, f))?;
                }
                AppEvent::Resize => {
                    terminal.draw(|f| ui(app, f))?;
                }
                AppEvent::Key(key) => {
                    match key.code {
                        KeyCode::Esc => {
                            break;
                        }
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            break;
                        }
                        // The machine freezes keystrokes once the
                        // exercise is finished, so these are free to use
                        // as shell keys there.
                        KeyCode::Char('n') if app.machine.is_finished() => {
                            exit_type = ExitType::Next;
                            break;
                        }
                        KeyCode::Char('r') if app.machine.is_finished() => {
                            exit_type = ExitType::Repeat;
                            break;
                        }
                        _ => {
                            if let Some(input) = key_input(&key) {
                                app.machine.handle(SessionEvent::KeyPressed(input));
                            }
                        }
                    }
                    terminal.draw(|f| ui(app, f))?;
                }
            }
        }

        let ctx = app.machine.context();
        let (lesson, exercise) = (ctx.lesson_number, ctx.exercise_number.unwrap_or(1));
        match exit_type {
            ExitType::Repeat => {
                app.select(lesson, exercise);
            }
            ExitType::Next => match app.catalog.next_after(lesson, exercise) {
                Some((next_lesson, next_exercise)) => {
                    app.select(next_lesson, next_exercise);
                }
                None => break,
            },
            ExitType::Quit => break,
        }
    }

    Ok(())
}

/// Keystrokes the session machine understands; everything else stays at
/// the shell level.
fn key_input(key: &KeyEvent) -> Option<KeyInput> {
    match key.code {
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyInput::Char(c))
        }
        _ => None,
    }
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(
        SessionView {
            machine: &app.machine,
            settings: &app.settings,
        },
        f.area(),
    );
}

fn list_exercises() -> Result<(), Box<dyn Error>> {
    for category in [Category::Learning, Category::Practice] {
        let catalog = LessonCatalog::load(&category.manifest())?;
        println!("{}", catalog.category());
        for (lesson, exercise) in catalog.entries() {
            if let Some(selection) = catalog.find(lesson, exercise) {
                let label = match lesson {
                    Some(lesson) => format!("lesson {} exercise {}", lesson, exercise),
                    None => format!("exercise {}", exercise),
                };
                println!(
                    "  {} (min {:.0} wpm): {}",
                    label,
                    selection.minimum_speed,
                    preview(&selection.lesson_text)
                );
            }
        }
    }
    Ok(())
}

fn preview(text: &str) -> String {
    const MAX: usize = 40;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX).collect();
        format!("{}...", head)
    }
}
