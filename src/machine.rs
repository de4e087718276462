use std::time::Duration;

use crate::guards;
use crate::metrics;
use crate::runtime::TickTimer;
use crate::settings::{DEFAULT_ERRORS_COEFFICIENT, DEFAULT_MINIMUM_WPM};

/// Cursor value before the learner has pressed Enter to begin.
pub const CURSOR_NOT_STARTED: i32 = -1;
pub const CURSOR_FIRST_LETTER: i32 = 0;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A keystroke as seen by the session machine. Modifier state is dropped
/// at the input boundary; it never affects transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyInput {
    Enter,
    Char(char),
}

/// Payload of an exercise selection, produced by the lesson catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct ExerciseSelection {
    pub lesson_text: String,
    pub category: String,
    pub lesson_number: Option<u32>,
    pub exercise_number: u32,
    pub tutor_active: bool,
    pub keyboard_visible: bool,
    pub minimum_speed: f64,
    pub errors_coefficient: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    ExerciseSelected(ExerciseSelection),
    KeyPressed(KeyInput),
    /// One-second timer tick, synthesized by the runtime while the timer
    /// region is ongoing.
    Tick,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressState {
    NotStarted,
    Ongoing,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    Off,
    Ongoing,
    Stopped,
}

/// Composite machine state. The two sub-states of `Exercise` are the
/// parallel progress and timer regions; both consume each event within a
/// single `handle` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachineState {
    Default,
    Exercise {
        progress: ProgressState,
        timer: TimerState,
    },
}

/// Mutable session record, exclusively owned by the machine and exposed
/// read-only to the renderer and the settings resolver.
///
/// `total_gross_keystrokes` and `total_net_keystrokes` are caches derived
/// from `(cursor_position, errors)`, refreshed after every keystroke
/// processed while the exercise is ongoing.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionContext {
    pub lesson_text: Option<String>,
    pub category: Option<String>,
    pub lesson_number: Option<u32>,
    pub exercise_number: Option<u32>,
    pub cursor_position: i32,
    pub errors: u32,
    pub elapsed_seconds: u32,
    pub total_gross_keystrokes: i32,
    pub total_net_keystrokes: i32,
    pub minimum_wpm: f64,
    pub errors_coefficient_percent: f64,
    pub tutor_active_for_exercise: Option<bool>,
    pub keyboard_visible_for_exercise: Option<bool>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            lesson_text: None,
            category: None,
            lesson_number: None,
            exercise_number: None,
            cursor_position: CURSOR_NOT_STARTED,
            errors: 0,
            elapsed_seconds: 0,
            total_gross_keystrokes: 0,
            total_net_keystrokes: 0,
            minimum_wpm: DEFAULT_MINIMUM_WPM,
            errors_coefficient_percent: DEFAULT_ERRORS_COEFFICIENT,
            tutor_active_for_exercise: None,
            keyboard_visible_for_exercise: None,
        }
    }
}

impl SessionContext {
    /// Character at `index` in the lesson text. Total over the whole
    /// signed domain: a negative or past-the-end index yields `None`,
    /// which can never equal a pressed key.
    pub fn char_at(&self, index: i32) -> Option<char> {
        if index < 0 {
            return None;
        }
        self.lesson_text.as_ref()?.chars().nth(index as usize)
    }

    pub fn lesson_len(&self) -> i32 {
        self.lesson_text
            .as_ref()
            .map_or(0, |t| t.chars().count() as i32)
    }

    /// Entries typed so far; the `-1` sentinel counts as zero.
    pub fn typed_count(&self) -> u32 {
        self.cursor_position.max(0) as u32
    }
}

#[derive(Debug)]
pub struct SessionMachine {
    context: SessionContext,
    state: MachineState,
    tick: TickTimer,
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMachine {
    pub fn new() -> Self {
        Self {
            context: SessionContext::default(),
            state: MachineState::Default,
            tick: TickTimer::new(TICK_PERIOD),
        }
    }

    /// Process one event to completion. Events are expected in arrival
    /// order; there is no partial visibility of context mutations.
    pub fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::ExerciseSelected(selection) => self.select_exercise(selection),
            SessionEvent::KeyPressed(key) => self.key_pressed(&key),
            SessionEvent::Tick => self.tick_elapsed(),
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    pub fn progress_state(&self) -> Option<ProgressState> {
        match self.state {
            MachineState::Exercise { progress, .. } => Some(progress),
            MachineState::Default => None,
        }
    }

    pub fn timer_state(&self) -> Option<TimerState> {
        match self.state {
            MachineState::Exercise { timer, .. } => Some(timer),
            MachineState::Default => None,
        }
    }

    pub fn exercise_selected(&self) -> bool {
        matches!(self.state, MachineState::Exercise { .. })
    }

    pub fn is_finished(&self) -> bool {
        self.progress_state() == Some(ProgressState::Finished)
    }

    /// The pending one-second tick, read by the runtime to compute its
    /// receive timeout. Armed only while the timer region is ongoing.
    pub fn tick_timer(&self) -> &TickTimer {
        &self.tick
    }

    /// Selection is accepted from any state and unconditionally resets
    /// the session; any tick still pending from the previous exercise is
    /// superseded here.
    fn select_exercise(&mut self, selection: ExerciseSelection) {
        self.tick.cancel();

        let ctx = &mut self.context;
        ctx.lesson_text = Some(selection.lesson_text);
        ctx.category = Some(selection.category);
        ctx.lesson_number = selection.lesson_number;
        ctx.exercise_number = Some(selection.exercise_number);
        ctx.tutor_active_for_exercise = Some(selection.tutor_active);
        ctx.keyboard_visible_for_exercise = Some(selection.keyboard_visible);
        ctx.minimum_wpm = selection.minimum_speed;
        ctx.errors_coefficient_percent = selection
            .errors_coefficient
            .unwrap_or(DEFAULT_ERRORS_COEFFICIENT);

        ctx.cursor_position = CURSOR_NOT_STARTED;
        ctx.errors = 0;
        ctx.elapsed_seconds = 0;
        ctx.total_gross_keystrokes = 0;
        ctx.total_net_keystrokes = 0;

        self.state = MachineState::Exercise {
            progress: ProgressState::NotStarted,
            timer: TimerState::Off,
        };
    }

    /// Deliver one keystroke to both regions. Guards are evaluated
    /// against the pre-transition context, so the "correct and at last
    /// letter" predicate finishes the progress region and stops the timer
    /// region within the same step.
    fn key_pressed(&mut self, key: &KeyInput) {
        let MachineState::Exercise { progress, timer } = self.state else {
            // No exercise selected; keystrokes are silently ignored.
            return;
        };

        let enter = guards::enter_was_pressed(key);
        let correct = guards::pressed_correct_letter(&self.context, key);
        let correct_at_last = guards::pressed_correct_letter_at_last_letter(&self.context, key);

        let progress = match progress {
            ProgressState::NotStarted if enter => {
                self.context.cursor_position = CURSOR_FIRST_LETTER;
                ProgressState::Ongoing
            }
            ProgressState::Ongoing => {
                // First matching guard wins; the error branch is the
                // unconditional default, not a failure path.
                if correct_at_last {
                    self.context.cursor_position += 1;
                    self.recompute_keystrokes();
                    ProgressState::Finished
                } else if correct {
                    self.context.cursor_position += 1;
                    self.recompute_keystrokes();
                    ProgressState::Ongoing
                } else {
                    self.context.errors += 1;
                    self.recompute_keystrokes();
                    ProgressState::Ongoing
                }
            }
            unchanged => unchanged,
        };

        let timer = match timer {
            TimerState::Off if enter => {
                self.tick.arm();
                TimerState::Ongoing
            }
            TimerState::Ongoing if correct_at_last => {
                self.tick.cancel();
                TimerState::Stopped
            }
            unchanged => unchanged,
        };

        self.state = MachineState::Exercise { progress, timer };
    }

    /// Count one elapsed second and reschedule the tick. Ticks arriving
    /// in any other state are stale and ignored.
    fn tick_elapsed(&mut self) {
        if let MachineState::Exercise {
            timer: TimerState::Ongoing,
            ..
        } = self.state
        {
            self.context.elapsed_seconds += 1;
            self.tick.rearm();
        }
    }

    fn recompute_keystrokes(&mut self) {
        let typed = self.context.cursor_position;
        let errors = self.context.errors as i32;
        self.context.total_net_keystrokes = metrics::net_keystrokes(typed, errors);
        self.context.total_gross_keystrokes = metrics::gross_keystrokes(typed, errors);
    }
}
