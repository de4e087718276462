//! Guard predicates for the session machine. Pure functions over the
//! context and the incoming keystroke; no side effects.

use crate::machine::{KeyInput, SessionContext};

pub fn enter_was_pressed(key: &KeyInput) -> bool {
    matches!(key, KeyInput::Enter)
}

/// The pressed key matches the character under the cursor. Out-of-range
/// cursor positions (including the not-started sentinel) compare against
/// "no character" and therefore never match.
pub fn pressed_correct_letter(context: &SessionContext, key: &KeyInput) -> bool {
    match key {
        KeyInput::Char(c) => context.char_at(context.cursor_position) == Some(*c),
        KeyInput::Enter => false,
    }
}

pub fn pressed_correct_letter_at_last_letter(context: &SessionContext, key: &KeyInput) -> bool {
    pressed_correct_letter(context, key)
        && context.cursor_position == context.lesson_len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_with(text: &str, cursor: i32) -> SessionContext {
        SessionContext {
            lesson_text: Some(text.to_string()),
            cursor_position: cursor,
            ..SessionContext::default()
        }
    }

    #[test]
    fn enter_predicate_matches_only_enter() {
        assert!(enter_was_pressed(&KeyInput::Enter));
        assert!(!enter_was_pressed(&KeyInput::Char('a')));
        assert!(!enter_was_pressed(&KeyInput::Char('\n')));
    }

    #[test]
    fn correct_letter_at_cursor() {
        let ctx = context_with("cat", 1);
        assert!(pressed_correct_letter(&ctx, &KeyInput::Char('a')));
        assert!(!pressed_correct_letter(&ctx, &KeyInput::Char('c')));
        assert!(!pressed_correct_letter(&ctx, &KeyInput::Enter));
    }

    #[test]
    fn out_of_range_cursor_never_matches() {
        let not_started = context_with("cat", -1);
        assert!(!pressed_correct_letter(&not_started, &KeyInput::Char('c')));

        let past_end = context_with("cat", 3);
        assert!(!pressed_correct_letter(&past_end, &KeyInput::Char('t')));
    }

    #[test]
    fn no_lesson_text_never_matches() {
        let ctx = SessionContext::default();
        assert!(!pressed_correct_letter(&ctx, &KeyInput::Char('a')));
        assert!(!pressed_correct_letter_at_last_letter(&ctx, &KeyInput::Char('a')));
    }

    #[test]
    fn last_letter_predicate_requires_both_conditions() {
        let at_last = context_with("cat", 2);
        assert!(pressed_correct_letter_at_last_letter(&at_last, &KeyInput::Char('t')));
        assert!(!pressed_correct_letter_at_last_letter(&at_last, &KeyInput::Char('x')));

        let not_last = context_with("cat", 1);
        assert!(!pressed_correct_letter_at_last_letter(&not_last, &KeyInput::Char('a')));
    }

    #[test]
    fn multibyte_text_compares_by_char_not_byte() {
        let ctx = context_with("año", 1);
        assert!(pressed_correct_letter(&ctx, &KeyInput::Char('ñ')));

        let last = context_with("año", 2);
        assert!(pressed_correct_letter_at_last_letter(&last, &KeyInput::Char('o')));
    }
}
