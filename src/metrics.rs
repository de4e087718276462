//! Keystroke and speed metrics derived from the session counters.

/// Keystrokes credited to the learner: entries typed minus errors.
pub fn net_keystrokes(typed: i32, errors: i32) -> i32 {
    typed - errors
}

/// All keystrokes performed: entries typed plus errors.
pub fn gross_keystrokes(typed: i32, errors: i32) -> i32 {
    typed + errors
}

/// Net words-per-minute over the elapsed time, clamped at zero. `None`
/// before the first second or the first typed entry, so the display can
/// stay blank instead of showing division artifacts.
pub fn net_wpm(typed: u32, elapsed_seconds: u32, errors: u32) -> Option<u32> {
    if typed == 0 || elapsed_seconds == 0 {
        return None;
    }
    let minutes = elapsed_seconds as f64 / 60.0;
    let wpm = (typed as f64 / 5.0 - errors as f64) / minutes;
    Some(wpm.round().max(0.0) as u32)
}

/// Errors as a percentage of typed entries; `None` when nothing has been
/// typed yet.
pub fn error_percentage(errors: u32, typed: u32) -> Option<f64> {
    if typed == 0 {
        return None;
    }
    Some(errors as f64 / typed as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_and_gross_keystrokes() {
        assert_eq!(net_keystrokes(10, 3), 7);
        assert_eq!(gross_keystrokes(10, 3), 13);
        assert_eq!(net_keystrokes(0, 0), 0);
        assert_eq!(gross_keystrokes(0, 0), 0);
    }

    #[test]
    fn net_can_go_negative_when_errors_dominate() {
        assert_eq!(net_keystrokes(2, 5), -3);
    }

    #[test]
    fn wpm_undefined_before_first_second_or_entry() {
        assert_eq!(net_wpm(0, 10, 0), None);
        assert_eq!(net_wpm(10, 0, 0), None);
        assert_eq!(net_wpm(0, 0, 0), None);
    }

    #[test]
    fn wpm_basic_rate() {
        // 300 entries in 60s with no errors: 60 words/minute
        assert_eq!(net_wpm(300, 60, 0), Some(60));
        // 25 entries in 60s: 5 words/minute
        assert_eq!(net_wpm(25, 60, 0), Some(5));
    }

    #[test]
    fn wpm_subtracts_one_word_per_error() {
        assert_eq!(net_wpm(300, 60, 10), Some(50));
    }

    #[test]
    fn wpm_clamps_at_zero() {
        // More error-words than typed words
        assert_eq!(net_wpm(10, 60, 50), Some(0));
    }

    #[test]
    fn wpm_scales_with_elapsed_time() {
        // 50 entries in 30s = 10 words in half a minute = 20 wpm
        assert_eq!(net_wpm(50, 30, 0), Some(20));
    }

    #[test]
    fn wpm_rounds_to_nearest() {
        // 13 entries in 60s = 2.6 wpm -> 3
        assert_eq!(net_wpm(13, 60, 0), Some(3));
        // 12 entries in 60s = 2.4 wpm -> 2
        assert_eq!(net_wpm(12, 60, 0), Some(2));
    }

    #[test]
    fn error_percentage_blank_without_typed_entries() {
        assert_eq!(error_percentage(0, 0), None);
        assert_eq!(error_percentage(5, 0), None);
    }

    #[test]
    fn error_percentage_of_typed() {
        assert_eq!(error_percentage(1, 4), Some(25.0));
        assert_eq!(error_percentage(0, 4), Some(0.0));
        // Errors don't advance the cursor, so the ratio can exceed 100%
        assert_eq!(error_percentage(6, 4), Some(150.0));
    }
}
