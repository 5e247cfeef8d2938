use crate::constants::{MAX_COINS, QUEEN_BONUS, QUEEN_THRESHOLD};
use crate::types::{BoardInput, BoardScore};

/// Scores one board for the winning team.
///
/// `winner_current_total` is the winner's total *before* this board; the
/// queen only counts while it is at or below 21.
pub fn score_board(input: &BoardInput, winner_current_total: u32) -> BoardScore {
    let queen_allowed = winner_current_total <= QUEEN_THRESHOLD;
    let queen_counted = input.queen_claimed && queen_allowed;
    let coins = input.opponent_coins_left.min(MAX_COINS);
    let bonus = if queen_counted { QUEEN_BONUS } else { 0 };

    BoardScore {
        points: bonus + u32::from(coins),
        queen_allowed,
        queen_counted,
        coins,
    }
}

/// Normalises free-text coin input to `0..=9`.
///
/// Leading whitespace and an optional sign are accepted, then the leading
/// run of digits is read (`"7abc"` is 7, `"4.9"` is 4). Text with no digits
/// counts as 0; never an error.
pub fn parse_coins(raw: &str) -> u8 {
    let text = raw.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        seen_digit = true;
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }

    if !seen_digit {
        return 0;
    }
    clamp_coins(if negative { -value } else { value })
}

pub fn clamp_coins(value: i64) -> u8 {
    // Lossless: the clamp bounds the value to 0..=9.
    value.clamp(0, i64::from(MAX_COINS)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TeamSide;

    #[test]
    fn queen_counts_at_threshold_and_not_above() {
        let input = BoardInput::new(TeamSide::A, true, 4);

        let at = score_board(&input, 21);
        let above = score_board(&input, 22);

        assert!(at.queen_allowed && at.queen_counted);
        assert_eq!(at.points, 7);
        assert!(!above.queen_allowed && !above.queen_counted);
        assert_eq!(above.points, 4);
    }

    #[test]
    fn unclaimed_queen_is_allowed_but_not_counted() {
        let score = score_board(&BoardInput::new(TeamSide::B, false, 3), 0);

        assert!(score.queen_allowed);
        assert!(!score.queen_counted);
        assert_eq!(score.points, 3);
    }

    #[test]
    fn coins_are_capped_at_nine() {
        let score = score_board(&BoardInput::new(TeamSide::A, true, 40), 5);

        assert_eq!(score.coins, 9);
        assert_eq!(score.points, 12);
    }

    #[test]
    fn parse_coins_clamps_and_defaults_to_zero() {
        assert_eq!(parse_coins("-5"), 0);
        assert_eq!(parse_coins("abc"), 0);
        assert_eq!(parse_coins("15"), 9);
        assert_eq!(parse_coins(""), 0);
        assert_eq!(parse_coins("  6"), 6);
        assert_eq!(parse_coins("7abc"), 7);
        assert_eq!(parse_coins("4.9"), 4);
        assert_eq!(parse_coins("+3"), 3);
        assert_eq!(parse_coins("99999999999999999999999"), 9);
    }

    #[test]
    fn clamp_coins_bounds_both_ends() {
        assert_eq!(clamp_coins(-1), 0);
        assert_eq!(clamp_coins(0), 0);
        assert_eq!(clamp_coins(9), 9);
        assert_eq!(clamp_coins(10), 9);
    }
}
