//! Tests for the heuristic opponent.

use strictly_turtle::{
    Board, Player, Position, Reason, Square, StrategyError, choose_move, choose_with_reason,
};

fn board(pattern: &str) -> Board {
    Board::from_pattern(pattern).unwrap()
}

#[test]
fn test_blocks_open_top_row() {
    let b = board("XX_ _O_ ___");
    assert_eq!(choose_move(&b, Player::O, Player::X), Ok(Position::TopRight));
}

#[test]
fn test_takes_center_on_empty_board() {
    assert_eq!(
        choose_with_reason(&Board::new(), Player::O, Player::X),
        Ok((Position::Center, Reason::Center))
    );
}

#[test]
fn test_own_win_before_block() {
    // O can finish the middle column; X threatens the left column.
    let b = board("XO_ XO_ ___");
    assert_eq!(
        choose_with_reason(&b, Player::O, Player::X),
        Ok((Position::BottomCenter, Reason::Win))
    );
}

#[test]
fn test_input_board_untouched() {
    let b = board("XX_ _O_ ___");
    let copy = b;
    choose_move(&b, Player::O, Player::X).unwrap();
    assert_eq!(b, copy);
}

#[test]
fn test_full_board_has_no_move() {
    let b = board("XOX XOO OXX");
    assert_eq!(
        choose_move(&b, Player::O, Player::X),
        Err(StrategyError::NoMoveAvailable)
    );
}

/// Walks every position reachable in play with O to move and checks the
/// priority rules hold on each.
#[test]
fn test_priorities_hold_on_every_reachable_position() {
    fn walk(b: Board, to_move: Player, checked: &mut usize) {
        if b.winner().is_some() || b.is_full() {
            return;
        }
        if to_move == Player::O {
            check(&b);
            *checked += 1;
        }
        for pos in Position::valid_moves(&b) {
            walk(b.with_mark(pos, to_move), to_move.opponent(), checked);
        }
    }

    fn check(b: &Board) {
        let (pos, reason) = choose_with_reason(b, Player::O, Player::X).unwrap();
        assert_eq!(b.get(pos), Square::Empty, "chose occupied {pos} on\n{}", b.display());

        let wins = |p: Player| {
            Position::valid_moves(b)
                .into_iter()
                .any(|q| b.with_mark(q, p).winner() == Some(p))
        };
        if wins(Player::O) {
            assert_eq!(reason, Reason::Win);
            assert_eq!(b.with_mark(pos, Player::O).winner(), Some(Player::O));
        } else if wins(Player::X) {
            assert_eq!(reason, Reason::Block);
            assert_eq!(b.with_mark(pos, Player::X).winner(), Some(Player::X));
        }
    }

    let mut checked = 0;
    walk(Board::new(), Player::X, &mut checked);
    assert!(checked > 1000, "only {checked} positions checked");
}
