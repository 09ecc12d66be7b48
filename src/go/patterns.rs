//! 3x3 pattern matching for move heuristics.
//!
//! The 8 neighbors of a point are encoded into a 16-bit `env8` code, which
//! indexes an 8192-byte bitfield. Each source pattern is expanded over all
//! rotations, reflections and color swaps, and over its wildcards.
//!
//! Colors are absolute (White, Black, empty, off-board); since every pattern
//! is also stored color-swapped, the table does not depend on the side to move.

use std::sync::OnceLock;

use super::board::{Cell, GoBoard, Point};
use crate::game::Color;

/// Each pattern is a 9-character string representing a 3x3 grid
/// (row by row, the candidate point in the middle):
/// - X: one side, O: the other
/// - .: empty
/// - x: not X (i.e., O or . or #)
/// - o: not O (i.e., X or . or #)
/// - ?: any (X, O, ., or #)
/// - #: edge of board (out of bounds)
const PAT3_SRC: &[&str] = &[
    // hane pattern - enclosing hane
    "XOX...???",
    // hane pattern - non-cutting hane
    "XO....?.?",
    // hane pattern - magari
    "XO?X..x.?",
    // generic pattern - katatsuke or diagonal attachment
    ".O.X.....",
    // cut1 pattern (kiri) - unprotected cut
    "XO?O.o?o?",
    // cut1 pattern (kiri) - peeped cut
    "XO?O.X???",
    // cut2 pattern (de)
    "?X?O.Oooo",
    // cut keima
    "OX?o.O???",
    // side pattern - chase
    "X.?O.?##?",
    // side pattern - block side cut
    "OX?X.O###",
    // side pattern - block side connection
    "?X?x.O###",
    // side pattern - sagari
    "?XOx.x###",
    // side pattern - cut
    "?OXX.O###",
];

const PAT3_BYTES: usize = 8192;

static PAT3SET: OnceLock<[u8; PAT3_BYTES]> = OnceLock::new();

/// Check if a point matches any 3x3 pattern.
#[inline]
pub fn pat3_match(board: &GoBoard, pt: Point) -> bool {
    let pat3set = PAT3SET.get_or_init(make_pat3set);
    let env8 = env8(board, pt);
    pat3set[(env8 >> 3) as usize] & (1 << (env8 & 7)) != 0
}

/// Encode the 8 neighbors of `pt`.
///
/// Low byte: orthogonal neighbors N, E, S, W.
/// High byte: diagonal neighbors NE, SE, SW, NW.
pub fn env8(board: &GoBoard, pt: Point) -> u16 {
    let [n, e, s, w] = board.neighbors(pt);
    let [ne, se, sw, nw] = board.diagonal_neighbors(pt);
    let cell = |p| cell_code(board.cell(p));

    let mut env8 = 0;
    for (i, p) in [n, e, s, w].into_iter().enumerate() {
        env8 |= code(cell(p), i as u8);
    }
    for (i, p) in [ne, se, sw, nw].into_iter().enumerate() {
        env8 |= code(cell(p), i as u8) << 8;
    }
    env8
}

fn cell_code(cell: Cell) -> u16 {
    match cell {
        Cell::Stone(Color::White) => 0,
        Cell::Stone(Color::Black) => 1,
        Cell::Empty => 2,
        Cell::Off => 3,
    }
}

fn char_code(c: u8) -> u16 {
    match c {
        b'O' => 0,
        b'X' => 1,
        b'.' => 2,
        _ => 3,
    }
}

/// Place a 2-bit color code at bits `p` and `p + 4`.
#[inline]
fn code(c: u16, p: u8) -> u16 {
    let hi = (c >> 1) & 1;
    let lo = c & 1;
    ((hi << 4) | lo) << p
}

fn make_pat3set() -> [u8; PAT3_BYTES] {
    let mut pat3set = [0u8; PAT3_BYTES];
    for pat_src in PAT3_SRC {
        let mut src = [0u8; 9];
        src.copy_from_slice(pat_src.as_bytes());
        pat_enumerate(src, &mut pat3set);
    }
    pat3set
}

/// Enumerate all rotations, reflections, and color swaps of a pattern.
fn pat_enumerate(src: [u8; 9], pat3set: &mut [u8; PAT3_BYTES]) {
    for rotated in [src, rot90(src)] {
        for v in [rotated, vertflip(rotated)] {
            for h in [v, horizflip(v)] {
                pat_wildexp(h, 0, pat3set);
                pat_wildexp(swapcolor(h), 0, pat3set);
            }
        }
    }
}

/// Expand wildcards and add all matching patterns to the set.
fn pat_wildexp(src: [u8; 9], i: usize, pat3set: &mut [u8; PAT3_BYTES]) {
    if i == 9 {
        let env8 = compute_code(&src);
        pat3set[(env8 >> 3) as usize] |= 1 << (env8 & 7);
        return;
    }

    let expansions: &[u8] = match src[i] {
        b'?' => b"XO.#",
        b'x' => b"O.#",
        b'o' => b"X.#",
        _ => return pat_wildexp(src, i + 1, pat3set),
    };
    for &c in expansions {
        let mut next = src;
        next[i] = c;
        pat_wildexp(next, i + 1, pat3set);
    }
}

/// Compute the 16-bit env8 code from a 9-character pattern string.
///
/// ```text
/// 0 1 2     bits: 7 0 4
/// 3 4 5  ->       3 . 1
/// 6 7 8           6 2 5
/// ```
fn compute_code(src: &[u8; 9]) -> u16 {
    let mut env8 = 0;
    env8 |= code(char_code(src[1]), 0);
    env8 |= code(char_code(src[5]), 1);
    env8 |= code(char_code(src[7]), 2);
    env8 |= code(char_code(src[3]), 3);

    env8 |= code(char_code(src[2]), 0) << 8;
    env8 |= code(char_code(src[8]), 1) << 8;
    env8 |= code(char_code(src[6]), 2) << 8;
    env8 |= code(char_code(src[0]), 3) << 8;
    env8
}

fn swapcolor(mut src: [u8; 9]) -> [u8; 9] {
    for c in src.iter_mut() {
        *c = match *c {
            b'X' => b'O',
            b'O' => b'X',
            b'x' => b'o',
            b'o' => b'x',
            other => other,
        };
    }
    src
}

fn horizflip(mut src: [u8; 9]) -> [u8; 9] {
    src.swap(0, 6);
    src.swap(1, 7);
    src.swap(2, 8);
    src
}

fn vertflip(mut src: [u8; 9]) -> [u8; 9] {
    src.swap(0, 2);
    src.swap(3, 5);
    src.swap(6, 8);
    src
}

fn rot90(src: [u8; 9]) -> [u8; 9] {
    [
        src[2], src[5], src[8], //
        src[1], src[4], src[7], //
        src[0], src[3], src[6],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(moves: &[&str]) -> GoBoard {
        let mut board = GoBoard::new(9);
        for mv in moves {
            board.play_move(board.parse_coord(mv).unwrap()).unwrap();
        }
        board
    }

    #[test]
    fn test_make_pat3set() {
        let pat3set = make_pat3set();
        let count: usize = pat3set.iter().map(|b| b.count_ones() as usize).sum();
        assert!(count > 1000, "Expected many pattern matches, got {count}");
    }

    #[test]
    fn test_compute_code_empty() {
        // All EMPTY (2) = bits 4..8 set in each byte
        assert_eq!(compute_code(b"........."), 0xF0F0);
        let board = GoBoard::new(9);
        assert_eq!(env8(&board, board.parse_coord("E5").unwrap()), 0xF0F0);
    }

    #[test]
    fn test_board_code_matches_pattern_code() {
        // Black C5, E5 around D5 with White on D6
        let board = setup(&["C5", "D6", "E5"]);
        let d5 = board.parse_coord("D5").unwrap();
        assert_eq!(env8(&board, d5), compute_code(b".O.X.X..."));
    }

    #[test]
    fn test_rot90_cycles() {
        let src = *b"abcdefghi";
        let once = rot90(src);
        assert_ne!(once, src);
        assert_eq!(rot90(rot90(rot90(once))), src);
    }

    #[test]
    fn test_pat3_match_cut() {
        // X O X around an empty point with empty below: a cut2 shape
        let board = setup(&["C5", "D6", "E5"]);
        assert!(pat3_match(&board, board.parse_coord("D5").unwrap()));
    }

    #[test]
    fn test_pat3_no_match_on_empty_board() {
        let board = GoBoard::new(9);
        assert!(!pat3_match(&board, board.parse_coord("E5").unwrap()));
    }
}
