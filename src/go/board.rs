//! Go board representation and move execution.
//!
//! The board uses a 1D array with padding: each row is preceded by one
//! off-board cell, and there is a padding row above and below. A point's
//! orthogonal neighbors are at `±1` and `±stride`, where `stride = size + 1`.
//! Index 0 is padding and doubles as the pass move.
//!
//! Positions are fingerprinted with Zobrist hashing over stones, side to
//! move, ko point and the number of consecutive passes. Only simple ko is
//! enforced; long cycles are cut off by the game-length limit.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::constants::{DEFAULT_KOMI, MAX_BOARD_SIZE, MAX_GAME_LEN_FACTOR};
use crate::game::{Board, Color, Fingerprint, Move};

/// A point on the board, represented as an index into the 1D board array.
pub type Point = usize;

/// Pass move marker (index 0 is padding, so safe to use).
pub const PASS: Point = 0;

/// Why a move was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IllegalMove {
    #[error("point is off the board")]
    OffBoard,
    #[error("point not EMPTY")]
    Occupied,
    #[error("retakes ko")]
    Ko,
    #[error("suicide")]
    Suicide,
}

/// Contents of one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Stone(Color),
    Off,
}

/// Random keys for Zobrist hashing, shared by all clones of a board.
#[derive(Debug)]
struct ZobristKeys {
    stones: Vec<[u64; 2]>,
    ko: Vec<u64>,
    white_to_play: u64,
    passes: [u64; 3],
}

impl ZobristKeys {
    fn new(len: usize) -> Self {
        // Deterministic so fingerprints are reproducible across runs
        let mut rng = fastrand::Rng::with_seed(0x5EED_0F_7E46E4 ^ len as u64);
        Self {
            stones: (0..len).map(|_| [rng.u64(..), rng.u64(..)]).collect(),
            ko: (0..len).map(|_| rng.u64(..)).collect(),
            white_to_play: rng.u64(..),
            passes: [0, rng.u64(..), rng.u64(..)],
        }
    }
}

/// A Go position.
#[derive(Clone)]
pub struct GoBoard {
    size: usize,
    stride: usize,
    cells: Vec<Cell>,
    to_play: Color,
    /// Ko point (0 if no ko)
    ko: Point,
    /// Moves played so far, passes included
    turn: usize,
    passes: u32,
    /// Last move played
    last: Point,
    /// Second-to-last move
    last2: Point,
    /// Stones on the board, indexed by color
    stones: [usize; 2],
    /// Komi (compensation points for White)
    komi: f32,
    hash: u64,
    keys: Arc<ZobristKeys>,
}

impl Default for GoBoard {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_BOARD_SIZE)
    }
}

impl GoBoard {
    /// Create an empty `size` x `size` board with the default komi.
    ///
    /// # Panics
    ///
    /// Panics if `size` is outside `2..=19`; use [`GoBoard::try_new`] for
    /// untrusted input.
    pub fn new(size: usize) -> Self {
        match Self::try_new(size) {
            Some(board) => board,
            None => panic!("unsupported board size {size}"),
        }
    }

    /// Create an empty board, or `None` if `size` is outside `2..=19`.
    pub fn try_new(size: usize) -> Option<Self> {
        if !(2..=MAX_BOARD_SIZE).contains(&size) {
            return None;
        }
        let stride = size + 1;
        let len = (size + 1) * (size + 2) + 1;
        let mut cells = vec![Cell::Off; len];
        for row in 1..=size {
            for col in 1..=size {
                cells[row * stride + col] = Cell::Empty;
            }
        }
        Some(Self {
            size,
            stride,
            cells,
            to_play: Color::Black,
            ko: 0,
            turn: 0,
            passes: 0,
            last: PASS,
            last2: PASS,
            stones: [0, 0],
            komi: DEFAULT_KOMI,
            hash: 0,
            keys: Arc::new(ZobristKeys::new(len)),
        })
    }

    /// Builder pattern: set komi.
    pub fn with_komi(mut self, komi: f32) -> Self {
        self.komi = komi;
        self
    }

    /// Reset to the initial empty board, keeping size and komi.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            if let Cell::Stone(_) = cell {
                *cell = Cell::Empty;
            }
        }
        self.to_play = Color::Black;
        self.ko = 0;
        self.turn = 0;
        self.passes = 0;
        self.last = PASS;
        self.last2 = PASS;
        self.stones = [0, 0];
        self.hash = 0;
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn komi(&self) -> f32 {
        self.komi
    }

    pub fn set_komi(&mut self, komi: f32) {
        self.komi = komi;
    }

    #[inline]
    pub fn to_play(&self) -> Color {
        self.to_play
    }

    /// Hand the move to `color` without playing anything.
    ///
    /// A ko point only binds the side that was to move, so it is lifted when
    /// the side changes.
    pub fn set_to_play(&mut self, color: Color) {
        if self.to_play != color {
            self.to_play = color;
            self.ko = 0;
        }
    }

    #[inline]
    pub fn ko(&self) -> Point {
        self.ko
    }

    #[inline]
    pub fn last_move(&self) -> Point {
        self.last
    }

    #[inline]
    pub fn last_move2(&self) -> Point {
        self.last2
    }

    #[inline]
    pub fn stones(&self, color: Color) -> usize {
        self.stones[color.index()]
    }

    #[inline]
    pub fn cell(&self, pt: Point) -> Cell {
        self.cells.get(pt).copied().unwrap_or(Cell::Off)
    }

    /// Stone color at `pt`, if any.
    #[inline]
    pub fn color_at(&self, pt: Point) -> Option<Color> {
        match self.cell(pt) {
            Cell::Stone(c) => Some(c),
            _ => None,
        }
    }

    /// All on-board points, in index order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (1..=self.size).flat_map(move |row| (1..=self.size).map(move |col| row * self.stride + col))
    }

    /// Get the 4 orthogonal neighbors (N, E, S, W) of a point.
    #[inline]
    pub fn neighbors(&self, pt: Point) -> [Point; 4] {
        [pt - self.stride, pt + 1, pt + self.stride, pt - 1]
    }

    /// Get the 4 diagonal neighbors (NE, SE, SW, NW) of a point.
    #[inline]
    pub fn diagonal_neighbors(&self, pt: Point) -> [Point; 4] {
        [
            pt - self.stride + 1,
            pt + self.stride + 1,
            pt + self.stride - 1,
            pt - self.stride - 1,
        ]
    }

    /// Get all 8 neighbors (4 orthogonal + 4 diagonal) of a point.
    #[inline]
    pub fn all_neighbors(&self, pt: Point) -> [Point; 8] {
        let [n, e, s, w] = self.neighbors(pt);
        let [ne, se, sw, nw] = self.diagonal_neighbors(pt);
        [n, e, s, w, ne, se, sw, nw]
    }

    #[inline]
    fn on_board(&self, pt: Point) -> bool {
        pt > PASS && self.cell(pt) != Cell::Off
    }

    /// Check if a point is "eyeish" (surrounded by stones of one color).
    ///
    /// Returns the color of the surrounding stones. May be a false eye.
    pub fn is_eyeish(&self, pt: Point) -> Option<Color> {
        let mut eyecolor = None;
        for n in self.neighbors(pt) {
            match self.cell(n) {
                Cell::Off => continue,
                Cell::Empty => return None,
                Cell::Stone(c) => match eyecolor {
                    None => eyecolor = Some(c),
                    Some(e) if e != c => return None,
                    Some(_) => {}
                },
            }
        }
        eyecolor
    }

    /// Check if a point is a true eye.
    ///
    /// A true eye is eyeish and has at most one diagonal occupied by the
    /// opponent at the edge, none in the center.
    pub fn is_eye(&self, pt: Point) -> Option<Color> {
        let eyecolor = self.is_eyeish(pt)?;
        let falsecolor = eyecolor.opposite();
        let mut at_edge = false;
        let mut false_count = 0;

        for d in self.diagonal_neighbors(pt) {
            match self.cell(d) {
                Cell::Off => at_edge = true,
                Cell::Stone(c) if c == falsecolor => false_count += 1,
                _ => {}
            }
        }

        let tolerance = if at_edge { 1 } else { 0 };
        (false_count <= tolerance).then_some(eyecolor)
    }

    /// Collect all stones in the group at `start`, appending them to `out`.
    fn collect_group(&self, start: Point, out: &mut Vec<Point>) -> usize {
        let Cell::Stone(color) = self.cell(start) else {
            return 0;
        };
        let mut stack = vec![start];
        let mut visited = vec![false; self.cells.len()];
        let mut count = 0;

        while let Some(pt) = stack.pop() {
            if visited[pt] {
                continue;
            }
            visited[pt] = true;
            out.push(pt);
            count += 1;
            for n in self.neighbors(pt) {
                if !visited[n] && self.cell(n) == Cell::Stone(color) {
                    stack.push(n);
                }
            }
        }
        count
    }

    /// Liberties of the group at `start`, stopping once `limit` are found.
    fn liberties_up_to(&self, start: Point, limit: usize, out: &mut Vec<Point>) {
        let Cell::Stone(color) = self.cell(start) else {
            return;
        };
        let mut stack = vec![start];
        let mut visited = vec![false; self.cells.len()];

        while let Some(pt) = stack.pop() {
            if visited[pt] {
                continue;
            }
            visited[pt] = true;
            for n in self.neighbors(pt) {
                match self.cell(n) {
                    Cell::Empty if !visited[n] => {
                        visited[n] = true;
                        out.push(n);
                        if out.len() >= limit {
                            return;
                        }
                    }
                    Cell::Stone(c) if c == color && !visited[n] => stack.push(n),
                    _ => {}
                }
            }
        }
    }

    /// Count the liberties of the group at `pt`, up to `limit`.
    pub fn group_liberties(&self, pt: Point, limit: usize) -> usize {
        let mut libs = Vec::new();
        self.liberties_up_to(pt, limit, &mut libs);
        libs.len()
    }

    /// The single liberty of the group at `pt`, if it is in atari.
    pub fn atari_liberty(&self, pt: Point) -> Option<Point> {
        let mut libs = Vec::with_capacity(2);
        self.liberties_up_to(pt, 2, &mut libs);
        match libs.as_slice() {
            [lib] => Some(*lib),
            _ => None,
        }
    }

    /// Whether the side to move may play `pt`.
    pub fn is_legal(&self, pt: Point) -> bool {
        if pt == PASS {
            return true;
        }
        if !self.on_board(pt) || self.cell(pt) != Cell::Empty || pt == self.ko {
            return false;
        }
        let me = self.to_play;
        let neighbors = self.neighbors(pt);
        if neighbors.iter().any(|&n| self.cell(n) == Cell::Empty) {
            return true;
        }
        neighbors.iter().any(|&n| match self.cell(n) {
            // Connects to a group that keeps another liberty
            Cell::Stone(c) if c == me => self.group_liberties(n, 2) > 1,
            // Captures
            Cell::Stone(_) => self.group_liberties(n, 2) == 1,
            _ => false,
        })
    }

    /// Number of opponent stones playing `pt` would capture.
    pub fn capture_size(&self, pt: Point) -> usize {
        let opp = self.to_play.opposite();
        let mut captured = Vec::new();
        for n in self.neighbors(pt) {
            if self.cell(n) == Cell::Stone(opp)
                && !captured.contains(&n)
                && self.atari_liberty(n) == Some(pt)
            {
                self.collect_group(n, &mut captured);
            }
        }
        captured.len()
    }

    /// Whether playing `pt` leaves the new group in atari.
    pub fn is_self_atari(&self, pt: Point) -> bool {
        if pt == PASS {
            return false;
        }
        let mut after = self.clone();
        if after.play_move(pt).is_err() {
            return false;
        }
        after.group_liberties(pt, 2) == 1
    }

    #[inline]
    fn toggle_stone(&mut self, pt: Point, color: Color) {
        self.hash ^= self.keys.stones[pt][color.index()];
    }

    /// Play a move for the side to move.
    pub fn play_move(&mut self, pt: Point) -> Result<(), IllegalMove> {
        if pt == PASS {
            self.pass_move();
            return Ok(());
        }
        if !self.on_board(pt) {
            return Err(IllegalMove::OffBoard);
        }
        if self.cell(pt) != Cell::Empty {
            return Err(IllegalMove::Occupied);
        }
        if pt == self.ko {
            return Err(IllegalMove::Ko);
        }

        let me = self.to_play;
        let opp = me.opposite();
        let in_enemy_eye = self.is_eyeish(pt) == Some(opp);

        self.cells[pt] = Cell::Stone(me);
        self.toggle_stone(pt, me);
        self.stones[me.index()] += 1;

        let mut captured = Vec::new();
        let mut capture_point = 0;
        for n in self.neighbors(pt) {
            if self.cell(n) == Cell::Stone(opp) && self.group_liberties(n, 1) == 0 {
                let start = captured.len();
                self.collect_group(n, &mut captured);
                for &r in &captured[start..] {
                    self.cells[r] = Cell::Empty;
                }
                capture_point = n;
            }
        }
        for &r in &captured {
            self.toggle_stone(r, opp);
        }
        self.stones[opp.index()] -= captured.len();

        if captured.is_empty() && self.group_liberties(pt, 1) == 0 {
            self.cells[pt] = Cell::Empty;
            self.toggle_stone(pt, me);
            self.stones[me.index()] -= 1;
            return Err(IllegalMove::Suicide);
        }

        // Ko if exactly one stone was captured by playing into an eye
        self.ko = if captured.len() == 1 && in_enemy_eye {
            capture_point
        } else {
            0
        };
        self.to_play = opp;
        self.turn += 1;
        self.passes = 0;
        self.last2 = self.last;
        self.last = pt;
        Ok(())
    }

    /// Execute a pass move.
    pub fn pass_move(&mut self) {
        self.to_play = self.to_play.opposite();
        self.ko = 0;
        self.turn += 1;
        self.passes += 1;
        self.last2 = self.last;
        self.last = PASS;
    }

    /// Area score from Black's perspective (komi included).
    ///
    /// Stones count for their owner; empty points surrounded by one color
    /// count for that color.
    pub fn score(&self) -> f32 {
        let mut s = -self.komi;
        for pt in self.points() {
            let owner = match self.cell(pt) {
                Cell::Stone(c) => Some(c),
                Cell::Empty => self.is_eyeish(pt),
                Cell::Off => None,
            };
            match owner {
                Some(Color::Black) => s += 1.0,
                Some(Color::White) => s -= 1.0,
                None => {}
            }
        }
        s
    }

    /// Compute CFG (Common Fate Graph) distances from a given point.
    ///
    /// Like Manhattan distance, except that stepping within a group of
    /// same-colored stones costs nothing. Unreached points are -1.
    pub fn cfg_distances(&self, start: Point) -> Vec<i8> {
        let mut cfg_map = vec![-1i8; self.cells.len()];
        if !self.on_board(start) {
            return cfg_map;
        }
        let mut queue = Vec::with_capacity(self.cells.len());
        cfg_map[start] = 0;
        queue.push(start);
        let mut head = 0;

        while head < queue.len() {
            let pt = queue[head];
            head += 1;

            for n in self.neighbors(pt) {
                let c = self.cell(n);
                if c == Cell::Off {
                    continue;
                }
                let old_dist = cfg_map[n];
                let new_dist = if c != Cell::Empty && c == self.cell(pt) {
                    cfg_map[pt]
                } else {
                    cfg_map[pt].saturating_add(1)
                };
                if old_dist < 0 || new_dist < old_dist {
                    cfg_map[n] = new_dist;
                    queue.push(n);
                }
            }
        }
        cfg_map
    }

    /// Return the line number (0-indexed) from nearest board edge.
    pub fn line_height(&self, pt: Point) -> usize {
        let row = pt / self.stride;
        let col = pt % self.stride;
        let row_dist = row.min(self.size + 1 - row);
        let col_dist = col.min(self.size + 1 - col);
        row_dist.min(col_dist).saturating_sub(1)
    }

    /// Check if there are no stones within Manhattan distance `dist` of point.
    pub fn empty_area(&self, pt: Point, dist: usize) -> bool {
        if dist == 0 {
            return true;
        }
        for n in self.all_neighbors(pt) {
            match self.cell(n) {
                Cell::Stone(_) => return false,
                Cell::Empty if dist > 1 && !self.empty_area(n, dist - 1) => return false,
                _ => {}
            }
        }
        true
    }

    /// Parse a coordinate string (e.g., "D4", "pass") into a Point.
    ///
    /// Columns use letters A-T skipping I; rows count from 1 at the bottom.
    /// Returns `None` for malformed or off-board coordinates.
    pub fn parse_coord(&self, s: &str) -> Option<Point> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("pass") {
            return Some(PASS);
        }
        let bytes = s.as_bytes();
        if bytes.len() < 2 {
            return None;
        }
        let col_char = bytes[0].to_ascii_uppercase();
        if !col_char.is_ascii_uppercase() || col_char == b'I' {
            return None;
        }
        let mut col = (col_char - b'A' + 1) as usize;
        // Skip 'I' column (Go convention to avoid confusion with 'J')
        if col_char > b'I' {
            col -= 1;
        }
        let row: usize = s[1..].parse().ok()?;
        if !(1..=self.size).contains(&col) || !(1..=self.size).contains(&row) {
            return None;
        }
        Some((self.size - row + 1) * self.stride + col)
    }

    /// Convert a Point to a coordinate string (e.g., "D4").
    pub fn str_coord(&self, pt: Point) -> String {
        if pt == PASS {
            return "pass".into();
        }
        let row = pt / self.stride;
        let col = pt % self.stride;
        let mut c = b'@' + col as u8;
        if c >= b'I' {
            c += 1;
        }
        format!("{}{}", c as char, self.size + 1 - row)
    }
}

impl Board for GoBoard {
    type Illegal = IllegalMove;

    fn copy_from(&mut self, other: &Self) {
        if self.cells.len() == other.cells.len() {
            self.cells.copy_from_slice(&other.cells);
            self.size = other.size;
            self.stride = other.stride;
            self.to_play = other.to_play;
            self.ko = other.ko;
            self.turn = other.turn;
            self.passes = other.passes;
            self.last = other.last;
            self.last2 = other.last2;
            self.stones = other.stones;
            self.komi = other.komi;
            self.hash = other.hash;
            if !Arc::ptr_eq(&self.keys, &other.keys) {
                self.keys = Arc::clone(&other.keys);
            }
        } else {
            *self = other.clone();
        }
    }

    fn play(&mut self, mv: Move) -> Result<(), IllegalMove> {
        self.play_move(mv)
    }

    fn fingerprint(&self) -> Fingerprint {
        let mut fp = self.hash ^ self.keys.passes[self.passes.min(2) as usize];
        if self.to_play == Color::White {
            fp ^= self.keys.white_to_play;
        }
        if self.ko != 0 {
            fp ^= self.keys.ko[self.ko];
        }
        fp
    }

    /// Legal moves that do not fill one of the mover's own true eyes, in
    /// point order, followed by pass.
    fn legal_moves(&self) -> Vec<Move> {
        let mut moves: Vec<Move> = self
            .points()
            .filter(|&pt| self.is_legal(pt) && self.is_eye(pt) != Some(self.to_play))
            .collect();
        moves.push(PASS);
        moves
    }

    fn is_terminal(&self) -> bool {
        self.passes >= 2
    }

    fn turn(&self) -> usize {
        self.turn
    }

    fn color_to_play(&self) -> Color {
        self.to_play
    }

    fn passes_in_a_row(&self) -> u32 {
        self.passes
    }

    fn pass(&self) -> Move {
        PASS
    }

    fn move_space(&self) -> usize {
        self.cells.len()
    }

    fn max_game_length(&self) -> usize {
        self.size * self.size * MAX_GAME_LEN_FACTOR
    }
}

impl fmt::Display for GoBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 1..=self.size {
            write!(f, "{:>2} ", self.size + 1 - row)?;
            for col in 1..=self.size {
                let ch = match self.cell(row * self.stride + col) {
                    Cell::Stone(Color::Black) => 'X',
                    Cell::Stone(Color::White) => 'O',
                    _ => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "   ")?;
        for col in 1..=self.size {
            write!(f, "{} ", self.str_coord(self.stride + col).chars().next().unwrap_or('?'))?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(size: usize, moves: &[&str]) -> GoBoard {
        let mut board = GoBoard::new(size);
        for mv in moves {
            let pt = board.parse_coord(mv).unwrap();
            board.play_move(pt).unwrap();
        }
        board
    }

    #[test]
    fn test_empty_board() {
        let board = GoBoard::new(9);
        assert_eq!(board.points().count(), 81);
        assert!(board.points().all(|pt| board.cell(pt) == Cell::Empty));
        assert_eq!(board.turn(), 0);
        assert_eq!(board.ko(), 0);
        assert_eq!(board.to_play(), Color::Black);
        // 81 points plus pass
        assert_eq!(board.legal_moves().len(), 82);
    }

    #[test]
    fn test_unsupported_sizes() {
        assert!(GoBoard::try_new(1).is_none());
        assert!(GoBoard::try_new(20).is_none());
        assert!(GoBoard::try_new(19).is_some());
    }

    #[test]
    fn test_parse_str_coord_roundtrip() {
        let board = GoBoard::new(13);
        for pt in board.points() {
            let s = board.str_coord(pt);
            assert_eq!(board.parse_coord(&s), Some(pt), "Failed roundtrip for {s}");
        }
        assert_eq!(board.parse_coord("pass"), Some(PASS));
        assert_eq!(board.parse_coord("I5"), None);
        assert_eq!(board.parse_coord("A14"), None);
        assert_eq!(board.parse_coord("Z1"), None);
    }

    #[test]
    fn test_neighbors_wrap_into_padding() {
        let board = GoBoard::new(5);
        let a1 = board.parse_coord("A1").unwrap();
        let off: Vec<_> = board
            .neighbors(a1)
            .into_iter()
            .filter(|&n| board.cell(n) == Cell::Off)
            .collect();
        assert_eq!(off.len(), 2);
    }

    #[test]
    fn test_play_move_basic() {
        let board = setup(9, &["D4"]);
        let pt = board.parse_coord("D4").unwrap();
        assert_eq!(board.color_at(pt), Some(Color::Black));
        assert_eq!(board.turn(), 1);
        assert_eq!(board.last_move(), pt);
        assert_eq!(board.to_play(), Color::White);
        assert_eq!(board.group_liberties(pt, 4), 4);
    }

    #[test]
    fn test_occupied_and_suicide() {
        // Black A2 and B1 surround the corner; White at A1 is suicide
        let mut board = setup(9, &["A2", "H8", "B1"]);
        let a1 = board.parse_coord("A1").unwrap();
        let a2 = board.parse_coord("A2").unwrap();
        assert_eq!(board.play_move(a2), Err(IllegalMove::Occupied));
        assert!(!board.is_legal(a1));
        let before = board.fingerprint();
        assert_eq!(board.play_move(a1), Err(IllegalMove::Suicide));
        assert_eq!(board.fingerprint(), before, "failed move must not change the position");
    }

    #[test]
    fn test_capture() {
        // White D4 is surrounded by C4, E4, D5, D3
        let mut board = setup(9, &["C4", "D4", "E4", "H8", "D5", "H9"]);
        let d4 = board.parse_coord("D4").unwrap();
        let d3 = board.parse_coord("D3").unwrap();
        assert_eq!(board.capture_size(d3), 1);
        board.play_move(d3).unwrap();
        assert_eq!(board.cell(d4), Cell::Empty);
        assert_eq!(board.stones(Color::White), 2);
        assert_eq!(board.stones(Color::Black), 4);
    }

    #[test]
    fn test_ko_rule() {
        //   . X O .
        //   X O . O
        //   . X O .
        let mut board = setup(9, &["D5", "E5", "C4", "F4", "D3", "E3", "H9", "D4"]);
        // White D4 is now in atari; Black captures at E4
        let e4 = board.parse_coord("E4").unwrap();
        let d4 = board.parse_coord("D4").unwrap();
        board.play_move(e4).unwrap();
        assert_eq!(board.cell(d4), Cell::Empty);
        assert_eq!(board.ko(), d4);
        // White may not retake immediately
        assert!(!board.is_legal(d4));
        assert_eq!(board.play_move(d4), Err(IllegalMove::Ko));
        // After a ko threat exchange the retake is allowed
        board.play_move(board.parse_coord("A9").unwrap()).unwrap();
        board.play_move(board.parse_coord("A8").unwrap()).unwrap();
        assert!(board.is_legal(d4));
    }

    #[test]
    fn test_eyes() {
        // Black stones around A1: A2, B1 make an edge eye
        let board = setup(9, &["A2", "H8", "B1"]);
        let a1 = board.parse_coord("A1").unwrap();
        assert_eq!(board.is_eyeish(a1), Some(Color::Black));
        assert_eq!(board.is_eye(a1), Some(Color::Black));
        let empty = GoBoard::new(9);
        assert_eq!(empty.is_eye(a1), None);
    }

    #[test]
    fn test_own_eye_not_a_candidate() {
        // Black to move with an own eye at A1
        let board = setup(9, &["A2", "H8", "B1", "H9"]);
        let a1 = board.parse_coord("A1").unwrap();
        assert_eq!(board.to_play(), Color::Black);
        assert!(board.is_legal(a1));
        assert!(!board.legal_moves().contains(&a1));
        assert_eq!(board.legal_moves().last(), Some(&PASS));
    }

    #[test]
    fn test_fingerprint_tracks_side_and_passes() {
        let mut board = GoBoard::new(9);
        let start = board.fingerprint();
        board.pass_move();
        let after_one = board.fingerprint();
        assert_ne!(start, after_one);
        board.pass_move();
        assert_ne!(board.fingerprint(), start, "pass count is part of the fingerprint");
        assert!(board.is_terminal());

        // Transposed move orders reach the same fingerprint
        let a = setup(9, &["C3", "G7", "D4"]);
        let b = setup(9, &["D4", "G7", "C3"]);
        assert_eq!(a.fingerprint(), b.fingerprint());
        let c = setup(9, &["D4", "C3", "G7"]);
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_set_to_play_keeps_move_history() {
        let mut board = GoBoard::new(9);
        let black_to_play = board.fingerprint();
        board.set_to_play(Color::White);
        assert_eq!(board.to_play(), Color::White);
        assert_eq!(board.turn(), 0);
        assert_eq!(board.passes_in_a_row(), 0);
        assert_ne!(board.fingerprint(), black_to_play);

        board.set_to_play(Color::Black);
        assert_eq!(board.fingerprint(), black_to_play);
    }

    #[test]
    fn test_score_empty_board() {
        let board = GoBoard::new(9).with_komi(7.5);
        assert!((board.score() + 7.5).abs() < 1e-6);
        let board = setup(5, &["C3"]).with_komi(0.5);
        // Only the stone counts; no empty point is enclosed yet
        assert!((board.score() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_copy_from_matches_clone() {
        let source = setup(9, &["C3", "G7", "D4"]);
        let mut target = GoBoard::new(9);
        target.copy_from(&source);
        assert_eq!(target.fingerprint(), source.fingerprint());
        assert_eq!(target.turn(), 3);
        assert_eq!(target.to_string(), source.to_string());
    }

    #[test]
    fn test_line_height_and_empty_area() {
        let board = GoBoard::new(9);
        assert_eq!(board.line_height(board.parse_coord("A1").unwrap()), 0);
        assert_eq!(board.line_height(board.parse_coord("C5").unwrap()), 2);
        assert_eq!(board.line_height(board.parse_coord("E5").unwrap()), 4);
        assert!(board.empty_area(board.parse_coord("E5").unwrap(), 3));

        let board = setup(9, &["E5"]);
        assert!(!board.empty_area(board.parse_coord("E3").unwrap(), 3));
    }

    #[test]
    fn test_cfg_distance_through_group() {
        let board = setup(9, &["C3", "H8", "D3", "H9", "E3"]);
        let c3 = board.parse_coord("C3").unwrap();
        let e3 = board.parse_coord("E3").unwrap();
        let f3 = board.parse_coord("F3").unwrap();
        let cfg = board.cfg_distances(c3);
        assert_eq!(cfg[e3], 0);
        assert_eq!(cfg[f3], 1);
    }

    #[test]
    fn test_self_atari() {
        // White B1, D1, C2 surround C1
        let board = setup(9, &["H8", "B1", "H9", "D1", "J8", "C2"]);
        let c1 = board.parse_coord("C1").unwrap();
        assert_eq!(board.to_play(), Color::Black);
        assert!(!board.is_legal(c1));
        let e5 = board.parse_coord("E5").unwrap();
        assert!(!board.is_self_atari(e5));
        let a1 = board.parse_coord("A1").unwrap();
        // A1 keeps only the A2 liberty
        assert!(board.is_self_atari(a1));
    }
}
