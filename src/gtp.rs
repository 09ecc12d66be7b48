//! Go Text Protocol (GTP) implementation.
//!
//! GTP is a text-based protocol for communicating with Go-playing programs.
//! This module implements GTP version 2, allowing the engine to be used
//! with graphical Go interfaces like Sabaki, GoGui, or Lizzie.
//!
//! ## Supported Commands
//!
//! - `name` - Return engine name
//! - `version` - Return engine version
//! - `protocol_version` - Return GTP protocol version (2)
//! - `list_commands` - List all supported commands
//! - `known_command <cmd>` - Check if a command is supported
//! - `quit` - Exit the program
//! - `boardsize <size>` - Set board size (2 to 19)
//! - `clear_board` - Reset the board to empty
//! - `komi <value>` - Set komi
//! - `play <color> <vertex>` - Play a move
//! - `genmove <color>` - Generate and play a move for the given color
//! - `showboard` - Print the current position
//!
//! ## Example
//!
//! ```no_run
//! use tengen::budget::Budget;
//! use tengen::config::SearchConfig;
//! use tengen::gtp::GtpEngine;
//!
//! let mut engine = GtpEngine::new(SearchConfig::default(), Budget::Playouts(1400)).unwrap();
//! engine.run().unwrap();
//! ```

use std::io::{self, BufRead, Write};

use log::{debug, info};

use crate::budget::Budget;
use crate::config::SearchConfig;
use crate::constants::RESIGN_THRES;
use crate::error::SearchError;
use crate::game::{Board, Color, Scorer, Winner};
use crate::go::{self, ChineseScorer, GoBoard, GoPlayer, PASS};

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "genmove",
    "known_command",
    "komi",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// GTP engine state.
pub struct GtpEngine {
    player: GoPlayer,
    /// Search budget for each `genmove`
    budget: Budget,
}

fn parse_color(s: &str) -> Option<Color> {
    match s.to_ascii_lowercase().as_str() {
        "b" | "black" => Some(Color::Black),
        "w" | "white" => Some(Color::White),
        _ => None,
    }
}

impl GtpEngine {
    /// Create a new GTP engine on an empty default-size board.
    pub fn new(config: SearchConfig, budget: Budget) -> Result<Self, SearchError> {
        Self::with_board(config, budget, GoBoard::default())
    }

    pub fn with_board(config: SearchConfig, budget: Budget, board: GoBoard) -> Result<Self, SearchError> {
        budget.validate()?;
        let player = go::new_player(config, board)?;
        Ok(Self { player, budget })
    }

    pub fn board(&self) -> &GoBoard {
        self.player.board()
    }

    /// Run the GTP command loop, reading from stdin and writing to stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Run the GTP command loop over arbitrary streams.
    pub fn serve(&mut self, input: impl BufRead, mut output: impl Write) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();
            debug!("gtp: {command} {args:?}");

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            write!(output, "{prefix}{id_str} {message}\n\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    /// Make `color` the side to move. The position is kept; only the turn
    /// changes hands, so no pass is recorded.
    fn ensure_to_play(&mut self, color: Color) {
        if self.board().to_play() != color {
            debug!("gtp: {color} moves out of turn");
            let mut board = self.board().clone();
            board.set_to_play(color);
            self.reset_board(board);
        }
    }

    fn reset_board(&mut self, board: GoBoard) {
        self.player.set_board(board);
    }

    /// Execute a GTP command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(cmd) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let Ok(size) = arg.parse::<usize>() else {
                    return (false, "invalid size".to_string());
                };
                match GoBoard::try_new(size) {
                    Some(board) => {
                        let komi = self.board().komi();
                        self.reset_board(board.with_komi(komi));
                        (true, String::new())
                    }
                    None => (false, "unacceptable size".to_string()),
                }
            }

            "clear_board" => {
                let mut board = self.board().clone();
                board.clear();
                self.reset_board(board);
                (true, String::new())
            }

            "komi" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<f32>() {
                    Ok(komi) => {
                        let board = self.board().clone().with_komi(komi);
                        self.reset_board(board);
                        (true, String::new())
                    }
                    Err(_) => (false, "invalid komi".to_string()),
                }
            }

            "play" => {
                let [color, vertex, ..] = args else {
                    return (false, "missing arguments".to_string());
                };
                let Some(color) = parse_color(color) else {
                    return (false, "invalid color".to_string());
                };
                let Some(pt) = self.board().parse_coord(vertex) else {
                    return (false, "invalid vertex".to_string());
                };
                self.ensure_to_play(color);
                match self.player.commit_move(pt) {
                    Ok(()) => (true, String::new()),
                    Err(SearchError::IllegalMove { reason, .. }) => {
                        (false, format!("illegal move: {reason}"))
                    }
                    Err(e) => (false, e.to_string()),
                }
            }

            "genmove" => {
                let Some(color) = args.first().and_then(|c| parse_color(c)) else {
                    return (false, "invalid color".to_string());
                };
                self.ensure_to_play(color);
                match self.genmove(color) {
                    Ok(response) => (true, response),
                    Err(e) => (false, e.to_string()),
                }
            }

            "showboard" => (true, format!("\n{}", self.board())),

            _ => (false, "unknown command".to_string()),
        }
    }

    fn genmove(&mut self, color: Color) -> Result<String, SearchError> {
        let board = self.board();
        // The opponent passed and we are ahead: end the game
        if board.last_move() == PASS
            && board.turn() > 2
            && ChineseScorer.winner(board) == Winner::from(color)
        {
            self.player.commit_move(PASS)?;
            return Ok("pass".to_string());
        }

        let mv = self.player.search(self.budget)?;
        let win_rate = self.player.root_win_rate(mv).unwrap_or(0.5);
        info!(
            "genmove {color}: {} ({:.1}%)",
            self.board().str_coord(mv),
            win_rate * 100.0
        );
        if mv != PASS && win_rate < RESIGN_THRES {
            return Ok("resign".to_string());
        }

        self.player.commit_move(mv)?;
        Ok(self.board().str_coord(mv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> GtpEngine {
        GtpEngine::new(SearchConfig::for_testing(), Budget::Playouts(50)).unwrap()
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = GtpEngine::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = GtpEngine::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_name_command() {
        let mut engine = engine();
        let (success, response) = engine.execute("name", &[]);
        assert!(success);
        assert_eq!(response, "tengen");
    }

    #[test]
    fn test_protocol_version() {
        let mut engine = engine();
        let (success, response) = engine.execute("protocol_version", &[]);
        assert!(success);
        assert_eq!(response, "2");
    }

    #[test]
    fn test_known_command() {
        let mut engine = engine();

        let (success, response) = engine.execute("known_command", &["showboard"]);
        assert!(success);
        assert_eq!(response, "true");

        let (success, response) = engine.execute("known_command", &["unknown_cmd"]);
        assert!(success);
        assert_eq!(response, "false");
    }

    #[test]
    fn test_boardsize() {
        let mut engine = engine();

        let (success, _) = engine.execute("boardsize", &["13"]);
        assert!(success);
        assert_eq!(engine.board().size(), 13);

        let (success, _) = engine.execute("boardsize", &["25"]);
        assert!(!success);
        assert_eq!(engine.board().size(), 13);
    }

    #[test]
    fn test_play_and_clear() {
        let mut engine = engine();

        let (success, _) = engine.execute("play", &["black", "D4"]);
        assert!(success);
        assert_eq!(engine.board().turn(), 1);

        // Occupied point
        let (success, response) = engine.execute("play", &["white", "D4"]);
        assert!(!success);
        assert!(response.starts_with("illegal move"));

        let (success, _) = engine.execute("clear_board", &[]);
        assert!(success);
        assert_eq!(engine.board().turn(), 0);
    }

    #[test]
    fn test_play_out_of_turn() {
        let mut engine = engine();
        let (success, _) = engine.execute("play", &["white", "E5"]);
        assert!(success);
        assert_eq!(engine.board().turn(), 1);
        assert_eq!(engine.board().passes_in_a_row(), 0);
        assert_eq!(engine.board().to_play(), Color::Black);
        let e5 = engine.board().parse_coord("E5").unwrap();
        assert_eq!(engine.board().color_at(e5), Some(Color::White));
    }

    #[test]
    fn test_out_of_turn_pass_does_not_end_game() {
        let mut engine = engine();
        let mut output = Vec::new();
        engine.serve(&b"play w pass\n"[..], &mut output).unwrap();
        assert_eq!(output, b"= \n\n");
        assert_eq!(engine.board().passes_in_a_row(), 1);
        assert!(!engine.board().is_terminal());
        assert_eq!(engine.board().to_play(), Color::Black);

        let (success, response) = engine.execute("genmove", &["b"]);
        assert!(success, "genmove failed: {response}");
        assert_ne!(response, "pass");
        assert!(!engine.board().is_terminal());
    }

    #[test]
    fn test_genmove_out_of_turn() {
        let mut engine = engine();
        let (success, response) = engine.execute("genmove", &["w"]);
        assert!(success, "genmove failed: {response}");
        let pt = engine.board().parse_coord(&response).unwrap();
        assert_eq!(engine.board().color_at(pt), Some(Color::White));
        assert_eq!(engine.board().turn(), 1);
    }

    #[test]
    fn test_genmove_plays_a_legal_move() {
        let mut engine = engine();
        let (success, response) = engine.execute("genmove", &["b"]);
        assert!(success, "genmove failed: {response}");
        assert_eq!(engine.board().turn(), 1);
        let pt = engine.board().parse_coord(&response).unwrap();
        assert_eq!(engine.board().color_at(pt), Some(Color::Black));
    }

    #[test]
    fn test_serve_formats_responses() {
        let mut engine = engine();
        let input = b"1 name\nbogus\n# comment\nquit\n";
        let mut output = Vec::new();
        engine.serve(&input[..], &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, "=1 tengen\n\n? unknown command\n\n= \n\n");
    }
}
