//! Match session and phase state machine.
//!
//! A [`Game`] owns the current board and player ledgers and is the only place
//! they are replaced. The phase machine moves strictly forward:
//! Setup -> Play -> End. What happens inside a phase is delegated to a
//! [`TurnOrchestrator`]; when Play ends is decided by a [`ScoreProvider`].

use crate::board::{Board, BoardError, Road, Structure};
use crate::config::GameConfig;
use crate::events::{GameEvent, ReportSink, TracingReporter};
use crate::player::{Player, ResourceHand};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Index of a player in the session (0-based, turn order)
pub type PlayerIndex = usize;

/// Coarse stage of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Initial placement
    Setup,
    /// Regular turns
    Play,
    /// Game is over
    End,
}

impl GamePhase {
    /// The only phase this one may hand over to
    pub fn next(self) -> Option<GamePhase> {
        match self {
            GamePhase::Setup => Some(GamePhase::Play),
            GamePhase::Play => Some(GamePhase::End),
            GamePhase::End => None,
        }
    }

    pub fn can_transition_to(self, to: GamePhase) -> bool {
        self.next() == Some(to)
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

/// Errors that can occur while driving a match
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Cannot move from {from:?} to {to:?}")]
    IllegalPhaseTransition { from: GamePhase, to: GamePhase },

    #[error("Game is over")]
    GameOver,

    #[error("No player with index {0}")]
    UnknownPlayer(PlayerIndex),

    #[error("Need 2-4 players, got {0}")]
    InvalidPlayerCount(usize),

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("Turn logic failed: {0}")]
    Orchestration(String),
}

/// Turn logic run inside a phase. Implemented outside the core.
pub trait TurnOrchestrator {
    /// Initial placements. Called once, while the phase is Setup.
    fn run_setup(&mut self, game: &mut Game) -> Result<(), GameError>;

    /// One round of turns. Called once per Play execution.
    fn run_round(&mut self, game: &mut Game) -> Result<(), GameError>;
}

/// Does no setup and simply passes the turn each round
#[derive(Debug, Clone, Copy, Default)]
pub struct PassTurns;

impl TurnOrchestrator for PassTurns {
    fn run_setup(&mut self, _game: &mut Game) -> Result<(), GameError> {
        Ok(())
    }

    fn run_round(&mut self, game: &mut Game) -> Result<(), GameError> {
        game.end_turn();
        Ok(())
    }
}

/// Score of the player whose turn it is
pub trait ScoreProvider {
    fn current_player_score(&self, game: &Game) -> u32;
}

impl<F> ScoreProvider for F
where
    F: Fn(&Game) -> u32,
{
    fn current_player_score(&self, game: &Game) -> u32 {
        self(game)
    }
}

/// Scores the current player by the structures in their ledger
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerScore;

impl ScoreProvider for LedgerScore {
    fn current_player_score(&self, game: &Game) -> u32 {
        game.current_player()
            .map(Player::victory_points)
            .unwrap_or(0)
    }
}

/// The state of one match
pub struct Game {
    config: GameConfig,
    phase: GamePhase,
    board: Board,
    /// Every earlier board, oldest first
    history: Vec<Board>,
    players: Vec<Player>,
    current_player: PlayerIndex,
    winner: Option<PlayerIndex>,
    /// Score the winner had when Play ended
    winning_score: u32,
    winner_announced: bool,
    scores: Box<dyn ScoreProvider>,
    sink: Box<dyn ReportSink>,
}

impl Game {
    /// Create a match in the Setup phase
    pub fn new(config: GameConfig, board: Board, players: Vec<Player>) -> Result<Self, GameError> {
        if !(2..=4).contains(&players.len()) {
            return Err(GameError::InvalidPlayerCount(players.len()));
        }

        info!(players = players.len(), threshold = config.victory_points_to_win, "New game");
        Ok(Self {
            config,
            phase: GamePhase::Setup,
            board,
            history: Vec::new(),
            players,
            current_player: 0,
            winner: None,
            winning_score: 0,
            winner_announced: false,
            scores: Box::new(LedgerScore),
            sink: Box::new(TracingReporter),
        })
    }

    /// Create a match on a freshly shuffled standard board
    pub fn standard<R: Rng + ?Sized>(
        config: GameConfig,
        player_names: &[&str],
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let players = player_names.iter().map(|name| Player::new(*name)).collect();
        Self::new(config, Board::standard_with_rng(rng), players)
    }

    /// Replace the score provider consulted at the end of each Play round
    pub fn with_score_provider(mut self, scores: impl ScoreProvider + 'static) -> Self {
        self.scores = Box::new(scores);
        self
    }

    /// Replace where events are reported
    pub fn with_sink(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Boards from before each successful placement, oldest first
    pub fn history(&self) -> &[Board] {
        &self.history
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, index: PlayerIndex) -> Option<&Player> {
        self.players.get(index)
    }

    pub fn current_player_index(&self) -> PlayerIndex {
        self.current_player
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.player(self.current_player)
    }

    /// Who reached the threshold, once the match is over
    pub fn winner(&self) -> Option<PlayerIndex> {
        self.winner
    }

    /// Pass the turn to the next player. Does nothing once the game is over.
    pub fn end_turn(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        self.current_player = (self.current_player + 1) % self.players.len();
        debug!(player = self.current_player, "Turn passed");
    }

    /// Score of the current player per the configured provider
    pub fn current_player_score(&self) -> u32 {
        self.scores.current_player_score(self)
    }

    // ==================== Phase Machine ====================

    /// Run the current phase once and return the phase afterwards.
    ///
    /// - Setup runs the initial placements, then moves to Play.
    /// - Play runs one round, then moves to End if the current player's score
    ///   reached the threshold.
    /// - End announces the winner the first time and never moves on.
    pub fn execute_phase(
        &mut self,
        turns: &mut dyn TurnOrchestrator,
    ) -> Result<GamePhase, GameError> {
        let phase = self.phase;
        self.sink.report(GameEvent::PhaseStarted { phase });

        match phase {
            GamePhase::Setup => {
                turns.run_setup(self)?;
                // Turn logic may already have moved on
                if self.phase == GamePhase::Setup {
                    self.transition_to(GamePhase::Play)?;
                }
            }
            GamePhase::Play => {
                turns.run_round(self)?;
                if self.phase == GamePhase::Play
                    && self.current_player_score() >= self.config.victory_points_to_win
                {
                    self.transition_to(GamePhase::End)?;
                }
            }
            GamePhase::End => self.announce_winner(),
        }

        Ok(self.phase)
    }

    /// Move to `next`. Only Setup -> Play and Play -> End are allowed.
    pub fn transition_to(&mut self, next: GamePhase) -> Result<(), GameError> {
        let from = self.phase;
        if !from.can_transition_to(next) {
            warn!(?from, to = ?next, "Rejected phase transition");
            return Err(GameError::IllegalPhaseTransition { from, to: next });
        }

        self.phase = next;
        if next == GamePhase::End {
            self.winner = Some(self.current_player);
            self.winning_score = self.current_player_score();
        }
        info!(?from, to = ?next, "Phase changed");
        self.sink.report(GameEvent::PhaseChanged { from, to: next });
        Ok(())
    }

    fn announce_winner(&mut self) {
        if self.winner_announced {
            return;
        }
        let Some(index) = self.winner else {
            return;
        };
        let Some(player) = self.players.get(index) else {
            return;
        };

        let event = GameEvent::GameWon {
            player: index,
            name: player.name().to_string(),
            victory_points: self.winning_score,
        };
        self.winner_announced = true;
        self.sink.report(event);
    }

    // ==================== Placement ====================

    /// Place a structure on the board and record it in the player's ledger.
    ///
    /// Allowed during Setup and Play. Rule checks beyond occupancy belong to
    /// the caller. On error neither board nor ledger changes.
    pub fn build_structure(
        &mut self,
        player: PlayerIndex,
        structure: Structure,
    ) -> Result<(), GameError> {
        self.ensure_not_over()?;
        let owner = self.players.get(player).ok_or(GameError::UnknownPlayer(player))?;

        let structure = Structure::new(structure.vertex, structure.kind);
        let board = self.board.place_building(structure.vertex, structure)?;
        let updated = owner.with_added_structure(structure);

        self.commit_board(board);
        self.players[player] = updated;
        self.sink.report(GameEvent::StructureBuilt { player, structure });
        Ok(())
    }

    /// Place a road on the board and record it in the player's ledger
    pub fn build_road(&mut self, player: PlayerIndex, road: Road) -> Result<(), GameError> {
        self.ensure_not_over()?;
        let owner = self.players.get(player).ok_or(GameError::UnknownPlayer(player))?;

        let road = Road::new(road.edge);
        let board = self.board.place_road(road.edge, road)?;
        let updated = owner.with_added_road(road);

        self.commit_board(board);
        self.players[player] = updated;
        self.sink.report(GameEvent::RoadBuilt { player, road });
        Ok(())
    }

    /// Replace a player's hand, e.g. after production or trading
    pub fn set_resources(
        &mut self,
        player: PlayerIndex,
        resources: ResourceHand,
    ) -> Result<(), GameError> {
        let slot = self
            .players
            .get_mut(player)
            .ok_or(GameError::UnknownPlayer(player))?;
        *slot = slot.with_resources(resources);
        Ok(())
    }

    fn ensure_not_over(&self) -> Result<(), GameError> {
        if self.phase.is_terminal() {
            return Err(GameError::GameOver);
        }
        Ok(())
    }

    fn commit_board(&mut self, board: Board) {
        let previous = std::mem::replace(&mut self.board, board);
        self.history.push(previous);
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("current_player", &self.current_player)
            .field("players", &self.players)
            .field("winner", &self.winner)
            .field("revisions", &self.history.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::{EdgeCoord, EdgeDirection, HexCoord, VertexCoord, VertexDirection};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;
    use std::rc::Rc;

    fn two_player_game() -> Game {
        Game::standard(
            GameConfig::default(),
            &["Alice", "Bob"],
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap()
    }

    fn vertex(q: i32, r: i32, dir: VertexDirection) -> VertexCoord {
        VertexCoord::new(HexCoord::new(q, r), dir)
    }

    #[test]
    fn test_new_game_starts_in_setup() {
        let game = two_player_game();
        assert_eq!(game.phase(), GamePhase::Setup);
        assert_eq!(game.current_player_index(), 0);
        assert!(game.winner().is_none());
    }

    #[test]
    fn test_player_count_checked() {
        let result = Game::new(GameConfig::default(), Board::default(), vec![Player::new("Solo")]);
        assert!(matches!(result, Err(GameError::InvalidPlayerCount(1))));
    }

    #[test]
    fn test_transition_table() {
        use GamePhase::*;
        assert!(Setup.can_transition_to(Play));
        assert!(Play.can_transition_to(End));
        let illegal = [
            (Setup, Setup),
            (Setup, End),
            (Play, Setup),
            (Play, Play),
            (End, Setup),
            (End, Play),
            (End, End),
        ];
        for (from, to) in illegal {
            assert!(!from.can_transition_to(to), "{:?} -> {:?}", from, to);
        }
    }

    #[test]
    fn test_backward_transition_rejected() {
        let mut game = two_player_game();
        game.transition_to(GamePhase::Play).unwrap();

        assert_eq!(
            game.transition_to(GamePhase::Setup),
            Err(GameError::IllegalPhaseTransition {
                from: GamePhase::Play,
                to: GamePhase::Setup
            })
        );
        assert_eq!(game.phase(), GamePhase::Play);
    }

    #[test]
    fn test_skipping_transition_rejected() {
        let mut game = two_player_game();
        assert!(matches!(
            game.transition_to(GamePhase::End),
            Err(GameError::IllegalPhaseTransition { .. })
        ));
        assert_eq!(game.phase(), GamePhase::Setup);
    }

    #[test]
    fn test_play_stays_until_threshold() {
        let score = Rc::new(Cell::new(0));
        let provider = {
            let score = Rc::clone(&score);
            move |_: &Game| score.get()
        };
        let mut game = two_player_game().with_score_provider(provider);
        let mut turns = PassTurns;

        assert_eq!(game.execute_phase(&mut turns), Ok(GamePhase::Play));
        for points in [0, 4, 9] {
            score.set(points);
            assert_eq!(game.execute_phase(&mut turns), Ok(GamePhase::Play));
        }

        score.set(10);
        assert_eq!(game.execute_phase(&mut turns), Ok(GamePhase::End));
        assert_eq!(game.execute_phase(&mut turns), Ok(GamePhase::End));
        assert_eq!(game.execute_phase(&mut turns), Ok(GamePhase::End));
    }

    #[test]
    fn test_threshold_is_configurable() {
        let config = GameConfig::with_victory_points(3).unwrap();
        let mut game = Game::standard(config, &["A", "B"], &mut StdRng::seed_from_u64(2))
            .unwrap()
            .with_score_provider(|_: &Game| 3);

        game.execute_phase(&mut PassTurns).unwrap();
        assert_eq!(game.execute_phase(&mut PassTurns), Ok(GamePhase::End));
    }

    #[test]
    fn test_build_structure_updates_board_and_ledger() {
        let mut game = two_player_game();
        let v = vertex(0, 0, VertexDirection::North);

        game.build_structure(1, Structure::settlement(v)).unwrap();

        assert_eq!(game.board().building_at(v), Some(&Structure::settlement(v)));
        assert_eq!(game.player(1).unwrap().owned_structures(), &[Structure::settlement(v)]);
        assert!(game.player(0).unwrap().owned_structures().is_empty());
        assert_eq!(game.history().len(), 1);
        assert!(game.history()[0].building_at(v).is_none());
    }

    #[test]
    fn test_failed_build_changes_nothing() {
        let mut game = two_player_game();
        let v = vertex(0, 0, VertexDirection::North);
        game.build_structure(0, Structure::settlement(v)).unwrap();

        let result = game.build_structure(1, Structure::city(v));
        assert_eq!(result, Err(GameError::Board(BoardError::OccupiedVertex(v))));
        assert!(game.player(1).unwrap().owned_structures().is_empty());
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn test_build_road_and_unknown_player() {
        let mut game = two_player_game();
        let edge = EdgeCoord::new(HexCoord::new(0, 0), EdgeDirection::East);

        assert_eq!(
            game.build_road(5, Road::new(edge)),
            Err(GameError::UnknownPlayer(5))
        );
        game.build_road(0, Road::new(edge)).unwrap();
        assert_eq!(game.player(0).unwrap().owned_roads().len(), 1);
        assert!(matches!(
            game.build_road(1, Road::new(edge)),
            Err(GameError::Board(BoardError::OccupiedEdge(_)))
        ));
    }

    #[test]
    fn test_building_closed_after_end() {
        let mut game = two_player_game().with_score_provider(|_: &Game| 10);
        game.execute_phase(&mut PassTurns).unwrap();
        game.execute_phase(&mut PassTurns).unwrap();
        assert_eq!(game.phase(), GamePhase::End);

        let v = vertex(0, 0, VertexDirection::South);
        assert_eq!(
            game.build_structure(0, Structure::settlement(v)),
            Err(GameError::GameOver)
        );
    }

    #[test]
    fn test_ledger_score_counts_current_player() {
        let mut game = two_player_game();
        game.build_structure(0, Structure::city(vertex(0, 0, VertexDirection::North)))
            .unwrap();
        game.build_structure(1, Structure::settlement(vertex(1, 1, VertexDirection::South)))
            .unwrap();

        assert_eq!(game.current_player_score(), 2);
        game.end_turn();
        assert_eq!(game.current_player_score(), 1);
        game.end_turn();
        assert_eq!(game.current_player_index(), 0);
    }

    #[test]
    fn test_win_reports_winner_score_after_turn_passes() {
        let mut game = two_player_game().with_sink(Vec::new());
        game.build_structure(0, Structure::city(vertex(0, 0, VertexDirection::North)))
            .unwrap();
        game.build_structure(1, Structure::settlement(vertex(1, 1, VertexDirection::South)))
            .unwrap();
        game.transition_to(GamePhase::Play).unwrap();
        game.transition_to(GamePhase::End).unwrap();

        game.end_turn();
        assert_eq!(game.current_player_index(), 0);

        let (tx, rx) = std::sync::mpsc::channel();
        let mut game = game.with_sink(tx);
        game.execute_phase(&mut PassTurns).unwrap();

        let wins: Vec<GameEvent> = rx
            .try_iter()
            .filter(|e| matches!(e, GameEvent::GameWon { .. }))
            .collect();
        assert_eq!(
            wins,
            vec![GameEvent::GameWon {
                player: 0,
                name: "Alice".into(),
                victory_points: 2,
            }]
        );
    }

    #[test]
    fn test_set_resources() {
        let mut game = two_player_game();
        let hand = ResourceHand::with_amounts(1, 0, 0, 0, 2);
        game.set_resources(1, hand).unwrap();
        assert_eq!(game.player(1).unwrap().resources(), &hand);
        assert_eq!(game.set_resources(9, hand), Err(GameError::UnknownPlayer(9)));
    }
}
