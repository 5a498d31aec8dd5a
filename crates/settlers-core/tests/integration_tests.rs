//! Integration tests for the settlers core.
//!
//! These tests drive complete matches from setup through to victory.

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use settlers_core::*;
use std::sync::mpsc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// First empty vertex on land that respects the distance rule
fn first_free_spot(board: &Board) -> Option<VertexCoord> {
    board
        .tiles()
        .iter()
        .flat_map(|tile| tile.coord().vertices())
        .find(|v| board.building_at(*v).is_none() && board.satisfies_distance_rule(v))
}

/// Snake-order setup, then the current player builds one city per round
struct ScriptedTurns;

impl TurnOrchestrator for ScriptedTurns {
    fn run_setup(&mut self, game: &mut Game) -> Result<(), GameError> {
        let n = game.players().len();
        let order: Vec<PlayerIndex> = (0..n).chain((0..n).rev()).collect();

        for player in order {
            let vertex = first_free_spot(game.board())
                .ok_or_else(|| GameError::Orchestration("no free vertex".into()))?;
            game.build_structure(player, Structure::settlement(vertex))?;

            let edge = vertex
                .touching_edges()
                .into_iter()
                .find(|e| game.board().road_at(*e).is_none())
                .ok_or_else(|| GameError::Orchestration("no free edge".into()))?;
            game.build_road(player, Road::new(edge))?;
        }
        Ok(())
    }

    fn run_round(&mut self, game: &mut Game) -> Result<(), GameError> {
        let player = game.current_player_index();
        let vertex = first_free_spot(game.board())
            .ok_or_else(|| GameError::Orchestration("board is full".into()))?;
        game.build_structure(player, Structure::city(vertex))
    }
}

/// Fails during setup
struct BrokenTurns;

impl TurnOrchestrator for BrokenTurns {
    fn run_setup(&mut self, _game: &mut Game) -> Result<(), GameError> {
        Err(GameError::Orchestration("dice missing".into()))
    }

    fn run_round(&mut self, _game: &mut Game) -> Result<(), GameError> {
        Ok(())
    }
}

fn new_game(seed: u64) -> Game {
    Game::standard(
        GameConfig::default(),
        &["Alice", "Bob", "Charlie"],
        &mut StdRng::seed_from_u64(seed),
    )
    .unwrap()
}

#[test]
fn test_full_match_reaches_end() {
    init_tracing();
    let (tx, rx) = mpsc::channel();
    let mut game = new_game(7).with_sink(tx);
    let mut turns = ScriptedTurns;

    assert_eq!(game.execute_phase(&mut turns).unwrap(), GamePhase::Play);
    for player in game.players() {
        assert_eq!(player.owned_structures().len(), 2);
        assert_eq!(player.owned_roads().len(), 2);
        assert_eq!(player.victory_points(), 2);
    }

    // 2 VP from setup, +2 per city: 4, 6, 8 stay in Play
    for _ in 0..3 {
        assert_eq!(game.execute_phase(&mut turns).unwrap(), GamePhase::Play);
    }
    assert_eq!(game.execute_phase(&mut turns).unwrap(), GamePhase::End);
    assert_eq!(game.winner(), Some(0));

    assert_eq!(game.execute_phase(&mut turns).unwrap(), GamePhase::End);
    assert_eq!(game.execute_phase(&mut turns).unwrap(), GamePhase::End);

    let events: Vec<GameEvent> = rx.try_iter().collect();
    let phase_changes: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::PhaseChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        phase_changes,
        vec![
            (GamePhase::Setup, GamePhase::Play),
            (GamePhase::Play, GamePhase::End)
        ]
    );

    let wins: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, GameEvent::GameWon { .. }))
        .collect();
    assert_eq!(
        wins,
        vec![&GameEvent::GameWon {
            player: 0,
            name: "Alice".into(),
            victory_points: 10,
        }]
    );
}

#[test]
fn test_board_and_ledgers_agree() {
    let mut game = new_game(3);
    let mut turns = ScriptedTurns;
    game.execute_phase(&mut turns).unwrap();
    game.execute_phase(&mut turns).unwrap();

    let owned: usize = game.players().iter().map(|p| p.owned_structures().len()).sum();
    assert_eq!(game.board().structures().count(), owned);

    for player in game.players() {
        for structure in player.owned_structures() {
            assert_eq!(game.board().building_at(structure.vertex), Some(structure));
        }
        for road in player.owned_roads() {
            assert_eq!(game.board().road_at(road.edge), Some(road));
        }
    }

    // One revision per successful placement: 6 settlements, 6 roads, 1 city
    assert_eq!(game.history().len(), 13);
    assert_eq!(game.history()[0].structures().count(), 0);
}

#[test]
fn test_orchestration_failure_keeps_phase() {
    let mut game = new_game(1);
    let result = game.execute_phase(&mut BrokenTurns);

    assert_eq!(result, Err(GameError::Orchestration("dice missing".into())));
    assert_eq!(game.phase(), GamePhase::Setup);
}

#[test]
fn test_external_transition_is_guarded() {
    let mut game = new_game(2);
    game.transition_to(GamePhase::Play).unwrap();
    game.transition_to(GamePhase::End).unwrap();

    for target in [GamePhase::Setup, GamePhase::Play, GamePhase::End] {
        assert!(matches!(
            game.transition_to(target),
            Err(GameError::IllegalPhaseTransition {
                from: GamePhase::End,
                ..
            })
        ));
    }
}

#[test]
fn test_settlement_then_city_scenario() {
    let board = create_initial_board(&mut StdRng::seed_from_u64(5));
    let x = VertexCoord::new(HexCoord::new(0, 0), VertexDirection::NorthEast);
    let y = VertexCoord::new(HexCoord::new(-1, 1), VertexDirection::SouthWest);

    let board = board.place_building(x, Structure::settlement(x)).unwrap();
    assert_eq!(
        board.place_building(x, Structure::city(x)),
        Err(BoardError::OccupiedVertex(x))
    );

    let board = board.place_building(y, Structure::city(y)).unwrap();
    assert_eq!(board.structures().count(), 2);
}

#[test]
fn test_initial_board_invariants_across_seeds() {
    for seed in 0..25 {
        let board = create_initial_board(&mut StdRng::seed_from_u64(seed));
        assert_eq!(board.tiles().len(), 19);
        assert_eq!(board.harbors().len(), 9);
        assert_eq!(
            board.tiles().iter().filter(|t| t.number_token().is_none()).count(),
            1
        );
        assert_eq!(
            board.tiles().iter().filter(|t| t.kind() == TileKind::Desert).count(),
            1
        );
    }
}

#[test]
fn test_config_drives_threshold() {
    let config = GameConfig::from_json(r#"{"victory_points_to_win": 4}"#).unwrap();
    let mut game = Game::standard(config, &["Alice", "Bob"], &mut StdRng::seed_from_u64(9))
        .unwrap()
        .with_sink(Vec::new());
    let mut turns = ScriptedTurns;

    game.execute_phase(&mut turns).unwrap();
    assert_eq!(game.execute_phase(&mut turns).unwrap(), GamePhase::End);
}
