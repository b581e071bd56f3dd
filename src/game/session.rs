use std::cell::Cell;
use std::rc::Rc;

use rand::Rng;

use super::board::{GridSize, Tile, generate_board};
use super::records::{GameRecord, ScoreStore};
use super::store::KeyValueStore;
use crate::LOG_DOMAIN;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No game has been started yet
    Idle,
    AwaitingFirstReveal,
    AwaitingSecondReveal,
    /// Two tiles are face up and input is locked until the pair is resolved
    Resolving,
    /// Every tile is matched; terminal until the next start
    Won,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Playing,
    Won,
}

/// Instructions for the render layer. The session never touches widgets itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderCommand {
    BuildGrid { size: GridSize },
    ShowSymbol { position: usize, symbol: &'static str },
    ShowMatched { position: usize },
    Clear { position: usize },
    SetMoves(u32),
    SetStatus(Status),
    SetBest(Option<GameRecord>),
}

#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Handle for a deferred pair resolution, bound to the game that issued it.
#[derive(Clone, Debug)]
pub struct ResolveTicket {
    game_id: u64,
    token: CancelToken,
}

impl ResolveTicket {
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Result of a reveal: what to paint, and whether a resolution must be scheduled.
#[derive(Debug, Default)]
pub struct Step {
    pub commands: Vec<RenderCommand>,
    pub resolve: Option<ResolveTicket>,
}

pub struct GameSession<S> {
    tiles: Vec<Tile>,
    revealed: Vec<usize>,
    phase: Phase,
    moves: u32,
    game_id: u64,
    pending: Option<CancelToken>,
    scores: ScoreStore<S>,
}

impl<S: KeyValueStore> GameSession<S> {
    pub fn new(scores: ScoreStore<S>) -> Self {
        Self {
            tiles: Vec::new(),
            revealed: Vec::with_capacity(2),
            phase: Phase::Idle,
            moves: 0,
            game_id: 0,
            pending: None,
            scores,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    #[cfg(test)]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[cfg(test)]
    pub fn revealed(&self) -> &[usize] {
        &self.revealed
    }

    pub fn scores(&self) -> &ScoreStore<S> {
        &self.scores
    }

    pub fn best_record(&self) -> Option<GameRecord> {
        self.scores.best_record()
    }

    pub fn start(&mut self, size: GridSize) -> Vec<RenderCommand> {
        self.start_with_rng(size, &mut rand::rng())
    }

    pub fn start_with_rng<R: Rng + ?Sized>(
        &mut self,
        size: GridSize,
        rng: &mut R,
    ) -> Vec<RenderCommand> {
        let tiles = generate_board(size, rng);
        self.start_with_board(size, tiles)
    }

    fn start_with_board(&mut self, size: GridSize, tiles: Vec<Tile>) -> Vec<RenderCommand> {
        // Abandon whatever was in flight; its timer must not touch the new board.
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
        self.game_id = self.game_id.wrapping_add(1);
        self.tiles = tiles;
        self.revealed.clear();
        self.moves = 0;
        self.phase = Phase::AwaitingFirstReveal;
        glib::g_debug!(
            LOG_DOMAIN,
            "Started game {} on a {}x{} board",
            self.game_id,
            size.get(),
            size.get()
        );

        vec![
            RenderCommand::BuildGrid { size },
            RenderCommand::SetMoves(0),
            RenderCommand::SetStatus(Status::Playing),
        ]
    }

    fn rejection(&self, position: usize) -> Option<&'static str> {
        match self.phase {
            Phase::AwaitingFirstReveal | Phase::AwaitingSecondReveal => {}
            Phase::Idle => return Some("no game in progress"),
            Phase::Resolving => return Some("board is locked"),
            Phase::Won => return Some("game is over"),
        }
        match self.tiles.get(position) {
            None => Some("position out of range"),
            Some(tile) if tile.matched => Some("tile already matched"),
            Some(_) if self.revealed.contains(&position) => Some("tile already revealed"),
            Some(_) => None,
        }
    }

    pub fn reveal(&mut self, position: usize) -> Step {
        if let Some(reason) = self.rejection(position) {
            glib::g_debug!(LOG_DOMAIN, "Ignored reveal of {}: {}", position, reason);
            return Step::default();
        }

        let tile = &self.tiles[position];
        glib::g_debug!(LOG_DOMAIN, "Revealed {} at {}", tile.symbol, tile.position);
        self.moves += 1;
        self.revealed.push(position);
        let mut step = Step {
            commands: vec![
                RenderCommand::ShowSymbol {
                    position,
                    symbol: self.tiles[position].symbol,
                },
                RenderCommand::SetMoves(self.moves),
            ],
            resolve: None,
        };

        if self.revealed.len() < 2 {
            self.phase = Phase::AwaitingSecondReveal;
            return step;
        }

        self.phase = Phase::Resolving;
        let token = CancelToken::default();
        self.pending = Some(token.clone());
        step.resolve = Some(ResolveTicket {
            game_id: self.game_id,
            token,
        });
        step
    }

    pub fn resolve(&mut self, ticket: &ResolveTicket) -> Vec<RenderCommand> {
        if ticket.game_id != self.game_id || ticket.is_cancelled() || self.phase != Phase::Resolving
        {
            glib::g_debug!(LOG_DOMAIN, "Dropped stale resolution for game {}", ticket.game_id);
            return Vec::new();
        }
        self.pending = None;

        let (first, second) = (self.revealed[0], self.revealed[1]);
        self.revealed.clear();
        let mut commands = Vec::new();

        if self.tiles[first].symbol != self.tiles[second].symbol {
            commands.push(RenderCommand::Clear { position: first });
            commands.push(RenderCommand::Clear { position: second });
            self.phase = Phase::AwaitingFirstReveal;
            return commands;
        }

        for position in [first, second] {
            self.tiles[position].matched = true;
            commands.push(RenderCommand::ShowMatched { position });
        }

        if !self.tiles.iter().all(|tile| tile.matched) {
            self.phase = Phase::AwaitingFirstReveal;
            return commands;
        }

        self.phase = Phase::Won;
        glib::g_info!(LOG_DOMAIN, "Game {} won in {} moves", self.game_id, self.moves);
        if let Err(err) = self.scores.record(self.moves) {
            glib::g_warning!(LOG_DOMAIN, "Could not save finished game: {}", err);
        }
        commands.push(RenderCommand::SetStatus(Status::Won));
        commands.push(RenderCommand::SetBest(self.scores.best_record()));
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::board_from_symbols;
    use crate::game::store::MemoryStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn session_with(symbols: &[&'static str]) -> GameSession<MemoryStore> {
        let mut session = GameSession::new(ScoreStore::new(MemoryStore::default()));
        let size = GridSize::new((symbols.len() as f64).sqrt() as u32).unwrap();
        session.start_with_board(size, board_from_symbols(symbols));
        session
    }

    fn recorded_games(session: &GameSession<MemoryStore>) -> Vec<u32> {
        session.scores().history().iter().map(|r| r.moves).collect()
    }

    #[test]
    fn test_start_resets_and_builds_grid() {
        let mut session = GameSession::new(ScoreStore::new(MemoryStore::default()));
        assert_eq!(session.phase(), Phase::Idle);

        let size = GridSize::new(4).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let commands = session.start_with_rng(size, &mut rng);
        assert_eq!(
            commands,
            vec![
                RenderCommand::BuildGrid { size },
                RenderCommand::SetMoves(0),
                RenderCommand::SetStatus(Status::Playing),
            ]
        );
        assert_eq!(session.phase(), Phase::AwaitingFirstReveal);
        assert_eq!(session.tiles().len(), 16);
        assert_eq!(session.moves(), 0);
        assert!(session.revealed().is_empty());
    }

    #[test]
    fn test_full_game_scenario() {
        let mut session = session_with(&["A", "B", "A", "B"]);

        let step = session.reveal(0);
        assert_eq!(
            step.commands,
            vec![
                RenderCommand::ShowSymbol {
                    position: 0,
                    symbol: "A"
                },
                RenderCommand::SetMoves(1),
            ]
        );
        assert!(step.resolve.is_none());
        assert_eq!(session.phase(), Phase::AwaitingSecondReveal);

        let step = session.reveal(2);
        assert_eq!(session.moves(), 2);
        assert_eq!(session.phase(), Phase::Resolving);
        let ticket = step.resolve.expect("second reveal schedules a resolution");

        let commands = session.resolve(&ticket);
        assert_eq!(
            commands,
            vec![
                RenderCommand::ShowMatched { position: 0 },
                RenderCommand::ShowMatched { position: 2 },
            ]
        );
        assert!(session.tiles()[0].matched && session.tiles()[2].matched);
        assert_eq!(session.phase(), Phase::AwaitingFirstReveal);
        assert!(recorded_games(&session).is_empty());

        let step = session.reveal(1);
        assert_eq!(
            step.commands[0],
            RenderCommand::ShowSymbol {
                position: 1,
                symbol: "B"
            }
        );
        assert_eq!(session.moves(), 3);
        let ticket = session.reveal(3).resolve.unwrap();
        assert_eq!(session.moves(), 4);

        let commands = session.resolve(&ticket);
        assert_eq!(session.phase(), Phase::Won);
        assert_eq!(recorded_games(&session), vec![4]);
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[2], RenderCommand::SetStatus(Status::Won));
        match &commands[3] {
            RenderCommand::SetBest(Some(best)) => assert_eq!(best.moves, 4),
            other => panic!("Expected best record, got {:?}", other),
        }
    }

    #[test]
    fn test_mismatch_clears_both_cells() {
        let mut session = session_with(&["A", "B", "B", "A"]);
        session.reveal(0);
        let ticket = session.reveal(1).resolve.unwrap();

        let commands = session.resolve(&ticket);
        assert_eq!(
            commands,
            vec![
                RenderCommand::Clear { position: 0 },
                RenderCommand::Clear { position: 1 },
            ]
        );
        assert!(session.revealed().is_empty());
        assert_eq!(session.moves(), 2);
        assert_eq!(session.phase(), Phase::AwaitingFirstReveal);
        assert!(session.tiles().iter().all(|tile| !tile.matched));
    }

    #[test]
    fn test_reveal_rejected_while_resolving() {
        let mut session = session_with(&["A", "B", "B", "A"]);
        session.reveal(0);
        session.reveal(1);

        let step = session.reveal(2);
        assert!(step.commands.is_empty());
        assert!(step.resolve.is_none());
        assert_eq!(session.moves(), 2);
        assert_eq!(session.revealed(), &[0, 1]);
        assert_eq!(session.phase(), Phase::Resolving);
    }

    #[test]
    fn test_reveal_same_tile_twice_is_ignored() {
        let mut session = session_with(&["A", "B", "B", "A"]);
        session.reveal(0);
        let step = session.reveal(0);
        assert!(step.commands.is_empty());
        assert_eq!(session.moves(), 1);
        assert_eq!(session.revealed(), &[0]);
        assert_eq!(session.phase(), Phase::AwaitingSecondReveal);
    }

    #[test]
    fn test_reveal_matched_tile_is_ignored() {
        let mut session = session_with(&["A", "A", "B", "B"]);
        session.reveal(0);
        let ticket = session.reveal(1).resolve.unwrap();
        session.resolve(&ticket);

        let step = session.reveal(1);
        assert!(step.commands.is_empty());
        assert_eq!(session.moves(), 2);
        assert!(session.revealed().is_empty());
        assert_eq!(session.phase(), Phase::AwaitingFirstReveal);
    }

    #[test]
    fn test_reveal_out_of_range_or_idle() {
        let mut idle = GameSession::new(ScoreStore::new(MemoryStore::default()));
        assert!(idle.reveal(0).commands.is_empty());
        assert_eq!(idle.moves(), 0);

        let mut session = session_with(&["A", "B", "B", "A"]);
        assert!(session.reveal(4).commands.is_empty());
        assert!(session.reveal(usize::MAX).commands.is_empty());
        assert_eq!(session.moves(), 0);
    }

    #[test]
    fn test_won_is_terminal_and_records_once() {
        let mut session = session_with(&["A", "A", "B", "B"]);
        for pair in [[0, 1], [2, 3]] {
            session.reveal(pair[0]);
            let ticket = session.reveal(pair[1]).resolve.unwrap();
            session.resolve(&ticket);
        }
        assert_eq!(session.phase(), Phase::Won);
        assert_eq!(recorded_games(&session), vec![4]);

        assert!(session.reveal(0).commands.is_empty());
        assert_eq!(session.moves(), 4);
        assert_eq!(session.scores().backend().writes, 1);
    }

    #[test]
    fn test_failed_save_still_wins() {
        let mut backend = MemoryStore::default();
        backend.fail_writes = true;
        let mut session = GameSession::new(ScoreStore::new(backend));
        session.start_with_board(
            GridSize::new(2).unwrap(),
            board_from_symbols(&["A", "B", "B", "A"]),
        );

        session.reveal(0);
        let ticket = session.reveal(3).resolve.unwrap();
        session.resolve(&ticket);
        session.reveal(1);
        let ticket = session.reveal(2).resolve.unwrap();
        let commands = session.resolve(&ticket);
        assert_eq!(session.phase(), Phase::Won);
        assert_eq!(
            commands,
            vec![
                RenderCommand::ShowMatched { position: 1 },
                RenderCommand::ShowMatched { position: 2 },
                RenderCommand::SetStatus(Status::Won),
                RenderCommand::SetBest(None),
            ]
        );
        assert!(recorded_games(&session).is_empty());
        assert_eq!(session.scores().backend().writes, 0);
        assert!(session.reveal(0).commands.is_empty());
    }

    #[test]
    fn test_resolving_twice_with_same_ticket() {
        let mut session = session_with(&["A", "A", "B", "B"]);
        session.reveal(2);
        let ticket = session.reveal(3).resolve.unwrap();
        assert_eq!(session.resolve(&ticket).len(), 2);
        assert!(session.resolve(&ticket).is_empty());
        assert_eq!(session.phase(), Phase::AwaitingFirstReveal);
    }

    #[test]
    fn test_start_invalidates_pending_resolution() {
        let mut session = session_with(&["A", "B", "B", "A"]);
        session.reveal(0);
        let ticket = session.reveal(1).resolve.unwrap();

        session.start_with_board(
            GridSize::new(2).unwrap(),
            board_from_symbols(&["A", "A", "B", "B"]),
        );
        assert!(ticket.is_cancelled());
        assert!(session.resolve(&ticket).is_empty());
        assert_eq!(session.phase(), Phase::AwaitingFirstReveal);
        assert_eq!(session.moves(), 0);
        assert!(session.tiles().iter().all(|tile| !tile.matched));

        // The fresh game is playable immediately.
        assert_eq!(session.reveal(0).commands.len(), 2);
    }

    #[test]
    fn test_start_mid_game_does_not_record() {
        let mut session = session_with(&["A", "A", "B", "B"]);
        session.reveal(0);
        let ticket = session.reveal(1).resolve.unwrap();
        session.resolve(&ticket);
        session.start_with_board(
            GridSize::new(2).unwrap(),
            board_from_symbols(&["A", "B", "A", "B"]),
        );
        assert!(recorded_games(&session).is_empty());
    }

    #[test]
    fn test_seeded_game_to_completion() {
        let mut session = GameSession::new(ScoreStore::new(MemoryStore::default()));
        let mut rng = StdRng::seed_from_u64(99);
        session.start_with_rng(GridSize::new(4).unwrap(), &mut rng);

        let mut ever_matched = vec![false; 16];
        let mut clicks = 0;
        let mut round = 0;
        while session.phase() != Phase::Won {
            // Alternate a guess at the next open tile (often a miss) with the known twin.
            let open: Vec<usize> = (0..16).filter(|&i| !session.tiles()[i].matched).collect();
            let first = open[0];
            let twin = *open
                .iter()
                .find(|&&i| i != first && session.tiles()[i].symbol == session.tiles()[first].symbol)
                .unwrap();
            let guess = if round % 2 == 0 { open[1] } else { twin };
            round += 1;

            session.reveal(first);
            let ticket = session.reveal(guess).resolve.unwrap();
            clicks += 2;
            session.resolve(&ticket);

            for (idx, tile) in session.tiles().iter().enumerate() {
                assert!(!ever_matched[idx] || tile.matched, "tile {} was unmatched", idx);
                ever_matched[idx] = tile.matched;
            }
            let all_matched = session.tiles().iter().all(|tile| tile.matched);
            assert_eq!(all_matched, session.phase() == Phase::Won);
        }
        assert_eq!(session.moves(), clicks);
        assert_eq!(recorded_games(&session), vec![clicks]);
    }
}
