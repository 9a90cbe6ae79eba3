use tracing::debug;

use crate::board::{Board, BoardError};
use crate::grid::BoardSize;
use crate::surface::{PickHit, PickScene, SurfaceDelegate, SurfaceRect};

pub const PIECE_LAYER: u32 = 31;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GameStats {
    pub moves: u32,
    pub merges: u32,
    pub play_time: f32,
}

/// Completion summary handed to the score/record display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameRecord {
    pub pieces: usize,
    pub moves: u32,
    pub time: f32,
    pub rotation: bool,
}

/// Composition root: owns the board and turns pick-surface callbacks into
/// connectivity and ordering operations.
pub struct PuzzleGame {
    board: Board,
    stats: GameStats,
    finished: bool,
    record: Option<GameRecord>,
}

impl PuzzleGame {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            stats: GameStats::default(),
            finished: false,
            record: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn stats(&self) -> GameStats {
        self.stats
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn record(&self) -> Option<GameRecord> {
        self.record
    }

    /// The clock starts at the first move and stops at completion.
    pub fn advance_time(&mut self, dt: f32) {
        if self.stats.moves > 0 && !self.finished {
            self.stats.play_time += dt;
        }
    }

    pub fn restart(&mut self, seed: u32, area: SurfaceRect) {
        self.board.scramble(seed, area);
        self.stats = GameStats::default();
        self.finished = false;
        self.record = None;
    }

    /// Rebuilds the board at a new grid size, keeping the current rules.
    pub fn resize(
        &mut self,
        size: BoardSize,
        piece_width: f32,
        piece_height: f32,
    ) -> Result<(), BoardError> {
        let rules = *self.board.rules();
        self.board = Board::new(size, piece_width, piece_height, rules)?;
        self.stats = GameStats::default();
        self.finished = false;
        self.record = None;
        Ok(())
    }

    // A released group may snap through another member's edge than the one
    // directly dragged, so every member gets one attempt.
    fn settle(&mut self, piece_id: usize) -> bool {
        if self.board.try_connect(piece_id) {
            return true;
        }
        let members: Vec<usize> = self.board.group_of(piece_id).members().to_vec();
        members
            .into_iter()
            .filter(|&member| member != piece_id)
            .any(|member| self.board.try_connect(member))
    }
}

impl SurfaceDelegate for PuzzleGame {
    fn pick_priority(&self, target: usize) -> i32 {
        self.board.piece(target).z_order()
    }

    fn on_activate(&mut self, target: usize) {
        self.board.bring_group_to_front(target);
        self.stats.moves = self.stats.moves.saturating_add(1);
    }

    fn on_move(&mut self, target: usize, delta: (f32, f32)) {
        self.board.translate_group_of(target, delta);
    }

    fn on_deactivate(&mut self, target: usize) {
        if self.finished {
            return;
        }
        if self.settle(target) {
            self.stats.merges = self.stats.merges.saturating_add(1);
            if self.board.is_solved() {
                self.finished = true;
                self.record = Some(GameRecord {
                    pieces: self.board.total_pieces(),
                    moves: self.stats.moves,
                    time: self.stats.play_time,
                    rotation: self.board.rules().rotation_enabled,
                });
                debug!(
                    moves = self.stats.moves,
                    time = self.stats.play_time,
                    "puzzle completed"
                );
            }
        }
    }
}

impl PickScene for PuzzleGame {
    fn pick_candidates(
        &self,
        layer: u32,
        point: (f32, f32),
        _max_distance: f32,
        hits: &mut [PickHit],
    ) -> usize {
        if layer != PIECE_LAYER || hits.is_empty() {
            return 0;
        }
        let max_z = self.board.max_z();
        let mut count = 0;
        for (id, piece) in self.board.pieces().iter().enumerate() {
            if !piece.visible() {
                continue;
            }
            let (min_x, min_y, width, height) = self.board.piece_bounds(id);
            if point.0 < min_x
                || point.0 > min_x + width
                || point.1 < min_y
                || point.1 > min_y + height
            {
                continue;
            }
            // stacked pieces sit nearer the camera the higher they draw
            hits[count] = PickHit {
                target: id,
                distance: (max_z - piece.z_order()) as f32,
            };
            count += 1;
            if count == hits.len() {
                break;
            }
        }
        count
    }
}
