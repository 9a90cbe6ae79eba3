use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use jiguso_core::{
    Board, BoardSize, Direction, DragLock, GameRules, PickSurface, PointerState, PuzzleGame,
    SurfaceCamera, SurfaceId, SurfaceRect, PIECE_LAYER,
};

const TICK_SECONDS: f32 = 1.0 / 60.0;
const SETTLE_JITTER_RATIO: f32 = 0.3;

pub(crate) struct SolveConfig {
    pub cols: u32,
    pub rows: u32,
    pub piece_width: f32,
    pub piece_height: f32,
    pub seed: u32,
    pub rotate: bool,
    pub drag_steps: u32,
    pub max_drags: u32,
}

#[derive(Serialize)]
pub(crate) struct SolveReport {
    pub solved: bool,
    pub pieces: usize,
    pub drags: u32,
    pub moves: u32,
    pub merges: u32,
    pub ticks: u64,
    pub play_time_secs: f32,
    pub seed: u32,
}

pub(crate) fn run_solve(config: SolveConfig) -> Result<SolveReport, Box<dyn std::error::Error>> {
    let rules = GameRules {
        rotation_enabled: config.rotate,
        ..GameRules::default()
    };
    let board = Board::new(
        BoardSize::new(config.cols, config.rows),
        config.piece_width,
        config.piece_height,
        rules,
    )?;
    let mut game = PuzzleGame::new(board);

    // play area: the picture frame plus one piece of margin on every side
    let frame = game.board().frame();
    let area = SurfaceRect::new(
        frame.min_x - config.piece_width,
        frame.min_y - config.piece_height,
        frame.width + config.piece_width * 2.0,
        frame.height + config.piece_height * 2.0,
    );
    game.restart(config.seed, area);

    let camera = SurfaceCamera::overhead(area, area.width.max(area.height));
    let lock = Rc::new(DragLock::new());
    let total = game.board().total_pieces();
    let mut surface = PickSurface::with_hit_capacity(
        SurfaceId(1),
        camera,
        PIECE_LAYER,
        Rc::clone(&lock),
        total.max(1),
    );

    let mut rng = StdRng::seed_from_u64(config.seed as u64);
    let max_drags = if config.max_drags == 0 {
        (total as u32).saturating_mul(8).max(16)
    } else {
        config.max_drags
    };
    let steps = config.drag_steps.max(1);
    let mut ticks: u64 = 0;
    let mut drags: u32 = 0;

    while !game.finished() && drags < max_drags {
        let Some(grab) = choose_grab(&mut game, &mut rng) else {
            break;
        };
        let start = piece_center(game.board(), grab);
        surface.tick(PointerState::pressed_at(start.0, start.1), &mut game);
        ticks += 1;
        game.advance_time(TICK_SECONDS);

        let Some(got) = surface.active() else {
            drags += 1;
            continue;
        };

        // Overlapping pieces may put a different piece in hand; drag
        // whatever was grabbed toward its own best mate.
        let goal = match mate_target(game.board(), got) {
            Some(target) => settle_near(target, game.board().snap_distance(), &mut rng),
            None => random_point(area, &mut rng),
        };
        let goal = clamp_into(goal, area);

        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            let eased = t * t * (3.0 - 2.0 * t);
            let x = start.0 + (goal.0 - start.0) * eased;
            let y = start.1 + (goal.1 - start.1) * eased;
            surface.tick(PointerState::pressed_at(x, y), &mut game);
            ticks += 1;
            game.advance_time(TICK_SECONDS);
        }
        surface.tick(PointerState::released_at(goal.0, goal.1), &mut game);
        ticks += 1;
        game.advance_time(TICK_SECONDS);
        drags += 1;
    }

    let stats = game.stats();
    Ok(SolveReport {
        solved: game.finished(),
        pieces: total,
        drags,
        moves: stats.moves,
        merges: stats.merges,
        ticks,
        play_time_secs: stats.play_time,
        seed: config.seed,
    })
}

// Picks a piece that still has a mate somewhere, squaring up rotated loose
// pieces first so they become connectable.
fn choose_grab(game: &mut PuzzleGame, rng: &mut StdRng) -> Option<usize> {
    let board = game.board();
    let mut rotated: Vec<usize> = Vec::new();
    let mut ready: Vec<usize> = Vec::new();
    for id in 0..board.total_pieces() {
        let piece = board.piece(id);
        if !piece.visible() {
            continue;
        }
        if piece.quarter_turns() != 0 {
            rotated.push(id);
            continue;
        }
        if mate_target(board, id).is_some() {
            ready.push(id);
        }
    }
    for id in rotated {
        let turns = game.board().piece(id).quarter_turns() as i32;
        if game.board_mut().rotate_piece(id, -turns) {
            ready.push(id);
        }
    }
    if ready.is_empty() {
        return None;
    }
    let pick = rng.random_range(0..ready.len());
    Some(ready[pick])
}

// Pointer goal that would mate `id` against one of its unconnected grid
// neighbors, expressed as the dragged piece's final center.
fn mate_target(board: &Board, id: usize) -> Option<(f32, f32)> {
    let piece = board.piece(id);
    if piece.quarter_turns() != 0 {
        return None;
    }
    for dir in [
        Direction::Left,
        Direction::Right,
        Direction::Down,
        Direction::Up,
    ] {
        let Some(next) = jiguso_core::neighbor(piece.coord(), dir, board.size()) else {
            continue;
        };
        let other = board.piece_at(next);
        if other.group() == piece.group() || !other.visible() || other.quarter_turns() != 0 {
            continue;
        }
        let (dx, dy) = dir.offset();
        let other_center = (
            other.position().0 + board.piece_width() * 0.5,
            other.position().1 + board.piece_height() * 0.5,
        );
        return Some((
            other_center.0 - dx as f32 * board.piece_width(),
            other_center.1 - dy as f32 * board.piece_height(),
        ));
    }
    None
}

fn piece_center(board: &Board, id: usize) -> (f32, f32) {
    let pos = board.piece(id).position();
    (
        pos.0 + board.piece_width() * 0.5,
        pos.1 + board.piece_height() * 0.5,
    )
}

fn settle_near(target: (f32, f32), snap_distance: f32, rng: &mut StdRng) -> (f32, f32) {
    let jitter = snap_distance * SETTLE_JITTER_RATIO;
    if jitter <= 0.0 {
        return target;
    }
    (
        target.0 + rng.random_range(-jitter..=jitter),
        target.1 + rng.random_range(-jitter..=jitter),
    )
}

fn random_point(area: SurfaceRect, rng: &mut StdRng) -> (f32, f32) {
    (
        area.min_x + rng.random::<f32>() * area.width,
        area.min_y + rng.random::<f32>() * area.height,
    )
}

fn clamp_into(point: (f32, f32), area: SurfaceRect) -> (f32, f32) {
    (
        point.0.clamp(area.min_x, area.min_x + area.width),
        point.1.clamp(area.min_y, area.min_y + area.height),
    )
}
