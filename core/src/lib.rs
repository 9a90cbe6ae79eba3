pub mod board;
pub mod codec;
mod connect;
pub mod game;
pub mod grid;
pub mod snapshot;
pub mod surface;

pub use board::{Board, BoardError, Group, Piece};
pub use game::{GameRecord, GameStats, PuzzleGame, PIECE_LAYER};
pub use grid::{direction_of, is_border, neighbor, BoardSize, Coord, Direction};
pub use snapshot::{BoardSnapshot, GameRules, BOARD_SNAPSHOT_VERSION};
pub use surface::{
    DragLock, PickHit, PickScene, PickSurface, PointerState, SurfaceCamera, SurfaceDelegate,
    SurfaceId, SurfaceRect, HIT_BUFFER_CAPACITY_DEFAULT,
};
