use rkyv::{Archive, Deserialize, Serialize};

use crate::board::{
    Board, BoardError, Group, SCATTER_RANGE_RATIO_DEFAULT, SNAP_DISTANCE_RATIO_DEFAULT,
};
use crate::grid::BoardSize;

pub const BOARD_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Archive, Serialize, Deserialize)]
pub struct GameRules {
    pub snap_distance_ratio: f32,
    pub scatter_range_ratio: f32,
    pub rotation_enabled: bool,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            snap_distance_ratio: SNAP_DISTANCE_RATIO_DEFAULT,
            scatter_range_ratio: SCATTER_RANGE_RATIO_DEFAULT,
            rotation_enabled: false,
        }
    }
}

/// Everything the persistence side needs to bring a board back. How these
/// bytes end up on disk is the save subsystem's business, not ours.
#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub version: u32,
    pub cols: u32,
    pub rows: u32,
    pub piece_width: f32,
    pub piece_height: f32,
    pub rules: GameRules,
    pub positions: Vec<(f32, f32)>,
    pub quarter_turns: Vec<u8>,
    pub z_orders: Vec<i32>,
    pub visible: Vec<bool>,
    pub group_of: Vec<u32>,
}

impl Board {
    pub fn snapshot(&self) -> BoardSnapshot {
        let size = self.size();
        BoardSnapshot {
            version: BOARD_SNAPSHOT_VERSION,
            cols: size.cols,
            rows: size.rows,
            piece_width: self.piece_width(),
            piece_height: self.piece_height(),
            rules: *self.rules(),
            positions: self.pieces().iter().map(|piece| piece.position()).collect(),
            quarter_turns: self
                .pieces()
                .iter()
                .map(|piece| piece.quarter_turns())
                .collect(),
            z_orders: self.pieces().iter().map(|piece| piece.z_order()).collect(),
            visible: self.pieces().iter().map(|piece| piece.visible()).collect(),
            group_of: self
                .pieces()
                .iter()
                .map(|piece| piece.group() as u32)
                .collect(),
        }
    }

    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Result<Self, BoardError> {
        if snapshot.version != BOARD_SNAPSHOT_VERSION {
            return Err(BoardError::SnapshotVersion(snapshot.version));
        }
        let size = BoardSize::new(snapshot.cols, snapshot.rows);
        let mut board = Board::new(
            size,
            snapshot.piece_width,
            snapshot.piece_height,
            snapshot.rules,
        )?;
        let total = size.total();
        if snapshot.positions.len() != total
            || snapshot.quarter_turns.len() != total
            || snapshot.z_orders.len() != total
            || snapshot.visible.len() != total
            || snapshot.group_of.len() != total
        {
            return Err(BoardError::SnapshotShape { expected: total });
        }
        if snapshot
            .group_of
            .iter()
            .any(|&label| label as usize >= total)
        {
            return Err(BoardError::BrokenGroups);
        }
        board.groups = vec![Group::default(); total];
        for id in 0..total {
            let piece = &mut board.pieces[id];
            piece.position = snapshot.positions[id];
            piece.quarter_turns = snapshot.quarter_turns[id] % 4;
            piece.z_order = snapshot.z_orders[id];
            piece.visible = snapshot.visible[id];
            let label = snapshot.group_of[id] as usize;
            piece.group = label;
            board.groups[label].members.push(id);
        }
        board.max_z = snapshot
            .z_orders
            .iter()
            .copied()
            .max()
            .unwrap_or(0)
            .max(total as i32);
        Ok(board)
    }
}
