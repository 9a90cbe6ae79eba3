use tracing::debug;

use crate::board::Board;
use crate::grid::{self, Direction};

// Fixed scan order; it only decides which snap wins when several neighbors
// are in range at once.
const CANDIDATE_ORDER: [Direction; 4] = [
    Direction::Left,
    Direction::Right,
    Direction::Down,
    Direction::Up,
];

impl Board {
    /// Tries to snap `piece_id` to one of its grid neighbors. On success the
    /// neighbor's whole group is translated into the exactly mated position
    /// and absorbed into this piece's group. No-connection is a plain false.
    pub fn try_connect(&mut self, piece_id: usize) -> bool {
        let size = self.size();
        let piece = &self.pieces[piece_id];
        let coord = piece.coord();
        let group = piece.group();

        let mut scratch = std::mem::take(&mut self.neighbor_scratch);
        scratch.clear();
        for dir in CANDIDATE_ORDER {
            let Some(next) = grid::neighbor(coord, dir, size) else {
                continue;
            };
            let neighbor_id = size.index_of(next);
            let other = &self.pieces[neighbor_id];
            if other.group() == group || !other.visible() {
                continue;
            }
            scratch.push((neighbor_id, dir));
        }

        let mut connected = false;
        for &(neighbor_id, dir) in &scratch {
            // Rotated pieces never auto-connect.
            if self.pieces[piece_id].quarter_turns() != 0
                || self.pieces[neighbor_id].quarter_turns() != 0
            {
                continue;
            }
            if !self.within_snap_range(piece_id, neighbor_id, dir) {
                continue;
            }
            self.mate(piece_id, neighbor_id, dir);
            connected = true;
            break;
        }
        scratch.clear();
        self.neighbor_scratch = scratch;
        connected
    }

    // Compares the shared-edge midpoints approached from each piece's own
    // position.
    fn within_snap_range(&self, piece_id: usize, neighbor_id: usize, dir: Direction) -> bool {
        let (dx, dy) = dir.offset();
        let half = (
            dx as f32 * self.piece_width() * 0.5,
            dy as f32 * self.piece_height() * 0.5,
        );
        let a = self.pieces[piece_id].position();
        let b = self.pieces[neighbor_id].position();
        let ax = a.0 + half.0;
        let ay = a.1 + half.1;
        let bx = b.0 - half.0;
        let by = b.1 - half.1;
        let gap_x = bx - ax;
        let gap_y = by - ay;
        (gap_x * gap_x + gap_y * gap_y).sqrt() < self.snap_distance()
    }

    fn mate(&mut self, piece_id: usize, neighbor_id: usize, dir: Direction) {
        let (dx, dy) = dir.offset();
        let anchor = self.pieces[piece_id].position();
        let target = (
            anchor.0 + dx as f32 * self.piece_width(),
            anchor.1 + dy as f32 * self.piece_height(),
        );
        let current = self.pieces[neighbor_id].position();
        self.translate_group_of(neighbor_id, (target.0 - current.0, target.1 - current.1));

        let keep = self.pieces[piece_id].group();
        let absorb = self.pieces[neighbor_id].group();
        // newcomers draw at the keep group's current top
        let top_z = self.groups[keep]
            .members
            .iter()
            .map(|&member| self.pieces[member].z_order())
            .max()
            .unwrap_or(0);
        for member_index in 0..self.groups[absorb].members.len() {
            let member = self.groups[absorb].members[member_index];
            self.pieces[member].z_order = top_z;
        }
        self.merge_groups(keep, absorb);
        debug!(piece = piece_id, neighbor = neighbor_id, ?dir, "pieces connected");
    }

    /// Migrates every member of `absorb` into `keep` and empties `absorb`.
    pub fn merge_groups(&mut self, keep: usize, absorb: usize) {
        if keep == absorb {
            return;
        }
        let migrated = std::mem::take(&mut self.groups[absorb].members);
        for &member in &migrated {
            self.pieces[member].group = keep;
        }
        self.groups[keep].members.extend(migrated);
    }

    pub fn group_is_complete(&self, group_id: usize) -> bool {
        self.groups[group_id].members.len() == self.total_pieces()
    }
}
