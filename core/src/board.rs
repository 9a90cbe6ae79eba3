use crate::grid::{self, BoardSize, Coord, Direction};
use crate::snapshot::GameRules;
use crate::surface::SurfaceRect;

pub const SNAP_DISTANCE_RATIO_DEFAULT: f32 = 0.25;
pub const SNAP_DISTANCE_RATIO_MIN: f32 = 0.05;
pub const SNAP_DISTANCE_RATIO_MAX: f32 = 0.50;

pub const SCATTER_RANGE_RATIO_DEFAULT: f32 = 0.15;
pub const SCATTER_RANGE_RATIO_MAX: f32 = 0.45;

pub const ROTATE_SCRAMBLE_MIN: u32 = 1;
pub const ROTATE_SCRAMBLE_MAX: u32 = 5;

pub const TILE_SPACING_RATIO: f32 = 1.2;

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("board needs at least one piece, got {cols}x{rows}")]
    EmptyBoard { cols: u32, rows: u32 },
    #[error("piece size must be positive, got {width}x{height}")]
    BadPieceSize { width: f32, height: f32 },
    #[error("snapshot version {0} is not supported")]
    SnapshotVersion(u32),
    #[error("snapshot does not describe a {expected}-piece board")]
    SnapshotShape { expected: usize },
    #[error("snapshot group table does not partition the pieces")]
    BrokenGroups,
}

#[derive(Clone, Debug)]
pub struct Piece {
    pub(crate) coord: Coord,
    pub(crate) position: (f32, f32),
    pub(crate) quarter_turns: u8,
    pub(crate) z_order: i32,
    pub(crate) visible: bool,
    pub(crate) group: usize,
}

impl Piece {
    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn position(&self) -> (f32, f32) {
        self.position
    }

    pub fn quarter_turns(&self) -> u8 {
        self.quarter_turns
    }

    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn group(&self) -> usize {
        self.group
    }
}

#[derive(Clone, Debug, Default)]
pub struct Group {
    pub(crate) members: Vec<usize>,
}

impl Group {
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

pub struct Board {
    size: BoardSize,
    piece_width: f32,
    piece_height: f32,
    rules: GameRules,
    snap_distance: f32,
    pub(crate) pieces: Vec<Piece>,
    pub(crate) groups: Vec<Group>,
    pub(crate) neighbor_scratch: Vec<(usize, Direction)>,
    pub(crate) max_z: i32,
}

impl Board {
    pub fn new(
        size: BoardSize,
        piece_width: f32,
        piece_height: f32,
        rules: GameRules,
    ) -> Result<Self, BoardError> {
        if size.total() == 0 {
            return Err(BoardError::EmptyBoard {
                cols: size.cols,
                rows: size.rows,
            });
        }
        if piece_width <= 0.0 || piece_height <= 0.0 {
            return Err(BoardError::BadPieceSize {
                width: piece_width,
                height: piece_height,
            });
        }
        let ratio = rules
            .snap_distance_ratio
            .clamp(SNAP_DISTANCE_RATIO_MIN, SNAP_DISTANCE_RATIO_MAX);
        let snap_distance = piece_width.min(piece_height) * ratio;
        let mut board = Self {
            size,
            piece_width,
            piece_height,
            rules,
            snap_distance,
            pieces: Vec::new(),
            groups: Vec::new(),
            neighbor_scratch: Vec::with_capacity(4),
            max_z: 0,
        };
        board.reset_layout();
        Ok(board)
    }

    /// Puts every piece back on its solved cell as a singleton group.
    pub fn reset_layout(&mut self) {
        let total = self.size.total();
        self.pieces.clear();
        self.groups.clear();
        for index in 0..total {
            let coord = self.size.coord_of(index);
            self.pieces.push(Piece {
                coord,
                position: (
                    coord.x as f32 * self.piece_width,
                    coord.y as f32 * self.piece_height,
                ),
                quarter_turns: 0,
                z_order: index as i32,
                visible: true,
                group: index,
            });
            self.groups.push(Group {
                members: vec![index],
            });
        }
        self.max_z = total as i32;
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    pub fn total_pieces(&self) -> usize {
        self.size.total()
    }

    pub fn piece_width(&self) -> f32 {
        self.piece_width
    }

    pub fn piece_height(&self) -> f32 {
        self.piece_height
    }

    pub fn snap_distance(&self) -> f32 {
        self.snap_distance
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn max_z(&self) -> i32 {
        self.max_z
    }

    /// Rect of the assembled picture with the bottom-left piece at origin.
    pub fn frame(&self) -> SurfaceRect {
        SurfaceRect::new(
            0.0,
            0.0,
            self.size.cols as f32 * self.piece_width,
            self.size.rows as f32 * self.piece_height,
        )
    }

    pub fn piece(&self, id: usize) -> &Piece {
        &self.pieces[id]
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn group(&self, id: usize) -> &Group {
        &self.groups[id]
    }

    pub fn group_of(&self, piece_id: usize) -> &Group {
        &self.groups[self.pieces[piece_id].group]
    }

    pub fn piece_at(&self, coord: Coord) -> &Piece {
        &self.pieces[self.size.index_of(coord)]
    }

    /// Axis-aligned bounds of a piece; odd quarter turns swap the extents
    /// around the piece center.
    pub fn piece_bounds(&self, id: usize) -> (f32, f32, f32, f32) {
        let piece = &self.pieces[id];
        let (w, h) = if piece.quarter_turns % 2 == 1 {
            (self.piece_height, self.piece_width)
        } else {
            (self.piece_width, self.piece_height)
        };
        let center_x = piece.position.0 + self.piece_width * 0.5;
        let center_y = piece.position.1 + self.piece_height * 0.5;
        (center_x - w * 0.5, center_y - h * 0.5, w, h)
    }

    pub fn translate_group_of(&mut self, piece_id: usize, delta: (f32, f32)) {
        let group = self.pieces[piece_id].group;
        let members = std::mem::take(&mut self.groups[group].members);
        for &member in &members {
            let pos = &mut self.pieces[member].position;
            *pos = (pos.0 + delta.0, pos.1 + delta.1);
        }
        self.groups[group].members = members;
    }

    /// Raises the grabbed piece's whole group above everything else, unless
    /// it already sits on top.
    pub fn bring_group_to_front(&mut self, piece_id: usize) -> bool {
        if self.pieces[piece_id].z_order == self.max_z {
            return false;
        }
        self.max_z += 1;
        let group = self.pieces[piece_id].group;
        let members = std::mem::take(&mut self.groups[group].members);
        for &member in &members {
            self.pieces[member].z_order = self.max_z;
        }
        self.groups[group].members = members;
        true
    }

    /// Rotates a single loose piece by the given number of quarter turns.
    /// Connected pieces no longer rotate; returns false for those.
    pub fn rotate_piece(&mut self, piece_id: usize, quarter_turns: i32) -> bool {
        let group = self.pieces[piece_id].group;
        if self.groups[group].members.len() != 1 {
            return false;
        }
        let turns = quarter_turns.rem_euclid(4) as u8;
        let piece = &mut self.pieces[piece_id];
        piece.quarter_turns = (piece.quarter_turns + turns) % 4;
        true
    }

    pub fn set_piece_visible(&mut self, piece_id: usize, visible: bool) {
        self.pieces[piece_id].visible = visible;
    }

    pub fn show_all(&mut self) {
        for piece in &mut self.pieces {
            piece.visible = true;
        }
    }

    /// Display mode that keeps only the border pieces on the table.
    pub fn show_border_only(&mut self) {
        let size = self.size;
        for piece in &mut self.pieces {
            if !grid::is_border(piece.coord, size) {
                piece.visible = false;
            }
        }
    }

    pub fn is_solved(&self) -> bool {
        let total = self.total_pieces();
        self.groups.iter().any(|group| group.members.len() == total)
    }

    /// True when every piece belongs to exactly the group its index names.
    pub fn partition_is_valid(&self) -> bool {
        let total = self.total_pieces();
        let mut seen = vec![false; total];
        for (group_id, group) in self.groups.iter().enumerate() {
            for &member in &group.members {
                if member >= total || seen[member] || self.pieces[member].group != group_id {
                    return false;
                }
                seen[member] = true;
            }
        }
        seen.into_iter().all(|flag| flag)
    }

    /// Scatters every piece over `area` and re-scrambles groups, z-order and
    /// (when the rules allow it) the rotation of a few pieces.
    pub fn scramble(&mut self, seed: u32, area: SurfaceRect) {
        self.reset_layout();
        let range = self
            .rules
            .scatter_range_ratio
            .clamp(0.0, SCATTER_RANGE_RATIO_MAX);
        let center_x = area.min_x + area.width * 0.5 - self.piece_width * 0.5;
        let center_y = area.min_y + area.height * 0.5 - self.piece_height * 0.5;
        for index in 0..self.pieces.len() {
            let salt = (index as u32) << 1;
            let dx = rand_range(seed, salt, -range, range) * area.width;
            let dy = rand_range(seed, salt + 1, -range, range) * area.height;
            self.pieces[index].position = (center_x + dx, center_y + dy);
        }
        if self.rules.rotation_enabled {
            self.scramble_rotations(splitmix32(seed ^ 0x5EED_C001));
        }
    }

    fn scramble_rotations(&mut self, seed: u32) {
        let span = ROTATE_SCRAMBLE_MAX - ROTATE_SCRAMBLE_MIN + 1;
        let count = ROTATE_SCRAMBLE_MIN + (splitmix32(seed) % span);
        let total = self.pieces.len();
        for slot in 0..count {
            let pick = splitmix32(seed ^ (0x00C0_FFEE + slot)) as usize % total;
            let turns = 1 + (splitmix32(seed ^ (0x0BAD_5EED + slot)) % 3) as u8;
            self.pieces[pick].quarter_turns = turns;
        }
    }

    /// Lines up still-loose visible pieces in columns starting at `origin`,
    /// leaving connected groups where they are.
    pub fn tile_loose_pieces(&mut self, origin: (f32, f32), seed: u32) {
        let per_column = ((self.size.rows as f32 * TILE_SPACING_RATIO) as usize).max(1);
        let mut order: Vec<usize> = (0..self.pieces.len()).collect();
        shuffle(&mut order, seed);
        let mut count = 0usize;
        for id in order {
            let piece = &self.pieces[id];
            if !piece.visible || self.groups[piece.group].members.len() != 1 {
                continue;
            }
            let col = (count / per_column) as f32;
            let row = (count % per_column) as f32;
            self.pieces[id].position = (
                origin.0 + col * self.piece_width * TILE_SPACING_RATIO,
                origin.1 + row * self.piece_height * TILE_SPACING_RATIO,
            );
            count += 1;
        }
    }
}

pub fn splitmix32(mut value: u32) -> u32 {
    value = value.wrapping_add(0x9E37_79B9);
    let mut z = value;
    z = (z ^ (z >> 16)).wrapping_mul(0x85EB_CA6B);
    z = (z ^ (z >> 13)).wrapping_mul(0xC2B2_AE35);
    z ^ (z >> 16)
}

pub fn rand_unit(seed: u32, salt: u32) -> f32 {
    let mixed = splitmix32(seed ^ salt);
    (mixed >> 8) as f32 / (1u32 << 24) as f32
}

pub fn rand_range(seed: u32, salt: u32, min: f32, max: f32) -> f32 {
    min + (max - min) * rand_unit(seed, salt)
}

fn shuffle(values: &mut [usize], seed: u32) {
    for i in (1..values.len()).rev() {
        let j = splitmix32(seed ^ (0xC0DE + i as u32)) as usize % (i + 1);
        values.swap(i, j);
    }
}
