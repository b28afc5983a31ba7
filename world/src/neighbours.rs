//! Fixed neighbour offsets and the allocation-free iterator over them.

use pathviz_core::Position;

/// Orthogonal offsets in the order the search expands them.
const ORTHOGONAL_OFFSETS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Diagonal offsets appended after the orthogonal ones when requested.
const DIAGONAL_OFFSETS: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];

/// Iterator over the non-solid neighbours of a cell.
///
/// Yields at most eight positions, in offset order.
#[derive(Clone, Debug, Default)]
pub struct Neighbours {
    buffer: [Option<Position>; 8],
    len: usize,
    cursor: usize,
}

impl Neighbours {
    pub(crate) fn collect_from<F>(origin: Position, diagonals: bool, mut is_solid: F) -> Self
    where
        F: FnMut(Position) -> bool,
    {
        let mut neighbours = Self::default();
        let diagonal_offsets: &[(i32, i32)] = if diagonals { &DIAGONAL_OFFSETS } else { &[] };

        for &(dx, dy) in ORTHOGONAL_OFFSETS.iter().chain(diagonal_offsets) {
            let candidate = origin.offset(dx, dy);
            if !is_solid(candidate) {
                neighbours.push(candidate);
            }
        }

        neighbours
    }

    fn push(&mut self, position: Position) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(position);
            self.len += 1;
        }
    }
}

impl Iterator for Neighbours {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.cursor;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Neighbours {}
