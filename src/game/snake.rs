use super::{Cell, Grid};
use crate::command::Direction;
use std::collections::VecDeque;

/// Creature body, head first.
///
/// While alive the body holds no duplicate cells; only [`Snake::grow`] changes
/// its length.
#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Cell>,
    direction: Direction,
    /// Heading of the last completed move; the neck lies opposite it.
    last_moved: Direction,
}

impl Snake {
    /// Single segment at the centre of the grid, heading right.
    pub fn new(grid: &Grid) -> Self {
        let centre = grid.num_cells / 2;
        let mut body = VecDeque::new();
        body.push_back(grid.cell_at(centre, centre));
        Self {
            body,
            direction: Direction::Right,
            last_moved: Direction::Right,
        }
    }

    /// Build a body from explicit segments (head first). Returns `None` for an empty body.
    pub fn from_segments(segments: Vec<Cell>, direction: Direction) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        Some(Self {
            body: segments.into(),
            direction,
            last_moved: direction,
        })
    }

    pub fn head(&self) -> Cell {
        // The body is never empty: constructors reject it and moves keep length.
        self.body[0]
    }

    pub fn segments(&self) -> impl Iterator<Item = &Cell> {
        self.body.iter()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn last_moved(&self) -> Direction {
        self.last_moved
    }

    pub(super) fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    fn next_head(&self, cell_size: i32) -> Cell {
        self.head().step(self.direction, cell_size)
    }

    /// Prepend the next head and drop the tail; length is unchanged.
    pub fn advance(&mut self, cell_size: i32) {
        let head = self.next_head(cell_size);
        self.body.push_front(head);
        self.body.pop_back();
        self.last_moved = self.direction;
    }

    /// Prepend the next head without dropping the tail; length grows by one.
    pub fn grow(&mut self, cell_size: i32) {
        let head = self.next_head(cell_size);
        self.body.push_front(head);
        self.last_moved = self.direction;
    }

    pub fn collides_with_self(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|segment| *segment == head)
    }

    pub fn collides_with_wall(&self, grid: &Grid) -> bool {
        !grid.contains(self.head())
    }
}
