//! Deterministic grid simulation: one creature, one food item, fixed playfield.
//!
//! Coordinates are in playfield pixels (multiples of `cell_size`), so a move
//! shifts the head by `direction * cell_size`.

mod clock;
mod food;
mod snake;

pub use clock::TickClock;
pub use food::Food;
pub use snake::Snake;

use crate::command::Direction;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

/// Number of logical cells along each axis.
pub const NUM_CELLS: i32 = 40;

/// Pixel edge length of one cell.
pub const CELL_SIZE: i32 = 20;

/// Interval between simulation advances.
pub const TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Playfield geometry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub num_cells: i32,
    pub cell_size: i32,
}

impl Grid {
    pub const fn new(num_cells: i32, cell_size: i32) -> Self {
        Self {
            num_cells,
            cell_size,
        }
    }

    /// Playfield extent in pixels on each axis.
    pub fn extent(&self) -> i32 {
        self.num_cells * self.cell_size
    }

    /// Pixel origin of the cell at grid index `(gx, gy)`.
    pub fn cell_at(&self, gx: i32, gy: i32) -> Cell {
        Cell::new(gx * self.cell_size, gy * self.cell_size)
    }

    /// Grid index of a pixel coordinate, or `None` when it lies outside the playfield.
    pub fn index_of(&self, cell: Cell) -> Option<(i32, i32)> {
        if self.contains(cell) {
            Some((cell.x / self.cell_size, cell.y / self.cell_size))
        } else {
            None
        }
    }

    /// Half-open bounds check: the last valid coordinate is `(num_cells - 1) * cell_size`.
    pub fn contains(&self, cell: Cell) -> bool {
        let extent = self.extent();
        cell.x >= 0 && cell.x < extent && cell.y >= 0 && cell.y < extent
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(NUM_CELLS, CELL_SIZE)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbouring cell one step along `direction`.
    pub fn step(self, direction: Direction, cell_size: i32) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx * cell_size, self.y + dy * cell_size)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Dead,
}

/// What happened during one simulation advance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    pub ate: bool,
    pub status: GameStatus,
}

/// Creature, food, and status for one session.
pub struct GameState {
    grid: Grid,
    snake: Snake,
    food: Food,
    status: GameStatus,
    rng: StdRng,
}

impl GameState {
    /// Fresh session; `seed` makes food placement reproducible.
    pub fn new(grid: Grid, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let food = Food::spawn(&grid, &mut rng);
        Self {
            grid,
            snake: Snake::new(&grid),
            food,
            status: GameStatus::Playing,
            rng,
        }
    }

    /// Build a session from explicit parts.
    pub fn from_parts(grid: Grid, snake: Snake, food: Food, seed: u64) -> Self {
        Self {
            grid,
            snake,
            food,
            status: GameStatus::Playing,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> &Food {
        &self.food
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn direction(&self) -> Direction {
        self.snake.direction()
    }

    /// Heading of the last completed move.
    pub fn last_moved(&self) -> Direction {
        self.snake.last_moved()
    }

    /// Set the heading used by the next advance. Callers pass the output of
    /// [`crate::command::CommandMapper`], which already applied the reversal guard.
    pub fn steer(&mut self, direction: Direction) {
        self.snake.set_direction(direction);
    }

    pub fn score(&self) -> usize {
        self.snake.len().saturating_sub(1)
    }

    /// One simulation tick: move, eat, collide. A dead game never moves again.
    pub fn step(&mut self) -> StepOutcome {
        if self.status == GameStatus::Dead {
            return StepOutcome {
                ate: false,
                status: self.status,
            };
        }

        self.snake.advance(self.grid.cell_size);

        let ate = self.snake.head() == self.food.cell();
        if ate {
            self.snake.grow(self.grid.cell_size);
            // Relocation may land on the body; occupancy is not excluded.
            self.food.relocate(&self.grid, &mut self.rng);
        }

        if self.snake.collides_with_self() || self.snake.collides_with_wall(&self.grid) {
            self.status = GameStatus::Dead;
        }

        StepOutcome {
            ate,
            status: self.status,
        }
    }
}
