use super::{Cell, Grid};
use rand::Rng;

/// The single food item.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Food {
    cell: Cell,
}

impl Food {
    /// Place food uniformly at random over the full grid.
    pub fn spawn<R: Rng>(grid: &Grid, rng: &mut R) -> Self {
        let mut food = Self {
            cell: Cell::new(0, 0),
        };
        food.relocate(grid, rng);
        food
    }

    pub fn at(cell: Cell) -> Self {
        Self { cell }
    }

    pub fn cell(&self) -> Cell {
        self.cell
    }

    /// Move to a uniformly chosen cell. Cells occupied by the creature are not excluded.
    pub fn relocate<R: Rng>(&mut self, grid: &Grid, rng: &mut R) {
        let gx = rng.gen_range(0..grid.num_cells);
        let gy = rng.gen_range(0..grid.num_cells);
        self.cell = grid.cell_at(gx, gy);
    }
}
