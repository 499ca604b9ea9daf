//! Playfield grid

use crate::config::MAX_WIDTH;

/// A lane, which is also a display row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lane {
    #[default]
    Top,
    Bottom,
}

impl Lane {
    /// Display row of this lane
    pub fn row(self) -> u8 {
        match self {
            Lane::Top => 0,
            Lane::Bottom => 1,
        }
    }

    /// The opposite lane
    pub fn other(self) -> Lane {
        match self {
            Lane::Top => Lane::Bottom,
            Lane::Bottom => Lane::Top,
        }
    }

    fn index(self) -> usize {
        self.row() as usize
    }
}

/// Content of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cell {
    #[default]
    Empty,
    Obstacle,
}

/// Both cells of one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Column {
    pub top: Cell,
    pub bottom: Cell,
}

impl Column {
    /// Cell in `lane`
    pub fn get(&self, lane: Lane) -> Cell {
        match lane {
            Lane::Top => self.top,
            Lane::Bottom => self.bottom,
        }
    }

    /// Whether either lane holds an obstacle
    pub fn is_clear(&self) -> bool {
        self.top == Cell::Empty && self.bottom == Cell::Empty
    }
}

/// Two lanes of obstacle cells
///
/// The player is not stored here; the engine tracks its lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playfield {
    cells: [[Cell; MAX_WIDTH as usize]; 2],
    width: u8,
}

impl Playfield {
    /// Empty playfield `width` columns wide (clamped to `MAX_WIDTH`)
    pub fn new(width: u8) -> Self {
        Self {
            cells: [[Cell::Empty; MAX_WIDTH as usize]; 2],
            width: width.min(MAX_WIDTH),
        }
    }

    /// Visible columns
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Remove every obstacle
    pub fn clear(&mut self) {
        self.cells = [[Cell::Empty; MAX_WIDTH as usize]; 2];
    }

    /// Cell at a position; out-of-range columns read as empty
    pub fn get(&self, lane: Lane, col: u8) -> Cell {
        if col >= self.width {
            return Cell::Empty;
        }
        self.cells[lane.index()][col as usize]
    }

    /// Set a cell; out-of-range columns are ignored
    pub fn set(&mut self, lane: Lane, col: u8, cell: Cell) {
        if col < self.width {
            self.cells[lane.index()][col as usize] = cell;
        }
    }

    /// Both cells of a column
    pub fn column(&self, col: u8) -> Column {
        Column {
            top: self.get(Lane::Top, col),
            bottom: self.get(Lane::Bottom, col),
        }
    }

    /// Whether the last `n` columns are empty in both lanes
    pub fn trailing_clear(&self, n: u8) -> bool {
        let start = self.width.saturating_sub(n);
        (start..self.width).all(|col| self.column(col).is_clear())
    }

    /// Scroll every column one step left and empty the trailing column
    ///
    /// Whatever was in column 0 leaves the playfield.
    pub fn shift_left(&mut self) {
        let width = self.width as usize;
        if width == 0 {
            return;
        }
        for lane in self.cells.iter_mut() {
            lane.copy_within(1..width, 0);
            lane[width - 1] = Cell::Empty;
        }
    }

    /// Number of obstacles on the playfield
    pub fn obstacle_count(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|lane| lane[..self.width as usize].iter())
            .filter(|&&cell| cell == Cell::Obstacle)
            .count()
    }
}
