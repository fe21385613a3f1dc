//! Spoken command labels and the direction arbitration applied to them.

/// Discrete output of the classifier. `Unknown` is the sentinel substituted
/// whenever capture, feature extraction, or inference fails.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommandLabel {
    Up,
    Down,
    Left,
    Right,
    Unknown,
}

impl CommandLabel {
    /// Class order of the model's output layer.
    pub const CLASSES: [CommandLabel; 4] = [
        CommandLabel::Up,
        CommandLabel::Down,
        CommandLabel::Left,
        CommandLabel::Right,
    ];

    /// Map a model class index to its label; indices outside the table yield `Unknown`.
    pub fn from_class_index(index: usize) -> Self {
        Self::CLASSES
            .get(index)
            .copied()
            .unwrap_or(CommandLabel::Unknown)
    }

    pub fn label(self) -> &'static str {
        match self {
            CommandLabel::Up => "up",
            CommandLabel::Down => "down",
            CommandLabel::Left => "left",
            CommandLabel::Right => "right",
            CommandLabel::Unknown => "unknown",
        }
    }

    /// Direction the label asks for, or `None` for `Unknown`.
    pub fn direction(self) -> Option<Direction> {
        match self {
            CommandLabel::Up => Some(Direction::Up),
            CommandLabel::Down => Some(Direction::Down),
            CommandLabel::Left => Some(Direction::Left),
            CommandLabel::Right => Some(Direction::Right),
            CommandLabel::Unknown => None,
        }
    }
}

/// One of the four axis-aligned unit vectors in screen coordinates (y grows downward).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Turns classifier output into the creature's next heading.
///
/// A label that would reverse the current heading is ignored, as is `Unknown`.
/// This is the only place direction changes originate.
pub struct CommandMapper;

impl CommandMapper {
    pub fn map(label: CommandLabel, current: Direction) -> Direction {
        Self::map_pending(label, current, current)
    }

    /// Like [`CommandMapper::map`], but the reversal check uses the heading of
    /// the last completed move. Rejected and `Unknown` labels keep `pending`.
    pub fn map_pending(
        label: CommandLabel,
        pending: Direction,
        last_moved: Direction,
    ) -> Direction {
        match label.direction() {
            Some(next) if next != last_moved.opposite() => next,
            _ => pending,
        }
    }
}
