//! Centre-out spiral traversal over a square tile grid.
//!
//! Tiles near the middle of a zoom level are the ones a viewer opens on, so they
//! are rendered first. The walk turns up → right → down → left and grows its leg
//! length by one every second turn.

/// Walk directions in turning order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    fn delta(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    fn turn(self) -> Self {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }
}

/// One step of the walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridStep {
    InRange(u32, u32),
    /// The walk passed outside the grid; nothing to render for this step.
    Skipped,
}

/// Spiral walk over an `n × n` grid, exactly `n * n` steps long.
#[derive(Clone, Debug)]
pub struct SpiralOrder {
    side: i64,
    x: i64,
    y: i64,
    direction: Direction,
    leg_length: u64,
    leg_progress: u64,
    turns: u64,
    remaining: u64,
}

impl SpiralOrder {
    pub fn new(side: u32) -> Self {
        let n = side as i64;
        // Odd sides start dead centre; even sides start just left of it so the
        // first n*n steps close exactly on the grid.
        Self {
            side: n,
            x: (n - 1).max(0) / 2,
            y: n / 2,
            direction: Direction::Up,
            leg_length: 1,
            leg_progress: 0,
            turns: 0,
            remaining: side as u64 * side as u64,
        }
    }

    /// Only the in-range coordinates, in walk order.
    pub fn in_range(side: u32) -> impl Iterator<Item = (u32, u32)> {
        Self::new(side).filter_map(|step| match step {
            GridStep::InRange(x, y) => Some((x, y)),
            GridStep::Skipped => None,
        })
    }

    fn advance(&mut self) {
        let (dx, dy) = self.direction.delta();
        self.x += dx;
        self.y += dy;
        self.leg_progress += 1;
        if self.leg_progress == self.leg_length {
            self.leg_progress = 0;
            self.direction = self.direction.turn();
            self.turns += 1;
            if self.turns % 2 == 0 {
                self.leg_length += 1;
            }
        }
    }
}

impl Iterator for SpiralOrder {
    type Item = GridStep;

    fn next(&mut self) -> Option<GridStep> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let in_bounds = (0..self.side).contains(&self.x) && (0..self.side).contains(&self.y);
        let step = if in_bounds {
            GridStep::InRange(self.x as u32, self.y as u32)
        } else {
            GridStep::Skipped
        };
        self.advance();
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SpiralOrder {}
