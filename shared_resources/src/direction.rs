use crate::FloorIndex;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// The floor one step away from `floor` in this direction, `None` when
    /// that would underflow.
    pub fn step(self, floor: FloorIndex) -> Option<FloorIndex> {
        match self {
            Direction::Up => floor.checked_add(1),
            Direction::Down => floor.checked_sub(1),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_stops_at_the_ground_floor() {
        assert_eq!(Direction::Down.step(0), None);
        assert_eq!(Direction::Down.step(3), Some(2));
        assert_eq!(Direction::Up.step(3), Some(4));
    }

    #[test]
    fn opposite_flips() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Down.opposite(), Direction::Up);
    }
}
