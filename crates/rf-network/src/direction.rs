//! D8 flow direction codes.

/// One of the eight neighbours a cell drains into.
///
/// Codes run clockwise from north: 1=N, 2=NE, 3=E, 4=SE, 5=S, 6=SW, 7=W, 8=NW.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowDirection {
    North = 1,
    NorthEast = 2,
    East = 3,
    SouthEast = 4,
    South = 5,
    SouthWest = 6,
    West = 7,
    NorthWest = 8,
}

impl FlowDirection {
    /// Parse a raw grid code. Anything outside `1..=8` means "no direction".
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::North),
            2 => Some(Self::NorthEast),
            3 => Some(Self::East),
            4 => Some(Self::SouthEast),
            5 => Some(Self::South),
            6 => Some(Self::SouthWest),
            7 => Some(Self::West),
            8 => Some(Self::NorthWest),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        self as i64
    }

    /// `(row, col)` step: rows grow with latitude, columns with longitude.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (1, 0),
            Self::NorthEast => (1, 1),
            Self::East => (0, 1),
            Self::SouthEast => (-1, 1),
            Self::South => (-1, 0),
            Self::SouthWest => (-1, -1),
            Self::West => (0, -1),
            Self::NorthWest => (1, -1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trip() {
        for code in 1..=8 {
            assert_eq!(FlowDirection::from_code(code).unwrap().code(), code);
        }
    }

    #[test]
    fn invalid_codes() {
        for code in [0, 9, -1, -9999, 255] {
            assert!(FlowDirection::from_code(code).is_none());
        }
    }

    #[test]
    fn offsets_follow_code_groups() {
        for code in 1..=8 {
            let (dlat, dlon) = FlowDirection::from_code(code).unwrap().offset();
            let expect_lat = match code {
                1 | 2 | 8 => 1,
                4..=6 => -1,
                _ => 0,
            };
            let expect_lon = match code {
                2..=4 => 1,
                6..=8 => -1,
                _ => 0,
            };
            assert_eq!((dlat, dlon), (expect_lat, expect_lon), "code {}", code);
        }
    }
}
