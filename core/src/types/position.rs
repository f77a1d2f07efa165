/// A map cell coordinate. Pointer positions can be negative when the cursor is off the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// True when both coordinates are on the map side of the origin.
    pub fn is_on_map(&self) -> bool {
        self.x >= 0 && self.y >= 0
    }
}

/// Rounds a rendered coordinate to its cell the way the renderer does (half-up).
pub fn round_coord(value: f32) -> i32 {
    (value + 0.5).floor() as i32
}

/// Packs a position and direction into the 3-byte `PosDir` wire layout
/// (10 bits x, 10 bits y, 4 bits direction).
pub fn encode_pos_dir(x: u16, y: u16, dir: u8) -> [u8; 3] {
    [
        (x >> 2) as u8,
        (((x & 0x03) << 6) as u8) | ((y >> 4) & 0x3F) as u8,
        (((y & 0x0F) << 4) as u8) | (dir & 0x0F),
    ]
}

/// Inverse of [`encode_pos_dir`].
pub fn decode_pos_dir(bytes: [u8; 3]) -> (u16, u16, u8) {
    let x = ((bytes[0] as u16) << 2) | ((bytes[1] as u16) >> 6);
    let y = (((bytes[1] & 0x3F) as u16) << 4) | ((bytes[2] as u16) >> 4);
    let dir = bytes[2] & 0x0F;
    (x, y, dir)
}

/// Returns the 8-way facing (0 = north, counter-clockwise) from `from` towards `to`.
///
/// Each direction covers a 45 degree sector. Returns `None` when both cells are the same.
pub fn direction_towards(from: Cell, to: Cell) -> Option<u8> {
    let dx = (to.x - from.x) as f32;
    let dy = (to.y - from.y) as f32;
    if dx == 0.0 && dy == 0.0 {
        return None;
    }

    let angle = (-dx).atan2(dy).to_degrees();
    let sector = (angle / 45.0).round() as i32;
    Some(sector.rem_euclid(8) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pos_dir_packs_known_layout() {
        // x=150 (0b0010010110), y=220 (0b0011011100), dir=5
        let packed = encode_pos_dir(150, 220, 5);
        assert_eq!(packed, [0x25, 0x8D, 0xC5]);
        assert_eq!(decode_pos_dir(packed), (150, 220, 5));
    }

    #[test]
    fn pos_dir_keeps_ten_bit_extremes() {
        let packed = encode_pos_dir(1023, 1023, 7);
        assert_eq!(decode_pos_dir(packed), (1023, 1023, 7));
    }

    #[test]
    fn round_coord_rounds_half_up() {
        assert_eq!(round_coord(8.49), 8);
        assert_eq!(round_coord(8.5), 9);
        assert_eq!(round_coord(-0.5), 0);
        assert_eq!(round_coord(-0.51), -1);
    }

    #[test]
    fn direction_covers_all_octants() {
        let origin = Cell::new(10, 10);
        assert_eq!(direction_towards(origin, Cell::new(10, 12)), Some(0));
        assert_eq!(direction_towards(origin, Cell::new(8, 12)), Some(1));
        assert_eq!(direction_towards(origin, Cell::new(7, 10)), Some(2));
        assert_eq!(direction_towards(origin, Cell::new(9, 9)), Some(3));
        assert_eq!(direction_towards(origin, Cell::new(10, 0)), Some(4));
        assert_eq!(direction_towards(origin, Cell::new(11, 9)), Some(5));
        assert_eq!(direction_towards(origin, Cell::new(20, 10)), Some(6));
        assert_eq!(direction_towards(origin, Cell::new(11, 11)), Some(7));
        assert_eq!(direction_towards(origin, origin), None);
    }

    #[test]
    fn direction_snaps_to_nearest_sector() {
        // Mostly north with a slight westward drift stays north.
        assert_eq!(
            direction_towards(Cell::new(0, 0), Cell::new(-1, 5)),
            Some(0)
        );
    }
}
