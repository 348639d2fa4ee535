use super::models::Coord;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Offset(pub i32, pub i32);

/// The six axial hex directions, in expansion order.
pub const HEX_OFFSETS: [Offset; 6] = [
    Offset(1, 0),
    Offset(0, 1),
    Offset(-1, 1),
    Offset(-1, 0),
    Offset(0, -1),
    Offset(1, -1),
];

/// One direction from each opposite pair; walking these from every point visits each edge once.
pub const FORWARD_OFFSETS: [Offset; 3] = [Offset(1, 0), Offset(0, -1), Offset(1, -1)];

pub fn is_one_step(dx: i32, dy: i32) -> bool {
    HEX_OFFSETS.contains(&Offset(dx, dy))
}

pub fn are_adjacent(a: Coord, b: Coord) -> bool {
    let (dx, dy) = a.delta_to(b);
    is_one_step(dx, dy)
}

pub fn neighbors(c: Coord) -> impl Iterator<Item = Coord> {
    HEX_OFFSETS.into_iter().map(move |Offset(dx, dy)| c.offset(dx, dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_directions_are_adjacent() {
        for Offset(dx, dy) in HEX_OFFSETS {
            assert!(is_one_step(dx, dy));
            assert!(is_one_step(-dx, -dy));
        }
        assert!(!is_one_step(1, 1));
        assert!(!is_one_step(-1, -1));
        assert!(!is_one_step(0, 0));
        assert!(!is_one_step(2, 0));
    }

    #[test]
    fn forward_offsets_cover_each_axis_once() {
        for Offset(dx, dy) in HEX_OFFSETS {
            let fwd = FORWARD_OFFSETS.contains(&Offset(dx, dy));
            let back = FORWARD_OFFSETS.contains(&Offset(-dx, -dy));
            assert!(fwd ^ back);
        }
    }

    #[test]
    fn neighbors_of_origin() {
        let n: Vec<Coord> = neighbors(Coord::new(0, 0)).collect();
        assert_eq!(n.len(), 6);
        assert!(n.iter().all(|&c| are_adjacent(Coord::new(0, 0), c)));
    }
}
