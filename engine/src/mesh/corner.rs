//! Corner and Axis Addressing
//!
//! A cuboid corner is identified by three bits, one per axis:
//!
//! ```text
//! bit 0 (0b001): east  (+x)
//! bit 1 (0b010): top   (+y)
//! bit 2 (0b100): south (+z)
//! ```
//!
//! So `0b000` is the west-bottom-north corner and `0b111` is east-top-south.
//! The vertex layout, the index pattern and the UV orientation rule are all
//! expressed in terms of these bits. Changing any relationship here mirrors or
//! rotates textures on some faces.

use super::faces::Face;

/// Coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Corner bit that is set when a corner lies on the positive side of this axis.
    pub fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// First vertex of this axis' 8-vertex block in a cuboid's 24 vertices.
    pub fn block_offset(self) -> u32 {
        self as u32 * 8
    }
}

/// Side of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Negative = 0,
    Positive = 1,
}

impl Direction {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn sign(self) -> f32 {
        match self {
            Direction::Negative => -1.0,
            Direction::Positive => 1.0,
        }
    }
}

/// One of the eight corners of a cuboid, as a three-bit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Corner(u8);

impl Corner {
    pub const WEST_BOTTOM_NORTH: Corner = Corner(0b000);
    pub const EAST_BOTTOM_NORTH: Corner = Corner(0b001);
    pub const WEST_TOP_NORTH: Corner = Corner(0b010);
    pub const EAST_TOP_NORTH: Corner = Corner(0b011);
    pub const WEST_BOTTOM_SOUTH: Corner = Corner(0b100);
    pub const EAST_BOTTOM_SOUTH: Corner = Corner(0b101);
    pub const WEST_TOP_SOUTH: Corner = Corner(0b110);
    pub const EAST_TOP_SOUTH: Corner = Corner(0b111);

    /// All corners in code order.
    pub const ALL: [Corner; 8] = [
        Corner(0),
        Corner(1),
        Corner(2),
        Corner(3),
        Corner(4),
        Corner(5),
        Corner(6),
        Corner(7),
    ];

    pub fn new(east: bool, top: bool, south: bool) -> Self {
        Corner(east as u8 | (top as u8) << 1 | (south as u8) << 2)
    }

    /// Corner for a raw code, `None` above `0b111`.
    pub fn from_code(code: u8) -> Option<Self> {
        (code < 8).then_some(Corner(code))
    }

    pub fn code(self) -> u8 {
        self.0
    }

    pub fn is_east(self) -> bool {
        self.is_positive(Axis::X)
    }

    pub fn is_top(self) -> bool {
        self.is_positive(Axis::Y)
    }

    pub fn is_south(self) -> bool {
        self.is_positive(Axis::Z)
    }

    pub fn is_positive(self, axis: Axis) -> bool {
        self.0 & axis.bit() != 0
    }

    pub fn direction(self, axis: Axis) -> Direction {
        if self.is_positive(axis) {
            Direction::Positive
        } else {
            Direction::Negative
        }
    }

    /// Face this corner contributes to while generating the `axis` block.
    pub fn face_on(self, axis: Axis) -> Face {
        Face::from_axis(axis, self.direction(axis))
    }

    /// Unit-cube position of the corner, each component -1 or +1.
    pub fn signs(self) -> [f32; 3] {
        Axis::ALL.map(|axis| self.direction(axis).sign())
    }

    /// Which end of the face's UV rectangle this corner maps to.
    ///
    /// Y faces: v follows south (flipped on the bottom), u follows east.
    /// X faces: u follows north, Z faces: u follows east; both flipped on the
    /// negative face. Side faces put "top" at the rectangle's origin row.
    pub fn uv_corner(self, axis: Axis) -> UvCorner {
        let negative = self.direction(axis) == Direction::Negative;
        match axis {
            Axis::Y => UvCorner {
                u_end: self.is_east(),
                v_end: self.is_south() ^ negative,
            },
            Axis::X => UvCorner {
                u_end: !self.is_south() ^ negative,
                v_end: !self.is_top(),
            },
            Axis::Z => UvCorner {
                u_end: self.is_east() ^ negative,
                v_end: !self.is_top(),
            },
        }
    }
}

/// Selector into a `(u0, v0, u1, v1)` rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UvCorner {
    /// `false` picks `u0`, `true` picks `u1`
    pub u_end: bool,
    /// `false` picks `v0`, `true` picks `v1`
    pub v_end: bool,
}

impl UvCorner {
    pub const ORIGIN: UvCorner = UvCorner::new(false, false);

    pub const fn new(u_end: bool, v_end: bool) -> Self {
        Self { u_end, v_end }
    }

    /// Pick the texture coordinate out of a `[u0, v0, u1, v1]` rectangle.
    pub fn select(self, rect: [f32; 4]) -> [f32; 2] {
        let u = if self.u_end { rect[2] } else { rect[0] };
        let v = if self.v_end { rect[3] } else { rect[1] };
        [u, v]
    }
}
