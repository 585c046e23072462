//! Face Identity and Per-Face Storage
//!
//! A cuboid has six faces with a fixed ordering that every other part of the
//! mesh code relies on: `0=-x, 1=+x, 2=-y, 3=+y, 4=-z, 5=+z`.

use glam::Vec3;
use std::ops::{Index, IndexMut};

use super::corner::{Axis, Direction};

/// One face of an axis-aligned cuboid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    /// West, -x
    NegX = 0,
    /// East, +x
    PosX = 1,
    /// Bottom, -y
    NegY = 2,
    /// Top, +y
    PosY = 3,
    /// North, -z
    NegZ = 4,
    /// South, +z
    PosZ = 5,
}

impl Face {
    /// All faces in slot order.
    pub const ALL: [Face; 6] = [
        Face::NegX,
        Face::PosX,
        Face::NegY,
        Face::PosY,
        Face::NegZ,
        Face::PosZ,
    ];

    /// Face for a slot index, `None` when the index is outside `0..6`.
    pub fn from_index(index: usize) -> Option<Face> {
        Self::ALL.get(index).copied()
    }

    /// The face lying on `axis` on the `direction` side.
    pub fn from_axis(axis: Axis, direction: Direction) -> Face {
        Self::ALL[axis.index() * 2 + direction.index()]
    }

    /// Slot index of this face.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn axis(self) -> Axis {
        match self {
            Face::NegX | Face::PosX => Axis::X,
            Face::NegY | Face::PosY => Axis::Y,
            Face::NegZ | Face::PosZ => Axis::Z,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Face::NegX | Face::NegY | Face::NegZ => Direction::Negative,
            Face::PosX | Face::PosY | Face::PosZ => Direction::Positive,
        }
    }

    /// Outward unit normal of the untransformed face.
    pub fn canonical_normal(self) -> Vec3 {
        match self {
            Face::NegX => Vec3::NEG_X,
            Face::PosX => Vec3::X,
            Face::NegY => Vec3::NEG_Y,
            Face::PosY => Vec3::Y,
            Face::NegZ => Vec3::NEG_Z,
            Face::PosZ => Vec3::Z,
        }
    }
}

/// Fixed six-slot mapping from [`Face`] to a value.
///
/// Stored as a plain array so it stays `Copy` for `Copy` payloads and can be
/// indexed either by [`Face`] (infallible) or by raw slot through [`FaceSet::get`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FaceSet<T> {
    slots: [T; 6],
}

impl<T> FaceSet<T> {
    /// Build from values in slot order (-x, +x, -y, +y, -z, +z).
    pub fn new(slots: [T; 6]) -> Self {
        Self { slots }
    }

    /// Build from named faces, in the same order as the slots.
    pub fn from_faces(west: T, east: T, bottom: T, top: T, north: T, south: T) -> Self {
        Self::new([west, east, bottom, top, north, south])
    }

    /// Bounds-checked access by raw slot index.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.slots.iter()
    }

    /// Iterate `(face, value)` pairs in slot order.
    pub fn entries(&self) -> impl Iterator<Item = (Face, &T)> {
        Face::ALL.into_iter().zip(self.slots.iter())
    }

    /// Apply `f` to every slot, keeping the face ordering.
    pub fn map<U>(&self, mut f: impl FnMut(Face, &T) -> U) -> FaceSet<U> {
        FaceSet {
            slots: std::array::from_fn(|i| f(Face::ALL[i], &self.slots[i])),
        }
    }

    pub fn into_array(self) -> [T; 6] {
        self.slots
    }
}

impl<T: Clone> FaceSet<T> {
    /// Same value on every face.
    pub fn splat(value: T) -> Self {
        Self {
            slots: std::array::from_fn(|_| value.clone()),
        }
    }
}

impl<T> Index<Face> for FaceSet<T> {
    type Output = T;

    fn index(&self, face: Face) -> &T {
        &self.slots[face.index()]
    }
}

impl<T> IndexMut<Face> for FaceSet<T> {
    fn index_mut(&mut self, face: Face) -> &mut T {
        &mut self.slots[face.index()]
    }
}

impl<'a, T> IntoIterator for &'a FaceSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
