use std::ops::{
    Index,
    IndexMut,
};

use nalgebra::Point2;

use crate::grid::Grid;

/// Flat row-major storage for one per-node quantity.
///
/// Indexing goes through [`Grid::index`]; the lattice itself only
/// knows its length.
#[derive(Clone, Debug)]
pub struct Lattice<T> {
    data: Box<[T]>,
}

impl<T> Lattice<T>
where
    T: Clone,
{
    pub fn from_value(grid: &Grid, value: T) -> Self {
        Self {
            data: vec![value; grid.num_nodes()].into_boxed_slice(),
        }
    }
}

impl<T> Lattice<T> {
    pub fn from_fn(grid: &Grid, mut init: impl FnMut(usize, Point2<usize>) -> T) -> Self {
        let data = (0..grid.num_nodes())
            .map(|index| init(index, grid.point(index)))
            .collect();

        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get_point(&self, grid: &Grid, point: &Point2<usize>) -> Option<&T> {
        (point.x < grid.nx() && point.y < grid.ny()).then(|| &self.data[grid.index(point)])
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data.into_vec()
    }
}

impl<T> Index<usize> for Lattice<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<T> IndexMut<usize> for Lattice<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}
