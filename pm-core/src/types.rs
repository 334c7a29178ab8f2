/// `(ix, iy)` coordinates of a cell in a [`crate::mesh::Mesh`].
///
/// `ix` indexes along x and selects the row of a [`crate::mesh::Grid`];
/// `iy` indexes along y.
pub type CellIndex = (usize, usize);
