
mod row;
mod matrix;
mod index;

pub use row::SparseRow;
pub use matrix::{SparseRowMatrix, SerializeSparseMatrix, DeserializeSparseMatrix};
pub use index::EliminationIndex;

///
/// If set, every mutation of a [`SparseRow`] or an [`EliminationIndex`] is followed by a
/// full consistency check. This is very slow, and thus only enabled during tests.
///
pub const EXTENSIVE_RUNTIME_ASSERTS: bool = cfg!(test);
