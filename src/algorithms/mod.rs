
///
/// Contains multiple variants of the Extended Euclidean Algorithm.
///
pub mod eea;
///
/// Contains [`elimination::eliminate()`], which brings a sparse matrix into echelon, Hermite or
/// diagonal form by unimodular row and column operations, and records these operations.
///
pub mod elimination;
///
/// Contains [`pivot::find_pivots()`], which finds a large set of pivots of a sparse matrix
/// without performing any arithmetic.
///
pub mod pivot;
///
/// Contains [`lu::factorize()`], a pivot-based LU factorization of sparse matrices over fields.
///
pub mod lu;
///
/// Contains algorithms to solve sparse linear systems, or check whether they are solvable.
///
pub mod linsolve;
///
/// Contains [`rank::calculate_rank()`], a randomized algorithm to compute the rank of large
/// sparse matrices over prime fields.
///
pub mod rank;
