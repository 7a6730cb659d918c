#![allow(non_snake_case)]

//!
//! Exact sparse linear algebra over Euclidean rings and fields.
//!
//! The main entry points are [`algorithms::elimination::eliminate()`] for echelon, Hermite and
//! diagonal (Smith) forms, [`algorithms::pivot::find_pivots()`] for structural pivot search,
//! [`algorithms::lu::factorize()`] for LU factorization and [`algorithms::rank::calculate_rank()`]
//! for a randomized rank computation over prime fields.
//!

#[macro_use]
pub mod ring;
pub mod divisibility;
pub mod pid;
pub mod field;
pub mod primitive_int;
pub mod serialization;
pub mod parallel;
pub mod tracing;
pub mod matrix;
pub mod sparse;
pub mod rings;
pub mod algorithms;
