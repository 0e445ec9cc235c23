pub mod matrix;

pub use matrix::{Matrix, Row, RowMut};
