pub mod problem;
pub mod tableau;
pub mod tableau_operations;
pub mod simplex;
pub mod displays;

pub use problem::{Builder, Objective, Problem, Relation};
pub use tableau::Tableau;
pub use simplex::Simplex;
