pub mod answer;
pub mod discrete;
pub mod error;
#[cfg(feature = "fixtures")]
pub mod fixtures;
pub mod linalg;
pub mod model;
pub mod numeric;

pub use answer::Answer;
pub use discrete::bounds::{
    ceil_fn, default_lower_fns, default_upper_fns, default_valid_fns, floor_fn,
    integer_valid_fn, rational_multiple_valid_fn, BoundFn, ValidFn,
};
pub use discrete::DiscreteSimplex;
pub use error::SimplexError;
pub use model::{Builder, Objective, Relation, Simplex};
pub use numeric::EPSILON;
