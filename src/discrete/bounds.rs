use crate::numeric::EPSILON;

/// Rounds a branching variable's relaxed value into a bound for one side of
/// a split (`x_i <= lower(x_i)` or `x_i >= upper(x_i)`).
pub type BoundFn = Box<dyn Fn(f64) -> f64 + Send + Sync>;
/// Tests whether a relaxed value already satisfies the discreteness
/// requirement for variable `i`.
pub type ValidFn = Box<dyn Fn(f64) -> bool + Send + Sync>;

pub fn floor_fn() -> BoundFn {
    Box::new(|x| x.floor())
}

pub fn ceil_fn() -> BoundFn {
    Box::new(|x| x.ceil())
}

/// Accepts a value within [`EPSILON`] of the nearest integer.
pub fn integer_valid_fn() -> ValidFn {
    Box::new(|x| (x - x.round()).abs() <= EPSILON)
}

/// Accepts a value within [`EPSILON`] of the nearest multiple of `1/denominator`,
/// the built-in "rational multiple" predicate (e.g. denominator 4 restricts a
/// variable to quarter-unit increments).
pub fn rational_multiple_valid_fn(denominator: i64) -> ValidFn {
    assert!(denominator != 0, "denominator must be non-zero");
    Box::new(move |x| {
        let scaled = x * denominator as f64;
        (scaled - scaled.round()).abs() <= EPSILON
    })
}

pub fn default_lower_fns(n: usize) -> Vec<BoundFn> {
    (0..n).map(|_| floor_fn()).collect()
}

pub fn default_upper_fns(n: usize) -> Vec<BoundFn> {
    (0..n).map(|_| ceil_fn()).collect()
}

pub fn default_valid_fns(n: usize) -> Vec<ValidFn> {
    (0..n).map(|_| integer_valid_fn()).collect()
}
