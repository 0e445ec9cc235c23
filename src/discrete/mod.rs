pub mod bounds;

use std::sync::Mutex;

use crate::answer::Answer;
use crate::discrete::bounds::{default_lower_fns, default_upper_fns, default_valid_fns, BoundFn, ValidFn};
use crate::error::SimplexError;
use crate::model::problem::{Builder, Objective, Relation};
use crate::model::simplex::Simplex;
use crate::numeric::EPSILON;

type ExceptionHandler = dyn Fn(&SimplexError) + Send + Sync;

/// Land-Doig-style branch-and-bound driver over [`Simplex`]'s warm-restart
/// operators. Each node's LP relaxation is obtained by extending or editing
/// the parent's tableau rather than rebuilding from scratch; the two
/// children of a branching variable are explored with one task spawned
/// (the lower branch) and one run inline (the upper branch), joined before
/// the call returns.
pub struct DiscreteSimplex {
    exception_handler: Box<ExceptionHandler>,
}

impl Default for DiscreteSimplex {
    fn default() -> Self {
        DiscreteSimplex {
            exception_handler: Box::new(|err| {
                eprintln!("branch-and-bound subtree failed: {err}");
            }),
        }
    }
}

impl DiscreteSimplex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a callback invoked whenever a non-root subtree fails with
    /// `Unbounded` or `Difficult` (an `Infeasible` subtree is a normal prune
    /// and never reaches the handler). The default writes a message to
    /// stderr.
    pub fn set_exception_handler(&mut self, handler: impl Fn(&SimplexError) + Send + Sync + 'static) {
        self.exception_handler = Box::new(handler);
    }

    /// Solves with the default integer predicates: branch bounds are
    /// floor/ceil of the relaxed value, validity is "within epsilon of an
    /// integer".
    pub fn solve(&self, builder: Builder) -> Result<Answer, SimplexError> {
        let n = builder.n_vars()?;
        self.solve_with(
            builder,
            default_lower_fns(n),
            default_upper_fns(n),
            default_valid_fns(n),
        )
    }

    /// Solves with caller-supplied per-variable bound and validity
    /// functions. All three arrays must have length `n` (the number of
    /// structural variables) or this raises a data error before any
    /// numerical work happens.
    pub fn solve_with(
        &self,
        builder: Builder,
        lower: Vec<BoundFn>,
        upper: Vec<BoundFn>,
        valid: Vec<ValidFn>,
    ) -> Result<Answer, SimplexError> {
        let n = builder.n_vars()?;
        if lower.len() != n || upper.len() != n || valid.len() != n {
            return Err(SimplexError::Data(format!(
                "lowerFns/upperFns/predicates must each have length {n}"
            )));
        }

        let mut simplex = builder.build()?;
        let sense = simplex.objective_sense();
        let root_answer = simplex.solve()?;

        let incumbent: Mutex<Option<Answer>> = Mutex::new(None);
        let bi_order: Vec<Option<usize>> = vec![None; 2 * n];

        self.explore(
            simplex,
            bi_order,
            Ok(root_answer),
            n,
            sense,
            &lower,
            &upper,
            &valid,
            &incumbent,
        );

        incumbent
            .into_inner()
            .expect("mutex not poisoned")
            .ok_or(SimplexError::Infeasible)
    }

    #[allow(clippy::too_many_arguments)]
    fn explore(
        &self,
        simplex: Simplex,
        bi_order: Vec<Option<usize>>,
        result: Result<Answer, SimplexError>,
        n: usize,
        sense: Objective,
        lower: &[BoundFn],
        upper: &[BoundFn],
        valid: &[ValidFn],
        incumbent: &Mutex<Option<Answer>>,
    ) {
        let answer = match result {
            Ok(answer) => answer,
            Err(SimplexError::Infeasible) => return,
            Err(other) => {
                (self.exception_handler)(&other);
                return;
            }
        };

        {
            let guard = incumbent.lock().expect("mutex not poisoned");
            if let Some(current) = guard.as_ref() {
                if !is_strictly_better(answer.fx, current.fx, sense) {
                    return;
                }
            }
        }

        let violation = (0..n).find(|&i| !(valid[i])(answer.x[i]));
        let Some(i) = violation else {
            let mut guard = incumbent.lock().expect("mutex not poisoned");
            let better = match guard.as_ref() {
                None => true,
                Some(current) => is_strictly_better(answer.fx, current.fx, sense),
            };
            if better {
                *guard = Some(answer);
            }
            return;
        };

        let xi = answer.x[i];
        let lower_bound_val = (lower[i])(xi);
        let upper_bound_val = (upper[i])(xi);

        let mut lower_simplex = simplex.copy();
        let mut lower_bi = bi_order.clone();
        let lower_result = apply_bound(&mut lower_simplex, &mut lower_bi, i, n, true, lower_bound_val);

        let mut upper_simplex = simplex;
        let mut upper_bi = bi_order;
        let upper_result = apply_bound(&mut upper_simplex, &mut upper_bi, i, n, false, upper_bound_val);

        rayon::join(
            || {
                self.explore(
                    lower_simplex,
                    lower_bi,
                    lower_result,
                    n,
                    sense,
                    lower,
                    upper,
                    valid,
                    incumbent,
                )
            },
            || {
                self.explore(
                    upper_simplex,
                    upper_bi,
                    upper_result,
                    n,
                    sense,
                    lower,
                    upper,
                    valid,
                    incumbent,
                )
            },
        );
    }
}

fn is_strictly_better(candidate: f64, incumbent: f64, sense: Objective) -> bool {
    match sense {
        Objective::Max => candidate > incumbent + EPSILON,
        Objective::Min => candidate < incumbent - EPSILON,
    }
}

/// Applies one side of a branch on variable `var`: reuses the row recorded
/// in `bi_order` via `change_b` if this path already branched on this side
/// before, otherwise appends a fresh row and records it. Bounds growth to
/// at most two extra rows per variable per path.
fn apply_bound(
    simplex: &mut Simplex,
    bi_order: &mut [Option<usize>],
    var: usize,
    n: usize,
    is_lower: bool,
    bound_value: f64,
) -> Result<Answer, SimplexError> {
    let slot = if is_lower { var } else { n + var };
    if let Some(row) = bi_order[slot] {
        return simplex.change_b(row, bound_value);
    }
    let mut coefficients = vec![0.0; n];
    coefficients[var] = 1.0;
    let relation = if is_lower { Relation::Lq } else { Relation::Ge };
    let new_row = simplex.tableau.row_count();
    let result = simplex.add_constraint(coefficients, relation, bound_value);
    bi_order[slot] = Some(new_row);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::problem::Objective;

    #[test]
    fn integer_knapsack_style_problem_finds_optimal_integers() {
        // max 8x + 11y + 6z + 4w s.t. 5x+7y+4z+3w <= 14, all vars in [0,1].
        let builder = Builder::new()
            .a(vec![
                vec![5.0, 7.0, 4.0, 3.0],
                vec![1.0, 0.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0, 0.0],
                vec![0.0, 0.0, 1.0, 0.0],
                vec![0.0, 0.0, 0.0, 1.0],
            ])
            .b(vec![14.0, 1.0, 1.0, 1.0, 1.0])
            .c(vec![8.0, 11.0, 6.0, 4.0])
            .objective(Objective::Max);

        let driver = DiscreteSimplex::new();
        let answer = driver.solve(builder).unwrap();

        for &v in &answer.x {
            assert!((v - v.round()).abs() < 1e-6);
        }
        assert!((answer.fx - 21.0).abs() < 1e-4);
    }

    #[test]
    fn infeasible_integer_program_is_reported() {
        // 2x = 5 has no integer solution and no fractional slack to branch on.
        let builder = Builder::new()
            .a(vec![vec![2.0]])
            .b(vec![5.0])
            .c(vec![1.0])
            .inequalities(vec![Relation::Eq])
            .objective(Objective::Min);

        let driver = DiscreteSimplex::new();
        let err = driver.solve(builder).unwrap_err();
        assert_eq!(err, SimplexError::Infeasible);
    }
}
