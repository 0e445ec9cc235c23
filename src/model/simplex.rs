use crate::answer::Answer;
use crate::error::SimplexError;
use crate::model::problem::{Objective, Relation};
use crate::model::tableau::Tableau;
use crate::numeric;

/// Public handle on a canonicalised linear program. Every operator mutates
/// the underlying [`Tableau`] in place; callers that need to explore two
/// edits from the same starting point should [`Simplex::copy`] first.
#[derive(Debug, Clone)]
pub struct Simplex {
    pub(crate) tableau: Tableau,
}

impl Simplex {
    /// Absolute tolerance used by every comparison in this crate.
    pub const EPSILON: f64 = numeric::EPSILON;

    pub(crate) fn new(tableau: Tableau) -> Self {
        Simplex { tableau }
    }

    /// Runs the primal Big-M simplex to optimality from the canonicalised
    /// starting tableau.
    pub fn solve(&mut self) -> Result<Answer, SimplexError> {
        self.tableau.solve_primal()?;
        Ok(self.tableau.extract_answer())
    }

    /// Warm-restart: replace the right-hand side of constraint `row` and
    /// re-optimise via dual simplex rather than solving from scratch.
    pub fn change_b(&mut self, row: usize, new_value: f64) -> Result<Answer, SimplexError> {
        self.tableau.change_b(row, new_value)
    }

    /// Warm-restart: append a new constraint `ai . x {relation} bi` and
    /// re-optimise in place.
    pub fn add_constraint(
        &mut self,
        ai: Vec<f64>,
        relation: Relation,
        bi: f64,
    ) -> Result<Answer, SimplexError> {
        self.tableau.add_constraint(ai, relation, bi)
    }

    /// Deep clone, used by the branch-and-bound driver to explore two
    /// branches from the same tableau without aliasing state.
    pub fn copy(&self) -> Simplex {
        self.clone()
    }

    pub fn original_var_count(&self) -> usize {
        self.tableau.original_var_count
    }

    pub fn original_constraint_count(&self) -> usize {
        self.tableau.original_constraint_count
    }

    pub(crate) fn objective_sense(&self) -> Objective {
        if self.tableau.objective_sign > 0.0 {
            Objective::Min
        } else {
            Objective::Max
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::problem::{Builder, Objective};

    #[test]
    fn solve_then_add_constraint_matches_fresh_build() {
        let mut simplex = Builder::new()
            .a(vec![
                vec![50.0, 75.0],
                vec![60.0, 30.0],
                vec![10.0, 25.0],
            ])
            .b(vec![15000.0, 12000.0, 5000.0])
            .c(vec![100.0, 120.0])
            .inequalities(vec![Relation::Ge, Relation::Ge, Relation::Lq])
            .objective(Objective::Min)
            .build()
            .unwrap();
        simplex.solve().unwrap();
        let answer = simplex
            .add_constraint(vec![1.0, 3.0], Relation::Lq, 360.0)
            .unwrap();

        assert!((answer.x[0] - 240.0).abs() < 1e-4);
        assert!((answer.x[1] - 40.0).abs() < 1e-4);
        assert!((answer.fx - 28800.0).abs() < 1e-2);

        let mut fresh = Builder::new()
            .a(vec![
                vec![50.0, 75.0],
                vec![60.0, 30.0],
                vec![10.0, 25.0],
                vec![1.0, 3.0],
            ])
            .b(vec![15000.0, 12000.0, 5000.0, 360.0])
            .c(vec![100.0, 120.0])
            .inequalities(vec![Relation::Ge, Relation::Ge, Relation::Lq, Relation::Lq])
            .objective(Objective::Min)
            .build()
            .unwrap();
        let fresh_answer = fresh.solve().unwrap();
        assert!(answer.approx_eq(&fresh_answer));
    }

    #[test]
    fn copy_produces_independent_state() {
        let mut simplex = Builder::new()
            .a(vec![vec![1.0, 1.0]])
            .b(vec![10.0])
            .c(vec![1.0, 1.0])
            .objective(Objective::Max)
            .build()
            .unwrap();
        simplex.solve().unwrap();
        let mut clone = simplex.copy();
        clone.add_constraint(vec![1.0, 0.0], Relation::Lq, 2.0).unwrap();
        // Mutating the clone must not affect the original tableau.
        assert_eq!(simplex.tableau.row_count(), 1);
        assert_eq!(clone.tableau.row_count(), 2);
    }
}
