use crate::error::SimplexError;
use crate::linalg::Matrix;
use crate::model::problem::{Objective, Problem, Relation};
use crate::numeric::EPSILON;
use crate::answer::Answer;

/// Mutable simplex tableau: `m` rows plus one objective row, over
/// `structural + slack/surplus + artificial` columns. The objective row is
/// kept separate (`z_row`/`z_rhs`) rather than appended as an extra matrix
/// row, since it is updated by a different set of operations (it never
/// takes part in the minimum-ratio test).
///
/// Invariants maintained by every public mutator:
/// - `rhs[i] >= -EPSILON` never holds outside of a dual-simplex recovery window.
/// - for every `i`, column `basis[i]` is (within tolerance) the `i`-th unit vector
///   and `z_row[basis[i]]` is zero.
/// - an artificial column still basic with a value above `EPSILON` after a
///   primal solve means the program is infeasible.
#[derive(Debug, Clone)]
pub struct Tableau {
    pub(crate) matrix: Matrix<f64>,
    pub(crate) rhs: Vec<f64>,
    pub(crate) z_row: Vec<f64>,
    pub(crate) z_rhs: f64,
    pub(crate) basis: Vec<usize>,

    /// Column objective coefficients as they stood right after canonicalisation
    /// (structural columns get `c`, slack/surplus get 0, artificials get `big_m`).
    /// Used to recompute `z_rhs` from scratch after an RHS edit instead of
    /// tracking it incrementally through every pivot.
    pub(crate) raw_objective: Vec<f64>,

    /// For each row (in introduction order), the column that was its pivot
    /// column at the moment the row was created. That column's *current*
    /// values equal the corresponding column of the basis inverse, which is
    /// what `change_b` needs to re-derive the RHS column after an edit.
    pub(crate) init_identity_col: Vec<usize>,
    /// The (sign-adjusted at creation) right-hand side fed into each row.
    pub(crate) stored_b: Vec<f64>,
    /// `-1.0` for a row whose coefficients and RHS were negated during
    /// canonicalisation (original RHS was negative), `1.0` otherwise.
    /// `change_b` multiplies a caller-supplied RHS by this before writing
    /// to `stored_b`, since `stored_b` lives in canonical (possibly
    /// negated) coordinates, not the caller's original ones.
    pub(crate) row_sign: Vec<f64>,

    pub(crate) artificial_cols: Vec<usize>,
    pub(crate) structural_count: usize,
    /// `free_negative_col[i]` is the column holding the negative part of
    /// original variable `i`, if that variable was declared free.
    pub(crate) free_negative_col: Vec<Option<usize>>,

    pub(crate) original_var_count: usize,
    pub(crate) original_constraint_count: usize,
    pub(crate) original_c: Vec<f64>,

    pub(crate) big_m: f64,
    /// +1 for a `Min` problem, -1 for `Max` (the tableau itself always minimizes).
    pub(crate) objective_sign: f64,
}

impl Tableau {
    pub fn row_count(&self) -> usize {
        self.rhs.len()
    }

    pub fn total_cols(&self) -> usize {
        self.matrix.cols
    }

    #[inline]
    pub(crate) fn matrix_value(&self, row: usize, col: usize) -> f64 {
        self.matrix[(row, col)]
    }

    pub(crate) fn set_row(&mut self, row: usize, values: &[f64]) {
        for (c, v) in values.iter().enumerate() {
            self.matrix[(row, c)] = *v;
        }
    }

    pub(crate) fn push_zero_column(&mut self) -> usize {
        self.matrix.push_column(None);
        self.z_row.push(0.0);
        self.raw_objective.push(0.0);
        self.matrix.cols - 1
    }

    /// Canonicalises a [`Problem`] into Big-M standard form: negate for
    /// `Max`, split free variables into a positive/negative column pair,
    /// flip any row with a negative RHS, then attach slack, surplus and
    /// artificial columns per relation and fold the artificials' `big_m`
    /// penalty out of the objective row so every basic column starts with a
    /// zero reduced cost.
    pub fn from_problem(problem: &Problem) -> Result<Tableau, SimplexError> {
        let n = problem.n_vars();
        let m = problem.n_constraints();

        let objective_sign = match problem.objective {
            Objective::Min => 1.0,
            Objective::Max => -1.0,
        };
        let c_work: Vec<f64> = problem.c.iter().map(|v| v * objective_sign).collect();

        let mut free_negative_col = vec![None; n];
        let mut structural_count = n;
        let mut extra_cols: Vec<usize> = Vec::new();
        for i in 0..n {
            if !problem.normalized_x[i] {
                free_negative_col[i] = Some(structural_count);
                extra_cols.push(i);
                structural_count += 1;
            }
        }

        let mut matrix = Matrix::<f64>::new(m, structural_count);
        let mut raw_objective = vec![0.0; structural_count];
        for j in 0..n {
            raw_objective[j] = c_work[j];
        }
        for &i in &extra_cols {
            let col = free_negative_col[i].unwrap();
            raw_objective[col] = -c_work[i];
            for row in 0..m {
                matrix[(row, col)] = -problem.a[(row, i)];
            }
        }
        for row in 0..m {
            for j in 0..n {
                matrix[(row, j)] = problem.a[(row, j)];
            }
        }

        let mut rhs = problem.b.clone();
        let mut tags = problem.inequalities.clone();
        let mut row_sign = vec![1.0; m];
        for row in 0..m {
            if rhs[row] < 0.0 {
                for j in 0..structural_count {
                    matrix[(row, j)] = -matrix[(row, j)];
                }
                rhs[row] = -rhs[row];
                tags[row] = tags[row].invert();
                row_sign[row] = -1.0;
            }
        }

        let mut tableau = Tableau {
            matrix,
            rhs,
            z_row: raw_objective.clone(),
            z_rhs: 0.0,
            basis: vec![0; m],
            raw_objective,
            init_identity_col: Vec::with_capacity(m),
            stored_b: Vec::with_capacity(m),
            row_sign,
            artificial_cols: Vec::new(),
            structural_count,
            free_negative_col,
            original_var_count: n,
            original_constraint_count: m,
            original_c: problem.c.clone(),
            big_m: 0.0,
            objective_sign,
        };

        let c_scale = c_work.iter().fold(1.0_f64, |acc, v| acc.max(v.abs()));
        let b_scale = tableau.rhs.iter().fold(1.0_f64, |acc, v| acc.max(v.abs()));
        tableau.big_m = 1.0e6 * c_scale * b_scale;

        for row in 0..m {
            let relaxed = tags[row].relaxed();
            let identity_col = match relaxed {
                Relation::Lq => {
                    let col = tableau.push_zero_column();
                    tableau.matrix[(row, col)] = 1.0;
                    col
                }
                Relation::Ge => {
                    let surplus = tableau.push_zero_column();
                    tableau.matrix[(row, surplus)] = -1.0;
                    let artificial = tableau.push_zero_column();
                    tableau.matrix[(row, artificial)] = 1.0;
                    tableau.raw_objective[artificial] = tableau.big_m;
                    tableau.artificial_cols.push(artificial);
                    artificial
                }
                Relation::Eq => {
                    let artificial = tableau.push_zero_column();
                    tableau.matrix[(row, artificial)] = 1.0;
                    tableau.raw_objective[artificial] = tableau.big_m;
                    tableau.artificial_cols.push(artificial);
                    artificial
                }
                Relation::Le | Relation::Gr => unreachable!("relaxed() removes strict tags"),
            };
            tableau.basis[row] = identity_col;
            tableau.init_identity_col.push(identity_col);
            tableau.stored_b.push(tableau.rhs[row]);
        }

        tableau.z_row = vec![0.0; tableau.total_cols()];
        for j in 0..tableau.total_cols() {
            tableau.z_row[j] = tableau.raw_objective[j];
        }
        tableau.z_rhs = 0.0;
        for row in 0..m {
            let basic_col = tableau.basis[row];
            let factor = tableau.z_row[basic_col];
            if factor.abs() > EPSILON {
                for j in 0..tableau.total_cols() {
                    tableau.z_row[j] -= factor * tableau.matrix_value(row, j);
                }
                tableau.z_rhs -= factor * tableau.rhs[row];
            }
        }

        Ok(tableau)
    }

    fn current_structural_values(&self) -> Vec<f64> {
        let mut values = vec![0.0; self.structural_count];
        for (row, &col) in self.basis.iter().enumerate() {
            if col < self.structural_count {
                values[col] = self.rhs[row];
            }
        }
        values
    }

    /// Reads `X` back out in terms of the caller's original variables
    /// (recombining free-variable splits) and recomputes `fx` directly from
    /// the original objective to avoid sign drift through Big-M arithmetic.
    pub fn extract_answer(&self) -> Answer {
        let structural = self.current_structural_values();
        let mut x = vec![0.0; self.original_var_count];
        for i in 0..self.original_var_count {
            let positive = structural[i];
            let negative = self.free_negative_col[i].map(|c| structural[c]).unwrap_or(0.0);
            x[i] = positive - negative;
        }
        let fx = self.original_c.iter().zip(x.iter()).map(|(c, v)| c * v).sum();
        Answer::new(x, fx)
    }

    fn recompute_rhs_from_stored_b(&mut self) {
        let rows = self.rhs.len();
        let mut new_rhs = vec![0.0; rows];
        for (r, &b_r) in self.stored_b.iter().enumerate() {
            if b_r == 0.0 {
                continue;
            }
            let col = self.init_identity_col[r];
            for i in 0..rows {
                new_rhs[i] += self.matrix_value(i, col) * b_r;
            }
        }
        self.rhs = new_rhs;
        self.recompute_z_rhs();
    }

    fn recompute_z_rhs(&mut self) {
        self.z_rhs = self
            .basis
            .iter()
            .zip(self.rhs.iter())
            .map(|(&col, &r)| self.raw_objective[col] * r)
            .sum();
    }

    pub(crate) fn iteration_budget(&self) -> usize {
        50 * (self.row_count() + self.structural_count)
    }

    /// Replaces the right-hand side originally supplied for row `row` and
    /// recomputes the RHS column as `basis_inverse * b_new`, then restores
    /// primal feasibility with dual simplex if the edit drove a basic
    /// variable negative.
    pub fn change_b(&mut self, row: usize, new_value: f64) -> Result<Answer, SimplexError> {
        if row >= self.stored_b.len() {
            return Err(SimplexError::Data(format!(
                "row index {row} is out of range ({} rows)",
                self.stored_b.len()
            )));
        }
        if !new_value.is_finite() {
            return Err(SimplexError::Data("new B value must be finite".into()));
        }
        // stored_b lives in canonical coordinates: a row negated during
        // canonicalisation needs its caller-facing RHS negated the same way
        // before it re-enters the basis-inverse reconstruction below. The
        // row's relation was inverted by the same negation at construction
        // time, so this substitution is valid for a new_value of either
        // sign, not just one matching the row's original RHS sign.
        self.stored_b[row] = self.row_sign[row] * new_value;
        self.recompute_rhs_from_stored_b();
        self.restore_feasibility_dual_simplex()?;
        self.check_artificial_feasibility()?;
        Ok(self.extract_answer())
    }

    pub(crate) fn check_artificial_feasibility(&self) -> Result<(), SimplexError> {
        for &col in &self.artificial_cols {
            if let Some(row) = self.basis.iter().position(|&b| b == col) {
                if self.rhs[row] > EPSILON {
                    return Err(SimplexError::Infeasible);
                }
            }
        }
        Ok(())
    }

    /// Extends the tableau with one new row `ai . x {rel} bi`, reduces it
    /// modulo the current basis so it is expressed purely in non-basic
    /// columns, and restores feasibility/optimality with dual simplex
    /// (negative RHS) or a fresh primal solve (artificial introduced).
    pub fn add_constraint(
        &mut self,
        ai: Vec<f64>,
        relation: Relation,
        bi: f64,
    ) -> Result<Answer, SimplexError> {
        if ai.len() != self.original_var_count {
            return Err(SimplexError::Data(format!(
                "constraint coefficient vector has length {}, expected {}",
                ai.len(),
                self.original_var_count
            )));
        }
        if !bi.is_finite() || ai.iter().any(|v| !v.is_finite()) {
            return Err(SimplexError::Data("constraint contains a non-finite entry".into()));
        }

        let mut row_structural = vec![0.0; self.structural_count];
        for i in 0..self.original_var_count {
            row_structural[i] += ai[i];
            if let Some(neg_col) = self.free_negative_col[i] {
                row_structural[neg_col] = -ai[i];
            }
        }

        let mut b = bi;
        let mut tag = relation;
        let mut sign = 1.0;
        if b < 0.0 {
            for v in row_structural.iter_mut() {
                *v = -*v;
            }
            b = -b;
            tag = tag.invert();
            sign = -1.0;
        }

        let relaxed = tag.relaxed();
        let mut artificial_col = None;
        let identity_col = match relaxed {
            Relation::Lq => {
                let col = self.push_zero_column();
                col
            }
            Relation::Ge => {
                self.push_zero_column();
                let artificial = self.push_zero_column();
                self.raw_objective[artificial] = self.big_m;
                self.z_row[artificial] = self.big_m;
                artificial_col = Some(artificial);
                artificial
            }
            Relation::Eq => {
                let artificial = self.push_zero_column();
                self.raw_objective[artificial] = self.big_m;
                self.z_row[artificial] = self.big_m;
                artificial_col = Some(artificial);
                artificial
            }
            Relation::Le | Relation::Gr => unreachable!("relaxed() removes strict tags"),
        };

        let total_cols = self.total_cols();
        let mut new_row = vec![0.0; total_cols];
        new_row[..row_structural.len()].copy_from_slice(&row_structural);
        match relaxed {
            Relation::Lq => new_row[identity_col] = 1.0,
            Relation::Ge => {
                new_row[identity_col - 1] = -1.0;
                new_row[identity_col] = 1.0;
            }
            Relation::Eq => new_row[identity_col] = 1.0,
            Relation::Le | Relation::Gr => unreachable!(),
        }

        self.matrix.push_row(&new_row);
        self.rhs.push(b);
        let new_row_idx = self.rhs.len() - 1;
        self.basis.push(identity_col);
        self.init_identity_col.push(identity_col);
        self.stored_b.push(b);
        self.row_sign.push(sign);
        if let Some(col) = artificial_col {
            self.artificial_cols.push(col);
        }

        for r in 0..new_row_idx {
            let basic_col = self.basis[r];
            let factor = self.matrix_value(new_row_idx, basic_col);
            if factor.abs() > EPSILON {
                for j in 0..total_cols {
                    let v = self.matrix_value(r, j);
                    self.matrix[(new_row_idx, j)] -= factor * v;
                }
                self.rhs[new_row_idx] -= factor * self.rhs[r];
            }
        }

        if let Some(col) = artificial_col {
            let factor = self.z_row[col];
            if factor.abs() > EPSILON {
                for j in 0..total_cols {
                    self.z_row[j] -= factor * self.matrix_value(new_row_idx, j);
                }
                self.z_rhs -= factor * self.rhs[new_row_idx];
            }
        }

        if self.rhs[new_row_idx] < -EPSILON {
            self.restore_feasibility_dual_simplex()?;
        } else if artificial_col.is_some() {
            self.solve_primal()?;
            return Ok(self.extract_answer());
        }
        self.check_artificial_feasibility()?;
        Ok(self.extract_answer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lq_rows_get_a_basic_slack() {
        let tab = Tableau::from_problem(&Problem {
            a: {
                let mut m = Matrix::new(1, 2);
                m[(0, 0)] = 1.0;
                m[(0, 1)] = 1.0;
                m
            },
            b: vec![10.0],
            c: vec![1.0, 1.0],
            inequalities: vec![Relation::Lq],
            objective: Objective::Min,
            normalized_x: vec![true, true],
        })
        .unwrap();
        assert_eq!(tab.artificial_cols.len(), 0);
        assert_eq!(tab.basis, vec![2]);
        assert_eq!(tab.matrix_value(0, 2), 1.0);
    }

    #[test]
    fn ge_rows_get_surplus_and_artificial() {
        let tab = Tableau::from_problem(&Problem {
            a: {
                let mut m = Matrix::new(1, 2);
                m[(0, 0)] = 1.0;
                m[(0, 1)] = 1.0;
                m
            },
            b: vec![4.0],
            c: vec![1.0, 1.0],
            inequalities: vec![Relation::Ge],
            objective: Objective::Min,
            normalized_x: vec![true, true],
        })
        .unwrap();
        assert_eq!(tab.artificial_cols, vec![3]);
        assert_eq!(tab.matrix_value(0, 2), -1.0);
        assert_eq!(tab.matrix_value(0, 3), 1.0);
        assert_eq!(tab.basis, vec![3]);
        // objective row must be zero on the basic artificial column.
        assert!(tab.z_row[3].abs() < EPSILON);
    }

    #[test]
    fn negative_b_flips_row_and_tag() {
        let tab = Tableau::from_problem(&Problem {
            a: {
                let mut m = Matrix::new(1, 2);
                m[(0, 0)] = 1.0;
                m[(0, 1)] = 1.0;
                m
            },
            b: vec![-5.0],
            c: vec![1.0, 1.0],
            inequalities: vec![Relation::Lq],
            objective: Objective::Min,
            normalized_x: vec![true, true],
        })
        .unwrap();
        assert_eq!(tab.rhs[0], 5.0);
        assert_eq!(tab.matrix_value(0, 0), -1.0);
        // Lq flipped to Ge means an artificial column now exists.
        assert_eq!(tab.artificial_cols.len(), 1);
    }

    #[test]
    fn change_b_on_a_flipped_row_applies_the_callers_sense() {
        // Row 0 (x1 - x2 >= -3) has a negative RHS at construction and gets
        // negated internally; row_sign must correct for that before the new
        // value re-enters the basis-inverse reconstruction.
        let mut a = Matrix::new(2, 2);
        a[(0, 0)] = 1.0;
        a[(0, 1)] = -1.0;
        a[(1, 0)] = 0.0;
        a[(1, 1)] = 1.0;
        let mut tab = Tableau::from_problem(&Problem {
            a,
            b: vec![-3.0, 5.0],
            c: vec![1.0, 1.0],
            inequalities: vec![Relation::Ge, Relation::Lq],
            objective: Objective::Min,
            normalized_x: vec![true, true],
        })
        .unwrap();
        assert_eq!(tab.row_sign[0], -1.0);
        tab.solve_primal().unwrap();

        // x1 - x2 >= 3 now forces x1 to 3.
        let answer = tab.change_b(0, 3.0).unwrap();
        assert!((answer.x[0] - 3.0).abs() < EPSILON);
        assert!((answer.x[1] - 0.0).abs() < EPSILON);
        assert!((answer.fx - 3.0).abs() < EPSILON);
    }
}
