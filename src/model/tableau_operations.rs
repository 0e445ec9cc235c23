use crate::error::SimplexError;
use crate::model::tableau::Tableau;
use crate::numeric::{is_negative, EPSILON};

impl Tableau {
    /// Entering column via Bland's rule: the smallest-indexed column with a
    /// negative reduced cost. Anti-cycling at the cost of more iterations
    /// than Dantzig's most-negative rule; required for guaranteed
    /// termination once degenerate artificial pivots are in play.
    pub(crate) fn entering_column_bland(&self) -> Option<usize> {
        (0..self.total_cols()).find(|&j| is_negative(self.z_row[j]))
    }

    /// Minimum-ratio test over strictly positive entries in the entering
    /// column; ties broken by smallest basic column index, which together
    /// with Bland's rule on the entering side prevents cycling.
    pub(crate) fn leaving_row(&self, col: usize) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for row in 0..self.row_count() {
            let pivot_entry = self.matrix_value(row, col);
            if pivot_entry > EPSILON {
                let ratio = self.rhs[row] / pivot_entry;
                best = match best {
                    None => Some((row, ratio)),
                    Some((best_row, best_ratio)) => {
                        if ratio < best_ratio - EPSILON {
                            Some((row, ratio))
                        } else if (ratio - best_ratio).abs() <= EPSILON
                            && self.basis[row] < self.basis[best_row]
                        {
                            Some((row, ratio))
                        } else {
                            Some((best_row, best_ratio))
                        }
                    }
                };
            }
        }
        best.map(|(row, _)| row)
    }

    /// Gauss-Jordan pivot: normalise the pivot row, eliminate the entering
    /// column everywhere else (including the objective row), then record
    /// the new basic column for this row.
    pub(crate) fn pivot(&mut self, row: usize, col: usize) {
        let pivot_value = self.matrix_value(row, col);
        debug_assert!(pivot_value.abs() > EPSILON, "pivot on a near-zero entry");

        let total_cols = self.total_cols();
        for j in 0..total_cols {
            self.matrix[(row, j)] /= pivot_value;
        }
        self.rhs[row] /= pivot_value;

        for r in 0..self.row_count() {
            if r == row {
                continue;
            }
            let factor = self.matrix_value(r, col);
            if factor.abs() > EPSILON {
                for j in 0..total_cols {
                    let v = self.matrix_value(row, j);
                    self.matrix[(r, j)] -= factor * v;
                }
                self.rhs[r] -= factor * self.rhs[row];
            }
        }

        let z_factor = self.z_row[col];
        if z_factor.abs() > EPSILON {
            for j in 0..total_cols {
                let v = self.matrix_value(row, j);
                self.z_row[j] -= z_factor * v;
            }
            self.z_rhs -= z_factor * self.rhs[row];
        }

        self.basis[row] = col;
    }

    /// Primal simplex loop: pivot until every reduced cost is non-negative
    /// (optimal), no positive entry exists in an improving column
    /// (unbounded), or the iteration budget runs out (difficult). Once
    /// optimal, any artificial still basic with a positive value means the
    /// original problem was infeasible.
    pub(crate) fn solve_primal(&mut self) -> Result<(), SimplexError> {
        let budget = self.iteration_budget();
        let mut iterations = 0usize;
        loop {
            let Some(col) = self.entering_column_bland() else {
                break;
            };
            let Some(row) = self.leaving_row(col) else {
                return Err(SimplexError::Unbounded);
            };
            self.pivot(row, col);
            iterations += 1;
            if iterations > budget {
                return Err(SimplexError::Difficult(
                    "iteration budget exceeded before reaching optimality".into(),
                ));
            }
        }
        self.check_artificial_feasibility()
    }

    /// Dual simplex recovery: while some basic value is negative, pick the
    /// most-negative row as the leaving row, then among its negative
    /// entries choose the entering column minimising reduced_cost / |entry|
    /// (ties to the smallest index). No valid entering column means the
    /// edit made the program infeasible.
    pub(crate) fn restore_feasibility_dual_simplex(&mut self) -> Result<(), SimplexError> {
        let budget = self.iteration_budget();
        let mut iterations = 0usize;
        loop {
            let leaving = self
                .rhs
                .iter()
                .enumerate()
                .filter(|&(_, &v)| is_negative(v))
                .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
                .map(|(row, _)| row);
            let Some(row) = leaving else {
                return Ok(());
            };

            let mut best: Option<(usize, f64)> = None;
            for col in 0..self.total_cols() {
                let entry = self.matrix_value(row, col);
                if entry < -EPSILON {
                    let ratio = self.z_row[col] / (-entry);
                    best = match best {
                        None => Some((col, ratio)),
                        Some((best_col, best_ratio)) => {
                            if ratio < best_ratio - EPSILON {
                                Some((col, ratio))
                            } else if (ratio - best_ratio).abs() <= EPSILON && col < best_col {
                                Some((col, ratio))
                            } else {
                                Some((best_col, best_ratio))
                            }
                        }
                    };
                }
            }
            let Some((col, _)) = best else {
                return Err(SimplexError::Infeasible);
            };
            self.pivot(row, col);
            iterations += 1;
            if iterations > budget {
                return Err(SimplexError::Difficult(
                    "dual simplex could not restore feasibility within the iteration budget".into(),
                ));
            }
        }
    }
}
