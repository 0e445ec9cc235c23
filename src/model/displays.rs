use std::fmt;

use crate::model::problem::{Objective, Problem, Relation};
use crate::model::tableau::Tableau;

fn relation_symbol(relation: Relation) -> &'static str {
    match relation {
        Relation::Eq => "=",
        Relation::Lq => "<=",
        Relation::Le => "<",
        Relation::Ge => ">=",
        Relation::Gr => ">",
    }
}

fn format_expression(coefficients: &[f64]) -> String {
    coefficients
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{v}*x{i}"))
        .collect::<Vec<_>>()
        .join(" + ")
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sense = match self.objective {
            Objective::Min => "Min",
            Objective::Max => "Max",
        };
        writeln!(f, "{sense} Z = {}", format_expression(&self.c))?;
        for row in 0..self.b.len() {
            let coeffs: Vec<f64> = (0..self.c.len()).map(|j| self.a[(row, j)]).collect();
            writeln!(
                f,
                "  {} {} {}",
                format_expression(&coeffs),
                relation_symbol(self.inequalities[row]),
                self.b[row]
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.row_count() {
            write!(f, "[{:>3}] ", self.basis[row])?;
            for col in 0..self.total_cols() {
                write!(f, "{:>10.3} ", self.matrix_value(row, col))?;
            }
            writeln!(f, "| {:>10.3}", self.rhs[row])?;
        }
        write!(f, "{:>8}", "z")?;
        for col in 0..self.total_cols() {
            write!(f, "{:>10.3} ", self.z_row[col])?;
        }
        writeln!(f, "| {:>10.3}", self.z_rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::Matrix;

    #[test]
    fn problem_display_lists_every_constraint() {
        let mut a = Matrix::new(1, 2);
        a[(0, 0)] = 1.0;
        a[(0, 1)] = 1.0;
        let problem = Problem {
            a,
            b: vec![10.0],
            c: vec![1.0, 2.0],
            inequalities: vec![Relation::Lq],
            objective: Objective::Max,
            normalized_x: vec![true, true],
        };
        let text = problem.to_string();
        assert!(text.starts_with("Max Z"));
        assert!(text.contains("<="));
    }
}
