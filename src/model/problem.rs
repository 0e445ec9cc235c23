use crate::error::SimplexError;
use crate::linalg::Matrix;
use crate::model::simplex::Simplex;
use crate::model::tableau::Tableau;

/// Sense of the objective function. `Min` is the internal working sense;
/// `Max` problems are negated once during canonicalisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "fixtures", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "fixtures", serde(rename_all = "lowercase"))]
pub enum Objective {
    Min,
    Max,
}

impl Default for Objective {
    fn default() -> Self {
        Objective::Min
    }
}

/// Constraint relation. `Le`/`Gr` are the strict variants of `Lq`/`Ge`; this
/// solver treats them identically to their non-strict counterparts rather
/// than rejecting them at build time, since a simplex tableau has no notion
/// of an open feasible boundary. The distinction is retained only so round
/// trips through the JSON fixture format and `invert()` are lossless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "fixtures", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    #[cfg_attr(feature = "fixtures", serde(rename = "="))]
    Eq,
    #[cfg_attr(feature = "fixtures", serde(rename = "<="))]
    Lq,
    #[cfg_attr(feature = "fixtures", serde(rename = "<"))]
    Le,
    #[cfg_attr(feature = "fixtures", serde(rename = ">="))]
    Ge,
    #[cfg_attr(feature = "fixtures", serde(rename = ">"))]
    Gr,
}

impl Relation {
    /// Tag produced when a row is multiplied by -1 during B-normalisation.
    pub fn invert(self) -> Relation {
        match self {
            Relation::Eq => Relation::Eq,
            Relation::Lq => Relation::Ge,
            Relation::Le => Relation::Gr,
            Relation::Ge => Relation::Lq,
            Relation::Gr => Relation::Le,
        }
    }

    /// Non-strict form used internally by the tableau (`Le` -> `Lq`, `Gr` -> `Ge`).
    pub fn relaxed(self) -> Relation {
        match self {
            Relation::Le => Relation::Lq,
            Relation::Gr => Relation::Ge,
            other => other,
        }
    }
}

/// Immutable description of a linear program: `A x {<=,>=,=} b`, optimising
/// `c . x` subject to `normalized_x[i]` marking which variables are
/// constrained to be non-negative (a `false` entry means the variable is
/// free and gets split into a positive/negative part pair internally).
#[derive(Debug, Clone)]
pub struct Problem {
    pub a: Matrix<f64>,
    pub b: Vec<f64>,
    pub c: Vec<f64>,
    pub inequalities: Vec<Relation>,
    pub objective: Objective,
    pub normalized_x: Vec<bool>,
}

impl Problem {
    pub fn n_vars(&self) -> usize {
        self.c.len()
    }

    pub fn n_constraints(&self) -> usize {
        self.b.len()
    }

    fn validate(&self) -> Result<(), SimplexError> {
        let m = self.b.len();
        let n = self.c.len();
        if m == 0 {
            return Err(SimplexError::Data("problem has no constraints".into()));
        }
        if n == 0 {
            return Err(SimplexError::Data("problem has no variables".into()));
        }
        if self.a.rows != m || self.a.cols != n {
            return Err(SimplexError::Data(format!(
                "A is {}x{}, expected {}x{} to match B and C",
                self.a.rows, self.a.cols, m, n
            )));
        }
        if self.inequalities.len() != m {
            return Err(SimplexError::Data(format!(
                "inequalities has length {}, expected {}",
                self.inequalities.len(),
                m
            )));
        }
        if self.normalized_x.len() != n {
            return Err(SimplexError::Data(format!(
                "normalizedX has length {}, expected {}",
                self.normalized_x.len(),
                n
            )));
        }
        for (idx, value) in self.a.data.iter().enumerate() {
            if !value.is_finite() {
                return Err(SimplexError::Data(format!(
                    "A contains a non-finite entry at row {}, col {}",
                    idx / n,
                    idx % n
                )));
            }
        }
        for (i, value) in self.b.iter().enumerate() {
            if !value.is_finite() {
                return Err(SimplexError::Data(format!("B[{i}] is not finite")));
            }
        }
        for (i, value) in self.c.iter().enumerate() {
            if !value.is_finite() {
                return Err(SimplexError::Data(format!("C[{i}] is not finite")));
            }
        }
        Ok(())
    }
}

/// Fluent constructor for [`Problem`], mirroring the external `Builder`
/// interface: setters for every field plus a validating `build()`.
#[derive(Debug, Default, Clone)]
pub struct Builder {
    a: Option<Vec<Vec<f64>>>,
    b: Option<Vec<f64>>,
    c: Option<Vec<f64>>,
    inequalities: Option<Vec<Relation>>,
    objective: Objective,
    normalized_x: Option<Vec<bool>>,
}

impl Builder {
    pub fn new() -> Self {
        Builder::default()
    }

    pub fn a(mut self, a: Vec<Vec<f64>>) -> Self {
        self.a = Some(a);
        self
    }

    pub fn b(mut self, b: Vec<f64>) -> Self {
        self.b = Some(b);
        self
    }

    pub fn c(mut self, c: Vec<f64>) -> Self {
        self.c = Some(c);
        self
    }

    pub fn inequalities(mut self, inequalities: Vec<Relation>) -> Self {
        self.inequalities = Some(inequalities);
        self
    }

    pub fn objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    pub fn normalized_x(mut self, normalized_x: Vec<bool>) -> Self {
        self.normalized_x = Some(normalized_x);
        self
    }

    pub fn n_vars(&self) -> Result<usize, SimplexError> {
        self.c
            .as_ref()
            .map(|c| c.len())
            .ok_or_else(|| SimplexError::Data("C is required before n can be inferred".into()))
    }

    pub fn build(self) -> Result<Simplex, SimplexError> {
        let c = self
            .c
            .ok_or_else(|| SimplexError::Data("C is required".into()))?;
        let n = c.len();
        let rows = self
            .a
            .ok_or_else(|| SimplexError::Data("A is required".into()))?;
        let b = self
            .b
            .ok_or_else(|| SimplexError::Data("B is required".into()))?;
        let m = b.len();

        if rows.len() != m {
            return Err(SimplexError::Data(format!(
                "A has {} rows, expected {} to match B",
                rows.len(),
                m
            )));
        }
        let mut a = Matrix::new(m, n);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(SimplexError::Data(format!(
                    "A row {} has {} entries, expected {} to match C",
                    i,
                    row.len(),
                    n
                )));
            }
            for (j, value) in row.iter().enumerate() {
                a[(i, j)] = *value;
            }
        }

        let inequalities = self
            .inequalities
            .unwrap_or_else(|| vec![Relation::Lq; m]);
        let normalized_x = self.normalized_x.unwrap_or_else(|| vec![true; n]);

        let problem = Problem {
            a,
            b,
            c,
            inequalities,
            objective: self.objective,
            normalized_x,
        };
        problem.validate()?;

        let tableau = Tableau::from_problem(&problem)?;
        Ok(Simplex::new(tableau))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relaxed_strict_tags_fold_into_non_strict() {
        assert_eq!(Relation::Le.relaxed(), Relation::Lq);
        assert_eq!(Relation::Gr.relaxed(), Relation::Ge);
        assert_eq!(Relation::Eq.relaxed(), Relation::Eq);
    }

    #[test]
    fn builder_requires_c() {
        let err = Builder::new().build().unwrap_err();
        assert!(matches!(err, SimplexError::Data(_)));
    }
}
