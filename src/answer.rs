use crate::numeric::EPSILON;

/// Result of a solve: the decision vector and the objective value at that
/// point, expressed in terms of the caller's original variables.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "fixtures", derive(serde::Serialize, serde::Deserialize))]
pub struct Answer {
    #[cfg_attr(feature = "fixtures", serde(rename = "X"))]
    pub x: Vec<f64>,
    pub fx: f64,
}

impl Answer {
    pub fn new(x: Vec<f64>, fx: f64) -> Self {
        Answer { x, fx }
    }

    /// Componentwise equality within [`EPSILON`], used by warm-restart
    /// equivalence tests that compare a rebuilt-from-scratch answer against
    /// one produced incrementally.
    pub fn approx_eq(&self, other: &Answer) -> bool {
        if self.x.len() != other.x.len() {
            return false;
        }
        if (self.fx - other.fx).abs() > EPSILON {
            return false;
        }
        self.x
            .iter()
            .zip(other.x.iter())
            .all(|(a, b)| (a - b).abs() <= EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_eq_tolerates_noise() {
        let a = Answer::new(vec![1.0, 2.0], 10.0);
        let b = Answer::new(vec![1.0 + 1e-10, 2.0 - 1e-10], 10.0 + 1e-10);
        assert!(a.approx_eq(&b));
    }

    #[test]
    fn approx_eq_rejects_real_difference() {
        let a = Answer::new(vec![1.0, 2.0], 10.0);
        let b = Answer::new(vec![1.0, 2.1], 10.0);
        assert!(!a.approx_eq(&b));
    }
}
