//! Support for the JSON fixture format used by the cross-language test
//! suite: an array of scenarios, each describing a problem, the expected
//! answer after the initial solve, and an optional follow-up warm-restart
//! operation with its own expected answer or expected exception.

use serde::{Deserialize, Serialize};

use crate::answer::Answer;
use crate::error::SimplexError;
use crate::model::{Builder, Objective, Relation};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleData {
    #[serde(rename = "A")]
    pub a: Vec<Vec<f64>>,
    #[serde(rename = "B")]
    pub b: Vec<f64>,
    #[serde(rename = "C")]
    pub c: Vec<f64>,
    pub inequalities: Vec<Relation>,
    #[serde(default, rename = "functionType")]
    pub function_type: Option<Objective>,
    #[serde(default, rename = "normalizedX")]
    pub normalized_x: Option<Vec<bool>>,
}

impl SimpleData {
    pub fn into_builder(self) -> Builder {
        let mut builder = Builder::new().a(self.a).b(self.b).c(self.c).inequalities(self.inequalities);
        if let Some(objective) = self.function_type {
            builder = builder.objective(objective);
        }
        if let Some(normalized_x) = self.normalized_x {
            builder = builder.normalized_x(normalized_x);
        }
        builder
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    AddConstraint,
    ChangeB,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeBPayload {
    pub row: usize,
    #[serde(rename = "newValue")]
    pub new_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddConstraintPayload {
    pub ai: Vec<f64>,
    pub inequality: Relation,
    pub bi: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplexFixture {
    #[serde(rename = "simpleData")]
    pub simple_data: SimpleData,
    #[serde(rename = "simplexAnswer")]
    pub simplex_answer: Option<Answer>,
    #[serde(rename = "analysisType")]
    pub analysis_type: Option<AnalysisType>,
    #[serde(rename = "changeB")]
    pub change_b: Option<ChangeBPayload>,
    #[serde(rename = "addConstraint")]
    pub add_constraint: Option<AddConstraintPayload>,
    #[serde(rename = "analysisAnswer")]
    pub analysis_answer: Option<Answer>,
    #[serde(rename = "exceptionClass")]
    pub exception_class: Option<String>,
    #[serde(rename = "exceptionMessage")]
    pub exception_message: Option<String>,
}

/// Outcome of running one fixture's root solve plus its optional follow-up.
pub struct FixtureOutcome {
    pub root: Answer,
    pub follow_up: Option<Result<Answer, SimplexError>>,
}

/// Replays a single fixture against a freshly-built [`Simplex`](crate::Simplex).
/// The root solve is expected to succeed; fixtures that exercise an
/// exception on the root build/solve itself should be checked directly
/// against `Builder::build`/`Simplex::solve` rather than through this
/// helper.
pub fn run_fixture(fixture: SimplexFixture) -> Result<FixtureOutcome, SimplexError> {
    let mut simplex = fixture.simple_data.into_builder().build()?;
    let root = simplex.solve()?;

    let follow_up = match fixture.analysis_type {
        Some(AnalysisType::ChangeB) => fixture
            .change_b
            .map(|payload| simplex.change_b(payload.row, payload.new_value)),
        Some(AnalysisType::AddConstraint) => fixture.add_constraint.map(|payload| {
            simplex.add_constraint(payload.ai, payload.inequality, payload.bi)
        }),
        None => None,
    };

    Ok(FixtureOutcome { root, follow_up })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_round_trips_through_json() {
        let json = r#"
        {
            "simpleData": {
                "A": [[50, 75], [60, 30], [10, 25]],
                "B": [15000, 12000, 5000],
                "C": [100, 120],
                "inequalities": [">=", ">=", "<="],
                "functionType": "min"
            },
            "simplexAnswer": { "X": [240, 40], "fx": 28800 },
            "analysisType": "add_constraint",
            "addConstraint": { "ai": [1, 3], "inequality": "<=", "bi": 360 },
            "analysisAnswer": { "X": [240, 40], "fx": 28800 }
        }
        "#;
        let fixture: SimplexFixture = serde_json::from_str(json).unwrap();
        let outcome = run_fixture(fixture).unwrap();
        let follow_up = outcome.follow_up.unwrap().unwrap();
        assert!((follow_up.fx - 28800.0).abs() < 1e-2);
    }

    #[test]
    fn exception_class_names_match_fixture_vocabulary() {
        assert_eq!(SimplexError::Infeasible.exception_class(), "IncompatibleSimplexSolveException");
        assert_eq!(SimplexError::Unbounded.exception_class(), "UnlimitedFunctionExtremumException");
    }
}
