use crate::analysis::{ContinuityReport, SignReport};
use crate::error::Failure;
use crate::semantic::Value;
use crate::solution::SolutionSet;
use serde::Serialize;
use std::fmt;

/// Outcome of one analysis request, ready to be printed or serialised
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisResult {
    Value { value: Value },
    Solution { solution: SolutionSet },
    SignReport(SignReport),
    Continuity(ContinuityReport),
    Failure(Failure),
}

impl AnalysisResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, AnalysisResult::Failure(_))
    }
}

impl From<Result<Value, Failure>> for AnalysisResult {
    fn from(result: Result<Value, Failure>) -> Self {
        match result {
            Ok(value) => AnalysisResult::Value { value },
            Err(failure) => AnalysisResult::Failure(failure),
        }
    }
}

impl From<Result<SolutionSet, Failure>> for AnalysisResult {
    fn from(result: Result<SolutionSet, Failure>) -> Self {
        match result {
            Ok(solution) => AnalysisResult::Solution { solution },
            Err(failure) => AnalysisResult::Failure(failure),
        }
    }
}

impl From<Result<SignReport, Failure>> for AnalysisResult {
    fn from(result: Result<SignReport, Failure>) -> Self {
        match result {
            Ok(report) => AnalysisResult::SignReport(report),
            Err(failure) => AnalysisResult::Failure(failure),
        }
    }
}

impl From<Result<ContinuityReport, Failure>> for AnalysisResult {
    fn from(result: Result<ContinuityReport, Failure>) -> Self {
        match result {
            Ok(report) => AnalysisResult::Continuity(report),
            Err(failure) => AnalysisResult::Failure(failure),
        }
    }
}

impl fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisResult::Value { value } => write!(f, "{}", value),
            AnalysisResult::Solution { solution } => write!(f, "{}", solution),
            AnalysisResult::SignReport(report) => {
                writeln!(f, "sign of {} in {}", report.expression, report.variable)?;
                writeln!(f, "  positive:  {}", report.positive)?;
                writeln!(f, "  negative:  {}", report.negative)?;
                writeln!(f, "  zero:      {}", report.zero)?;
                write!(f, "  undefined: {}", report.undefined)
            }
            AnalysisResult::Continuity(report) => {
                writeln!(
                    f,
                    "continuity of {} at {} = {}",
                    report.function, report.variable, report.point
                )?;
                writeln!(f, "  right limit: {}", report.right_limit)?;
                writeln!(f, "  left limit:  {}", report.left_limit)?;
                writeln!(f, "  value:       {}", report.value)?;
                write!(f, "  verdict:     {}", report.verdict)
            }
            AnalysisResult::Failure(failure) => write!(f, "{}", failure),
        }
    }
}
