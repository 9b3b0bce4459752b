/// Failure modes of the circuit pipeline.
///
/// Satisfiability is deliberately not represented here: an assignment that
/// does not satisfy the constraint system is reported through
/// [`ConstraintSystem::is_satisfied`](crate::ConstraintSystem::is_satisfied),
/// because callers may still want the witness.
#[derive(Debug, thiserror::Error)]
pub enum CircuitError {
    #[error("parse error on line {line_no}: {message}\nLine: '{line}'")]
    Parse {
        line_no: usize,
        line:    String,
        message: String,
    },
    #[error("input error on line {line_no}: {message}\nLine: '{line}'")]
    Input {
        line_no: usize,
        line:    String,
        message: String,
    },
    #[error("evaluation error: {message}")]
    Eval { message: String },
    /// The constraint system rejected a constraint. Unreachable after a
    /// successful parse; kept so the taxonomy is closed.
    #[error("constraint error: {message}")]
    Constraint { message: String },
}
