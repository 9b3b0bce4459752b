mod error;
mod r1cs;
pub mod utils;

pub use {
    ark_bn254::Fr as FieldElement,
    error::CircuitError,
    r1cs::{Constraint, ConstraintSystem, LinearCombination, Term, Variable},
};
