//! Front-end for the Pinocchio "arith" circuit format: parsing, evaluation,
//! and translation into a rank-1 constraint system.

mod arith_to_r1cs;
mod constraints;
mod evaluator;
mod inputs;
mod instruction;
mod parser;

pub use {
    arith_to_r1cs::{arith_to_r1cs, CompiledCircuit},
    instruction::{Instruction, Opcode, Wire},
    parser::Circuit,
};
