use {
    crate::{
        arith_to_r1cs::ArithToR1CSCompiler,
        instruction::{Instruction, Opcode},
    },
    ark_ff::{BigInteger, Field, One, PrimeField, Zero},
    pinarith_common::{CircuitError, FieldElement},
};

/// Computes the output wire values of one instruction from its input wire
/// values, in circuit-file order. Callers guarantee topological order; wires
/// that were never written read as zero.
pub(crate) fn evaluate_instruction(
    compiler: &mut ArithToR1CSCompiler,
    instruction: &Instruction,
) -> Result<(), CircuitError> {
    let in_values: Vec<FieldElement> = instruction
        .inputs
        .iter()
        .map(|&wire| compiler.wire_value(wire))
        .collect();

    match instruction.opcode {
        Opcode::Add => {
            let sum = in_values.iter().fold(FieldElement::zero(), |acc, v| acc + v);
            compiler.set_wire_value(instruction.outputs[0], sum);
        }
        Opcode::Mul => {
            compiler.set_wire_value(instruction.outputs[0], in_values[0] * in_values[1]);
        }
        Opcode::Xor => {
            let result = if in_values[0] == in_values[1] {
                FieldElement::zero()
            } else {
                FieldElement::one()
            };
            compiler.set_wire_value(instruction.outputs[0], result);
        }
        Opcode::Or => {
            let result = if in_values[0].is_zero() && in_values[1].is_zero() {
                FieldElement::zero()
            } else {
                FieldElement::one()
            };
            compiler.set_wire_value(instruction.outputs[0], result);
        }
        // The asserted wire's value comes from inputs or an earlier
        // instruction; the constraint stage enforces a * b = c.
        Opcode::Assert => {}
        Opcode::Zerop => {
            let x = in_values[0];
            let m = x.inverse().unwrap_or_else(FieldElement::zero);
            compiler.set_wire_value(instruction.outputs[0], m);
            let y = if x.is_zero() { FieldElement::zero() } else { FieldElement::one() };
            compiler.set_wire_value(instruction.outputs[1], y);
        }
        Opcode::Split => {
            let repr = in_values[0].into_bigint();
            for (i, &wire) in instruction.outputs.iter().enumerate() {
                let bit = if repr.get_bit(i) { FieldElement::one() } else { FieldElement::zero() };
                compiler.set_wire_value(wire, bit);
            }
        }
        Opcode::Pack => {
            let mut sum = FieldElement::zero();
            let mut two_i = FieldElement::one();
            for &value in &in_values {
                sum += two_i * value;
                two_i += two_i;
            }
            compiler.set_wire_value(instruction.outputs[0], sum);
        }
        Opcode::ConstMul | Opcode::ConstMulNeg => {
            compiler.set_wire_value(instruction.outputs[0], instruction.constant * in_values[0]);
        }
        Opcode::Table => {
            // The last listed input is the most significant index bit.
            let mut index = 0usize;
            for (&wire, value) in instruction.inputs.iter().zip(&in_values).rev() {
                let bit = if value.is_zero() {
                    0
                } else if value.is_one() {
                    1
                } else {
                    return Err(CircuitError::Eval {
                        message: format!("table input wire {wire} is not boolean"),
                    });
                };
                index = (index << 1) | bit;
            }
            compiler.set_wire_value(instruction.outputs[0], instruction.table[index]);
        }
    }
    Ok(())
}
