use {
    crate::{
        arith_to_r1cs::ArithToR1CSCompiler,
        instruction::{Instruction, Opcode},
    },
    ark_ff::{One, Zero},
    pinarith_common::{FieldElement, LinearCombination, Variable},
};

/// Emits the R1CS constraints for one instruction. A successful parse
/// guarantees every arity this function relies on, so emission cannot fail.
pub(crate) fn emit_instruction(compiler: &mut ArithToR1CSCompiler, instruction: &Instruction) {
    let one = FieldElement::one();
    match instruction.opcode {
        // 1 * (sum of inputs) = out
        Opcode::Add => {
            let mut sum = LinearCombination::zero();
            for &wire in &instruction.inputs {
                let var = compiler.fetch_wire(wire);
                sum.push_term(one, var);
            }
            let out = compiler.fetch_wire(instruction.outputs[0]);
            compiler
                .cs
                .add_constraint(LinearCombination::one(), sum, LinearCombination::variable(out));
        }
        // a * b = c, where `assert` checks an existing wire instead of
        // defining a fresh one.
        Opcode::Mul | Opcode::Assert => {
            let a = compiler.fetch_wire(instruction.inputs[0]);
            let b = compiler.fetch_wire(instruction.inputs[1]);
            let c = compiler.fetch_wire(instruction.outputs[0]);
            compiler.cs.add_constraint(
                LinearCombination::variable(a),
                LinearCombination::variable(b),
                LinearCombination::variable(c),
            );
        }
        // 2a * b = a + b - out (both inputs assumed boolean)
        Opcode::Xor => {
            let a = compiler.fetch_wire(instruction.inputs[0]);
            let b = compiler.fetch_wire(instruction.inputs[1]);
            let out = compiler.fetch_wire(instruction.outputs[0]);
            compiler.cs.add_constraint(
                LinearCombination::term(one + one, a),
                LinearCombination::variable(b),
                LinearCombination::variable(a).add(one, b).add(-one, out),
            );
        }
        // a * b = a + b - out (both inputs assumed boolean)
        Opcode::Or => {
            let a = compiler.fetch_wire(instruction.inputs[0]);
            let b = compiler.fetch_wire(instruction.inputs[1]);
            let out = compiler.fetch_wire(instruction.outputs[0]);
            compiler.cs.add_constraint(
                LinearCombination::variable(a),
                LinearCombination::variable(b),
                LinearCombination::variable(a).add(one, b).add(-one, out),
            );
        }
        // x * constant = out
        Opcode::ConstMul | Opcode::ConstMulNeg => {
            let x = compiler.fetch_wire(instruction.inputs[0]);
            let out = compiler.fetch_wire(instruction.outputs[0]);
            compiler.cs.add_constraint(
                LinearCombination::variable(x),
                LinearCombination::constant(instruction.constant),
                LinearCombination::variable(out),
            );
        }
        // x * (1 - y) = 0 forces y = 1 whenever x is non-zero;
        // x * m = y with the witness m = 1/x makes y = 1, and x = 0 forces
        // y = 0.
        Opcode::Zerop => {
            let x = compiler.fetch_wire(instruction.inputs[0]);
            let m = compiler.fetch_wire(instruction.outputs[0]);
            let y = compiler.fetch_wire(instruction.outputs[1]);
            compiler.cs.add_constraint(
                LinearCombination::variable(x),
                LinearCombination::one().add(-one, y),
                LinearCombination::zero(),
            );
            compiler.cs.add_constraint(
                LinearCombination::variable(x),
                LinearCombination::variable(m),
                LinearCombination::variable(y),
            );
        }
        // Each output bit gets a booleanity constraint, then
        // x * 1 = sum(2^i * bit_i).
        Opcode::Split => {
            let mut sum = LinearCombination::zero();
            let mut two_i = one;
            for &wire in &instruction.outputs {
                let bit = compiler.fetch_wire(wire);
                emit_boolean(compiler, bit);
                sum.push_term(two_i, bit);
                two_i += two_i;
            }
            let x = compiler.fetch_wire(instruction.inputs[0]);
            compiler
                .cs
                .add_constraint(LinearCombination::variable(x), LinearCombination::one(), sum);
        }
        // out * 1 = sum(2^i * bit_i); booleanity of the inputs is the
        // caller's obligation (normally discharged by an upstream split).
        Opcode::Pack => {
            let mut sum = LinearCombination::zero();
            let mut two_i = one;
            for &wire in &instruction.inputs {
                let bit = compiler.fetch_wire(wire);
                sum.push_term(two_i, bit);
                two_i += two_i;
            }
            let out = compiler.fetch_wire(instruction.outputs[0]);
            compiler
                .cs
                .add_constraint(LinearCombination::variable(out), LinearCombination::one(), sum);
        }
        Opcode::Table => emit_table(compiler, instruction),
    }
}

/// bit * (1 - bit) = 0
fn emit_boolean(compiler: &mut ArithToR1CSCompiler, bit: Variable) {
    let one = FieldElement::one();
    compiler.cs.add_constraint(
        LinearCombination::variable(bit),
        LinearCombination::one().add(-one, bit),
        LinearCombination::zero(),
    );
}

/// Lookup gadgets for 2, 4 and 8 entry tables. Booleanity of the index bits
/// is not enforced here.
fn emit_table(compiler: &mut ArithToR1CSCompiler, instruction: &Instruction) {
    let one = FieldElement::one();
    let values = &instruction.table;
    match values.len() {
        // (v1 - v0) * b = out - v0
        2 => {
            let bit = compiler.fetch_wire(instruction.inputs[0]);
            let out = compiler.fetch_wire(instruction.outputs[0]);
            compiler.cs.add_constraint(
                LinearCombination::term(values[1] - values[0], bit),
                LinearCombination::one(),
                LinearCombination::variable(out).with_constant(-values[0]),
            );
        }
        4 => {
            let bits = [
                compiler.fetch_wire(instruction.inputs[0]),
                compiler.fetch_wire(instruction.inputs[1]),
            ];
            let out = compiler.fetch_wire(instruction.outputs[0]);
            emit_2bit_lookup(compiler, values, bits, out);
        }
        // Two 2-bit sub-lookups over the table halves, selected on the third
        // bit: b2 * (hi - lo) = out - lo.
        8 => {
            let bits = [
                compiler.fetch_wire(instruction.inputs[0]),
                compiler.fetch_wire(instruction.inputs[1]),
                compiler.fetch_wire(instruction.inputs[2]),
            ];
            let out = compiler.fetch_wire(instruction.outputs[0]);
            let lo = compiler.cs.allocate_variable();
            let hi = compiler.cs.allocate_variable();
            if compiler.values_known() {
                let index = low_bits_index(compiler, bits[0], bits[1]);
                compiler.cs.set_value(lo, values[index]);
                compiler.cs.set_value(hi, values[4 + index]);
            }
            emit_2bit_lookup(compiler, &values[..4], [bits[0], bits[1]], lo);
            emit_2bit_lookup(compiler, &values[4..], [bits[0], bits[1]], hi);
            compiler.cs.add_constraint(
                LinearCombination::variable(bits[2]),
                LinearCombination::variable(hi).add(-one, lo),
                LinearCombination::variable(out).add(-one, lo),
            );
        }
        _ => unreachable!("lookup table size validated during parse"),
    }
}

/// out = v0 + (v1 - v0) * b0 + (v2 - v0) * b1 + (v3 - v2 - v1 + v0) * b0 * b1
/// with one auxiliary variable for the product, constrained by b0 * b1 = aux.
fn emit_2bit_lookup(
    compiler: &mut ArithToR1CSCompiler,
    values: &[FieldElement],
    bits: [Variable; 2],
    out: Variable,
) {
    let aux = compiler.cs.allocate_variable();
    if compiler.values_known() {
        let product = compiler.cs.get_value(bits[0]) * compiler.cs.get_value(bits[1]);
        compiler.cs.set_value(aux, product);
    }
    compiler.cs.add_constraint(
        LinearCombination::variable(bits[0]),
        LinearCombination::variable(bits[1]),
        LinearCombination::variable(aux),
    );
    let combination = LinearCombination::constant(values[0])
        .add(values[1] - values[0], bits[0])
        .add(values[2] - values[0], bits[1])
        .add(values[3] - values[2] - values[1] + values[0], aux);
    compiler
        .cs
        .add_constraint(LinearCombination::one(), combination, LinearCombination::variable(out));
}

/// Index selected by two evaluated boolean bit variables.
fn low_bits_index(compiler: &ArithToR1CSCompiler, b0: Variable, b1: Variable) -> usize {
    let bit = |var: Variable| usize::from(!compiler.cs.get_value(var).is_zero());
    bit(b0) + 2 * bit(b1)
}
