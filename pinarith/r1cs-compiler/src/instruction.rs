use {
    ark_std::Zero,
    pinarith_common::{utils::field_to_biguint, FieldElement},
    std::fmt::{self, Display, Formatter},
};

/// A wire identifier in the circuit's value vector.
pub type Wire = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    Add,
    Mul,
    Xor,
    Or,
    Assert,
    Zerop,
    Split,
    Pack,
    ConstMul,
    ConstMulNeg,
    Table,
}

impl Opcode {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Mul => "mul",
            Self::Xor => "xor",
            Self::Or => "or",
            Self::Assert => "assert",
            Self::Zerop => "zerop",
            Self::Split => "split",
            Self::Pack => "pack",
            Self::ConstMul => "const-mul",
            Self::ConstMulNeg => "const-mul-neg",
            Self::Table => "table",
        }
    }
}

/// One wire-level operation. Immutable after parsing.
///
/// `constant` is zero except for the `const-mul` variants (where the
/// `const-mul-neg` constant is already negated), and `table` is empty except
/// for lookup instructions.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub opcode:   Opcode,
    pub constant: FieldElement,
    pub inputs:   Vec<Wire>,
    pub outputs:  Vec<Wire>,
    pub table:    Vec<FieldElement>,
}

impl Instruction {
    pub(crate) fn new(opcode: Opcode, inputs: Vec<Wire>, outputs: Vec<Wire>) -> Self {
        Self {
            opcode,
            constant: FieldElement::zero(),
            inputs,
            outputs,
            table: Vec::new(),
        }
    }
}

fn write_wires(f: &mut Formatter<'_>, wires: &[Wire]) -> fmt::Result {
    for (i, wire) in wires.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{wire}")?;
    }
    Ok(())
}

/// Renders the instruction in canonical circuit-file syntax, so that printing
/// and re-parsing round-trips.
impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.opcode {
            Opcode::Table => {
                write!(f, "table {} <", self.table.len())?;
                for (i, value) in self.table.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "> in <")?;
                write_wires(f, &self.inputs)?;
                write!(f, "> out <")?;
                write_wires(f, &self.outputs)?;
                write!(f, ">")
            }
            Opcode::ConstMul | Opcode::ConstMulNeg => {
                // The stored constant is signed; recover the literal magnitude
                // for the negated variant.
                let magnitude = if self.opcode == Opcode::ConstMulNeg {
                    -self.constant
                } else {
                    self.constant
                };
                write!(
                    f,
                    "{}-{:x} in 1 <{}> out 1 <{}>",
                    self.opcode.name(),
                    field_to_biguint(&magnitude),
                    self.inputs[0],
                    self.outputs[0]
                )
            }
            _ => {
                write!(f, "{} in {} <", self.opcode.name(), self.inputs.len())?;
                write_wires(f, &self.inputs)?;
                write!(f, "> out {} <", self.outputs.len())?;
                write_wires(f, &self.outputs)?;
                write!(f, ">")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_generic_operations() {
        let inst = Instruction::new(Opcode::Add, vec![1, 2, 3], vec![4]);
        assert_eq!(inst.to_string(), "add in 3 <1 2 3> out 1 <4>");
    }

    #[test]
    fn renders_const_mul_with_hex_magnitude() {
        let mut inst = Instruction::new(Opcode::ConstMul, vec![0], vec![1]);
        inst.constant = FieldElement::from(255u64);
        assert_eq!(inst.to_string(), "const-mul-ff in 1 <0> out 1 <1>");

        let mut neg = Instruction::new(Opcode::ConstMulNeg, vec![0], vec![1]);
        neg.constant = -FieldElement::from(255u64);
        assert_eq!(neg.to_string(), "const-mul-neg-ff in 1 <0> out 1 <1>");
    }

    #[test]
    fn renders_tables_with_entry_count() {
        let mut inst = Instruction::new(Opcode::Table, vec![5, 6], vec![7]);
        inst.table = [1u64, 2, 3, 4].iter().map(|&v| FieldElement::from(v)).collect();
        assert_eq!(inst.to_string(), "table 4 <1 2 3 4> in <5 6> out <7>");
    }
}
