use {
    crate::{
        constraints::emit_instruction,
        evaluator::evaluate_instruction,
        inputs::load_inputs,
        instruction::{Instruction, Wire},
        parser::{parse_circuit, Circuit},
    },
    anyhow::{Context, Result},
    pinarith_common::{CircuitError, ConstraintSystem, FieldElement, Variable},
    std::{collections::BTreeMap, fs, path::Path},
    tracing::{info, instrument},
};

/// Compiles a Pinocchio arith circuit into an R1CS instance, evaluating wire
/// values along the way when an input assignment is provided.
pub(crate) struct ArithToR1CSCompiler {
    pub(crate) cs: ConstraintSystem,

    /// Maps wire ids to constraint-system variables, filled lazily.
    wire_map: BTreeMap<Wire, Variable>,

    /// Whether an input assignment was loaded and evaluation ran, so that
    /// gadget auxiliary values can be solved for during constraint emission.
    values_known: bool,

    trace_enabled: bool,
}

impl ArithToR1CSCompiler {
    pub(crate) fn new(trace_enabled: bool) -> Self {
        Self {
            cs: ConstraintSystem::new(),
            wire_map: BTreeMap::new(),
            values_known: false,
            trace_enabled,
        }
    }

    /// Returns the variable for a wire, allocating one on first reference.
    pub(crate) fn fetch_wire(&mut self, wire: Wire) -> Variable {
        match self.wire_map.get(&wire) {
            Some(&var) => var,
            None => {
                let var = self.cs.allocate_variable();
                self.wire_map.insert(wire, var);
                var
            }
        }
    }

    pub(crate) fn wire_value(&mut self, wire: Wire) -> FieldElement {
        let var = self.fetch_wire(wire);
        self.cs.get_value(var)
    }

    pub(crate) fn set_wire_value(&mut self, wire: Wire, value: FieldElement) {
        let var = self.fetch_wire(wire);
        self.cs.set_value(var, value);
    }

    pub(crate) const fn values_known(&self) -> bool {
        self.values_known
    }

    pub(crate) fn mark_values_known(&mut self) {
        self.values_known = true;
    }

    fn evaluate_circuit(&mut self, circuit: &Circuit) -> Result<(), CircuitError> {
        for instruction in &circuit.instructions {
            evaluate_instruction(self, instruction)?;
        }
        Ok(())
    }

    fn emit_circuit(&mut self, circuit: &Circuit) {
        for instruction in &circuit.instructions {
            if self.trace_enabled {
                self.trace_instruction(instruction);
            }
            emit_instruction(self, instruction);
        }
    }

    fn trace_instruction(&mut self, instruction: &Instruction) {
        println!("{instruction}");
        for &wire in &instruction.inputs {
            println!("\tin {} = {}", wire, self.wire_value(wire));
        }
        for &wire in &instruction.outputs {
            println!("\tout {} = {}", wire, self.wire_value(wire));
        }
    }

    fn finalize(self) -> (ConstraintSystem, BTreeMap<Wire, Variable>) {
        (self.cs, self.wire_map)
    }
}

/// A compiled circuit: the parsed instruction stream, the emitted constraint
/// system, and the wire-to-variable assignment.
pub struct CompiledCircuit {
    pub circuit: Circuit,
    cs:          ConstraintSystem,
    wire_map:    BTreeMap<Wire, Variable>,
}

/// Compiles a circuit source into a [`CompiledCircuit`].
///
/// When `input_assignment` is given, it is loaded and every instruction is
/// evaluated before constraints are emitted; otherwise only the constraint
/// system is produced and all wire values stay zero.
pub fn arith_to_r1cs(
    source: &str,
    input_assignment: Option<&str>,
    trace_enabled: bool,
) -> Result<CompiledCircuit, CircuitError> {
    let mut compiler = ArithToR1CSCompiler::new(trace_enabled);
    let circuit = parse_circuit(source, &mut compiler)?;

    // Only `input` declarations are public; `output` wires are not counted.
    compiler.cs.set_num_public_inputs(circuit.input_wires.len());
    info!(
        "circuit: {} wires declared, {} instructions, {} inputs, {} nizk inputs, {} outputs",
        circuit.num_wires,
        circuit.instructions.len(),
        circuit.input_wires.len(),
        circuit.nizk_wires.len(),
        circuit.output_wires.len()
    );

    if let Some(assignment) = input_assignment {
        load_inputs(assignment, &mut compiler)?;
        compiler.evaluate_circuit(&circuit)?;
    }
    compiler.emit_circuit(&circuit);
    info!(
        "r1cs: {} constraints over {} variables, {} public inputs",
        compiler.cs.num_constraints(),
        compiler.cs.num_variables(),
        compiler.cs.num_public_inputs()
    );

    let (cs, wire_map) = compiler.finalize();
    Ok(CompiledCircuit { circuit, cs, wire_map })
}

impl CompiledCircuit {
    /// Reads and compiles a circuit file, with an optional input-assignment
    /// file.
    #[instrument(skip_all, fields(circuit = %circuit_path.as_ref().display()))]
    pub fn from_files(
        circuit_path: impl AsRef<Path>,
        inputs_path: Option<&Path>,
        trace_enabled: bool,
    ) -> Result<Self> {
        let source = fs::read_to_string(circuit_path.as_ref()).context("while reading circuit file")?;
        let assignment = match inputs_path {
            Some(path) => Some(fs::read_to_string(path).context("while reading input file")?),
            None => None,
        };
        Ok(arith_to_r1cs(&source, assignment.as_deref(), trace_enabled)?)
    }

    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.circuit.input_wires.len()
    }

    #[must_use]
    pub fn num_nizk_inputs(&self) -> usize {
        self.circuit.nizk_wires.len()
    }

    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.circuit.output_wires.len()
    }

    #[must_use]
    pub fn output_wires(&self) -> &[Wire] {
        &self.circuit.output_wires
    }

    /// Value of a wire, if the wire occurs in the circuit.
    #[must_use]
    pub fn wire_value(&self, wire: Wire) -> Option<FieldElement> {
        self.wire_map.get(&wire).map(|&var| self.cs.get_value(var))
    }

    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.cs.is_satisfied()
    }

    #[must_use]
    pub const fn constraint_system(&self) -> &ConstraintSystem {
        &self.cs
    }
}
