use {
    crate::{
        arith_to_r1cs::ArithToR1CSCompiler,
        instruction::{Instruction, Opcode, Wire},
    },
    pinarith_common::{
        utils::{field_from_decimal, field_from_hex},
        CircuitError, FieldElement,
    },
    std::str::FromStr,
};

/// A parsed circuit: the ordered instruction stream plus the declared wire
/// roles, in file order.
#[derive(Clone, Debug, Default)]
pub struct Circuit {
    /// Total wire count from the `total` header. Informational; wires are
    /// allocated on first reference, not up front.
    pub num_wires:    usize,
    pub instructions: Vec<Instruction>,
    pub input_wires:  Vec<Wire>,
    pub nizk_wires:   Vec<Wire>,
    pub output_wires: Vec<Wire>,
}

fn parse_error(line_no: usize, line: &str, message: impl Into<String>) -> CircuitError {
    CircuitError::Parse {
        line_no,
        line: line.to_string(),
        message: message.into(),
    }
}

/// Scans a bare unsigned integer token.
fn take_uint<T: FromStr>(rest: &mut &str) -> Option<T> {
    let s = rest.trim_start();
    let end = s
        .find(|c: char| c.is_whitespace() || c == '<')
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let (token, tail) = s.split_at(end);
    let value = token.parse().ok()?;
    *rest = tail;
    Some(value)
}

/// Consumes a keyword followed by a token boundary.
fn take_keyword(rest: &mut &str, keyword: &str) -> bool {
    let s = rest.trim_start();
    match s.strip_prefix(keyword) {
        Some(tail) if tail.is_empty() || tail.starts_with(|c: char| c.is_whitespace() || c == '<') => {
            *rest = tail;
            true
        }
        _ => false,
    }
}

/// Consumes a `<...>` bracket group, returning its contents.
fn take_group<'a>(rest: &mut &'a str) -> Option<&'a str> {
    let s = rest.trim_start();
    let tail = s.strip_prefix('<')?;
    let end = tail.find('>')?;
    *rest = &tail[end + 1..];
    Some(&tail[..end])
}

fn parse_wire_list(group: &str) -> Option<Vec<Wire>> {
    group.split_whitespace().map(|token| token.parse().ok()).collect()
}

fn parse_table_values(group: &str) -> Option<Vec<FieldElement>> {
    group.split_whitespace().map(field_from_decimal).collect()
}

/// A declaration line payload: exactly one wire id, nothing after it.
fn parse_wire_declaration(rest: &str) -> Option<Wire> {
    let mut tokens = rest.split_whitespace();
    let wire = tokens.next()?.parse().ok()?;
    tokens.next().is_none().then_some(wire)
}

fn check_arity(opcode: Opcode, inputs: &[Wire], outputs: &[Wire]) -> Result<(), String> {
    let (inputs_ok, outputs_ok, expected) = match opcode {
        Opcode::Add => (inputs.len() >= 2, outputs.len() == 1, "at least 2 inputs and 1 output"),
        Opcode::Mul | Opcode::Xor | Opcode::Or | Opcode::Assert => {
            (inputs.len() == 2, outputs.len() == 1, "2 inputs and 1 output")
        }
        Opcode::Zerop => (inputs.len() == 1, outputs.len() == 2, "1 input and 2 outputs"),
        Opcode::Split => (inputs.len() == 1, !outputs.is_empty(), "1 input and at least 1 output"),
        Opcode::Pack => (!inputs.is_empty(), outputs.len() == 1, "at least 1 input and 1 output"),
        Opcode::ConstMul | Opcode::ConstMulNeg => {
            (inputs.len() == 1, outputs.len() == 1, "1 input and 1 output")
        }
        // Lookup arity is validated against the table size in `parse_table`.
        Opcode::Table => return Ok(()),
    };
    if inputs_ok && outputs_ok {
        Ok(())
    } else {
        Err(format!("{} requires {}", opcode.name(), expected))
    }
}

/// Parses an `<op> in <n> <w...> out <m> <w...>` line, `<op>` already split
/// off into `term`.
fn parse_operation(
    term: &str,
    mut rest: &str,
    line_no: usize,
    raw: &str,
    compiler: &mut ArithToR1CSCompiler,
) -> Result<Instruction, CircuitError> {
    // `const-mul-neg-` must be tested before `const-mul-`.
    let (opcode, constant) = if let Some(hex) = term.strip_prefix("const-mul-neg-") {
        let value = field_from_hex(hex)
            .ok_or_else(|| parse_error(line_no, raw, format!("bad hexadecimal constant '{hex}'")))?;
        (Opcode::ConstMulNeg, -value)
    } else if let Some(hex) = term.strip_prefix("const-mul-") {
        let value = field_from_hex(hex)
            .ok_or_else(|| parse_error(line_no, raw, format!("bad hexadecimal constant '{hex}'")))?;
        (Opcode::ConstMul, value)
    } else {
        let opcode = match term {
            "add" => Opcode::Add,
            "mul" => Opcode::Mul,
            "xor" => Opcode::Xor,
            "or" => Opcode::Or,
            "assert" => Opcode::Assert,
            "zerop" => Opcode::Zerop,
            "split" => Opcode::Split,
            "pack" => Opcode::Pack,
            _ => return Err(parse_error(line_no, raw, format!("unknown opcode '{term}'"))),
        };
        (opcode, FieldElement::from(0u64))
    };

    if !take_keyword(&mut rest, "in") {
        return Err(parse_error(line_no, raw, "expected 'in'"));
    }
    let declared_inputs: usize = take_uint(&mut rest)
        .ok_or_else(|| parse_error(line_no, raw, "expected input count"))?;
    let group = take_group(&mut rest)
        .ok_or_else(|| parse_error(line_no, raw, "expected '<...>' input wire list"))?;
    let inputs = parse_wire_list(group)
        .ok_or_else(|| parse_error(line_no, raw, "bad wire id in input list"))?;
    if inputs.len() != declared_inputs {
        return Err(parse_error(
            line_no,
            raw,
            format!("declared {declared_inputs} inputs, got {}", inputs.len()),
        ));
    }

    if !take_keyword(&mut rest, "out") {
        return Err(parse_error(line_no, raw, "expected 'out'"));
    }
    let declared_outputs: usize = take_uint(&mut rest)
        .ok_or_else(|| parse_error(line_no, raw, "expected output count"))?;
    let group = take_group(&mut rest)
        .ok_or_else(|| parse_error(line_no, raw, "expected '<...>' output wire list"))?;
    let outputs = parse_wire_list(group)
        .ok_or_else(|| parse_error(line_no, raw, "bad wire id in output list"))?;
    if outputs.len() != declared_outputs {
        return Err(parse_error(
            line_no,
            raw,
            format!("declared {declared_outputs} outputs, got {}", outputs.len()),
        ));
    }
    if !rest.trim().is_empty() {
        return Err(parse_error(line_no, raw, "trailing tokens after output list"));
    }

    check_arity(opcode, &inputs, &outputs).map_err(|message| parse_error(line_no, raw, message))?;

    for &wire in inputs.iter().chain(&outputs) {
        compiler.fetch_wire(wire);
    }

    let mut instruction = Instruction::new(opcode, inputs, outputs);
    instruction.constant = constant;
    Ok(instruction)
}

/// Parses a `table <k> <v...> in <w...> out <w>` line.
fn parse_table(
    mut rest: &str,
    line_no: usize,
    raw: &str,
    compiler: &mut ArithToR1CSCompiler,
) -> Result<Instruction, CircuitError> {
    let entry_count: usize = take_uint(&mut rest)
        .ok_or_else(|| parse_error(line_no, raw, "expected table size"))?;
    let group = take_group(&mut rest)
        .ok_or_else(|| parse_error(line_no, raw, "expected '<...>' table value list"))?;
    let table = parse_table_values(group)
        .ok_or_else(|| parse_error(line_no, raw, "bad field literal in table value list"))?;

    if !take_keyword(&mut rest, "in") {
        return Err(parse_error(line_no, raw, "expected 'in'"));
    }
    let group = take_group(&mut rest)
        .ok_or_else(|| parse_error(line_no, raw, "expected '<...>' input wire list"))?;
    let inputs = parse_wire_list(group)
        .ok_or_else(|| parse_error(line_no, raw, "bad wire id in input list"))?;

    if !take_keyword(&mut rest, "out") {
        return Err(parse_error(line_no, raw, "expected 'out'"));
    }
    let group = take_group(&mut rest)
        .ok_or_else(|| parse_error(line_no, raw, "expected '<...>' output wire list"))?;
    let outputs = parse_wire_list(group)
        .ok_or_else(|| parse_error(line_no, raw, "bad wire id in output list"))?;
    if !rest.trim().is_empty() {
        return Err(parse_error(line_no, raw, "trailing tokens after output list"));
    }

    if table.len() != entry_count {
        return Err(parse_error(
            line_no,
            raw,
            format!("bad number of table entries, got {} expected {entry_count}", table.len()),
        ));
    }
    if !matches!(entry_count, 2 | 4 | 8) {
        return Err(parse_error(
            line_no,
            raw,
            format!("unsupported lookup table size: {entry_count}"),
        ));
    }
    let expected_inputs = entry_count.trailing_zeros() as usize;
    if inputs.len() != expected_inputs {
        return Err(parse_error(
            line_no,
            raw,
            format!(
                "{entry_count}-entry table requires {expected_inputs} input wires, got {}",
                inputs.len()
            ),
        ));
    }
    if outputs.len() != 1 {
        return Err(parse_error(
            line_no,
            raw,
            format!("table requires exactly 1 output wire, got {}", outputs.len()),
        ));
    }

    for &wire in inputs.iter().chain(&outputs) {
        compiler.fetch_wire(wire);
    }

    let mut instruction = Instruction::new(Opcode::Table, inputs, outputs);
    instruction.table = table;
    Ok(instruction)
}

/// Parses a circuit file, allocating a constraint-system variable for every
/// wire on its first reference (declarations and instruction operands alike).
///
/// Comments start with `#` and run to end of line; blank lines are skipped.
/// The first significant line must be the `total <count>` header.
pub(crate) fn parse_circuit(
    source: &str,
    compiler: &mut ArithToR1CSCompiler,
) -> Result<Circuit, CircuitError> {
    let mut circuit = Circuit::default();
    let mut seen_total = false;

    for (index, raw) in source.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        let line = line.split_once('#').map_or(line, |(code, _)| code.trim_end());
        if line.is_empty() {
            continue;
        }

        if !seen_total {
            let mut tokens = line.split_whitespace();
            match (tokens.next(), tokens.next(), tokens.next()) {
                (Some("total"), Some(count), None) => {
                    circuit.num_wires = count
                        .parse()
                        .map_err(|_| parse_error(line_no, raw, format!("bad wire count '{count}'")))?;
                    seen_total = true;
                    continue;
                }
                _ => return Err(parse_error(line_no, raw, "first statement must be 'total <count>'")),
            }
        }

        let (term, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        match term {
            "input" => {
                let wire = parse_wire_declaration(rest)
                    .ok_or_else(|| parse_error(line_no, raw, "expected 'input <wire>'"))?;
                compiler.fetch_wire(wire);
                circuit.input_wires.push(wire);
            }
            "nizkinput" => {
                let wire = parse_wire_declaration(rest)
                    .ok_or_else(|| parse_error(line_no, raw, "expected 'nizkinput <wire>'"))?;
                compiler.fetch_wire(wire);
                circuit.nizk_wires.push(wire);
            }
            "output" => {
                let wire = parse_wire_declaration(rest)
                    .ok_or_else(|| parse_error(line_no, raw, "expected 'output <wire>'"))?;
                compiler.fetch_wire(wire);
                circuit.output_wires.push(wire);
            }
            "table" => {
                circuit.instructions.push(parse_table(rest, line_no, raw, compiler)?);
            }
            _ => {
                circuit
                    .instructions
                    .push(parse_operation(term, rest, line_no, raw, compiler)?);
            }
        }
    }

    if !seen_total {
        return Err(parse_error(0, "", "missing 'total' header"));
    }

    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Circuit, CircuitError> {
        let mut compiler = ArithToR1CSCompiler::new(false);
        parse_circuit(source, &mut compiler)
    }

    fn parse_message(source: &str) -> String {
        match parse(source).unwrap_err() {
            CircuitError::Parse { message, .. } => message,
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn parses_declarations_and_operations() {
        let circuit = parse(
            "total 6\n\
             # a comment\n\
             input 0\n\
             input 1\n\
             nizkinput 2\n\
             mul in 2 <0 1> out 1 <3>\n\
             add in 3 <0 1 3> out 1 <4> # trailing comment\n\
             output 4\n",
        )
        .unwrap();

        assert_eq!(circuit.num_wires, 6);
        assert_eq!(circuit.input_wires, vec![0, 1]);
        assert_eq!(circuit.nizk_wires, vec![2]);
        assert_eq!(circuit.output_wires, vec![4]);
        assert_eq!(circuit.instructions.len(), 2);
        assert_eq!(circuit.instructions[0].opcode, Opcode::Mul);
        assert_eq!(circuit.instructions[1].inputs, vec![0, 1, 3]);
    }

    #[test]
    fn parses_const_mul_constants() {
        let circuit = parse(
            "total 3\n\
             input 0\n\
             const-mul-ff in 1 <0> out 1 <1>\n\
             const-mul-neg-ff in 1 <0> out 1 <2>\n",
        )
        .unwrap();
        let expected = FieldElement::from(255u64);
        assert_eq!(circuit.instructions[0].constant, expected);
        assert_eq!(circuit.instructions[1].constant, -expected);
    }

    #[test]
    fn requires_total_header() {
        assert!(matches!(parse("input 0\n"), Err(CircuitError::Parse { line_no: 1, .. })));
        assert!(matches!(parse("\n# nothing\n"), Err(CircuitError::Parse { .. })));
    }

    #[test]
    fn rejects_unknown_opcodes() {
        assert!(parse_message("total 2\nfrobnicate in 1 <0> out 1 <1>\n").contains("unknown opcode"));
    }

    #[test]
    fn rejects_declared_count_mismatches() {
        assert!(parse_message("total 4\nadd in 3 <0 1> out 1 <2>\n").contains("declared 3 inputs"));
        assert!(parse_message("total 4\nadd in 2 <0 1> out 2 <2>\n").contains("declared 2 outputs"));
    }

    #[test]
    fn rejects_arity_violations() {
        assert!(parse_message("total 4\nadd in 1 <0> out 1 <1>\n").contains("add requires"));
        assert!(parse_message("total 4\nmul in 1 <0> out 1 <1>\n").contains("mul requires"));
        assert!(parse_message("total 4\nxor in 3 <0 1 2> out 1 <3>\n").contains("xor requires"));
        assert!(parse_message("total 4\nzerop in 1 <0> out 1 <1>\n").contains("zerop requires"));
        assert!(parse_message("total 4\nsplit in 2 <0 1> out 1 <2>\n").contains("split requires"));
        assert!(parse_message("total 4\npack in 2 <0 1> out 2 <2 3>\n").contains("pack requires"));
        assert!(parse_message("total 4\nconst-mul-2 in 2 <0 1> out 1 <2>\n").contains("const-mul requires"));
    }

    #[test]
    fn parses_supported_tables() {
        let circuit = parse("total 4\ntable 4 <7 8 9 10> in <0 1> out <2>\n").unwrap();
        let inst = &circuit.instructions[0];
        assert_eq!(inst.opcode, Opcode::Table);
        assert_eq!(inst.table.len(), 4);
        assert_eq!(inst.inputs, vec![0, 1]);
        assert_eq!(inst.outputs, vec![2]);
    }

    #[test]
    fn rejects_unsupported_table_sizes() {
        assert!(parse_message("total 2\ntable 1 <5> in <> out <1>\n").contains("unsupported lookup table size: 1"));
        let sixteen = (0..16).map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
        let source = format!("total 6\ntable 16 <{sixteen}> in <0 1 2 3> out <5>\n");
        assert!(parse_message(&source).contains("unsupported lookup table size: 16"));
    }

    #[test]
    fn rejects_table_shape_mismatches() {
        assert!(parse_message("total 4\ntable 4 <7 8 9> in <0 1> out <2>\n")
            .contains("bad number of table entries"));
        assert!(parse_message("total 4\ntable 4 <7 8 9 10> in <0> out <2>\n")
            .contains("requires 2 input wires"));
        assert!(parse_message("total 4\ntable 2 <7 8> in <0> out <2 3>\n")
            .contains("exactly 1 output wire"));
    }

    #[test]
    fn rejects_malformed_operation_syntax() {
        assert!(parse_message("total 4\nadd 2 <0 1> out 1 <2>\n").contains("expected 'in'"));
        assert!(parse_message("total 4\nadd in 2 0 1 out 1 <2>\n").contains("input wire list"));
        assert!(parse_message("total 4\nadd in 2 <0 1> out 1 <2> junk\n").contains("trailing tokens"));
        assert!(parse_message("total 4\ninput 0 junk\n").contains("expected 'input <wire>'"));
    }

    #[test]
    fn allocates_wires_on_first_reference() {
        let mut compiler = ArithToR1CSCompiler::new(false);
        let circuit = parse_circuit(
            "total 4\ninput 0\nmul in 2 <0 2> out 1 <3>\n",
            &mut compiler,
        )
        .unwrap();
        // Wires 0, 2 and 3 each get exactly one variable; wire 1 none.
        assert_eq!(compiler.cs.num_variables(), 3);
        assert_eq!(circuit.instructions.len(), 1);
    }
}
