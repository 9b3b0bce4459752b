use {
    crate::arith_to_r1cs::ArithToR1CSCompiler,
    pinarith_common::{utils::field_from_hex, CircuitError},
};

fn input_error(line_no: usize, line: &str, message: impl Into<String>) -> CircuitError {
    CircuitError::Input {
        line_no,
        line: line.to_string(),
        message: message.into(),
    }
}

/// Loads a wire assignment file: one `<decimal-wire-id><sep><hex-value>`
/// entry per non-blank line, where the separator is one or more characters
/// from `{'=', ' '}`. Later entries overwrite earlier ones.
pub(crate) fn load_inputs(
    source: &str,
    compiler: &mut ArithToR1CSCompiler,
) -> Result<(), CircuitError> {
    for (index, raw) in source.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let separator = line
            .find(|c: char| c == '=' || c == ' ')
            .ok_or_else(|| input_error(line_no, raw, "missing value separator"))?;
        let (id, rest) = line.split_at(separator);
        let wire = id
            .parse()
            .map_err(|_| input_error(line_no, raw, format!("bad wire id '{id}'")))?;

        let rest = rest.trim_start_matches(['=', ' ']);
        let value = rest
            .split_whitespace()
            .next()
            .ok_or_else(|| input_error(line_no, raw, "missing value"))?;
        let value = field_from_hex(value)
            .ok_or_else(|| input_error(line_no, raw, format!("bad hexadecimal value '{value}'")))?;

        compiler.set_wire_value(wire, value);
    }
    compiler.mark_values_known();
    Ok(())
}

#[cfg(test)]
mod tests {
    use {super::*, pinarith_common::FieldElement};

    fn load(source: &str) -> Result<ArithToR1CSCompiler, CircuitError> {
        let mut compiler = ArithToR1CSCompiler::new(false);
        load_inputs(source, &mut compiler)?;
        Ok(compiler)
    }

    #[test]
    fn accepts_any_mix_of_separators() {
        let mut compiler = load("0=ff\n1 ff\n2 = ff\n3==  ==ff\n").unwrap();
        for wire in 0..4 {
            assert_eq!(compiler.wire_value(wire), FieldElement::from(255u64));
        }
    }

    #[test]
    fn last_write_wins() {
        let mut compiler = load("5=1\n5=2\n").unwrap();
        assert_eq!(compiler.wire_value(5), FieldElement::from(2u64));
    }

    #[test]
    fn rejects_malformed_entries() {
        assert!(matches!(load("5\n"), Err(CircuitError::Input { line_no: 1, .. })));
        assert!(matches!(load("5=\n"), Err(CircuitError::Input { .. })));
        assert!(matches!(load("x=ff\n"), Err(CircuitError::Input { .. })));
        assert!(matches!(load("5=0xff\n"), Err(CircuitError::Input { .. })));
    }
}
