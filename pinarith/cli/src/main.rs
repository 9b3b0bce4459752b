use {
    anyhow::{Context, Result},
    clap::{error::ErrorKind, Parser, Subcommand},
    pinarith_common::CircuitError,
    pinarith_r1cs_compiler::CompiledCircuit,
    std::{path::PathBuf, process::ExitCode},
    tracing_subscriber::EnvFilter,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Pinocchio arithmetic circuit evaluator and R1CS compiler")]
struct Args {
    /// Circuit file in the Pinocchio arith format
    circuit: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate the circuit and print every output wire value
    Eval { inputs: Option<PathBuf> },
    /// Evaluate with per-instruction tracing of wire values
    Trace { inputs: Option<PathBuf> },
    /// Check that the evaluated assignment satisfies all constraints
    Test { inputs: Option<PathBuf> },
    /// Parse the circuit and re-emit it in canonical form
    Print,
    /// Emit the R1CS constraint system as JSON
    Compile {
        /// Output path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// Exit codes: 0 success, 1 usage, 2 unsatisfied or internal error,
// 5 missing sub-arguments, 6 malformed circuit file.
const EXIT_INTERNAL: u8 = 2;
const EXIT_MISSING_ARGS: u8 = 5;
const EXIT_BAD_CIRCUIT: u8 = 6;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = match err.downcast_ref::<CircuitError>() {
                Some(CircuitError::Parse { .. }) => EXIT_BAD_CIRCUIT,
                _ => EXIT_INTERNAL,
            };
            ExitCode::from(code)
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    match args.command {
        Command::Eval { inputs } => {
            let Some(inputs) = inputs else {
                return Ok(missing_args("eval <circuit.inputs>"));
            };
            let compiled = CompiledCircuit::from_files(&args.circuit, Some(inputs.as_path()), false)?;
            print_outputs(&compiled);
            Ok(report_satisfaction(&compiled))
        }
        Command::Trace { inputs } => {
            let Some(inputs) = inputs else {
                return Ok(missing_args("trace <circuit.inputs>"));
            };
            let compiled = CompiledCircuit::from_files(&args.circuit, Some(inputs.as_path()), true)?;
            print_outputs(&compiled);
            Ok(report_satisfaction(&compiled))
        }
        Command::Test { inputs } => {
            let Some(inputs) = inputs else {
                return Ok(missing_args("test <circuit.inputs>"));
            };
            let compiled = CompiledCircuit::from_files(&args.circuit, Some(inputs.as_path()), false)?;
            Ok(report_satisfaction(&compiled))
        }
        Command::Print => {
            let compiled = CompiledCircuit::from_files(&args.circuit, None, false)?;
            let circuit = &compiled.circuit;
            println!("total {}", circuit.num_wires);
            for wire in &circuit.input_wires {
                println!("input {wire}");
            }
            for wire in &circuit.nizk_wires {
                println!("nizkinput {wire}");
            }
            for wire in &circuit.output_wires {
                println!("output {wire}");
            }
            for instruction in &circuit.instructions {
                println!("{instruction}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Compile { output } => {
            let compiled = CompiledCircuit::from_files(&args.circuit, None, false)?;
            let json = serde_json::to_string_pretty(compiled.constraint_system())
                .context("while encoding constraint system")?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("while writing {}", path.display()))?,
                None => println!("{json}"),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn missing_args(usage: &str) -> ExitCode {
    eprintln!("Usage: pinarith <circuit.arith> {usage}");
    ExitCode::from(EXIT_MISSING_ARGS)
}

fn print_outputs(compiled: &CompiledCircuit) {
    for &wire in compiled.output_wires() {
        match compiled.wire_value(wire) {
            Some(value) => println!("{wire}={value}"),
            None => println!("{wire}=<unset>"),
        }
    }
}

fn report_satisfaction(compiled: &CompiledCircuit) -> ExitCode {
    if compiled.is_satisfied() {
        ExitCode::SUCCESS
    } else {
        eprintln!("Error: not satisfied!");
        ExitCode::from(EXIT_INTERNAL)
    }
}
