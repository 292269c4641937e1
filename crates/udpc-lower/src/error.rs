use miette::{Diagnostic, SourceSpan};
use thiserror::Error;
use udpc_ir::IrError;

/// Problems in a primitive's table reported while lowering it.
///
/// None of these stop the pass: each is pushed into the diagnostic sink and
/// the table is still lowered as well as it can be.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum UdpError {
    #[error("{count} output ports for table, exactly one required.")]
    #[diagnostic(
        code(udpc_lower::output_count),
        help("Declare exactly one output port for a table primitive")
    )]
    OutputCount {
        count: usize,
        #[label("output declared here")]
        span: SourceSpan,
    },

    #[error("first port must be the output port.")]
    #[diagnostic(
        code(udpc_lower::first_port_not_output),
        help("Move the output port to the front of the port list")
    )]
    FirstPortNotOutput {
        #[label("declared before the output")]
        span: SourceSpan,
    },

    #[error("sequential tables are not supported.")]
    #[diagnostic(
        code(udpc_lower::sequential_table),
        help("Only combinational tables can be lowered; declare the output without `reg`")
    )]
    SequentialTable {
        #[label("stateful output")]
        span: SourceSpan,
    },

    #[error("table requires at least one input port.")]
    #[diagnostic(code(udpc_lower::no_input_ports))]
    NoInputPorts {
        #[label("table without inputs")]
        span: SourceSpan,
    },

    /// Input port wider than one bit. It reads as x in the input field.
    #[error("table ports must be scalar.")]
    #[diagnostic(
        code(udpc_lower::non_scalar_port),
        help("Declare table input ports without a range")
    )]
    NonScalarPort {
        width: u32,
        #[label("{width}-bit port")]
        span: SourceSpan,
    },

    #[error("{symbols} input symbols in table row, but {ports} input ports declared.")]
    #[diagnostic(
        code(udpc_lower::row_arity),
        help("Write one symbol per input port, in port declaration order")
    )]
    RowArity {
        symbols: usize,
        ports: usize,
        #[label("row")]
        span: SourceSpan,
    },

    #[error("table row has no output symbol.")]
    #[diagnostic(code(udpc_lower::missing_output_symbol))]
    MissingOutputSymbol {
        #[label("row")]
        span: SourceSpan,
    },

    /// Input symbol that is neither a level nor a configured don't-care,
    /// such as an edge. It is matched as a don't-care.
    #[error("unrecognized input symbol `{symbol}`, treated as don't-care.")]
    #[diagnostic(code(udpc_lower::unrecognized_symbol), severity(Warning))]
    UnrecognizedSymbol {
        symbol: String,
        #[label("symbol here")]
        span: SourceSpan,
    },

    /// Output symbol that is not `0`, `1` or a configured unknown spelling.
    #[error("unrecognized output symbol `{symbol}`, assigned as x.")]
    #[diagnostic(code(udpc_lower::unrecognized_output), severity(Warning))]
    UnrecognizedOutput {
        symbol: String,
        #[label("symbol here")]
        span: SourceSpan,
    },

    #[error("table outside of a primitive.")]
    #[diagnostic(
        code(udpc_lower::table_outside_primitive),
        help("Tables may only appear in a primitive body; this one is dropped")
    )]
    TableOutsidePrimitive {
        #[label("table here")]
        span: SourceSpan,
    },
}

/// Failures of the pass itself. These indicate a bug, not bad input.
#[derive(Debug, Error, Diagnostic)]
pub enum LowerError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Ir(#[from] IrError),

    #[error("{count} table nodes remain after lowering")]
    #[diagnostic(code(udpc_lower::residual_tables))]
    ResidualTables { count: usize },
}

/// Errors loading a [`LowerConfig`](crate::LowerConfig).
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid lowering configuration: {0}")]
    #[diagnostic(
        code(udpc_lower::config_parse),
        help("Check the TOML syntax and the option names")
    )]
    Parse(String),

    #[error("Invalid value for `{key}`: {reason}")]
    #[diagnostic(code(udpc_lower::config_value))]
    Value { key: &'static str, reason: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
