//! The two error regimes: host-visible errors that unwind through
//! `Result` and get printed to stderr, and process errors, which are VM
//! data that never leave the interpreter as a Rust error.

use strum::Display as StrumDisplay;
use thiserror::Error;

/// A precondition violation during opcode dispatch. Turned into a VM error
/// object (`Universe::new_error_object`) rather than propagated as a Rust
/// `Result::Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
pub enum ProcessErrorKind {
    UnknownOpcode,
    StackOverflow,
    StackUnderflow,
    LiteralIndexOutOfBound,
    NotSymbolicSelector,
    /// SEND against a `lookup_slot` miss is a process error, not a host
    /// panic.
    SlotLookupNotFound,
    SlotLookupAmbiguous,
    /// An Assignment slot reached by SEND with a selector whose arity
    /// isn't 1 -- the module declared a zero- or many-argument selector
    /// over content that only ever takes a single argument to store.
    AssignmentArityMismatch,
    /// A primitive that fails for data reasons (e.g. division by zero).
    PrimitiveFailed,
}

impl ProcessErrorKind {
    /// The symbol text written into the error object's `name` slot,
    /// camelCase.
    pub fn symbol_text(self) -> &'static str {
        match self {
            ProcessErrorKind::UnknownOpcode => "unknownOpcode",
            ProcessErrorKind::StackOverflow => "stackOverflow",
            ProcessErrorKind::StackUnderflow => "stackUnderflow",
            ProcessErrorKind::LiteralIndexOutOfBound => "literalIndexOutOfBound",
            ProcessErrorKind::NotSymbolicSelector => "notSymbolicSelector",
            ProcessErrorKind::SlotLookupNotFound => "slotLookupNotFound",
            ProcessErrorKind::SlotLookupAmbiguous => "slotLookupAmbiguous",
            ProcessErrorKind::AssignmentArityMismatch => "assignmentArityMismatch",
            ProcessErrorKind::PrimitiveFailed => "primitiveFailed",
        }
    }
}

/// Failures while decoding a module's byte stream.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("unexpected end of module, expected {expected_bytes} more byte(s)")]
    UnexpectedEof { expected_bytes: usize },

    #[error("bad module magic: expected \"ORE\", found {found:?}")]
    BadMagic { found: Vec<u8> },

    #[error("unknown literal tag byte: {0:#04x}")]
    UnknownTag(u8),

    #[error("tag mismatch: expected {expected}, found tag {found:#04x}")]
    TagMismatch { expected: &'static str, found: u8 },

    #[error("slot name {name} is already present on this object")]
    DuplicateSlot { name: String },

    #[error("reserved bits set in slot-kind byte: {0:#04x}")]
    ReservedSlotKindBits(u8),

    #[error("symbol/string payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("negative count where a non-negative count was expected: {0}")]
    NegativeCount(i64),

    #[error("module body's top-level literal was not a Code object (tag {found:#04x})")]
    TopLevelNotCode { found: u8 },
}

/// Failures reported directly to the operator running the `orevm` binary.
#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("usage: orevm <module-file>")]
    MissingArgument,

    #[error("could not read module file {path}: {source}")]
    ModuleUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to deserialize module {path}: {source}")]
    Deserialize {
        path: String,
        #[source]
        source: DeserializeError,
    },
}
