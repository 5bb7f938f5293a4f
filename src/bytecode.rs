//! Tag and opcode byte values fixed by the module format.

use num_enum::TryFromPrimitive;
use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, StrumDisplay)]
#[repr(u8)]
pub enum LiteralTag {
    None = 0x00,
    SmallInteger = 0x01,
    ByteArray = 0x10,
    ObjectArray = 0x11,
    Symbol = 0x12,
    String = 0x13,
    Code = 0x20,
    Assignment = 0x21,
    Object = 0x30,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, StrumDisplay)]
#[repr(u8)]
pub enum Opcode {
    Noop = 0x00,
    PushMyself = 0x10,
    PushLiteral = 0x11,
    Pull = 0x1A,
    Send = 0x20,
    ReturnExplicit = 0x30,
}

pub const MODULE_MAGIC: [u8; 3] = *b"ORE";
