//! The recursive-descent module deserializer.

use std::io::{Cursor, Read};

use binrw::BinReaderExt;

use crate::bytecode::{LiteralTag, MODULE_MAGIC};
use crate::error::DeserializeError;
use crate::object::{kinds, ObjectData, ObjectKind, ObjectOps, ObjectRef, SlotKind};
use crate::symbol::SymbolKey;
use crate::universe::Universe;

pub fn deserialize_module(universe: &Universe, bytes: &[u8]) -> Result<ObjectRef, DeserializeError> {
    let mut cursor = Cursor::new(bytes);

    let mut magic = [0u8; 3];
    read_exact(&mut cursor, &mut magic)?;
    if magic != MODULE_MAGIC {
        return Err(DeserializeError::BadMagic { found: magic.to_vec() });
    }

    let tag = read_tag(&mut cursor)?;
    if tag != LiteralTag::Code {
        return Err(DeserializeError::TopLevelNotCode { found: tag as u8 });
    }
    read_code(universe, &mut cursor)
}

fn read_literal(universe: &Universe, cursor: &mut Cursor<&[u8]>) -> Result<ObjectRef, DeserializeError> {
    let tag = read_tag(cursor)?;
    log::trace!("deserializer: literal tag {tag}");
    match tag {
        LiteralTag::None => Ok(universe.get_none_object()),
        LiteralTag::SmallInteger => {
            let value = read_i64(cursor)?;
            Ok(universe.new_small_integer(value))
        }
        LiteralTag::ByteArray => read_byte_array(universe, cursor),
        LiteralTag::ObjectArray => read_object_array(universe, cursor),
        LiteralTag::Symbol => {
            let key = read_symbol_payload(cursor)?;
            Ok(universe.new_symbol(key.text().to_string(), key.arity()))
        }
        LiteralTag::String => {
            let byte_count = read_count(cursor)?;
            let mut bytes = vec![0u8; byte_count];
            read_exact(cursor, &mut bytes)?;
            let text = String::from_utf8(bytes)?;
            Ok(universe.new_string(text))
        }
        LiteralTag::Code => read_code(universe, cursor),
        LiteralTag::Assignment => read_assignment(universe, cursor),
        LiteralTag::Object => read_object(universe, cursor),
    }
}

fn read_byte_array(universe: &Universe, cursor: &mut Cursor<&[u8]>) -> Result<ObjectRef, DeserializeError> {
    let count = read_count(cursor)?;
    let mut bytes = vec![0u8; count];
    read_exact(cursor, &mut bytes)?;
    let array = universe.new_byte_array(count);
    for (index, byte) in bytes.into_iter().enumerate() {
        kinds::byte_array_put(&array, index, byte);
    }
    Ok(array)
}

fn read_object_array(universe: &Universe, cursor: &mut Cursor<&[u8]>) -> Result<ObjectRef, DeserializeError> {
    let count = read_count(cursor)?;
    let array = universe.new_object_array(count);
    for index in 0..count {
        let item = read_literal(universe, cursor)?;
        kinds::object_array_put(&array, index, item);
    }
    Ok(array)
}

fn read_symbol_payload(cursor: &mut Cursor<&[u8]>) -> Result<SymbolKey, DeserializeError> {
    let arity = read_count(cursor)? as u32;
    let char_count = read_count(cursor)?;
    let mut bytes = vec![0u8; char_count];
    read_exact(cursor, &mut bytes)?;
    let text = String::from_utf8(bytes)?;
    Ok(SymbolKey::new(text, arity))
}

fn read_tagged_symbol(cursor: &mut Cursor<&[u8]>) -> Result<SymbolKey, DeserializeError> {
    let tag = read_tag(cursor)?;
    if tag != LiteralTag::Symbol {
        return Err(DeserializeError::TagMismatch {
            expected: "SYMBOL",
            found: tag as u8,
        });
    }
    read_symbol_payload(cursor)
}

fn read_code(universe: &Universe, cursor: &mut Cursor<&[u8]>) -> Result<ObjectRef, DeserializeError> {
    let stack_usage = read_count(cursor)? as u32;

    let literals_tag = read_tag(cursor)?;
    if literals_tag != LiteralTag::ObjectArray {
        return Err(DeserializeError::TagMismatch {
            expected: "OBJECT_ARRAY",
            found: literals_tag as u8,
        });
    }
    let literals = read_object_array(universe, cursor)?;

    let bytecode_tag = read_tag(cursor)?;
    if bytecode_tag != LiteralTag::ByteArray {
        return Err(DeserializeError::TagMismatch {
            expected: "BYTE_ARRAY",
            found: bytecode_tag as u8,
        });
    }
    let bytecode = read_byte_array(universe, cursor)?;

    Ok(universe.new_code(stack_usage, literals, bytecode))
}

fn read_assignment(universe: &Universe, cursor: &mut Cursor<&[u8]>) -> Result<ObjectRef, DeserializeError> {
    let target = read_tagged_symbol(cursor)?;
    Ok(universe.new_assignment(target))
}

/// Builds a bare `Plain` object rather than going through
/// `Universe::new_plain_object`: a module's own slot records are the
/// authority on this object's parent chain (often an embedded literal
/// elsewhere in the same graph), so the deserializer must not also wire
/// in the Rust-side `Plain` trait and risk a spurious duplicate `parent`.
fn read_object(universe: &Universe, cursor: &mut Cursor<&[u8]>) -> Result<ObjectRef, DeserializeError> {
    let slot_count = read_count(cursor)?;
    let object = ObjectData::new(ObjectKind::Plain);

    for _ in 0..slot_count {
        let kind_byte = read_u8(cursor)?;
        let kind = SlotKind::from_byte(kind_byte).map_err(DeserializeError::ReservedSlotKindBits)?;
        let name = read_tagged_symbol(cursor)?;
        let value = read_literal(universe, cursor)?;
        if !object.add_slot(name.clone(), kind, value) {
            return Err(DeserializeError::DuplicateSlot { name: name.to_string() });
        }
    }

    let tag = read_tag(cursor)?;
    match tag {
        LiteralTag::None => {}
        LiteralTag::Code => {
            let code = read_code(universe, cursor)?;
            object.borrow_mut().code = Some(code);
        }
        other => {
            return Err(DeserializeError::TagMismatch {
                expected: "NONE or CODE",
                found: other as u8,
            })
        }
    }

    Ok(object)
}

fn read_exact(cursor: &mut Cursor<&[u8]>, buffer: &mut [u8]) -> Result<(), DeserializeError> {
    cursor
        .read_exact(buffer)
        .map_err(|_| DeserializeError::UnexpectedEof {
            expected_bytes: buffer.len(),
        })
}

fn read_u8(cursor: &mut Cursor<&[u8]>) -> Result<u8, DeserializeError> {
    let mut byte = [0u8; 1];
    read_exact(cursor, &mut byte)?;
    Ok(byte[0])
}

fn read_i64(cursor: &mut Cursor<&[u8]>) -> Result<i64, DeserializeError> {
    cursor
        .read_be::<i64>()
        .map_err(|_| DeserializeError::UnexpectedEof { expected_bytes: 8 })
}

fn read_count(cursor: &mut Cursor<&[u8]>) -> Result<usize, DeserializeError> {
    let value = read_i64(cursor)?;
    if value < 0 {
        return Err(DeserializeError::NegativeCount(value));
    }
    Ok(value as usize)
}

fn read_tag(cursor: &mut Cursor<&[u8]>) -> Result<LiteralTag, DeserializeError> {
    let byte = read_u8(cursor)?;
    LiteralTag::try_from(byte).map_err(|_| DeserializeError::UnknownTag(byte))
}
