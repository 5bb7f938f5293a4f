//! Demonstration primitive catalogue: small-integer arithmetic,
//! byte/object array accessors, string length, and a minimal
//! `mirror_on:`/`add_slot:kind:value:` reflection pair.
//!
//! This is explicitly not a standard library -- a full catalogue is out
//! of scope here.

use std::rc::Rc;

use crate::error::ProcessErrorKind;
use crate::interpreter::Interpreter;
use crate::object::{kinds, ObjectOps, ObjectRef, SlotKind};
use crate::symbol::SymbolKey;
use crate::universe::Universe;

/// Registers every primitive as a `PrimitiveMethod` slot on
/// `universe.primitives_object()`, mirroring the original prototype's
/// `add_primitive((name, param_count, func))` registration pattern.
pub fn install(universe: &Rc<Universe>) {
    let holder = universe.primitives_object();

    add(universe, &holder, "small_integer_add:", 1, small_integer_add);
    add(universe, &holder, "small_integer_sub:", 1, small_integer_sub);
    add(universe, &holder, "small_integer_mul:", 1, small_integer_mul);
    add(universe, &holder, "small_integer_div:", 1, small_integer_div);
    add(universe, &holder, "byte_array_get:", 1, byte_array_get);
    add(universe, &holder, "byte_array_put:value:", 2, byte_array_put);
    add(universe, &holder, "object_array_get:", 1, object_array_get);
    add(universe, &holder, "object_array_put:value:", 2, object_array_put);
    add(universe, &holder, "string_length", 0, string_length);
    add(universe, &holder, "mirror_on:", 1, mirror_on);
    add(universe, &holder, "add_slot:kind:value:", 3, add_slot_kind_value);
}

/// `(interpreter, receiver, arguments) -> result`, matching
/// `object::NativeCall` -- the receiver is never folded into
/// `arguments`, so `arguments.len()` is always the selector's arity.
type Native = fn(&mut Interpreter, &ObjectRef, &[ObjectRef]) -> Result<ObjectRef, ProcessErrorKind>;

fn add(universe: &Rc<Universe>, holder: &ObjectRef, name: &str, parameter_count: u32, native: Native) {
    let selector = SymbolKey::new(name, parameter_count);
    let method = universe.new_primitive(parameter_count, Rc::new(native));
    holder.add_slot(selector, SlotKind::default(), method);
}

fn small_integers(receiver: &ObjectRef, args: &[ObjectRef]) -> Result<(i64, i64), ProcessErrorKind> {
    debug_assert_eq!(args.len(), 1, "binding guarantees exactly one argument");
    let receiver = kinds::small_integer_value(receiver).ok_or(ProcessErrorKind::PrimitiveFailed)?;
    let argument = kinds::small_integer_value(&args[0]).ok_or(ProcessErrorKind::PrimitiveFailed)?;
    Ok((receiver, argument))
}

fn small_integer_add(
    interpreter: &mut Interpreter,
    receiver: &ObjectRef,
    args: &[ObjectRef],
) -> Result<ObjectRef, ProcessErrorKind> {
    let (receiver, argument) = small_integers(receiver, args)?;
    Ok(interpreter.universe().new_small_integer(receiver.wrapping_add(argument)))
}

fn small_integer_sub(
    interpreter: &mut Interpreter,
    receiver: &ObjectRef,
    args: &[ObjectRef],
) -> Result<ObjectRef, ProcessErrorKind> {
    let (receiver, argument) = small_integers(receiver, args)?;
    Ok(interpreter.universe().new_small_integer(receiver.wrapping_sub(argument)))
}

fn small_integer_mul(
    interpreter: &mut Interpreter,
    receiver: &ObjectRef,
    args: &[ObjectRef],
) -> Result<ObjectRef, ProcessErrorKind> {
    let (receiver, argument) = small_integers(receiver, args)?;
    Ok(interpreter.universe().new_small_integer(receiver.wrapping_mul(argument)))
}

fn small_integer_div(
    interpreter: &mut Interpreter,
    receiver: &ObjectRef,
    args: &[ObjectRef],
) -> Result<ObjectRef, ProcessErrorKind> {
    let (receiver, argument) = small_integers(receiver, args)?;
    if argument == 0 {
        return Err(ProcessErrorKind::PrimitiveFailed);
    }
    Ok(interpreter.universe().new_small_integer(receiver / argument))
}

fn index_argument(args: &[ObjectRef], position: usize) -> Result<usize, ProcessErrorKind> {
    let value = kinds::small_integer_value(&args[position]).ok_or(ProcessErrorKind::PrimitiveFailed)?;
    usize::try_from(value).map_err(|_| ProcessErrorKind::PrimitiveFailed)
}

fn byte_array_get(
    interpreter: &mut Interpreter,
    receiver: &ObjectRef,
    args: &[ObjectRef],
) -> Result<ObjectRef, ProcessErrorKind> {
    let index = index_argument(args, 0)?;
    let value = kinds::byte_array_get(receiver, index).ok_or(ProcessErrorKind::PrimitiveFailed)?;
    Ok(interpreter.universe().new_small_integer(value as i64))
}

fn byte_array_put(
    _interpreter: &mut Interpreter,
    receiver: &ObjectRef,
    args: &[ObjectRef],
) -> Result<ObjectRef, ProcessErrorKind> {
    let index = index_argument(args, 0)?;
    let value = kinds::small_integer_value(&args[1]).ok_or(ProcessErrorKind::PrimitiveFailed)?;
    let byte = u8::try_from(value).map_err(|_| ProcessErrorKind::PrimitiveFailed)?;
    if !kinds::byte_array_put(receiver, index, byte) {
        return Err(ProcessErrorKind::PrimitiveFailed);
    }
    Ok(args[1].clone())
}

fn object_array_get(
    _interpreter: &mut Interpreter,
    receiver: &ObjectRef,
    args: &[ObjectRef],
) -> Result<ObjectRef, ProcessErrorKind> {
    let index = index_argument(args, 0)?;
    kinds::object_array_get(receiver, index).ok_or(ProcessErrorKind::PrimitiveFailed)
}

fn object_array_put(
    _interpreter: &mut Interpreter,
    receiver: &ObjectRef,
    args: &[ObjectRef],
) -> Result<ObjectRef, ProcessErrorKind> {
    let index = index_argument(args, 0)?;
    if !kinds::object_array_put(receiver, index, args[1].clone()) {
        return Err(ProcessErrorKind::PrimitiveFailed);
    }
    Ok(args[1].clone())
}

fn string_length(
    interpreter: &mut Interpreter,
    receiver: &ObjectRef,
    _args: &[ObjectRef],
) -> Result<ObjectRef, ProcessErrorKind> {
    let text = kinds::string_text(receiver).ok_or(ProcessErrorKind::PrimitiveFailed)?;
    Ok(interpreter.universe().new_small_integer(text.chars().count() as i64))
}

/// A minimal reflection stub: returns its argument unchanged, standing in
/// for a richer mirror object a full standard library would build here.
fn mirror_on(
    _interpreter: &mut Interpreter,
    _receiver: &ObjectRef,
    args: &[ObjectRef],
) -> Result<ObjectRef, ProcessErrorKind> {
    Ok(args[0].clone())
}

fn add_slot_kind_value(
    _interpreter: &mut Interpreter,
    receiver: &ObjectRef,
    args: &[ObjectRef],
) -> Result<ObjectRef, ProcessErrorKind> {
    let name = args[0].symbol_key().ok_or(ProcessErrorKind::PrimitiveFailed)?;
    let kind_flags = kinds::small_integer_value(&args[1]).ok_or(ProcessErrorKind::PrimitiveFailed)?;
    let kind_byte = u8::try_from(kind_flags).map_err(|_| ProcessErrorKind::PrimitiveFailed)?;
    let kind = SlotKind::from_byte(kind_byte).map_err(|_| ProcessErrorKind::PrimitiveFailed)?;
    if !receiver.add_slot(name, kind, args[2].clone()) {
        return Err(ProcessErrorKind::PrimitiveFailed);
    }
    Ok(receiver.clone())
}
