//! Instruction dispatch: one process, stepped one instruction at a time
//! via a `match` on the opcode byte rather than a 256-entry
//! function-pointer table -- the observable behavior is identical and a
//! `match` needs no unsafe initialization.

use std::rc::Rc;

use crate::bytecode::Opcode;
use crate::error::ProcessErrorKind;
use crate::object::{frame, kinds, process, LookupStatus, ObjectOps, ObjectRef, SlotKind};
use crate::symbol::SymbolKey;
use crate::universe::Universe;

pub struct Interpreter {
    universe: Rc<Universe>,
    process: ObjectRef,
}

impl Interpreter {
    pub fn new(universe: Rc<Universe>, process: ObjectRef) -> Self {
        Interpreter { universe, process }
    }

    pub fn universe(&self) -> &Rc<Universe> {
        &self.universe
    }

    pub fn process(&self) -> &ObjectRef {
        &self.process
    }

    pub fn active_frame(&self) -> Option<ObjectRef> {
        process::peek_frame(&self.process)
    }

    pub fn is_finished(&self) -> bool {
        process::has_finished(&self.process, &self.universe.get_none_object())
    }

    /// Executes exactly one instruction, or the synthetic return that
    /// fires when the active frame has run off the end of its bytecode.
    /// A no-op once the process is finished.
    pub fn step(&mut self) {
        if self.is_finished() {
            return;
        }

        let frame = self
            .active_frame()
            .expect("not finished implies an active frame");

        if frame::has_finished(&frame) {
            log::trace!("frame exhausted its instructions, synthetic RETURN_EXPLICIT");
            self.op_return_explicit();
            return;
        }

        let (opcode_byte, parameter) =
            frame::get_current_instruction(&frame).expect("frame reported not finished");
        frame::move_instruction_by(&frame, 1);

        match Opcode::try_from(opcode_byte) {
            Ok(Opcode::Noop) => log::trace!("NOOP"),
            Ok(Opcode::PushMyself) => {
                log::trace!("PUSH_MYSELF");
                self.op_push_myself(&frame);
            }
            Ok(Opcode::PushLiteral) => {
                log::trace!("PUSH_LITERAL {parameter}");
                self.op_push_literal(&frame, parameter);
            }
            Ok(Opcode::Pull) => {
                log::trace!("PULL");
                self.op_pull(&frame);
            }
            Ok(Opcode::Send) => {
                log::trace!("SEND {parameter}");
                self.op_send(&frame, parameter);
            }
            Ok(Opcode::ReturnExplicit) => {
                log::trace!("RETURN_EXPLICIT");
                self.op_return_explicit();
            }
            Err(_) => {
                log::debug!("unknown opcode byte {opcode_byte:#04x}");
                self.fail(ProcessErrorKind::UnknownOpcode);
            }
        }
    }

    pub fn execute_all(&mut self) {
        while !self.is_finished() {
            self.step();
        }
    }

    fn fail(&mut self, kind: ProcessErrorKind) {
        log::debug!("process error: {kind}");
        let error = self.universe.new_process_error(kind);
        process::set_result(&self.process, error);
    }

    fn op_push_myself(&mut self, frame: &ObjectRef) {
        let myself = frame::get_method_activation(frame);
        if let Err(kind) = frame::push_item(frame, myself) {
            self.fail(kind);
        }
    }

    fn op_push_literal(&mut self, frame: &ObjectRef, index: u8) {
        if frame::is_stack_full(frame) {
            self.fail(ProcessErrorKind::StackOverflow);
            return;
        }
        let literal = match frame::literal_get_at(frame, index as usize) {
            Some(value) => value,
            None => {
                self.fail(ProcessErrorKind::LiteralIndexOutOfBound);
                return;
            }
        };
        let pushed = literal.copy();
        frame::push_item(frame, pushed).expect("stack space already checked");
    }

    fn op_pull(&mut self, frame: &ObjectRef) {
        let none = self.universe.get_none_object();
        if let Err(kind) = frame::pull_item(frame, &none) {
            self.fail(kind);
        }
    }

    /// Pops the active frame's top value, pops the frame itself, and
    /// either finishes the process (no frames left) or delivers the
    /// value to the caller's stack.
    fn op_return_explicit(&mut self) {
        let frame = match self.active_frame() {
            Some(frame) => frame,
            None => return,
        };

        let none = self.universe.get_none_object();
        let value = match frame::pull_item(&frame, &none) {
            Ok(value) => value,
            Err(kind) => {
                self.fail(kind);
                return;
            }
        };

        process::pull_frame(&self.process);

        match process::peek_frame(&self.process) {
            None => process::set_result(&self.process, value),
            Some(caller_frame) => {
                if frame::is_stack_full(&caller_frame) {
                    self.fail(ProcessErrorKind::StackOverflow);
                    return;
                }
                frame::push_item(&caller_frame, value).expect("stack space already checked");
            }
        }
    }

    /// Resolves the selector named in the literal table, pops the
    /// receiver and its arguments off the stack, looks up the selector on
    /// the receiver, and dispatches on what the lookup found.
    fn op_send(&mut self, frame: &ObjectRef, literal_index: u8) {
        let selector = match frame::literal_get_at(frame, literal_index as usize) {
            Some(value) => value,
            None => {
                self.fail(ProcessErrorKind::LiteralIndexOutOfBound);
                return;
            }
        };
        let selector_key = match selector.symbol_key() {
            Some(key) => key,
            None => {
                self.fail(ProcessErrorKind::NotSymbolicSelector);
                return;
            }
        };

        let arity = selector_key.arity() as usize;
        if frame::stack_depth(frame) < arity + 1 {
            self.fail(ProcessErrorKind::StackUnderflow);
            return;
        }

        let none = self.universe.get_none_object();
        let mut args = Vec::with_capacity(arity);
        for _ in 0..arity {
            args.push(frame::pull_item(frame, &none).expect("stack depth already checked"));
        }
        args.reverse();
        let receiver = frame::pull_item(frame, &none).expect("stack depth already checked");

        let (status, location) = receiver.lookup_slot(&selector_key);
        let location = match status {
            LookupStatus::FoundOne => location.expect("FoundOne always carries a location"),
            LookupStatus::FoundNone => {
                self.fail(ProcessErrorKind::SlotLookupNotFound);
                return;
            }
            LookupStatus::FoundMany => {
                self.fail(ProcessErrorKind::SlotLookupAmbiguous);
                return;
            }
        };
        let content = location
            .get_slot(&selector_key)
            .expect("lookup_slot found this name on this object");

        self.dispatch_send_content(frame, &receiver, &location, &content, &args);
    }

    fn dispatch_send_content(
        &mut self,
        frame: &ObjectRef,
        receiver: &ObjectRef,
        location: &ObjectRef,
        content: &ObjectRef,
        args: &[ObjectRef],
    ) {
        if let Some(target) = kinds::assignment_target(content) {
            if args.len() != 1 {
                self.fail(ProcessErrorKind::AssignmentArityMismatch);
                return;
            }
            location.set_slot(&target, args[0].clone());
            if let Err(kind) = frame::push_item(frame, args[0].clone()) {
                self.fail(kind);
            }
            return;
        }

        if let Some(native_call) = kinds::primitive_native_call(content) {
            match (native_call)(self, receiver, args) {
                Ok(value) => {
                    if let Err(kind) = frame::push_item(frame, value) {
                        self.fail(kind);
                    }
                }
                Err(kind) => self.fail(kind),
            }
            return;
        }

        if content.has_code() {
            let activation = content.copy();
            let parameter_slots = activation.select_slots(|kind| kind.is_parameter);
            for (index, (name, _)) in parameter_slots.into_iter().enumerate() {
                if let Some(argument) = args.get(index) {
                    activation.set_slot(&name, argument.clone());
                }
            }
            // Binds unconditionally: a module-declared "me" slot on this
            // method's literal must not survive activation, or every send
            // inside this call would resolve against the wrong receiver.
            let me = SymbolKey::new("me", 0);
            activation.del_slot(&me);
            activation.add_slot(me, SlotKind::parent(), receiver.clone());

            let new_frame = self.universe.new_frame_with_code_stack_usage(activation);
            process::push_frame(&self.process, new_frame);
            return;
        }

        if let Err(kind) = frame::push_item(frame, content.clone()) {
            self.fail(kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ObjectData, ObjectKind};
    use std::rc::Rc as StdRc;

    fn bytecode_bytes(universe: &Universe, bytes: &[u8]) -> ObjectRef {
        let array = universe.new_byte_array(bytes.len());
        for (index, byte) in bytes.iter().enumerate() {
            kinds::byte_array_put(&array, index, *byte);
        }
        array
    }

    fn run_module(universe: &Rc<Universe>, bytecode: &[u8], literals: Vec<ObjectRef>, stack_usage: u32) -> Interpreter {
        let literal_array = universe.new_object_array(literals.len());
        for (index, literal) in literals.into_iter().enumerate() {
            kinds::object_array_put(&literal_array, index, literal);
        }
        let code = universe.new_code(stack_usage, literal_array, bytecode_bytes(universe, bytecode));
        let method = ObjectData::new(ObjectKind::Plain);
        method.borrow_mut().code = Some(code);
        let frame = universe.new_frame_with_code_stack_usage(method);
        let process = universe.new_process(frame);
        Interpreter::new(universe.clone(), process)
    }

    #[test]
    fn bare_noop_then_synthetic_return_finishes_with_none() {
        let universe = Universe::init_clean_universe();
        let mut interpreter = run_module(&universe, &[0x00, 0x00], vec![], 0);
        interpreter.step();
        assert!(frame::has_finished(&interpreter.active_frame().unwrap()));
        interpreter.step();
        assert!(interpreter.is_finished());
        assert!(StdRc::ptr_eq(&process::get_result(interpreter.process()), &universe.get_none_object()));
    }

    #[test]
    fn push_then_return_yields_a_copy_of_the_literal() {
        let universe = Universe::init_clean_universe();
        let seven = universe.new_small_integer(7);
        let mut interpreter = run_module(&universe, &[0x11, 0x00, 0x30, 0x00], vec![seven.clone()], 1);
        interpreter.execute_all();
        let result = process::get_result(interpreter.process());
        assert_eq!(kinds::small_integer_value(&result), Some(7));
        assert!(!StdRc::ptr_eq(&result, &seven));
    }

    #[test]
    fn unknown_opcode_sets_error_result() {
        let universe = Universe::init_clean_universe();
        let mut interpreter = run_module(&universe, &[0xEE, 0x00], vec![], 0);
        interpreter.step();
        let result = process::get_result(interpreter.process());
        let name = result.get_slot(&SymbolKey::new("name", 0)).unwrap();
        assert_eq!(name.symbol_key(), Some(SymbolKey::new("unknownOpcode", 0)));
    }

    #[test]
    fn push_literal_on_full_stack_overflows_without_mutating_stack() {
        let universe = Universe::init_clean_universe();
        let seven = universe.new_small_integer(7);
        let mut interpreter = run_module(&universe, &[0x11, 0x00, 0x11, 0x00], vec![seven], 1);
        interpreter.step();
        let frame = interpreter.active_frame().unwrap();
        assert!(frame::is_stack_full(&frame));
        interpreter.step();
        let result = process::get_result(interpreter.process());
        let name = result.get_slot(&SymbolKey::new("name", 0)).unwrap();
        assert_eq!(name.symbol_key(), Some(SymbolKey::new("stackOverflow", 0)));
        assert!(frame::is_stack_full(&frame));
    }
}
