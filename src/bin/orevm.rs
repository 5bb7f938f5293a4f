//! The launcher binary: build a universe, optionally run a `bootloader`
//! module, run the module named on the command line, exit.

use std::rc::Rc;

use orevm::error::LauncherError;
use orevm::interpreter::Interpreter;
use orevm::object::{ObjectOps, ObjectRef, SlotKind};
use orevm::symbol::SymbolKey;
use orevm::universe::Universe;
use orevm::{deserializer, logger, primitives};

fn main() {
    logger::init();
    if let Err(error) = run() {
        eprintln!("orevm: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), LauncherError> {
    let universe = Universe::init_clean_universe();
    primitives::install(&universe);
    log::info!("universe bootstrapped");

    if let Some(bytes) = read_optional("bootloader")? {
        log::info!("running bootloader");
        run_module_bytes(&universe, "bootloader", &bytes)?;
    }

    let module_path = std::env::args().nth(1).ok_or(LauncherError::MissingArgument)?;
    let bytes = std::fs::read(&module_path).map_err(|source| LauncherError::ModuleUnreadable {
        path: module_path.clone(),
        source,
    })?;

    log::info!("running module {module_path}");
    run_module_bytes(&universe, &module_path, &bytes)
}

fn read_optional(path: &str) -> Result<Option<Vec<u8>>, LauncherError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(LauncherError::ModuleUnreadable {
            path: path.to_string(),
            source,
        }),
    }
}

fn run_module_bytes(universe: &Rc<Universe>, path: &str, bytes: &[u8]) -> Result<(), LauncherError> {
    let code = deserializer::deserialize_module(universe, bytes).map_err(|source| LauncherError::Deserialize {
        path: path.to_string(),
        source,
    })?;

    let method = wrap_as_method(universe, code);
    let frame = universe.new_frame_with_code_stack_usage(method);
    let process = universe.new_process(frame);
    let mut interpreter = Interpreter::new(universe.clone(), process);
    interpreter.execute_all();
    Ok(())
}

/// Wraps the module's top-level Code in a plain method object whose `me`
/// parent slot points at the lobby, the same shape `SEND` gives every
/// other method activation.
fn wrap_as_method(universe: &Universe, code: ObjectRef) -> ObjectRef {
    let method = universe.new_plain_object();
    method.borrow_mut().code = Some(code);
    let lobby = universe.get_lobby_object();
    method.add_slot(SymbolKey::new("me", 0), SlotKind::parent(), lobby);
    method
}
