//! Output builtins. Both poll the interrupt flag before writing.

use crate::errors::VmResult;
use crate::Interpreter;

pub fn write(vm: &mut Interpreter) -> VmResult<()> {
    let item = vm.pop()?;
    vm.check_interrupt()?;
    vm.output().print(&item.to_string());
    Ok(())
}

pub fn writeln(vm: &mut Interpreter) -> VmResult<()> {
    let item = vm.pop()?;
    vm.check_interrupt()?;
    vm.output().println(&item.to_string());
    Ok(())
}
