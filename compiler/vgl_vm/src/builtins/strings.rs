use crate::errors::VmResult;
use crate::Interpreter;

pub fn string_concat(vm: &mut Interpreter) -> VmResult<()> {
    let b = vm.pop_str()?;
    let a = vm.pop_str()?;
    let mut joined = String::with_capacity(a.len() + b.len());
    joined.push_str(&a);
    joined.push_str(&b);
    vm.push(joined);
    Ok(())
}

/// Length in characters.
pub fn string_length(vm: &mut Interpreter) -> VmResult<()> {
    let s = vm.pop_str()?;
    let len = i64::try_from(s.chars().count()).unwrap_or(i64::MAX);
    vm.push(len);
    Ok(())
}

pub fn string_empty(vm: &mut Interpreter) -> VmResult<()> {
    vm.push("");
    Ok(())
}
