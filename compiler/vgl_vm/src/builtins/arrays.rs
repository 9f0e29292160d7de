//! Arrays and null handles.

use crate::errors::{self, VmError, VmResult};
use crate::{Array, Callable, Interpreter, Item};

pub fn push_null_record(vm: &mut Interpreter) -> VmResult<()> {
    vm.push(Item::null_frame());
    Ok(())
}

pub fn push_null_function(vm: &mut Interpreter) -> VmResult<()> {
    vm.push(Callable::Null);
    Ok(())
}

pub fn push_null_array(vm: &mut Interpreter) -> VmResult<()> {
    vm.push(Item::null_array());
    Ok(())
}

pub fn empty_array(vm: &mut Interpreter) -> VmResult<()> {
    vm.push(Array::new(Vec::new()));
    Ok(())
}

/// `n` uninitialized elements. A size the allocator refuses is a resource
/// error, not a panic.
pub fn new_array(vm: &mut Interpreter) -> VmResult<()> {
    let n = vm.pop_int()?;
    let len = usize::try_from(n)
        .map_err(|_| VmError::new(format!("cannot create an array of negative size {n}")))?;
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(len)
        .map_err(|_| errors::allocation_failed(len))?;
    slots.resize(len, Item::Void);
    vm.push(Array::new(slots));
    Ok(())
}

fn element_index(array: &Array, index: i64) -> VmResult<usize> {
    let len = array.len();
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| errors::index_out_of_bounds(index, len))
}

pub fn array_read(vm: &mut Interpreter) -> VmResult<()> {
    let index = vm.pop_int()?;
    let array = vm.pop_array()?.ok_or_else(errors::null_array)?;
    let i = element_index(&array, index)?;
    let item = array.get(i).ok_or_else(|| errors::index_out_of_bounds(index, array.len()))?;
    vm.push(item);
    Ok(())
}

/// Store a value and leave it on the stack as the assignment's result.
pub fn array_write(vm: &mut Interpreter) -> VmResult<()> {
    let value = vm.pop()?;
    let index = vm.pop_int()?;
    let array = vm.pop_array()?.ok_or_else(errors::null_array)?;
    let i = element_index(&array, index)?;
    if !array.set(i, value.clone()) {
        return Err(errors::index_out_of_bounds(index, array.len()));
    }
    vm.push(value);
    Ok(())
}

pub fn array_length(vm: &mut Interpreter) -> VmResult<()> {
    let array = vm.pop_array()?.ok_or_else(errors::null_array)?;
    vm.push(i64::try_from(array.len()).unwrap_or(i64::MAX));
    Ok(())
}

pub fn array_push(vm: &mut Interpreter) -> VmResult<()> {
    let value = vm.pop()?;
    let array = vm.pop_array()?.ok_or_else(errors::null_array)?;
    array.push(value);
    Ok(())
}
