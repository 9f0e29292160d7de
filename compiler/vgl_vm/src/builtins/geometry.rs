use crate::errors::VmResult;
use crate::{Interpreter, Pair, Triple};

pub fn real_real_to_pair(vm: &mut Interpreter) -> VmResult<()> {
    let y = vm.pop_real()?;
    let x = vm.pop_real()?;
    vm.push(Pair::new(x, y));
    Ok(())
}

pub fn pair_x_part(vm: &mut Interpreter) -> VmResult<()> {
    let p = vm.pop_pair()?;
    vm.push(p.x);
    Ok(())
}

pub fn pair_y_part(vm: &mut Interpreter) -> VmResult<()> {
    let p = vm.pop_pair()?;
    vm.push(p.y);
    Ok(())
}

pub fn pair_length(vm: &mut Interpreter) -> VmResult<()> {
    let p = vm.pop_pair()?;
    vm.push(p.length());
    Ok(())
}

pub fn pair_negate(vm: &mut Interpreter) -> VmResult<()> {
    let p = vm.pop_pair()?;
    vm.push(-p);
    Ok(())
}

pub fn pair_plus(vm: &mut Interpreter) -> VmResult<()> {
    let b = vm.pop_pair()?;
    let a = vm.pop_pair()?;
    vm.push(a + b);
    Ok(())
}

pub fn pair_minus(vm: &mut Interpreter) -> VmResult<()> {
    let b = vm.pop_pair()?;
    let a = vm.pop_pair()?;
    vm.push(a - b);
    Ok(())
}

pub fn pair_zero(vm: &mut Interpreter) -> VmResult<()> {
    vm.push(Pair::default());
    Ok(())
}

pub fn real_real_real_to_triple(vm: &mut Interpreter) -> VmResult<()> {
    let z = vm.pop_real()?;
    let y = vm.pop_real()?;
    let x = vm.pop_real()?;
    vm.push(Triple::new(x, y, z));
    Ok(())
}

pub fn triple_x_part(vm: &mut Interpreter) -> VmResult<()> {
    let t = vm.pop_triple()?;
    vm.push(t.x);
    Ok(())
}

pub fn triple_y_part(vm: &mut Interpreter) -> VmResult<()> {
    let t = vm.pop_triple()?;
    vm.push(t.y);
    Ok(())
}

pub fn triple_z_part(vm: &mut Interpreter) -> VmResult<()> {
    let t = vm.pop_triple()?;
    vm.push(t.z);
    Ok(())
}

pub fn triple_length(vm: &mut Interpreter) -> VmResult<()> {
    let t = vm.pop_triple()?;
    vm.push(t.length());
    Ok(())
}

pub fn triple_zero(vm: &mut Interpreter) -> VmResult<()> {
    vm.push(Triple::default());
    Ok(())
}
