use crate::errors::{self, VmError, VmResult};
use crate::Interpreter;

/// Floored modulo: the result takes the sign of the divisor.
pub fn int_int_mod(vm: &mut Interpreter) -> VmResult<()> {
    let y = vm.pop_int()?;
    let x = vm.pop_int()?;
    if y == 0 {
        return Err(errors::division_by_zero());
    }
    let r = x.wrapping_rem(y);
    vm.push(if r != 0 && (r < 0) != (y < 0) { r + y } else { r });
    Ok(())
}

pub fn real_real_mod(vm: &mut Interpreter) -> VmResult<()> {
    let y = vm.pop_real()?;
    let x = vm.pop_real()?;
    if y == 0.0 {
        return Err(errors::division_by_zero());
    }
    vm.push(x - y * (x / y).floor());
    Ok(())
}

pub fn int_int_pow(vm: &mut Interpreter) -> VmResult<()> {
    let y = vm.pop_int()?;
    let x = vm.pop_int()?;
    if y < 0 {
        let result: i64 = match x {
            1 => 1,
            -1 if y % 2 == 0 => 1,
            -1 => -1,
            _ => {
                return Err(VmError::new(
                    "only 1 and -1 can be raised to negative exponents as integers",
                ))
            }
        };
        vm.push(result);
        return Ok(());
    }
    let exponent =
        u32::try_from(y).map_err(|_| VmError::new(format!("integer exponent {y} is too large")))?;
    vm.push(x.wrapping_pow(exponent));
    Ok(())
}

pub fn real_real_pow(vm: &mut Interpreter) -> VmResult<()> {
    let y = vm.pop_real()?;
    let x = vm.pop_real()?;
    vm.push(x.powf(y));
    Ok(())
}

pub fn real_int_pow(vm: &mut Interpreter) -> VmResult<()> {
    let y = vm.pop_int()?;
    let x = vm.pop_real()?;
    #[allow(clippy::cast_precision_loss, reason = "huge exponents lose nothing that matters")]
    let result = match i32::try_from(y) {
        Ok(n) => x.powi(n),
        Err(_) => x.powf(y as f64),
    };
    vm.push(result);
    Ok(())
}

pub fn int_abs(vm: &mut Interpreter) -> VmResult<()> {
    let x = vm.pop_int()?;
    vm.push(x.wrapping_abs());
    Ok(())
}

pub fn real_abs(vm: &mut Interpreter) -> VmResult<()> {
    let x = vm.pop_real()?;
    vm.push(x.abs());
    Ok(())
}

pub fn int_sgn(vm: &mut Interpreter) -> VmResult<()> {
    let x = vm.pop_int()?;
    vm.push(x.signum());
    Ok(())
}

/// Real to int after `round`; out-of-range values saturate, NaN gives 0.
macro_rules! real_to_int {
    ($name:ident, $round:ident) => {
        pub fn $name(vm: &mut Interpreter) -> VmResult<()> {
            let x = vm.pop_real()?;
            #[allow(clippy::cast_possible_truncation, reason = "saturating by definition")]
            vm.push(x.$round() as i64);
            Ok(())
        }
    };
}

real_to_int!(real_floor, floor);
real_to_int!(real_ceil, ceil);
real_to_int!(real_round, round);

macro_rules! real_real {
    ($name:ident, $f:ident) => {
        pub fn $name(vm: &mut Interpreter) -> VmResult<()> {
            let x = vm.pop_real()?;
            vm.push(x.$f());
            Ok(())
        }
    };
}

real_real!(real_sqrt, sqrt);
real_real!(real_sin, sin);
real_real!(real_cos, cos);
real_real!(real_exp, exp);
real_real!(real_log, ln);

pub fn bool_xor(vm: &mut Interpreter) -> VmResult<()> {
    let b = vm.pop_bool()?;
    let a = vm.pop_bool()?;
    vm.push(a ^ b);
    Ok(())
}

pub fn int_to_real(vm: &mut Interpreter) -> VmResult<()> {
    let x = vm.pop_int()?;
    #[allow(clippy::cast_precision_loss, reason = "int to real is a widening cast in the language")]
    vm.push(x as f64);
    Ok(())
}

pub fn int_zero(vm: &mut Interpreter) -> VmResult<()> {
    vm.push(0i64);
    Ok(())
}

pub fn real_zero(vm: &mut Interpreter) -> VmResult<()> {
    vm.push(0.0);
    Ok(())
}

pub fn bool_true(vm: &mut Interpreter) -> VmResult<()> {
    vm.push(true);
    Ok(())
}

pub fn bool_false(vm: &mut Interpreter) -> VmResult<()> {
    vm.push(false);
    Ok(())
}

pub fn real_pi(vm: &mut Interpreter) -> VmResult<()> {
    vm.push(std::f64::consts::PI);
    Ok(())
}
