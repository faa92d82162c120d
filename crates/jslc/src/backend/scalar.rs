//! Pieces shared by the scalarized targets.
//!
//! Params live in runtime arrays: `jsl_constants` holds four floats per
//! constant register, `jsl_samplers` / `jsl_buffers` hold one object per
//! slot. The entry point receives every input lane as its own parameter and
//! writes its result into the `color` array.

use alloc::{format, string::String, vec::Vec};

use super::{Lane, SlBackend, Target, LANE_SUFFIX};
use crate::{
    ast::{FuncDef, VarDecl},
    error::{JslError, JslResult},
    symbols::{CoreVar, Qualifier, VarId},
    types::{BaseKind, Type},
};

/// How a scalarized target spells constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstStyle {
    /// `#define NAME (value)`
    Define,
    /// `<qualifier> type NAME = (value);`
    Final,
}

/// Syntax differences between the scalarized targets.
pub trait ScalarTarget: Target {
    const CONST_STYLE: ConstStyle;
    /// Declaration of the entry point's output array
    const COLOR_PARAM: &'static str;
    /// Locals declared without initializer get a zero value
    const ZERO_INIT: bool;

    fn array_decl(ty: &str, name: &str, len: u32) -> String;
}

fn zero(ty: Type, float_suffix: &str) -> String {
    match ty.base() {
        BaseKind::Int => String::from("0"),
        BaseKind::Bool => String::from("false"),
        _ => format!("0.0{}", float_suffix),
    }
}

pub fn entry_point<T: ScalarTarget>(b: &mut SlBackend<'_, T>, def: &FuncDef) -> JslResult<()> {
    let mut params = Vec::new();
    for core in CoreVar::ALL {
        if core.is_output() {
            continue;
        }
        let ty = b.scalar_type_name(core.ty())?;
        for c in 0..core.ty().arity() {
            params.push(format!("{} {}_{}", ty, core.name(), LANE_SUFFIX[c as usize]));
        }
    }
    params.push(String::from(T::COLOR_PARAM));
    b.write_line(&format!("void main({}) {{", params.join(", ")));
    b.function_body(def)
}

pub fn discard<T: ScalarTarget>(b: &mut SlBackend<'_, T>) -> JslResult<()> {
    b.write_line(&format!(
        "color[0] = color[1] = color[2] = color[3] = 0.0{};",
        T::FLOAT_SUFFIX
    ));
    b.write_line("return;");
    Ok(())
}

pub fn var_decl<T: ScalarTarget>(
    b: &mut SlBackend<'_, T>,
    decl: &VarDecl,
    global: bool,
) -> JslResult<()> {
    let var = b.symbols().variable(decl.var);
    let lanes = SlBackend::<T>::lanes(var.ty);

    if var.qualifier == Qualifier::Param {
        // Gated param types still report their tier.
        let ty = b.scalar_type_name(var.ty)?;
        let name = b.declare_name(decl.var, global);
        let source = match var.ty.base() {
            BaseKind::Sampler => "jsl_samplers",
            BaseKind::Buffer => "jsl_buffers",
            // Numeric params are read from jsl_constants in place.
            _ => return Ok(()),
        };
        if var.is_array() {
            return Ok(());
        }
        let slot = var
            .register
            .ok_or_else(|| JslError::unresolved(T::NAME, format!("register of '{}'", var.name)))?
            .index();
        b.write_line(&format!("{} {} = {}[{}];", ty, name, source, slot));
        return Ok(());
    }

    let init = match &decl.init {
        Some(init) => Some(b.with_effects_once(&[init], |b| {
            (0..lanes)
                .map(|c| b.expr_text(init, Lane::Component(c)))
                .collect::<JslResult<Vec<_>>>()
        })?),
        None => None,
    };
    let ty = b.scalar_type_name(var.ty)?;
    let qualifier = b.qualifier_name(var.qualifier)?;
    b.flush_preambles_at(global)?;
    // Macros outlive the function that defines them.
    let is_macro = var.qualifier == Qualifier::Const && T::CONST_STYLE == ConstStyle::Define;
    b.declare_name(decl.var, global || is_macro);
    let prefix = if qualifier.is_empty() {
        String::from(ty)
    } else {
        format!("{} {}", qualifier, ty)
    };

    for c in 0..lanes {
        let lane_name = b.lane_name(decl.var, c);
        let init = init.as_ref().map(|texts| texts[c as usize].as_str());
        let line = match (var.qualifier, T::CONST_STYLE, init, var.array_len) {
            (Qualifier::Const, ConstStyle::Define, Some(value), _) => {
                format!("{} {} ({})", qualifier, lane_name, value)
            }
            (Qualifier::Const, ConstStyle::Final, Some(value), _) => {
                format!("{} {} = ({});", prefix, lane_name, value)
            }
            (_, _, _, Some(len)) => format!("{};", T::array_decl(&prefix, &lane_name, len)),
            (_, _, Some(value), None) => format!("{} {} = {};", prefix, lane_name, value),
            (_, _, None, None) if T::ZERO_INIT => {
                format!("{} {} = {};", prefix, lane_name, zero(var.ty, T::FLOAT_SUFFIX))
            }
            (_, _, None, None) => format!("{} {};", prefix, lane_name),
        };
        b.write_line(&line);
    }
    Ok(())
}

/// Reference to `var` at `lane`.
pub fn variable_ref<T: ScalarTarget>(
    b: &SlBackend<'_, T>,
    id: VarId,
    index: Option<&str>,
    lane: Lane,
) -> JslResult<String> {
    let var = b.symbols().variable(id);
    let c = lane.index();

    if let Some(core) = var.core {
        return Ok(match core {
            CoreVar::Color => format!("color[{}]", c),
            _ => b.lane_name(id, c),
        });
    }

    if var.qualifier == Qualifier::Param {
        let slot = var
            .register
            .ok_or_else(|| JslError::unresolved(T::NAME, format!("register of '{}'", var.name)))?
            .index();
        return Ok(match (var.ty.base(), index) {
            (BaseKind::Sampler, Some(i)) => format!("jsl_samplers[{} + ({})]", slot, i),
            (BaseKind::Buffer, Some(i)) => format!("jsl_buffers[{} + ({})]", slot, i),
            (BaseKind::Sampler | BaseKind::Buffer, None) => String::from(b.var_name(id)),
            (base, index) => {
                let at = match index {
                    None => format!("jsl_constants[{}]", 4 * slot + c as u32),
                    Some(i) => format!("jsl_constants[4 * ({} + ({})) + {}]", slot, i, c),
                };
                match base {
                    BaseKind::Int => format!("((int) {})", at),
                    BaseKind::Bool => format!("({} != 0.0{})", at, T::FLOAT_SUFFIX),
                    _ => at,
                }
            }
        });
    }

    let name = b.lane_name(id, c);
    Ok(match index {
        Some(i) => format!("{}[{}]", name, i),
        None => name,
    })
}
