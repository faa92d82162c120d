//! Symbol table for JSL name resolution.
//!
//! Variables and functions live in arenas owned by the table and are
//! referenced by [`VarId`] / [`FuncId`]. Frames map names to symbols; lookup
//! walks frames innermost first. The root frame holds the core variables.

use alloc::{
    collections::BTreeMap,
    string::{String, ToString},
    vec::Vec,
};
use core::{
    fmt,
    ops::{Deref, DerefMut},
};

use crate::{
    debug_emit,
    error::{JslError, JslResult},
    types::{BaseKind, Type},
};

/// Handle to a variable in the symbol table arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(u32);

/// Handle to a function in the symbol table arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FuncId(u32);

/// Storage qualifier of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Qualifier {
    /// Ordinary variable
    Local,
    /// Compile-time constant
    Const,
    /// Runtime parameter bound to a register
    Param,
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Qualifier::Local => "local",
            Qualifier::Const => "const",
            Qualifier::Param => "param",
        })
    }
}

/// Register slot assigned to a `param` variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Register {
    /// General constant register (one 4-component slot per element)
    Constant(u32),
    /// Texture sampler register
    Sampler(u32),
}

impl Register {
    pub fn index(self) -> u32 {
        match self {
            Register::Constant(i) | Register::Sampler(i) => i,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::Constant(i) => write!(f, "c{}", i),
            Register::Sampler(i) => write!(f, "s{}", i),
        }
    }
}

/// Predeclared hardware input/output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CoreVar {
    Pos0,
    Pos1,
    PixCoord,
    VertexColor,
    /// The output color; writable only inside the entry point
    Color,
}

impl CoreVar {
    /// Core variables in entry point parameter order.
    pub const ALL: [CoreVar; 5] = [
        CoreVar::Pos0,
        CoreVar::Pos1,
        CoreVar::PixCoord,
        CoreVar::VertexColor,
        CoreVar::Color,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CoreVar::Pos0 => "pos0",
            CoreVar::Pos1 => "pos1",
            CoreVar::PixCoord => "pixcoord",
            CoreVar::VertexColor => "jsl_vertexColor",
            CoreVar::Color => "color",
        }
    }

    pub fn ty(self) -> Type {
        match self {
            CoreVar::Pos0 | CoreVar::Pos1 | CoreVar::PixCoord => Type::Float2,
            CoreVar::VertexColor | CoreVar::Color => Type::Float4,
        }
    }

    pub fn is_output(self) -> bool {
        self == CoreVar::Color
    }
}

/// Variable information.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    pub qualifier: Qualifier,
    pub array_len: Option<u32>,
    pub register: Option<Register>,
    /// Set for predeclared variables
    pub core: Option<CoreVar>,
}

impl Variable {
    pub fn is_array(&self) -> bool {
        self.array_len.is_some()
    }

    pub fn is_param(&self) -> bool {
        self.qualifier == Qualifier::Param
    }

    pub fn is_const(&self) -> bool {
        self.qualifier == Qualifier::Const
    }
}

/// Function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
}

/// Function signature information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Parameter>,
}

impl Function {
    /// The shader entry point is `main`.
    pub fn is_entry_point(&self) -> bool {
        self.name == ENTRY_POINT
    }
}

/// Name of the shader entry point.
pub const ENTRY_POINT: &str = "main";

/// A name bound in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Variable(VarId),
    Function(FuncId),
}

/// Runtime binding of one `param` variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamBinding {
    pub name: String,
    pub ty: Type,
    pub register: Register,
    pub array_len: Option<u32>,
}

#[derive(Debug, Clone, Default)]
struct Frame {
    symbols: BTreeMap<String, Symbol>,
}

/// Symbol table for tracking functions and variables.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    variables: Vec<Variable>,
    functions: Vec<Function>,
    frames: Vec<Frame>,
    next_constant: u32,
    next_sampler: u32,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Create a table whose root frame holds the core variables.
    pub fn new() -> Self {
        let mut table = Self {
            variables: Vec::new(),
            functions: Vec::new(),
            frames: alloc::vec![Frame::default()],
            next_constant: 0,
            next_sampler: 0,
        };
        for core in CoreVar::ALL {
            let id = table.push_variable(Variable {
                name: core.name().to_string(),
                ty: core.ty(),
                qualifier: Qualifier::Local,
                array_len: None,
                register: None,
                core: Some(core),
            });
            table.frames[0]
                .symbols
                .insert(core.name().to_string(), Symbol::Variable(id));
        }
        table
    }

    fn push_variable(&mut self, var: Variable) -> VarId {
        let id = VarId(self.variables.len() as u32);
        self.variables.push(var);
        id
    }

    /// Number of open frames, including the root frame.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Whether declarations currently land in the root frame.
    pub fn at_global_scope(&self) -> bool {
        self.frames.len() == 1
    }

    pub(crate) fn push_frame(&mut self) {
        self.frames.push(Frame::default());
    }

    pub(crate) fn pop_frame(&mut self) {
        // The root frame is never popped.
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Enter a new frame; it is popped when the guard drops.
    pub fn enter_frame(&mut self) -> FrameGuard<'_> {
        FrameGuard::new(self)
    }

    /// Run `f` in a fresh frame, popping it on every exit path.
    pub fn in_frame<R>(&mut self, f: impl FnOnce(&mut SymbolTable) -> R) -> R {
        let mut guard = self.enter_frame();
        f(&mut *guard)
    }

    fn current_frame(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn check_not_declared(&self, name: &str) -> JslResult<()> {
        match self.frames.last() {
            Some(frame) if frame.symbols.contains_key(name) => Err(JslError::duplicate(name)),
            _ => Ok(()),
        }
    }

    /// Declare a variable in the current frame.
    ///
    /// `param` variables are assigned their register here: samplers take the
    /// next sampler slot, everything else the next constant slot(s).
    pub fn declare_variable(
        &mut self,
        name: &str,
        ty: Type,
        qualifier: Qualifier,
        array_len: Option<u32>,
    ) -> JslResult<VarId> {
        self.check_not_declared(name)?;
        let register = if qualifier == Qualifier::Param {
            Some(self.allocate_register(ty, array_len))
        } else {
            None
        };
        debug_emit!("declare {} {}: register {:?}", qualifier, name, register);
        let id = self.push_variable(Variable {
            name: name.to_string(),
            ty,
            qualifier,
            array_len,
            register,
            core: None,
        });
        self.current_frame()
            .symbols
            .insert(name.to_string(), Symbol::Variable(id));
        Ok(id)
    }

    fn allocate_register(&mut self, ty: Type, array_len: Option<u32>) -> Register {
        let count = array_len.unwrap_or(1);
        if ty.base() == BaseKind::Sampler {
            let slot = self.next_sampler;
            self.next_sampler += count;
            Register::Sampler(slot)
        } else {
            let slot = self.next_constant;
            self.next_constant += count;
            Register::Constant(slot)
        }
    }

    /// Declare a function in the current frame.
    pub fn declare_function(
        &mut self,
        name: &str,
        return_type: Type,
        params: Vec<Parameter>,
    ) -> JslResult<FuncId> {
        self.check_not_declared(name)?;
        let id = FuncId(self.functions.len() as u32);
        self.functions.push(Function {
            name: name.to_string(),
            return_type,
            params,
        });
        self.current_frame()
            .symbols
            .insert(name.to_string(), Symbol::Function(id));
        Ok(id)
    }

    /// Find the innermost binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.symbols.get(name).copied())
    }

    /// Look up a variable by name.
    pub fn lookup_variable(&self, name: &str) -> JslResult<VarId> {
        match self.lookup(name) {
            Some(Symbol::Variable(id)) => Ok(id),
            Some(Symbol::Function(_)) => {
                Err(JslError::mismatch("variable reference", "variable", "function"))
            }
            None => Err(JslError::undefined(name)),
        }
    }

    /// Look up a function by name.
    pub fn lookup_function(&self, name: &str) -> JslResult<FuncId> {
        match self.lookup(name) {
            Some(Symbol::Function(id)) => Ok(id),
            _ => Err(JslError::undefined(name)),
        }
    }

    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.0 as usize]
    }

    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.0 as usize]
    }

    /// All functions in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = (FuncId, &Function)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(i, f)| (FuncId(i as u32), f))
    }

    /// Fail unless `id` may be assigned. Const and param variables are never
    /// writable; the output core variable only when `in_entry_point` is set.
    pub fn check_assignable(&self, id: VarId, in_entry_point: bool) -> JslResult<()> {
        let var = self.variable(id);
        let writable = match var.core {
            Some(core) => core.is_output() && in_entry_point,
            None => !var.is_const() && !var.is_param(),
        };
        if writable {
            Ok(())
        } else {
            Err(JslError::read_only(var.name.clone()))
        }
    }

    /// Register slots of every `param` variable, in declaration order.
    pub fn param_bindings(&self) -> Vec<ParamBinding> {
        self.variables
            .iter()
            .filter_map(|v| {
                v.register.map(|register| ParamBinding {
                    name: v.name.clone(),
                    ty: v.ty,
                    register,
                    array_len: v.array_len,
                })
            })
            .collect()
    }
}

/// RAII guard for frame entry/exit.
///
/// Wraps anything that owns a [`SymbolTable`], so a builder can keep using
/// itself while the frame is open.
pub struct FrameGuard<'a, T: AsMut<SymbolTable> = SymbolTable> {
    inner: &'a mut T,
}

impl<'a, T: AsMut<SymbolTable>> FrameGuard<'a, T> {
    /// Create a new frame guard, pushing a new frame.
    pub fn new(inner: &'a mut T) -> Self {
        inner.as_mut().push_frame();
        Self { inner }
    }
}

impl<T: AsMut<SymbolTable>> Deref for FrameGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &*self.inner
    }
}

impl<T: AsMut<SymbolTable>> DerefMut for FrameGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut *self.inner
    }
}

impl<T: AsMut<SymbolTable>> Drop for FrameGuard<'_, T> {
    fn drop(&mut self) {
        self.inner.as_mut().pop_frame();
    }
}

impl AsMut<SymbolTable> for SymbolTable {
    fn as_mut(&mut self) -> &mut SymbolTable {
        self
    }
}
