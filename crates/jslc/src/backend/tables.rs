//! Per-backend name tables, gated by shader model.
//!
//! A backend fills a [`TableBuilder`] tier by tier, lowest first. Type and
//! qualifier entries of tiers the active model does not support are left
//! out (and remembered, so using them reports the missing tier). Function
//! entries are always present and carry their minimum tier; that is checked
//! where the call is emitted.

use alloc::collections::BTreeMap;

use super::template::FuncTemplate;
use crate::{
    builtins::Builtin,
    debug_emit,
    error::{JslError, JslResult},
    shader_model::ShaderModel,
    symbols::Qualifier,
    types::Type,
};

/// How a backend implements a builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuncImpl {
    /// Direct call to a target function
    Name(&'static str),
    /// Inline expansion
    Template(FuncTemplate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuncEntry {
    pub imp: FuncImpl,
    pub min_tier: ShaderModel,
}

/// Immutable lookup tables of one backend instance.
#[derive(Debug, Clone)]
pub struct BackendTables {
    target: &'static str,
    model: ShaderModel,
    types: BTreeMap<Type, &'static str>,
    qualifiers: BTreeMap<Qualifier, &'static str>,
    functions: BTreeMap<Builtin, FuncEntry>,
    /// Types left out because their tier is above `model`
    gated_types: BTreeMap<Type, ShaderModel>,
}

impl BackendTables {
    pub fn model(&self) -> ShaderModel {
        self.model
    }

    /// Target spelling of `ty`.
    pub fn type_name(&self, ty: Type) -> JslResult<&'static str> {
        if let Some(name) = self.types.get(&ty) {
            return Ok(name);
        }
        match self.gated_types.get(&ty) {
            Some(tier) => Err(JslError::unsupported(
                self.target,
                alloc::format!(
                    "type '{}' requires shader model {} (have {})",
                    ty,
                    tier,
                    self.model
                ),
            )),
            None => Err(JslError::unresolved(self.target, alloc::format!("type {}", ty))),
        }
    }

    pub fn qualifier_name(&self, q: Qualifier) -> JslResult<&'static str> {
        self.qualifiers
            .get(&q)
            .copied()
            .ok_or_else(|| JslError::unresolved(self.target, alloc::format!("qualifier {}", q)))
    }

    /// Entry for `builtin`, if the table has one.
    pub fn function(&self, builtin: Builtin) -> Option<&FuncEntry> {
        self.functions.get(&builtin)
    }

    /// Target functions the table calls by name.
    pub fn function_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.values().filter_map(|e| match e.imp {
            FuncImpl::Name(name) => Some(name),
            FuncImpl::Template(_) => None,
        })
    }

    /// Resolve a call to `builtin`, enforcing its minimum tier.
    ///
    /// `None` means the table has no entry and the source name is used as is.
    pub fn resolve_call(&self, builtin: Builtin) -> JslResult<Option<&FuncEntry>> {
        let entry = self.functions.get(&builtin);
        let required = entry
            .map(|e| e.min_tier)
            .unwrap_or(ShaderModel::Sm3)
            .max(builtin.min_tier());
        if !self.model.supports(required) {
            return Err(JslError::unsupported_builtin(
                builtin.name(),
                required,
                self.model,
            ));
        }
        Ok(entry)
    }
}

/// Fills [`BackendTables`] tier by tier.
pub struct TableBuilder {
    tier: ShaderModel,
    tables: BackendTables,
}

impl TableBuilder {
    pub fn new(target: &'static str, model: ShaderModel) -> Self {
        Self {
            tier: ShaderModel::Sm3,
            tables: BackendTables {
                target,
                model,
                types: BTreeMap::new(),
                qualifiers: BTreeMap::new(),
                functions: BTreeMap::new(),
                gated_types: BTreeMap::new(),
            },
        }
    }

    /// Following entries belong to `tier`.
    pub fn at(&mut self, tier: ShaderModel) -> &mut Self {
        debug_assert!(tier >= self.tier, "tiers must be filled lowest first");
        self.tier = tier;
        self
    }

    fn enabled(&self) -> bool {
        self.tables.model.supports(self.tier)
    }

    pub fn ty(&mut self, ty: Type, name: &'static str) -> &mut Self {
        if self.enabled() {
            self.tables.types.insert(ty, name);
        } else {
            debug_emit!("{}: type {} gated at {}", self.tables.target, ty, self.tier);
            self.tables.gated_types.insert(ty, self.tier);
        }
        self
    }

    pub fn qualifier(&mut self, q: Qualifier, name: &'static str) -> &mut Self {
        if self.enabled() {
            self.tables.qualifiers.insert(q, name);
        }
        self
    }

    pub fn func(&mut self, builtin: Builtin, imp: FuncImpl) -> &mut Self {
        self.tables.functions.insert(
            builtin,
            FuncEntry {
                imp,
                min_tier: self.tier,
            },
        );
        self
    }

    pub fn name(&mut self, builtin: Builtin, name: &'static str) -> &mut Self {
        self.func(builtin, FuncImpl::Name(name))
    }

    pub fn template(&mut self, builtin: Builtin, template: FuncTemplate) -> &mut Self {
        self.func(builtin, FuncImpl::Template(template))
    }

    pub fn build(&mut self) -> BackendTables {
        debug_emit!(
            "{}: {} types, {} functions at {}",
            self.tables.target,
            self.tables.types.len(),
            self.tables.functions.len(),
            self.tables.model
        );
        self.tables.clone()
    }
}
