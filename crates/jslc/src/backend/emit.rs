//! The shared emitter: one `visit_*` per node kind.

use alloc::{
    collections::BTreeMap,
    format,
    string::{String, ToString},
    vec::Vec,
};

use super::{
    prec,
    tables::FuncImpl,
    template::{self, FuncTemplate, Piece},
    Lane, LaneModel, SlBackend, Target, LANE_SUFFIX,
};
use crate::{
    ast::{
        visitor::Visitor, ArrayAccessExpr, BinaryExpr, BinaryOp, CallExpr, Callee, CompoundStmt,
        DeclStmt, DoWhileStmt, Expr, ExprStmt, FieldSelectExpr, ForStmt, FuncDef, GlueBlock,
        Literal, LiteralExpr, ParenExpr, ReturnStmt, SelectStmt, Stmt, UnaryExpr, VariableExpr,
        VectorCtorExpr, WhileStmt,
    },
    builtins::Builtin,
    debug_emit,
    error::{JslError, JslResult},
    types::Type,
    util::find_variable_references,
};

/// Emitted precedence and spelling of a binary operator.
fn binary_syntax(op: BinaryOp) -> (u8, &'static str) {
    match op {
        BinaryOp::Or => (prec::OR, "||"),
        // Logical xor of bools is inequality.
        BinaryOp::Xor => (prec::EQUALITY, "!="),
        BinaryOp::And => (prec::AND, "&&"),
        BinaryOp::Eq | BinaryOp::Ne => (prec::EQUALITY, op.symbol()),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
            (prec::RELATIONAL, op.symbol())
        }
        BinaryOp::Add | BinaryOp::Sub => (prec::ADDITIVE, op.symbol()),
        BinaryOp::Mul | BinaryOp::Div => (prec::MULTIPLICATIVE, op.symbol()),
        _ => (prec::ASSIGN, op.symbol()),
    }
}

/// Argument supplying lane `lane` of a scalarized constructor, and the lane
/// to read from it.
fn ctor_source(e: &VectorCtorExpr, lane: u8) -> Option<(&Expr, u8)> {
    match e.args.as_slice() {
        [single] => Some((single, lane)),
        args => args.get(lane as usize).map(|a| (a, 0)),
    }
}

fn strip_parens(mut e: &Expr) -> &Expr {
    while let Expr::Paren(p) = e {
        e = &p.inner;
    }
    e
}

/// Whether the placeholder at `i` is a whole call argument (`f($1, $2)`),
/// which never needs parentheses.
fn delimited(pieces: &[Piece<'_>], i: usize) -> bool {
    let before = match i.checked_sub(1).and_then(|j| pieces.get(j)) {
        Some(Piece::Text(t)) => t.ends_with('(') || t.ends_with(", "),
        _ => false,
    };
    let after = match pieces.get(i + 1) {
        Some(Piece::Text(t)) => t.starts_with(')') || t.starts_with(','),
        _ => false,
    };
    before && after
}

impl<T: Target> SlBackend<'_, T> {
    /// Binding strength of the text `e` emits at `lane`.
    pub(super) fn precedence(&self, e: &Expr, lane: Lane) -> u8 {
        if self.hoisted.contains_key(&(e as *const Expr)) {
            return prec::PRIMARY;
        }
        match e {
            Expr::Literal(_)
            | Expr::Variable(_)
            | Expr::Paren(_)
            | Expr::ArrayAccess(_)
            | Expr::Call(_) => prec::PRIMARY,
            Expr::Unary(u) if u.op.is_postfix() => prec::POSTFIX,
            Expr::Unary(_) => prec::UNARY,
            Expr::Binary(b) => binary_syntax(b.op).0,
            // Scalarized field selects and constructors emit one lane of
            // their operand with no syntax of their own.
            Expr::FieldSelect(f) => match lane {
                Lane::Whole => prec::POSTFIX,
                Lane::Component(c) => {
                    let base_lane = Lane::Component(f.component(c)).for_type(f.base.ty());
                    self.precedence(&f.base, base_lane)
                }
            },
            Expr::VectorCtor(v) => match lane {
                Lane::Whole => prec::PRIMARY,
                Lane::Component(c) => match ctor_source(v, c) {
                    Some((arg, l)) => self.precedence(arg, Lane::Component(l).for_type(arg.ty())),
                    None => prec::PRIMARY,
                },
            },
        }
    }

    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn call_text(&mut self, name: &str, args: &[Expr], lane: Lane) -> JslResult<String> {
        let args = args
            .iter()
            .map(|a| self.expr_text(a, lane))
            .collect::<JslResult<Vec<_>>>()?;
        Ok(format!("{}({})", name, args.join(", ")))
    }

    /// Arguments of a user function call. Scalarized targets pass every
    /// lane of a vector argument.
    fn user_call_args(&mut self, args: &[Expr]) -> JslResult<Vec<String>> {
        let mut out = Vec::with_capacity(args.len());
        for arg in args {
            match T::LANES {
                LaneModel::Vector => out.push(self.expr_text(arg, Lane::Whole)?),
                LaneModel::Scalarized => {
                    for c in 0..Self::lanes(arg.ty()) {
                        out.push(self.expr_text(arg, Lane::Component(c))?);
                    }
                }
            }
        }
        Ok(out)
    }

    /// Expand one template text at `lane`.
    fn expand(
        &mut self,
        text: &str,
        call: &CallExpr,
        lane: u8,
        reduction: Option<&str>,
    ) -> JslResult<String> {
        let pieces = template::pieces(T::NAME, text)?;
        let mut out = String::new();
        for (i, piece) in pieces.iter().enumerate() {
            match *piece {
                Piece::Text(t) => out.push_str(t),
                Piece::Arg { index, lane: pinned } => {
                    let arg = call.args.get(index).ok_or_else(|| {
                        JslError::unresolved(
                            T::NAME,
                            format!("template argument ${} in '{}'", index + 1, text),
                        )
                    })?;
                    let arg_lane = match T::LANES {
                        LaneModel::Vector => Lane::Whole,
                        LaneModel::Scalarized => Lane::Component(pinned.unwrap_or(lane)),
                    };
                    let arg_text = if delimited(&pieces, i) {
                        self.expr_text(arg, arg_lane)?
                    } else {
                        self.operand(arg, arg_lane, prec::POSTFIX)?
                    };
                    out.push_str(&arg_text);
                    if let (LaneModel::Vector, Some(p)) = (T::LANES, pinned) {
                        out.push('.');
                        out.push_str(LANE_SUFFIX[p as usize]);
                    }
                }
                Piece::Lane => out.push_str(&lane.to_string()),
                Piece::Temp => out.push_str(&format!("jsl_t{}", call.site)),
                Piece::Reduction => match reduction {
                    Some(r) => out.push_str(r),
                    None => {
                        return Err(JslError::unresolved(
                            T::NAME,
                            format!("'$r' without a reduction in '{}'", text),
                        ))
                    }
                },
            }
        }
        Ok(out)
    }

    fn expand_template(&mut self, t: &FuncTemplate, call: &CallExpr) -> JslResult<String> {
        let lane = self.lane.index();
        if let Some(preamble) = t.preamble {
            if self.emitted_sites.insert(call.site) {
                let text = self.expand(preamble, call, 0, None)?;
                self.pending.push(text);
            }
        }
        let reduction = match t.reduce {
            Some(r) => {
                let n = call.args.first().map(|a| Self::lanes(a.ty())).unwrap_or(1);
                let terms = (0..n)
                    .map(|i| self.expand(r.term, call, i, None))
                    .collect::<JslResult<Vec<_>>>()?;
                Some(terms.join(r.join))
            }
            None => None,
        };
        self.expand(t.body(lane), call, lane, reduction.as_deref())
    }

    fn emit_builtin(&mut self, builtin: Builtin, call: &CallExpr) -> JslResult<String> {
        let lane = self.lane;
        let entry = self.tables().resolve_call(builtin)?;
        match entry.map(|e| e.imp) {
            None => {
                debug_emit!("site {}: {} passed through", call.site, builtin);
                self.call_text(builtin.name(), &call.args, lane)
            }
            Some(FuncImpl::Name(name)) => {
                debug_emit!("site {}: {} -> {}", call.site, builtin, name);
                self.call_text(name, &call.args, lane)
            }
            Some(FuncImpl::Template(t)) => {
                debug_emit!("site {}: {} expanded", call.site, builtin);
                self.expand_template(&t, call)
            }
        }
    }

    /// Write `body` one level deeper, unwrapping a block.
    fn emit_body(&mut self, body: &Stmt) -> JslResult<()> {
        self.indent += 1;
        let result = match body {
            Stmt::Compound(block) => block.stmts.iter().try_for_each(|s| s.accept(self)),
            other => other.accept(self),
        };
        self.indent -= 1;
        result
    }

    /// Text of an expression used as a statement or for-update, one entry
    /// per emitted statement. Scalarized targets keep only the writes.
    fn statement_texts(&mut self, e: &Expr) -> JslResult<Vec<String>> {
        let e = strip_parens(e);
        match T::LANES {
            LaneModel::Vector => {
                self.with_effects_once(&[e], |b| Ok(alloc::vec![b.expr_text(e, Lane::Whole)?]))
            }
            LaneModel::Scalarized => {
                let effects = e.outer_effects();
                self.with_effects_once(&effects, |b| {
                    let mut texts = Vec::new();
                    for effect in &effects {
                        for c in 0..Self::lanes(effect.ty()) {
                            texts.push(b.expr_text(effect, Lane::Component(c))?);
                        }
                    }
                    Ok(texts)
                })
            }
        }
    }

    /// Run `emit` until every effect under `roots` is evaluated exactly
    /// once per lane. Effects that are not get evaluated into temporaries
    /// ahead of the statement, innermost first, and `emit` runs again.
    pub(super) fn with_effects_once<R>(
        &mut self,
        roots: &[&Expr],
        mut emit: impl FnMut(&mut Self) -> JslResult<R>,
    ) -> JslResult<R> {
        loop {
            let pending = self.pending.len();
            let sites = self.emitted_sites.clone();
            self.effect_counts = Some(BTreeMap::new());
            let result = emit(self);
            let counts = self.effect_counts.take().unwrap_or_default();
            let value = result?;

            let mut repeated = None;
            for root in roots {
                repeated = self.misevaluated_effect(root, &counts)?;
                if repeated.is_some() {
                    break;
                }
            }
            let Some(effect) = repeated else {
                return Ok(value);
            };
            self.pending.truncate(pending);
            self.emitted_sites = sites;
            self.hoist(effect)?;
        }
    }

    /// First effect under `e`, innermost first, that the last emission
    /// did not evaluate exactly once per lane.
    fn misevaluated_effect<'e>(
        &self,
        e: &'e Expr,
        counts: &BTreeMap<(*const Expr, u8), u32>,
    ) -> JslResult<Option<&'e Expr>> {
        let key = e as *const Expr;
        if self.hoisted.contains_key(&key) {
            return Ok(None);
        }
        for operand in e.operands() {
            if let Some(found) = self.misevaluated_effect(operand, counts)? {
                return Ok(Some(found));
            }
        }
        if !e.is_effect() {
            return Ok(None);
        }
        if Self::aliased_assignment(e).is_some() {
            return Err(JslError::unsupported(
                T::NAME,
                "vector assignment reading its own target inside a larger expression",
            ));
        }
        let lanes = match T::LANES {
            LaneModel::Vector => 1,
            LaneModel::Scalarized => Self::lanes(e.ty()),
        };
        let once = (0..lanes).all(|c| counts.get(&(key, c)) == Some(&1));
        Ok((!once).then_some(e))
    }

    /// Evaluate `e` once into a temporary ahead of the current statement.
    fn hoist(&mut self, e: &Expr) -> JslResult<()> {
        let ty = e.ty();
        if ty == Type::Void {
            return Err(JslError::unsupported(T::NAME, "void call used as a value"));
        }
        let temp = self.fresh_temp();
        match T::LANES {
            LaneModel::Vector => {
                let text = self.expr_text(e, Lane::Whole)?;
                let line = format!("{} {} = {};", self.type_name(ty)?, temp, text);
                self.pending.push(line);
            }
            LaneModel::Scalarized => {
                let lane_ty = self.scalar_type_name(ty)?;
                for c in 0..Self::lanes(ty) {
                    let lane = Lane::Component(c);
                    let text = self.expr_text(e, lane)?;
                    let name = Self::temp_lane(&temp, ty, lane);
                    self.pending.push(format!("{} {} = {};", lane_ty, name, text));
                }
            }
        }
        debug_emit!("hoisted {} into {}", ty, temp);
        self.hoisted.insert(e as *const Expr, temp);
        Ok(())
    }

    /// A scalarized vector assignment whose right side reads the assigned
    /// variable: evaluate every lane into temporaries first.
    fn aliased_assignment(e: &Expr) -> Option<&BinaryExpr> {
        match (T::LANES, strip_parens(e)) {
            (LaneModel::Scalarized, Expr::Binary(b))
                if b.op.is_assignment() && b.ty.is_vector() =>
            {
                let root = b.lhs.root_variable()?;
                find_variable_references(&b.rhs).contains(&root).then_some(b)
            }
            _ => None,
        }
    }

    fn assign_through_temps(&mut self, b: &BinaryExpr) -> JslResult<()> {
        let temp = self.fresh_temp();
        let ty = self.scalar_type_name(b.rhs.ty())?;
        let rhs_lanes = Self::lanes(b.rhs.ty());
        let temp_at = |c: u8| {
            if rhs_lanes == 1 {
                temp.clone()
            } else {
                format!("{}_{}", temp, LANE_SUFFIX[c as usize])
            }
        };

        let (rhs, lhs) = self.with_effects_once(&[&*b.rhs, &*b.lhs], |s| {
            let rhs = (0..rhs_lanes)
                .map(|c| s.expr_text(&b.rhs, Lane::Component(c)))
                .collect::<JslResult<Vec<_>>>()?;
            let lhs = (0..Self::lanes(b.ty))
                .map(|c| s.expr_text(&b.lhs, Lane::Component(c)))
                .collect::<JslResult<Vec<_>>>()?;
            Ok((rhs, lhs))
        })?;
        self.flush_preambles();

        self.write_line("{");
        self.indent += 1;
        for (c, text) in rhs.iter().enumerate() {
            self.write_line(&format!("{} {} = {};", ty, temp_at(c as u8), text));
        }
        for (c, text) in lhs.iter().enumerate() {
            let source = temp_at((c as u8).min(rhs_lanes - 1));
            self.write_line(&format!("{} {} {};", text, b.op.symbol(), source));
        }
        self.indent -= 1;
        self.write_line("}");
        Ok(())
    }

    /// Emit a user function that is not the entry point.
    fn user_function(&mut self, def: &FuncDef) -> JslResult<()> {
        let symbols = self.symbols();
        let func = symbols.function(def.func);
        let ret = match T::LANES {
            LaneModel::Vector => self.type_name(func.return_type)?,
            LaneModel::Scalarized => {
                if func.return_type.is_vector() {
                    return Err(JslError::unsupported(
                        T::NAME,
                        format!(
                            "function '{}' returns {}; vector return values are not supported",
                            func.name, func.return_type
                        ),
                    ));
                }
                self.scalar_type_name(func.return_type)?
            }
        };

        let mut params = Vec::new();
        for &var in &def.params {
            let ty = symbols.variable(var).ty;
            let name = self.declare_name(var, false);
            match T::LANES {
                LaneModel::Vector => params.push(format!("{} {}", self.type_name(ty)?, name)),
                LaneModel::Scalarized => {
                    let lane_ty = self.scalar_type_name(ty)?;
                    for c in 0..Self::lanes(ty) {
                        params.push(format!("{} {}", lane_ty, self.lane_name(var, c)));
                    }
                }
            }
        }
        let name = self.func_name(def.func).to_string();
        self.write_line(&format!("{} {}({}) {{", ret, name, params.join(", ")));
        self.function_body(def)
    }
}

impl<T: Target> Visitor for SlBackend<'_, T> {
    type Error = JslError;

    fn visit_literal(&mut self, e: &LiteralExpr) -> JslResult<()> {
        let text = match e.value {
            Literal::Int(v) => format!("{}", v),
            Literal::Float(v) => format!("{:?}{}", v, T::FLOAT_SUFFIX),
            Literal::Bool(v) => format!("{}", v),
        };
        self.push(&text);
        Ok(())
    }

    fn visit_variable(&mut self, e: &VariableExpr) -> JslResult<()> {
        let var = self.symbols().variable(e.var);
        if var.core.is_some() && !self.in_entry_point() {
            return Err(JslError::unsupported(
                T::NAME,
                format!("core variable '{}' used outside the entry point", var.name),
            ));
        }
        let text = T::variable_ref(self, e.var, None, self.lane)?;
        self.push(&text);
        Ok(())
    }

    fn visit_unary(&mut self, e: &UnaryExpr) -> JslResult<()> {
        let lane = self.lane;
        let text = if e.op.is_postfix() {
            let operand = self.operand(&e.operand, lane, prec::POSTFIX)?;
            format!("{}{}", operand, e.op.symbol())
        } else {
            let mut operand = self.operand(&e.operand, lane, prec::UNARY)?;
            // `-(-x)` must not print as `--x`.
            if operand.starts_with(|c: char| c == '+' || c == '-') {
                operand = format!("({})", operand);
            }
            format!("{}{}", e.op.symbol(), operand)
        };
        self.push(&text);
        Ok(())
    }

    fn visit_binary(&mut self, e: &BinaryExpr) -> JslResult<()> {
        let lane = self.lane;
        let (p, symbol) = binary_syntax(e.op);
        let (lhs, rhs) = if e.op.is_assignment() {
            (
                self.expr_text(&e.lhs, lane)?,
                self.operand(&e.rhs, lane, prec::ASSIGN)?,
            )
        } else {
            (
                self.operand(&e.lhs, lane, p)?,
                self.operand(&e.rhs, lane, p + 1)?,
            )
        };
        self.push(&format!("{} {} {}", lhs, symbol, rhs));
        Ok(())
    }

    fn visit_vector_ctor(&mut self, e: &VectorCtorExpr) -> JslResult<()> {
        let text = match self.lane {
            Lane::Whole => {
                let name = self.type_name(e.ty)?;
                let args = e
                    .args
                    .iter()
                    .map(|a| self.expr_text(a, Lane::Whole))
                    .collect::<JslResult<Vec<_>>>()?;
                match e.args.as_slice() {
                    [single] if single.ty().is_scalar() && e.ty.is_vector() => {
                        format!("(({})({}))", name, args.join(""))
                    }
                    _ => format!("{}({})", name, args.join(", ")),
                }
            }
            Lane::Component(c) => {
                let (arg, l) = ctor_source(e, c).ok_or_else(|| {
                    JslError::unresolved(T::NAME, format!("lane {} of {} constructor", c, e.ty))
                })?;
                self.expr_text(arg, Lane::Component(l))?
            }
        };
        self.push(&text);
        Ok(())
    }

    fn visit_paren(&mut self, e: &ParenExpr) -> JslResult<()> {
        let inner = self.expr_text(&e.inner, self.lane)?;
        self.push(&format!("({})", inner));
        Ok(())
    }

    fn visit_field_select(&mut self, e: &FieldSelectExpr) -> JslResult<()> {
        let text = match self.lane {
            Lane::Whole => {
                let base = if matches!(*e.base, Expr::Literal(_)) {
                    format!("({})", self.expr_text(&e.base, Lane::Whole)?)
                } else {
                    self.operand(&e.base, Lane::Whole, prec::POSTFIX)?
                };
                format!("{}.{}", base, e.fields)
            }
            Lane::Component(c) => self.expr_text(&e.base, Lane::Component(e.component(c)))?,
        };
        self.push(&text);
        Ok(())
    }

    fn visit_array_access(&mut self, e: &ArrayAccessExpr) -> JslResult<()> {
        let index = self.expr_text(&e.index, self.scalar_lane())?;
        let text = T::variable_ref(self, e.array, Some(&index), self.lane)?;
        self.push(&text);
        Ok(())
    }

    fn visit_call(&mut self, e: &CallExpr) -> JslResult<()> {
        let text = match e.callee {
            Callee::User(id) => {
                let args = self.user_call_args(&e.args)?;
                let name = self.func_name(id);
                format!("{}({})", name, args.join(", "))
            }
            Callee::Builtin(builtin) => self.emit_builtin(builtin, e)?,
        };
        self.push(&text);
        Ok(())
    }

    fn visit_expr_stmt(&mut self, s: &ExprStmt) -> JslResult<()> {
        self.begin_statement();
        if let Some(b) = Self::aliased_assignment(&s.expr) {
            return self.assign_through_temps(b);
        }
        let texts = self.statement_texts(&s.expr)?;
        self.flush_preambles();
        for text in texts {
            self.write_line(&format!("{};", text));
        }
        Ok(())
    }

    fn visit_decl_stmt(&mut self, s: &DeclStmt) -> JslResult<()> {
        for decl in &s.vars {
            self.begin_statement();
            T::var_decl(self, decl, s.global)?;
        }
        Ok(())
    }

    fn visit_compound(&mut self, s: &CompoundStmt) -> JslResult<()> {
        self.write_line("{");
        self.indent += 1;
        let result = s.stmts.iter().try_for_each(|stmt| stmt.accept(self));
        self.indent -= 1;
        result?;
        self.write_line("}");
        Ok(())
    }

    fn visit_select(&mut self, s: &SelectStmt) -> JslResult<()> {
        self.begin_statement();
        let cond = self.once_text(&s.cond, self.scalar_lane())?;
        self.flush_preambles();
        self.write_line(&format!("if ({}) {{", cond));
        self.emit_body(&s.then_branch)?;
        if let Some(else_branch) = &s.else_branch {
            self.write_line("} else {");
            self.emit_body(else_branch)?;
        }
        self.write_line("}");
        Ok(())
    }

    fn visit_while(&mut self, s: &WhileStmt) -> JslResult<()> {
        self.begin_statement();
        let cond = self.once_text(&s.cond, self.scalar_lane())?;
        self.check_loop_header("while")?;
        self.write_line(&format!("while ({}) {{", cond));
        self.emit_body(&s.body)?;
        self.write_line("}");
        Ok(())
    }

    fn visit_do_while(&mut self, s: &DoWhileStmt) -> JslResult<()> {
        self.write_line("do {");
        self.emit_body(&s.body)?;
        self.begin_statement();
        let cond = self.once_text(&s.cond, self.scalar_lane())?;
        self.check_loop_header("do-while")?;
        self.write_line(&format!("}} while ({});", cond));
        Ok(())
    }

    fn visit_for(&mut self, s: &ForStmt) -> JslResult<()> {
        let init = match &s.init {
            Some(init) => self.capture(|b| init.accept(b))?,
            None => String::new(),
        };
        let init_lines: Vec<&str> = init.lines().collect();

        self.begin_statement();
        let cond = match &s.cond {
            Some(c) => self.once_text(c, self.scalar_lane())?,
            None => String::new(),
        };
        let update = match &s.update {
            Some(u) if Self::aliased_assignment(u).is_some() => {
                return Err(JslError::unsupported(
                    T::NAME,
                    "vector assignment reading its own target in a for update",
                ))
            }
            Some(u) => self.statement_texts(u)?.join(", "),
            None => String::new(),
        };
        self.check_loop_header("for")?;

        // A single-line init goes into the header; anything else runs in
        // an enclosing block.
        let inline = match init_lines.as_slice() {
            [] => Some(""),
            [line] if !line.starts_with('#') => Some(line.trim_end_matches(';')),
            _ => None,
        };
        match inline {
            Some(init) => {
                self.write_line(&format!("for ({}; {}; {}) {{", init, cond, update));
                self.emit_body(&s.body)?;
                self.write_line("}");
            }
            None => {
                self.write_line("{");
                self.indent += 1;
                for line in &init_lines {
                    self.write_line(line);
                }
                self.write_line(&format!("for (; {}; {}) {{", cond, update));
                self.emit_body(&s.body)?;
                self.write_line("}");
                self.indent -= 1;
                self.write_line("}");
            }
        }
        Ok(())
    }

    fn visit_return(&mut self, s: &ReturnStmt) -> JslResult<()> {
        self.begin_statement();
        match &s.value {
            Some(value) => {
                let text = self.once_text(value, self.scalar_lane())?;
                self.flush_preambles();
                self.write_line(&format!("return {};", text));
            }
            None => self.write_line("return;"),
        }
        Ok(())
    }

    fn visit_break(&mut self) -> JslResult<()> {
        self.write_line("break;");
        Ok(())
    }

    fn visit_continue(&mut self) -> JslResult<()> {
        self.write_line("continue;");
        Ok(())
    }

    fn visit_discard(&mut self) -> JslResult<()> {
        T::discard(self)
    }

    fn visit_func_def(&mut self, f: &FuncDef) -> JslResult<()> {
        let entry_point = self.symbols().function(f.func).is_entry_point();
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        self.local_names.clear();
        self.in_entry_point = entry_point;
        let result = if entry_point {
            T::entry_point(self, f)
        } else {
            self.user_function(f)
        };
        self.in_entry_point = false;
        result
    }

    fn visit_glue(&mut self, g: &GlueBlock) -> JslResult<()> {
        if T::LANES == LaneModel::Scalarized {
            self.push(&g.text);
            if !g.text.ends_with('\n') {
                self.out.push('\n');
            }
        }
        Ok(())
    }
}
