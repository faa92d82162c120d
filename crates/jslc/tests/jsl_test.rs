//! JslTest helper for integration tests.
//!
//! Compiles JSL source for one target and checks the emitted text. JSW output
//! can also be executed: [`JslTest::run`] parses the emitted Java with a
//! small evaluator and returns the four color lanes.

#![allow(dead_code)]

use std::collections::HashMap;

use jslc::{compile, CompileOptions, CompiledShader, JslError, ShaderModel, TargetKind};

/// Test helper for one compiled unit.
pub struct JslTest {
    target: TargetKind,
    shader: CompiledShader,
}

impl JslTest {
    /// Compile `source` for `target` at the lowest shader model.
    pub fn new(source: &str, target: TargetKind) -> Result<Self, JslError> {
        Self::with_model(source, target, ShaderModel::Sm3)
    }

    pub fn with_model(
        source: &str,
        target: TargetKind,
        model: ShaderModel,
    ) -> Result<Self, JslError> {
        let options = CompileOptions::new(target).with_shader_model(model);
        let shader = compile(source, &options)?;
        Ok(Self { target, shader })
    }

    pub fn code(&self) -> &str {
        &self.shader.code
    }

    pub fn shader(&self) -> &CompiledShader {
        &self.shader
    }

    /// Print the emitted code (useful for generating expected output).
    pub fn print_code(&self) {
        println!("{}", self.shader.code);
    }

    /// Assert that the whole output matches `expected`, ignoring indentation
    /// and blank lines.
    pub fn assert_code(&self, expected: &str) {
        let actual = Self::normalize(&self.shader.code);
        let expected = Self::normalize(expected);
        if actual != expected {
            panic!(
                "{} output mismatch:\n\nExpected:\n{}\n\nActual:\n{}\n",
                self.target,
                expected.join("\n"),
                actual.join("\n")
            );
        }
    }

    /// Assert that the lines of `expected` appear consecutively in the output.
    pub fn assert_contains(&self, expected: &str) {
        let actual = Self::normalize(&self.shader.code);
        let expected = Self::normalize(expected);
        let found = expected.is_empty()
            || actual
                .windows(expected.len())
                .any(|window| window == expected.as_slice());
        if !found {
            panic!(
                "{} output does not contain:\n{}\n\nActual:\n{}\n",
                self.target,
                expected.join("\n"),
                actual.join("\n")
            );
        }
    }

    pub fn assert_not_contains(&self, text: &str) {
        assert!(
            !self.shader.code.contains(text),
            "{} output unexpectedly contains '{}':\n{}",
            self.target,
            text,
            self.shader.code
        );
    }

    /// Execute JSW output. `inputs` sets entry point lanes such as
    /// `("pos0_x", 0.5)`; `constants` is the `jsl_constants` array.
    pub fn run(&self, inputs: &[(&str, f64)], constants: &[f64]) -> [f64; 4] {
        assert_eq!(self.target, TargetKind::Jsw, "only JSW output can be run");
        java::run(&self.shader.code, inputs, constants)
    }

    /// Trim each line and drop empty ones.
    fn normalize(text: &str) -> Vec<String> {
        text.lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(|s| s.to_string())
            .collect()
    }
}

/// Compile `source` and return the error it must fail with.
pub fn compile_error(source: &str, target: TargetKind) -> JslError {
    compile_error_at(source, target, ShaderModel::Sm3)
}

pub fn compile_error_at(source: &str, target: TargetKind, model: ShaderModel) -> JslError {
    let options = CompileOptions::new(target).with_shader_model(model);
    match compile(source, &options) {
        Ok(shader) => panic!("expected an error, got:\n{}", shader.code),
        Err(e) => e,
    }
}

/// Evaluator for the Java subset the JSW emitter produces for straight-line
/// shaders: declarations, assignments, `if`/`else`, `return`, and the
/// `Math` / `Float` calls used by the builtin templates.
mod java {
    use super::HashMap;

    use nom::{
        branch::alt,
        bytes::complete::{tag, take_until},
        character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
        combinator::{map, not, opt, recognize, value},
        multi::{many0, many0_count, many1, separated_list0},
        sequence::{delimited, pair, preceded, terminated, tuple},
        IResult,
    };

    type Res<'a, T> = IResult<&'a str, T>;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Value {
        F(f64),
        I(i64),
        B(bool),
    }

    impl Value {
        fn f(self) -> f64 {
            match self {
                Value::F(v) => v,
                Value::I(v) => v as f64,
                Value::B(b) => panic!("expected number, found {}", b),
            }
        }

        fn b(self) -> bool {
            match self {
                Value::B(b) => b,
                other => panic!("expected boolean, found {:?}", other),
            }
        }
    }

    #[derive(Debug, Clone)]
    enum Expr {
        Lit(Value),
        Var(String),
        Index(String, Box<Expr>),
        Neg(Box<Expr>),
        Not(Box<Expr>),
        Cast(&'static str, Box<Expr>),
        Binary(&'static str, Box<Expr>, Box<Expr>),
        Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
        Call(String, Vec<Expr>),
    }

    #[derive(Debug, Clone)]
    enum Place {
        Var(String),
        Index(String, Expr),
    }

    #[derive(Debug, Clone)]
    enum Stmt {
        /// `float x = a = b;` stores into every place, then declares `x`
        Decl(String, Vec<(Place, &'static str)>, Expr),
        Array(String, usize),
        Assign(Vec<(Place, &'static str)>, Expr),
        If(Expr, Vec<Stmt>, Vec<Stmt>),
        Block(Vec<Stmt>),
        Return,
    }

    fn ws<'a, O>(
        inner: impl FnMut(&'a str) -> Res<'a, O>,
    ) -> impl FnMut(&'a str) -> Res<'a, O> {
        delimited(multispace0, inner, multispace0)
    }

    fn sym<'a>(s: &'static str) -> impl FnMut(&'a str) -> Res<'a, &'a str> {
        ws(tag(s))
    }

    /// `s` not followed by an identifier character.
    fn keyword<'a>(s: &'static str) -> impl FnMut(&'a str) -> Res<'a, &'a str> {
        ws(terminated(tag(s), not(alt((alphanumeric1, tag("_"))))))
    }

    fn ident(input: &str) -> Res<&str> {
        ws(recognize(pair(
            alt((alpha1, tag("_"))),
            many0_count(alt((alphanumeric1, tag("_")))),
        )))(input)
    }

    /// `Math.sqrt`, `Float.isNaN`, or a plain name.
    fn dotted(input: &str) -> Res<&str> {
        ws(recognize(pair(ident, opt(preceded(char('.'), ident)))))(input)
    }

    fn number(input: &str) -> Res<Value> {
        let (rest, text) = ws(recognize(tuple((
            digit1,
            opt(pair(char('.'), digit0)),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
            opt(char('f')),
        ))))(input)?;
        let digits = text.trim_end_matches('f');
        let v = if digits.contains(['.', 'e', 'E']) || text.ends_with('f') {
            Value::F(digits.parse().unwrap())
        } else {
            Value::I(digits.parse().unwrap())
        };
        Ok((rest, v))
    }

    fn primary(input: &str) -> Res<Expr> {
        alt((
            map(number, Expr::Lit),
            value(Expr::Lit(Value::B(true)), keyword("true")),
            value(Expr::Lit(Value::B(false)), keyword("false")),
            map(
                pair(dotted, delimited(sym("("), separated_list0(sym(","), expr), sym(")"))),
                |(name, args)| Expr::Call(name.trim().to_string(), args),
            ),
            map(pair(ident, delimited(sym("["), expr, sym("]"))), |(name, i)| {
                Expr::Index(name.to_string(), Box::new(i))
            }),
            map(ident, |name| Expr::Var(name.to_string())),
            delimited(sym("("), expr, sym(")")),
        ))(input)
    }

    fn unary(input: &str) -> Res<Expr> {
        alt((
            map(preceded(sym("-"), unary), |e| Expr::Neg(Box::new(e))),
            map(preceded(sym("!"), unary), |e| Expr::Not(Box::new(e))),
            map(
                pair(
                    delimited(
                        sym("("),
                        alt((value("float", keyword("float")), value("int", keyword("int")))),
                        sym(")"),
                    ),
                    unary,
                ),
                |(ty, e)| Expr::Cast(ty, Box::new(e)),
            ),
            primary,
        ))(input)
    }

    /// Left-associative level over `ops`, longest operators first.
    fn level<'a>(
        ops: &'static [&'static str],
        next: fn(&'a str) -> Res<'a, Expr>,
    ) -> impl FnMut(&'a str) -> Res<'a, Expr> {
        move |input| {
            let (mut input, mut lhs) = next(input)?;
            'outer: loop {
                for &op in ops {
                    if let Ok((rest, _)) = sym::<'a>(op)(input) {
                        let (rest, rhs) = next(rest)?;
                        lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
                        input = rest;
                        continue 'outer;
                    }
                }
                return Ok((input, lhs));
            }
        }
    }

    fn mul(input: &str) -> Res<Expr> {
        level(&["*", "/", "%"], unary)(input)
    }

    fn add(input: &str) -> Res<Expr> {
        level(&["+", "-"], mul)(input)
    }

    fn rel(input: &str) -> Res<Expr> {
        level(&["<=", ">=", "<", ">"], add)(input)
    }

    fn eq(input: &str) -> Res<Expr> {
        level(&["==", "!="], rel)(input)
    }

    fn and(input: &str) -> Res<Expr> {
        level(&["&&"], eq)(input)
    }

    fn or(input: &str) -> Res<Expr> {
        level(&["||"], and)(input)
    }

    fn expr(input: &str) -> Res<Expr> {
        let (input, cond) = or(input)?;
        match sym("?")(input) {
            Ok((rest, _)) => {
                let (rest, a) = expr(rest)?;
                let (rest, _) = sym(":")(rest)?;
                let (rest, b) = expr(rest)?;
                Ok((rest, Expr::Ternary(Box::new(cond), Box::new(a), Box::new(b))))
            }
            Err(_) => Ok((input, cond)),
        }
    }

    fn place(input: &str) -> Res<Place> {
        alt((
            map(pair(ident, delimited(sym("["), expr, sym("]"))), |(name, i)| {
                Place::Index(name.to_string(), i)
            }),
            map(ident, |name| Place::Var(name.to_string())),
        ))(input)
    }

    fn assign_op(input: &str) -> Res<&'static str> {
        alt((
            value("+=", sym("+=")),
            value("-=", sym("-=")),
            value("*=", sym("*=")),
            value("/=", sym("/=")),
            value("=", terminated(sym("="), not(char('=')))),
        ))(input)
    }

    fn type_name(input: &str) -> Res<&str> {
        alt((keyword("float"), keyword("int"), keyword("boolean")))(input)
    }

    fn stmt(input: &str) -> Res<Stmt> {
        alt((
            map(
                tuple((
                    preceded(keyword("if"), delimited(sym("("), expr, sym(")"))),
                    block,
                    opt(preceded(keyword("else"), block)),
                )),
                |(cond, then, other)| Stmt::If(cond, then, other.unwrap_or_default()),
            ),
            map(block, Stmt::Block),
            value(Stmt::Return, pair(keyword("return"), sym(";"))),
            map(
                tuple((
                    type_name,
                    sym("[]"),
                    ident,
                    sym("="),
                    keyword("new"),
                    type_name,
                    delimited(sym("["), digit1, sym("]")),
                    sym(";"),
                )),
                |(_, _, name, _, _, _, len, _)| Stmt::Array(name.to_string(), len.parse().unwrap()),
            ),
            map(
                tuple((
                    opt(keyword("final")),
                    type_name,
                    ident,
                    sym("="),
                    many0(pair(place, assign_op)),
                    expr,
                    sym(";"),
                )),
                |(_, _, name, _, places, e, _)| Stmt::Decl(name.to_string(), places, e),
            ),
            map(
                tuple((many1(pair(place, assign_op)), expr, sym(";"))),
                |(places, e, _)| Stmt::Assign(places, e),
            ),
        ))(input)
    }

    fn block(input: &str) -> Res<Vec<Stmt>> {
        delimited(sym("{"), many0(stmt), sym("}"))(input)
    }

    #[derive(Default)]
    struct Machine {
        vars: HashMap<String, Value>,
        arrays: HashMap<String, Vec<Value>>,
    }

    impl Machine {
        fn eval(&self, e: &Expr) -> Value {
            match e {
                Expr::Lit(v) => *v,
                Expr::Var(name) => *self
                    .vars
                    .get(name)
                    .unwrap_or_else(|| panic!("unknown variable '{}'", name)),
                Expr::Index(name, i) => {
                    let i = self.index(i);
                    self.arrays
                        .get(name)
                        .unwrap_or_else(|| panic!("unknown array '{}'", name))[i]
                }
                Expr::Neg(e) => match self.eval(e) {
                    Value::I(v) => Value::I(-v),
                    v => Value::F(-v.f()),
                },
                Expr::Not(e) => Value::B(!self.eval(e).b()),
                Expr::Cast("int", e) => Value::I(self.eval(e).f() as i64),
                Expr::Cast(_, e) => Value::F(self.eval(e).f()),
                Expr::Binary(op, l, r) => binary(op, self.eval(l), self.eval(r)),
                Expr::Ternary(c, a, b) => {
                    if self.eval(c).b() {
                        self.eval(a)
                    } else {
                        self.eval(b)
                    }
                }
                Expr::Call(name, args) => {
                    let args: Vec<Value> = args.iter().map(|a| self.eval(a)).collect();
                    call(name, &args)
                }
            }
        }

        fn index(&self, e: &Expr) -> usize {
            match self.eval(e) {
                Value::I(i) => i as usize,
                other => panic!("array index must be int, found {:?}", other),
            }
        }

        fn load(&self, place: &Place) -> Value {
            match place {
                Place::Var(name) => self.eval(&Expr::Var(name.clone())),
                Place::Index(name, i) => self.eval(&Expr::Index(name.clone(), Box::new(i.clone()))),
            }
        }

        fn store(&mut self, place: &Place, v: Value) {
            match place {
                Place::Var(name) => {
                    assert!(self.vars.contains_key(name), "assignment to undeclared '{}'", name);
                    self.vars.insert(name.clone(), v);
                }
                Place::Index(name, i) => {
                    let i = self.index(i);
                    let array = self
                        .arrays
                        .get_mut(name)
                        .unwrap_or_else(|| panic!("unknown array '{}'", name));
                    array[i] = v;
                }
            }
        }

        /// Right-to-left chained assignment; returns the stored value.
        fn assign(&mut self, places: &[(Place, &'static str)], e: &Expr) -> Value {
            let mut v = self.eval(e);
            for (place, op) in places.iter().rev() {
                if *op != "=" {
                    v = binary(&op[..1], self.load(place), v);
                }
                self.store(place, v);
            }
            v
        }

        /// Returns false once a `return` ran.
        fn exec(&mut self, stmts: &[Stmt]) -> bool {
            for s in stmts {
                match s {
                    Stmt::Decl(name, places, e) => {
                        let v = self.assign(places, e);
                        self.vars.insert(name.clone(), v);
                    }
                    Stmt::Array(name, len) => {
                        self.arrays.insert(name.clone(), vec![Value::F(0.0); *len]);
                    }
                    Stmt::Assign(places, e) => {
                        self.assign(places, e);
                    }
                    Stmt::If(cond, then, other) => {
                        let branch = if self.eval(cond).b() { then } else { other };
                        if !self.exec(branch) {
                            return false;
                        }
                    }
                    Stmt::Block(body) => {
                        if !self.exec(body) {
                            return false;
                        }
                    }
                    Stmt::Return => return false,
                }
            }
            true
        }
    }

    fn binary(op: &str, l: Value, r: Value) -> Value {
        use Value::*;
        match (op, l, r) {
            ("&&", B(a), B(b)) => B(a && b),
            ("||", B(a), B(b)) => B(a || b),
            ("==", B(a), B(b)) => B(a == b),
            ("!=", B(a), B(b)) => B(a != b),
            ("+", I(a), I(b)) => I(a + b),
            ("-", I(a), I(b)) => I(a - b),
            ("*", I(a), I(b)) => I(a * b),
            ("/", I(a), I(b)) => I(a / b),
            ("%", I(a), I(b)) => I(a % b),
            _ => {
                let (a, b) = (l.f(), r.f());
                match op {
                    "+" => F(a + b),
                    "-" => F(a - b),
                    "*" => F(a * b),
                    "/" => F(a / b),
                    "%" => F(a % b),
                    "<" => B(a < b),
                    ">" => B(a > b),
                    "<=" => B(a <= b),
                    ">=" => B(a >= b),
                    "==" => B(a == b),
                    "!=" => B(a != b),
                    _ => panic!("unsupported operator '{}'", op),
                }
            }
        }
    }

    fn call(name: &str, args: &[Value]) -> Value {
        use Value::*;
        let f = |i: usize| args[i].f();
        match (name, args) {
            ("Math.abs", [I(v)]) => I(v.abs()),
            ("Math.min", [I(a), I(b)]) => I(*a.min(b)),
            ("Math.max", [I(a), I(b)]) => I(*a.max(b)),
            ("Math.abs", _) => F(f(0).abs()),
            ("Math.min", _) => F(f(0).min(f(1))),
            ("Math.max", _) => F(f(0).max(f(1))),
            ("Math.sqrt", _) => F(f(0).sqrt()),
            ("Math.floor", _) => F(f(0).floor()),
            ("Math.ceil", _) => F(f(0).ceil()),
            ("Math.signum", _) => F(if f(0) == 0.0 { 0.0 } else { f(0).signum() }),
            ("Math.sin", _) => F(f(0).sin()),
            ("Math.cos", _) => F(f(0).cos()),
            ("Math.tan", _) => F(f(0).tan()),
            ("Math.asin", _) => F(f(0).asin()),
            ("Math.acos", _) => F(f(0).acos()),
            ("Math.atan", _) => F(f(0).atan()),
            ("Math.exp", _) => F(f(0).exp()),
            ("Math.log", _) => F(f(0).ln()),
            ("Math.pow", _) => F(f(0).powf(f(1))),
            ("Math.fma", _) => F(f(0).mul_add(f(1), f(2))),
            ("Float.isInfinite", _) => B(f(0).is_infinite()),
            ("Float.isNaN", _) => B(f(0).is_nan()),
            _ => panic!("unsupported call '{}'", name),
        }
    }

    const LANES: [&str; 4] = ["x", "y", "z", "w"];

    pub fn run(code: &str, inputs: &[(&str, f64)], constants: &[f64]) -> [f64; 4] {
        let mut m = Machine::default();
        for (name, arity) in [("pos0", 2), ("pos1", 2), ("pixcoord", 2), ("jsl_vertexColor", 4)] {
            for lane in &LANES[..arity] {
                m.vars.insert(format!("{}_{}", name, lane), Value::F(0.0));
            }
        }
        for (name, v) in inputs {
            m.vars.insert(name.to_string(), Value::F(*v));
        }
        m.arrays.insert("color".to_string(), vec![Value::F(0.0); 4]);
        m.arrays.insert(
            "jsl_constants".to_string(),
            constants.iter().map(|&c| Value::F(c)).collect(),
        );

        // Global declarations, then the entry point body.
        let (rest, globals) = take_until::<_, _, nom::error::Error<&str>>("void main(")(code)
            .unwrap_or_else(|_| panic!("no entry point in:\n{}", code));
        let (_, globals) = many0(stmt)(globals).unwrap();
        let (body, _) = pair(take_until::<_, _, nom::error::Error<&str>>("{"), char('{'))(rest)
            .unwrap();
        let (rest, stmts) = terminated(many0(stmt), sym("}"))(body)
            .unwrap_or_else(|e| panic!("cannot run entry point: {:?}", e));
        assert!(rest.trim().is_empty(), "unparsed output: {}", rest);

        m.exec(&globals);
        m.exec(&stmts);
        let color = &m.arrays["color"];
        [color[0].f(), color[1].f(), color[2].f(), color[3].f()]
    }
}
