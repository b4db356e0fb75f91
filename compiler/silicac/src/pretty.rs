//! Source reconstruction from the AST.
//!
//! Deterministic formatting: two-space indents, one statement per line,
//! parentheses only where precedence requires them.

use silica_ir::{
    Ast, BinaryOp, DeclKind, ExprId, ExprKind, Module, StmtId, StmtKind, StorageQualifier,
    StringInterner,
};

pub(crate) fn print(ast: &Ast, module: &Module, interner: &StringInterner) -> String {
    let mut printer = Printer { ast, interner, out: String::new(), indent: 0 };
    for (i, &decl) in module.decls.iter().enumerate() {
        if i > 0 {
            printer.out.push('\n');
        }
        printer.decl(decl);
    }
    printer.out
}

struct Printer<'a> {
    ast: &'a Ast,
    interner: &'a StringInterner,
    out: String,
    indent: usize,
}

/// Binding strength, mirroring the parser's ladder. Higher binds tighter.
fn precedence(kind: &ExprKind) -> u8 {
    match kind {
        ExprKind::Assign { .. } => 1,
        ExprKind::Comma { .. } => 2,
        ExprKind::Ternary { .. } => 3,
        ExprKind::Binary { op, .. } => match op {
            BinaryOp::LogicalOr => 4,
            BinaryOp::LogicalAnd => 5,
            BinaryOp::BitOr => 6,
            BinaryOp::BitXor => 7,
            BinaryOp::BitAnd => 8,
            BinaryOp::Eq | BinaryOp::NotEq => 9,
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => 10,
            BinaryOp::Shl | BinaryOp::Shr => 11,
            BinaryOp::Add | BinaryOp::Sub => 12,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 13,
        },
        ExprKind::Unary { .. } => 14,
        _ => 15,
    }
}

impl Printer<'_> {
    fn line_start(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn decl(&mut self, id: silica_ir::DeclId) {
        match self.ast.decl(id).kind {
            DeclKind::Global(global) => {
                if !global.layout.is_empty() {
                    let mut parts = Vec::new();
                    if let Some(location) = global.layout.location {
                        parts.push(format!("location = {location}"));
                    }
                    if let Some(binding) = global.layout.binding {
                        parts.push(format!("binding = {binding}"));
                    }
                    if let Some(set) = global.layout.set {
                        parts.push(format!("set = {set}"));
                    }
                    self.out.push_str(&format!("layout({}) ", parts.join(", ")));
                }
                if global.storage != StorageQualifier::None {
                    self.out.push_str(global.storage.keyword());
                    self.out.push(' ');
                }
                self.out.push_str(global.ty.glsl_name());
                self.out.push(' ');
                self.out.push_str(self.interner.lookup(global.name));
                if let Some(init) = global.init {
                    self.out.push_str(" = ");
                    self.expr(init, 3);
                }
                self.out.push_str(";\n");
            }
            DeclKind::Function(func) => {
                self.out.push_str(func.return_type.glsl_name());
                self.out.push(' ');
                self.out.push_str(self.interner.lookup(func.name));
                self.out.push('(');
                let params = self.ast.params(func.params);
                if params.is_empty() {
                    self.out.push_str("void");
                } else {
                    for (i, param) in params.iter().enumerate() {
                        if i > 0 {
                            self.out.push_str(", ");
                        }
                        self.out.push_str(param.ty.glsl_name());
                        self.out.push(' ');
                        self.out.push_str(self.interner.lookup(param.name));
                    }
                }
                self.out.push_str(")\n");
                self.stmt(func.body);
            }
        }
    }

    fn stmt(&mut self, id: StmtId) {
        let stmt = *self.ast.stmt(id);
        match stmt.kind {
            StmtKind::Block { stmts } => {
                self.line_start();
                self.out.push_str("{\n");
                self.indent += 1;
                for &inner in self.ast.stmt_list(stmts) {
                    self.stmt(inner);
                }
                self.indent -= 1;
                self.line_start();
                self.out.push_str("}\n");
            }
            StmtKind::Local { ty, name, init } => {
                self.line_start();
                self.out.push_str(ty.glsl_name());
                self.out.push(' ');
                self.out.push_str(self.interner.lookup(name));
                if let Some(init) = init {
                    self.out.push_str(" = ");
                    self.expr(init, 3);
                }
                self.out.push_str(";\n");
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                self.line_start();
                self.out.push_str("if (");
                self.expr(cond, 1);
                self.out.push_str(")\n");
                self.nested(then_branch);
                if let Some(else_branch) = else_branch {
                    self.line_start();
                    self.out.push_str("else\n");
                    self.nested(else_branch);
                }
            }
            StmtKind::While { cond, body } => {
                self.line_start();
                self.out.push_str("while (");
                self.expr(cond, 1);
                self.out.push_str(")\n");
                self.nested(body);
            }
            StmtKind::For { init, cond, step, body } => {
                self.line_start();
                self.out.push_str("for (");
                match init {
                    Some(init) => match self.ast.stmt(init).kind {
                        StmtKind::Local { ty, name, init: value } => {
                            self.out.push_str(ty.glsl_name());
                            self.out.push(' ');
                            self.out.push_str(self.interner.lookup(name));
                            if let Some(value) = value {
                                self.out.push_str(" = ");
                                self.expr(value, 3);
                            }
                            self.out.push(';');
                        }
                        StmtKind::Expr(expr) => {
                            self.expr(expr, 1);
                            self.out.push(';');
                        }
                        _ => self.out.push(';'),
                    },
                    None => self.out.push(';'),
                }
                self.out.push(' ');
                if let Some(cond) = cond {
                    self.expr(cond, 1);
                }
                self.out.push_str("; ");
                if let Some(step) = step {
                    self.expr(step, 1);
                }
                self.out.push_str(")\n");
                self.nested(body);
            }
            StmtKind::Return { value } => {
                self.line_start();
                match value {
                    Some(value) => {
                        self.out.push_str("return ");
                        self.expr(value, 1);
                        self.out.push_str(";\n");
                    }
                    None => self.out.push_str("return;\n"),
                }
            }
            StmtKind::Expr(expr) => {
                self.line_start();
                self.expr(expr, 1);
                self.out.push_str(";\n");
            }
            StmtKind::Empty => {
                self.line_start();
                self.out.push_str(";\n");
            }
        }
    }

    /// A statement in if/while/for position: blocks print as-is, single
    /// statements get one level of indent.
    fn nested(&mut self, id: StmtId) {
        if matches!(self.ast.stmt(id).kind, StmtKind::Block { .. }) {
            self.stmt(id);
        } else {
            self.indent += 1;
            self.stmt(id);
            self.indent -= 1;
        }
    }

    fn expr(&mut self, id: ExprId, min_precedence: u8) {
        let kind = self.ast.expr(id).kind;
        let level = precedence(&kind);
        let parens = level < min_precedence;
        if parens {
            self.out.push('(');
        }
        match kind {
            ExprKind::Int(v) => self.out.push_str(&v.to_string()),
            ExprKind::Uint(v) => self.out.push_str(&format!("{v}u")),
            ExprKind::Float(bits) => self.out.push_str(&float_text(bits)),
            ExprKind::Double(bits) => {
                self.out.push_str(&float_text(bits));
                self.out.push_str("lf");
            }
            ExprKind::Bool(b) => self.out.push_str(if b { "true" } else { "false" }),
            ExprKind::Ident(name) => self.out.push_str(self.interner.lookup(name)),
            ExprKind::Binary { op, lhs, rhs } => {
                self.expr(lhs, level);
                self.out.push(' ');
                self.out.push_str(op.symbol());
                self.out.push(' ');
                self.expr(rhs, level + 1);
            }
            ExprKind::Unary { op, operand } => {
                self.out.push_str(op.symbol());
                self.expr(operand, level);
            }
            ExprKind::Assign { target, value } => {
                self.expr(target, level + 1);
                self.out.push_str(" = ");
                self.expr(value, level);
            }
            ExprKind::Ternary { cond, then_branch, else_branch } => {
                self.expr(cond, level + 1);
                self.out.push_str(" ? ");
                self.expr(then_branch, level);
                self.out.push_str(" : ");
                self.expr(else_branch, level);
            }
            ExprKind::Comma { first, second } => {
                self.expr(first, level);
                self.out.push_str(", ");
                self.expr(second, level + 1);
            }
            ExprKind::Call { callee, args } => {
                self.out.push_str(self.interner.lookup(callee));
                self.args(args);
            }
            ExprKind::Construct { ty, args } => {
                self.out.push_str(ty.glsl_name());
                self.args(args);
            }
            ExprKind::Member { base, field } => {
                self.expr(base, level);
                self.out.push('.');
                self.out.push_str(self.interner.lookup(field));
            }
            ExprKind::Index { base, index } => {
                self.expr(base, level);
                self.out.push('[');
                self.expr(index, 1);
                self.out.push(']');
            }
        }
        if parens {
            self.out.push(')');
        }
    }

    fn args(&mut self, args: silica_ir::ExprRange) {
        self.out.push('(');
        let ids: Vec<ExprId> = self.ast.expr_list(args).to_vec();
        for (i, arg) in ids.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            // Arguments re-enter at the ternary level, like the parser.
            self.expr(*arg, 3);
        }
        self.out.push(')');
    }
}

/// Literal text for a float stored as `f64` bits, always with a decimal
/// point or exponent so it re-lexes as a float.
fn float_text(bits: u64) -> String {
    let value = f64::from_bits(bits);
    let text = format!("{value}");
    if text.contains('.') || text.contains('e') || text.contains("inf") || text.contains("NaN") {
        text
    } else {
        format!("{text}.0")
    }
}
