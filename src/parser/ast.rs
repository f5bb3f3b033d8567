// AST (Abstract Syntax Tree) definitions for the Start/end language

use serde::Serialize;
use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Declared types (`int`, `float`, `string`, `bool`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TypeName {
    Int,
    Float,
    String,
    Bool,
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeName::Int => "int",
            TypeName::Float => "float",
            TypeName::String => "string",
            TypeName::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinOp {
    // Logical
    Or,
    And,
    // Equality
    Eq,
    Neq,
    // Relational
    Lt,
    Gt,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnOp {
    Not, // not x
    Pos, // +x
    Neg, // -x
}

/// Literal payload copied out of a token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Float(x) => write!(f, "{:?}", x),
            Literal::Str(s) => write!(f, "{:?}", s),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    pub param_type: TypeName,
    pub location: SourceLocation,
}

/// A call `name(args)`, usable both as a statement and as a factor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Call {
    pub name: String,
    pub args: Vec<Expr>,
    pub location: SourceLocation,
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(Literal, SourceLocation),
    Variable(String, SourceLocation),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },
    Call(Call),
}

impl Expr {
    /// Get the source location of this node
    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::Literal(_, loc) | Expr::Variable(_, loc) => *loc,
            Expr::Binary { location, .. } | Expr::Unary { location, .. } => *location,
            Expr::Call(call) => call.location,
        }
    }
}

/// Compact functional notation, e.g. `Add(1, Mul(2, 3))`
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit, _) => write!(f, "{}", lit),
            Expr::Variable(name, _) => f.write_str(name),
            Expr::Binary {
                op, left, right, ..
            } => write!(f, "{:?}({}, {})", op, left, right),
            Expr::Unary { op, operand, .. } => write!(f, "{:?}({})", op, operand),
            Expr::Call(call) => write!(f, "{}", call),
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(")")
    }
}

/// Statements
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    VarDecl {
        name: String,
        declared_type: TypeName,
        location: SourceLocation,
    },
    Assign {
        target: String,
        value: Expr,
        location: SourceLocation,
    },
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
        location: SourceLocation,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    FuncDecl {
        name: String,
        params: Vec<Param>,
        return_type: TypeName,
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    Call(Call),
    Return {
        value: Expr,
        location: SourceLocation,
    },
}

impl Stmt {
    /// Get the source location of this node
    pub fn location(&self) -> SourceLocation {
        match self {
            Stmt::VarDecl { location, .. }
            | Stmt::Assign { location, .. }
            | Stmt::If { location, .. }
            | Stmt::While { location, .. }
            | Stmt::FuncDecl { location, .. }
            | Stmt::Return { location, .. } => *location,
            Stmt::Call(call) => call.location,
        }
    }
}

/// Top-level program structure: `Start ... end`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
    pub location: SourceLocation,
}

impl Program {
    pub fn new(statements: Vec<Stmt>, location: SourceLocation) -> Self {
        Program {
            statements,
            location,
        }
    }

    /// Indented one-node-per-line rendering used by the CLI and the viewer
    pub fn outline(&self) -> Vec<String> {
        let mut lines = vec![format!("Program ({} statements)", self.statements.len())];
        outline_block(&self.statements, 1, &mut lines);
        lines
    }
}

fn outline_block(statements: &[Stmt], depth: usize, lines: &mut Vec<String>) {
    for stmt in statements {
        outline_stmt(stmt, depth, lines);
    }
}

fn outline_stmt(stmt: &Stmt, depth: usize, lines: &mut Vec<String>) {
    let pad = "  ".repeat(depth);
    match stmt {
        Stmt::VarDecl {
            name,
            declared_type,
            ..
        } => lines.push(format!("{pad}VarDecl {name}: {declared_type}")),
        Stmt::Assign { target, value, .. } => {
            lines.push(format!("{pad}Assign {target} := {value}"))
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            lines.push(format!("{pad}If {condition}"));
            lines.push(format!("{pad}  then"));
            outline_block(then_branch, depth + 2, lines);
            if let Some(else_branch) = else_branch {
                lines.push(format!("{pad}  else"));
                outline_block(else_branch, depth + 2, lines);
            }
        }
        Stmt::While {
            condition, body, ..
        } => {
            lines.push(format!("{pad}While {condition}"));
            outline_block(body, depth + 1, lines);
        }
        Stmt::FuncDecl {
            name,
            params,
            return_type,
            body,
            ..
        } => {
            let params = params
                .iter()
                .map(|p| format!("{}: {}", p.name, p.param_type))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("{pad}FuncDecl {name}({params}): {return_type}"));
            outline_block(body, depth + 1, lines);
        }
        Stmt::Call(call) => lines.push(format!("{pad}Call {call}")),
        Stmt::Return { value, .. } => lines.push(format!("{pad}Return {value}")),
    }
}
