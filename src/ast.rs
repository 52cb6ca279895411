//! Syntax tree built by `Parser` and walked by `Evaluator`.
//!
//! Every node records the line it starts on.  `Display` renders the canonical, fully
//! parenthesized form of a node, which re-parses to an equivalent tree.

use std::fmt;
use std::rc::Rc;

use crate::diag::Position;

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Stmt {
    pub line: Position,
    pub kind: StmtKind,
}

#[derive(Debug, PartialEq, Clone)]
pub enum StmtKind {
    Var(String, Expr),
    Return(Expr),
    Expr(Expr),
}

/// Brace-delimited statement sequence: function bodies and `if`/`else` arms.
#[derive(Debug, PartialEq, Clone)]
pub struct Block {
    pub line: Position,
    pub statements: Vec<Stmt>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Expr {
    pub line: Position,
    pub kind: ExprKind,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ExprKind {
    Identifier(String),
    Integer(i64),
    Boolean(bool),
    Prefix(PrefixOp, Box<Expr>),
    Infix(InfixOp, Box<Expr>, Box<Expr>),
    // Shared with every closure created from this literal.
    Function(Rc<FunctionLiteral>),
    Call(Box<Expr>, Vec<Expr>),
    Array(Vec<Expr>),
    Index(Box<Expr>, Box<Expr>),
    If(Box<Expr>, Block, Option<Block>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionLiteral {
    pub parameters: Vec<String>,
    pub body: Block,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PrefixOp {
    Minus,
    Not,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    NotEqual,
    Less,
    Greater,
}

impl Stmt {
    pub fn new(line: Position, kind: StmtKind) -> Stmt {
        Stmt { line, kind }
    }
}

impl Expr {
    pub fn new(line: Position, kind: ExprKind) -> Expr {
        Expr { line, kind }
    }
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixOp::Minus => write!(f, "-"),
            PrefixOp::Not => write!(f, "!"),
        }
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfixOp::Add => write!(f, "+"),
            InfixOp::Sub => write!(f, "-"),
            InfixOp::Mul => write!(f, "*"),
            InfixOp::Div => write!(f, "/"),
            InfixOp::Equal => write!(f, "=="),
            InfixOp::NotEqual => write!(f, "!="),
            InfixOp::Less => write!(f, "<"),
            InfixOp::Greater => write!(f, ">"),
        }
    }
}

/// Write `items` separated by `sep`.
fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.statements, "\n")
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StmtKind::Var(name, e) => write!(f, "var {} = {};", name, e),
            StmtKind::Return(e) => write!(f, "return {};", e),
            StmtKind::Expr(e) => write!(f, "{};", e),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ ")?;
        for stmt in &self.statements {
            write!(f, "{} ", stmt)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for FunctionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|")?;
        write_joined(f, &self.parameters, ", ")?;
        write!(f, "| {}", self.body)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Identifier(name) => write!(f, "{}", name),
            ExprKind::Integer(n) => write!(f, "{}", n),
            ExprKind::Boolean(b) => write!(f, "{}", b),
            ExprKind::Prefix(op, rhs) => write!(f, "({}{})", op, rhs),
            ExprKind::Infix(op, lhs, rhs) => write!(f, "({} {} {})", lhs, op, rhs),
            ExprKind::Function(func) => write!(f, "{}", func),
            ExprKind::Call(callee, args) => {
                write!(f, "{}(", callee)?;
                write_joined(f, args, ", ")?;
                write!(f, ")")
            }
            ExprKind::Array(elements) => {
                write!(f, "[")?;
                write_joined(f, elements, ", ")?;
                write!(f, "]")
            }
            ExprKind::Index(array, index) => write!(f, "({}[{}])", array, index),
            ExprKind::If(cond, consequence, alternative) => {
                write!(f, "if ({}) {}", cond, consequence)?;
                if let Some(alt) = alternative {
                    write!(f, " else {}", alt)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn int(n: i64) -> Expr {
        Expr::new(1, ExprKind::Integer(n))
    }

    fn ident(name: &str) -> Expr {
        Expr::new(1, ExprKind::Identifier(name.to_string()))
    }

    fn expr_stmt(e: Expr) -> Stmt {
        Stmt::new(1, StmtKind::Expr(e))
    }

    #[test]
    fn literals() {
        assert_eq!(ident("foo2bar3").to_string(), "foo2bar3");
        assert_eq!(int(42).to_string(), "42");
        assert_eq!(Expr::new(1, ExprKind::Boolean(false)).to_string(), "false");
    }

    #[test]
    fn prefix_and_infix_are_parenthesized() {
        let neg = Expr::new(1, ExprKind::Prefix(PrefixOp::Minus, Box::new(int(5))));
        assert_eq!(neg.to_string(), "(-5)");
        let sub = Expr::new(
            1,
            ExprKind::Infix(InfixOp::Sub, Box::new(int(42)), Box::new(neg)),
        );
        assert_eq!(sub.to_string(), "(42 - (-5))");
    }

    #[test]
    fn statements() {
        assert_eq!(
            Stmt::new(1, StmtKind::Var("foo".to_string(), int(42))).to_string(),
            "var foo = 42;"
        );
        assert_eq!(
            Stmt::new(1, StmtKind::Return(ident("foo"))).to_string(),
            "return foo;"
        );
        assert_eq!(expr_stmt(int(42)).to_string(), "42;");
    }

    #[test]
    fn function_call_and_index() {
        let func = FunctionLiteral {
            parameters: vec!["x".to_string(), "y".to_string()],
            body: Block {
                line: 1,
                statements: vec![expr_stmt(Expr::new(
                    1,
                    ExprKind::Infix(InfixOp::Add, Box::new(ident("x")), Box::new(ident("y"))),
                ))],
            },
        };
        let func = Expr::new(1, ExprKind::Function(Rc::new(func)));
        assert_eq!(func.to_string(), "|x, y| { (x + y); }");

        let call = Expr::new(1, ExprKind::Call(Box::new(func), vec![int(7), int(8)]));
        assert_eq!(call.to_string(), "|x, y| { (x + y); }(7, 8)");

        let array = Expr::new(1, ExprKind::Array(vec![int(1), int(2)]));
        let index = Expr::new(1, ExprKind::Index(Box::new(array), Box::new(int(0))));
        assert_eq!(index.to_string(), "([1, 2][0])");
    }

    #[test]
    fn if_expression() {
        let block = |n| Block {
            line: 1,
            statements: vec![expr_stmt(int(n))],
        };
        let cond = Box::new(Expr::new(1, ExprKind::Boolean(true)));
        let without_else = Expr::new(1, ExprKind::If(cond.clone(), block(10), None));
        assert_eq!(without_else.to_string(), "if (true) { 10; }");
        let with_else = Expr::new(1, ExprKind::If(cond, block(10), Some(block(9))));
        assert_eq!(with_else.to_string(), "if (true) { 10; } else { 9; }");
    }

    #[test]
    fn empty_block_and_program() {
        let block = Block {
            line: 1,
            statements: vec![],
        };
        assert_eq!(block.to_string(), "{ }");
        let prg = Program {
            statements: vec![expr_stmt(int(1)), expr_stmt(int(2))],
        };
        assert_eq!(prg.to_string(), "1;\n2;");
    }
}
