//! Parse tree for ZenScript
//!
//! One Rust type per grammar production. Children are owned by their parent
//! (`Box`/`Vec`), every node records the byte [`Span`] it was parsed from,
//! and constructs the parser had to abandon are kept as `Error` variants so
//! that malformed input still yields a complete tree.
//!
//! Expressions and types implement `Display`; expressions render as
//! S-expressions so that grouping decisions are visible, e.g.
//! `1 + 2 * 3` renders as `(+ 1 (* 2 3))`.

use std::fmt;

use super::error::SyntaxError;
use super::token::Token;

/// Half-open byte range `[start, end)` in the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `offset`.
    pub fn empty(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Span covering a single token.
    pub fn of(token: &Token) -> Self {
        Self::new(token.start_offset, token.end_offset + 1)
    }

    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Result of parsing a whole document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseTree {
    pub program: Program,
    /// Recovered errors, ordered by position.
    pub errors: Vec<SyntaxError>,
}

impl ParseTree {
    pub fn is_well_formed(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Result of re-entering the grammar at a single rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub node: T,
    pub errors: Vec<SyntaxError>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub imports: Vec<ImportStatement>,
    pub items: Vec<TopLevelItem>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopLevelItem {
    GlobalStatic(GlobalStaticDeclaration),
    Function(FunctionDeclaration),
    ZenClass(ZenClassDeclaration),
    Statement(Statement),
}

impl TopLevelItem {
    pub fn span(&self) -> Span {
        match self {
            TopLevelItem::GlobalStatic(decl) => decl.span,
            TopLevelItem::Function(decl) => decl.span,
            TopLevelItem::ZenClass(decl) => decl.span,
            TopLevelItem::Statement(stmt) => stmt.span(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn from_token(token: &Token) -> Self {
        Self {
            name: token.text.clone(),
            span: Span::of(token),
        }
    }
}

/// `import a.b.C [as D];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub path: Vec<Identifier>,
    pub alias: Option<Identifier>,
    pub span: Span,
}

impl ImportStatement {
    /// Dotted path as written, e.g. `crafttweaker.item.IItemStack`.
    pub fn qualified_name(&self) -> String {
        self.path
            .iter()
            .map(|segment| segment.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalScope {
    Global,
    Static,
}

/// `global|static NAME [as Type] = value;`
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalStaticDeclaration {
    pub scope: GlobalScope,
    pub name: Identifier,
    pub ty: Option<TypeAnnotation>,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Identifier,
    pub ty: Option<TypeAnnotation>,
    pub span: Span,
}

/// `function NAME(params) [as Type] { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: Identifier,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeAnnotation>,
    pub body: Vec<Statement>,
    pub span: Span,
}

/// `zenClass NAME { members }`
#[derive(Debug, Clone, PartialEq)]
pub struct ZenClassDeclaration {
    pub name: Identifier,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldModifier {
    Var,
    Val,
    Static,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclaration {
    pub modifier: FieldModifier,
    pub name: Identifier,
    pub ty: Option<TypeAnnotation>,
    pub value: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDeclaration {
    pub params: Vec<Parameter>,
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Field(FieldDeclaration),
    Constructor(ConstructorDeclaration),
    Method(FunctionDeclaration),
    Error { message: String, span: Span },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Var,
    Val,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Block {
        statements: Vec<Statement>,
        span: Span,
    },
    Return {
        value: Option<Expression>,
        span: Span,
    },
    Declare {
        mutability: Mutability,
        name: Identifier,
        ty: Option<TypeAnnotation>,
        value: Option<Expression>,
        span: Span,
    },
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
        span: Span,
    },
    For {
        variables: Vec<Identifier>,
        iterable: Expression,
        body: Box<Statement>,
        span: Span,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
        span: Span,
    },
    /// `version 3;`
    Version {
        number: String,
        span: Span,
    },
    Break {
        span: Span,
    },
    Expression {
        expr: Expression,
        span: Span,
    },
    Error {
        message: String,
        span: Span,
    },
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Block { span, .. }
            | Statement::Return { span, .. }
            | Statement::Declare { span, .. }
            | Statement::If { span, .. }
            | Statement::For { span, .. }
            | Statement::While { span, .. }
            | Statement::Version { span, .. }
            | Statement::Break { span }
            | Statement::Expression { span, .. }
            | Statement::Error { span, .. } => *span,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Statement::Error { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Concat,
    Mul,
    Div,
    Mod,
    Or,
    And,
    Xor,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Concat => "~=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::Or => "|=",
            AssignOp::And => "&=",
            AssignOp::Xor => "^=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    OrOr,
    AndAnd,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    Add,
    Sub,
    Concat,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::OrOr => "||",
            BinaryOp::AndAnd => "&&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::In => "in",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Concat => "~",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
        }
    }
}

/// Spelling of a range postfix: `a .. b` or the contextual `a to b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
    DotDot,
    To,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Decimal or hex, as written.
    Int(String),
    /// As written, including any exponent or suffix.
    Float(String),
    /// As written, including quotes.
    String(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Assign {
        op: AssignOp,
        target: Box<Expression>,
        value: Box<Expression>,
        span: Span,
    },
    Conditional {
        condition: Box<Expression>,
        then_value: Box<Expression>,
        else_value: Box<Expression>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
        span: Span,
    },
    Member {
        object: Box<Expression>,
        member: Identifier,
        span: Span,
    },
    Range {
        op: RangeOp,
        from: Box<Expression>,
        to: Box<Expression>,
        span: Span,
    },
    /// `object[index]`, or `object[index] = value` when `value` is present.
    Index {
        object: Box<Expression>,
        index: Box<Expression>,
        value: Option<Box<Expression>>,
        span: Span,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
        span: Span,
    },
    Cast {
        expr: Box<Expression>,
        ty: TypeAnnotation,
        span: Span,
    },
    InstanceOf {
        expr: Box<Expression>,
        ty: TypeAnnotation,
        span: Span,
    },
    Literal {
        value: Literal,
        span: Span,
    },
    Identifier(Identifier),
    Lambda {
        params: Vec<Parameter>,
        return_type: Option<TypeAnnotation>,
        body: Vec<Statement>,
        span: Span,
    },
    /// `<seg:seg:...>`; each segment is the concatenation of its lexemes.
    BracketHandler {
        segments: Vec<String>,
        span: Span,
    },
    Array {
        elements: Vec<Expression>,
        span: Span,
    },
    Map {
        entries: Vec<(Expression, Expression)>,
        span: Span,
    },
    Paren {
        inner: Box<Expression>,
        span: Span,
    },
    Error {
        message: String,
        span: Span,
    },
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Identifier(ident) => ident.span,
            Expression::Assign { span, .. }
            | Expression::Conditional { span, .. }
            | Expression::Binary { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Member { span, .. }
            | Expression::Range { span, .. }
            | Expression::Index { span, .. }
            | Expression::Call { span, .. }
            | Expression::Cast { span, .. }
            | Expression::InstanceOf { span, .. }
            | Expression::Literal { span, .. }
            | Expression::Lambda { span, .. }
            | Expression::BracketHandler { span, .. }
            | Expression::Array { span, .. }
            | Expression::Map { span, .. }
            | Expression::Paren { span, .. }
            | Expression::Error { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeAnnotation {
    /// `int`, `string`, `any`, ...
    Primitive { name: String, span: Span },
    /// `crafttweaker.item.IItemStack`
    Qualified { path: Vec<String>, span: Span },
    /// `function(int, string) bool`
    Function {
        params: Vec<TypeAnnotation>,
        ret: Box<TypeAnnotation>,
        span: Span,
    },
    /// `[T]`
    Array {
        element: Box<TypeAnnotation>,
        span: Span,
    },
    /// `T[]` (list) or `V[K]` (map keyed by `K`)
    Associative {
        value: Box<TypeAnnotation>,
        key: Option<Box<TypeAnnotation>>,
        span: Span,
    },
}

impl TypeAnnotation {
    pub fn span(&self) -> Span {
        match self {
            TypeAnnotation::Primitive { span, .. }
            | TypeAnnotation::Qualified { span, .. }
            | TypeAnnotation::Function { span, .. }
            | TypeAnnotation::Array { span, .. }
            | TypeAnnotation::Associative { span, .. } => *span,
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeAnnotation::Primitive { name, .. } => f.write_str(name),
            TypeAnnotation::Qualified { path, .. } => f.write_str(&path.join(".")),
            TypeAnnotation::Function { params, ret, .. } => {
                f.write_str("function(")?;
                write_list(f, params, ",")?;
                write!(f, "){ret}")
            }
            TypeAnnotation::Array { element, .. } => write!(f, "[{element}]"),
            TypeAnnotation::Associative { value, key, .. } => match key {
                Some(key) => write!(f, "{value}[{key}]"),
                None => write!(f, "{value}[]"),
            },
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(text) | Literal::Float(text) | Literal::String(text) => f.write_str(text),
            Literal::Bool(value) => write!(f, "{value}"),
            Literal::Null => f.write_str("null"),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Assign {
                op, target, value, ..
            } => write!(f, "({} {target} {value})", op.symbol()),
            Expression::Conditional {
                condition,
                then_value,
                else_value,
                ..
            } => write!(f, "(? {condition} {then_value} {else_value})"),
            Expression::Binary { op, lhs, rhs, .. } => write!(f, "({} {lhs} {rhs})", op.symbol()),
            Expression::Unary { op, operand, .. } => write!(f, "({} {operand})", op.symbol()),
            Expression::Member { object, member, .. } => write!(f, "(. {object} {})", member.name),
            Expression::Range { op, from, to, .. } => match op {
                RangeOp::DotDot => write!(f, "(.. {from} {to})"),
                RangeOp::To => write!(f, "(to {from} {to})"),
            },
            Expression::Index {
                object,
                index,
                value,
                ..
            } => match value {
                Some(value) => write!(f, "([]= {object} {index} {value})"),
                None => write!(f, "([] {object} {index})"),
            },
            Expression::Call { callee, args, .. } => {
                write!(f, "(call {callee}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                f.write_str(")")
            }
            Expression::Cast { expr, ty, .. } => write!(f, "(as {expr} {ty})"),
            Expression::InstanceOf { expr, ty, .. } => write!(f, "(instanceof {expr} {ty})"),
            Expression::Literal { value, .. } => write!(f, "{value}"),
            Expression::Identifier(ident) => f.write_str(&ident.name),
            Expression::Lambda { params, .. } => {
                f.write_str("(function (")?;
                let names: Vec<&str> = params.iter().map(|p| p.name.name.as_str()).collect();
                write_list(f, &names, " ")?;
                f.write_str("))")
            }
            Expression::BracketHandler { segments, .. } => write!(f, "<{}>", segments.join(":")),
            Expression::Array { elements, .. } => {
                f.write_str("(array")?;
                for element in elements {
                    write!(f, " {element}")?;
                }
                f.write_str(")")
            }
            Expression::Map { entries, .. } => {
                f.write_str("(map")?;
                for (key, value) in entries {
                    write!(f, " ({key} {value})")?;
                }
                f.write_str(")")
            }
            Expression::Paren { inner, .. } => write!(f, "(paren {inner})"),
            Expression::Error { .. } => f.write_str("(error)"),
        }
    }
}
