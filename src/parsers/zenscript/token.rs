//! Token model for ZenScript
//!
//! `TokenKind` is the terminal alphabet of the grammar. It is derived with
//! `logos`: fixed lexemes are declared with `#[token]` and win over the
//! generic identifier pattern whenever both match the same text, while the
//! longest match always wins (`iff` is an identifier, `if` is a keyword).
//!
//! Comments are real tokens here so that the lexer can route them into a
//! separate sequence; the grammar never sees them.

use std::fmt;
use std::ops::Range;

use logos::Logos;

/// Terminal categories produced by the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    // === Type keywords ===
    #[token("any")]
    Any,
    #[token("bool")]
    Bool,
    #[token("byte")]
    Byte,
    #[token("short")]
    Short,
    #[token("int")]
    Int,
    #[token("long")]
    Long,
    #[token("float")]
    Float,
    #[token("double")]
    Double,
    #[token("string")]
    String,
    #[token("void")]
    Void,

    // === Keywords ===
    #[token("function")]
    Function,
    #[token("in")]
    In,
    #[token("as")]
    As,
    #[token("version")]
    Version,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("return")]
    Return,
    #[token("var")]
    Var,
    #[token("val")]
    Val,
    #[token("global")]
    Global,
    #[token("static")]
    Static,
    #[token("instanceof")]
    InstanceOf,
    #[token("while")]
    While,
    #[token("break")]
    Break,
    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("import")]
    Import,
    #[token("zenClass")]
    ZenClass,
    #[token("zenConstructor")]
    ZenConstructor,

    // === Delimiters ===
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("..")]
    DotDot,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("$")]
    Dollar,

    // === Operators ===
    #[token("+=")]
    PlusAssign,
    #[token("+")]
    Plus,
    #[token("-=")]
    MinusAssign,
    #[token("-")]
    Minus,
    #[token("*=")]
    MulAssign,
    #[token("*")]
    Mul,
    #[token("/=")]
    DivAssign,
    #[token("/")]
    Div,
    #[token("%=")]
    ModAssign,
    #[token("%")]
    Mod,
    #[token("|=")]
    OrAssign,
    #[token("||")]
    OrOr,
    #[token("|")]
    Or,
    #[token("&=")]
    AndAssign,
    #[token("&&")]
    AndAnd,
    #[token("&")]
    And,
    #[token("^=")]
    XorAssign,
    #[token("^")]
    Xor,
    #[token("~=")]
    TildeAssign,
    #[token("~")]
    Tilde,
    #[token("==")]
    Eq,
    #[token("=")]
    Assign,
    #[token("!=")]
    NotEq,
    #[token("!")]
    Not,
    #[token("<=")]
    LtEq,
    #[token("<")]
    Lt,
    #[token(">=")]
    GtEq,
    #[token(">")]
    Gt,

    // === Literals ===
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?[fFdD]?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[fFdD]?")]
    #[regex(r"[0-9]+[fFdD]")]
    FloatValue,
    #[regex(r"0[xX][0-9a-fA-F]+")]
    #[regex(r"[0-9]+")]
    IntValue,
    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    StringValue,
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,

    // === Comments (routed to the comment sequence) ===
    #[regex(r"//[^\n]*")]
    LineComment,
    #[regex(r"#[^\n]*")]
    HashComment,
    #[token("/*", block_comment)]
    BlockComment,

    /// A character the lexer does not recognise. Never produced by `logos`
    /// itself; `tokenize` emits it for every lexing failure.
    Error,
}

/// Runs a block comment on to the first `*/`. An unterminated comment
/// swallows the rest of the input and lexes as an error.
fn block_comment(lex: &mut logos::Lexer<'_, TokenKind>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

impl TokenKind {
    /// Stable upper-case name, shown to users by hover.
    pub fn name(self) -> &'static str {
        use TokenKind::*;
        match self {
            Any => "ANY",
            Bool => "BOOL",
            Byte => "BYTE",
            Short => "SHORT",
            Int => "INT",
            Long => "LONG",
            Float => "FLOAT",
            Double => "DOUBLE",
            String => "STRING",
            Void => "VOID",
            Function => "FUNCTION",
            In => "IN",
            As => "AS",
            Version => "VERSION",
            If => "IF",
            Else => "ELSE",
            For => "FOR",
            Return => "RETURN",
            Var => "VAR",
            Val => "VAL",
            Global => "GLOBAL_ZS",
            Static => "STATIC",
            InstanceOf => "INSTANCEOF",
            While => "WHILE",
            Break => "BREAK",
            Null => "NULL",
            True => "TRUE",
            False => "FALSE",
            Import => "IMPORT",
            ZenClass => "ZEN_CLASS",
            ZenConstructor => "ZEN_CONSTRUCTOR",
            LBrace => "A_OPEN",
            RBrace => "A_CLOSE",
            LBracket => "SQBR_OPEN",
            RBracket => "SQBR_CLOSE",
            LParen => "BR_OPEN",
            RParen => "BR_CLOSE",
            DotDot => "DOT2",
            Dot => "DOT",
            Comma => "COMMA",
            Semicolon => "SEMICOLON",
            Question => "QUEST",
            Colon => "COLON",
            Dollar => "DOLLAR",
            PlusAssign => "PLUS_ASSIGN",
            Plus => "PLUS",
            MinusAssign => "MINUS_ASSIGN",
            Minus => "MINUS",
            MulAssign => "MUL_ASSIGN",
            Mul => "MUL",
            DivAssign => "DIV_ASSIGN",
            Div => "DIV",
            ModAssign => "MOD_ASSIGN",
            Mod => "MOD",
            OrAssign => "OR_ASSIGN",
            OrOr => "OR2",
            Or => "OR",
            AndAssign => "AND_ASSIGN",
            AndAnd => "AND2",
            And => "AND",
            XorAssign => "XOR_ASSIGN",
            Xor => "XOR",
            TildeAssign => "TILDE_ASSIGN",
            Tilde => "TILDE",
            Eq => "EQ",
            Assign => "ASSIGN",
            NotEq => "NOT_EQ",
            Not => "NOT",
            LtEq => "LTEQ",
            Lt => "LT",
            GtEq => "GTEQ",
            Gt => "GT",
            FloatValue => "FLOAT_VALUE",
            IntValue => "INT_VALUE",
            StringValue => "STRING_VALUE",
            Identifier => "IDENTIFIER",
            LineComment => "LINE_COMMENT",
            HashComment => "HASH_COMMENT",
            BlockComment => "BLOCK_COMMENT",
            Error => "ERROR",
        }
    }

    /// Comment kinds never reach the grammar.
    pub fn is_comment(self) -> bool {
        matches!(
            self,
            TokenKind::LineComment | TokenKind::HashComment | TokenKind::BlockComment
        )
    }

    /// Primitive type keywords, valid as a complete type annotation.
    pub fn is_primitive_type(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Any | Bool | Byte | Short | Int | Long | Float | Double | String | Void
        )
    }

    /// Any reserved word. Keywords double as package segments in imports
    /// and as data inside bracket handlers.
    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        self.is_primitive_type()
            || matches!(
                self,
                Function
                    | In
                    | As
                    | Version
                    | If
                    | Else
                    | For
                    | Return
                    | Var
                    | Val
                    | Global
                    | Static
                    | InstanceOf
                    | While
                    | Break
                    | Null
                    | True
                    | False
                    | Import
                    | ZenClass
                    | ZenConstructor
            )
    }

    /// Tokens that may appear inside one segment of a bracket handler
    /// literal. Everything is data there except the delimiters that
    /// structure the literal itself. A `;` ends an unclosed literal so that
    /// it cannot swallow the following statements.
    pub fn is_bracket_handler_item(self) -> bool {
        use TokenKind::*;
        !matches!(self, Lt | Gt | LtEq | GtEq | Colon | Semicolon | Error) && !self.is_comment()
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexeme with its location in the source.
///
/// Offsets are byte offsets into the document text; `end_offset` is
/// inclusive, so a one-character token has `start_offset == end_offset`.
/// `line` and `column` are 0-based, the column counted in characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub line: u32,
    pub column: u32,
}

impl Token {
    /// Half-open byte range `[start, end + 1)`.
    pub fn range(&self) -> Range<usize> {
        self.start_offset..self.end_offset + 1
    }

    pub fn covers(&self, offset: usize) -> bool {
        self.start_offset <= offset && offset <= self.end_offset
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Ordered, non-overlapping tokens of one document snapshot.
pub type TokenSequence = Vec<Token>;
