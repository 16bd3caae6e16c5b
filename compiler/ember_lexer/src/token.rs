//! Token kinds.

use std::fmt;

use ember_ir::Span;

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// A line break separates this token from the previous one.
    pub newline_before: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    Str(String),
    Ident(String),

    // Keywords
    Let,
    Const,
    /// `fn` or `function`
    Fn,
    Async,
    Await,
    Class,
    Static,
    New,
    This,
    If,
    Else,
    While,
    Do,
    For,
    In,
    Break,
    Continue,
    Return,
    Throw,
    Try,
    Catch,
    Finally,
    True,
    False,
    Null,
    /// `and`
    And,
    /// `or`
    Or,
    /// `not`
    Not,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Ellipsis,
    Semicolon,
    Colon,
    Question,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    BangEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Bang,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    PlusPlus,
    MinusMinus,

    Eof,
}

impl TokenKind {
    /// Keyword for `text`, if it is one.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        use TokenKind as T;
        Some(match text {
            "let" | "var" => T::Let,
            "const" => T::Const,
            "fn" | "function" => T::Fn,
            "async" => T::Async,
            "await" => T::Await,
            "class" => T::Class,
            "static" => T::Static,
            "new" => T::New,
            "this" => T::This,
            "if" => T::If,
            "else" => T::Else,
            "while" => T::While,
            "do" => T::Do,
            "for" => T::For,
            "in" => T::In,
            "break" => T::Break,
            "continue" => T::Continue,
            "return" => T::Return,
            "throw" => T::Throw,
            "try" => T::Try,
            "catch" => T::Catch,
            "finally" => T::Finally,
            "true" => T::True,
            "false" => T::False,
            "null" => T::Null,
            "and" => T::And,
            "or" => T::Or,
            "not" => T::Not,
            _ => return None,
        })
    }

    /// Source spelling of a keyword token, so keywords can be used as
    /// property names after `.` and as map keys.
    pub fn keyword_text(&self) -> Option<&'static str> {
        use TokenKind as T;
        Some(match self {
            T::Let => "let",
            T::Const => "const",
            T::Fn => "function",
            T::Async => "async",
            T::Await => "await",
            T::Class => "class",
            T::Static => "static",
            T::New => "new",
            T::This => "this",
            T::If => "if",
            T::Else => "else",
            T::While => "while",
            T::Do => "do",
            T::For => "for",
            T::In => "in",
            T::Break => "break",
            T::Continue => "continue",
            T::Return => "return",
            T::Throw => "throw",
            T::Try => "try",
            T::Catch => "catch",
            T::Finally => "finally",
            T::True => "true",
            T::False => "false",
            T::Null => "null",
            T::And => "and",
            T::Or => "or",
            T::Not => "not",
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind as T;
        if let Some(kw) = self.keyword_text() {
            return write!(f, "`{kw}`");
        }
        let sym = match self {
            T::Number(n) => return write!(f, "number `{n}`"),
            T::Str(_) => "string literal",
            T::Ident(name) => return write!(f, "identifier `{name}`"),
            T::LParen => "`(`",
            T::RParen => "`)`",
            T::LBrace => "`{`",
            T::RBrace => "`}`",
            T::LBracket => "`[`",
            T::RBracket => "`]`",
            T::Comma => "`,`",
            T::Dot => "`.`",
            T::Ellipsis => "`...`",
            T::Semicolon => "`;`",
            T::Colon => "`:`",
            T::Question => "`?`",
            T::Plus => "`+`",
            T::Minus => "`-`",
            T::Star => "`*`",
            T::Slash => "`/`",
            T::Percent => "`%`",
            T::Eq => "`=`",
            T::EqEq => "`==`",
            T::BangEq => "`!=`",
            T::Lt => "`<`",
            T::LtEq => "`<=`",
            T::Gt => "`>`",
            T::GtEq => "`>=`",
            T::AndAnd => "`&&`",
            T::OrOr => "`||`",
            T::Bang => "`!`",
            T::PlusEq => "`+=`",
            T::MinusEq => "`-=`",
            T::StarEq => "`*=`",
            T::SlashEq => "`/=`",
            T::PercentEq => "`%=`",
            T::PlusPlus => "`++`",
            T::MinusMinus => "`--`",
            T::Eof => "end of input",
            _ => "keyword",
        };
        f.write_str(sym)
    }
}
