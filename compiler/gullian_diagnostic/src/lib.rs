//! Fatal compiler diagnostics.
//!
//! Every error is fatal: there is no recovery, no batching, no placeholder
//! emission. A [`Diagnostic`] carries the error kind, a message, the source
//! line, and the module it was raised in, and renders as
//! `<kind>: <message>. at line <n>. in module <name>`.

use std::fmt;

/// The user-facing category of a diagnostic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unexpected token, missing punctuation, malformed construct.
    Syntax,
    /// Unknown variable, type, function, module, field, variant or method.
    Name,
    /// Arity or compatibility violation, bad generic use, unguarded union
    /// read.
    Type,
    /// Import file not found.
    Import,
    /// A compiler bug: a node reached a stage that cannot handle it.
    Internal,
}

impl ErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Name => "name error",
            ErrorKind::Type => "type error",
            ErrorKind::Import => "import error",
            ErrorKind::Internal => "internal error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub line: u32,
    pub module: String,
}

impl Diagnostic {
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        line: u32,
        module: impl Into<String>,
    ) -> Self {
        Diagnostic {
            kind,
            message: message.into(),
            line,
            module: module.into(),
        }
    }

    pub fn syntax(message: impl Into<String>, line: u32, module: impl Into<String>) -> Self {
        Diagnostic::new(ErrorKind::Syntax, message, line, module)
    }

    pub fn name(message: impl Into<String>, line: u32, module: impl Into<String>) -> Self {
        Diagnostic::new(ErrorKind::Name, message, line, module)
    }

    pub fn type_(message: impl Into<String>, line: u32, module: impl Into<String>) -> Self {
        Diagnostic::new(ErrorKind::Type, message, line, module)
    }

    pub fn import(message: impl Into<String>, line: u32, module: impl Into<String>) -> Self {
        Diagnostic::new(ErrorKind::Import, message, line, module)
    }

    pub fn internal(message: impl Into<String>, line: u32, module: impl Into<String>) -> Self {
        Diagnostic::new(ErrorKind::Internal, message, line, module)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}. at line {}. in module {}",
            self.kind, self.message, self.line, self.module
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Result alias used by every compiler stage.
pub type Result<T> = std::result::Result<T, Diagnostic>;
