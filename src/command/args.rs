//! Typed command arguments.
//!
//! Callers hand the dispatcher a list of [`Arg`] values; each handler
//! declares the Rust types it wants as a tuple, and [`FromArgs`] coerces the
//! list into that tuple before the handler runs.

use std::fmt;

use crate::error::{CommandError, Result};

/// Parameter kind of one signature position (`%s`, `%d`, `%b`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    String,
    Integer,
    Binary,
}

impl ArgKind {
    pub fn from_directive(directive: &str) -> Option<Self> {
        match directive {
            "%s" => Some(ArgKind::String),
            "%d" => Some(ArgKind::Integer),
            "%b" => Some(ArgKind::Binary),
            _ => None,
        }
    }

    /// Whether an argument declared as `self` can fill a `declared` slot.
    /// Text always fits a binary slot.
    pub fn fits(self, declared: ArgKind) -> bool {
        self == declared || (self == ArgKind::String && declared == ArgKind::Binary)
    }

    pub fn directive(&self) -> &'static str {
        match self {
            ArgKind::String => "%s",
            ArgKind::Integer => "%d",
            ArgKind::Binary => "%b",
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArgKind::String => "string",
            ArgKind::Integer => "integer",
            ArgKind::Binary => "binary",
        })
    }
}

/// An untyped call-site argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Str(String),
    Int(i64),
    Bin(Vec<u8>),
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Str(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Str(s)
    }
}

impl From<i64> for Arg {
    fn from(n: i64) -> Self {
        Arg::Int(n)
    }
}

impl From<i32> for Arg {
    fn from(n: i32) -> Self {
        Arg::Int(n.into())
    }
}

impl From<Vec<u8>> for Arg {
    fn from(b: Vec<u8>) -> Self {
        Arg::Bin(b)
    }
}

impl From<&[u8]> for Arg {
    fn from(b: &[u8]) -> Self {
        Arg::Bin(b.to_vec())
    }
}

/// Build a `Vec<Arg>` from mixed literals: `args!["key", 10, b"raw".as_slice()]`.
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        vec![$($crate::command::Arg::from($arg)),*]
    };
}

/// A command's name and ordered parameter kinds.
///
/// A variadic signature accepts one or more trailing values of its last kind
/// and is written with a trailing `...` (`"MGET %s..."`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    name: String,
    kinds: Vec<ArgKind>,
    variadic: bool,
}

impl Signature {
    pub fn new(name: &str, kinds: Vec<ArgKind>, variadic: bool) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            kinds,
            variadic,
        }
    }

    /// Parse a format template such as `"SETEX %s %d %b"`.
    pub fn parse(template: &str) -> Option<Self> {
        let mut tokens = template.split_whitespace();
        let name = tokens.next()?;
        let mut kinds = Vec::new();
        let mut variadic = false;
        for token in tokens {
            if variadic {
                return None; // `...` only on the last directive
            }
            let directive = match token.strip_suffix("...") {
                Some(d) => {
                    variadic = true;
                    d
                }
                None => token,
            };
            kinds.push(ArgKind::from_directive(directive)?);
        }
        Some(Self::new(name, kinds, variadic))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kinds(&self) -> &[ArgKind] {
        &self.kinds
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    pub fn accepts_arity(&self, n: usize) -> bool {
        if self.variadic {
            n >= self.kinds.len()
        } else {
            n == self.kinds.len()
        }
    }

    /// Canonical template text, used as the registry key.
    pub fn template(&self) -> String {
        let mut out = self.name.clone();
        for kind in &self.kinds {
            out.push(' ');
            out.push_str(kind.directive());
        }
        if self.variadic {
            out.push_str("...");
        }
        out
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template())
    }
}

/// One typed parameter.
pub trait FromArg: Sized {
    const KIND: ArgKind;

    fn from_arg(arg: &Arg) -> Option<Self>;
}

impl FromArg for String {
    const KIND: ArgKind = ArgKind::String;

    fn from_arg(arg: &Arg) -> Option<Self> {
        match arg {
            Arg::Str(s) => Some(s.clone()),
            Arg::Bin(b) => String::from_utf8(b.clone()).ok(),
            Arg::Int(_) => None,
        }
    }
}

impl FromArg for i64 {
    const KIND: ArgKind = ArgKind::Integer;

    fn from_arg(arg: &Arg) -> Option<Self> {
        match arg {
            Arg::Int(n) => Some(*n),
            Arg::Str(s) => s.parse().ok(),
            Arg::Bin(b) => std::str::from_utf8(b).ok()?.parse().ok(),
        }
    }
}

impl FromArg for Vec<u8> {
    const KIND: ArgKind = ArgKind::Binary;

    fn from_arg(arg: &Arg) -> Option<Self> {
        match arg {
            Arg::Bin(b) => Some(b.clone()),
            Arg::Str(s) => Some(s.as_bytes().to_vec()),
            Arg::Int(_) => None,
        }
    }
}

fn coerce<T: FromArg>(args: &[Arg], index: usize) -> Result<T> {
    args.get(index)
        .and_then(T::from_arg)
        .ok_or(CommandError::ArgumentType {
            position: index + 1,
            expected: T::KIND,
        })
}

/// The full typed argument list of a handler.
pub trait FromArgs: Sized {
    fn kinds() -> Vec<ArgKind>;

    fn variadic() -> bool {
        false
    }

    fn from_args(args: &[Arg]) -> Result<Self>;
}

macro_rules! impl_from_args {
    ($($ty:ident => $idx:tt),*) => {
        impl<$($ty: FromArg),*> FromArgs for ($($ty,)*) {
            fn kinds() -> Vec<ArgKind> {
                vec![$($ty::KIND),*]
            }

            #[allow(unused_variables)]
            fn from_args(args: &[Arg]) -> Result<Self> {
                Ok(($(coerce::<$ty>(args, $idx)?,)*))
            }
        }
    };
}

impl_from_args!();
impl_from_args!(A => 0);
impl_from_args!(A => 0, B => 1);
impl_from_args!(A => 0, B => 1, C => 2);

/// One or more trailing values of the same kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rest<T>(pub Vec<T>);

impl<T: FromArg> FromArgs for Rest<T> {
    fn kinds() -> Vec<ArgKind> {
        vec![T::KIND]
    }

    fn variadic() -> bool {
        true
    }

    fn from_args(args: &[Arg]) -> Result<Self> {
        (0..args.len())
            .map(|i| coerce::<T>(args, i))
            .collect::<Result<Vec<_>>>()
            .map(Rest)
    }
}
