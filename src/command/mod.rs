//! Command registry and dispatch.
//!
//! Every handler is a plain function taking the session [`Db`] and a typed
//! argument tuple. The handler's parameter types determine its signature, so
//! `registry.register("SETEX", cmd_setex)` with
//! `cmd_setex(db, (key, seconds, value): (String, i64, Vec<u8>))` is keyed as
//! `"SETEX %s %d %b"`.

pub mod args;
mod hashes;
mod lists;
mod pubsub;
mod server;
mod sets;
mod strings;

use std::collections::HashMap;

use crate::db::Db;
use crate::error::{CommandError, Result};
use crate::resp::Reply;

pub use args::{Arg, ArgKind, FromArg, FromArgs, Rest, Signature};

type Handler = Box<dyn Fn(&mut Db, &[Arg]) -> Result<Reply> + Send + Sync>;

struct Entry {
    signature: Signature,
    handler: Handler,
}

/// Signature-keyed handler table.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<String, Entry>,
    // Templates in first-registration order; wire dispatch tries overloads in this order.
    order: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, keyed by the signature its argument
    /// type declares. Registering the same signature again replaces the
    /// previous handler.
    pub fn register<A, F>(&mut self, name: &str, handler: F)
    where
        A: FromArgs + 'static,
        F: Fn(&mut Db, A) -> Result<Reply> + Send + Sync + 'static,
    {
        let signature = Signature::new(name, A::kinds(), A::variadic());
        let template = signature.template();
        tracing::trace!("registering {}", template);

        let boxed: Handler =
            Box::new(move |db: &mut Db, args: &[Arg]| handler(db, A::from_args(args)?));
        let entry = Entry {
            signature,
            handler: boxed,
        };
        if self.entries.insert(template.clone(), entry).is_none() {
            self.order.push(template);
        }
    }

    pub fn contains(&self, template: &str) -> bool {
        Signature::parse(template).is_some_and(|sig| self.entries.contains_key(&sig.template()))
    }

    pub fn signature(&self, template: &str) -> Option<&Signature> {
        let sig = Signature::parse(template)?;
        self.entries.get(&sig.template()).map(|e| &e.signature)
    }

    /// Every registered template, sorted.
    pub fn signatures(&self) -> Vec<String> {
        let mut templates = self.order.clone();
        templates.sort();
        templates
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn overloads<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Entry> + 'a {
        self.order
            .iter()
            .filter_map(|t| self.entries.get(t))
            .filter(move |e| e.signature.name() == name)
    }

    /// The entry registered under `requested` exactly, or else the first
    /// overload of the same shape whose declared kinds accept the requested ones.
    fn resolve(&self, requested: &Signature) -> Option<&Entry> {
        if let Some(entry) = self.entries.get(&requested.template()) {
            return Some(entry);
        }
        self.order.iter().filter_map(|t| self.entries.get(t)).find(|entry| {
            let declared = &entry.signature;
            declared.name() == requested.name()
                && declared.is_variadic() == requested.is_variadic()
                && declared.kinds().len() == requested.kinds().len()
                && requested
                    .kinds()
                    .iter()
                    .zip(declared.kinds())
                    .all(|(want, have)| want.fits(*have))
        })
    }

    fn call(&self, requested: &Signature, db: &mut Db, args: &[Arg]) -> Result<Reply> {
        let Some(entry) = self.resolve(requested) else {
            return Err(CommandError::UnknownCommand(requested.template()));
        };
        let sig = &entry.signature;
        if !sig.accepts_arity(args.len()) {
            return Err(CommandError::WrongArity {
                command: sig.name().to_string(),
                expected: sig.kinds().len(),
                got: args.len(),
            });
        }
        (entry.handler)(db, args)
    }

    /// Resolve by name and arity. Overloads are tried in registration order;
    /// the first one whose coercion succeeds handles the call.
    fn call_by_name(&self, name: &str, db: &mut Db, args: &[Arg]) -> Result<Reply> {
        let mut expected = None;
        let mut coercion_error = None;
        for entry in self.overloads(name) {
            let sig = &entry.signature;
            expected.get_or_insert(sig.kinds().len());
            if !sig.accepts_arity(args.len()) {
                continue;
            }
            match (entry.handler)(db, args) {
                Err(err @ CommandError::ArgumentType { .. }) => {
                    coercion_error.get_or_insert(err);
                }
                result => return result,
            }
        }

        match (coercion_error, expected) {
            (Some(err), _) => Err(err),
            (None, Some(expected)) => Err(CommandError::WrongArity {
                command: name.to_string(),
                expected,
                got: args.len(),
            }),
            (None, None) => Err(CommandError::UnknownCommand(name.to_string())),
        }
    }
}

/// A [`Registry`] bound to the session context it dispatches against.
pub struct Dispatcher {
    registry: Registry,
    db: Db,
}

impl Dispatcher {
    /// A fresh session accepting `password`, with every command family registered.
    pub fn new(password: impl Into<String>) -> Self {
        Self::with_db(Db::new(password))
    }

    pub fn with_db(db: Db) -> Self {
        let mut registry = Registry::new();
        server::register(&mut registry);
        strings::register(&mut registry);
        hashes::register(&mut registry);
        sets::register(&mut registry);
        lists::register(&mut registry);
        pubsub::register(&mut registry);
        Self { registry, db }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut Db {
        &mut self.db
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Run one command with caller-built arguments.
    ///
    /// `command` is either a full template (`"SETEX %s %d %s"`) or a bare
    /// command name (`"SET"`). A template picks the signature registered
    /// under it, falling back to an overload whose slots accept its kinds
    /// (`%s` fills a `%b` slot). A bare name is resolved by arity.
    /// Failures come back as error replies.
    pub fn dispatch(&mut self, command: &str, args: &[Arg]) -> Reply {
        let Some(sig) = Signature::parse(command) else {
            return into_reply(Err(CommandError::UnknownCommand(command.trim().to_string())));
        };
        tracing::debug!("dispatch {} ({} args)", sig.name(), args.len());

        let result = if sig.kinds().is_empty() {
            self.registry.call_by_name(sig.name(), &mut self.db, args)
        } else {
            self.registry.call(&sig, &mut self.db, args)
        };
        into_reply(result)
    }

    /// Run one wire command: `parts[0]` is the name, the rest are raw arguments.
    pub fn execute(&mut self, parts: &[Vec<u8>]) -> Reply {
        let Some((name, rest)) = parts.split_first() else {
            return Reply::error("empty command");
        };
        let name = String::from_utf8_lossy(name).to_ascii_uppercase();
        let args: Vec<Arg> = rest.iter().map(|p| Arg::Bin(p.clone())).collect();
        tracing::debug!("execute {} ({} args)", name, args.len());

        let result = self.registry.call_by_name(&name, &mut self.db, &args);
        into_reply(result)
    }
}

fn into_reply(result: Result<Reply>) -> Reply {
    match result {
        Ok(reply) => reply,
        Err(err) => {
            if let CommandError::UnknownCommand(name) = &err {
                tracing::warn!("unknown command {:?}", name);
            }
            err.into()
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::with_db(Db::default())
    }
}

#[cfg(test)]
pub(crate) fn authenticated() -> Dispatcher {
    let mut dispatcher = Dispatcher::default();
    dispatcher.db_mut().authenticate(crate::db::DEFAULT_PASSWORD);
    dispatcher
}
