use crate::command::Registry;
use crate::db::Db;
use crate::error::{CommandError, Result};
use crate::resp::Reply;

pub(super) fn register(registry: &mut Registry) {
    registry.register("AUTH", cmd_auth);
    registry.register("PING", cmd_ping);
}

fn cmd_auth(db: &mut Db, (password,): (String,)) -> Result<Reply> {
    if db.authenticate(&password) {
        Ok(Reply::ok())
    } else {
        tracing::warn!("AUTH failed");
        Err(CommandError::AuthFailed)
    }
}

// Reachable without auth so clients can check whether AUTH is needed.
fn cmd_ping(db: &mut Db, (): ()) -> Result<Reply> {
    db.require_auth()?;
    Ok(Reply::pong())
}
