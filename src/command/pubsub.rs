//! Pub/sub bookkeeping. Subscriber identifiers are recorded per channel but
//! nothing is ever delivered to them.

use crate::command::Registry;
use crate::db::Db;
use crate::error::Result;
use crate::resp::Reply;

pub(super) fn register(registry: &mut Registry) {
    registry.register("PUBLISH", cmd_publish);
    registry.register("SUBSCRIBE", cmd_subscribe);
    registry.register("UNSUBSCRIBE", cmd_unsubscribe);
    registry.register("LISTSUB", cmd_listsub);
}

fn cmd_publish(db: &mut Db, (channel, _message): (String, Vec<u8>)) -> Result<Reply> {
    db.require_auth()?;
    Ok(Reply::Integer(db.channels.subscriber_count(&channel) as i64))
}

fn cmd_subscribe(db: &mut Db, (channel, subscriber): (String, String)) -> Result<Reply> {
    db.require_auth()?;
    db.channels.subscribe(&channel, &subscriber);
    Ok(Reply::ok())
}

fn cmd_unsubscribe(db: &mut Db, (channel, subscriber): (String, String)) -> Result<Reply> {
    db.require_auth()?;
    db.channels.unsubscribe(&channel, &subscriber);
    Ok(Reply::ok())
}

fn cmd_listsub(db: &mut Db, (channel,): (String,)) -> Result<Reply> {
    db.require_auth()?;
    Ok(Reply::bulk_array(db.channels.subscribers(&channel)))
}
