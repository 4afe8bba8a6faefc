use crate::command::Registry;
use crate::db::Db;
use crate::error::Result;
use crate::resp::Reply;

pub(super) fn register(registry: &mut Registry) {
    registry.register("SADD", cmd_sadd);
    registry.register("SREM", cmd_srem);
    registry.register("SMEMBERS", cmd_smembers);
}

fn cmd_sadd(db: &mut Db, (key, member): (String, Vec<u8>)) -> Result<Reply> {
    db.require_auth()?;
    Ok(db.sets.sadd(&key, member).into())
}

fn cmd_srem(db: &mut Db, (key, member): (String, Vec<u8>)) -> Result<Reply> {
    db.require_auth()?;
    Ok(db.sets.srem(&key, &member).into())
}

fn cmd_smembers(db: &mut Db, (key,): (String,)) -> Result<Reply> {
    db.require_auth()?;
    Ok(Reply::bulk_array(db.sets.members(&key)))
}
