use crate::command::Registry;
use crate::db::Db;
use crate::error::Result;
use crate::resp::Reply;

pub(super) fn register(registry: &mut Registry) {
    registry.register("HSET", cmd_hset);
    registry.register("HGET", cmd_hget);
    registry.register("HDEL", cmd_hdel);
    registry.register("HEXISTS", cmd_hexists);
    registry.register("HLEN", cmd_hlen);
    registry.register("HGETALL", cmd_hgetall);
    registry.register("HKEYS", cmd_hkeys);
    registry.register("HVALS", cmd_hvals);
    registry.register("HINCRBY", cmd_hincrby);
}

fn cmd_hset(db: &mut Db, (key, field, value): (String, String, Vec<u8>)) -> Result<Reply> {
    db.require_auth()?;
    Ok(db.hashes.hset(&key, &field, value).into())
}

fn cmd_hget(db: &mut Db, (key, field): (String, String)) -> Result<Reply> {
    db.require_auth()?;
    Ok(db.hashes.hget(&key, &field).map(<[u8]>::to_vec).into())
}

fn cmd_hdel(db: &mut Db, (key, field): (String, String)) -> Result<Reply> {
    db.require_auth()?;
    Ok(db.hashes.hdel(&key, &field).into())
}

fn cmd_hexists(db: &mut Db, (key, field): (String, String)) -> Result<Reply> {
    db.require_auth()?;
    Ok(db.hashes.hexists(&key, &field).into())
}

fn cmd_hlen(db: &mut Db, (key,): (String,)) -> Result<Reply> {
    db.require_auth()?;
    Ok(Reply::Integer(db.hashes.hlen(&key) as i64))
}

/// Flattened `field, value, field, value, ...`; nil when the hash is absent.
fn cmd_hgetall(db: &mut Db, (key,): (String,)) -> Result<Reply> {
    db.require_auth()?;
    let Some(fields) = db.hashes.fields(&key) else {
        return Ok(Reply::Nil);
    };
    let mut items = Vec::with_capacity(fields.len() * 2);
    for (field, value) in fields {
        items.push(Reply::bulk(field.as_bytes()));
        items.push(Reply::bulk(value.as_slice()));
    }
    Ok(Reply::Array(items))
}

fn cmd_hkeys(db: &mut Db, (key,): (String,)) -> Result<Reply> {
    db.require_auth()?;
    Ok(match db.hashes.fields(&key) {
        Some(fields) => Reply::bulk_array(fields.keys().map(|f| f.as_bytes())),
        None => Reply::Nil,
    })
}

fn cmd_hvals(db: &mut Db, (key,): (String,)) -> Result<Reply> {
    db.require_auth()?;
    Ok(match db.hashes.fields(&key) {
        Some(fields) => Reply::bulk_array(fields.values().map(Vec::as_slice)),
        None => Reply::Nil,
    })
}

fn cmd_hincrby(db: &mut Db, (key, field, delta): (String, String, i64)) -> Result<Reply> {
    db.require_auth()?;
    db.hashes.hincr_by(&key, &field, delta).map(Reply::Integer)
}
