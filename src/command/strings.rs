use crate::command::{FromArg, Registry, Rest};
use crate::db::Db;
use crate::error::{CommandError, Result};
use crate::resp::Reply;

pub(super) fn register(registry: &mut Registry) {
    registry.register("SET", cmd_set::<String>);
    registry.register("SET", cmd_set::<Vec<u8>>);
    registry.register("SETEX", cmd_setex::<String>);
    registry.register("SETEX", cmd_setex::<Vec<u8>>);
    registry.register("GET", cmd_get);
    registry.register("EXISTS", cmd_exists);
    registry.register("EXPIRE", cmd_expire);
    registry.register("TTL", cmd_ttl);
    registry.register("INCR", cmd_incr);
    registry.register("DECR", cmd_decr);
    registry.register("INCRBY", cmd_incrby);
    registry.register("DECRBY", cmd_decrby);
    registry.register("APPEND", cmd_append);
    registry.register("STRLEN", cmd_strlen);
    registry.register("GETSET", cmd_getset);
    registry.register("MSET", cmd_mset);
    registry.register("MGET", cmd_mget);
}

fn cmd_set<V: FromArg + Into<Vec<u8>>>(db: &mut Db, (key, value): (String, V)) -> Result<Reply> {
    db.require_auth()?;
    db.strings.set(&key, value.into());
    Ok(Reply::ok())
}

fn cmd_setex<V: FromArg + Into<Vec<u8>>>(
    db: &mut Db,
    (key, seconds, value): (String, i64, V),
) -> Result<Reply> {
    db.require_auth()?;
    db.strings.set_ex(&key, seconds, value.into());
    Ok(Reply::ok())
}

fn cmd_get(db: &mut Db, (key,): (String,)) -> Result<Reply> {
    db.require_auth()?;
    Ok(db.strings.get(&key).into())
}

fn cmd_exists(db: &mut Db, (key,): (String,)) -> Result<Reply> {
    db.require_auth()?;
    Ok(db.strings.exists(&key).into())
}

fn cmd_expire(db: &mut Db, (key, seconds): (String, i64)) -> Result<Reply> {
    db.require_auth()?;
    Ok(db.strings.expire(&key, seconds).into())
}

fn cmd_ttl(db: &mut Db, (key,): (String,)) -> Result<Reply> {
    db.require_auth()?;
    Ok(Reply::Integer(db.strings.ttl(&key)))
}

fn cmd_incr(db: &mut Db, (key,): (String,)) -> Result<Reply> {
    db.require_auth()?;
    db.strings.incr_by(&key, 1).map(Reply::Integer)
}

fn cmd_decr(db: &mut Db, (key,): (String,)) -> Result<Reply> {
    db.require_auth()?;
    db.strings.incr_by(&key, -1).map(Reply::Integer)
}

fn cmd_incrby(db: &mut Db, (key, delta): (String, i64)) -> Result<Reply> {
    db.require_auth()?;
    db.strings.incr_by(&key, delta).map(Reply::Integer)
}

fn cmd_decrby(db: &mut Db, (key, delta): (String, i64)) -> Result<Reply> {
    db.require_auth()?;
    let delta = delta.checked_neg().ok_or(CommandError::Overflow)?;
    db.strings.incr_by(&key, delta).map(Reply::Integer)
}

fn cmd_append(db: &mut Db, (key, suffix): (String, Vec<u8>)) -> Result<Reply> {
    db.require_auth()?;
    Ok(Reply::Integer(db.strings.append(&key, &suffix) as i64))
}

fn cmd_strlen(db: &mut Db, (key,): (String,)) -> Result<Reply> {
    db.require_auth()?;
    Ok(Reply::Integer(db.strings.strlen(&key) as i64))
}

fn cmd_getset(db: &mut Db, (key, value): (String, Vec<u8>)) -> Result<Reply> {
    db.require_auth()?;
    Ok(db.strings.get_set(&key, value).into())
}

fn cmd_mset(db: &mut Db, Rest(parts): Rest<Vec<u8>>) -> Result<Reply> {
    db.require_auth()?;
    if parts.len() % 2 != 0 {
        return Err(CommandError::WrongArity {
            command: "MSET".to_string(),
            expected: parts.len() + 1,
            got: parts.len(),
        });
    }

    // Validate every key before writing any of them.
    let mut pairs = Vec::with_capacity(parts.len() / 2);
    let mut iter = parts.into_iter().enumerate();
    while let (Some((i, key)), Some((_, value))) = (iter.next(), iter.next()) {
        let key = String::from_utf8(key).map_err(|_| CommandError::ArgumentType {
            position: i + 1,
            expected: String::KIND,
        })?;
        pairs.push((key, value));
    }
    for (key, value) in pairs {
        db.strings.set(&key, value);
    }
    Ok(Reply::ok())
}

fn cmd_mget(db: &mut Db, Rest(keys): Rest<String>) -> Result<Reply> {
    db.require_auth()?;
    let values = keys
        .iter()
        .map(|key| Reply::from(db.strings.get(key)))
        .collect();
    Ok(Reply::Array(values))
}
