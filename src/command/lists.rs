use crate::command::Registry;
use crate::db::Db;
use crate::error::Result;
use crate::resp::Reply;

pub(super) fn register(registry: &mut Registry) {
    registry.register("LPUSH", cmd_lpush);
    registry.register("RPUSH", cmd_rpush);
    registry.register("LPOP", cmd_lpop);
    registry.register("RPOP", cmd_rpop);
    registry.register("LRANGE", cmd_lrange);
    registry.register("LLEN", cmd_llen);
}

fn cmd_lpush(db: &mut Db, (key, value): (String, Vec<u8>)) -> Result<Reply> {
    db.require_auth()?;
    Ok(Reply::Integer(db.lists.lpush(&key, value) as i64))
}

fn cmd_rpush(db: &mut Db, (key, value): (String, Vec<u8>)) -> Result<Reply> {
    db.require_auth()?;
    Ok(Reply::Integer(db.lists.rpush(&key, value) as i64))
}

fn cmd_lpop(db: &mut Db, (key,): (String,)) -> Result<Reply> {
    db.require_auth()?;
    Ok(db.lists.lpop(&key).into())
}

fn cmd_rpop(db: &mut Db, (key,): (String,)) -> Result<Reply> {
    db.require_auth()?;
    Ok(db.lists.rpop(&key).into())
}

fn cmd_lrange(db: &mut Db, (key, start, stop): (String, i64, i64)) -> Result<Reply> {
    db.require_auth()?;
    Ok(Reply::bulk_array(db.lists.range(&key, start, stop)))
}

fn cmd_llen(db: &mut Db, (key,): (String,)) -> Result<Reply> {
    db.require_auth()?;
    Ok(Reply::Integer(db.lists.len(&key) as i64))
}

#[cfg(test)]
mod tests {
    use crate::args;
    use crate::command::authenticated;
    use crate::resp::Reply;

    #[test]
    fn test_push_range_scenario() {
        let mut d = authenticated();
        assert_eq!(d.dispatch("LPUSH", &args!["l", "a"]), Reply::Integer(1));
        assert_eq!(d.dispatch("RPUSH", &args!["l", "b"]), Reply::Integer(2));
        assert_eq!(
            d.dispatch("LRANGE", &args!["l", 0, -1]),
            Reply::bulk_array(["a", "b"])
        );
        assert_eq!(d.dispatch("LLEN", &args!["l"]), Reply::Integer(2));
    }

    #[test]
    fn test_pop_until_empty() {
        let mut d = authenticated();
        d.dispatch("RPUSH", &args!["l", "a"]);
        d.dispatch("RPUSH", &args!["l", "b"]);
        assert_eq!(d.dispatch("RPOP", &args!["l"]), Reply::bulk("b"));
        assert_eq!(d.dispatch("LPOP", &args!["l"]), Reply::bulk("a"));
        assert_eq!(d.dispatch("LPOP", &args!["l"]), Reply::Nil);
        assert_eq!(d.dispatch("LLEN", &args!["l"]), Reply::Integer(0));
        assert!(!d.db().lists.contains_key("l"));
    }

    #[test]
    fn test_lrange_out_of_bounds() {
        let mut d = authenticated();
        d.dispatch("RPUSH", &args!["l", "a"]);
        assert_eq!(d.dispatch("LRANGE", &args!["l", 5, 10]), Reply::Array(vec![]));
        assert_eq!(d.dispatch("LRANGE", &args!["missing", 0, -1]), Reply::Array(vec![]));
        assert_eq!(
            d.dispatch("LRANGE %s %d %d", &args!["l", "0", "x"]),
            Reply::Error("ERR argument 3 is not a valid integer".to_string())
        );
    }

    #[test]
    fn test_pop_on_expired_list() {
        let mut d = authenticated();
        d.dispatch("RPUSH", &args!["l", "a"]);
        d.dispatch("RPUSH", &args!["l", "b"]);
        d.dispatch("RPUSH", &args!["r", "c"]);
        assert!(d.db_mut().lists.expire_in("l", 0));
        assert!(d.db_mut().lists.expire_in("r", -1));

        assert_eq!(d.dispatch("LPOP", &args!["l"]), Reply::Nil);
        assert!(!d.db().lists.contains_key("l"));
        assert_eq!(d.dispatch("RPOP", &args!["r"]), Reply::Nil);
        assert!(!d.db().lists.contains_key("r"));

        // A push after expiry starts a fresh list.
        assert_eq!(d.dispatch("LPUSH", &args!["l", "z"]), Reply::Integer(1));
        assert_eq!(d.dispatch("RPOP", &args!["l"]), Reply::bulk("z"));
    }
}
