//! Builds parameterized statements over document tables. Each collection is a
//! table of shape (seq BIGSERIAL, id TEXT PRIMARY KEY, doc JSONB NOT NULL);
//! where predicates translate to JSONB expressions on `doc`.

use crate::filter::{Clause, Filter, Op, Where};
use serde_json::Value;

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Quote a JSON key for use as a `doc->'key'` accessor. Keys come from client
/// query parameters, so single quotes must be doubled.
fn json_key(field: &str) -> String {
    format!("'{}'", field.replace('\'', "''"))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// Push a value destined for a `$n::jsonb` slot: pre-serialized so it
    /// binds as text and casts in the statement.
    fn push_jsonb(&mut self, v: &Value) -> usize {
        self.push_param(Value::String(v.to_string()))
    }
}

pub fn create_table(collection: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (seq BIGSERIAL, id TEXT PRIMARY KEY, doc JSONB NOT NULL)",
        quoted(collection)
    )
}

/// INSERT returning the stored document. Caller has already placed `id` inside `doc`.
pub fn insert(collection: &str, id: &str, doc: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let p_id = q.push_param(Value::String(id.to_string()));
    let p_doc = q.push_jsonb(doc);
    q.sql = format!(
        "INSERT INTO {} (id, doc) VALUES (${}, ${}::jsonb) RETURNING doc",
        quoted(collection),
        p_id,
        p_doc
    );
    q
}

/// SELECT one document by id. Caller binds the id as the sole parameter.
pub fn select_by_id(collection: &str) -> String {
    format!("SELECT doc FROM {} WHERE id = $1", quoted(collection))
}

/// SELECT with where, ordering (insertion order by default), and pagination.
/// Field projection is applied by the caller after fetching.
pub fn select_list(collection: &str, filter: &Filter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sql = format!("SELECT doc FROM {}", quoted(collection));
    if let Some(w) = &filter.where_ {
        let clause = where_sql(&mut q, w);
        if !clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
    }
    let order_keys = filter.order.as_ref().map(|o| o.keys()).unwrap_or_default();
    if order_keys.is_empty() {
        sql.push_str(" ORDER BY seq");
    } else {
        let cols: Vec<String> = order_keys
            .iter()
            .map(|(field, desc)| {
                format!(
                    "doc->{} {}",
                    json_key(field),
                    if *desc { "DESC" } else { "ASC" }
                )
            })
            .collect();
        sql.push_str(" ORDER BY ");
        sql.push_str(&cols.join(", "));
    }
    if let Some(limit) = filter.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    if let Some(skip) = filter.skip {
        if skip > 0 {
            sql.push_str(&format!(" OFFSET {}", skip));
        }
    }
    q.sql = sql;
    q
}

pub fn count(collection: &str, where_: Option<&Where>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sql = format!("SELECT COUNT(*) AS count FROM {}", quoted(collection));
    if let Some(w) = where_ {
        let clause = where_sql(&mut q, w);
        if !clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
    }
    q.sql = sql;
    q
}

/// Shallow-merge `patch` into one document.
pub fn update_by_id(collection: &str, id: &str, patch: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let p_id = q.push_param(Value::String(id.to_string()));
    let p_patch = q.push_jsonb(patch);
    q.sql = format!(
        "UPDATE {} SET doc = doc || ${}::jsonb WHERE id = ${} RETURNING doc",
        quoted(collection),
        p_patch,
        p_id
    );
    q
}

/// Overwrite one document wholesale. Caller keeps `id` inside `doc`.
pub fn replace_by_id(collection: &str, id: &str, doc: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let p_id = q.push_param(Value::String(id.to_string()));
    let p_doc = q.push_jsonb(doc);
    q.sql = format!(
        "UPDATE {} SET doc = ${}::jsonb WHERE id = ${} RETURNING doc",
        quoted(collection),
        p_doc,
        p_id
    );
    q
}

/// Shallow-merge `patch` into every matching document.
pub fn update_all(collection: &str, where_: Option<&Where>, patch: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let p_patch = q.push_jsonb(patch);
    let mut sql = format!(
        "UPDATE {} SET doc = doc || ${}::jsonb",
        quoted(collection),
        p_patch
    );
    if let Some(w) = where_ {
        let clause = where_sql(&mut q, w);
        if !clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
    }
    q.sql = sql;
    q
}

/// DELETE one document by id. Caller binds the id as the sole parameter.
pub fn delete_by_id(collection: &str) -> String {
    format!("DELETE FROM {} WHERE id = $1", quoted(collection))
}

pub fn delete_all(collection: &str) -> String {
    format!("DELETE FROM {}", quoted(collection))
}

fn where_sql(q: &mut QueryBuf, w: &Where) -> String {
    let parts: Vec<String> = w.clauses.iter().map(|c| clause_sql(q, c)).collect();
    parts.join(" AND ")
}

fn clause_sql(q: &mut QueryBuf, clause: &Clause) -> String {
    match clause {
        Clause::And(conds) => group_sql(q, conds, " AND "),
        Clause::Or(conds) => group_sql(q, conds, " OR "),
        Clause::Cmp { field, op } => cmp_sql(q, field, op),
    }
}

fn group_sql(q: &mut QueryBuf, conds: &[Where], joiner: &str) -> String {
    let parts: Vec<String> = conds.iter().map(|w| format!("({})", where_sql(q, w))).collect();
    format!("({})", parts.join(joiner))
}

fn cmp_sql(q: &mut QueryBuf, field: &str, op: &Op) -> String {
    let key = json_key(field);
    match op {
        Op::Eq(v) => format!("doc->{} = ${}::jsonb", key, q.push_jsonb(v)),
        // Missing fields count as not-equal, matching the in-memory evaluator.
        Op::Neq(v) => format!("doc->{} IS DISTINCT FROM ${}::jsonb", key, q.push_jsonb(v)),
        Op::Gt(v) => ordered_sql(q, &key, ">", v),
        Op::Gte(v) => ordered_sql(q, &key, ">=", v),
        Op::Lt(v) => ordered_sql(q, &key, "<", v),
        Op::Lte(v) => ordered_sql(q, &key, "<=", v),
        Op::Inq(vs) => {
            if vs.is_empty() {
                return "FALSE".to_string();
            }
            let slots: Vec<String> = vs
                .iter()
                .map(|v| format!("${}::jsonb", q.push_jsonb(v)))
                .collect();
            format!("doc->{} IN ({})", key, slots.join(", "))
        }
        Op::Nin(vs) => {
            if vs.is_empty() {
                return "TRUE".to_string();
            }
            let slots: Vec<String> = vs
                .iter()
                .map(|v| format!("${}::jsonb", q.push_jsonb(v)))
                .collect();
            format!(
                "(doc->{} IS NULL OR doc->{} NOT IN ({}))",
                key,
                key,
                slots.join(", ")
            )
        }
        Op::Between(lo, hi) => match (lo, hi) {
            (Value::Number(_), Value::Number(_)) => format!(
                "(doc->>{})::numeric BETWEEN ${} AND ${}",
                key,
                q.push_param(lo.clone()),
                q.push_param(hi.clone())
            ),
            (Value::String(_), Value::String(_)) => format!(
                "doc->>{} BETWEEN ${} AND ${}",
                key,
                q.push_param(lo.clone()),
                q.push_param(hi.clone())
            ),
            _ => "FALSE".to_string(),
        },
        Op::Like(pattern) => format!(
            "doc->>{} LIKE ${}",
            key,
            q.push_param(Value::String(pattern.clone()))
        ),
    }
}

/// Ordered comparison: numeric when the condition value is a number, else text.
fn ordered_sql(q: &mut QueryBuf, key: &str, op: &str, v: &Value) -> String {
    match v {
        Value::Number(_) => format!(
            "(doc->>{})::numeric {} ${}",
            key,
            op,
            q.push_param(v.clone())
        ),
        Value::String(_) => format!("doc->>{} {} ${}", key, op, q.push_param(v.clone())),
        _ => "FALSE".to_string(),
    }
}
