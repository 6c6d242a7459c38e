//! Query predicate language: where conditions plus result shaping
//! (field selection, ordering, pagination), parsed from JSON query parameters.

use crate::error::AppError;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Result-shaping query object: match conditions plus projection, ordering,
/// and pagination. All parts optional; an empty filter returns everything in
/// insertion order.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Filter {
    #[serde(rename = "where")]
    pub where_: Option<Where>,
    /// Projection: field -> true keeps only the named fields, field -> false
    /// drops the named fields.
    pub fields: Option<HashMap<String, bool>>,
    pub order: Option<OrderSpec>,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

impl Filter {
    /// Parse from the JSON-encoded `filter` query parameter.
    pub fn from_query(s: &str) -> Result<Self, AppError> {
        serde_json::from_str(s).map_err(|e| AppError::BadRequest(format!("invalid filter: {}", e)))
    }

    /// Filter matching documents whose `field` equals `value` exactly.
    pub fn where_eq(field: &str, value: Value) -> Self {
        Filter {
            where_: Some(Where {
                clauses: vec![Clause::Cmp {
                    field: field.to_string(),
                    op: Op::Eq(value),
                }],
            }),
            ..Default::default()
        }
    }
}

/// One or more `"field ASC"` / `"field DESC"` entries (direction defaults to ASC).
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum OrderSpec {
    One(String),
    Many(Vec<String>),
}

impl OrderSpec {
    fn entries(&self) -> Vec<(&str, bool)> {
        fn parse(s: &str) -> (&str, bool) {
            let s = s.trim();
            if let Some(f) = s.strip_suffix(" DESC") {
                (f.trim_end(), true)
            } else if let Some(f) = s.strip_suffix(" ASC") {
                (f.trim_end(), false)
            } else {
                (s, false)
            }
        }
        match self {
            OrderSpec::One(s) => vec![parse(s)],
            OrderSpec::Many(v) => v.iter().map(|s| parse(s)).collect(),
        }
    }

    /// (field, descending) pairs for SQL translation.
    pub fn keys(&self) -> Vec<(String, bool)> {
        self.entries()
            .into_iter()
            .map(|(f, d)| (f.to_string(), d))
            .collect()
    }
}

/// Match conditions over a document. A where object is an implicit AND of its
/// clauses; `and`/`or` keys nest further condition lists.
#[derive(Clone, Debug)]
pub struct Where {
    pub(crate) clauses: Vec<Clause>,
}

#[derive(Clone, Debug)]
pub(crate) enum Clause {
    And(Vec<Where>),
    Or(Vec<Where>),
    Cmp { field: String, op: Op },
}

#[derive(Clone, Debug)]
pub(crate) enum Op {
    Eq(Value),
    Neq(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    Inq(Vec<Value>),
    Nin(Vec<Value>),
    Between(Value, Value),
    /// SQL-style pattern: `%` any run, `_` single character. Case-sensitive.
    Like(String),
}

impl Where {
    /// Parse from the JSON-encoded `where` query parameter.
    pub fn from_query(s: &str) -> Result<Self, AppError> {
        let v: Value = serde_json::from_str(s)
            .map_err(|e| AppError::BadRequest(format!("invalid where: {}", e)))?;
        Self::from_value(&v).map_err(AppError::BadRequest)
    }

    pub fn from_value(v: &Value) -> Result<Self, String> {
        let obj = v.as_object().ok_or("where must be a JSON object")?;
        let mut clauses = Vec::with_capacity(obj.len());
        for (key, val) in obj {
            match key.as_str() {
                "and" => clauses.push(Clause::And(parse_list(val)?)),
                "or" => clauses.push(Clause::Or(parse_list(val)?)),
                _ => clauses.push(Clause::Cmp {
                    field: key.clone(),
                    op: parse_op(val)?,
                }),
            }
        }
        Ok(Where { clauses })
    }

    /// Whether `doc` satisfies every clause.
    pub fn matches(&self, doc: &Value) -> bool {
        self.clauses.iter().all(|c| c.matches(doc))
    }
}

impl<'de> Deserialize<'de> for Where {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Value::deserialize(deserializer)?;
        Where::from_value(&v).map_err(serde::de::Error::custom)
    }
}

fn parse_list(v: &Value) -> Result<Vec<Where>, String> {
    let arr = v.as_array().ok_or("and/or expects an array of conditions")?;
    arr.iter().map(Where::from_value).collect()
}

fn parse_op(v: &Value) -> Result<Op, String> {
    let obj = match v.as_object() {
        Some(obj) if obj.len() == 1 => obj,
        // Plain values (and multi-key objects) are literal equality.
        _ => return Ok(Op::Eq(v.clone())),
    };
    let (op, arg) = obj.iter().next().ok_or("empty condition")?;
    Ok(match op.as_str() {
        "eq" => Op::Eq(arg.clone()),
        "neq" => Op::Neq(arg.clone()),
        "gt" => Op::Gt(arg.clone()),
        "gte" => Op::Gte(arg.clone()),
        "lt" => Op::Lt(arg.clone()),
        "lte" => Op::Lte(arg.clone()),
        "inq" => Op::Inq(as_list(op, arg)?),
        "nin" => Op::Nin(as_list(op, arg)?),
        "between" => {
            let pair = as_list(op, arg)?;
            if pair.len() != 2 {
                return Err("between expects exactly two values".into());
            }
            Op::Between(pair[0].clone(), pair[1].clone())
        }
        "like" => Op::Like(
            arg.as_str()
                .ok_or("like expects a string pattern")?
                .to_string(),
        ),
        // Unknown operator keys fall back to matching the object literally.
        _ => Op::Eq(v.clone()),
    })
}

fn as_list(op: &str, v: &Value) -> Result<Vec<Value>, String> {
    v.as_array()
        .cloned()
        .ok_or_else(|| format!("{} expects an array", op))
}

impl Clause {
    fn matches(&self, doc: &Value) -> bool {
        match self {
            Clause::And(conds) => conds.iter().all(|w| w.matches(doc)),
            Clause::Or(conds) => conds.iter().any(|w| w.matches(doc)),
            Clause::Cmp { field, op } => op.matches(doc.get(field)),
        }
    }
}

impl Op {
    fn matches(&self, field: Option<&Value>) -> bool {
        match self {
            Op::Eq(v) => field.is_some_and(|f| value_eq(f, v)),
            Op::Neq(v) => !field.is_some_and(|f| value_eq(f, v)),
            Op::Gt(v) => cmp(field, v).is_some_and(|o| o == Ordering::Greater),
            Op::Gte(v) => cmp(field, v).is_some_and(|o| o != Ordering::Less),
            Op::Lt(v) => cmp(field, v).is_some_and(|o| o == Ordering::Less),
            Op::Lte(v) => cmp(field, v).is_some_and(|o| o != Ordering::Greater),
            Op::Inq(vs) => field.is_some_and(|f| vs.iter().any(|v| value_eq(f, v))),
            Op::Nin(vs) => !field.is_some_and(|f| vs.iter().any(|v| value_eq(f, v))),
            Op::Between(lo, hi) => {
                cmp(field, lo).is_some_and(|o| o != Ordering::Less)
                    && cmp(field, hi).is_some_and(|o| o != Ordering::Greater)
            }
            Op::Like(pattern) => field
                .and_then(Value::as_str)
                .is_some_and(|s| like_regex(pattern).map_or(false, |re| re.is_match(s))),
        }
    }
}

/// Equality with numbers compared by value (1 and 1.0 are equal).
fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

/// Ordering between a document field and a condition value. Numbers compare
/// numerically, strings lexicographically; mixed or missing compare as None.
fn cmp(field: Option<&Value>, v: &Value) -> Option<Ordering> {
    match (field?, v) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}

/// Compile a SQL-style like pattern to an anchored regex.
fn like_regex(pattern: &str) -> Option<Regex> {
    let mut re = String::with_capacity(pattern.len() + 2);
    re.push('^');
    for c in pattern.chars() {
        match c {
            '%' => re.push_str(".*"),
            '_' => re.push('.'),
            c => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).ok()
}

/// Shape documents in memory: where, order, skip/limit, projection.
pub fn apply(filter: &Filter, docs: Vec<Value>) -> Vec<Value> {
    let mut out: Vec<Value> = match &filter.where_ {
        Some(w) => docs.into_iter().filter(|d| w.matches(d)).collect(),
        None => docs,
    };
    if let Some(order) = &filter.order {
        let keys = order.entries();
        out.sort_by(|a, b| {
            for (field, desc) in &keys {
                let ord = cmp_docs(a.get(*field), b.get(*field));
                let ord = if *desc { ord.reverse() } else { ord };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
    }
    let skip = filter.skip.unwrap_or(0);
    let out: Vec<Value> = match filter.limit {
        Some(limit) => out.into_iter().skip(skip).take(limit).collect(),
        None => out.into_iter().skip(skip).collect(),
    };
    match &filter.fields {
        Some(fields) => project(out, fields),
        None => out,
    }
}

fn cmp_docs(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => Ordering::Equal,
        },
    }
}

/// Apply a field projection: any `true` entry switches to inclusion mode,
/// otherwise the `false` entries are dropped.
pub fn project(docs: Vec<Value>, fields: &HashMap<String, bool>) -> Vec<Value> {
    let include: Vec<&str> = fields
        .iter()
        .filter(|(_, keep)| **keep)
        .map(|(f, _)| f.as_str())
        .collect();
    docs.into_iter()
        .map(|doc| match doc {
            Value::Object(map) => {
                let kept: Map<String, Value> = if include.is_empty() {
                    map.into_iter()
                        .filter(|(k, _)| fields.get(k) != Some(&false))
                        .collect()
                } else {
                    map.into_iter()
                        .filter(|(k, _)| include.contains(&k.as_str()))
                        .collect()
                };
                Value::Object(kept)
            }
            other => other,
        })
        .collect()
}
