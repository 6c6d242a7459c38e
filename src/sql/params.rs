//! Convert builder parameter values to types sqlx can bind.

use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

/// A bound statement parameter. Builders emit plain JSON scalars; jsonb
/// document slots arrive pre-serialized as strings and are cast in the
/// statement text.
#[derive(Clone, Debug)]
pub enum PgBind {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    Text(String),
}

impl PgBind {
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => PgBind::Null,
            Value::Bool(b) => PgBind::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => PgBind::I64(i),
                None => PgBind::F64(n.as_f64().unwrap_or(0.0)),
            },
            Value::String(s) => PgBind::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => PgBind::Text(v.to_string()),
        }
    }
}

impl<'q> Encode<'q, Postgres> for PgBind {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            PgBind::Null => <Option<String> as Encode<Postgres>>::encode_by_ref(&None, buf)?,
            PgBind::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf)?,
            PgBind::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBind::F64(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBind::Text(s) => {
                let s_ref: &str = s.as_str();
                <&str as Encode<Postgres>>::encode_by_ref(&s_ref, buf)?
            }
        })
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            PgBind::Null | PgBind::Text(_) => PgTypeInfo::with_name("TEXT"),
            PgBind::Bool(_) => PgTypeInfo::with_name("BOOL"),
            PgBind::I64(_) => PgTypeInfo::with_name("INT8"),
            PgBind::F64(_) => PgTypeInfo::with_name("FLOAT8"),
        })
    }
}

impl sqlx::Type<Postgres> for PgBind {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}
