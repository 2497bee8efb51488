use std::error::Error;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio_postgres::{
    types::{to_sql_checked, Format, IsNull, ToSql, Type},
    Client, NoTls,
};

use crate::dialect::Dialect;
use crate::error::{DbHelperError, Result};
use crate::traits::DatabaseDriver;
use crate::types::{ExecOutcome, RawQueryResult, SqlValue};

/// PostgreSQL driver implementation using tokio-postgres.
///
/// PostgreSQL has no session-wide "last insert id"; inserts report none.
/// Use `RETURNING` through [`crate::Database::exec_sql`] or a select when the
/// generated key is needed.
pub struct TokioPostgresDriver {
    client: Client,
}

impl TokioPostgresDriver {
    /// Connect to a PostgreSQL database.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(|e| DbHelperError::ConnectionFailed(e.to_string()))?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        Ok(Self { client })
    }

    /// Wrap an already connected client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DatabaseDriver for TokioPostgresDriver {
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome> {
        let stmt = self.client.prepare(sql).await.map_err(query_failed)?;
        let bound = bind_params(params);

        let rows_affected = self
            .client
            .execute(&stmt, &param_refs(&bound))
            .await
            .map_err(query_failed)?;

        Ok(ExecOutcome::new(rows_affected, None))
    }

    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        let stmt = self.client.prepare(sql).await.map_err(query_failed)?;
        let bound = bind_params(params);

        let rows = self
            .client
            .query(&stmt, &param_refs(&bound))
            .await
            .map_err(query_failed)?;

        // Taken from the statement so that empty results still carry them.
        let columns: Vec<String> = stmt
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let mut result_rows = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut values = Vec::with_capacity(row.len());
            for (i, col) in row.columns().iter().enumerate() {
                values.push(row_value_to_string(row, i, col.type_())?);
            }
            result_rows.push(values);
        }

        Ok(RawQueryResult::new(columns, result_rows))
    }

    async fn stat(&self) -> Result<String> {
        let row = self
            .client
            .query_one("SELECT version()", &[])
            .await
            .map_err(query_failed)?;
        row.try_get::<_, String>(0).map_err(query_failed)
    }

    fn dialect(&self) -> Dialect {
        Dialect::postgres()
    }
}

fn query_failed(e: tokio_postgres::Error) -> DbHelperError {
    DbHelperError::QueryFailed(e.to_string())
}

type BoxError = Box<dyn Error + Sync + Send>;

/// A parameter bound against the type the server inferred for its
/// placeholder, so one `SqlValue` variant fits any compatible column.
#[derive(Debug)]
struct PgParam<'a>(&'a SqlValue);

impl ToSql for PgParam<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
        encode_param(self.0, ty, out)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    /// Types without a binary encoding here are sent in text form and
    /// parsed by the server.
    fn encode_format(&self, ty: &Type) -> Format {
        if has_binary_encoding(ty) {
            Format::Binary
        } else {
            Format::Text
        }
    }

    to_sql_checked!();
}

fn bind_params(params: &[SqlValue]) -> Vec<PgParam<'_>> {
    params.iter().map(PgParam).collect()
}

fn param_refs<'a>(params: &'a [PgParam<'a>]) -> Vec<&'a (dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

fn has_binary_encoding(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::BOOL
            | Type::INT2
            | Type::INT4
            | Type::INT8
            | Type::OID
            | Type::FLOAT4
            | Type::FLOAT8
    )
}

/// Encode `value` for a parameter of type `ty`. Integers are widened or
/// narrowed (failing on overflow) and text is parsed for numeric and
/// boolean columns. Every other type receives the value's text form.
fn encode_param(
    value: &SqlValue,
    ty: &Type,
    out: &mut BytesMut,
) -> std::result::Result<IsNull, BoxError> {
    if let SqlValue::Null = value {
        return Ok(IsNull::Yes);
    }

    match *ty {
        Type::BOOL => to_bool(value)?.to_sql(ty, out),
        Type::INT2 => i16::try_from(to_i64(value)?)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(to_i64(value)?)?.to_sql(ty, out),
        Type::INT8 => to_i64(value)?.to_sql(ty, out),
        Type::OID => u32::try_from(to_i64(value)?)?.to_sql(ty, out),
        Type::FLOAT4 => (to_f64(value)? as f32).to_sql(ty, out),
        Type::FLOAT8 => to_f64(value)?.to_sql(ty, out),
        _ => {
            if let Some(text) = value.as_literal_text() {
                out.extend_from_slice(text.as_bytes());
            }
            Ok(IsNull::No)
        }
    }
}

fn to_i64(value: &SqlValue) -> std::result::Result<i64, BoxError> {
    match value {
        SqlValue::Int32(i) => Ok(i64::from(*i)),
        SqlValue::Int64(i) => Ok(*i),
        SqlValue::Bool(b) => Ok(i64::from(*b)),
        SqlValue::Text(s) => Ok(s.trim().parse()?),
        other => Err(format!("cannot bind {:?} to an integer parameter", other).into()),
    }
}

fn to_f64(value: &SqlValue) -> std::result::Result<f64, BoxError> {
    match value {
        SqlValue::Int32(i) => Ok(f64::from(*i)),
        SqlValue::Int64(i) => Ok(*i as f64),
        SqlValue::Float64(f) => Ok(*f),
        SqlValue::Text(s) => Ok(s.trim().parse()?),
        other => Err(format!("cannot bind {:?} to a float parameter", other).into()),
    }
}

fn to_bool(value: &SqlValue) -> std::result::Result<bool, BoxError> {
    match value {
        SqlValue::Bool(b) => Ok(*b),
        SqlValue::Int32(i) => Ok(*i != 0),
        SqlValue::Int64(i) => Ok(*i != 0),
        SqlValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "t" | "true" | "y" | "yes" | "on" | "1" => Ok(true),
            "f" | "false" | "n" | "no" | "off" | "0" => Ok(false),
            _ => Err(format!("cannot bind {:?} to a boolean parameter", s).into()),
        },
        other => Err(format!("cannot bind {:?} to a boolean parameter", other).into()),
    }
}

/// Convert the value at `index` to text, `None` for NULL.
fn row_value_to_string(
    row: &tokio_postgres::Row,
    index: usize,
    type_: &Type,
) -> Result<Option<String>> {
    let value = if *type_ == Type::BOOL {
        row.try_get::<_, Option<bool>>(index)
            .map(|v| v.map(|b| b.to_string()))
    } else if *type_ == Type::INT2 {
        row.try_get::<_, Option<i16>>(index)
            .map(|v| v.map(|i| i.to_string()))
    } else if *type_ == Type::INT4 {
        row.try_get::<_, Option<i32>>(index)
            .map(|v| v.map(|i| i.to_string()))
    } else if *type_ == Type::INT8 {
        row.try_get::<_, Option<i64>>(index)
            .map(|v| v.map(|i| i.to_string()))
    } else if *type_ == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(index)
            .map(|v| v.map(|f| f.to_string()))
    } else if *type_ == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(index)
            .map(|v| v.map(|f| f.to_string()))
    } else if *type_ == Type::OID {
        row.try_get::<_, Option<u32>>(index)
            .map(|v| v.map(|o| o.to_string()))
    } else {
        row.try_get::<_, Option<String>>(index)
    };

    value.map_err(|e| {
        DbHelperError::QueryFailed(format!(
            "cannot read column {} of type {} as text: {}",
            index, type_, e
        ))
    })
}
