use crate::{Error, Result, Segment, SegmentStore};
use sqlx::{PgPool, Row};

/// A [`SegmentStore`] backed by a PostgreSQL `t_lid` table.
///
/// Expects the following schema, provisioned by the operator:
///
/// ```sql
/// CREATE TABLE t_lid (
///     business_id TEXT   PRIMARY KEY,
///     max_id      BIGINT NOT NULL,
///     step        BIGINT NOT NULL
/// );
/// ```
///
/// Each lease runs as a single transaction: a locking read
/// (`SELECT ... FOR UPDATE`) of the domain row, a write advancing `max_id`
/// by `step`, then a commit. The row lock serializes concurrent leases for
/// the same domain across every connected process, so no two instances are
/// ever granted overlapping ranges. Any failure before the commit leaves the
/// transaction to roll back on drop.
pub struct PgSegmentStore {
    pool: PgPool,
}

impl PgSegmentStore {
    /// Creates a store over an existing connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SegmentStore for PgSegmentStore {
    async fn next_segment(&self, domain: &str) -> Result<Segment> {
        let mut tx = self.pool.begin().await.map_err(|e| Error::Store {
            context: format!("begin: {e}"),
        })?;

        let row = sqlx::query("SELECT max_id, step FROM t_lid WHERE business_id = $1 FOR UPDATE")
            .bind(domain)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| Error::Store {
                context: format!("select: {e}"),
            })?;

        let Some(row) = row else {
            return Err(Error::DomainNotFound {
                domain: domain.to_owned(),
            });
        };

        let max_id: i64 = row.try_get("max_id").map_err(|e| Error::Store {
            context: format!("decode max_id: {e}"),
        })?;
        let step: i64 = row.try_get("step").map_err(|e| Error::Store {
            context: format!("decode step: {e}"),
        })?;

        if step <= 0 {
            return Err(Error::Store {
                context: format!("non-positive step {step} for domain {domain:?}"),
            });
        }
        let end = max_id.checked_add(step).ok_or_else(|| Error::Store {
            context: format!("watermark overflow for domain {domain:?}"),
        })?;

        sqlx::query("UPDATE t_lid SET max_id = $1 WHERE business_id = $2")
            .bind(end)
            .bind(domain)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::Store {
                context: format!("update: {e}"),
            })?;

        tx.commit().await.map_err(|e| Error::Store {
            context: format!("commit: {e}"),
        })?;

        Ok(Segment::new(max_id, end))
    }
}
