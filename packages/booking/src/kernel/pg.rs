//! Postgres-backed `BookingStore`.
//!
//! All SQL lives here, bound through the row shapes in `models`. The
//! conditional insert re-checks the interval inside the statement itself;
//! the schema's exclusion constraint on `(provider_id, tstzrange(starts_at,
//! ends_at))` for active statuses remains the final arbiter under
//! concurrency.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::{BookingId, ProviderId, ServiceId};
use crate::domains::availability::models::{Availability, AvailabilityRow, TimeOff, TimeOffRow};
use crate::domains::bookings::models::{Booking, BookingRow};
use crate::domains::services::models::{Service, ServiceRow};
use crate::kernel::store::{BookingStore, InsertOutcome};

/// Predicate fragment for rows whose status still holds its interval.
const HOLDS_INTERVAL: &str = "status NOT IN ('cancelled', 'rescheduled')";

pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const INSERT_COLUMNS: &str = "id, client_id, provider_id, service_id, client_name, client_email, \
     client_phone, starts_at, ends_at, status, source, note, metadata, \
     confirmation_sent_at, reminder_sent_at, ics_sequence, manage_token_hash, \
     manage_token_expires_at, cancellation_reason, rescheduled_from_id, \
     created_at, updated_at";

fn bind_booking_row<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    row: &'q BookingRow,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(row.id)
        .bind(row.client_id)
        .bind(row.provider_id)
        .bind(row.service_id)
        .bind(&row.client_name)
        .bind(&row.client_email)
        .bind(&row.client_phone)
        .bind(row.starts_at)
        .bind(row.ends_at)
        .bind(&row.status)
        .bind(&row.source)
        .bind(&row.note)
        .bind(&row.metadata)
        .bind(row.confirmation_sent_at)
        .bind(row.reminder_sent_at)
        .bind(row.ics_sequence)
        .bind(&row.manage_token_hash)
        .bind(row.manage_token_expires_at)
        .bind(&row.cancellation_reason)
        .bind(row.rescheduled_from_id)
        .bind(row.created_at)
        .bind(row.updated_at)
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn find_service(&self, id: ServiceId) -> Result<Option<Service>> {
        let row = sqlx::query_as::<_, ServiceRow>("SELECT * FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Service::from))
    }

    async fn availability_for_provider(
        &self,
        provider_id: ProviderId,
    ) -> Result<Vec<Availability>> {
        let rows = sqlx::query_as::<_, AvailabilityRow>(
            r#"
            SELECT * FROM availability
            WHERE provider_id = $1
            ORDER BY day_of_week ASC, start_time ASC
            "#,
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Availability::from).collect())
    }

    async fn time_off_for_provider(&self, provider_id: ProviderId) -> Result<Vec<TimeOff>> {
        let rows = sqlx::query_as::<_, TimeOffRow>(
            "SELECT * FROM time_off WHERE provider_id = $1 ORDER BY start_date ASC",
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(TimeOff::from).collect())
    }

    async fn find_booking(&self, id: BookingId) -> Result<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Booking::try_from).transpose().map_err(Into::into)
    }

    async fn active_bookings(
        &self,
        provider_id: ProviderId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        let sql = format!(
            r#"
            SELECT * FROM bookings
            WHERE provider_id = $1
              AND {HOLDS_INTERVAL}
              AND starts_at < $3 AND $2 < ends_at
            ORDER BY starts_at ASC
            "#
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(provider_id)
            .bind(from)
            .bind(to)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|r| Booking::try_from(r).map_err(Into::into))
            .collect()
    }

    async fn insert_if_free(&self, booking: &Booking) -> Result<InsertOutcome> {
        let row = BookingRow::from(booking);
        let sql = format!(
            r#"
            INSERT INTO bookings ({INSERT_COLUMNS})
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                   $14, $15, $16, $17, $18, $19, $20, $21, $22
            WHERE NOT EXISTS (
                SELECT 1 FROM bookings b
                WHERE b.provider_id = $3
                  AND b.{HOLDS_INTERVAL}
                  AND b.starts_at < $9 AND $8 < b.ends_at
            )
            "#
        );
        let result = bind_booking_row(sqlx::query(&sql), &row)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            Ok(InsertOutcome::Conflict)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn update_booking(&self, booking: &Booking) -> Result<()> {
        let row = BookingRow::from(booking);
        sqlx::query(
            r#"
            UPDATE bookings SET
                status = $2,
                note = $3,
                confirmation_sent_at = $4,
                reminder_sent_at = $5,
                ics_sequence = $6,
                manage_token_hash = $7,
                manage_token_expires_at = $8,
                cancellation_reason = $9,
                updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(row.id)
        .bind(&row.status)
        .bind(&row.note)
        .bind(row.confirmation_sent_at)
        .bind(row.reminder_sent_at)
        .bind(row.ics_sequence)
        .bind(&row.manage_token_hash)
        .bind(row.manage_token_expires_at)
        .bind(&row.cancellation_reason)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn reschedule_pair(
        &self,
        original: &Booking,
        replacement: &Booking,
    ) -> Result<InsertOutcome> {
        let mut tx = self.pool.begin().await?;

        let original_row = BookingRow::from(original);
        sqlx::query(
            r#"
            UPDATE bookings SET status = $2, ics_sequence = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(original_row.id)
        .bind(&original_row.status)
        .bind(original_row.ics_sequence)
        .bind(original_row.updated_at)
        .execute(&mut *tx)
        .await?;

        let replacement_row = BookingRow::from(replacement);
        let sql = format!(
            r#"
            INSERT INTO bookings ({INSERT_COLUMNS})
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                   $14, $15, $16, $17, $18, $19, $20, $21, $22
            WHERE NOT EXISTS (
                SELECT 1 FROM bookings b
                WHERE b.provider_id = $3
                  AND b.{HOLDS_INTERVAL}
                  AND b.starts_at < $9 AND $8 < b.ends_at
            )
            "#
        );
        let result = bind_booking_row(sqlx::query(&sql), &replacement_row)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(InsertOutcome::Conflict);
        }
        tx.commit().await?;
        Ok(InsertOutcome::Inserted)
    }
}
