//! Repository for the `viewing_requests` table.

use sqlx::{PgPool, QueryBuilder};

use crate::models::viewing_request::{NewViewingRequest, RequestFilters, ViewingRequest};

/// Column list for `viewing_requests` queries.
const COLUMNS: &str = "id, request_id, agency_id, realtor_id, listing_id, customer_name, \
     customer_phone, customer_email, request_type, preferred_date, preferred_time, notes, \
     status, source, created_at";

/// Provides tenant-scoped operations over viewing requests.
pub struct ViewingRequestRepo;

impl ViewingRequestRepo {
    /// Insert a new request and return the stored row.
    pub async fn insert(
        pool: &PgPool,
        input: &NewViewingRequest,
    ) -> Result<ViewingRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO viewing_requests \
             (request_id, agency_id, realtor_id, listing_id, customer_name, customer_phone, \
              customer_email, request_type, preferred_date, preferred_time, notes, status, source) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ViewingRequest>(&query)
            .bind(&input.request_id)
            .bind(&input.agency_id)
            .bind(&input.realtor_id)
            .bind(&input.listing_id)
            .bind(&input.customer_name)
            .bind(&input.customer_phone)
            .bind(&input.customer_email)
            .bind(&input.request_type)
            .bind(&input.preferred_date)
            .bind(&input.preferred_time)
            .bind(&input.notes)
            .bind(&input.status)
            .bind(&input.source)
            .fetch_one(pool)
            .await
    }

    /// Look up a request by its domain id, unscoped. Tenant checks are the
    /// lifecycle engine's job; it needs the row to compare scopes against.
    pub async fn find_by_request_id(
        pool: &PgPool,
        request_id: &str,
    ) -> Result<Option<ViewingRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM viewing_requests WHERE request_id = $1");
        sqlx::query_as::<_, ViewingRequest>(&query)
            .bind(request_id)
            .fetch_optional(pool)
            .await
    }

    /// Persist a status change, scoped by request id *and* agency so a
    /// cross-tenant write can never match. Returns the updated row, or
    /// `None` when the scoped filter matched nothing.
    pub async fn update_status(
        pool: &PgPool,
        request_id: &str,
        agency_id: &str,
        status: &str,
    ) -> Result<Option<ViewingRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE viewing_requests SET status = $3 \
             WHERE request_id = $1 AND agency_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ViewingRequest>(&query)
            .bind(request_id)
            .bind(agency_id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// List requests matching the given tenant predicates, newest first.
    ///
    /// Every predicate is supplied by the caller; the engine is responsible
    /// for forcing `agency_id`/`realtor_id` to the actor's own scope.
    /// `filters.limit` must already be capped.
    pub async fn list(
        pool: &PgPool,
        filters: &RequestFilters,
    ) -> Result<Vec<ViewingRequest>, sqlx::Error> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {COLUMNS} FROM viewing_requests WHERE 1 = 1"
        ));
        if let Some(agency_id) = &filters.agency_id {
            qb.push(" AND agency_id = ").push_bind(agency_id);
        }
        if let Some(realtor_id) = &filters.realtor_id {
            qb.push(" AND realtor_id = ").push_bind(realtor_id);
        }
        if let Some(status) = &filters.status {
            qb.push(" AND status = ").push_bind(status);
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(filters.limit);

        qb.build_query_as::<ViewingRequest>().fetch_all(pool).await
    }

    /// Count all rows for an agency. Used by tests and admin summaries.
    pub async fn count_for_agency(pool: &PgPool, agency_id: &str) -> Result<i64, sqlx::Error> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM viewing_requests WHERE agency_id = $1")
                .bind(agency_id)
                .fetch_one(pool)
                .await?;
        Ok(count.unwrap_or(0))
    }
}
