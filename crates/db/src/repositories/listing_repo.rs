//! Repository for the `listings` table.

use sqlx::{PgPool, QueryBuilder};

use crate::models::listing::{Listing, ListingSearchFilters, ListingUpdate, NewListing};

/// Column list for `listings` queries.
const COLUMNS: &str = "id, listing_id, agency_id, realtor_id, title, description, price, \
     property_type, parish, community, bedrooms, bathrooms, image_urls, video_url, \
     featured, status, created_at, updated_at";

/// Provides tenant-scoped operations over listings.
pub struct ListingRepo;

impl ListingRepo {
    pub async fn insert(pool: &PgPool, input: &NewListing) -> Result<Listing, sqlx::Error> {
        let query = format!(
            "INSERT INTO listings \
             (listing_id, agency_id, realtor_id, title, description, price, property_type, \
              parish, community, bedrooms, bathrooms, image_urls, video_url, featured) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(&input.listing_id)
            .bind(&input.agency_id)
            .bind(&input.realtor_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.property_type)
            .bind(&input.parish)
            .bind(&input.community)
            .bind(input.bedrooms)
            .bind(input.bathrooms)
            .bind(&input.image_urls)
            .bind(&input.video_url)
            .bind(input.featured)
            .fetch_one(pool)
            .await
    }

    /// Apply a partial update scoped by listing id and agency. Returns the
    /// updated row, or `None` when the scoped filter matched nothing.
    pub async fn update(
        pool: &PgPool,
        listing_id: &str,
        agency_id: &str,
        update: &ListingUpdate,
    ) -> Result<Option<Listing>, sqlx::Error> {
        let query = format!(
            "UPDATE listings SET \
               title = COALESCE($3, title), \
               description = COALESCE($4, description), \
               price = COALESCE($5, price), \
               property_type = COALESCE($6, property_type), \
               parish = COALESCE($7, parish), \
               community = COALESCE($8, community), \
               bedrooms = COALESCE($9, bedrooms), \
               bathrooms = COALESCE($10, bathrooms), \
               image_urls = COALESCE($11, image_urls), \
               video_url = COALESCE($12, video_url), \
               featured = COALESCE($13, featured), \
               updated_at = NOW() \
             WHERE listing_id = $1 AND agency_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(listing_id)
            .bind(agency_id)
            .bind(&update.title)
            .bind(&update.description)
            .bind(update.price)
            .bind(&update.property_type)
            .bind(&update.parish)
            .bind(&update.community)
            .bind(update.bedrooms)
            .bind(update.bathrooms)
            .bind(&update.image_urls)
            .bind(&update.video_url)
            .bind(update.featured)
            .fetch_optional(pool)
            .await
    }

    /// Public lookup by listing id, any agency.
    pub async fn find_by_listing_id(
        pool: &PgPool,
        listing_id: &str,
    ) -> Result<Option<Listing>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM listings WHERE listing_id = $1");
        sqlx::query_as::<_, Listing>(&query)
            .bind(listing_id)
            .fetch_optional(pool)
            .await
    }

    /// Tenant-scoped lookup used by the realtor portal.
    pub async fn find_scoped(
        pool: &PgPool,
        listing_id: &str,
        agency_id: &str,
    ) -> Result<Option<Listing>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM listings WHERE listing_id = $1 AND agency_id = $2");
        sqlx::query_as::<_, Listing>(&query)
            .bind(listing_id)
            .bind(agency_id)
            .fetch_optional(pool)
            .await
    }

    /// A realtor's own listings, newest first.
    pub async fn list_for_realtor(
        pool: &PgPool,
        agency_id: &str,
        realtor_id: &str,
    ) -> Result<Vec<Listing>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM listings \
             WHERE agency_id = $1 AND realtor_id = $2 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(agency_id)
            .bind(realtor_id)
            .fetch_all(pool)
            .await
    }

    /// Available listings for one agency's storefront, featured first.
    pub async fn list_public_for_agency(
        pool: &PgPool,
        agency_id: &str,
    ) -> Result<Vec<Listing>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM listings \
             WHERE agency_id = $1 AND status = 'available' \
             ORDER BY featured DESC, created_at DESC"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(agency_id)
            .fetch_all(pool)
            .await
    }

    /// Cross-agency storefront search with optional attribute filters.
    pub async fn search_public(
        pool: &PgPool,
        agency_ids: &[String],
        filters: &ListingSearchFilters,
    ) -> Result<Vec<Listing>, sqlx::Error> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {COLUMNS} FROM listings WHERE status = 'available' AND agency_id = ANY("
        ));
        qb.push_bind(agency_ids).push(")");
        if let Some(parish) = &filters.parish {
            qb.push(" AND parish = ").push_bind(parish);
        }
        if let Some(property_type) = &filters.property_type {
            qb.push(" AND property_type = ").push_bind(property_type);
        }
        if let Some(min_price) = filters.min_price {
            qb.push(" AND price >= ").push_bind(min_price);
        }
        if let Some(max_price) = filters.max_price {
            qb.push(" AND price <= ").push_bind(max_price);
        }
        if let Some(bedrooms) = filters.min_bedrooms {
            qb.push(" AND bedrooms >= ").push_bind(bedrooms);
        }
        if let Some(bathrooms) = filters.min_bathrooms {
            qb.push(" AND bathrooms >= ").push_bind(bathrooms);
        }
        qb.push(" ORDER BY featured DESC, created_at DESC");

        qb.build_query_as::<Listing>().fetch_all(pool).await
    }

    /// Featured listings for the marketplace homepage.
    pub async fn list_featured(pool: &PgPool, limit: i64) -> Result<Vec<Listing>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM listings \
             WHERE featured = TRUE AND status = 'available' \
             ORDER BY created_at DESC LIMIT $1"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Fetch up to `limit` listings by id for side-by-side comparison.
    pub async fn list_by_ids(
        pool: &PgPool,
        listing_ids: &[String],
        limit: i64,
    ) -> Result<Vec<Listing>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM listings WHERE listing_id = ANY($1) LIMIT $2"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(listing_ids)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Archive a listing, scoped by agency. Returns the updated row.
    pub async fn archive(
        pool: &PgPool,
        listing_id: &str,
        agency_id: &str,
    ) -> Result<Option<Listing>, sqlx::Error> {
        let query = format!(
            "UPDATE listings SET status = 'archived', updated_at = NOW() \
             WHERE listing_id = $1 AND agency_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(listing_id)
            .bind(agency_id)
            .fetch_optional(pool)
            .await
    }

    /// Flip the featured flag, scoped by agency. Returns the updated row.
    pub async fn toggle_featured(
        pool: &PgPool,
        listing_id: &str,
        agency_id: &str,
    ) -> Result<Option<Listing>, sqlx::Error> {
        let query = format!(
            "UPDATE listings SET featured = NOT featured, updated_at = NOW() \
             WHERE listing_id = $1 AND agency_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(listing_id)
            .bind(agency_id)
            .fetch_optional(pool)
            .await
    }

    /// Number of listings a realtor currently holds; drives tier quotas.
    pub async fn count_for_realtor(
        pool: &PgPool,
        agency_id: &str,
        realtor_id: &str,
    ) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM listings WHERE agency_id = $1 AND realtor_id = $2",
        )
        .bind(agency_id)
        .bind(realtor_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// Admin listing with optional filters, newest first, capped.
    pub async fn list_admin(
        pool: &PgPool,
        agency_id: Option<&str>,
        realtor_id: Option<&str>,
        status: Option<&str>,
        search: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Listing>, sqlx::Error> {
        let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM listings WHERE 1 = 1"));
        if let Some(agency_id) = agency_id {
            qb.push(" AND agency_id = ").push_bind(agency_id);
        }
        if let Some(realtor_id) = realtor_id {
            qb.push(" AND realtor_id = ").push_bind(realtor_id);
        }
        if let Some(status) = status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(search) = search {
            let pattern = format!("%{search}%");
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR listing_id ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit);

        qb.build_query_as::<Listing>().fetch_all(pool).await
    }
}
