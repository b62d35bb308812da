//! Repository for the `profiles` table.

use sqlx::{PgPool, QueryBuilder};

use crate::models::profile::{
    AgencyCard, NewProfile, Profile, ProfileAdminUpdate, ProfileBrandingUpdate, RealtorCard,
};
use keyfront_core::types::DbId;

/// Column list for `profiles` queries.
const COLUMNS: &str = "id, role, agency_id, realtor_id, profile_email, password_hash, \
     display_name, phone, whatsapp, logo_url, primary_color, branding_tier, status, \
     created_at, updated_at";

/// Provides CRUD and lookup operations for portal profiles.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Resolve a login identifier: an agency id, a profile email, or a
    /// realtor id. Only active profiles may log in.
    pub async fn find_login(
        pool: &PgPool,
        identifier: &str,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM profiles \
             WHERE (agency_id = $1 OR profile_email = $1 OR realtor_id = $1) \
               AND status = 'active' \
             LIMIT 1"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(identifier)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Public storefront card for an agency (its agency-admin profile, or
    /// failing that any member profile).
    pub async fn find_agency_card(
        pool: &PgPool,
        agency_id: &str,
    ) -> Result<Option<AgencyCard>, sqlx::Error> {
        sqlx::query_as::<_, AgencyCard>(
            "SELECT agency_id, display_name, logo_url, primary_color, phone, whatsapp, \
             profile_email \
             FROM profiles WHERE agency_id = $1 \
             ORDER BY (role = 'agency_admin') DESC, id ASC LIMIT 1",
        )
        .bind(agency_id)
        .fetch_optional(pool)
        .await
    }

    /// Public contact card for a specific realtor.
    pub async fn find_realtor_card(
        pool: &PgPool,
        agency_id: &str,
        realtor_id: &str,
    ) -> Result<Option<RealtorCard>, sqlx::Error> {
        sqlx::query_as::<_, RealtorCard>(
            "SELECT display_name, phone, whatsapp, logo_url \
             FROM profiles WHERE agency_id = $1 AND realtor_id = $2 LIMIT 1",
        )
        .bind(agency_id)
        .bind(realtor_id)
        .fetch_optional(pool)
        .await
    }

    /// Notification recipient address for an assigned realtor.
    pub async fn find_email(
        pool: &PgPool,
        agency_id: &str,
        realtor_id: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        let email: Option<Option<String>> = sqlx::query_scalar(
            "SELECT profile_email FROM profiles \
             WHERE agency_id = $1 AND realtor_id = $2 LIMIT 1",
        )
        .bind(agency_id)
        .bind(realtor_id)
        .fetch_optional(pool)
        .await?;
        Ok(email.flatten())
    }

    /// Insert a new profile and return the stored row.
    pub async fn insert(pool: &PgPool, input: &NewProfile) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles \
             (role, agency_id, realtor_id, profile_email, password_hash, display_name, \
              phone, whatsapp, branding_tier) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(&input.role)
            .bind(&input.agency_id)
            .bind(&input.realtor_id)
            .bind(&input.profile_email)
            .bind(&input.password_hash)
            .bind(&input.display_name)
            .bind(&input.phone)
            .bind(&input.whatsapp)
            .bind(&input.branding_tier)
            .fetch_one(pool)
            .await
    }

    /// Apply a realtor's own branding update. `None` fields are untouched.
    pub async fn update_branding(
        pool: &PgPool,
        id: DbId,
        update: &ProfileBrandingUpdate,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE profiles SET \
               display_name = COALESCE($2, display_name), \
               phone = COALESCE($3, phone), \
               whatsapp = COALESCE($4, whatsapp), \
               logo_url = COALESCE($5, logo_url), \
               primary_color = COALESCE($6, primary_color), \
               updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(&update.display_name)
            .bind(&update.phone)
            .bind(&update.whatsapp)
            .bind(&update.logo_url)
            .bind(&update.primary_color)
            .fetch_optional(pool)
            .await
    }

    /// Apply an admin update to any profile. `None` fields are untouched.
    pub async fn update_admin(
        pool: &PgPool,
        id: DbId,
        update: &ProfileAdminUpdate,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE profiles SET \
               status = COALESCE($2, status), \
               branding_tier = COALESCE($3, branding_tier), \
               display_name = COALESCE($4, display_name), \
               phone = COALESCE($5, phone), \
               whatsapp = COALESCE($6, whatsapp), \
               updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(&update.status)
            .bind(&update.branding_tier)
            .bind(&update.display_name)
            .bind(&update.phone)
            .bind(&update.whatsapp)
            .fetch_optional(pool)
            .await
    }

    /// Replace the password hash for a specific agency member.
    pub async fn reset_password_by_ids(
        pool: &PgPool,
        agency_id: &str,
        realtor_id: &str,
        password_hash: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE profiles SET password_hash = $3, updated_at = NOW() \
             WHERE agency_id = $1 AND realtor_id = $2",
        )
        .bind(agency_id)
        .bind(realtor_id)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Replace the password hash for the profile with the given email.
    pub async fn reset_password_by_email(
        pool: &PgPool,
        profile_email: &str,
        password_hash: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE profiles SET password_hash = $2, updated_at = NOW() \
             WHERE profile_email = $1",
        )
        .bind(profile_email)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Admin listing with optional substring search and status filter,
    /// newest first, paged.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Profile>, sqlx::Error> {
        let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM profiles WHERE 1 = 1"));
        if let Some(search) = search {
            let pattern = format!("%{search}%");
            qb.push(" AND (agency_id ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR display_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR profile_email ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(status) = status {
            qb.push(" AND status = ").push_bind(status);
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        qb.build_query_as::<Profile>().fetch_all(pool).await
    }
}
