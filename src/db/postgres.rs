//! PostgreSQL store.

use super::pool::DatabasePool;
use super::schema::{CompanyRow, IpoRow, ProfileRow, UserRow};
use super::store::{ProfileScope, SavedUser, Store, StoreError};
use crate::filters::{CompanyQuery, IpoOrdering, IpoQuery, IpoSortField};
use crate::models::{
    Company, CompanyFields, IpoFields, IpoRecord, NewUser, ProfileRecord, User, UserProfile,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Postgres, QueryBuilder};
use tracing::debug;

const IPO_COLUMNS: &str = "i.id, i.company_id, i.price_band_min, i.price_band_max, \
    i.open_date, i.close_date, i.listing_date, i.issue_size, i.issue_type, i.status, \
    i.ipo_price, i.listing_price, i.current_market_price, i.rhp_document, i.drhp_document, \
    i.created_at, i.updated_at, c.name AS company_name, c.logo AS company_logo";

const PROFILE_SELECT: &str = "SELECT p.id, p.user_id, p.phone, p.is_client, p.api_key, \
    u.username, u.email, u.first_name, u.last_name, u.is_staff, u.date_joined \
    FROM user_profiles p JOIN users u ON u.id = p.user_id";

const COMPANY_COLUMNS: &str = "id, name, logo, created_at, updated_at";

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, is_staff, date_joined";

/// `(id, user_id, phone, is_client, api_key)` as returned by profile writes.
type ProfileTuple = (i64, i64, Option<String>, bool, String);

/// Store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    db: DatabasePool,
}

impl PgStore {
    /// Creates a store over an established pool.
    #[must_use]
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }

    async fn profile_where(
        &self,
        clause: &str,
        id: i64,
    ) -> Result<Option<ProfileRecord>, StoreError> {
        let sql = format!("{PROFILE_SELECT} WHERE {clause}");
        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(map_sqlx)?;
        Ok(row.map(ProfileRecord::from))
    }
}

fn map_sqlx(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error()
        && db_err.is_unique_violation()
    {
        return match db_err.constraint() {
            Some("companies_name_key") => StoreError::duplicate_company_name(),
            Some("users_username_key") => StoreError::duplicate_username(),
            Some("user_profiles_api_key_key") => StoreError::duplicate_api_key(),
            other => StoreError::Conflict {
                field: "non_field_errors",
                message: format!("unique constraint {} violated", other.unwrap_or("unknown")),
            },
        };
    }
    StoreError::Database(err.to_string())
}

fn map_ipo_write(err: sqlx::Error, company_id: i64) -> StoreError {
    if let Some(db_err) = err.as_database_error()
        && db_err.is_foreign_key_violation()
    {
        return StoreError::InvalidReference {
            field: "company",
            id: company_id,
        };
    }
    map_sqlx(err)
}

/// Escapes `LIKE` wildcards so search terms match literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn order_column(field: IpoSortField) -> &'static str {
    match field {
        IpoSortField::OpenDate => "i.open_date",
        IpoSortField::CloseDate => "i.close_date",
        IpoSortField::ListingDate => "i.listing_date",
        IpoSortField::IssueSize => "i.issue_size",
    }
}

fn push_ipo_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &IpoQuery, today: NaiveDate) {
    qb.push(" WHERE TRUE");
    if let Some(status) = query.status {
        qb.push(" AND i.status = ").push_bind(status.as_str());
    }
    if let Some(company) = query.company {
        qb.push(" AND i.company_id = ").push_bind(company);
    }
    if query.upcoming {
        qb.push(" AND i.open_date >= ").push_bind(today);
    }
    if query.open_now {
        qb.push(" AND i.open_date <= ")
            .push_bind(today)
            .push(" AND i.close_date >= ")
            .push_bind(today);
    }
    for term in &query.search {
        let pattern = format!("%{}%", escape_like(term));
        qb.push(" AND (c.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR i.issue_type ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn push_ipo_ordering(qb: &mut QueryBuilder<'_, Postgres>, ordering: &[IpoOrdering]) {
    qb.push(" ORDER BY ");
    for key in ordering {
        qb.push(order_column(key.field))
            .push(if key.descending { " DESC" } else { " ASC" })
            .push(" NULLS LAST, ");
    }
    qb.push("i.id ASC");
}

fn push_ipo_values(qb: &mut QueryBuilder<'_, Postgres>, fields: IpoFields) {
    let mut values = qb.separated(", ");
    values
        .push_bind(fields.company_id)
        .push_bind(fields.price_band_min)
        .push_bind(fields.price_band_max)
        .push_bind(fields.open_date)
        .push_bind(fields.close_date)
        .push_bind(fields.listing_date)
        .push_bind(fields.issue_size)
        .push_bind(fields.issue_type)
        .push_bind(fields.status.as_str())
        .push_bind(fields.ipo_price)
        .push_bind(fields.listing_price)
        .push_bind(fields.current_market_price)
        .push_bind(fields.rhp_document)
        .push_bind(fields.drhp_document);
}

const IPO_WRITE_COLUMNS: &str = "company_id, price_band_min, price_band_max, open_date, \
    close_date, listing_date, issue_size, issue_type, status, ipo_price, listing_price, \
    current_market_price, rhp_document, drhp_document";

#[async_trait]
impl Store for PgStore {
    async fn list_companies(&self, query: &CompanyQuery) -> Result<Vec<Company>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE TRUE"
        ));
        for term in &query.search {
            qb.push(" AND name ILIKE ")
                .push_bind(format!("%{}%", escape_like(term)));
        }
        qb.push(" ORDER BY name ASC, id ASC");

        let rows: Vec<CompanyRow> = qb
            .build_query_as()
            .fetch_all(self.db.pool())
            .await
            .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(Company::from).collect())
    }

    async fn get_company(&self, id: i64) -> Result<Option<Company>, StoreError> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1");
        let row: Option<CompanyRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(map_sqlx)?;
        Ok(row.map(Company::from))
    }

    async fn create_company(&self, fields: CompanyFields) -> Result<Company, StoreError> {
        let sql = format!(
            "INSERT INTO companies (name, logo) VALUES ($1, $2) RETURNING {COMPANY_COLUMNS}"
        );
        let row: CompanyRow = sqlx::query_as(&sql)
            .bind(fields.name)
            .bind(fields.logo)
            .fetch_one(self.db.pool())
            .await
            .map_err(map_sqlx)?;
        Ok(row.into())
    }

    async fn update_company(
        &self,
        id: i64,
        fields: CompanyFields,
    ) -> Result<Option<Company>, StoreError> {
        let sql = format!(
            "UPDATE companies SET name = $1, logo = $2, updated_at = NOW() \
             WHERE id = $3 RETURNING {COMPANY_COLUMNS}"
        );
        let row: Option<CompanyRow> = sqlx::query_as(&sql)
            .bind(fields.name)
            .bind(fields.logo)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(map_sqlx)?;
        Ok(row.map(Company::from))
    }

    async fn delete_company(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_ipos(
        &self,
        query: &IpoQuery,
        today: NaiveDate,
    ) -> Result<Vec<IpoRecord>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {IPO_COLUMNS} FROM ipos i JOIN companies c ON c.id = i.company_id"
        ));
        push_ipo_filters(&mut qb, query, today);
        push_ipo_ordering(&mut qb, &query.ordering);
        debug!(sql = qb.sql(), "listing ipos");

        let rows: Vec<IpoRow> = qb
            .build_query_as()
            .fetch_all(self.db.pool())
            .await
            .map_err(map_sqlx)?;
        rows.into_iter().map(IpoRecord::try_from).collect()
    }

    async fn get_ipo(&self, id: i64) -> Result<Option<IpoRecord>, StoreError> {
        let sql = format!(
            "SELECT {IPO_COLUMNS} FROM ipos i JOIN companies c ON c.id = i.company_id \
             WHERE i.id = $1"
        );
        let row: Option<IpoRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(map_sqlx)?;
        row.map(IpoRecord::try_from).transpose()
    }

    async fn create_ipo(&self, fields: IpoFields) -> Result<IpoRecord, StoreError> {
        let company_id = fields.company_id;
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "WITH i AS (INSERT INTO ipos ({IPO_WRITE_COLUMNS}) VALUES ("
        ));
        push_ipo_values(&mut qb, fields);
        qb.push(format!(
            ") RETURNING *) SELECT {IPO_COLUMNS} FROM i JOIN companies c ON c.id = i.company_id"
        ));

        let row: IpoRow = qb
            .build_query_as()
            .fetch_one(self.db.pool())
            .await
            .map_err(|e| map_ipo_write(e, company_id))?;
        row.try_into()
    }

    async fn update_ipo(
        &self,
        id: i64,
        fields: IpoFields,
    ) -> Result<Option<IpoRecord>, StoreError> {
        let company_id = fields.company_id;
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "WITH i AS (UPDATE ipos SET ({IPO_WRITE_COLUMNS}) = ROW("
        ));
        push_ipo_values(&mut qb, fields);
        qb.push("), updated_at = NOW() WHERE id = ")
            .push_bind(id)
            .push(format!(
                " RETURNING *) SELECT {IPO_COLUMNS} FROM i JOIN companies c ON c.id = i.company_id"
            ));

        let row: Option<IpoRow> = qb
            .build_query_as()
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| map_ipo_write(e, company_id))?;
        row.map(IpoRecord::try_from).transpose()
    }

    async fn delete_ipo(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM ipos WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_user_with_profile(
        &self,
        user: NewUser,
        api_key: &str,
    ) -> Result<ProfileRecord, StoreError> {
        let mut tx = self.db.pool().begin().await.map_err(map_sqlx)?;

        let sql = format!(
            "INSERT INTO users (username, email, first_name, last_name, is_staff) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let user_row: UserRow = sqlx::query_as(&sql)
            .bind(user.username)
            .bind(user.email)
            .bind(user.first_name)
            .bind(user.last_name)
            .bind(user.is_staff)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx)?;

        let profile: ProfileTuple = sqlx::query_as(
            "INSERT INTO user_profiles (user_id, api_key) VALUES ($1, $2) \
             RETURNING id, user_id, phone, is_client, api_key",
        )
        .bind(user_row.id)
        .bind(api_key)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        tx.commit().await.map_err(map_sqlx)?;

        Ok(profile_record(profile, user_row.into()))
    }

    async fn save_user(
        &self,
        user: &User,
        replacement_key: &str,
    ) -> Result<SavedUser, StoreError> {
        let mut tx = self.db.pool().begin().await.map_err(map_sqlx)?;

        let sql = format!(
            "UPDATE users SET username = $1, email = $2, first_name = $3, last_name = $4, \
             is_staff = $5 WHERE id = $6 RETURNING {USER_COLUMNS}"
        );
        let user_row: UserRow = sqlx::query_as(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.is_staff)
            .bind(user.id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx)?
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user.id)))?;

        let existing: Option<ProfileTuple> = sqlx::query_as(
            "SELECT id, user_id, phone, is_client, api_key FROM user_profiles \
             WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user.id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        let (profile, profile_recreated) = match existing {
            Some(profile) => (profile, false),
            None => {
                let profile: ProfileTuple = sqlx::query_as(
                    "INSERT INTO user_profiles (user_id, api_key) VALUES ($1, $2) \
                     RETURNING id, user_id, phone, is_client, api_key",
                )
                .bind(user.id)
                .bind(replacement_key)
                .fetch_one(&mut *tx)
                .await
                .map_err(map_sqlx)?;
                (profile, true)
            }
        };

        tx.commit().await.map_err(map_sqlx)?;

        Ok(SavedUser {
            record: profile_record(profile, user_row.into()),
            profile_recreated,
        })
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(username)
            .fetch_optional(self.db.pool())
            .await
            .map_err(map_sqlx)?;
        Ok(row.map(User::from))
    }

    async fn find_profile_by_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<ProfileRecord>, StoreError> {
        let sql = format!("{PROFILE_SELECT} WHERE p.api_key = $1");
        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(api_key)
            .fetch_optional(self.db.pool())
            .await
            .map_err(map_sqlx)?;
        Ok(row.map(ProfileRecord::from))
    }

    async fn find_profile_by_user(
        &self,
        user_id: i64,
    ) -> Result<Option<ProfileRecord>, StoreError> {
        self.profile_where("p.user_id = $1", user_id).await
    }

    async fn list_profiles(&self, scope: ProfileScope) -> Result<Vec<ProfileRecord>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(PROFILE_SELECT);
        if let ProfileScope::Owner(user_id) = scope {
            qb.push(" WHERE p.user_id = ").push_bind(user_id);
        }
        qb.push(" ORDER BY p.id ASC");

        let rows: Vec<ProfileRow> = qb
            .build_query_as()
            .fetch_all(self.db.pool())
            .await
            .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(ProfileRecord::from).collect())
    }

    async fn get_profile(
        &self,
        id: i64,
        scope: ProfileScope,
    ) -> Result<Option<ProfileRecord>, StoreError> {
        let record = self.profile_where("p.id = $1", id).await?;
        Ok(record.filter(|r| scope.permits(r.user.id)))
    }

    async fn set_client_access(
        &self,
        user_id: i64,
        is_client: bool,
    ) -> Result<ProfileRecord, StoreError> {
        let result = sqlx::query("UPDATE user_profiles SET is_client = $1 WHERE user_id = $2")
            .bind(is_client)
            .bind(user_id)
            .execute(self.db.pool())
            .await
            .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("profile for user {user_id}")));
        }
        self.find_profile_by_user(user_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("profile for user {user_id}")))
    }

    async fn set_phone(
        &self,
        user_id: i64,
        phone: Option<&str>,
    ) -> Result<ProfileRecord, StoreError> {
        let result = sqlx::query("UPDATE user_profiles SET phone = $1 WHERE user_id = $2")
            .bind(phone)
            .bind(user_id)
            .execute(self.db.pool())
            .await
            .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("profile for user {user_id}")));
        }
        self.find_profile_by_user(user_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("profile for user {user_id}")))
    }

    async fn delete_profile(&self, user_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM user_profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}

fn profile_record(profile: ProfileTuple, user: User) -> ProfileRecord {
    let (id, user_id, phone, is_client, api_key) = profile;
    ProfileRecord {
        profile: UserProfile {
            id,
            user_id,
            phone,
            is_client,
            api_key,
        },
        user,
    }
}
