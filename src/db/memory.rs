//! In-memory store used when no database is configured, and by tests.

use super::store::{ProfileScope, SavedUser, Store, StoreError};
use crate::filters::{CompanyQuery, IpoQuery};
use crate::models::{
    Company, CompanyFields, Ipo, IpoFields, IpoRecord, NewUser, ProfileRecord, User, UserProfile,
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct Tables {
    companies: BTreeMap<i64, Company>,
    ipos: BTreeMap<i64, Ipo>,
    users: BTreeMap<i64, User>,
    /// Profiles keyed by owning user id.
    profiles: BTreeMap<i64, UserProfile>,
    next_company_id: i64,
    next_ipo_id: i64,
    next_user_id: i64,
    next_profile_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Tables {
    fn company_name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.companies
            .values()
            .any(|c| c.name == name && Some(c.id) != except)
    }

    fn api_key_taken(&self, api_key: &str) -> bool {
        self.profiles.values().any(|p| p.api_key == api_key)
    }

    fn ipo_record(&self, ipo: &Ipo) -> Result<IpoRecord, StoreError> {
        let company = self
            .companies
            .get(&ipo.fields.company_id)
            .ok_or_else(|| StoreError::Database(format!("IPO {} has no company", ipo.id)))?;
        Ok(IpoRecord {
            ipo: ipo.clone(),
            company_name: company.name.clone(),
            company_logo: company.logo.clone(),
        })
    }

    fn profile_record(&self, profile: &UserProfile) -> Result<ProfileRecord, StoreError> {
        let user = self.users.get(&profile.user_id).ok_or_else(|| {
            StoreError::Database(format!("profile {} has no user", profile.id))
        })?;
        Ok(ProfileRecord {
            profile: profile.clone(),
            user: user.clone(),
        })
    }

    fn insert_profile(&mut self, user_id: i64, api_key: &str) -> Result<UserProfile, StoreError> {
        if self.api_key_taken(api_key) {
            return Err(StoreError::duplicate_api_key());
        }
        let profile = UserProfile {
            id: next_id(&mut self.next_profile_id),
            user_id,
            phone: None,
            is_client: false,
            api_key: api_key.to_string(),
        };
        self.profiles.insert(user_id, profile.clone());
        Ok(profile)
    }

    fn check_company_exists(&self, company_id: i64) -> Result<(), StoreError> {
        if self.companies.contains_key(&company_id) {
            Ok(())
        } else {
            Err(StoreError::InvalidReference {
                field: "company",
                id: company_id,
            })
        }
    }
}

/// Store backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_companies(&self, query: &CompanyQuery) -> Result<Vec<Company>, StoreError> {
        let tables = self.tables.read();
        let mut companies: Vec<Company> = tables
            .companies
            .values()
            .filter(|c| query.matches(c))
            .cloned()
            .collect();
        companies.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(companies)
    }

    async fn get_company(&self, id: i64) -> Result<Option<Company>, StoreError> {
        Ok(self.tables.read().companies.get(&id).cloned())
    }

    async fn create_company(&self, fields: CompanyFields) -> Result<Company, StoreError> {
        let mut tables = self.tables.write();
        if tables.company_name_taken(&fields.name, None) {
            return Err(StoreError::duplicate_company_name());
        }
        let now = Utc::now();
        let company = Company {
            id: next_id(&mut tables.next_company_id),
            name: fields.name,
            logo: fields.logo,
            created_at: now,
            updated_at: now,
        };
        tables.companies.insert(company.id, company.clone());
        Ok(company)
    }

    async fn update_company(
        &self,
        id: i64,
        fields: CompanyFields,
    ) -> Result<Option<Company>, StoreError> {
        let mut tables = self.tables.write();
        if !tables.companies.contains_key(&id) {
            return Ok(None);
        }
        if tables.company_name_taken(&fields.name, Some(id)) {
            return Err(StoreError::duplicate_company_name());
        }
        let Some(company) = tables.companies.get_mut(&id) else {
            return Ok(None);
        };
        company.name = fields.name;
        company.logo = fields.logo;
        company.updated_at = Utc::now();
        Ok(Some(company.clone()))
    }

    async fn delete_company(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        if tables.companies.remove(&id).is_none() {
            return Ok(false);
        }
        tables.ipos.retain(|_, ipo| ipo.fields.company_id != id);
        Ok(true)
    }

    async fn list_ipos(
        &self,
        query: &IpoQuery,
        today: NaiveDate,
    ) -> Result<Vec<IpoRecord>, StoreError> {
        let tables = self.tables.read();
        let mut records = Vec::new();
        for ipo in tables.ipos.values() {
            let record = tables.ipo_record(ipo)?;
            if query.matches(&record, today) {
                records.push(record);
            }
        }
        query.sort(&mut records);
        Ok(records)
    }

    async fn get_ipo(&self, id: i64) -> Result<Option<IpoRecord>, StoreError> {
        let tables = self.tables.read();
        tables.ipos.get(&id).map(|ipo| tables.ipo_record(ipo)).transpose()
    }

    async fn create_ipo(&self, fields: IpoFields) -> Result<IpoRecord, StoreError> {
        let mut tables = self.tables.write();
        tables.check_company_exists(fields.company_id)?;
        let now = Utc::now();
        let ipo = Ipo {
            id: next_id(&mut tables.next_ipo_id),
            fields,
            created_at: now,
            updated_at: now,
        };
        tables.ipos.insert(ipo.id, ipo.clone());
        tables.ipo_record(&ipo)
    }

    async fn update_ipo(
        &self,
        id: i64,
        fields: IpoFields,
    ) -> Result<Option<IpoRecord>, StoreError> {
        let mut tables = self.tables.write();
        if !tables.ipos.contains_key(&id) {
            return Ok(None);
        }
        tables.check_company_exists(fields.company_id)?;
        let Some(ipo) = tables.ipos.get_mut(&id) else {
            return Ok(None);
        };
        ipo.fields = fields;
        ipo.updated_at = Utc::now();
        let ipo = ipo.clone();
        tables.ipo_record(&ipo).map(Some)
    }

    async fn delete_ipo(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.write().ipos.remove(&id).is_some())
    }

    async fn create_user_with_profile(
        &self,
        user: NewUser,
        api_key: &str,
    ) -> Result<ProfileRecord, StoreError> {
        let mut tables = self.tables.write();
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::duplicate_username());
        }
        // Checked before any insert so a key collision leaves no orphan user.
        if tables.api_key_taken(api_key) {
            return Err(StoreError::duplicate_api_key());
        }
        let user = User {
            id: next_id(&mut tables.next_user_id),
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_staff: user.is_staff,
            date_joined: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        let profile = tables.insert_profile(user.id, api_key)?;
        Ok(ProfileRecord { profile, user })
    }

    async fn save_user(
        &self,
        user: &User,
        replacement_key: &str,
    ) -> Result<SavedUser, StoreError> {
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&user.id) {
            return Err(StoreError::NotFound(format!("user {}", user.id)));
        }
        if tables
            .users
            .values()
            .any(|u| u.username == user.username && u.id != user.id)
        {
            return Err(StoreError::duplicate_username());
        }
        let existing = tables.profiles.get(&user.id).cloned();
        let (profile, profile_recreated) = match existing {
            Some(profile) => (profile, false),
            None => (tables.insert_profile(user.id, replacement_key)?, true),
        };
        let stored = tables
            .users
            .get_mut(&user.id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user.id)))?;
        stored.username = user.username.clone();
        stored.email = user.email.clone();
        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.is_staff = user.is_staff;
        Ok(SavedUser {
            record: ProfileRecord {
                profile,
                user: stored.clone(),
            },
            profile_recreated,
        })
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_profile_by_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<ProfileRecord>, StoreError> {
        let tables = self.tables.read();
        tables
            .profiles
            .values()
            .find(|p| p.api_key == api_key)
            .map(|p| tables.profile_record(p))
            .transpose()
    }

    async fn find_profile_by_user(
        &self,
        user_id: i64,
    ) -> Result<Option<ProfileRecord>, StoreError> {
        let tables = self.tables.read();
        tables
            .profiles
            .get(&user_id)
            .map(|p| tables.profile_record(p))
            .transpose()
    }

    async fn list_profiles(&self, scope: ProfileScope) -> Result<Vec<ProfileRecord>, StoreError> {
        let tables = self.tables.read();
        let mut records = tables
            .profiles
            .values()
            .filter(|p| scope.permits(p.user_id))
            .map(|p| tables.profile_record(p))
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by_key(|r| r.profile.id);
        Ok(records)
    }

    async fn get_profile(
        &self,
        id: i64,
        scope: ProfileScope,
    ) -> Result<Option<ProfileRecord>, StoreError> {
        let tables = self.tables.read();
        tables
            .profiles
            .values()
            .find(|p| p.id == id && scope.permits(p.user_id))
            .map(|p| tables.profile_record(p))
            .transpose()
    }

    async fn set_client_access(
        &self,
        user_id: i64,
        is_client: bool,
    ) -> Result<ProfileRecord, StoreError> {
        let mut tables = self.tables.write();
        let profile = tables
            .profiles
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("profile for user {user_id}")))?;
        profile.is_client = is_client;
        let profile = profile.clone();
        tables.profile_record(&profile)
    }

    async fn set_phone(
        &self,
        user_id: i64,
        phone: Option<&str>,
    ) -> Result<ProfileRecord, StoreError> {
        let mut tables = self.tables.write();
        let profile = tables
            .profiles
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("profile for user {user_id}")))?;
        profile.phone = phone.map(str::to_string);
        let profile = profile.clone();
        tables.profile_record(&profile)
    }

    async fn delete_profile(&self, user_id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.write().profiles.remove(&user_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn company(name: &str) -> CompanyFields {
        CompanyFields {
            name: name.to_string(),
            logo: None,
        }
    }

    fn ipo_fields(company_id: i64, open: NaiveDate) -> IpoFields {
        IpoFields {
            company_id,
            price_band_min: dec!(100.00),
            price_band_max: dec!(120.00),
            open_date: open,
            close_date: open,
            listing_date: None,
            issue_size: dec!(1000.00),
            issue_type: "Fresh Issue".to_string(),
            status: Default::default(),
            ipo_price: None,
            listing_price: None,
            current_market_price: None,
            rhp_document: None,
            drhp_document: None,
        }
    }

    fn user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            ..Default::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[tokio::test]
    async fn test_company_name_is_unique() {
        let store = MemoryStore::new();
        store.create_company(company("Acme")).await.unwrap();
        let err = store.create_company(company("Acme")).await.unwrap_err();
        assert!(err.is_conflict_on("name"));
    }

    #[tokio::test]
    async fn test_company_rename_to_existing_name_fails() {
        let store = MemoryStore::new();
        store.create_company(company("Acme")).await.unwrap();
        let beta = store.create_company(company("Beta")).await.unwrap();

        let err = store
            .update_company(beta.id, company("Acme"))
            .await
            .unwrap_err();
        assert!(err.is_conflict_on("name"));

        // Keeping its own name is fine.
        let same = store.update_company(beta.id, company("Beta")).await.unwrap();
        assert!(same.is_some());
    }

    #[tokio::test]
    async fn test_companies_listed_by_name() {
        let store = MemoryStore::new();
        for name in ["Zeta", "Alpha", "Mu"] {
            store.create_company(company(name)).await.unwrap();
        }
        let names: Vec<String> = store
            .list_companies(&CompanyQuery::default())
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Mu", "Zeta"]);
    }

    #[tokio::test]
    async fn test_delete_company_cascades_to_ipos() {
        let store = MemoryStore::new();
        let acme = store.create_company(company("Acme")).await.unwrap();
        let beta = store.create_company(company("Beta")).await.unwrap();
        let doomed = store.create_ipo(ipo_fields(acme.id, today())).await.unwrap();
        let kept = store.create_ipo(ipo_fields(beta.id, today())).await.unwrap();

        assert!(store.delete_company(acme.id).await.unwrap());
        assert!(store.get_ipo(doomed.ipo.id).await.unwrap().is_none());
        assert!(store.get_ipo(kept.ipo.id).await.unwrap().is_some());
        assert!(!store.delete_company(acme.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_ipo_requires_existing_company() {
        let store = MemoryStore::new();
        let err = store.create_ipo(ipo_fields(42, today())).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidReference { id: 42, .. }));
    }

    #[tokio::test]
    async fn test_ipo_record_reflects_company_rename() {
        let store = MemoryStore::new();
        let acme = store.create_company(company("Acme")).await.unwrap();
        let ipo = store.create_ipo(ipo_fields(acme.id, today())).await.unwrap();
        assert_eq!(ipo.company_name, "Acme");

        store
            .update_company(acme.id, company("Acme Holdings"))
            .await
            .unwrap();
        let fetched = store.get_ipo(ipo.ipo.id).await.unwrap().unwrap();
        assert_eq!(fetched.company_name, "Acme Holdings");
    }

    #[tokio::test]
    async fn test_update_missing_ipo_returns_none() {
        let store = MemoryStore::new();
        let acme = store.create_company(company("Acme")).await.unwrap();
        let result = store
            .update_ipo(99, ipo_fields(acme.id, today()))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_user_creation_provisions_profile() {
        let store = MemoryStore::new();
        let record = store
            .create_user_with_profile(user("asha"), "k1")
            .await
            .unwrap();
        assert_eq!(record.profile.user_id, record.user.id);
        assert!(!record.profile.is_client);
        assert_eq!(record.profile.api_key, "k1");
    }

    #[tokio::test]
    async fn test_duplicate_api_key_leaves_no_orphan_user() {
        let store = MemoryStore::new();
        store
            .create_user_with_profile(user("asha"), "same")
            .await
            .unwrap();
        let err = store
            .create_user_with_profile(user("ravi"), "same")
            .await
            .unwrap_err();
        assert!(err.is_conflict_on("api_key"));
        assert!(store.find_user_by_username("ravi").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = MemoryStore::new();
        store.create_user_with_profile(user("asha"), "k1").await.unwrap();
        let err = store
            .create_user_with_profile(user("asha"), "k2")
            .await
            .unwrap_err();
        assert!(err.is_conflict_on("username"));
    }

    #[tokio::test]
    async fn test_save_user_keeps_existing_profile() {
        let store = MemoryStore::new();
        let record = store.create_user_with_profile(user("asha"), "k1").await.unwrap();
        let mut updated = record.user.clone();
        updated.email = "asha@example.com".to_string();

        let saved = store.save_user(&updated, "unused").await.unwrap();
        assert!(!saved.profile_recreated);
        assert_eq!(saved.record.profile.api_key, "k1");
        assert_eq!(saved.record.user.email, "asha@example.com");
    }

    #[tokio::test]
    async fn test_save_user_recreates_missing_profile() {
        let store = MemoryStore::new();
        let record = store.create_user_with_profile(user("asha"), "k1").await.unwrap();
        assert!(store.delete_profile(record.user.id).await.unwrap());

        let saved = store.save_user(&record.user, "k2").await.unwrap();
        assert!(saved.profile_recreated);
        assert_eq!(saved.record.profile.api_key, "k2");
        assert_ne!(saved.record.profile.id, record.profile.id);
        assert!(store.find_profile_by_api_key("k1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_profile_scope() {
        let store = MemoryStore::new();
        let asha = store.create_user_with_profile(user("asha"), "k1").await.unwrap();
        let ravi = store.create_user_with_profile(user("ravi"), "k2").await.unwrap();

        let all = store.list_profiles(ProfileScope::All).await.unwrap();
        assert_eq!(all.len(), 2);

        let own = store
            .list_profiles(ProfileScope::Owner(asha.user.id))
            .await
            .unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].user.username, "asha");

        let hidden = store
            .get_profile(ravi.profile.id, ProfileScope::Owner(asha.user.id))
            .await
            .unwrap();
        assert!(hidden.is_none());
    }

    #[tokio::test]
    async fn test_set_client_access() {
        let store = MemoryStore::new();
        let record = store.create_user_with_profile(user("asha"), "k1").await.unwrap();
        let updated = store.set_client_access(record.user.id, true).await.unwrap();
        assert!(updated.profile.is_client);
        let err = store.set_client_access(999, true).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_set_phone_and_clear() {
        let store = MemoryStore::new();
        let record = store.create_user_with_profile(user("asha"), "k1").await.unwrap();
        assert!(record.profile.phone.is_none());

        let updated = store
            .set_phone(record.user.id, Some("+919800000000"))
            .await
            .unwrap();
        assert_eq!(updated.profile.phone.as_deref(), Some("+919800000000"));
        assert_eq!(updated.profile.api_key, "k1");

        let found = store.find_profile_by_user(record.user.id).await.unwrap().unwrap();
        assert_eq!(found.profile.phone.as_deref(), Some("+919800000000"));

        let cleared = store.set_phone(record.user.id, None).await.unwrap();
        assert!(cleared.profile.phone.is_none());

        let err = store.set_phone(999, Some("123")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
