//! List filters for the IPO and company collections.
//!
//! Query-string parameters are parsed into [`IpoQuery`] / [`CompanyQuery`],
//! which every store evaluates the same way. The in-memory store uses the
//! predicates here directly; the PostgreSQL store translates the same fields
//! into SQL.

use crate::error::ApiError;
use crate::models::{Company, IpoRecord, IpoStatus, ProfileRecord};
use chrono::NaiveDate;
use serde::Deserialize;
use std::cmp::Ordering;
use utoipa::IntoParams;

/// Raw query parameters accepted by `GET /ipos/`.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IpoListParams {
    /// Exact status match.
    pub status: Option<String>,
    /// Exact company id match.
    pub company: Option<String>,
    /// Truthy to keep IPOs opening today or later.
    pub upcoming: Option<String>,
    /// Truthy to keep IPOs whose subscription window contains today.
    pub open_now: Option<String>,
    /// Terms matched against company name and issue type.
    pub search: Option<String>,
    /// Comma-separated sort keys, `-` prefix for descending.
    pub ordering: Option<String>,
}

/// Raw query parameters accepted by `GET /companies/`.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompanyListParams {
    /// Terms matched against the company name.
    pub search: Option<String>,
}

/// Sortable IPO columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpoSortField {
    /// Subscription open date.
    OpenDate,
    /// Subscription close date.
    CloseDate,
    /// Listing date (missing values sort last).
    ListingDate,
    /// Issue size.
    IssueSize,
}

impl IpoSortField {
    /// Column name as accepted in the `ordering` parameter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenDate => "open_date",
            Self::CloseDate => "close_date",
            Self::ListingDate => "listing_date",
            Self::IssueSize => "issue_size",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "open_date" => Some(Self::OpenDate),
            "close_date" => Some(Self::CloseDate),
            "listing_date" => Some(Self::ListingDate),
            "issue_size" => Some(Self::IssueSize),
            _ => None,
        }
    }
}

/// A single sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpoOrdering {
    /// Column to sort by.
    pub field: IpoSortField,
    /// Whether the sort is descending.
    pub descending: bool,
}

impl IpoOrdering {
    /// Default ordering: most recent open date first.
    pub const DEFAULT: IpoOrdering = IpoOrdering {
        field: IpoSortField::OpenDate,
        descending: true,
    };

    fn compare(self, a: &IpoRecord, b: &IpoRecord) -> Ordering {
        let (a, b) = (&a.ipo.fields, &b.ipo.fields);
        let ord = match self.field {
            IpoSortField::OpenDate => a.open_date.cmp(&b.open_date),
            IpoSortField::CloseDate => a.close_date.cmp(&b.close_date),
            IpoSortField::IssueSize => a.issue_size.cmp(&b.issue_size),
            IpoSortField::ListingDate => {
                return match (a.listing_date, b.listing_date) {
                    (Some(x), Some(y)) if self.descending => y.cmp(&x),
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
            }
        };
        if self.descending { ord.reverse() } else { ord }
    }
}

/// Parsed IPO list filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpoQuery {
    /// Exact status match.
    pub status: Option<IpoStatus>,
    /// Exact company id match.
    pub company: Option<i64>,
    /// Keep `open_date >= today`.
    pub upcoming: bool,
    /// Keep `open_date <= today <= close_date`.
    pub open_now: bool,
    /// Lowercased search terms, all of which must match.
    pub search: Vec<String>,
    /// Sort keys, never empty.
    pub ordering: Vec<IpoOrdering>,
}

impl Default for IpoQuery {
    fn default() -> Self {
        Self {
            status: None,
            company: None,
            upcoming: false,
            open_now: false,
            search: Vec::new(),
            ordering: vec![IpoOrdering::DEFAULT],
        }
    }
}

impl IpoQuery {
    /// Parses raw query parameters.
    ///
    /// # Errors
    /// Returns [`ApiError::Validation`] for an unknown status or a
    /// non-numeric company id.
    pub fn from_params(params: &IpoListParams) -> Result<Self, ApiError> {
        let status = match non_empty(params.status.as_deref()) {
            Some(raw) => Some(
                raw.parse::<IpoStatus>()
                    .map_err(|msg| ApiError::Validation(format!("status: {msg}")))?,
            ),
            None => None,
        };

        let company = match non_empty(params.company.as_deref()) {
            Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
                ApiError::Validation(format!("company: \"{raw}\" is not a valid company id."))
            })?),
            None => None,
        };

        Ok(Self {
            status,
            company,
            upcoming: is_truthy(params.upcoming.as_deref()),
            open_now: is_truthy(params.open_now.as_deref()),
            search: search_terms(params.search.as_deref()),
            ordering: parse_ordering(params.ordering.as_deref()),
        })
    }

    /// Returns true if the record passes every filter.
    #[must_use]
    pub fn matches(&self, record: &IpoRecord, today: NaiveDate) -> bool {
        let f = &record.ipo.fields;

        if self.status.is_some_and(|s| s != f.status) {
            return false;
        }
        if self.company.is_some_and(|c| c != f.company_id) {
            return false;
        }
        if self.upcoming && f.open_date < today {
            return false;
        }
        if self.open_now && !(f.open_date <= today && f.close_date >= today) {
            return false;
        }

        let name = record.company_name.to_lowercase();
        let issue_type = f.issue_type.to_lowercase();
        self.search
            .iter()
            .all(|term| name.contains(term.as_str()) || issue_type.contains(term.as_str()))
    }

    /// Sorts records by the requested keys, then by id.
    pub fn sort(&self, records: &mut [IpoRecord]) {
        records.sort_by(|a, b| {
            self.ordering
                .iter()
                .map(|o| o.compare(a, b))
                .find(|ord| ord.is_ne())
                .unwrap_or_else(|| a.ipo.id.cmp(&b.ipo.id))
        });
    }
}

/// Parsed company list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyQuery {
    /// Lowercased search terms, all of which must occur in the name.
    pub search: Vec<String>,
}

impl CompanyQuery {
    /// Parses raw query parameters.
    #[must_use]
    pub fn from_params(params: &CompanyListParams) -> Self {
        Self {
            search: search_terms(params.search.as_deref()),
        }
    }

    /// Returns true if the company passes the filter.
    #[must_use]
    pub fn matches(&self, company: &Company) -> bool {
        let name = company.name.to_lowercase();
        self.search.iter().all(|term| name.contains(term.as_str()))
    }
}

/// Profile filter used by account administration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileQuery {
    /// Required value of the client gate, if any.
    pub is_client: Option<bool>,
    /// Lowercased terms, each of which must occur in the username, email
    /// or phone.
    pub search: Vec<String>,
}

impl ProfileQuery {
    /// Builds a filter from an optional client flag and raw search text.
    #[must_use]
    pub fn new(is_client: Option<bool>, search: Option<&str>) -> Self {
        Self {
            is_client,
            search: search_terms(search),
        }
    }

    /// Returns true if the profile passes the filter.
    #[must_use]
    pub fn matches(&self, record: &ProfileRecord) -> bool {
        if let Some(is_client) = self.is_client
            && record.profile.is_client != is_client
        {
            return false;
        }

        let haystacks = [
            record.user.username.to_lowercase(),
            record.user.email.to_lowercase(),
            record.profile.phone.as_deref().unwrap_or_default().to_lowercase(),
        ];
        self.search
            .iter()
            .all(|term| haystacks.iter().any(|h| h.contains(term.as_str())))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Interprets a boolean-ish query value; anything unrecognised is false.
#[must_use]
pub fn is_truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("true" | "1" | "yes" | "on")
    )
}

/// Splits a search string on whitespace and commas into lowercase terms.
#[must_use]
pub fn search_terms(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn parse_ordering(value: Option<&str>) -> Vec<IpoOrdering> {
    let ordering: Vec<IpoOrdering> = value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter_map(|key| {
            let (descending, name) = match key.strip_prefix('-') {
                Some(name) => (true, name),
                None => (false, key),
            };
            IpoSortField::parse(name).map(|field| IpoOrdering { field, descending })
        })
        .collect();

    if ordering.is_empty() {
        vec![IpoOrdering::DEFAULT]
    } else {
        ordering
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ipo, IpoFields, User, UserProfile};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: i64, company: &str, open: NaiveDate, close: NaiveDate) -> IpoRecord {
        IpoRecord {
            ipo: Ipo {
                id,
                fields: IpoFields {
                    company_id: id,
                    price_band_min: dec!(100.00),
                    price_band_max: dec!(110.00),
                    open_date: open,
                    close_date: close,
                    listing_date: None,
                    issue_size: Decimal::from(id * 1000),
                    issue_type: "Fresh Issue".to_string(),
                    status: IpoStatus::Upcoming,
                    ipo_price: None,
                    listing_price: None,
                    current_market_price: None,
                    rhp_document: None,
                    drhp_document: None,
                },
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            company_name: company.to_string(),
            company_logo: None,
        }
    }

    fn params() -> IpoListParams {
        IpoListParams::default()
    }

    #[test]
    fn test_empty_params_mean_no_restriction() {
        let query = IpoQuery::from_params(&params()).unwrap();
        assert_eq!(query, IpoQuery::default());
        let r = record(1, "Acme", date(2020, 1, 1), date(2020, 1, 3));
        assert!(query.matches(&r, date(2024, 6, 1)));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let query = IpoQuery::from_params(&IpoListParams {
            status: Some(String::new()),
            company: Some("  ".to_string()),
            ..params()
        })
        .unwrap();
        assert_eq!(query.status, None);
        assert_eq!(query.company, None);
    }

    #[test]
    fn test_status_filter() {
        let query = IpoQuery::from_params(&IpoListParams {
            status: Some("open".to_string()),
            ..params()
        })
        .unwrap();
        let mut r = record(1, "Acme", date(2024, 1, 1), date(2024, 1, 3));
        assert!(!query.matches(&r, date(2024, 1, 2)));
        r.ipo.fields.status = IpoStatus::Open;
        assert!(query.matches(&r, date(2024, 1, 2)));
    }

    #[test]
    fn test_invalid_status_is_rejected() {
        let err = IpoQuery::from_params(&IpoListParams {
            status: Some("pending".to_string()),
            ..params()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_company_filter() {
        let query = IpoQuery::from_params(&IpoListParams {
            company: Some("2".to_string()),
            ..params()
        })
        .unwrap();
        let today = date(2024, 1, 1);
        assert!(!query.matches(&record(1, "Acme", today, today), today));
        assert!(query.matches(&record(2, "Beta", today, today), today));
    }

    #[test]
    fn test_non_numeric_company_is_rejected() {
        let result = IpoQuery::from_params(&IpoListParams {
            company: Some("acme".to_string()),
            ..params()
        });
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_upcoming_filter_includes_today() {
        let query = IpoQuery {
            upcoming: true,
            ..IpoQuery::default()
        };
        let today = date(2024, 5, 10);
        assert!(query.matches(&record(1, "A", today, date(2024, 5, 12)), today));
        assert!(query.matches(&record(2, "B", date(2024, 6, 1), date(2024, 6, 3)), today));
        assert!(!query.matches(&record(3, "C", date(2024, 5, 9), date(2024, 5, 12)), today));
    }

    #[test]
    fn test_open_now_filter_is_inclusive() {
        let query = IpoQuery {
            open_now: true,
            ..IpoQuery::default()
        };
        let today = date(2024, 5, 10);
        assert!(query.matches(&record(1, "A", today, today), today));
        assert!(query.matches(&record(2, "B", date(2024, 5, 8), date(2024, 5, 10)), today));
        assert!(!query.matches(&record(3, "C", date(2024, 5, 11), date(2024, 5, 14)), today));
        assert!(!query.matches(&record(4, "D", date(2024, 5, 1), date(2024, 5, 9)), today));
    }

    #[test]
    fn test_open_now_excludes_inverted_window() {
        let query = IpoQuery {
            open_now: true,
            ..IpoQuery::default()
        };
        let today = date(2024, 5, 10);
        assert!(!query.matches(&record(1, "A", date(2024, 5, 12), date(2024, 5, 8)), today));
    }

    #[test]
    fn test_truthy_values() {
        for value in ["true", "True", "1", "yes", "on", " TRUE "] {
            assert!(is_truthy(Some(value)), "{value}");
        }
        for value in ["false", "0", "no", "", "maybe"] {
            assert!(!is_truthy(Some(value)), "{value}");
        }
        assert!(!is_truthy(None));
    }

    #[test]
    fn test_search_terms_split_on_whitespace_and_commas() {
        assert_eq!(
            search_terms(Some("Acme, fresh  issue")),
            vec!["acme", "fresh", "issue"]
        );
        assert!(search_terms(Some(" , ")).is_empty());
        assert!(search_terms(None).is_empty());
    }

    #[test]
    fn test_search_matches_company_name_or_issue_type() {
        let today = date(2024, 1, 1);
        let mut ofs = record(1, "Acme Industries", today, today);
        ofs.ipo.fields.issue_type = "OFS".to_string();

        let by_name = IpoQuery {
            search: search_terms(Some("industries")),
            ..IpoQuery::default()
        };
        assert!(by_name.matches(&ofs, today));

        let by_type = IpoQuery {
            search: search_terms(Some("ofs")),
            ..IpoQuery::default()
        };
        assert!(by_type.matches(&ofs, today));

        let across_fields = IpoQuery {
            search: search_terms(Some("acme ofs")),
            ..IpoQuery::default()
        };
        assert!(across_fields.matches(&ofs, today));

        let missing_term = IpoQuery {
            search: search_terms(Some("acme fresh")),
            ..IpoQuery::default()
        };
        assert!(!missing_term.matches(&ofs, today));
    }

    #[test]
    fn test_parse_ordering() {
        assert_eq!(parse_ordering(None), vec![IpoOrdering::DEFAULT]);
        assert_eq!(
            parse_ordering(Some("-issue_size,close_date")),
            vec![
                IpoOrdering {
                    field: IpoSortField::IssueSize,
                    descending: true
                },
                IpoOrdering {
                    field: IpoSortField::CloseDate,
                    descending: false
                },
            ]
        );
    }

    #[test]
    fn test_parse_ordering_ignores_unknown_fields() {
        assert_eq!(
            parse_ordering(Some("company_name,-listing_date")),
            vec![IpoOrdering {
                field: IpoSortField::ListingDate,
                descending: true
            }]
        );
        assert_eq!(parse_ordering(Some("price,,-")), vec![IpoOrdering::DEFAULT]);
    }

    #[test]
    fn test_sort_default_is_open_date_descending() {
        let mut records = vec![
            record(1, "A", date(2024, 1, 1), date(2024, 1, 3)),
            record(2, "B", date(2024, 3, 1), date(2024, 3, 3)),
            record(3, "C", date(2024, 2, 1), date(2024, 2, 3)),
        ];
        IpoQuery::default().sort(&mut records);
        let ids: Vec<i64> = records.iter().map(|r| r.ipo.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_by_issue_size_ascending_with_id_tiebreak() {
        let mut records = vec![
            record(3, "C", date(2024, 1, 1), date(2024, 1, 3)),
            record(1, "A", date(2024, 1, 1), date(2024, 1, 3)),
            record(2, "B", date(2024, 1, 1), date(2024, 1, 3)),
        ];
        records[0].ipo.fields.issue_size = dec!(500);
        records[1].ipo.fields.issue_size = dec!(500);
        records[2].ipo.fields.issue_size = dec!(100);

        let query = IpoQuery {
            ordering: parse_ordering(Some("issue_size")),
            ..IpoQuery::default()
        };
        query.sort(&mut records);
        let ids: Vec<i64> = records.iter().map(|r| r.ipo.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_sort_listing_date_puts_missing_last_both_directions() {
        let mut records = vec![
            record(1, "A", date(2024, 1, 1), date(2024, 1, 3)),
            record(2, "B", date(2024, 1, 1), date(2024, 1, 3)),
            record(3, "C", date(2024, 1, 1), date(2024, 1, 3)),
        ];
        records[1].ipo.fields.listing_date = Some(date(2024, 1, 10));
        records[2].ipo.fields.listing_date = Some(date(2024, 1, 20));

        let ascending = IpoQuery {
            ordering: parse_ordering(Some("listing_date")),
            ..IpoQuery::default()
        };
        ascending.sort(&mut records);
        let ids: Vec<i64> = records.iter().map(|r| r.ipo.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let descending = IpoQuery {
            ordering: parse_ordering(Some("-listing_date")),
            ..IpoQuery::default()
        };
        descending.sort(&mut records);
        let ids: Vec<i64> = records.iter().map(|r| r.ipo.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_company_query_matches_name_terms() {
        let company = Company {
            id: 1,
            name: "Tata Technologies".to_string(),
            logo: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let query = CompanyQuery::from_params(&CompanyListParams {
            search: Some("tata tech".to_string()),
        });
        assert!(query.matches(&company));
        let miss = CompanyQuery::from_params(&CompanyListParams {
            search: Some("tata motors".to_string()),
        });
        assert!(!miss.matches(&company));
        assert!(CompanyQuery::default().matches(&company));
    }

    fn profile(
        username: &str,
        email: &str,
        phone: Option<&str>,
        is_client: bool,
    ) -> ProfileRecord {
        ProfileRecord {
            profile: UserProfile {
                id: 1,
                user_id: 1,
                phone: phone.map(str::to_string),
                is_client,
                api_key: "0123456789abcdef0123456789abcdef".to_string(),
            },
            user: User {
                id: 1,
                username: username.to_string(),
                email: email.to_string(),
                first_name: String::new(),
                last_name: String::new(),
                is_staff: false,
                date_joined: Utc::now(),
            },
        }
    }

    #[test]
    fn test_profile_query_client_flag() {
        let client = profile("asha", "asha@example.com", None, true);
        let prospect = profile("ravi", "ravi@example.com", None, false);

        let clients = ProfileQuery::new(Some(true), None);
        assert!(clients.matches(&client));
        assert!(!clients.matches(&prospect));

        let others = ProfileQuery::new(Some(false), None);
        assert!(others.matches(&prospect));
        assert!(ProfileQuery::default().matches(&client));
        assert!(ProfileQuery::default().matches(&prospect));
    }

    #[test]
    fn test_profile_query_searches_username_email_and_phone() {
        let record = profile("Asha", "asha@Example.com", Some("9800012345"), true);

        assert!(ProfileQuery::new(None, Some("ASHA")).matches(&record));
        assert!(ProfileQuery::new(None, Some("example.com")).matches(&record));
        assert!(ProfileQuery::new(None, Some("98000")).matches(&record));
        assert!(ProfileQuery::new(None, Some("asha, 12345")).matches(&record));
        assert!(!ProfileQuery::new(None, Some("asha ravi")).matches(&record));
        assert!(!ProfileQuery::new(Some(false), Some("asha")).matches(&record));
    }
}
