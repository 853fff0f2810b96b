//! PostgreSQL-backed user store.
//!
//! Column names are chosen by matching on [`ServiceId`] against string
//! literals; caller-supplied values only ever reach the database as bound
//! parameters.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::{StoreError, UserStore, bounded};
use crate::models::{Participant, UserRecord};
use crate::services::ServiceId;
use crate::validation::ValidatedLinks;

macro_rules! service_sql {
    ($($variant:ident => $col:literal),* $(,)?) => {
        /// `(url column, clicks column)` for a service.
        const fn columns(service: ServiceId) -> (&'static str, &'static str) {
            match service {
                $(ServiceId::$variant => ($col, concat!($col, "_clicks")),)*
            }
        }

        fn participants_sql(service: ServiceId) -> &'static str {
            match service {
                $(ServiceId::$variant => concat!(
                    "SELECT email, ", $col, " AS url FROM users WHERE ", $col, " <> '' ORDER BY email"
                ),)*
            }
        }

        fn record_click_sql(service: ServiceId) -> &'static str {
            match service {
                $(ServiceId::$variant => concat!(
                    "UPDATE users SET ", $col, "_clicks = ", $col, "_clicks + 1 WHERE email = $1"
                ),)*
            }
        }
    };
}

service_sql! {
    SofiMoney => "sofi_money",
    SofiInvest => "sofi_invest",
    Robinhood => "robinhood",
    Amazon => "amazon",
    Airbnb => "airbnb",
    Grubhub => "grubhub",
    Doordash => "doordash",
    Uber => "uber",
}

const SELECT_USER_SQL: &str = "SELECT email, \
     sofi_money, sofi_money_clicks, sofi_invest, sofi_invest_clicks, \
     robinhood, robinhood_clicks, amazon, amazon_clicks, \
     airbnb, airbnb_clicks, grubhub, grubhub_clicks, \
     doordash, doordash_clicks, uber, uber_clicks \
     FROM users WHERE email = $1";

const INSERT_USER_SQL: &str = "INSERT INTO users (email) VALUES ($1) ON CONFLICT (email) DO NOTHING";

// Parameters $2..$9 follow `ServiceId::ALL` order.
const UPDATE_LINKS_SQL: &str = "UPDATE users SET \
     sofi_money = $2, sofi_invest = $3, robinhood = $4, amazon = $5, \
     airbnb = $6, grubhub = $7, doordash = $8, uber = $9 \
     WHERE email = $1";

/// User store over a shared `PgPool`.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgUserStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    fn record_from_row(row: &PgRow) -> Result<UserRecord, sqlx::Error> {
        let mut record = UserRecord::new(row.try_get::<String, _>("email")?);
        for service in ServiceId::ALL {
            let (url_col, clicks_col) = columns(service);
            let link = record.services.get_mut(service);
            link.url = row.try_get(url_col)?;
            link.clicks = row.try_get(clicks_col)?;
        }
        Ok(record)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        bounded(self.timeout, async {
            let row = sqlx::query(SELECT_USER_SQL)
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row.as_ref().map(Self::record_from_row).transpose()?)
        })
        .await
    }

    async fn insert_if_absent(&self, email: &str) -> Result<(), StoreError> {
        bounded(self.timeout, async {
            sqlx::query(INSERT_USER_SQL)
                .bind(email)
                .execute(&self.pool)
                .await?;
            Ok(())
        })
        .await
    }

    async fn update_links(&self, email: &str, links: &ValidatedLinks) -> Result<(), StoreError> {
        bounded(self.timeout, async {
            let mut query = sqlx::query(UPDATE_LINKS_SQL).bind(email);
            for service in ServiceId::ALL {
                query = query.bind(links.url(service));
            }
            let result = query.execute(&self.pool).await?;
            if result.rows_affected() == 0 {
                return Err(StoreError::UnknownUser(email.to_string()));
            }
            Ok(())
        })
        .await
    }

    async fn list_participants(&self, service: ServiceId) -> Result<Vec<Participant>, StoreError> {
        bounded(self.timeout, async {
            let rows = sqlx::query_as::<_, (String, String)>(participants_sql(service))
                .fetch_all(&self.pool)
                .await?;
            Ok(rows
                .into_iter()
                .map(|(email, url)| Participant { email, url })
                .collect())
        })
        .await
    }

    async fn record_click(&self, email: &str, service: ServiceId) -> Result<(), StoreError> {
        bounded(self.timeout, async {
            let result = sqlx::query(record_click_sql(service))
                .bind(email)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(StoreError::UnknownUser(email.to_string()));
            }
            Ok(())
        })
        .await
    }
}
