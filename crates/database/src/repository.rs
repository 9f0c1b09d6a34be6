use crate::DbError;
use chrono::{DateTime, Utc};
use core_types::{
    CandidateRecord, CountryFilter, CountryRecord, GdpLeader, NewCountry, SortOrder, UpdateCountry,
};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use sqlx::SqlitePool;
use tracing::debug;

/// The metadata key under which the refresh watermark is stored. Exactly one
/// row carries it; every successful refresh overwrites it in place.
pub const WATERMARK_KEY: &str = "last_refreshed_at";

/// The `CountryRepository` provides a high-level, application-specific
/// interface to the store. It encapsulates all SQL queries and data access
/// logic, including the transactional refresh applier.
#[derive(Debug, Clone)]
pub struct CountryRepository {
    pool: SqlitePool,
}

/// Counts reported by a successful `apply_refresh` transaction.
#[derive(Debug, Clone, Copy)]
pub struct RefreshOutcome {
    pub inserted: u64,
    pub updated: u64,
}

const COUNTRY_COLUMNS: &str = "id, name, capital, region, population, currency_code, \
                               exchange_rate, estimated_gdp, flag_url, last_refreshed_at";

fn row_to_country(row: &SqliteRow) -> CountryRecord {
    CountryRecord {
        id: row.get("id"),
        name: row.get("name"),
        capital: row.get("capital"),
        region: row.get("region"),
        population: row.get("population"),
        currency_code: row.get("currency_code"),
        exchange_rate: row.get("exchange_rate"),
        estimated_gdp: row.get("estimated_gdp"),
        flag_url: row.get("flag_url"),
        last_refreshed_at: row.get("last_refreshed_at"),
    }
}

fn validate_currency_code(code: &str) -> Result<(), DbError> {
    if code.len() < 2 || code.len() > 16 {
        return Err(DbError::Validation(
            "Currency code must be between 2 and 16 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_non_negative(value: f64, field: &str) -> Result<(), DbError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DbError::Validation(format!("{field} cannot be negative")));
    }
    Ok(())
}

impl CountryRepository {
    /// Creates a new `CountryRepository` with a shared connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetches country records, optionally filtered by region and currency
    /// code and optionally ordered by estimated GDP descending. No filter
    /// returns every record in store-defined order.
    pub async fn list(&self, filter: &CountryFilter) -> Result<Vec<CountryRecord>, DbError> {
        let mut sql = format!("SELECT {COUNTRY_COLUMNS} FROM countries");
        let mut clauses: Vec<&str> = Vec::new();
        if filter.region.is_some() {
            clauses.push("region = ?");
        }
        if filter.currency_code.is_some() {
            clauses.push("currency_code = ?");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        if let Some(SortOrder::GdpDesc) = filter.sort {
            sql.push_str(" ORDER BY estimated_gdp DESC");
        }

        let mut query = sqlx::query(&sql);
        if let Some(region) = &filter.region {
            query = query.bind(region);
        }
        if let Some(code) = &filter.currency_code {
            query = query.bind(code);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_country).collect())
    }

    /// Looks up a single record by name, case-insensitively.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<CountryRecord>, DbError> {
        let sql = format!(
            "SELECT {COUNTRY_COLUMNS} FROM countries WHERE lower(name) = lower(?)"
        );
        let row = sqlx::query(&sql).bind(name).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(row_to_country))
    }

    /// Creates a record directly, outside any refresh pass. Requires a
    /// non-empty name and a positive population; name uniqueness is enforced
    /// by the store's case-insensitive unique index.
    pub async fn create(&self, new: &NewCountry) -> Result<CountryRecord, DbError> {
        if new.name.trim().is_empty() {
            return Err(DbError::Validation("Country name cannot be empty".to_string()));
        }
        if new.population <= 0 {
            return Err(DbError::Validation(
                "Population must be a positive integer".to_string(),
            ));
        }
        if let Some(code) = &new.currency_code {
            validate_currency_code(code)?;
        }
        if let Some(rate) = new.exchange_rate {
            validate_non_negative(rate, "Exchange rate")?;
        }
        let estimated_gdp = new.estimated_gdp.unwrap_or(0.0);
        validate_non_negative(estimated_gdp, "Estimated GDP")?;

        let result = sqlx::query(
            r#"
            INSERT INTO countries (name, capital, region, population, currency_code,
                                   exchange_rate, estimated_gdp, flag_url, last_refreshed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(&new.name)
        .bind(&new.capital)
        .bind(&new.region)
        .bind(new.population)
        .bind(&new.currency_code)
        .bind(new.exchange_rate)
        .bind(estimated_gdp)
        .bind(&new.flag_url)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => DbError::Validation(
                format!("A country named '{}' already exists", new.name),
            ),
            _ => DbError::from(e),
        })?;

        let id = result.last_insert_rowid();
        let sql = format!("SELECT {COUNTRY_COLUMNS} FROM countries WHERE id = ?");
        let row = sqlx::query(&sql).bind(id).fetch_one(&self.pool).await?;
        Ok(row_to_country(&row))
    }

    /// Applies a partial update to the record matching `name`
    /// case-insensitively. Fields left as `None` keep their stored value.
    pub async fn update(
        &self,
        name: &str,
        changes: &UpdateCountry,
    ) -> Result<CountryRecord, DbError> {
        let existing = self.find_by_name(name).await?.ok_or(DbError::NotFound)?;

        if let Some(population) = changes.population {
            if population < 0 {
                return Err(DbError::Validation("Population cannot be negative".to_string()));
            }
        }
        if let Some(code) = &changes.currency_code {
            validate_currency_code(code)?;
        }
        if let Some(rate) = changes.exchange_rate {
            validate_non_negative(rate, "Exchange rate")?;
        }
        if let Some(gdp) = changes.estimated_gdp {
            validate_non_negative(gdp, "Estimated GDP")?;
        }

        sqlx::query(
            r#"
            UPDATE countries
            SET capital = ?, region = ?, population = ?, currency_code = ?,
                exchange_rate = ?, estimated_gdp = ?, flag_url = ?
            WHERE id = ?
            "#,
        )
        .bind(changes.capital.clone().or(existing.capital))
        .bind(changes.region.clone().or(existing.region))
        .bind(changes.population.unwrap_or(existing.population))
        .bind(changes.currency_code.clone().or(existing.currency_code))
        .bind(changes.exchange_rate.or(existing.exchange_rate))
        .bind(changes.estimated_gdp.unwrap_or(existing.estimated_gdp))
        .bind(changes.flag_url.clone().or(existing.flag_url))
        .bind(existing.id)
        .execute(&self.pool)
        .await?;

        let sql = format!("SELECT {COUNTRY_COLUMNS} FROM countries WHERE id = ?");
        let row = sqlx::query(&sql).bind(existing.id).fetch_one(&self.pool).await?;
        Ok(row_to_country(&row))
    }

    /// Deletes the record matching `name` case-insensitively.
    pub async fn delete_by_name(&self, name: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM countries WHERE lower(name) = lower(?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    /// Applies one refresh pass as a single atomic transaction.
    ///
    /// Candidates are applied in order: each is matched against an existing
    /// record by case-insensitive name and updated in place, or inserted if
    /// no match exists. The refresh watermark is upserted strictly after all
    /// candidate writes, inside the same transaction, so a reader can never
    /// observe an advanced watermark alongside stale records. Any
    /// per-candidate failure rolls the whole pass back.
    ///
    /// The transaction serializes the candidates of one pass; it does not
    /// make two concurrent passes safe. The refresh engine's single-flight
    /// guard is the discipline that prevents those.
    pub async fn apply_refresh(
        &self,
        candidates: &[CandidateRecord],
        now: DateTime<Utc>,
    ) -> Result<RefreshOutcome, DbError> {
        let mut tx = self.pool.begin().await?;
        let mut outcome = RefreshOutcome {
            inserted: 0,
            updated: 0,
        };

        for candidate in candidates {
            let existing: Option<i64> =
                sqlx::query_scalar("SELECT id FROM countries WHERE lower(name) = lower(?)")
                    .bind(&candidate.name)
                    .fetch_optional(&mut *tx)
                    .await?;

            match existing {
                Some(id) => {
                    sqlx::query(
                        r#"
                        UPDATE countries
                        SET name = ?, capital = ?, region = ?, population = ?,
                            currency_code = ?, exchange_rate = ?, estimated_gdp = ?,
                            flag_url = ?, last_refreshed_at = ?
                        WHERE id = ?
                        "#,
                    )
                    .bind(&candidate.name)
                    .bind(&candidate.capital)
                    .bind(&candidate.region)
                    .bind(candidate.population)
                    .bind(&candidate.currency_code)
                    .bind(candidate.exchange_rate)
                    .bind(candidate.estimated_gdp)
                    .bind(&candidate.flag_url)
                    .bind(candidate.last_refreshed_at.to_rfc3339())
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                    outcome.updated += 1;
                }
                None => {
                    sqlx::query(
                        r#"
                        INSERT INTO countries (name, capital, region, population, currency_code,
                                               exchange_rate, estimated_gdp, flag_url,
                                               last_refreshed_at)
                        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                        "#,
                    )
                    .bind(&candidate.name)
                    .bind(&candidate.capital)
                    .bind(&candidate.region)
                    .bind(candidate.population)
                    .bind(&candidate.currency_code)
                    .bind(candidate.exchange_rate)
                    .bind(candidate.estimated_gdp)
                    .bind(&candidate.flag_url)
                    .bind(candidate.last_refreshed_at.to_rfc3339())
                    .execute(&mut *tx)
                    .await?;
                    outcome.inserted += 1;
                }
            }
        }

        sqlx::query(
            "INSERT INTO metadata (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(WATERMARK_KEY)
        .bind(now.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(
            inserted = outcome.inserted,
            updated = outcome.updated,
            "Refresh pass committed"
        );
        Ok(outcome)
    }

    /// Total number of stored country records.
    pub async fn count(&self) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM countries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// The records with the largest estimated GDP, for the summary snapshot.
    pub async fn top_by_gdp(&self, limit: i64) -> Result<Vec<GdpLeader>, DbError> {
        let rows = sqlx::query(
            "SELECT name, estimated_gdp, flag_url FROM countries \
             ORDER BY estimated_gdp DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| GdpLeader {
                name: row.get("name"),
                estimated_gdp: row.get("estimated_gdp"),
                flag_url: row.get("flag_url"),
            })
            .collect())
    }

    /// The refresh watermark: the timestamp string recorded by the most
    /// recent successful refresh, or `None` if no refresh has succeeded yet.
    pub async fn watermark(&self) -> Result<Option<String>, DbError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM metadata WHERE key = ?")
                .bind(WATERMARK_KEY)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }
}
