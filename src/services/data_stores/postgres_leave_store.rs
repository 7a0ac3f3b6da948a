use chrono::NaiveDate;
use color_eyre::eyre::{eyre, Report, WrapErr};
use serde_json::Value;
use sqlx::PgPool;

use crate::domain::{
    normalize_full_day_overtime, CustomOvertime, LeavePeriod, LeaveRecord,
    LeaveStore, LeaveStoreError, MemberName, ProxyRequest,
};

pub struct PostgresLeaveStore {
    pool: PgPool,
}

impl PostgresLeaveStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT date, requester_name, requester_team, period, confirmed,
           full_day_overtime, custom_overtime, proxy_request
    FROM leave_records
"#;

#[async_trait::async_trait]
impl LeaveStore for PostgresLeaveStore {
    #[tracing::instrument(name = "Adding leave record to PostgreSQL", skip_all)]
    async fn add_record(
        &mut self,
        record: LeaveRecord,
    ) -> Result<(), LeaveStoreError> {
        let columns = LeaveColumns::from_record(&record)?;

        sqlx::query(
            r#"
            INSERT INTO leave_records (
                date, requester_name, requester_team, period, confirmed,
                full_day_overtime, custom_overtime, proxy_request
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.date)
        .bind(record.requester_name.as_ref())
        .bind(record.requester_team.code())
        .bind(columns.period)
        .bind(record.confirmed)
        .bind(columns.full_day_overtime)
        .bind(columns.custom_overtime)
        .bind(columns.proxy_request)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                LeaveStoreError::RecordExists
            }
            err => map_sqlx_error(err),
        })?;
        Ok(())
    }

    #[tracing::instrument(
        name = "Retrieving leave record from PostgreSQL",
        skip_all
    )]
    async fn get_record(
        &self,
        date: NaiveDate,
        name: &MemberName,
    ) -> Result<LeaveRecord, LeaveStoreError> {
        let row = sqlx::query_as::<_, LeaveRow>(&format!(
            "{SELECT_COLUMNS} WHERE date = $1 AND requester_name = $2"
        ))
        .bind(date)
        .bind(name.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => LeaveStoreError::RecordNotFound,
            err => map_sqlx_error(err),
        })?;

        row.into_record()
    }

    #[tracing::instrument(
        name = "Retrieving leave records for a date from PostgreSQL",
        skip_all
    )]
    async fn get_records_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<LeaveRecord>, LeaveStoreError> {
        let rows = sqlx::query_as::<_, LeaveRow>(&format!(
            "{SELECT_COLUMNS} WHERE date = $1 ORDER BY requester_name"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(LeaveRow::into_record).collect()
    }

    #[tracing::instrument(
        name = "Retrieving leave records in range from PostgreSQL",
        skip_all
    )]
    async fn get_records_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<LeaveRecord>, LeaveStoreError> {
        let rows = sqlx::query_as::<_, LeaveRow>(&format!(
            "{SELECT_COLUMNS} WHERE date BETWEEN $1 AND $2 ORDER BY date, requester_name"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(LeaveRow::into_record).collect()
    }

    #[tracing::instrument(
        name = "Retrieving leave records for dates from PostgreSQL",
        skip_all
    )]
    async fn get_records_for_dates(
        &self,
        dates: &[NaiveDate],
    ) -> Result<Vec<LeaveRecord>, LeaveStoreError> {
        let rows = sqlx::query_as::<_, LeaveRow>(&format!(
            "{SELECT_COLUMNS} WHERE date = ANY($1) ORDER BY date, requester_name"
        ))
        .bind(dates.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(LeaveRow::into_record).collect()
    }

    #[tracing::instrument(name = "Updating leave record in PostgreSQL", skip_all)]
    async fn update_record(
        &mut self,
        previous: &LeaveRecord,
        record: &LeaveRecord,
    ) -> Result<(), LeaveStoreError> {
        let columns = LeaveColumns::from_record(record)?;
        let mut transaction =
            self.pool.begin().await.map_err(map_sqlx_error)?;

        let current = sqlx::query_as::<_, LeaveRow>(&format!(
            "{SELECT_COLUMNS} WHERE date = $1 AND requester_name = $2 \
             FOR UPDATE"
        ))
        .bind(record.date)
        .bind(record.requester_name.as_ref())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(map_sqlx_error)?
        .ok_or(LeaveStoreError::RecordNotFound)?
        .into_record()?;

        // Compared after the legacy-shape upgrade, so old rows still match.
        if &current != previous {
            return Err(LeaveStoreError::StaleRecord);
        }

        sqlx::query(
            r#"
            UPDATE leave_records
            SET requester_team = $3, period = $4, confirmed = $5,
                full_day_overtime = $6, custom_overtime = $7, proxy_request = $8
            WHERE date = $1 AND requester_name = $2
            "#,
        )
        .bind(record.date)
        .bind(record.requester_name.as_ref())
        .bind(record.requester_team.code())
        .bind(columns.period)
        .bind(record.confirmed)
        .bind(columns.full_day_overtime)
        .bind(columns.custom_overtime)
        .bind(columns.proxy_request)
        .execute(&mut *transaction)
        .await
        .map_err(map_sqlx_error)?;

        transaction.commit().await.map_err(map_sqlx_error)
    }

    #[tracing::instrument(
        name = "Deleting leave record from PostgreSQL",
        skip_all
    )]
    async fn delete_record(
        &mut self,
        date: NaiveDate,
        name: &MemberName,
    ) -> Result<(), LeaveStoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM leave_records WHERE date = $1 AND requester_name = $2
            "#,
        )
        .bind(date)
        .bind(name.as_ref())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(LeaveStoreError::RecordNotFound);
        }
        Ok(())
    }
}

fn map_sqlx_error(e: sqlx::Error) -> LeaveStoreError {
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Tls(_) => LeaveStoreError::Unavailable(eyre!(e)),
        err => LeaveStoreError::UnexpectedError(eyre!(err)),
    }
}

fn unexpected(report: Report) -> LeaveStoreError {
    LeaveStoreError::UnexpectedError(report)
}

struct LeaveColumns {
    period: Value,
    full_day_overtime: Option<Value>,
    custom_overtime: Option<Value>,
    proxy_request: Option<Value>,
}

impl LeaveColumns {
    fn from_record(record: &LeaveRecord) -> Result<Self, LeaveStoreError> {
        let to_json = |value: Result<Value, serde_json::Error>| {
            value
                .wrap_err("failed to serialise leave record column")
                .map_err(unexpected)
        };

        Ok(Self {
            period: to_json(serde_json::to_value(&record.period))?,
            full_day_overtime: record
                .full_day_overtime
                .as_ref()
                .map(|o| to_json(serde_json::to_value(o)))
                .transpose()?,
            custom_overtime: record
                .custom_overtime
                .as_ref()
                .map(|o| to_json(serde_json::to_value(o)))
                .transpose()?,
            proxy_request: record
                .proxy_request
                .as_ref()
                .map(|p| to_json(serde_json::to_value(p)))
                .transpose()?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LeaveRow {
    date: NaiveDate,
    requester_name: String,
    requester_team: String,
    period: Value,
    confirmed: bool,
    full_day_overtime: Option<Value>,
    custom_overtime: Option<Value>,
    proxy_request: Option<Value>,
}

impl LeaveRow {
    fn into_record(self) -> Result<LeaveRecord, LeaveStoreError> {
        let requester_name = MemberName::parse(&self.requester_name)
            .map_err(|e| unexpected(eyre!(e)))?;
        let requester_team = self
            .requester_team
            .parse()
            .map_err(|e| unexpected(eyre!("{e}")))?;
        let period = serde_json::from_value::<LeavePeriod>(self.period)
            .wrap_err("failed to deserialise leave period")
            .map_err(unexpected)?;
        // Rows written before the tagged representation are upgraded here
        let full_day_overtime = normalize_full_day_overtime(
            self.full_day_overtime.unwrap_or(Value::Null),
            self.date,
        )
        .map_err(|e| unexpected(eyre!(e)))?;
        let custom_overtime = self
            .custom_overtime
            .map(serde_json::from_value::<CustomOvertime>)
            .transpose()
            .wrap_err("failed to deserialise custom overtime")
            .map_err(unexpected)?;
        let proxy_request = self
            .proxy_request
            .map(serde_json::from_value::<ProxyRequest>)
            .transpose()
            .wrap_err("failed to deserialise proxy request")
            .map_err(unexpected)?;

        Ok(LeaveRecord {
            date: self.date,
            requester_name,
            requester_team,
            period,
            confirmed: self.confirmed,
            full_day_overtime,
            custom_overtime,
            proxy_request,
        })
    }
}
