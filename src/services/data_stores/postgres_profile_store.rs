use color_eyre::eyre::eyre;
use sqlx::PgPool;

use crate::domain::{
    LineUserId, MemberName, ProfileStore, ProfileStoreError, UserProfile,
};

pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT line_user_id, display_name, team, role, member_name, notification_enabled
    FROM user_profiles
"#;

#[async_trait::async_trait]
impl ProfileStore for PostgresProfileStore {
    #[tracing::instrument(name = "Adding profile to PostgreSQL", skip_all)]
    async fn add_profile(
        &mut self,
        profile: UserProfile,
    ) -> Result<(), ProfileStoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (
                line_user_id, display_name, team, role, member_name, notification_enabled
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(profile.line_user_id.as_ref())
        .bind(&profile.display_name)
        .bind(profile.team.code())
        .bind(profile.role.to_string())
        .bind(profile.member_name.as_ref())
        .bind(profile.notification_enabled)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ProfileStoreError::ProfileExists
            }
            err => map_sqlx_error(err),
        })?;
        Ok(())
    }

    #[tracing::instrument(
        name = "Retrieving profile by LINE user ID from PostgreSQL",
        skip_all
    )]
    async fn get_profile_by_line_id(
        &self,
        line_user_id: &LineUserId,
    ) -> Result<UserProfile, ProfileStoreError> {
        sqlx::query_as::<_, ProfileRow>(&format!(
            "{SELECT_COLUMNS} WHERE line_user_id = $1"
        ))
        .bind(line_user_id.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ProfileStoreError::ProfileNotFound,
            err => map_sqlx_error(err),
        })?
        .into_profile()
    }

    #[tracing::instrument(
        name = "Retrieving profile by member name from PostgreSQL",
        skip_all
    )]
    async fn get_profile_by_member_name(
        &self,
        name: &MemberName,
    ) -> Result<UserProfile, ProfileStoreError> {
        sqlx::query_as::<_, ProfileRow>(&format!(
            "{SELECT_COLUMNS} WHERE member_name = $1"
        ))
        .bind(name.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ProfileStoreError::ProfileNotFound,
            err => map_sqlx_error(err),
        })?
        .into_profile()
    }

    #[tracing::instrument(name = "Listing profiles from PostgreSQL", skip_all)]
    async fn get_profiles(
        &self,
        notification_enabled_only: bool,
    ) -> Result<Vec<UserProfile>, ProfileStoreError> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "{SELECT_COLUMNS} WHERE notification_enabled OR NOT $1 ORDER BY team, member_name"
        ))
        .bind(notification_enabled_only)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(ProfileRow::into_profile).collect()
    }

    #[tracing::instrument(
        name = "Updating notification preference in PostgreSQL",
        skip_all
    )]
    async fn set_notification_enabled(
        &mut self,
        line_user_id: &LineUserId,
        enabled: bool,
    ) -> Result<(), ProfileStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE user_profiles SET notification_enabled = $2 WHERE line_user_id = $1
            "#,
        )
        .bind(line_user_id.as_ref())
        .bind(enabled)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(ProfileStoreError::ProfileNotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Deleting profile from PostgreSQL", skip_all)]
    async fn delete_profile(
        &mut self,
        line_user_id: &LineUserId,
    ) -> Result<(), ProfileStoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_profiles WHERE line_user_id = $1
            "#,
        )
        .bind(line_user_id.as_ref())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(ProfileStoreError::ProfileNotFound);
        }
        Ok(())
    }
}

fn map_sqlx_error(e: sqlx::Error) -> ProfileStoreError {
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Tls(_) => ProfileStoreError::Unavailable(eyre!(e)),
        err => ProfileStoreError::UnexpectedError(eyre!(err)),
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    line_user_id: String,
    display_name: String,
    team: String,
    role: String,
    member_name: String,
    notification_enabled: bool,
}

impl ProfileRow {
    fn into_profile(self) -> Result<UserProfile, ProfileStoreError> {
        let unexpected = |e: crate::domain::ValidationError| ProfileStoreError::UnexpectedError(eyre!(e));
        Ok(UserProfile {
            line_user_id: LineUserId::parse(&self.line_user_id)
                .map_err(unexpected)?,
            display_name: self.display_name,
            team: self.team.parse().map_err(unexpected)?,
            role: self.role.parse().map_err(unexpected)?,
            member_name: MemberName::parse(&self.member_name)
                .map_err(unexpected)?,
            notification_enabled: self.notification_enabled,
        })
    }
}
