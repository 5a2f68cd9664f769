// User persistence

use serde::Serialize;
use sqlx::SqlitePool;
use unicode_normalization::UnicodeNormalization;

use super::{non_blank, ConflictField, RepoError};
use crate::auth::PasswordHasher;

const USER_COLUMNS: &str = "id, user_name, mail, tel, user_password";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub user_name: String,
    pub mail: String,
    pub tel: Option<String>,
    #[serde(skip_serializing)]
    #[sqlx(rename = "user_password")]
    pub password_hash: String,
}

/// Sign-up input, as received from the client
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub user_name: Option<String>,
    pub mail: Option<String>,
    pub tel: Option<String>,
    pub password: Option<String>,
}

/// Partial profile change; blank or absent fields keep their stored value
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub user_name: Option<String>,
    pub mail: Option<String>,
    pub tel: Option<String>,
    pub password: Option<String>,
}

// Composed and decomposed spellings of a name must compare equal
fn nfc(value: &str) -> String {
    value.trim().nfc().collect()
}

fn normalize_identity(value: &str) -> String {
    nfc(value).to_lowercase()
}

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
    hasher: PasswordHasher,
}

impl UserRepository {
    pub fn new(pool: SqlitePool, hasher: PasswordHasher) -> Self {
        Self { pool, hasher }
    }

    // Create a new user after checking mail and user name are free
    pub async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let (Some(user_name), Some(mail), Some(password)) = (
            non_blank(new_user.user_name.as_deref()),
            non_blank(new_user.mail.as_deref()),
            new_user.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(RepoError::MissingFields);
        };

        let user_name = normalize_identity(user_name);
        let mail = normalize_identity(mail);
        let tel = non_blank(new_user.tel.as_deref()).map(str::to_string);

        let mail_taken: Option<String> = sqlx::query_scalar("SELECT id FROM usuarios WHERE mail = ?")
            .bind(&mail)
            .fetch_optional(&self.pool)
            .await?;
        if mail_taken.is_some() {
            return Err(RepoError::Conflict(ConflictField::Mail));
        }

        let name_taken: Option<String> =
            sqlx::query_scalar("SELECT id FROM usuarios WHERE user_name = ? COLLATE BINARY")
                .bind(&user_name)
                .fetch_optional(&self.pool)
                .await?;
        if name_taken.is_some() {
            return Err(RepoError::Conflict(ConflictField::UserName));
        }

        let password_hash = self.hasher.hash_async(password.to_string()).await?;
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO usuarios (id, user_name, mail, tel, user_password) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&user_name)
        .bind(&mail)
        .bind(&tel)
        .bind(&password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::from_write(e, "user"))?;

        tracing::info!(user_id = %id, %user_name, "created user");

        Ok(User {
            id,
            user_name,
            mail,
            tel,
            password_hash,
        })
    }

    // Get user by ID
    pub async fn find_by_id(&self, id: &str) -> Result<User, RepoError> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM usuarios WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepoError::NotFound("user"))
    }

    // Find user by name, ignoring case (login)
    pub async fn find_by_name_case_insensitive(&self, user_name: &str) -> Result<User, RepoError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM usuarios WHERE user_name = ? COLLATE NOCASE",
            USER_COLUMNS
        ))
        .bind(nfc(user_name))
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound("user"))
    }

    /// Apply a partial update in a single statement.
    ///
    /// A blank password never clears the stored hash; a non-blank one is re-hashed.
    pub async fn update(&self, id: &str, update: UserUpdate) -> Result<User, RepoError> {
        let user_name = non_blank(update.user_name.as_deref()).map(normalize_identity);
        let mail = non_blank(update.mail.as_deref()).map(normalize_identity);
        let tel = non_blank(update.tel.as_deref()).map(str::to_string);

        // Blankness is judged on the trimmed form, but the password is hashed as given
        let password_hash = match update.password.filter(|p| !p.trim().is_empty()) {
            Some(password) => Some(self.hasher.hash_async(password).await?),
            None => None,
        };

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE usuarios SET
                user_name = COALESCE(?, user_name),
                mail = COALESCE(?, mail),
                tel = COALESCE(?, tel),
                user_password = COALESCE(?, user_password)
             WHERE id = ?
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user_name)
        .bind(&mail)
        .bind(&tel)
        .bind(&password_hash)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::from_write(e, "user"))?
        .ok_or(RepoError::NotFound("user"))?;

        tracing::info!(
            user_id = %id,
            user_name_changed = user_name.is_some(),
            mail_changed = mail.is_some(),
            tel_changed = tel.is_some(),
            password_changed = password_hash.is_some(),
            "updated user"
        );

        Ok(user)
    }
}
