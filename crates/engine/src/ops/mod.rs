use sea_orm::{ActiveValue, DatabaseConnection};

use crate::{EngineError, ResultEngine};

mod access;
mod activities;
mod budget;
mod catalog;
mod collaborators;
mod community;
mod destinations;
mod sharing;
mod stats;
mod stops;
mod templates;
mod trips;
mod users;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    password_pepper: Option<String>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    fn pepper(&self) -> Option<&str> {
        self.password_pepper.as_deref()
    }
}

fn normalize_required_name(value: &str, field: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::invalid(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Applies a partial update to a nullable text column: absent keeps the
/// value, `null` or blank clears it.
fn patch_text(value: Option<Option<String>>) -> Option<Option<String>> {
    value.map(|inner| normalize_optional_text(inner.as_deref()))
}

/// `Some(v)` becomes `Set(v)`, `None` leaves the column untouched.
fn set_if<T>(value: Option<T>) -> ActiveValue<T>
where
    T: Into<sea_orm::Value>,
{
    match value {
        Some(v) => ActiveValue::Set(v),
        None => ActiveValue::NotSet,
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    password_pepper: Option<String>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Secret prepended to passwords before hashing.
    pub fn password_pepper(mut self, pepper: Option<String>) -> EngineBuilder {
        self.password_pepper = pepper.filter(|p| !p.is_empty());
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            password_pepper: self.password_pepper,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_name_is_trimmed() {
        assert_eq!(normalize_required_name("  Rome ", "name").unwrap(), "Rome");
        assert_eq!(
            normalize_required_name("   ", "name"),
            Err(EngineError::invalid("name", "must not be empty"))
        );
    }

    #[test]
    fn patch_text_distinguishes_absent_and_null() {
        assert_eq!(patch_text(None), None);
        assert_eq!(patch_text(Some(None)), Some(None));
        assert_eq!(patch_text(Some(Some("  ".to_string()))), Some(None));
        assert_eq!(
            patch_text(Some(Some(" note ".to_string()))),
            Some(Some("note".to_string()))
        );
    }
}
