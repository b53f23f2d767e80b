use api_types::{
    auth::{ChangePassword, Signup},
    user::{
        BudgetRange, CompleteProfile, PreferencesUpdate, PreferencesView, ProfileUpdate,
        ProfileView, ProfileVisibility, TravelStyle, TripSharingDefault, UserUpdate, UserView,
    },
};
use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Currency, EngineError, ResultEngine,
    credentials::{hash_password, validate_new_password, verify_password},
    user_preferences, user_profiles, users,
    util::normalize_email,
};

use super::{Engine, normalize_optional_text, normalize_required_name, patch_text, set_if, with_tx};

const BIO_MAX_CHARS: usize = 500;
const DEFAULT_LANGUAGE: &str = "en";

fn validate_bio(bio: Option<Option<String>>) -> ResultEngine<Option<Option<String>>> {
    let bio = patch_text(bio);
    if let Some(Some(text)) = &bio
        && text.chars().count() > BIO_MAX_CHARS
    {
        return Err(EngineError::invalid(
            "bio",
            format!("must be at most {BIO_MAX_CHARS} characters"),
        ));
    }
    Ok(bio)
}

fn json_object(field: &str, value: Option<serde_json::Value>) -> ResultEngine<Option<Json>> {
    match value {
        Some(v) if !v.is_object() => Err(EngineError::invalid(field, "must be a JSON object")),
        other => Ok(other),
    }
}

impl Engine {
    pub(super) async fn user_by_email(
        &self,
        db: &DatabaseTransaction,
        email: &str,
    ) -> ResultEngine<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email.to_string()))
            .one(db)
            .await
            .map_err(Into::into)
    }

    async fn profile_or_create(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<user_profiles::Model> {
        if let Some(profile) = user_profiles::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
        {
            return Ok(profile);
        }
        let now = Utc::now();
        user_profiles::ActiveModel {
            user_id: ActiveValue::Set(user_id.to_string()),
            bio: ActiveValue::Set(None),
            website: ActiveValue::Set(None),
            birth_date: ActiveValue::Set(None),
            travel_style: ActiveValue::Set(serde_json::json!({})),
            notification_preferences: ActiveValue::Set(serde_json::json!({})),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(db)
        .await
        .map_err(Into::into)
    }

    async fn preferences_or_create(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<user_preferences::Model> {
        if let Some(prefs) = user_preferences::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
        {
            return Ok(prefs);
        }
        user_preferences::ActiveModel {
            user_id: ActiveValue::Set(user_id.to_string()),
            default_currency: ActiveValue::Set(Currency::default().code().to_string()),
            budget_range: ActiveValue::Set(BudgetRange::default().as_str().to_string()),
            travel_style: ActiveValue::Set(TravelStyle::default().as_str().to_string()),
            email_notifications: ActiveValue::Set(true),
            trip_reminders: ActiveValue::Set(true),
            budget_alerts: ActiveValue::Set(true),
            marketing_emails: ActiveValue::Set(false),
            profile_visibility: ActiveValue::Set(
                ProfileVisibility::default().as_str().to_string(),
            ),
            trip_sharing_default: ActiveValue::Set(
                TripSharingDefault::default().as_str().to_string(),
            ),
            updated_at: ActiveValue::Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(Into::into)
    }

    /// Register a new account.
    ///
    /// The email is stored lowercase and must not be taken yet.
    pub async fn signup(&self, signup: Signup) -> ResultEngine<UserView> {
        let first_name = normalize_required_name(&signup.first_name, "first_name")?;
        let last_name = normalize_required_name(&signup.last_name, "last_name")?;
        let email = normalize_email(&signup.email)?;
        validate_new_password(&signup.password, &signup.password_confirm)?;
        let password_hash = hash_password(&signup.password, self.pepper())?;
        let language = normalize_optional_text(signup.language_preference.as_deref())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        with_tx!(self, |db_tx| {
            if self.user_by_email(&db_tx, &email).await?.is_some() {
                return Err(EngineError::ExistingKey(email));
            }
            let now = Utc::now();
            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                email: ActiveValue::Set(email.clone()),
                password_hash: ActiveValue::Set(password_hash),
                first_name: ActiveValue::Set(first_name),
                last_name: ActiveValue::Set(last_name),
                phone_number: ActiveValue::Set(normalize_optional_text(
                    signup.phone_number.as_deref(),
                )),
                city: ActiveValue::Set(normalize_optional_text(signup.city.as_deref())),
                country: ActiveValue::Set(normalize_optional_text(signup.country.as_deref())),
                additional_info: ActiveValue::Set(normalize_optional_text(
                    signup.additional_info.as_deref(),
                )),
                photo_url: ActiveValue::Set(None),
                language_preference: ActiveValue::Set(language),
                is_active: ActiveValue::Set(true),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            model.to_view()
        })
    }

    /// Check email and password. Unknown emails, wrong passwords and
    /// inactive accounts all fail with [`EngineError::InvalidCredentials`].
    pub async fn login(&self, email: &str, password: &str) -> ResultEngine<UserView> {
        let email = normalize_email(email).map_err(|_| EngineError::InvalidCredentials)?;
        with_tx!(self, |db_tx| {
            let user = self
                .user_by_email(&db_tx, &email)
                .await?
                .filter(|u| u.is_active)
                .ok_or(EngineError::InvalidCredentials)?;
            if !verify_password(password, &user.password_hash, self.pepper())? {
                return Err(EngineError::InvalidCredentials);
            }
            user.to_view()
        })
    }

    /// Return an active user, used to validate the subject of a token.
    pub async fn active_user(&self, user_id: &str) -> ResultEngine<UserView> {
        with_tx!(self, |db_tx| {
            let user = users::Entity::find_by_id(user_id.to_string())
                .one(&db_tx)
                .await?
                .filter(|u| u.is_active)
                .ok_or(EngineError::InvalidCredentials)?;
            user.to_view()
        })
    }

    /// Partially update the account fields of a user.
    pub async fn update_user(&self, user_id: &str, update: UserUpdate) -> ResultEngine<UserView> {
        let first_name = update
            .first_name
            .as_deref()
            .map(|v| normalize_required_name(v, "first_name"))
            .transpose()?;
        let last_name = update
            .last_name
            .as_deref()
            .map(|v| normalize_required_name(v, "last_name"))
            .transpose()?;
        let language = update
            .language_preference
            .as_deref()
            .map(|v| normalize_required_name(v, "language_preference"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let model = users::ActiveModel {
                id: ActiveValue::Set(user.id),
                first_name: set_if(first_name),
                last_name: set_if(last_name),
                phone_number: set_if(patch_text(update.phone_number)),
                city: set_if(patch_text(update.city)),
                country: set_if(patch_text(update.country)),
                additional_info: set_if(patch_text(update.additional_info)),
                photo_url: set_if(patch_text(update.photo_url)),
                language_preference: set_if(language),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            model.to_view()
        })
    }

    pub async fn change_password(&self, user_id: &str, change: ChangePassword) -> ResultEngine<()> {
        validate_new_password(&change.new_password, &change.new_password_confirm)?;
        let new_hash = hash_password(&change.new_password, self.pepper())?;
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            if !verify_password(&change.current_password, &user.password_hash, self.pepper())? {
                return Err(EngineError::InvalidField {
                    field: "current_password".to_string(),
                    reason: "current password is incorrect".to_string(),
                });
            }
            users::ActiveModel {
                id: ActiveValue::Set(user.id),
                password_hash: ActiveValue::Set(new_hash),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }

    pub async fn profile(&self, user_id: &str) -> ResultEngine<ProfileView> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let profile = self.profile_or_create(&db_tx, user_id).await?;
            Ok(ProfileView::from(&profile))
        })
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> ResultEngine<ProfileView> {
        let bio = validate_bio(update.bio)?;
        let travel_style = json_object("travel_style", update.travel_style)?;
        let notifications =
            json_object("notification_preferences", update.notification_preferences)?;

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let profile = self.profile_or_create(&db_tx, user_id).await?;
            let model = user_profiles::ActiveModel {
                user_id: ActiveValue::Set(profile.user_id),
                bio: set_if(bio),
                website: set_if(patch_text(update.website)),
                birth_date: set_if(update.birth_date),
                travel_style: set_if(travel_style),
                notification_preferences: set_if(notifications),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(ProfileView::from(&model))
        })
    }

    pub async fn preferences(&self, user_id: &str) -> ResultEngine<PreferencesView> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            self.preferences_or_create(&db_tx, user_id)
                .await?
                .to_view()
        })
    }

    pub async fn update_preferences(
        &self,
        user_id: &str,
        update: PreferencesUpdate,
    ) -> ResultEngine<PreferencesView> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let prefs = self.preferences_or_create(&db_tx, user_id).await?;
            let model = user_preferences::ActiveModel {
                user_id: ActiveValue::Set(prefs.user_id),
                default_currency: set_if(update.default_currency.map(|c| c.code().to_string())),
                budget_range: set_if(update.budget_range.map(|v| v.as_str().to_string())),
                travel_style: set_if(update.travel_style.map(|v| v.as_str().to_string())),
                email_notifications: set_if(update.email_notifications),
                trip_reminders: set_if(update.trip_reminders),
                budget_alerts: set_if(update.budget_alerts),
                marketing_emails: set_if(update.marketing_emails),
                profile_visibility: set_if(
                    update.profile_visibility.map(|v| v.as_str().to_string()),
                ),
                trip_sharing_default: set_if(
                    update.trip_sharing_default.map(|v| v.as_str().to_string()),
                ),
                updated_at: ActiveValue::Set(Utc::now()),
            }
            .update(&db_tx)
            .await?;
            model.to_view()
        })
    }

    /// User, profile, preferences, saved destinations and travel statistics
    /// in one read.
    pub async fn complete_profile(&self, user_id: &str) -> ResultEngine<CompleteProfile> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let profile = self.profile_or_create(&db_tx, user_id).await?;
            let preferences = self.preferences_or_create(&db_tx, user_id).await?;
            let saved_destinations = self.destination_views(&db_tx, user_id).await?;
            let stats = self.compute_user_stats(&db_tx, user_id).await?;
            Ok(CompleteProfile {
                user: user.to_view()?,
                profile: ProfileView::from(&profile),
                preferences: preferences.to_view()?,
                saved_destinations,
                stats,
            })
        })
    }
}
