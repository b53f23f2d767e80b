//! Initial schema migration.
//!
//! - `users`, `user_profiles`, `user_preferences`, `saved_destinations`:
//!   accounts and personal settings
//! - `trips`, `stops`, `activities`: the itinerary tree
//! - `budgets`: one denormalised cost summary per trip
//! - `shared_itineraries`, `trip_collaborators`: public links and shared access
//! - `trip_templates`: reusable itinerary skeletons
//! - `cities`, `activity_catalog`: read-only reference data

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    FirstName,
    LastName,
    PhoneNumber,
    City,
    Country,
    AdditionalInfo,
    PhotoUrl,
    LanguagePreference,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum UserProfiles {
    Table,
    UserId,
    Bio,
    Website,
    BirthDate,
    TravelStyle,
    NotificationPreferences,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum UserPreferences {
    Table,
    UserId,
    DefaultCurrency,
    BudgetRange,
    TravelStyle,
    EmailNotifications,
    TripReminders,
    BudgetAlerts,
    MarketingEmails,
    ProfileVisibility,
    TripSharingDefault,
    UpdatedAt,
}

#[derive(Iden)]
enum SavedDestinations {
    Table,
    Id,
    UserId,
    CityName,
    Country,
    Notes,
    Priority,
    SavedAt,
}

#[derive(Iden)]
enum Trips {
    Table,
    Id,
    UserId,
    Name,
    Description,
    StartDate,
    EndDate,
    CoverImageUrl,
    IsPublic,
    Status,
    EstimatedBudgetMinor,
    ActualBudgetMinor,
    Currency,
    CollaboratorsCanEdit,
    AutoCalculateBudget,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Stops {
    Table,
    Id,
    TripId,
    CityName,
    Country,
    StartDate,
    EndDate,
    OrderIndex,
    Latitude,
    Longitude,
    Timezone,
    Notes,
    AccommodationName,
    AccommodationAddress,
    AccommodationCostMinor,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Activities {
    Table,
    Id,
    StopId,
    Name,
    Category,
    Description,
    Notes,
    LocationName,
    Address,
    StartTime,
    EndTime,
    DurationMinutes,
    CostMinor,
    IsPaid,
    Priority,
    IsBooked,
    BookingReference,
    WebsiteUrl,
    PhoneNumber,
    ImageUrl,
    WeatherDependent,
    IndoorActivity,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
    TripId,
    Currency,
    TransportCostMinor,
    StayCostMinor,
    ActivityCostMinor,
    MealCostMinor,
    ShoppingCostMinor,
    MiscellaneousCostMinor,
    TransportLimitMinor,
    StayLimitMinor,
    ActivityLimitMinor,
    MealLimitMinor,
    ShoppingLimitMinor,
    MiscellaneousLimitMinor,
    UpdatedAt,
}

#[derive(Iden)]
enum SharedItineraries {
    Table,
    Id,
    TripId,
    PublicSlug,
    AllowComments,
    AllowCopying,
    PasswordProtected,
    AccessPasswordHash,
    ViewCount,
    CopyCount,
    CreatedAt,
    ExpiresAt,
}

#[derive(Iden)]
enum TripCollaborators {
    Table,
    Id,
    TripId,
    UserId,
    InvitedBy,
    PermissionLevel,
    Status,
    InvitedAt,
    RespondedAt,
}

#[derive(Iden)]
enum TripTemplates {
    Table,
    Id,
    CreatedBy,
    Name,
    Description,
    Category,
    TemplateData,
    DurationDays,
    EstimatedBudgetMinor,
    Currency,
    Difficulty,
    IsPublic,
    UseCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Cities {
    Table,
    Id,
    Name,
    Country,
    CountryCode,
    Latitude,
    Longitude,
    Timezone,
    Population,
    Currency,
    Language,
    Description,
    BestTimeToVisit,
    AverageTemperature,
    PopularAttractions,
    TravelTips,
    SafetyRating,
    CostLevel,
    ImageUrl,
    CreatedAt,
}

#[derive(Iden)]
enum ActivityCatalog {
    Table,
    Id,
    Name,
    Category,
    Description,
    CityName,
    Country,
    LocationName,
    Address,
    AverageCostMinor,
    CostRangeMinMinor,
    CostRangeMaxMinor,
    Currency,
    EstimatedDurationMinutes,
    Difficulty,
    BookingRequired,
    Rating,
    ReviewCount,
    ImageUrls,
    Tags,
    IsVerified,
    CreatedAt,
}

fn money<T: IntoIden + 'static>(col: T) -> ColumnDef {
    ColumnDef::new(col).big_integer().not_null().default(0).to_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users and personal settings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::FirstName).string().not_null())
                    .col(ColumnDef::new(Users::LastName).string().not_null())
                    .col(ColumnDef::new(Users::PhoneNumber).string())
                    .col(ColumnDef::new(Users::City).string())
                    .col(ColumnDef::new(Users::Country).string())
                    .col(ColumnDef::new(Users::AdditionalInfo).text())
                    .col(ColumnDef::new(Users::PhotoUrl).string())
                    .col(
                        ColumnDef::new(Users::LanguagePreference)
                            .string()
                            .not_null()
                            .default("en"),
                    )
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserProfiles::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserProfiles::Bio).text())
                    .col(ColumnDef::new(UserProfiles::Website).string())
                    .col(ColumnDef::new(UserProfiles::BirthDate).date())
                    .col(ColumnDef::new(UserProfiles::TravelStyle).json().not_null())
                    .col(
                        ColumnDef::new(UserProfiles::NotificationPreferences)
                            .json()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserProfiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserProfiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_profiles-user_id")
                            .from(UserProfiles::Table, UserProfiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserPreferences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserPreferences::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserPreferences::DefaultCurrency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(
                        ColumnDef::new(UserPreferences::BudgetRange)
                            .string()
                            .not_null()
                            .default("mid_range"),
                    )
                    .col(
                        ColumnDef::new(UserPreferences::TravelStyle)
                            .string()
                            .not_null()
                            .default("culture"),
                    )
                    .col(
                        ColumnDef::new(UserPreferences::EmailNotifications)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(UserPreferences::TripReminders)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(UserPreferences::BudgetAlerts)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(UserPreferences::MarketingEmails)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UserPreferences::ProfileVisibility)
                            .string()
                            .not_null()
                            .default("private"),
                    )
                    .col(
                        ColumnDef::new(UserPreferences::TripSharingDefault)
                            .string()
                            .not_null()
                            .default("private"),
                    )
                    .col(
                        ColumnDef::new(UserPreferences::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_preferences-user_id")
                            .from(UserPreferences::Table, UserPreferences::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SavedDestinations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SavedDestinations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SavedDestinations::UserId).string().not_null())
                    .col(
                        ColumnDef::new(SavedDestinations::CityName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SavedDestinations::Country).string().not_null())
                    .col(ColumnDef::new(SavedDestinations::Notes).text())
                    .col(
                        ColumnDef::new(SavedDestinations::Priority)
                            .integer()
                            .not_null()
                            .default(2),
                    )
                    .col(
                        ColumnDef::new(SavedDestinations::SavedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-saved_destinations-user_id")
                            .from(SavedDestinations::Table, SavedDestinations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-saved_destinations-user-city-country-unique")
                    .table(SavedDestinations::Table)
                    .col(SavedDestinations::UserId)
                    .col(SavedDestinations::CityName)
                    .col(SavedDestinations::Country)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Trips
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Trips::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Trips::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Trips::UserId).string().not_null())
                    .col(ColumnDef::new(Trips::Name).string().not_null())
                    .col(ColumnDef::new(Trips::Description).text())
                    .col(ColumnDef::new(Trips::StartDate).date().not_null())
                    .col(ColumnDef::new(Trips::EndDate).date().not_null())
                    .col(ColumnDef::new(Trips::CoverImageUrl).string())
                    .col(
                        ColumnDef::new(Trips::IsPublic)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Trips::Status)
                            .string()
                            .not_null()
                            .default("planning"),
                    )
                    .col(ColumnDef::new(Trips::EstimatedBudgetMinor).big_integer())
                    .col(ColumnDef::new(Trips::ActualBudgetMinor).big_integer())
                    .col(
                        ColumnDef::new(Trips::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(
                        ColumnDef::new(Trips::CollaboratorsCanEdit)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Trips::AutoCalculateBudget)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Trips::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Trips::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trips-user_id")
                            .from(Trips::Table, Trips::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-trips-user_id-start_date")
                    .table(Trips::Table)
                    .col(Trips::UserId)
                    .col(Trips::StartDate)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Stops
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Stops::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Stops::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Stops::TripId).string().not_null())
                    .col(ColumnDef::new(Stops::CityName).string().not_null())
                    .col(ColumnDef::new(Stops::Country).string().not_null())
                    .col(ColumnDef::new(Stops::StartDate).date().not_null())
                    .col(ColumnDef::new(Stops::EndDate).date().not_null())
                    .col(
                        ColumnDef::new(Stops::OrderIndex)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Stops::Latitude).double())
                    .col(ColumnDef::new(Stops::Longitude).double())
                    .col(ColumnDef::new(Stops::Timezone).string())
                    .col(ColumnDef::new(Stops::Notes).text())
                    .col(ColumnDef::new(Stops::AccommodationName).string())
                    .col(ColumnDef::new(Stops::AccommodationAddress).text())
                    .col(ColumnDef::new(Stops::AccommodationCostMinor).big_integer())
                    .col(
                        ColumnDef::new(Stops::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Stops::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-stops-trip_id")
                            .from(Stops::Table, Stops::TripId)
                            .to(Trips::Table, Trips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-stops-trip_id-order_index")
                    .table(Stops::Table)
                    .col(Stops::TripId)
                    .col(Stops::OrderIndex)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Activities
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Activities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Activities::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Activities::StopId).string().not_null())
                    .col(ColumnDef::new(Activities::Name).string().not_null())
                    .col(
                        ColumnDef::new(Activities::Category)
                            .string()
                            .not_null()
                            .default("other"),
                    )
                    .col(ColumnDef::new(Activities::Description).text())
                    .col(ColumnDef::new(Activities::Notes).text())
                    .col(ColumnDef::new(Activities::LocationName).string())
                    .col(ColumnDef::new(Activities::Address).text())
                    .col(ColumnDef::new(Activities::StartTime).time())
                    .col(ColumnDef::new(Activities::EndTime).time())
                    .col(ColumnDef::new(Activities::DurationMinutes).integer())
                    .col(ColumnDef::new(Activities::CostMinor).big_integer())
                    .col(
                        ColumnDef::new(Activities::IsPaid)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Activities::Priority)
                            .integer()
                            .not_null()
                            .default(2),
                    )
                    .col(
                        ColumnDef::new(Activities::IsBooked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Activities::BookingReference).string())
                    .col(ColumnDef::new(Activities::WebsiteUrl).string())
                    .col(ColumnDef::new(Activities::PhoneNumber).string())
                    .col(ColumnDef::new(Activities::ImageUrl).string())
                    .col(
                        ColumnDef::new(Activities::WeatherDependent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Activities::IndoorActivity)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Activities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Activities::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-activities-stop_id")
                            .from(Activities::Table, Activities::StopId)
                            .to(Stops::Table, Stops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-activities-stop_id")
                    .table(Activities::Table)
                    .col(Activities::StopId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Budgets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Budgets::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Budgets::TripId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Budgets::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(money(Budgets::TransportCostMinor))
                    .col(money(Budgets::StayCostMinor))
                    .col(money(Budgets::ActivityCostMinor))
                    .col(money(Budgets::MealCostMinor))
                    .col(money(Budgets::ShoppingCostMinor))
                    .col(money(Budgets::MiscellaneousCostMinor))
                    .col(ColumnDef::new(Budgets::TransportLimitMinor).big_integer())
                    .col(ColumnDef::new(Budgets::StayLimitMinor).big_integer())
                    .col(ColumnDef::new(Budgets::ActivityLimitMinor).big_integer())
                    .col(ColumnDef::new(Budgets::MealLimitMinor).big_integer())
                    .col(ColumnDef::new(Budgets::ShoppingLimitMinor).big_integer())
                    .col(ColumnDef::new(Budgets::MiscellaneousLimitMinor).big_integer())
                    .col(
                        ColumnDef::new(Budgets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budgets-trip_id")
                            .from(Budgets::Table, Budgets::TripId)
                            .to(Trips::Table, Trips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Sharing and collaboration
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SharedItineraries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SharedItineraries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SharedItineraries::TripId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SharedItineraries::PublicSlug)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SharedItineraries::AllowComments)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SharedItineraries::AllowCopying)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SharedItineraries::PasswordProtected)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(SharedItineraries::AccessPasswordHash).string())
                    .col(
                        ColumnDef::new(SharedItineraries::ViewCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SharedItineraries::CopyCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SharedItineraries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SharedItineraries::ExpiresAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-shared_itineraries-trip_id")
                            .from(SharedItineraries::Table, SharedItineraries::TripId)
                            .to(Trips::Table, Trips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TripCollaborators::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TripCollaborators::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TripCollaborators::TripId).string().not_null())
                    .col(ColumnDef::new(TripCollaborators::UserId).string().not_null())
                    .col(
                        ColumnDef::new(TripCollaborators::InvitedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TripCollaborators::PermissionLevel)
                            .string()
                            .not_null()
                            .default("view"),
                    )
                    .col(
                        ColumnDef::new(TripCollaborators::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(TripCollaborators::InvitedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TripCollaborators::RespondedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trip_collaborators-trip_id")
                            .from(TripCollaborators::Table, TripCollaborators::TripId)
                            .to(Trips::Table, Trips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trip_collaborators-user_id")
                            .from(TripCollaborators::Table, TripCollaborators::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trip_collaborators-invited_by")
                            .from(TripCollaborators::Table, TripCollaborators::InvitedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-trip_collaborators-trip_id-user_id-unique")
                    .table(TripCollaborators::Table)
                    .col(TripCollaborators::TripId)
                    .col(TripCollaborators::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Templates
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TripTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TripTemplates::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TripTemplates::CreatedBy).string().not_null())
                    .col(ColumnDef::new(TripTemplates::Name).string().not_null())
                    .col(ColumnDef::new(TripTemplates::Description).text())
                    .col(ColumnDef::new(TripTemplates::Category).string())
                    .col(ColumnDef::new(TripTemplates::TemplateData).json().not_null())
                    .col(ColumnDef::new(TripTemplates::DurationDays).integer().not_null())
                    .col(ColumnDef::new(TripTemplates::EstimatedBudgetMinor).big_integer())
                    .col(
                        ColumnDef::new(TripTemplates::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(
                        ColumnDef::new(TripTemplates::Difficulty)
                            .string()
                            .not_null()
                            .default("moderate"),
                    )
                    .col(
                        ColumnDef::new(TripTemplates::IsPublic)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TripTemplates::UseCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TripTemplates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TripTemplates::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trip_templates-created_by")
                            .from(TripTemplates::Table, TripTemplates::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Reference catalog
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Cities::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Cities::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Cities::Name).string().not_null())
                    .col(ColumnDef::new(Cities::Country).string().not_null())
                    .col(ColumnDef::new(Cities::CountryCode).string().not_null())
                    .col(ColumnDef::new(Cities::Latitude).double())
                    .col(ColumnDef::new(Cities::Longitude).double())
                    .col(ColumnDef::new(Cities::Timezone).string())
                    .col(ColumnDef::new(Cities::Population).big_integer())
                    .col(ColumnDef::new(Cities::Currency).string())
                    .col(ColumnDef::new(Cities::Language).string())
                    .col(ColumnDef::new(Cities::Description).text())
                    .col(ColumnDef::new(Cities::BestTimeToVisit).text())
                    .col(ColumnDef::new(Cities::AverageTemperature).double())
                    .col(ColumnDef::new(Cities::PopularAttractions).json().not_null())
                    .col(ColumnDef::new(Cities::TravelTips).json().not_null())
                    .col(ColumnDef::new(Cities::SafetyRating).integer())
                    .col(ColumnDef::new(Cities::CostLevel).string())
                    .col(ColumnDef::new(Cities::ImageUrl).string())
                    .col(
                        ColumnDef::new(Cities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cities-name-country-unique")
                    .table(Cities::Table)
                    .col(Cities::Name)
                    .col(Cities::Country)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ActivityCatalog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActivityCatalog::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ActivityCatalog::Name).string().not_null())
                    .col(ColumnDef::new(ActivityCatalog::Category).string().not_null())
                    .col(ColumnDef::new(ActivityCatalog::Description).text())
                    .col(ColumnDef::new(ActivityCatalog::CityName).string().not_null())
                    .col(ColumnDef::new(ActivityCatalog::Country).string().not_null())
                    .col(ColumnDef::new(ActivityCatalog::LocationName).string())
                    .col(ColumnDef::new(ActivityCatalog::Address).text())
                    .col(ColumnDef::new(ActivityCatalog::AverageCostMinor).big_integer())
                    .col(ColumnDef::new(ActivityCatalog::CostRangeMinMinor).big_integer())
                    .col(ColumnDef::new(ActivityCatalog::CostRangeMaxMinor).big_integer())
                    .col(
                        ColumnDef::new(ActivityCatalog::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(ColumnDef::new(ActivityCatalog::EstimatedDurationMinutes).integer())
                    .col(ColumnDef::new(ActivityCatalog::Difficulty).string())
                    .col(
                        ColumnDef::new(ActivityCatalog::BookingRequired)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ActivityCatalog::Rating).double())
                    .col(
                        ColumnDef::new(ActivityCatalog::ReviewCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ActivityCatalog::ImageUrls).json().not_null())
                    .col(ColumnDef::new(ActivityCatalog::Tags).json().not_null())
                    .col(
                        ColumnDef::new(ActivityCatalog::IsVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ActivityCatalog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-activity_catalog-city_name-country")
                    .table(ActivityCatalog::Table)
                    .col(ActivityCatalog::CityName)
                    .col(ActivityCatalog::Country)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-activity_catalog-category")
                    .table(ActivityCatalog::Table)
                    .col(ActivityCatalog::Category)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ActivityCatalog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TripTemplates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TripCollaborators::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SharedItineraries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Activities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Stops::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Trips::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SavedDestinations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserPreferences::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserProfiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
