use std::{error::Error, io::Write, path::PathBuf};

use api_types::{
    Currency,
    activity::ActivityCategory,
    auth::Signup,
    catalog::{CatalogActivityNew, CityNew, CostLevel},
    template::Difficulty,
};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, MIN_PASSWORD_LEN, Money};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "globetrotter_admin")]
#[command(about = "Admin utilities for Globetrotter (bootstrap users, import the catalog)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./globetrotter.db?mode=rwc"
    )]
    database_url: String,

    /// Secret mixed into password hashes, must match the server's.
    #[arg(long, env = "GLOBETROTTER__AUTH__PEPPER")]
    pepper: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Catalog(Catalog),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    country: Option<String>,
}

#[derive(Args, Debug)]
struct Catalog {
    #[command(subcommand)]
    command: CatalogCommand,
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Imports cities from a CSV file with a header row.
    ImportCities { path: PathBuf },
    /// Imports catalog activities from a CSV file with a header row.
    ImportActivities { path: PathBuf },
}

/// List columns are `;` separated.
#[derive(Debug, Deserialize)]
struct CityRecord {
    name: String,
    country: String,
    country_code: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    timezone: Option<String>,
    population: Option<i64>,
    currency: Option<String>,
    language: Option<String>,
    description: Option<String>,
    best_time_to_visit: Option<String>,
    average_temperature: Option<f64>,
    #[serde(default)]
    popular_attractions: String,
    #[serde(default)]
    travel_tips: String,
    safety_rating: Option<u8>,
    cost_level: Option<CostLevel>,
    image_url: Option<String>,
}

/// Costs are decimal amounts in major units of `currency`, e.g. `12.50`.
#[derive(Debug, Deserialize)]
struct ActivityRecord {
    name: String,
    category: ActivityCategory,
    description: Option<String>,
    city_name: String,
    country: String,
    location_name: Option<String>,
    address: Option<String>,
    average_cost: Option<String>,
    cost_range_min: Option<String>,
    cost_range_max: Option<String>,
    currency: Option<String>,
    estimated_duration_minutes: Option<u32>,
    difficulty: Option<Difficulty>,
    #[serde(default)]
    booking_required: bool,
    rating: Option<f64>,
    #[serde(default)]
    review_count: i64,
    #[serde(default)]
    image_urls: String,
    #[serde(default)]
    tags: String,
    #[serde(default)]
    is_verified: bool,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

impl From<CityRecord> for CityNew {
    fn from(r: CityRecord) -> Self {
        CityNew {
            name: r.name,
            country: r.country,
            country_code: r.country_code,
            latitude: r.latitude,
            longitude: r.longitude,
            timezone: r.timezone,
            population: r.population,
            currency: r.currency,
            language: r.language,
            description: r.description,
            best_time_to_visit: r.best_time_to_visit,
            average_temperature: r.average_temperature,
            popular_attractions: split_list(&r.popular_attractions),
            travel_tips: split_list(&r.travel_tips),
            safety_rating: r.safety_rating,
            cost_level: r.cost_level,
            image_url: r.image_url,
        }
    }
}

fn minor_units(
    raw: Option<&str>,
    currency: Currency,
) -> Result<Option<i64>, Box<dyn Error + Send + Sync>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(amount) => Ok(Some(Money::parse(amount, currency)?.minor())),
        None => Ok(None),
    }
}

impl TryFrom<ActivityRecord> for CatalogActivityNew {
    type Error = Box<dyn Error + Send + Sync>;

    fn try_from(r: ActivityRecord) -> Result<Self, Self::Error> {
        let currency = match r.currency.as_deref() {
            Some(code) if !code.trim().is_empty() => Currency::try_from(code)?,
            _ => Currency::default(),
        };
        Ok(CatalogActivityNew {
            name: r.name,
            category: r.category,
            description: r.description,
            city_name: r.city_name,
            country: r.country,
            location_name: r.location_name,
            address: r.address,
            average_cost_minor: minor_units(r.average_cost.as_deref(), currency)?,
            cost_range_min_minor: minor_units(r.cost_range_min.as_deref(), currency)?,
            cost_range_max_minor: minor_units(r.cost_range_max.as_deref(), currency)?,
            currency: Some(currency.code().to_string()),
            estimated_duration_minutes: r.estimated_duration_minutes,
            difficulty: r.difficulty,
            booking_required: r.booking_required,
            rating: r.rating,
            review_count: r.review_count,
            image_urls: split_list(&r.image_urls),
            tags: split_list(&r.tags),
            is_verified: r.is_verified,
        })
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_line(out: &mut std::io::Stderr, msg: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(msg),
        Print("\r\n")
    )?;
    Ok(())
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.chars().count() < MIN_PASSWORD_LEN {
            prompt_line(
                &mut out,
                &format!("Password must be at least {MIN_PASSWORD_LEN} characters."),
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        prompt_line(&mut out, "Passwords do not match. Try again.")?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Inserts every record, reporting failed rows without stopping the import.
async fn import_cities(engine: &Engine, path: &PathBuf) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut reader = csv::Reader::from_path(path)?;
    let (mut imported, mut failed) = (0usize, 0usize);
    for (line, record) in reader.deserialize::<CityRecord>().enumerate() {
        let row = line + 2;
        let result = match record {
            Ok(record) => engine.insert_city(record.into()).await.map_err(Into::into),
            Err(err) => Err(Box::<dyn Error + Send + Sync>::from(err)),
        };
        match result {
            Ok(city) => {
                imported += 1;
                println!("imported city: {} ({})", city.name, city.id);
            }
            Err(err) => {
                failed += 1;
                eprintln!("row {row}: {err}");
            }
        }
    }
    println!("{imported} cities imported, {failed} rows skipped");
    Ok(())
}

async fn import_activities(
    engine: &Engine,
    path: &PathBuf,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut reader = csv::Reader::from_path(path)?;
    let (mut imported, mut failed) = (0usize, 0usize);
    for (line, record) in reader.deserialize::<ActivityRecord>().enumerate() {
        let row = line + 2;
        let result = match record {
            Ok(record) => match CatalogActivityNew::try_from(record) {
                Ok(new) => engine.insert_catalog_activity(new).await.map_err(Into::into),
                Err(err) => Err(err),
            },
            Err(err) => Err(Box::<dyn Error + Send + Sync>::from(err)),
        };
        match result {
            Ok(activity) => {
                imported += 1;
                println!("imported activity: {} ({})", activity.name, activity.id);
            }
            Err(err) => {
                failed += 1;
                eprintln!("row {row}: {err}");
            }
        }
    }
    println!("{imported} activities imported, {failed} rows skipped");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder()
        .database(db)
        .password_pepper(cli.pepper)
        .build()
        .await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;

            let signup = Signup {
                first_name: args.first_name,
                last_name: args.last_name,
                email: args.email,
                password: password.clone(),
                password_confirm: password,
                phone_number: None,
                city: None,
                country: args.country,
                additional_info: None,
                language_preference: None,
            };
            match engine.signup(signup).await {
                Ok(user) => println!("created user: {} ({})", user.email, user.id),
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(1);
                }
            }
        }
        Command::Catalog(Catalog { command }) => match command {
            CatalogCommand::ImportCities { path } => import_cities(&engine, &path).await?,
            CatalogCommand::ImportActivities { path } => {
                import_activities(&engine, &path).await?
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_columns_are_split_on_semicolons() {
        assert_eq!(
            split_list("Louvre; Eiffel Tower;;  "),
            vec!["Louvre".to_string(), "Eiffel Tower".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn city_rows_deserialize_from_csv() {
        let data = "\
name,country,country_code,latitude,longitude,timezone,population,currency,language,description,best_time_to_visit,average_temperature,popular_attractions,travel_tips,safety_rating,cost_level,image_url
Paris,France,FR,48.85,2.35,Europe/Paris,2100000,EUR,French,,Spring,12.5,Louvre;Eiffel Tower,,8,expensive,
";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let record: CityRecord = reader.deserialize().next().unwrap().unwrap();
        let city = CityNew::from(record);
        assert_eq!(city.name, "Paris");
        assert_eq!(city.popular_attractions.len(), 2);
        assert!(city.travel_tips.is_empty());
        assert_eq!(city.description, None);
        assert_eq!(city.cost_level, Some(CostLevel::Expensive));
    }

    fn activity_csv(costs: &str) -> String {
        format!(
            "name,category,description,city_name,country,location_name,address,average_cost,cost_range_min,cost_range_max,currency,estimated_duration_minutes,difficulty,booking_required,rating,review_count,image_urls,tags,is_verified
Louvre,culture,,Paris,France,,,{costs},120,,true,4.8,1000,,museum;art,true
"
        )
    }

    fn activity_row(data: &str) -> ActivityRecord {
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        reader.deserialize().next().unwrap().unwrap()
    }

    #[test]
    fn activity_costs_are_read_in_major_units() {
        let new = CatalogActivityNew::try_from(activity_row(&activity_csv("22.50,17,30.5,EUR")))
            .unwrap();
        assert_eq!(new.average_cost_minor, Some(2250));
        assert_eq!(new.cost_range_min_minor, Some(1700));
        assert_eq!(new.cost_range_max_minor, Some(3050));
        assert_eq!(new.currency.as_deref(), Some("EUR"));
        assert_eq!(new.tags, vec!["museum".to_string(), "art".to_string()]);
    }

    #[test]
    fn activity_rows_default_to_usd_and_reject_bad_amounts() {
        let new = CatalogActivityNew::try_from(activity_row(&activity_csv(",,,"))).unwrap();
        assert_eq!(new.average_cost_minor, None);
        assert_eq!(new.currency.as_deref(), Some("USD"));

        assert!(CatalogActivityNew::try_from(activity_row(&activity_csv("12.345,,,USD"))).is_err());
        assert!(CatalogActivityNew::try_from(activity_row(&activity_csv("-3,,,USD"))).is_err());
    }
}
