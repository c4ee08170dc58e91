use std::{path::PathBuf, str::FromStr, time::Duration};

use chrono::Local;
use clap::{CommandFactory, Parser, Subcommand};
use dotenv::dotenv;
use openpractice::{
    COUNTDOWN_TICKS, ConnectivityBridge, DeviceChannel, HttpChannel, NullChannel, OpenPractice,
    PracticeSession, ReadinessManager, SessionPhase, SimulatedSensor,
};
use openpractice_db::{DatabaseHandler, import::SampleImport, recompute::EffortRecompute};
use openpractice_types::{Practice, PracticeSettings, keys};
use tokio::time::sleep;

#[derive(Parser)]
pub struct OpenPracticeCli {
    #[arg(env, long)]
    pub database_url: String,
    /// Endpoint of the paired device, e.g. `http://watch.local:8321/bridge`
    #[arg(env, long)]
    pub peer_url: Option<String>,
    #[clap(subcommand)]
    pub subcommand: OpenPracticeCommand,
}

#[derive(Subcommand)]
pub enum OpenPracticeCommand {
    ///
    /// Compute today's readiness score once and print it
    ///
    Refresh,
    ///
    /// Keep recomputing readiness on the update schedule
    ///
    Watch,
    ///
    /// Streaks, weekly load and recent sessions at a glance
    ///
    Dashboard,
    ///
    /// Run a guided practice from the terminal
    ///
    Session {
        practice: PracticeChoice,
        #[arg(long, default_value_t = 3)]
        seconds_per_exercise: u64,
    },
    ///
    /// List the practice catalog
    ///
    Practices,
    ///
    /// Show or change kettlebell weights, swing style and age
    ///
    Settings {
        #[clap(subcommand)]
        action: SettingsCommand,
    },
    ///
    /// Load a CSV export of wearable samples
    ///
    Import { path: PathBuf },
    ///
    /// Re-score every stored session with the current effort model
    ///
    RecomputeEffort,
    ///
    /// Apply a bridge payload, from the argument or stdin
    ///
    Receive { payload: Option<String> },
    ///
    /// Generate shell completions
    ///
    Completions { shell: clap_complete::Shell },
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    Show,
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(error) = dotenv() {
        println!("{}", error);
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("sqlx::query", log::LevelFilter::Off)
        .filter_module("sea_orm_migration::migrator", log::LevelFilter::Off)
        .init();

    let cli = OpenPracticeCli::parse();

    // completions must not require a reachable database
    if let OpenPracticeCommand::Completions { shell } = cli.subcommand {
        clap_complete::generate(
            shell,
            &mut OpenPracticeCli::command(),
            "openpractice",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    let database = DatabaseHandler::new(cli.database_url).await;

    match cli.subcommand {
        OpenPracticeCommand::Refresh => match cli.peer_url {
            Some(peer) => refresh_once(database, HttpChannel::new(peer)).await,
            None => refresh_once(database, NullChannel).await,
        },
        OpenPracticeCommand::Watch => match cli.peer_url {
            Some(peer) => {
                ReadinessManager::new(database, HttpChannel::new(peer))
                    .watch()
                    .await
            }
            None => ReadinessManager::new(database, NullChannel).watch().await,
        },
        OpenPracticeCommand::Dashboard => {
            let app = OpenPractice::new(database);
            let report = app.dashboard(Local::now().naive_local()).await?;
            print!("{report}");
            Ok(())
        }
        OpenPracticeCommand::Session {
            practice,
            seconds_per_exercise,
        } => run_session(database, practice, seconds_per_exercise).await,
        OpenPracticeCommand::Practices => {
            let app = OpenPractice::new(database);
            let settings = app.load_settings().await?;
            for practice in Practice::catalog(&settings) {
                println!(
                    "{} ({} exercises): `{}`",
                    practice.display_name,
                    practice.exercise_count(),
                    practice.name,
                );
            }
            Ok(())
        }
        OpenPracticeCommand::Settings { action } => settings_command(database, action).await,
        OpenPracticeCommand::Import { path } => {
            let file = std::fs::File::open(&path)?;
            SampleImport::new(database.connection()).run(file).await?;
            Ok(())
        }
        OpenPracticeCommand::RecomputeEffort => {
            EffortRecompute::new(&database).run().await?;
            Ok(())
        }
        OpenPracticeCommand::Receive { payload } => {
            let raw = match payload {
                Some(raw) => raw,
                None => std::io::read_to_string(std::io::stdin())?,
            };
            let value = serde_json::from_str(&raw)?;

            let bridge = ConnectivityBridge::new(database, NullChannel);
            bridge
                .handle_incoming(value, Local::now().naive_local())
                .await
        }
        OpenPracticeCommand::Completions { .. } => Ok(()),
    }
}

async fn refresh_once<C: DeviceChannel>(
    database: DatabaseHandler,
    channel: C,
) -> anyhow::Result<()> {
    let mut manager = ReadinessManager::new(database, channel);
    let state = manager.refresh(Local::now().naive_local()).await?;

    println!(
        "Readiness: {} ({})",
        state.result.score,
        state.result.band().label()
    );
    println!("{}", state.insight());
    Ok(())
}

async fn run_session(
    database: DatabaseHandler,
    choice: PracticeChoice,
    seconds_per_exercise: u64,
) -> anyhow::Result<()> {
    let app = OpenPractice::new(database.clone());
    let settings = app.load_settings().await?;
    let practice = Practice::by_name(choice.tag(), &settings)?;
    let display_name = practice.display_name.clone();

    let sensor = SimulatedSensor::new(Local::now().naive_local(), seconds_per_exercise);
    let mut session = PracticeSession::new(database, sensor);

    session.select(practice);
    if session.phase() == SessionPhase::AwaitingSettings {
        session.confirm_settings(&settings)?;
    }

    println!("{display_name}");
    for tick in (1..=COUNTDOWN_TICKS).rev() {
        println!("{tick}...");
        sleep(Duration::from_millis(300)).await;
    }

    session.begin().await?;
    if session.phase() == SessionPhase::Idle {
        println!("The recorder is unavailable, nothing was started.");
        return Ok(());
    }

    while let Some((segment, exercise)) = session.current_exercise() {
        println!("[{segment}] {}", exercise.description());
        sleep(Duration::from_secs(seconds_per_exercise)).await;
        session.advance().await?;
    }
    session.finish().await?;

    if let Some(finished) = session.outcome() {
        println!();
        println!("{}", finished.workload);
        println!("Effort: {}", finished.record.effort.unwrap_or(0));
    }
    Ok(())
}

async fn settings_command(
    database: DatabaseHandler,
    action: SettingsCommand,
) -> anyhow::Result<()> {
    let app = OpenPractice::new(database);
    match action {
        SettingsCommand::Show => {
            let settings = app.load_settings().await?;
            for key in PracticeSettings::weight_keys() {
                println!("{key}: {}kg", settings.weight(key)?);
            }
            println!("{}: {}", keys::TWO_HANDED_SWINGS, settings.two_handed_swings);
            match app.database.kv_get_i64(keys::USER_AGE).await? {
                Some(age) => println!("{}: {age}", keys::USER_AGE),
                None => println!("{}: unset (sessions stay unscored)", keys::USER_AGE),
            }
            Ok(())
        }
        SettingsCommand::Set { key, value } => {
            match key.as_str() {
                keys::TWO_HANDED_SWINGS => {
                    let flag: bool = value.parse()?;
                    app.database.kv_set_bool(keys::TWO_HANDED_SWINGS, flag).await?;
                }
                keys::USER_AGE => {
                    let age: i64 = value.parse()?;
                    app.database.kv_set_i64(keys::USER_AGE, age).await?;
                }
                _ => {
                    let weight: u32 = value.parse()?;
                    let mut settings = app.load_settings().await?;
                    settings.set_weight(&key, weight)?;
                    app.save_settings(&settings).await?;
                }
            }
            println!("{key} = {value}");
            Ok(())
        }
    }
}

#[derive(Clone, Debug)]
pub enum PracticeChoice {
    SimpleAndSinister,
    Stretches,
    Named(String),
}

impl FromStr for PracticeChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s&s" | "simple" | "sinister" | "strength" => Ok(Self::SimpleAndSinister),
            "stretch" | "stretches" | "mobility" => Ok(Self::Stretches),
            _ => Ok(Self::Named(s.to_string())),
        }
    }
}

impl PracticeChoice {
    fn tag(&self) -> &str {
        match self {
            Self::SimpleAndSinister => Practice::SIMPLE_AND_SINISTER,
            Self::Stretches => Practice::STRETCHES,
            Self::Named(name) => name,
        }
    }
}
