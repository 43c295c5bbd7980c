//! `cleantrack` entry-point: loads settings, wires adapters, and runs one
//! command, printing its result as JSON on stdout.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::sync::Arc;

use clap::Parser;
use cleantrack::domain::ports::{RecordStore, SubmitComplaint, UserProfileSource};
use cleantrack::domain::{
    ComplaintSubmissionService, ComplaintWorkflow, Session, SessionResolver, UserId,
};
use cleantrack::inbound::cli::{Cli, CliState, Command};
use cleantrack::outbound::cloudinary::CloudinaryUploader;
use cleantrack::outbound::firestore::{FirestoreRecordStore, FirestoreUserProfileSource};
use cleantrack::outbound::memory::{InMemoryRecordStore, InMemoryUserProfileSource};
use cleantrack::settings::{CleanTrackSettings, StoreBackend};
use color_eyre::eyre::{Context, Report, Result, eyre};
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let settings = CleanTrackSettings::load_from_iter([OsString::from("cleantrack")])
        .map_err(|error| eyre!("failed to load settings: {error}"))?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(async_main(cli.command, settings))
}

async fn async_main(command: Command, settings: CleanTrackSettings) -> Result<()> {
    let user_id = settings.user_id()?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    match settings.store_backend()? {
        StoreBackend::Firestore => {
            let config = settings.firestore_config()?;
            let profiles = FirestoreUserProfileSource::new(config.clone())
                .wrap_err("failed to build Firestore profile client")?;
            let session = resolve_session(profiles, user_id).await?;
            let store =
                FirestoreRecordStore::new(config).wrap_err("failed to build Firestore client")?;
            execute(store, clock, &settings, &session, command).await
        }
        StoreBackend::Memory => {
            let session = resolve_session(InMemoryUserProfileSource::default(), user_id).await?;
            let store = InMemoryRecordStore::new(clock.clone());
            execute(store, clock, &settings, &session, command).await
        }
    }
}

async fn resolve_session<P>(profiles: P, user_id: UserId) -> Result<Session>
where
    P: UserProfileSource + 'static,
{
    SessionResolver::new(Arc::new(profiles))
        .resolve(user_id)
        .await
        .map_err(Report::new)
}

async fn execute<S>(
    store: S,
    clock: Arc<dyn Clock>,
    settings: &CleanTrackSettings,
    session: &Session,
    command: Command,
) -> Result<()>
where
    S: RecordStore + 'static,
{
    let workflow = Arc::new(ComplaintWorkflow::new(Arc::new(store), clock.clone()));
    let submissions = match settings.cloudinary_config() {
        Ok(config) => {
            let uploader =
                CloudinaryUploader::new(config, clock).wrap_err("failed to build upload client")?;
            let service = ComplaintSubmissionService::new(workflow.clone(), Arc::new(uploader))
                .with_upload_concurrency(settings.upload_concurrency());
            Some(Arc::new(service) as Arc<dyn SubmitComplaint>)
        }
        Err(error) => {
            debug!(error = %error, "image uploads disabled");
            None
        }
    };

    let state = CliState {
        command: workflow.clone(),
        query: workflow,
        submissions,
    };
    let output = state.run(session, command).await.map_err(Report::new)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&output).wrap_err("failed to render output")?
    );
    Ok(())
}
