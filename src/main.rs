//! Demo driver: wires file storage and static content into a coordinator,
//! plays a short script of user actions and data changes, then saves.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use tabsurface::adapters::mock::{sample_presentation, StaticContent};
use tabsurface::adapters::FileStorage;
use tabsurface::config::CoreConfig;
use tabsurface::coordinator::{Coordinator, CoreEvent, DataChange, EventKind, Interaction};
use tabsurface::logging::init_logging;
use tabsurface::surfaces::Priority;
use tabsurface::view::ViewId;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Real time between scheduler advances.
const TICK: Duration = Duration::from_millis(50);

/// Real time between scripted steps.
const STEP: Duration = Duration::from_millis(400);

#[derive(Debug)]
enum Step {
    Switch(ViewId),
    Data(DataChange),
    Interact(ViewId, Interaction),
    Update(ViewId, Priority),
}

fn script() -> Vec<Step> {
    vec![
        Step::Interact(ViewId::Categorize, Interaction::Scroll),
        Step::Data(DataChange::TabsCategorized),
        Step::Switch(ViewId::Saved),
        Step::Data(DataChange::GroupingChanged {
            view: ViewId::Saved,
            group_by: "domain".to_string(),
        }),
        Step::Data(DataChange::TabsSaved),
        Step::Switch(ViewId::Settings),
        Step::Interact(ViewId::Settings, Interaction::Change),
        Step::Update(ViewId::Settings, Priority::Normal),
        Step::Switch(ViewId::Categorize),
    ]
}

async fn apply(coordinator: &mut Coordinator, step: Step) {
    tracing::debug!("Step: {:?}", step);
    match step {
        Step::Switch(view) => {
            let outcome = coordinator.switch_view(view).await;
            tracing::info!("switch_view({}) -> {:?}", view, outcome);
        }
        Step::Data(change) => {
            let updates = coordinator.handle_data_change(change).await;
            tracing::info!("Data change issued {} update(s)", updates.len());
        }
        Step::Interact(view, interaction) => coordinator.record_interaction(view, interaction),
        Step::Update(view, priority) => {
            let outcome = coordinator.update_content(view, priority).await;
            tracing::info!("update_content({}, {}) -> {:?}", view, priority, outcome);
        }
    }
}

fn main() -> Result<()> {
    if std::env::args().any(|arg| arg == "--version" || arg == "-V") {
        println!("tabsurface {}", VERSION);
        return Ok(());
    }

    color_eyre::install()?;
    init_logging();

    let config = CoreConfig::from_env();
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config))
}

async fn run(config: CoreConfig) -> Result<()> {
    let storage = match &config.storage_path {
        Some(path) => FileStorage::with_path(path),
        None => FileStorage::new()?,
    };
    tracing::info!("Settings file: {}", storage.path().display());

    let mut coordinator = Coordinator::new(
        sample_presentation(),
        Arc::new(storage),
        Arc::new(StaticContent::new()),
        config,
    );
    coordinator.add_listener(
        EventKind::ViewSwitched,
        Box::new(|event: &CoreEvent| {
            if let CoreEvent::ViewSwitched {
                from, to, degraded, ..
            } = event
            {
                tracing::info!("View switched: {} -> {} (degraded: {})", from, to, degraded);
            }
            Ok(())
        }),
    );

    coordinator.initialize().await?;

    let mut steps = script().into_iter();
    let mut ticker = tokio::time::interval(TICK);
    let mut stepper = tokio::time::interval(STEP);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                coordinator.advance(TICK).await;
            }
            _ = stepper.tick() => {
                match steps.next() {
                    Some(step) => apply(&mut coordinator, step).await,
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    coordinator.stop_auto_save();
    let outcome = coordinator.handle_page_hide().await;
    tracing::info!("Final save: {:?}", outcome);
    println!("{}", serde_json::to_string_pretty(&coordinator.status())?);
    Ok(())
}
