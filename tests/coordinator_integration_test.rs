//! Integration tests for the view-switch coordinator
//!
//! These tests drive a full coordinator over in-memory storage and static
//! content: initialization, switching, data changes and early updates.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{
    fragment_with_items, initialized_core, presentation_with, sample_fragment, StaticContent,
    StorageConfig, TestCoreBuilder,
};
use tabsurface::coordinator::{CoreEvent, DataChange, EventKind, TimerJob};
use tabsurface::render::RenderOutcome;
use tabsurface::surface::{Element, ScrollOffsets, TextSelection, COLLAPSED_CLASS};
use tabsurface::{Priority, SwitchOutcome, ViewId};

fn is_collapsed(core: &common::TestCore, view: ViewId, id: &str) -> bool {
    core.coordinator
        .presentation()
        .element_by_id(view, id)
        .unwrap()
        .has_class(COLLAPSED_CLASS)
}

fn record_events(core: &mut common::TestCore, kind: EventKind) -> Arc<Mutex<Vec<CoreEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    core.coordinator.add_listener(
        kind,
        Box::new(move |event: &CoreEvent| {
            sink.lock().unwrap().push(event.clone());
            Ok(())
        }),
    );
    events
}

#[tokio::test]
async fn test_initialize_preloads_every_view() {
    let core = initialized_core().await;

    for view in ViewId::ALL {
        assert_eq!(core.content.calls(view), 1, "{} preloaded once", view);
        assert_eq!(core.coordinator.surfaces().queue_len(view), 0);
    }
    assert_eq!(core.offscreen_items(ViewId::Saved), vec!["saved-a", "saved-b", "saved-c"]);
    assert_eq!(
        core.coordinator.presentation().displayed_view(),
        Some(ViewId::Categorize)
    );
    assert_eq!(
        core.visible_items(ViewId::Categorize),
        vec!["docs.rs", "crates.io", "lwn.net"]
    );
}

#[tokio::test]
async fn test_initialize_restores_stored_active_view() {
    let core = TestCoreBuilder::new()
        .with_storage(StorageConfig::new().with_active_view("saved").build())
        .initialized()
        .await;

    assert_eq!(core.coordinator.active_view(), ViewId::Saved);
    assert_eq!(
        core.coordinator.presentation().displayed_view(),
        Some(ViewId::Saved)
    );
    assert_eq!(core.visible_items(ViewId::Saved), vec!["saved-a", "saved-b", "saved-c"]);
}

#[tokio::test]
async fn test_initialize_fails_when_active_view_has_no_surface() {
    let mut core = TestCoreBuilder::new()
        .with_storage(StorageConfig::new().with_active_view("settings").build())
        .with_presentation(presentation_with(&[ViewId::Categorize, ViewId::Saved]))
        .build();

    let err = core.coordinator.initialize().await.unwrap_err();
    assert_eq!(err.error_code(), "E_INIT");
    assert!(!err.is_recoverable());
}

#[tokio::test]
async fn test_initialize_survives_storage_load_failure() {
    let core = TestCoreBuilder::new()
        .with_storage(StorageConfig::new().failing_load().build())
        .initialized()
        .await;

    assert!(core.coordinator.is_initialized());
    assert_eq!(core.coordinator.active_view(), ViewId::Categorize);
}

#[tokio::test]
async fn test_switch_completeness() {
    let mut core = initialized_core().await;
    let presentation = core.coordinator.presentation_mut();
    presentation
        .surface_mut(ViewId::Categorize)
        .unwrap()
        .root_mut()
        .live
        .scroll = ScrollOffsets::new(120, 0);
    assert!(presentation.focus_element(
        ViewId::Categorize,
        "searchInput",
        Some(TextSelection { start: 2, end: 4 })
    ));

    let outcome = core.coordinator.switch_view(ViewId::Saved).await;

    assert_eq!(outcome, SwitchOutcome::Switched);
    assert_eq!(core.coordinator.active_view(), ViewId::Saved);
    assert_eq!(core.coordinator.store().global().active_view_id, ViewId::Saved);
    assert!(core.content.calls(ViewId::Saved) >= 1);

    let snapshot = core.coordinator.store().snapshot(ViewId::Categorize);
    assert_eq!(snapshot.scroll, ScrollOffsets::new(120, 0));
    let focus = snapshot.focus.as_ref().unwrap();
    assert_eq!(focus.element_id, "searchInput");
    assert_eq!(focus.selection_start, Some(2));
    assert_eq!(focus.selection_end, Some(4));

    assert_eq!(
        core.coordinator.presentation().displayed_view(),
        Some(ViewId::Saved)
    );
    // Persisted right away.
    let stored = core.storage.settings().ui_state.unwrap();
    assert_eq!(stored["global"]["activeViewId"], "saved");
}

#[tokio::test]
async fn test_switch_back_restores_scroll_and_focus() {
    let mut core = initialized_core().await;
    core.coordinator.advance(Duration::from_millis(50)).await;
    let presentation = core.coordinator.presentation_mut();
    presentation
        .surface_mut(ViewId::Categorize)
        .unwrap()
        .root_mut()
        .live
        .scroll = ScrollOffsets::new(80, 0);
    presentation.focus_element(ViewId::Categorize, "searchInput", None);

    core.coordinator.switch_view(ViewId::Saved).await;
    core.coordinator
        .presentation_mut()
        .surface_mut(ViewId::Categorize)
        .unwrap()
        .root_mut()
        .live
        .scroll = ScrollOffsets::default();
    core.coordinator.switch_view(ViewId::Categorize).await;

    let focused = core
        .coordinator
        .presentation()
        .focused_element(ViewId::Categorize)
        .and_then(|el| el.id.clone());
    assert_eq!(focused.as_deref(), Some("searchInput"));

    // Scroll waits for the restore delay.
    assert!(core
        .coordinator
        .is_scheduled(TimerJob::DeferredRestore(ViewId::Categorize)));
    core.coordinator.advance(Duration::from_millis(50)).await;
    let scroll = core
        .coordinator
        .presentation()
        .surface(ViewId::Categorize)
        .unwrap()
        .root()
        .live
        .scroll;
    assert_eq!(scroll, ScrollOffsets::new(80, 0));
}

#[tokio::test]
async fn test_switch_to_active_view_is_noop() {
    let mut core = initialized_core().await;
    let saves = core.storage.save_count();

    let outcome = core.coordinator.switch_view(ViewId::Categorize).await;

    assert_eq!(outcome, SwitchOutcome::AlreadyActive);
    assert_eq!(core.storage.save_count(), saves);
}

#[tokio::test]
async fn test_switch_emits_event() {
    let mut core = initialized_core().await;
    let events = record_events(&mut core, EventKind::ViewSwitched);

    core.coordinator.switch_view(ViewId::Settings).await;

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    match &events[0] {
        CoreEvent::ViewSwitched {
            from, to, degraded, ..
        } => {
            assert_eq!(*from, ViewId::Categorize);
            assert_eq!(*to, ViewId::Settings);
            assert!(!degraded);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_switch_to_uninitialized_view_degrades() {
    let mut core = TestCoreBuilder::new()
        .with_presentation(presentation_with(&[ViewId::Categorize, ViewId::Saved]))
        .initialized()
        .await;
    let events = record_events(&mut core, EventKind::ViewSwitched);

    let outcome = core.coordinator.switch_view(ViewId::Settings).await;

    assert_eq!(outcome, SwitchOutcome::Degraded);
    assert_eq!(core.coordinator.active_view(), ViewId::Settings);
    assert!(matches!(
        events.lock().unwrap()[0],
        CoreEvent::ViewSwitched { degraded: true, .. }
    ));
    assert_eq!(
        core.storage.settings().ui_state.unwrap()["global"]["activeViewId"],
        "settings"
    );
}

#[tokio::test]
async fn test_switch_with_failing_producer_shows_previous_content() {
    let mut core = initialized_core().await;
    core.content.set_should_fail(ViewId::Saved, true);

    let outcome = core.coordinator.switch_view(ViewId::Saved).await;

    assert_eq!(outcome, SwitchOutcome::Switched);
    assert_eq!(core.visible_items(ViewId::Saved), vec!["saved-a", "saved-b", "saved-c"]);
}

#[tokio::test]
async fn test_tabs_saved_scenario() {
    let mut core = initialized_core().await;
    assert_eq!(core.coordinator.active_view(), ViewId::Categorize);
    core.content
        .set_content(ViewId::Saved, fragment_with_items("fresh", &["just-saved"]));
    core.content
        .set_content(ViewId::Categorize, fragment_with_items("left", &["still-open"]));

    let issued = core.coordinator.handle_data_change(DataChange::TabsSaved).await;

    assert_eq!(
        issued,
        vec![
            (ViewId::Saved, Priority::High),
            (ViewId::Categorize, Priority::Normal)
        ]
    );
    // Saved was reconciled before the call returned.
    assert_eq!(core.visible_items(ViewId::Saved), vec!["just-saved"]);
    assert_eq!(core.coordinator.surfaces().queue_len(ViewId::Saved), 0);
    // Categorize is queued, not forced.
    assert_eq!(core.coordinator.surfaces().queue_len(ViewId::Categorize), 1);
    assert_eq!(
        core.visible_items(ViewId::Categorize),
        vec!["docs.rs", "crates.io", "lwn.net"]
    );

    core.coordinator.tick().await;
    assert_eq!(core.coordinator.surfaces().queue_len(ViewId::Categorize), 0);
    assert_eq!(core.visible_items(ViewId::Categorize), vec!["still-open"]);
}

#[tokio::test]
async fn test_early_updates_replay_once_per_view() {
    let mut core = TestCoreBuilder::new().build();

    assert_eq!(
        core.coordinator
            .update_content(ViewId::Categorize, Priority::Normal)
            .await,
        None
    );
    assert_eq!(
        core.coordinator
            .update_content(ViewId::Categorize, Priority::Normal)
            .await,
        None
    );
    assert_eq!(core.coordinator.status().pending_replays, 2);

    core.coordinator.initialize().await.unwrap();

    let status = core.coordinator.status();
    assert_eq!(status.pending_replays, 0);
    assert_eq!(status.replayed, 1);
    // One preload plus exactly one replay.
    assert_eq!(core.content.calls(ViewId::Categorize), 2);
}

#[tokio::test]
async fn test_update_content_skips_unchanged_content() {
    let mut core = initialized_core().await;
    let events = record_events(&mut core, EventKind::ContentUpdated);

    let outcome = core
        .coordinator
        .update_content(ViewId::Categorize, Priority::High)
        .await;

    assert_eq!(outcome, Some(RenderOutcome::Skipped));
    let status = core.coordinator.status();
    let categorize = status.view(ViewId::Categorize).unwrap();
    assert_eq!(categorize.renders.enqueued, 1);
    assert_eq!(categorize.renders.skipped, 1);
    assert_eq!(events.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_keeps_typed_search_and_focus() {
    let mut core = initialized_core().await;
    let presentation = core.coordinator.presentation_mut();
    presentation
        .element_by_id_mut(ViewId::Categorize, "searchInput")
        .unwrap()
        .live
        .value = Some("rus".to_string());
    presentation.focus_element(
        ViewId::Categorize,
        "searchInput",
        Some(TextSelection { start: 3, end: 3 }),
    );
    core.content
        .set_content(ViewId::Categorize, fragment_with_items("work", &["new-tab"]));

    core.coordinator
        .handle_data_change(DataChange::TabsOpened)
        .await;

    let presentation = core.coordinator.presentation();
    assert_eq!(core.visible_items(ViewId::Categorize), vec!["new-tab"]);
    let search = presentation.element_by_id(ViewId::Categorize, "searchInput").unwrap();
    assert_eq!(search.live.value.as_deref(), Some("rus"));
    assert_eq!(
        presentation
            .focused_element(ViewId::Categorize)
            .and_then(|el| el.id.as_deref()),
        Some("searchInput")
    );
    assert_eq!(
        presentation.focus().and_then(|f| f.selection),
        Some(TextSelection { start: 3, end: 3 })
    );
}

#[tokio::test]
async fn test_settings_change_keeps_checked_box() {
    let mut core = initialized_core().await;
    core.coordinator.switch_view(ViewId::Settings).await;
    core.coordinator
        .presentation_mut()
        .element_by_id_mut(ViewId::Settings, "autoCategorize")
        .unwrap()
        .live
        .checked = true;

    let mut fragment = sample_fragment(ViewId::Settings, "none");
    fragment.push(Element::new("p").with_id("notice").with_text("saved").into());
    core.content.set_content(ViewId::Settings, fragment);

    core.coordinator
        .handle_data_change(DataChange::SettingsChanged)
        .await;
    core.coordinator.tick().await;

    let presentation = core.coordinator.presentation();
    assert!(presentation.element_by_id(ViewId::Settings, "notice").is_some());
    assert!(
        presentation
            .element_by_id(ViewId::Settings, "autoCategorize")
            .unwrap()
            .live
            .checked
    );
}

#[tokio::test]
async fn test_expanded_section_survives_data_change() {
    let mut core = initialized_core().await;
    core.coordinator.advance(Duration::from_millis(100)).await;
    core.coordinator
        .presentation_mut()
        .element_by_id_mut(ViewId::Categorize, "section-work")
        .unwrap()
        .set_class(COLLAPSED_CLASS, false);

    // The producer re-emits every section collapsed, plus a new one.
    let mut fragment = sample_fragment(ViewId::Categorize, "category");
    fragment.extend(fragment_with_items("misc", &["example.com"]));
    core.content.set_content(ViewId::Categorize, fragment);

    core.coordinator
        .handle_data_change(DataChange::TabsCategorized)
        .await;
    core.coordinator.advance(Duration::from_millis(200)).await;

    assert!(core
        .visible_items(ViewId::Categorize)
        .contains(&"example.com".to_string()));
    assert!(!is_collapsed(&core, ViewId::Categorize, "section-work"));
    assert!(is_collapsed(&core, ViewId::Categorize, "section-news"));
}

#[tokio::test]
async fn test_uncaptured_view_keeps_producer_sections() {
    let content = StaticContent::new();
    content.set_content(ViewId::Categorize, fragment_with_items("open", &["a"]));
    let mut core = TestCoreBuilder::new()
        .with_content(content)
        .initialized()
        .await;
    assert!(!is_collapsed(&core, ViewId::Categorize, "section-open"));

    core.coordinator.advance(Duration::from_millis(100)).await;

    assert!(!is_collapsed(&core, ViewId::Categorize, "section-open"));
    assert!(core
        .coordinator
        .store()
        .snapshot(ViewId::Categorize)
        .expanded_sections
        .is_none());
}

#[tokio::test]
async fn test_grouping_change_renders_new_grouping() {
    let mut core = initialized_core().await;

    core.coordinator
        .handle_data_change(DataChange::GroupingChanged {
            view: ViewId::Saved,
            group_by: "domain".to_string(),
        })
        .await;

    assert_eq!(core.coordinator.store().snapshot(ViewId::Saved).group_by, "domain");
    assert_eq!(
        core.content.last_saved_request(),
        Some(("domain".to_string(), false))
    );
    let saved = core.coordinator.presentation().surface(ViewId::Saved).unwrap();
    assert!(saved.root().find_by_id("section-domain-1").is_some());
    assert_eq!(
        saved
            .root()
            .find_by_id("unifiedGroupingSelect")
            .unwrap()
            .live
            .value
            .as_deref(),
        Some("domain")
    );
}

#[tokio::test]
async fn test_filter_change_updates_saved_request() {
    let mut core = initialized_core().await;

    let issued = core
        .coordinator
        .handle_data_change(DataChange::FilterChanged {
            search: Some("docs".to_string()),
            show_ignored: true,
        })
        .await;

    assert_eq!(issued, vec![(ViewId::Saved, Priority::Normal)]);
    assert_eq!(
        core.content.last_saved_request(),
        Some(("category".to_string(), true))
    );
    assert_eq!(core.coordinator.store().snapshot(ViewId::Saved).search_text, "docs");
    // A new filter is a new fingerprint key, so the render is queued.
    assert_eq!(core.coordinator.surfaces().queue_len(ViewId::Saved), 1);
    assert!(core.coordinator.is_scheduled(TimerJob::DrainQueues));
}

#[tokio::test]
async fn test_status_serializes() {
    let core = initialized_core().await;

    let status = serde_json::to_value(core.coordinator.status()).unwrap();

    assert_eq!(status["initialized"], true);
    assert_eq!(status["activeView"], "categorize");
    assert_eq!(status["views"].as_array().unwrap().len(), 3);
    assert_eq!(status["views"][1]["view"], "saved");
    assert_eq!(status["views"][1]["queued"], 0);
    assert_eq!(status["views"][1]["fingerprints"], 1);
}
