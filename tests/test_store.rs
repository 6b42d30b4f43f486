use anyhow::Result;
use metrics_report::analyzer::{ReportAnalyzer, ReportOptions};
use metrics_report::dates::{parse_day, ReportWindow};
use metrics_report::models::{EventData, OsInfo};
use metrics_report::store::RecordStore;

fn start_event(version: &str) -> EventData {
    let mut data = EventData::action("start");
    data.version = Some(version.to_string());
    data.os = Some(OsInfo {
        os_type: Some("Linux".to_string()),
        platform: Some("linux".to_string()),
        release: Some("6.1".to_string()),
    });
    data
}

fn error_event(message: &str) -> EventData {
    let mut data = EventData::action("error");
    data.message = Some(message.to_string());
    data
}

#[test]
fn store_ids_are_unique() -> Result<()> {
    let store = RecordStore::new();
    let a = store.create()?;
    let b = store.create()?;
    assert_ne!(a.id, b.id);
    assert_eq!(store.len(), 2);
    Ok(())
}

#[test]
fn appended_events_survive_round_trip() -> Result<()> {
    let store = RecordStore::new();
    let record = store.create()?;

    store.append(&record.id, "2025-01-01T08:00:00.000Z", start_event("1.2.3"))?;
    store.append(&record.id, "2025-01-01T09:00:00.000Z", error_event("disk full"))?;

    let fetched = store.get(&record.id)?;
    assert_eq!(fetched.event_count(), 2);
    assert_eq!(fetched.meta_data[0].data.action, "start");
    assert_eq!(fetched.meta_data[1].data.message.as_deref(), Some("disk full"));
    Ok(())
}

#[test]
fn store_snapshot_runs_through_the_pipeline() -> Result<()> {
    let store = RecordStore::new();

    let active = store.create()?;
    store.append(&active.id, "2025-01-01T08:00:00.000Z", start_event("1.2.3"))?;
    store.append(&active.id, "2025-01-01T18:00:00.000Z", EventData::action("stop"))?;

    let failing = store.create()?;
    store.append(&failing.id, "2025-01-02T10:00:00.000Z", error_event("disk full"))?;

    let window = ReportWindow::new(parse_day("2025-01-01")?, parse_day("2025-01-02")?)?;
    let report = ReportAnalyzer::new().run_report(store.records(), &ReportOptions::new(window))?;

    assert_eq!(report.unique_users, 1);
    assert_eq!(report.active_users_by_date["2025-01-01"], 1);
    assert_eq!(report.version["1"]["2"]["3"], 1);
    assert_eq!(report.os_info["Linux"]["linux"]["6.1"], 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].id_count, 1);
    Ok(())
}

#[test]
fn concurrent_appends_are_safe() -> Result<()> {
    let store = std::sync::Arc::new(RecordStore::new());
    let record = store.create()?;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            let id = record.id.clone();
            std::thread::spawn(move || {
                store.append(
                    &id,
                    "2025-01-01T08:00:00.000Z",
                    EventData::action(if i % 2 == 0 { "start" } else { "stop" }),
                )
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap()?;
    }

    assert_eq!(store.get(&record.id)?.event_count(), 8);
    Ok(())
}
