use kickboard_core::{Component, DashboardConfig, EventPayload, Result, ServerMessage};
use kickstarter_dashboard::{build_dashboard, Dataset};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::broadcast::Receiver;

const CSV: &str = "\
name,category_slug,created_at,usd_pledged,state
Board game,games/tabletop games,2015-03-01 10:00:00,1500.0,successful
Video game,games/video games,2015-08-01 10:00:00,50.0,failed
Mural,art/public art,2015-03-15 09:30:00,20000.0,successful
Zine,publishing/zines,2016-01-01 00:00:00,5.0,canceled
";

fn dataset() -> Arc<Dataset> {
    Arc::new(Dataset::from_reader(CSV.as_bytes(), 100).unwrap())
}

fn drain(rx: &mut Receiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        messages.push(message);
    }
    messages
}

/// Bar heights of one state trace from a counts figure
fn state_column(figure: &Value, state: &str) -> Value {
    figure["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|trace| trace["name"] == state)
        .map(|trace| trace["y"].clone())
        .unwrap()
}

fn last_for(messages: &[ServerMessage], event: &str) -> Value {
    messages
        .iter()
        .rev()
        .find(|m| m.event == event)
        .map(|m| m.data.clone())
        .unwrap_or_else(|| panic!("no {event} message"))
}

#[tokio::test]
async fn initialize_pushes_both_figures_over_everything() -> Result<()> {
    let (server, widgets) = build_dashboard(DashboardConfig::default(), dataset())?;
    let mut rx = server.broadcaster().subscribe();

    assert_eq!(server.dispatcher().initialize().await?, 1);

    let messages = drain(&mut rx);
    let pledged = last_for(&messages, &format!("{}#all", widgets.pledged.id()));
    let counts = last_for(&messages, &format!("{}#all", widgets.counts.id()));

    let plotted: usize = pledged["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|trace| trace["x"].as_array().unwrap().len())
        .sum();
    assert_eq!(plotted, 4);
    assert_eq!(counts["data"][0]["x"], json!(["games", "art", "publishing"]));
    assert_eq!(state_column(&counts, "successful"), json!([1, 1, 0]));
    Ok(())
}

#[tokio::test]
async fn zoom_window_filters_counts_and_autorange_restores_them() -> Result<()> {
    let (server, widgets) = build_dashboard(DashboardConfig::default(), dataset())?;
    let dispatcher = server.dispatcher();
    let counts_event = format!("{}#all", widgets.counts.id());
    let pledged_event = format!("{}#all", widgets.pledged.id());
    let mut rx = server.broadcaster().subscribe();

    let zoom = json!({
        "xaxis.range[0]": "2015-01-01 00:00:00",
        "xaxis.range[1]": "2015-06-30 00:00:00",
        "yaxis.range[0]": 1,
        "yaxis.range[1]": 4,
    });
    let Value::Object(fields) = zoom else { unreachable!() };
    let report = dispatcher
        .dispatch(&widgets.pledged.on_relayout(), EventPayload::Fields(fields))
        .await?;
    assert_eq!(report.callbacks_invoked, 1);

    let messages = drain(&mut rx);
    assert!(messages.iter().all(|m| m.event != pledged_event), "scatter is not redrawn on zoom");
    let counts = last_for(&messages, &counts_event);
    // only the board game is inside both the date window and 10..10000 USD
    assert_eq!(state_column(&counts, "successful"), json!([1, 0, 0]));
    assert_eq!(state_column(&counts, "failed"), json!([0, 0, 0]));
    assert_eq!(state_column(&counts, "canceled"), json!([0, 0, 0]));

    let reset = json!({ "xaxis.autorange": true, "yaxis.autorange": true });
    let Value::Object(fields) = reset else { unreachable!() };
    dispatcher
        .dispatch(&widgets.pledged.on_relayout(), EventPayload::Fields(fields))
        .await?;

    let counts = last_for(&drain(&mut rx), &counts_event);
    assert_eq!(state_column(&counts, "successful"), json!([1, 1, 0]));
    assert_eq!(state_column(&counts, "failed"), json!([1, 0, 0]));
    assert_eq!(state_column(&counts, "canceled"), json!([0, 0, 1]));
    Ok(())
}

#[tokio::test]
async fn category_change_redraws_both_charts_within_last_zoom() -> Result<()> {
    let (server, widgets) = build_dashboard(DashboardConfig::default(), dataset())?;
    let dispatcher = server.dispatcher();
    let mut rx = server.broadcaster().subscribe();

    let zoom = json!({
        "xaxis.range[0]": "2015-01-01",
        "xaxis.range[1]": "2015-12-31",
        "yaxis.range[0]": 0,
        "yaxis.range[1]": 3.5,
    });
    let Value::Object(fields) = zoom else { unreachable!() };
    dispatcher
        .dispatch(&widgets.pledged.on_relayout(), EventPayload::Fields(fields))
        .await?;
    drain(&mut rx);

    let selection = json!([{ "value": "games", "label": "games" }]);
    let packed = rmp_serde::to_vec(&selection).unwrap();
    let report = dispatcher
        .dispatch(&widgets.select.on_change(), EventPayload::Packed(packed))
        .await?;
    assert_eq!(report.callbacks_invoked, 2);

    let messages = drain(&mut rx);
    let pledged = last_for(&messages, &format!("{}#all", widgets.pledged.id()));
    let names: Vec<&str> = pledged["data"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|trace| trace["text"].as_array().unwrap())
        .map(|name| name.as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Board game") && names.contains(&"Video game"));

    // the remembered zoom still applies: 1..~3162 USD during 2015
    let counts = last_for(&messages, &format!("{}#all", widgets.counts.id()));
    assert_eq!(counts["data"][0]["x"], json!(["games"]));
    assert_eq!(state_column(&counts, "successful"), json!([1]));
    assert_eq!(state_column(&counts, "failed"), json!([1]));
    Ok(())
}
