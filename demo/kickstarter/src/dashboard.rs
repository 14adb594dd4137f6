// Kickstarter dashboard assembly
//
// Header, category filter, pledged scatter plot and state counts. The counts
// chart follows both the filter and the visible window of the scatter plot.

use crate::charts::{counts_figure, pledged_figure};
use crate::dataset::Dataset;
use kickboard_core::widgets::{Dropdown, Markdown, Plotly, ViewRange};
use kickboard_core::{App, DashboardConfig, DashboardServer, Getter, KickboardError, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Handles to the components, for callbacks and tests
#[derive(Clone)]
pub struct Widgets {
    pub header: Arc<Markdown>,
    pub select: Arc<Dropdown>,
    pub pledged: Arc<Plotly>,
    pub counts: Arc<Plotly>,
}

/// Redraw the scatter plot for the selected categories
pub fn update_pledged(data: &Dataset, plot: &Plotly, selection: &Value) {
    let categories = data.resolve_categories(Dropdown::selected_values(selection));
    let projects = data
        .sample()
        .iter()
        .filter(|p| categories.contains(&p.category));
    plot.do_all(pledged_figure(projects));
}

/// Redraw the counts for the selected categories inside the scatter plot's window
pub fn update_counts(data: &Dataset, plot: &Plotly, selection: &Value, layout: &Value) {
    let categories = data.resolve_categories(Dropdown::selected_values(selection));
    let range = ViewRange::from_layout(layout);
    debug!(categories = categories.len(), windowed = range.is_some(), "Updating counts");
    let counts = data.state_counts(&categories, range.as_ref());
    plot.do_all(counts_figure(&counts));
}

pub fn build_dashboard(config: DashboardConfig, data: Arc<Dataset>) -> Result<(DashboardServer, Widgets)> {
    let mut app = App::new(config);

    let categories = data.categories().to_vec();
    let widgets = Widgets {
        header: app.add(|id, tx| Markdown::new(id, tx, "# Kickstarter Dashboard"))?,
        select: app.add(|id, _| Dropdown::new(id, categories.clone(), categories, true))?,
        pledged: app.add(Plotly::new)?,
        counts: app.add(Plotly::new)?,
    };

    {
        let (w, data) = (widgets.clone(), Arc::clone(&data));
        app.load("init", move |_args: Vec<Value>| {
            let (w, data) = (w.clone(), Arc::clone(&data));
            async move {
                let selection = w.select.get().await?;
                if selection.is_null() {
                    update_pledged(&data, &w.pledged, &Value::Null);
                    update_counts(&data, &w.counts, &Value::Null, &Value::Null);
                }
                Ok::<(), KickboardError>(())
            }
        });
    }

    {
        let (plot, data) = (Arc::clone(&widgets.pledged), Arc::clone(&data));
        app.subscribe(
            "update_pledged",
            [widgets.select.on_change()],
            move |args: Vec<Value>| {
                let selection = args.first().cloned().unwrap_or(Value::Null);
                update_pledged(&data, &plot, &selection);
                std::future::ready(Ok::<(), KickboardError>(()))
            },
        );
    }

    {
        let (plot, data) = (Arc::clone(&widgets.counts), Arc::clone(&data));
        app.subscribe(
            "update_counts",
            [widgets.select.on_change(), widgets.pledged.on_relayout()],
            move |args: Vec<Value>| {
                let mut args = args.into_iter();
                let selection = args.next().unwrap_or(Value::Null);
                let layout = args.next().unwrap_or(Value::Null);
                update_counts(&data, &plot, &selection, &layout);
                std::future::ready(Ok::<(), KickboardError>(()))
            },
        );
    }

    Ok((app.build()?, widgets))
}
