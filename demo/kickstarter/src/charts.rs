// Figure documents pushed to the Plotly components
use crate::dataset::{Project, StateCounts, COLORS, STATES};
use serde_json::{json, Value};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Scatter of pledged amount over creation date, one trace per state
pub fn pledged_figure<'a>(projects: impl Iterator<Item = &'a Project> + Clone) -> Value {
    let traces: Vec<Value> = STATES
        .iter()
        .zip(COLORS)
        .map(|(state, color)| {
            let in_state = projects.clone().filter(|p| p.state == *state);
            let mut x = Vec::new();
            let mut y = Vec::new();
            let mut text = Vec::new();
            // a blank pledge has no place on the log axis
            for (project, pledged) in in_state.filter_map(|p| p.usd_pledged.map(|v| (p, v))) {
                x.push(project.created_at.format(TIMESTAMP_FORMAT).to_string());
                y.push(pledged);
                text.push(project.name.clone());
            }
            json!({
                "type": "scatter",
                "x": x,
                "y": y,
                "text": text,
                "mode": "markers",
                "opacity": 0.7,
                "marker": {
                    "size": 15,
                    "color": color,
                    "line": { "width": 0.5, "color": "white" }
                },
                "name": state,
            })
        })
        .collect();

    json!({
        "data": traces,
        "layout": {
            "xaxis": { "title": "Date" },
            "yaxis": { "title": "USD pledged", "type": "log" },
            "margin": { "l": 40, "b": 40, "t": 10, "r": 10 },
            "legend": { "x": 0, "y": 1 },
            "hovermode": "closest"
        }
    })
}

/// Stacked bars of project counts per category, states stacked in reverse legend order
pub fn counts_figure(counts: &StateCounts) -> Value {
    let traces: Vec<Value> = STATES
        .iter()
        .zip(COLORS)
        .rev()
        .map(|(state, color)| {
            json!({
                "type": "bar",
                "x": counts.categories,
                "y": counts.column(state),
                "name": state,
                "marker": { "color": color },
            })
        })
        .collect();

    json!({
        "data": traces,
        "layout": {
            "yaxis": { "title": "Number of projects" },
            "barmode": "stack",
            "hovermode": "closest"
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_traces_are_reversed() {
        let counts = StateCounts {
            categories: vec!["art".into(), "games".into()],
            counts: vec![[1, 0, 2, 0], [0, 0, 0, 3]],
        };
        let figure = counts_figure(&counts);
        let names: Vec<&str> = figure["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["canceled", "failed", "suspended", "successful"]);
        assert_eq!(figure["data"][0]["y"], json!([0, 3]));
        assert_eq!(figure["data"][0]["marker"]["color"], "#C7583F");
        assert_eq!(figure["layout"]["barmode"], "stack");
    }

    #[test]
    fn blank_pledge_is_left_off_the_scatter() {
        let at = chrono::NaiveDate::from_ymd_opt(2015, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let project = |name: &str, pledged| Project {
            name: name.to_string(),
            category: "games".to_string(),
            created_at: at,
            usd_pledged: pledged,
            state: "failed".to_string(),
        };
        let projects = vec![project("Priced", Some(25.0)), project("Blank", None)];

        let figure = pledged_figure(projects.iter());
        let failed = &figure["data"][2];
        assert_eq!(failed["name"], "failed");
        assert_eq!(failed["y"], json!([25.0]));
        assert_eq!(failed["text"], json!(["Priced"]));
    }
}
