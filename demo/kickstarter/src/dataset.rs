// Kickstarter projects dataset
//
// Loaded once from CSV at startup and shared read-only by every callback.

use chrono::NaiveDateTime;
use kickboard_core::widgets::{parse_timestamp, ViewRange};
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Project states shown in the charts, in legend order
pub const STATES: [&str; 4] = ["successful", "suspended", "failed", "canceled"];

/// One color per entry of [`STATES`]
pub const COLORS: [&str; 4] = ["#7DFB6D", "#C7B815", "#D4752E", "#C7583F"];

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset has no usable rows")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct ProjectRecord {
    #[serde(default)]
    name: String,
    category_slug: String,
    created_at: String,
    #[serde(default)]
    usd_pledged: Option<f64>,
    state: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Project {
    pub name: String,
    /// First segment of the category slug ("games/tabletop games" -> "games")
    pub category: String,
    pub created_at: NaiveDateTime,
    /// Blank in some exports; such projects are still counted
    pub usd_pledged: Option<f64>,
    pub state: String,
}

impl Project {
    fn from_record(record: ProjectRecord) -> Option<Self> {
        let created_at = parse_timestamp(&record.created_at)?;
        let category = record
            .category_slug
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Some(Self {
            name: record.name,
            category,
            created_at,
            usd_pledged: record.usd_pledged,
            state: record.state,
        })
    }
}

/// Per-category project counts for every state in [`STATES`]
#[derive(Clone, Debug, PartialEq)]
pub struct StateCounts {
    pub categories: Vec<String>,
    /// `counts[i][j]`: projects of `categories[i]` in `STATES[j]`
    pub counts: Vec<[u64; 4]>,
}

impl StateCounts {
    pub fn get(&self, category: &str, state: &str) -> u64 {
        let row = self.categories.iter().position(|c| c == category);
        let col = STATES.iter().position(|s| *s == state);
        match (row, col) {
            (Some(r), Some(c)) => self.counts[r][c],
            _ => 0,
        }
    }

    /// Counts of one state across categories, in category order
    pub fn column(&self, state: &str) -> Vec<u64> {
        match STATES.iter().position(|s| *s == state) {
            Some(c) => self.counts.iter().map(|row| row[c]).collect(),
            None => vec![0; self.categories.len()],
        }
    }
}

pub struct Dataset {
    projects: Vec<Project>,
    sample: Vec<Project>,
    categories: Vec<String>,
}

impl Dataset {
    pub fn load(path: &Path, sample_size: usize) -> Result<Self, DatasetError> {
        let file = std::fs::File::open(path)?;
        let dataset = Self::from_reader(file, sample_size)?;
        info!(
            path = %path.display(),
            projects = dataset.projects.len(),
            categories = dataset.categories.len(),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    /// Rows that fail to parse are skipped and counted in a warning
    pub fn from_reader<R: Read>(reader: R, sample_size: usize) -> Result<Self, DatasetError> {
        let mut csv = csv::Reader::from_reader(reader);
        let mut projects = Vec::new();
        let mut skipped = 0usize;
        for record in csv.deserialize::<ProjectRecord>() {
            match record.ok().and_then(Project::from_record) {
                Some(project) => projects.push(project),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(skipped, "Skipped unparseable rows");
        }
        if projects.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(Self::from_projects(projects, sample_size))
    }

    pub fn from_projects(projects: Vec<Project>, sample_size: usize) -> Self {
        let mut seen = HashSet::new();
        let categories = projects
            .iter()
            .filter(|p| seen.insert(p.category.clone()))
            .map(|p| p.category.clone())
            .collect();

        let sample = if projects.len() <= sample_size {
            projects.clone()
        } else {
            projects
                .choose_multiple(&mut rand::thread_rng(), sample_size)
                .cloned()
                .collect()
        };

        Self {
            projects,
            sample,
            categories,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Random subset used by the scatter plot
    pub fn sample(&self) -> &[Project] {
        &self.sample
    }

    /// Broader categories in order of first appearance
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Selected categories, or all of them when the selection is empty
    pub fn resolve_categories(&self, selected: Vec<String>) -> Vec<String> {
        if selected.is_empty() {
            self.categories.clone()
        } else {
            selected
        }
    }

    /// Count projects per (category, state), zero-filled, inside the optional view window
    pub fn state_counts(&self, categories: &[String], range: Option<&ViewRange>) -> StateCounts {
        let mut counts = vec![[0u64; 4]; categories.len()];
        for project in &self.projects {
            if let Some(range) = range {
                if !range.contains(project.created_at, project.usd_pledged) {
                    continue;
                }
            }
            let Some(row) = categories.iter().position(|c| *c == project.category) else {
                continue;
            };
            if let Some(col) = STATES.iter().position(|s| *s == project.state) {
                counts[row][col] += 1;
            }
        }
        StateCounts {
            categories: categories.to_vec(),
            counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
name,category_slug,created_at,usd_pledged,state,country
Board game,games/tabletop games,2015-03-01 10:00:00,1500.0,successful,US
Video game,games/video games,2015-08-01 10:00:00,50.0,failed,GB
Mural,art/public art,2015-03-15 09:30:00,20000.0,successful,US
Zine,publishing/zines,2016-01-01 00:00:00,5.0,canceled,US
Broken,art/painting,not a date,10.0,failed,US
";

    #[test]
    fn loads_rows_and_derives_broader_category() {
        let data = Dataset::from_reader(CSV.as_bytes(), 100).unwrap();
        assert_eq!(data.projects().len(), 4, "unparseable row skipped");
        assert_eq!(data.categories(), ["games", "art", "publishing"]);
        assert_eq!(data.projects()[0].category, "games");
        assert_eq!(data.sample().len(), 4);
    }

    #[test]
    fn sample_is_capped() {
        let data = Dataset::from_reader(CSV.as_bytes(), 2).unwrap();
        assert_eq!(data.sample().len(), 2);
        assert_eq!(data.projects().len(), 4);
    }

    #[test]
    fn empty_input_is_an_error() {
        let header_only = "name,category_slug,created_at,usd_pledged,state\n";
        assert!(matches!(
            Dataset::from_reader(header_only.as_bytes(), 10),
            Err(DatasetError::Empty)
        ));
    }

    #[test]
    fn counts_are_zero_filled_per_category() {
        let data = Dataset::from_reader(CSV.as_bytes(), 100).unwrap();
        let cats = vec!["games".to_string(), "food".to_string()];
        let counts = data.state_counts(&cats, None);

        assert_eq!(counts.get("games", "successful"), 1);
        assert_eq!(counts.get("games", "failed"), 1);
        assert_eq!(counts.get("food", "successful"), 0);
        assert_eq!(counts.column("suspended"), vec![0, 0]);
    }

    #[test]
    fn blank_pledge_is_kept_but_outside_any_window() {
        let csv = "\
name,category_slug,created_at,usd_pledged,state
Board game,games/tabletop games,2015-03-01 10:00:00,1500.0,successful
Card game,games/tabletop games,2015-03-02 10:00:00,,failed
";
        let data = Dataset::from_reader(csv.as_bytes(), 100).unwrap();
        assert_eq!(data.projects().len(), 2);
        assert_eq!(data.projects()[1].usd_pledged, None);

        let cats = vec!["games".to_string()];
        let counts = data.state_counts(&cats, None);
        assert_eq!(counts.get("games", "successful"), 1);
        assert_eq!(counts.get("games", "failed"), 1);

        let window = ViewRange::from_layout(&serde_json::json!({
            "xaxis.range[0]": "2015-01-01",
            "xaxis.range[1]": "2015-12-31",
            "yaxis.range[0]": 0,
            "yaxis.range[1]": 6,
        }))
        .unwrap();
        let counts = data.state_counts(&cats, Some(&window));
        assert_eq!(counts.get("games", "successful"), 1);
        assert_eq!(counts.get("games", "failed"), 0);
    }

    #[test]
    fn empty_selection_means_all_categories() {
        let data = Dataset::from_reader(CSV.as_bytes(), 100).unwrap();
        assert_eq!(data.resolve_categories(Vec::new()).len(), 3);
        assert_eq!(data.resolve_categories(vec!["art".into()]), vec!["art"]);
    }
}
