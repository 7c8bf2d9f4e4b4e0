//! Search report shaping for the web "data lab" page.
//!
//! # Responsibility
//! - Turn search results into table rows and chart series.
//! - Render the result table as escaped HTML.
//!
//! # Invariants
//! - Charts are only built for non-empty results.
//! - Every user-provided string is HTML-escaped before rendering.
//! - Rasterizing charts is left to the caller's charting backend; this
//!   module only produces the data it needs.

use crate::model::difficulty::Difficulty;
use crate::model::recipe::{Recipe, RecipeId};
use crate::repo::recipe_repo::{RecipeRepository, RepoResult};
use serde::Serialize;
use std::fmt::Write as _;
use std::str::FromStr;

/// One row of the search result table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub id: RecipeId,
    pub name: String,
    pub cooking_time: u32,
    pub difficulty: Difficulty,
    pub ingredient_count: usize,
}

impl From<&Recipe> for ReportRow {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            cooking_time: recipe.cooking_time,
            difficulty: recipe.difficulty,
            ingredient_count: recipe.ingredient_count(),
        }
    }
}

/// Chart selected on the search form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// `#1`: cooking time per recipe.
    #[default]
    CookingTimeBar,
    /// `#2`: share of each difficulty.
    DifficultyPie,
    /// `#3`: cooking time and ingredient count per recipe.
    ComplexityLine,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [
        ChartKind::CookingTimeBar,
        ChartKind::DifficultyPie,
        ChartKind::ComplexityLine,
    ];

    /// Form value used by the search page.
    pub fn code(self) -> &'static str {
        match self {
            Self::CookingTimeBar => "#1",
            Self::DifficultyPie => "#2",
            Self::ComplexityLine => "#3",
        }
    }

    /// Human-readable option label.
    pub fn label(self) -> &'static str {
        match self {
            Self::CookingTimeBar => "Bar Chart (Cooking Time)",
            Self::DifficultyPie => "Pie Chart (Difficulty Distribution)",
            Self::ComplexityLine => "Line Chart (Ingredients vs Time)",
        }
    }
}

impl FromStr for ChartKind {
    type Err = String;

    /// Accepts form codes (`#1`..`#3`) or snake_case names. Blank maps to
    /// the default chart.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" | "#1" | "cooking_time_bar" => Ok(Self::CookingTimeBar),
            "#2" | "difficulty_pie" => Ok(Self::DifficultyPie),
            "#3" | "complexity_line" => Ok(Self::ComplexityLine),
            other => Err(format!("unsupported chart type `{other}`; expected #1|#2|#3")),
        }
    }
}

/// Pie slice for one difficulty label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: Difficulty,
    pub count: usize,
    pub percent: f64,
}

/// Named line series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub name: &'static str,
    pub values: Vec<u64>,
}

/// Chart data handed to a rendering backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartData {
    Bar {
        title: &'static str,
        y_label: &'static str,
        labels: Vec<String>,
        values: Vec<u32>,
    },
    Pie {
        title: &'static str,
        slices: Vec<PieSlice>,
    },
    Line {
        title: &'static str,
        labels: Vec<String>,
        series: Vec<Series>,
    },
}

const CHART_LABEL_MAX_CHARS: usize = 18;

/// Builds chart series for the given rows.
///
/// Bar and line labels are shortened with [`chart_label`]; rows keep full
/// names.
pub fn build_chart(kind: ChartKind, rows: &[ReportRow]) -> ChartData {
    let labels = || rows.iter().map(|row| chart_label(&row.name)).collect::<Vec<_>>();
    match kind {
        ChartKind::CookingTimeBar => ChartData::Bar {
            title: "Cooking Time Comparison",
            y_label: "Cooking Time (min)",
            labels: labels(),
            values: rows.iter().map(|row| row.cooking_time).collect(),
        },
        ChartKind::DifficultyPie => ChartData::Pie {
            title: "Difficulty Distribution",
            slices: difficulty_slices(rows),
        },
        ChartKind::ComplexityLine => ChartData::Line {
            title: "Complexity Trends",
            labels: labels(),
            series: vec![
                Series {
                    name: "Cooking Time",
                    values: rows.iter().map(|row| u64::from(row.cooking_time)).collect(),
                },
                Series {
                    name: "Ingredient Count",
                    values: rows.iter().map(|row| row.ingredient_count as u64).collect(),
                },
            ],
        },
    }
}

/// Keeps the first 18 chars of a long name and appends `...`.
fn chart_label(name: &str) -> String {
    if name.chars().count() <= CHART_LABEL_MAX_CHARS {
        return name.to_string();
    }
    let mut label = name.chars().take(CHART_LABEL_MAX_CHARS).collect::<String>();
    label.push_str("...");
    label
}

/// Counts per difficulty, most frequent first; ties keep label order.
fn difficulty_slices(rows: &[ReportRow]) -> Vec<PieSlice> {
    let total = rows.len();
    let mut slices = Difficulty::ALL
        .iter()
        .map(|difficulty| {
            let count = rows
                .iter()
                .filter(|row| row.difficulty == *difficulty)
                .count();
            PieSlice {
                label: *difficulty,
                count,
                percent: if total == 0 {
                    0.0
                } else {
                    count as f64 * 100.0 / total as f64
                },
            }
        })
        .filter(|slice| slice.count > 0)
        .collect::<Vec<_>>();
    slices.sort_by(|left, right| right.count.cmp(&left.count));
    slices
}

/// Search result table plus the selected chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeReport {
    pub query: String,
    pub rows: Vec<ReportRow>,
    /// `None` when nothing matched.
    pub chart: Option<ChartData>,
}

impl RecipeReport {
    /// Builds a report from already-loaded recipes.
    pub fn from_recipes(query: impl Into<String>, recipes: &[Recipe], chart: ChartKind) -> Self {
        let rows = recipes.iter().map(ReportRow::from).collect::<Vec<_>>();
        let chart = if rows.is_empty() {
            None
        } else {
            Some(build_chart(chart, &rows))
        };
        Self {
            query: query.into(),
            rows,
            chart,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serializes the report for a client-side chart renderer.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Renders the table; see [`render_table_html`].
    pub fn table_html<F>(&self, link_for: F) -> String
    where
        F: Fn(RecipeId) -> String,
    {
        render_table_html(&self.rows, link_for)
    }
}

/// Renders rows as an HTML table with the name linking to `link_for(id)`.
pub fn render_table_html<F>(rows: &[ReportRow], link_for: F) -> String
where
    F: Fn(RecipeId) -> String,
{
    let mut html = String::from(
        "<table class=\"dataframe\">\n  <thead>\n    <tr>\
         <th>name</th><th>cooking_time</th><th>difficulty</th><th>ingredient_count</th>\
         </tr>\n  </thead>\n  <tbody>\n",
    );
    for row in rows {
        let href = link_for(row.id);
        // Writing into a String cannot fail.
        let _ = writeln!(
            html,
            "    <tr><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>",
            html_escape::encode_double_quoted_attribute(&href),
            html_escape::encode_text(&row.name),
            row.cooking_time,
            row.difficulty,
            row.ingredient_count
        );
    }
    html.push_str("  </tbody>\n</table>");
    html
}

/// Query/report service for the search page.
pub struct ReportService<'repo, R> {
    repo: &'repo R,
}

impl<'repo, R: RecipeRepository> ReportService<'repo, R> {
    pub fn new(repo: &'repo R) -> Self {
        Self { repo }
    }

    /// Runs a text search (blank returns everything) and shapes the report.
    pub fn search(&self, text: &str, chart: ChartKind) -> RepoResult<RecipeReport> {
        let recipes = self.repo.search_by_text(text)?;
        Ok(RecipeReport::from_recipes(text.trim(), &recipes, chart))
    }
}
