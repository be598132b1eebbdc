//! Terminal presentation of query state
//!
//! Rendering is a pure function of `QueryState`; `render_until_settled`
//! follows the controller's state transitions and prints each one.

use std::io::{self, Write};

use console::Style;
use tokio::sync::watch;

use crate::aqi::SeverityTier;
use crate::query::QueryState;

/// Shown in place of any value that is not available
const PLACEHOLDER: &str = "--";

/// Output options for the terminal view
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Emit ANSI colours
    pub color: bool,
    /// Print the settled state as JSON instead of text
    pub json: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            color: true,
            json: false,
        }
    }
}

fn tier_style(tier: SeverityTier) -> Style {
    match tier {
        SeverityTier::Unknown => Style::new().white(),
        SeverityTier::Good => Style::new().green(),
        SeverityTier::Moderate => Style::new().yellow(),
        SeverityTier::UnhealthyForSensitiveGroups => Style::new().color256(208),
        SeverityTier::Unhealthy => Style::new().red(),
        SeverityTier::VeryUnhealthy => Style::new().magenta(),
        SeverityTier::Hazardous => Style::new().red().bold(),
    }
}

struct Painter {
    color: bool,
}

impl Painter {
    fn paint(&self, style: Style, text: &str) -> String {
        style.force_styling(self.color).apply_to(text).to_string()
    }

    fn dim(&self, text: &str) -> String {
        self.paint(Style::new().dim(), text)
    }

    fn bold(&self, text: &str) -> String {
        self.paint(Style::new().bold(), text)
    }
}

/// Render a state as terminal text
#[must_use]
pub fn render(state: &QueryState, options: &RenderOptions) -> String {
    let painter = Painter {
        color: options.color,
    };
    let mut lines: Vec<String> = Vec::new();

    lines.push(painter.bold("Air Quality"));

    if let Some(weather) = &state.weather {
        lines.push(format!("📍 {}", weather.format_place()));
    }

    if state.loading {
        let city = state.city.as_deref().unwrap_or_default();
        lines.push(painter.dim(&format!("Loading... {city}")));
        return lines.join("\n");
    }

    let weather = state.weather.as_ref();
    let cards = [
        ("Visibility", weather.map(|w| w.format_visibility())),
        ("Humidity", weather.map(|w| w.format_humidity())),
        ("Wind Speed", weather.map(|w| w.format_wind())),
        ("Temperature", weather.map(|w| w.format_temperature())),
    ];
    lines.push(
        cards
            .iter()
            .map(|(label, value)| {
                format!(
                    "{}: {}",
                    painter.dim(label),
                    value.as_deref().unwrap_or(PLACEHOLDER)
                )
            })
            .collect::<Vec<_>>()
            .join("  |  "),
    );

    lines.push(String::new());
    lines.push(painter.bold("Air Quality Index"));
    let style = tier_style(state.status.severity_tier);

    match &state.index {
        Some(index) => {
            lines.push(format!(
                "  {}  {}",
                painter.paint(style.clone().bold(), &index.value.to_string()),
                painter.paint(style, state.status.label)
            ));
            if let Some(weather) = weather.filter(|w| !w.description.is_empty()) {
                lines.push(format!("  {}", painter.dim(&weather.description)));
            }

            let details: Vec<String> = index
                .pollutants
                .displayed()
                .map(|(pollutant, value)| {
                    format!(
                        "{} {}",
                        painter.dim(pollutant.symbol()),
                        pollutant.format_concentration(value)
                    )
                })
                .collect();
            if !details.is_empty() {
                lines.push(format!("  {}", details.join("   ")));
            }

            if let Some(observed_at) = index.pollutants.observed_at {
                lines.push(painter.dim(&format!(
                    "  Observed {}",
                    observed_at.format("%Y-%m-%d %H:%M UTC")
                )));
            }
        }
        None => {
            lines.push(format!("  {}", painter.paint(style, PLACEHOLDER)));
            lines.push(format!("  {}", painter.dim("Select a city to view AQI")));
        }
    }

    lines.push(format!(
        "  {} Good (0-50)   {} Moderate (51-100)   {} Unhealthy (101+)",
        painter.paint(tier_style(SeverityTier::Good), "●"),
        painter.paint(tier_style(SeverityTier::Moderate), "●"),
        painter.paint(tier_style(SeverityTier::Unhealthy), "●"),
    ));

    if let Some(error) = &state.error {
        lines.push(String::new());
        lines.push(painter.paint(Style::new().red(), &format!("✖ {}", error.message)));
    }

    lines.join("\n")
}

/// Print state transitions until a non-loading state arrives, and return it.
///
/// In JSON mode only the settled state is printed.
pub async fn render_until_settled<W: Write>(
    rx: &mut watch::Receiver<QueryState>,
    options: &RenderOptions,
    out: &mut W,
) -> io::Result<QueryState> {
    loop {
        if rx.changed().await.is_err() {
            // Controller gone; whatever was last published is final
            return Ok(rx.borrow().clone());
        }
        let state = rx.borrow_and_update().clone();

        if options.json {
            if !state.loading {
                serde_json::to_writer_pretty(&mut *out, &state)?;
                writeln!(out)?;
            }
        } else {
            writeln!(out, "{}\n", render(&state, options))?;
        }
        out.flush()?;

        if !state.loading {
            return Ok(state);
        }
    }
}
