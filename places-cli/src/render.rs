//! Plain-text rendering of pages.

use std::fmt::Write;

use places_core::{
    PageState, Route,
    form::CreationForm,
    nav::APP_TITLE,
    view::{Marker, Viewport, WeatherChart},
};

pub fn nav_bar(current: Option<Route>) -> String {
    let items: Vec<String> = Route::all()
        .iter()
        .map(|r| {
            if Some(*r) == current {
                format!("[{}]", r.label())
            } else {
                r.label().to_string()
            }
        })
        .collect();

    format!("{APP_TITLE}  |  {}", items.join("  "))
}

pub fn page_state(state: &PageState) -> String {
    match state {
        PageState::Error(message) => message.to_string(),
        PageState::Ready {
            viewport,
            markers,
            chart,
        } => {
            let mut out = String::new();
            out.push_str(&self::viewport(viewport));
            out.push('\n');

            if markers.is_empty() {
                out.push_str("No places to show.\n");
            }
            for marker in markers {
                out.push_str(&self::marker(marker));
                out.push('\n');
            }

            if let Some(chart) = chart {
                out.push('\n');
                out.push_str(&self::chart(chart));
            }
            out
        }
    }
}

fn viewport(viewport: &Viewport) -> String {
    format!(
        "Map centered on {}, {} (zoom {})",
        viewport.center.latitude, viewport.center.longitude, viewport.zoom
    )
}

fn marker(marker: &Marker) -> String {
    let mut popup = marker.popup.lines();
    let name = popup.next().unwrap_or_default();
    let address = popup.next().unwrap_or_default();

    format!(
        "  #{:<4} {:<25}  {}  @ {}, {}",
        marker.place_id, name, address, marker.position.latitude, marker.position.longitude
    )
}

pub fn chart(chart: &WeatherChart) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", chart.title);
    let _ = writeln!(out, "{:<12} {}", "", chart.labels.join("  "));
    for series in &chart.series {
        let values: Vec<String> = series.values.iter().map(|v| format!("{v:.1}")).collect();
        let _ = writeln!(out, "{:<12} {} {}", series.label, values.join("  "), series.unit);
    }
    out
}

pub fn form_errors(form: &CreationForm) -> String {
    form.fields()
        .iter()
        .filter_map(|f| form.error(f.name))
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
