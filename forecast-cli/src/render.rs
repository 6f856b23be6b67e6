//! Plain-text rendering of the lookup state.

use chrono::{DateTime, Local, Utc};
use forecast_core::{LookupState, WeatherSnapshot, resolve_background, resolve_icon};

pub fn status(state: &LookupState, today: DateTime<Local>) -> String {
    match state {
        LookupState::Idle => "Search for Weather\n\
             Enter a city name or use your current location to get detailed weather information."
            .to_string(),
        LookupState::Loading => "Fetching weather data...".to_string(),
        LookupState::Error(reason) => format!("✗ {reason}"),
        LookupState::Success(snapshot) => weather_card(snapshot, today),
    }
}

pub fn weather_card(snap: &WeatherSnapshot, today: DateTime<Local>) -> String {
    let icon = resolve_icon(&snap.condition);
    let background = resolve_background(Some(&snap.condition));

    let mut lines = vec![
        format!("📍 {}", snap.location_label()),
        String::new(),
        format!("Today · {}", today.format("%A, %d %B %y")),
        format!(
            "  {}°  {}  {}",
            snap.rounded_temperature(),
            icon.glyph(),
            capitalize_words(&snap.description)
        ),
        format!(
            "  Feels like {}°   Humidity {}%   Wind {} km/h",
            snap.rounded_feels_like(),
            snap.humidity_pct,
            snap.wind_speed_kmh()
        ),
    ];

    if let (Some(min), Some(max)) = (snap.temp_min_c, snap.temp_max_c) {
        lines.push(format!("  Low {}° / High {}°", min.round(), max.round()));
    }

    let mut insights = Vec::new();
    if let Some(pressure) = snap.pressure_hpa {
        insights.push(format!("Pressure {pressure:.0} hPa"));
    }
    insights.push(match snap.visibility_km() {
        Some(km) => format!("Visibility {km} km"),
        None => "Visibility N/A".to_string(),
    });
    if let Some(clouds) = snap.cloud_cover_pct {
        insights.push(format!("Clouds {clouds}%"));
    }
    lines.push(String::new());
    lines.push("Weather Insights".to_string());
    lines.push(format!("  {}", insights.join("   ")));

    if let Some((sunrise, sunset)) = snap.sun_times() {
        lines.push(format!(
            "  Sunrise {}   Sunset {}",
            local_time(sunrise),
            local_time(sunset)
        ));
    }

    lines.push(String::new());
    lines.push(format!("Background: {} ({})", background.name(), background.url()));

    lines.join("\n")
}

fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M").to_string()
}

fn capitalize_words(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
