const CLEAR_URL: &str = "https://images.unsplash.com/photo-1560258018-c7db7645254e?ixlib=rb-4.0.3&auto=format&fit=crop&w=1350&q=80";
const CLOUDS_URL: &str = "https://images.unsplash.com/photo-1483728642387-6c3bdd6c93e5?ixlib=rb-4.0.3&auto=format&fit=crop&w=1350&q=80";
const RAIN_URL: &str = "https://images.unsplash.com/photo-1438449805896-28a666819a20?ixlib=rb-4.0.3&auto=format&fit=crop&w=1350&q=80";
const DEFAULT_URL: &str = "https://images.unsplash.com/photo-1499002238440-d264edd596ec?ixlib=rb-4.0.3&auto=format&fit=crop&w=1350&q=80";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Background {
    Clear,
    Clouds,
    /// Rain and drizzle.
    Rain,
    Snow,
    Thunderstorm,
    /// Mist, fog and haze.
    Mist,
    Default,
}

impl Background {
    pub fn name(&self) -> &'static str {
        match self {
            Background::Clear => "clear",
            Background::Clouds => "clouds",
            Background::Rain => "rain",
            Background::Snow => "snow",
            Background::Thunderstorm => "thunderstorm",
            Background::Mist => "mist",
            Background::Default => "default",
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            Background::Clear => CLEAR_URL,
            // Snow shares the overcast photo.
            Background::Clouds | Background::Snow => CLOUDS_URL,
            Background::Rain => RAIN_URL,
            // No dedicated photo for storms or mist.
            Background::Thunderstorm | Background::Mist | Background::Default => DEFAULT_URL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    Clear,
    Clouds,
    Rain,
    Snow,
}

impl Icon {
    pub fn name(&self) -> &'static str {
        match self {
            Icon::Clear => "sun",
            Icon::Clouds => "cloud",
            Icon::Rain => "cloud-rain",
            Icon::Snow => "snowflake",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Clear => "☀",
            Icon::Clouds => "☁",
            Icon::Rain => "🌧",
            Icon::Snow => "❄",
        }
    }
}

/// `None` means no snapshot has been loaded yet.
pub fn resolve_background(condition: Option<&str>) -> Background {
    let Some(condition) = condition else {
        return Background::Default;
    };

    match condition.trim().to_lowercase().as_str() {
        "clear" => Background::Clear,
        "clouds" => Background::Clouds,
        "rain" | "drizzle" => Background::Rain,
        "snow" => Background::Snow,
        "thunderstorm" => Background::Thunderstorm,
        "mist" | "fog" | "haze" => Background::Mist,
        _ => Background::Default,
    }
}

pub fn resolve_icon(condition: &str) -> Icon {
    match condition.trim().to_lowercase().as_str() {
        "clouds" => Icon::Clouds,
        "rain" | "drizzle" => Icon::Rain,
        "snow" => Icon::Snow,
        _ => Icon::Clear,
    }
}
