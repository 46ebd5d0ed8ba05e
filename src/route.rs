//! Screen routes: `/`, `/podcast/{id}` and `/favorite`.

use crate::error::AppError;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Directory,
    Podcast(String),
    Favorites,
}

impl FromStr for Route {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim();
        match path {
            "" | "/" => return Ok(Route::Directory),
            "/favorite" | "/favorite/" => return Ok(Route::Favorites),
            _ => {}
        }

        let re = Regex::new(r"^/podcast/([^/\s]+)/?$")
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
        re.captures(path)
            .and_then(|caps| caps.get(1))
            .map(|id| Route::Podcast(id.as_str().to_string()))
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown route '{}'", path)))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Directory => f.write_str("/"),
            Route::Podcast(id) => write!(f, "/podcast/{}", id),
            Route::Favorites => f.write_str("/favorite"),
        }
    }
}
