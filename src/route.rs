//! Routes and their address-bar representation.
//!
//! `/` and `/?page=N` address the browse view, `/pokemon/<key>` a detail view.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    Browse { page: u32 },
    Detail { key: String },
}

impl Default for Route {
    fn default() -> Self {
        Route::Browse { page: 1 }
    }
}

impl Route {
    pub fn browse(page: u32) -> Self {
        Route::Browse { page: page.max(1) }
    }

    pub fn page(&self) -> Option<u32> {
        match self {
            Route::Browse { page } => Some(*page),
            Route::Detail { .. } => None,
        }
    }

    /// Parse an address. Anything that is not an absolute path is taken as a
    /// detail key, so typing `pikachu` or `25` opens that record.
    pub fn parse(input: &str) -> Option<Route> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        if !input.starts_with('/') {
            return Some(Route::Detail {
                key: input.to_ascii_lowercase(),
            });
        }

        let (path, query) = match input.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (input, None),
        };
        let path = path.trim_end_matches('/');

        if path.is_empty() {
            return Some(Route::Browse {
                page: page_param(query),
            });
        }

        let key = path.strip_prefix("/pokemon/")?;
        let key = urlencoding::decode(key).ok()?.trim().to_ascii_lowercase();
        if key.is_empty() || key.contains('/') {
            return None;
        }
        Some(Route::Detail { key })
    }

    pub fn to_location(&self) -> String {
        match self {
            Route::Browse { page } => format!("/?page={page}"),
            Route::Detail { key } => format!("/pokemon/{}", urlencoding::encode(key)),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_location())
    }
}

fn page_param(query: Option<&str>) -> u32 {
    query
        .into_iter()
        .flat_map(|query| query.split('&'))
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == "page")
        .and_then(|(_, value)| value.trim().parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}
