use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::data_access::task_query::{PageRequest, Sort, TaskFilter, DEFAULT_PAGE_SIZE};

/// Raw `GET /api/tasks` query string. Everything arrives as text so a bad
/// value can be reported with the parameter it came from.
#[derive(Debug, Default, Deserialize)]
pub struct TaskQueryParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value '{value}' for parameter '{name}'")]
pub struct InvalidParameter {
    pub name: String,
    pub value: String,
}

impl InvalidParameter {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Parses one parameter; blank counts as absent.
pub fn parse_param<T: FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>, InvalidParameter> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| InvalidParameter::new(name, value)),
        None => Ok(None),
    }
}

impl TaskQueryParams {
    pub fn into_query(self, max_page_size: usize) -> Result<(TaskFilter, PageRequest), InvalidParameter> {
        let filter = TaskFilter {
            status: parse_param("status", self.status.as_deref())?,
            priority: parse_param("priority", self.priority.as_deref())?,
            search: self.search.filter(|search| !search.trim().is_empty()),
        };

        let page_request = PageRequest {
            page: parse_param("page", self.page.as_deref())?.unwrap_or(0),
            size: parse_param("size", self.size.as_deref())?
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, max_page_size.max(1)),
            sort: parse_param::<Sort>("sort", self.sort.as_deref())?.unwrap_or_default(),
        };

        Ok((filter, page_request))
    }
}
