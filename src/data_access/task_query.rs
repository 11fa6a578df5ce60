//! Filter, sort and paging inputs for task listing.
//!
//! A `TaskFilter` compiles into a `TaskMatcher` holding one predicate per
//! filter that is actually set, so every combination of status, priority
//! and title search runs through the same scan.

use std::{cmp::Ordering, str::FromStr};

use crate::{
    task::Task, task_priority::TaskPriority, task_status::TaskStatus,
    task_status::UnknownVariant,
};

pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
}

type Predicate<'a> = Box<dyn Fn(&Task) -> bool + Send + Sync + 'a>;

pub struct TaskMatcher<'a> {
    predicates: Vec<Predicate<'a>>,
}

impl TaskFilter {
    pub fn compile(&self) -> TaskMatcher<'_> {
        let mut predicates: Vec<Predicate<'_>> = Vec::new();

        if let Some(status) = self.status {
            predicates.push(Box::new(move |task| task.status == status));
        }
        if let Some(priority) = self.priority {
            predicates.push(Box::new(move |task| task.priority == priority));
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            predicates.push(Box::new(move |task| task.title.to_lowercase().contains(&needle)));
        }

        TaskMatcher { predicates }
    }
}

impl TaskMatcher<'_> {
    pub fn matches(&self, task: &Task) -> bool {
        self.predicates.iter().all(|predicate| predicate(task))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    Status,
    Priority,
    DueDate,
    CreatedAt,
    UpdatedAt,
}

impl FromStr for SortField {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortField::Id),
            "title" => Ok(SortField::Title),
            "status" => Ok(SortField::Status),
            "priority" => Ok(SortField::Priority),
            "dueDate" | "due_date" => Ok(SortField::DueDate),
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            "updatedAt" | "updated_at" => Ok(SortField::UpdatedAt),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(UnknownVariant(s.to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl FromStr for Sort {
    type Err = UnknownVariant;

    /// `field` or `field,direction`. Direction defaults to ascending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || UnknownVariant(s.to_string());
        let mut parts = s.split(',').map(str::trim);

        let field: SortField = parts
            .next()
            .ok_or_else(invalid)?
            .parse()
            .map_err(|_| invalid())?;
        let direction: SortDirection = match parts.next() {
            Some(direction) => direction.parse().map_err(|_| invalid())?,
            None => SortDirection::Asc,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Sort { field, direction })
    }
}

impl Sort {
    /// Ties fall back to id so pages never overlap.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ordering = match self.field {
            SortField::Id => Ordering::Equal,
            SortField::Title => a.title.cmp(&b.title),
            SortField::Status => a.status.cmp(&b.status),
            SortField::Priority => a.priority.cmp(&b.priority),
            SortField::DueDate => a.due_date.cmp(&b.due_date),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
        .then_with(|| a.id.cmp(&b.id));

        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based.
    pub page: usize,
    pub size: usize,
    pub sort: Sort,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: Sort::default(),
        }
    }
}

impl PageRequest {
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}
