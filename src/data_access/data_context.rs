//! Task and user storage on top of redb.
//!
//! Every mutation is one write transaction. redb admits a single writer at a
//! time, so fetch-merge-save and check-then-delete cannot interleave with
//! another mutation, and readers only ever see committed rows.

use chrono::Utc;
use redb::{
    backends::InMemoryBackend, Database, ReadableTable, ReadableTableMetadata, TableDefinition,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    data_access::task_query::{PageRequest, TaskFilter},
    page::Page,
    settings::Settings,
    task::{NewTask, Task},
    user::User,
};

const USERS_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("users");
const USERNAME_INDEX: TableDefinition<&str, &[u8]> = TableDefinition::new("username_index");
const TASKS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("tasks");
const SEQUENCES_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequences");

const TASK_SEQUENCE: &str = "task_id";

#[derive(Debug, Error)]
pub enum DataError {
    #[error("redb: {0}")]
    Redb(String),
    #[error("encode: {0}")]
    Encode(String),
    #[error("decode: {0}")]
    Decode(String),
    #[error("password hash: {0}")]
    PasswordHash(String),
}

// redb 2.x has many error types. Blanket them all into DataError::Redb.
macro_rules! from_redb {
    ($($t:ty),*) => {
        $(impl From<$t> for DataError {
            fn from(e: $t) -> Self { DataError::Redb(e.to_string()) }
        })*
    };
}

from_redb!(
    redb::Error,
    redb::DatabaseError,
    redb::TableError,
    redb::TransactionError,
    redb::StorageError,
    redb::CommitError
);

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, DataError> {
    postcard::to_allocvec(value).map_err(|e| DataError::Encode(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DataError> {
    postcard::from_bytes(bytes).map_err(|e| DataError::Decode(e.to_string()))
}

fn contains_task(
    table: &impl ReadableTable<u64, &'static [u8]>,
    id: u64,
) -> Result<bool, DataError> {
    Ok(table.get(id)?.is_some())
}

#[derive(Clone)]
pub struct DataContext {
    db: Arc<Database>,
}

impl DataContext {
    /// Open (or create) the store at `path`.
    pub fn new(path: &str) -> Result<Self, DataError> {
        DataContext::initialize(Database::create(path)?)
    }

    /// A store that lives only as long as this handle and its clones.
    pub fn in_memory() -> Result<Self, DataError> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        DataContext::initialize(db)
    }

    fn initialize(db: Database) -> Result<Self, DataError> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS_TABLE)?;
            let _ = write_txn.open_table(USERNAME_INDEX)?;
            let _ = write_txn.open_table(TASKS_TABLE)?;
            let _ = write_txn.open_table(SEQUENCES_TABLE)?;
        }
        write_txn.commit()?;
        Ok(DataContext { db: Arc::new(db) })
    }

    // USERS
    pub fn create_user(&self, user: &User) -> Result<(), DataError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut users_table = write_txn.open_table(USERS_TABLE)?;
            let mut username_index = write_txn.open_table(USERNAME_INDEX)?;
            let user_bytes = encode(user)?;
            let id_bytes = user.id.as_bytes();
            users_table.insert(id_bytes.as_slice(), user_bytes.as_slice())?;
            username_index.insert(user.username.as_str(), id_bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>, DataError> {
        let read_txn = self.db.begin_read()?;
        let users_table = read_txn.open_table(USERS_TABLE)?;
        let id_bytes = id.as_bytes();
        let user = match users_table.get(id_bytes.as_slice())? {
            Some(data) => Some(decode(data.value())?),
            None => None,
        };
        Ok(user)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DataError> {
        let read_txn = self.db.begin_read()?;
        let username_index = read_txn.open_table(USERNAME_INDEX)?;

        let user_id = match username_index.get(username)? {
            Some(id_data) => id_data.value().to_vec(),
            None => return Ok(None),
        };

        let users_table = read_txn.open_table(USERS_TABLE)?;
        let user = match users_table.get(user_id.as_slice())? {
            Some(user_data) => Some(decode(user_data.value())?),
            None => None,
        };
        Ok(user)
    }

    /// Seed the configured admin account when no users exist. Returns true if created.
    pub fn ensure_default_user(&self, settings: &Settings) -> Result<bool, DataError> {
        let read_txn = self.db.begin_read()?;
        if !read_txn.open_table(USERS_TABLE)?.is_empty()? {
            return Ok(false);
        }
        drop(read_txn);

        let admin = User::new(
            &settings.default_admin_username,
            &settings.default_admin_email,
            &settings.default_admin_password,
        )
        .map_err(|e| DataError::PasswordHash(e.to_string()))?;
        self.create_user(&admin)?;
        Ok(true)
    }

    // TASKS
    /// Store a new task under the next id of the task sequence. Ids are never
    /// handed out twice, even after the task holding one is deleted.
    pub fn insert_task(&self, new_task: NewTask) -> Result<Task, DataError> {
        let write_txn = self.db.begin_write()?;
        let task = {
            let mut sequences = write_txn.open_table(SEQUENCES_TABLE)?;
            let last_id = sequences
                .get(TASK_SEQUENCE)?
                .map(|guard| guard.value())
                .unwrap_or(0);
            let id = last_id + 1;
            sequences.insert(TASK_SEQUENCE, id)?;

            let task = new_task.into_task(id, Utc::now());
            let mut tasks_table = write_txn.open_table(TASKS_TABLE)?;
            let task_bytes = encode(&task)?;
            tasks_table.insert(id, task_bytes.as_slice())?;
            task
        };
        write_txn.commit()?;
        Ok(task)
    }

    pub fn find_task(&self, id: u64) -> Result<Option<Task>, DataError> {
        let read_txn = self.db.begin_read()?;
        let tasks_table = read_txn.open_table(TASKS_TABLE)?;
        let task = match tasks_table.get(id)? {
            Some(data) => Some(decode(data.value())?),
            None => None,
        };
        Ok(task)
    }

    pub fn task_exists(&self, id: u64) -> Result<bool, DataError> {
        let read_txn = self.db.begin_read()?;
        let tasks_table = read_txn.open_table(TASKS_TABLE)?;
        contains_task(&tasks_table, id)
    }

    /// Load, merge and write back a task in one transaction, refreshing
    /// `updated_at`. Returns `None` without writing anything if the id is unknown.
    pub fn update_task<F>(&self, id: u64, merge: F) -> Result<Option<Task>, DataError>
    where
        F: FnOnce(&mut Task),
    {
        let write_txn = self.db.begin_write()?;
        let task = {
            let mut tasks_table = write_txn.open_table(TASKS_TABLE)?;
            let current: Option<Task> = match tasks_table.get(id)? {
                Some(data) => Some(decode(data.value())?),
                None => None,
            };
            let Some(mut task) = current else {
                return Ok(None);
            };

            merge(&mut task);
            task.id = id;
            task.updated_at = Utc::now().max(task.created_at);

            let task_bytes = encode(&task)?;
            tasks_table.insert(id, task_bytes.as_slice())?;
            task
        };
        write_txn.commit()?;
        Ok(Some(task))
    }

    /// Returns false, without writing, if the id is unknown.
    pub fn delete_task(&self, id: u64) -> Result<bool, DataError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut tasks_table = write_txn.open_table(TASKS_TABLE)?;
            if !contains_task(&tasks_table, id)? {
                return Ok(false);
            }
            tasks_table.remove(id)?;
        }
        write_txn.commit()?;
        Ok(true)
    }

    /// One page of the tasks matching `filter`, plus how many match in total.
    pub fn find_tasks(
        &self,
        filter: &TaskFilter,
        page_request: &PageRequest,
    ) -> Result<Page<Task>, DataError> {
        let matcher = filter.compile();
        let read_txn = self.db.begin_read()?;
        let tasks_table = read_txn.open_table(TASKS_TABLE)?;

        let mut tasks = Vec::new();
        for entry in tasks_table.iter()? {
            let (_, value) = entry?;
            let task: Task = decode(value.value())?;
            if matcher.matches(&task) {
                tasks.push(task);
            }
        }

        tasks.sort_by(|a, b| page_request.sort.compare(a, b));
        let total_elements = tasks.len() as u64;
        let items = tasks
            .into_iter()
            .skip(page_request.offset())
            .take(page_request.size)
            .collect();

        Ok(Page::new(items, total_elements, page_request.page, page_request.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data_access::task_query::{Sort, SortDirection, SortField},
        task_priority::TaskPriority,
        task_status::TaskStatus,
    };
    use std::fs;

    fn new_task(title: &str, status: TaskStatus, priority: TaskPriority) -> NewTask {
        NewTask {
            title: title.into(),
            description: None,
            status,
            priority,
            due_date: None,
        }
    }

    fn seeded() -> DataContext {
        let data_context = DataContext::in_memory().unwrap();
        for task in [
            new_task("Write unit tests", TaskStatus::InProgress, TaskPriority::High),
            new_task("Deploy application", TaskStatus::Todo, TaskPriority::Medium),
            new_task("Write documentation", TaskStatus::Todo, TaskPriority::Low),
        ] {
            data_context.insert_task(task).unwrap();
        }
        data_context
    }

    fn titles(page: &Page<Task>) -> Vec<&str> {
        page.items.iter().map(|task| task.title.as_str()).collect()
    }

    #[test]
    fn insert_sets_id_and_timestamps() {
        let data_context = DataContext::in_memory().unwrap();

        let task = data_context
            .insert_task(new_task("Deploy", TaskStatus::Todo, TaskPriority::Medium))
            .unwrap();

        assert_eq!(task.id, 1);
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(data_context.find_task(1).unwrap(), Some(task));
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let data_context = seeded();

        assert!(data_context.delete_task(3).unwrap());
        let task = data_context
            .insert_task(new_task("Another", TaskStatus::Todo, TaskPriority::Low))
            .unwrap();

        assert_eq!(task.id, 4);
        assert!(!data_context.task_exists(3).unwrap());
    }

    #[test]
    fn no_filters_returns_all() {
        let page = seeded().find_tasks(&TaskFilter::default(), &PageRequest::default()).unwrap();

        assert_eq!(page.total_elements, 3);
        // newest first
        assert_eq!(
            titles(&page),
            vec!["Write documentation", "Deploy application", "Write unit tests"]
        );
    }

    #[test]
    fn filters_by_status() {
        let filter = TaskFilter {
            status: Some(TaskStatus::Todo),
            ..Default::default()
        };

        let page = seeded().find_tasks(&filter, &PageRequest::default()).unwrap();
        assert_eq!(page.total_elements, 2);
    }

    #[test]
    fn filters_by_priority() {
        let filter = TaskFilter {
            priority: Some(TaskPriority::High),
            ..Default::default()
        };

        let page = seeded().find_tasks(&filter, &PageRequest::default()).unwrap();
        assert_eq!(page.total_elements, 1);
        assert_eq!(titles(&page), vec!["Write unit tests"]);
    }

    #[test]
    fn filters_by_status_and_priority() {
        let filter = TaskFilter {
            status: Some(TaskStatus::Todo),
            priority: Some(TaskPriority::Medium),
            search: None,
        };

        let page = seeded().find_tasks(&filter, &PageRequest::default()).unwrap();
        assert_eq!(titles(&page), vec!["Deploy application"]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let filter = TaskFilter {
            search: Some("write".into()),
            ..Default::default()
        };

        let page = seeded().find_tasks(&filter, &PageRequest::default()).unwrap();
        assert_eq!(page.total_elements, 2);
    }

    #[test]
    fn pages_after_sorting() {
        let page_request = PageRequest {
            page: 1,
            size: 2,
            sort: Sort {
                field: SortField::Title,
                direction: SortDirection::Asc,
            },
        };

        let page = seeded().find_tasks(&TaskFilter::default(), &page_request).unwrap();

        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages(), 2);
        assert_eq!(titles(&page), vec!["Write unit tests"]);
    }

    #[test]
    fn update_unknown_id_writes_nothing() {
        let data_context = seeded();
        let mut called = false;

        let result = data_context.update_task(42, |_| called = true).unwrap();

        assert!(result.is_none());
        assert!(!called);
        assert!(!data_context.task_exists(42).unwrap());
    }

    #[test]
    fn update_keeps_id_and_created_at() {
        let data_context = seeded();
        let before = data_context.find_task(2).unwrap().unwrap();

        let after = data_context
            .update_task(2, |task| {
                task.id = 99;
                task.status = TaskStatus::Done;
            })
            .unwrap()
            .unwrap();

        assert_eq!(after.id, 2);
        assert_eq!(after.status, TaskStatus::Done);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(data_context.find_task(2).unwrap(), Some(after));
    }

    #[test]
    fn delete_unknown_id_returns_false() {
        let data_context = seeded();

        assert!(!data_context.delete_task(42).unwrap());
        assert_eq!(
            data_context
                .find_tasks(&TaskFilter::default(), &PageRequest::default())
                .unwrap()
                .total_elements,
            3
        );
    }

    #[test]
    fn default_user_is_seeded_once() {
        let settings = Settings {
            tcp_socket_binding: "127.0.0.1".into(),
            tcp_socket_port: 0,
            database_path: String::new(),
            jwt_secret: "secret".into(),
            jwt_expiration_in_minutes: 5,
            default_admin_username: "admin".into(),
            default_admin_password: "admin".into(),
            default_admin_email: "admin@localhost".into(),
            max_page_size: 100,
        };
        let data_context = DataContext::in_memory().unwrap();

        assert!(data_context.ensure_default_user(&settings).unwrap());
        assert!(!data_context.ensure_default_user(&settings).unwrap());
        let admin = data_context.get_user_by_username("admin").unwrap().unwrap();
        assert_eq!(data_context.get_user(admin.id).unwrap().unwrap().username, "admin");
    }

    #[test]
    fn file_store_survives_reopen() {
        let path = format!("/tmp/task_api_test_reopen_{}.redb", std::process::id());
        let _ = fs::remove_file(&path);

        {
            let data_context = DataContext::new(&path).unwrap();
            data_context
                .insert_task(new_task("Persisted", TaskStatus::Done, TaskPriority::High))
                .unwrap();
        }

        let reopened = DataContext::new(&path).unwrap();
        let task = reopened.find_task(1).unwrap().unwrap();
        assert_eq!(task.title, "Persisted");
        assert_eq!(task.status, TaskStatus::Done);

        let _ = fs::remove_file(&path);
    }
}
