use rusqlite::{params, Connection, OptionalExtension};
use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::{data_types::DailyMenu, errors::StoreError};

/// Single current-value register for the daily menu.
pub trait MenuStore: Send + Sync {
    fn find_latest(&self) -> Result<Option<DailyMenu>, StoreError>;
    /// Atomically drops every stored menu and stores `menu` in their place.
    fn replace_all(&self, menu: &DailyMenu) -> Result<(), StoreError>;
}

pub struct SqliteMenuStore {
    db_path: PathBuf,
}

impl SqliteMenuStore {
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let store = SqliteMenuStore {
            db_path: db_path.as_ref().to_path_buf(),
        };
        store.check_or_create_db_tables()?;
        Ok(store)
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        Connection::open(&self.db_path)
    }

    fn check_or_create_db_tables(&self) -> rusqlite::Result<()> {
        let conn = self.connect()?;

        conn.prepare(
            "create table if not exists daily_menu (
            date text not null,
            json_text text not null
            )",
        )?
        .execute([])?;

        Ok(())
    }
}

impl MenuStore for SqliteMenuStore {
    fn find_latest(&self) -> Result<Option<DailyMenu>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare_cached(
            "select json_text from daily_menu
            order by date desc
            limit 1",
        )?;

        let json_text: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;
        match json_text {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn replace_all(&self, menu: &DailyMenu) -> Result<(), StoreError> {
        let json_text = serde_json::to_string(menu)?;
        let mut conn = self.connect()?;

        // readers never see an empty table in between
        let tx = conn.transaction()?;
        tx.execute("delete from daily_menu", [])?;
        tx.execute(
            "insert into daily_menu (date, json_text) values (?1, ?2)",
            params![menu.date, json_text],
        )?;
        tx.commit()?;

        Ok(())
    }
}

/// In-process register, for tests and runs without a database file.
#[derive(Default)]
pub struct MemoryMenuStore {
    menu: Mutex<Option<DailyMenu>>,
}

impl MemoryMenuStore {
    pub fn with_menu(menu: DailyMenu) -> Self {
        MemoryMenuStore {
            menu: Mutex::new(Some(menu)),
        }
    }
}

impl MenuStore for MemoryMenuStore {
    fn find_latest(&self) -> Result<Option<DailyMenu>, StoreError> {
        Ok(self.menu.lock().map_err(|_| StoreError::Poisoned)?.clone())
    }

    fn replace_all(&self, menu: &DailyMenu) -> Result<(), StoreError> {
        *self.menu.lock().map_err(|_| StoreError::Poisoned)? = Some(menu.clone());
        Ok(())
    }
}
