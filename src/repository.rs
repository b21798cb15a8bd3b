use crate::models::{Drink, DrinkRow, Ingredient, NewDrink};
use async_trait::async_trait;
use sqlx::PgPool;
use std::{collections::BTreeMap, sync::Arc, sync::Mutex};

/// RepositoryError
///
/// Every failure the persistence layer can surface. Handlers never inspect the
/// variant: all of them become a generic 500 at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("recipe encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("a drink titled {0:?} already exists")]
    DuplicateTitle(String),

    #[error("repository lock poisoned")]
    Poisoned,
}

/// Repository Trait
///
/// Abstract contract for all drink persistence. Handlers only see this trait, so
/// the Postgres implementation can be swapped for the in-memory one in tests.
///
/// **Send + Sync + async_trait** are required to share `Arc<dyn DrinkRepository>`
/// across Axum's task boundaries.
#[async_trait]
pub trait DrinkRepository: Send + Sync {
    /// All drinks ordered by id.
    async fn list_drinks(&self) -> Result<Vec<Drink>, RepositoryError>;

    async fn get_drink(&self, id: i32) -> Result<Option<Drink>, RepositoryError>;

    /// Persists a new drink and returns it with its storage-assigned id.
    async fn insert_drink(&self, drink: NewDrink) -> Result<Drink, RepositoryError>;

    /// Overwrites title and recipe of an existing row. Returns `None` if the row
    /// disappeared between the caller's fetch and this write.
    async fn update_drink(&self, drink: &Drink) -> Result<Option<Drink>, RepositoryError>;

    /// Returns true if a row was removed.
    async fn delete_drink(&self, id: i32) -> Result<bool, RepositoryError>;

    /// Empties the table, restarts id assignment and inserts the seed drink.
    async fn reset_with_seed(&self) -> Result<Drink, RepositoryError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn DrinkRepository>;

/// The single drink written by `reset_with_seed`.
pub fn seed_drink() -> NewDrink {
    NewDrink {
        title: "water".to_string(),
        recipe: vec![Ingredient {
            name: "water".to_string(),
            color: "blue".to_string(),
            parts: 1,
        }],
    }
}

// --- Postgres ---

/// PostgresRepository
///
/// The production implementation of `DrinkRepository`, backed by a Postgres pool.
/// Each operation is a single statement; there are no explicit transactions.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations in `./migrations`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// Maps the Postgres unique-violation on `drinks.title` to its own variant so the
/// log line says what happened.
fn map_write_error(err: sqlx::Error, title: &str) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::DuplicateTitle(title.to_string())
        }
        _ => RepositoryError::Database(err),
    }
}

#[async_trait]
impl DrinkRepository for PostgresRepository {
    async fn list_drinks(&self) -> Result<Vec<Drink>, RepositoryError> {
        let rows = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| Drink::try_from(row).map_err(RepositoryError::from))
            .collect()
    }

    async fn get_drink(&self, id: i32) -> Result<Option<Drink>, RepositoryError> {
        let row = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Drink::try_from).transpose()?)
    }

    async fn insert_drink(&self, drink: NewDrink) -> Result<Drink, RepositoryError> {
        let recipe = serde_json::to_string(&drink.recipe)?;

        let row = sqlx::query_as::<_, DrinkRow>(
            "INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
        )
        .bind(&drink.title)
        .bind(recipe)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &drink.title))?;

        Ok(Drink::try_from(row)?)
    }

    async fn update_drink(&self, drink: &Drink) -> Result<Option<Drink>, RepositoryError> {
        let recipe = serde_json::to_string(&drink.recipe)?;

        let row = sqlx::query_as::<_, DrinkRow>(
            "UPDATE drinks SET title = $2, recipe = $3 WHERE id = $1 RETURNING id, title, recipe",
        )
        .bind(drink.id)
        .bind(&drink.title)
        .bind(recipe)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &drink.title))?;

        Ok(row.map(Drink::try_from).transpose()?)
    }

    async fn delete_drink(&self, id: i32) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn reset_with_seed(&self) -> Result<Drink, RepositoryError> {
        sqlx::query("TRUNCATE TABLE drinks RESTART IDENTITY")
            .execute(&self.pool)
            .await?;

        self.insert_drink(seed_drink()).await
    }
}

// --- In-Memory ---

#[derive(Default)]
struct MemoryTable {
    next_id: i32,
    rows: BTreeMap<i32, Drink>,
}

impl MemoryTable {
    fn title_taken(&self, title: &str, except: Option<i32>) -> bool {
        self.rows
            .values()
            .any(|d| d.title == title && Some(d.id) != except)
    }
}

/// InMemoryRepository
///
/// A process-local `DrinkRepository` used by the test-suite and for running the
/// API without a database. Enforces the same unique-title rule as the Postgres schema.
#[derive(Default)]
pub struct InMemoryRepository {
    table: Mutex<MemoryTable>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository pre-populated with the given drinks, ids assigned in order.
    pub fn with_drinks(drinks: impl IntoIterator<Item = NewDrink>) -> Self {
        let repo = Self::new();
        if let Ok(mut table) = repo.table.lock() {
            for drink in drinks {
                table.next_id += 1;
                let id = table.next_id;
                table.rows.insert(
                    id,
                    Drink {
                        id,
                        title: drink.title,
                        recipe: drink.recipe,
                    },
                );
            }
        }
        repo
    }

    fn table(&self) -> Result<std::sync::MutexGuard<'_, MemoryTable>, RepositoryError> {
        self.table.lock().map_err(|_| RepositoryError::Poisoned)
    }
}

#[async_trait]
impl DrinkRepository for InMemoryRepository {
    async fn list_drinks(&self) -> Result<Vec<Drink>, RepositoryError> {
        Ok(self.table()?.rows.values().cloned().collect())
    }

    async fn get_drink(&self, id: i32) -> Result<Option<Drink>, RepositoryError> {
        Ok(self.table()?.rows.get(&id).cloned())
    }

    async fn insert_drink(&self, drink: NewDrink) -> Result<Drink, RepositoryError> {
        let mut table = self.table()?;
        if table.title_taken(&drink.title, None) {
            return Err(RepositoryError::DuplicateTitle(drink.title));
        }

        table.next_id += 1;
        let stored = Drink {
            id: table.next_id,
            title: drink.title,
            recipe: drink.recipe,
        };
        table.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_drink(&self, drink: &Drink) -> Result<Option<Drink>, RepositoryError> {
        let mut table = self.table()?;
        if table.title_taken(&drink.title, Some(drink.id)) {
            return Err(RepositoryError::DuplicateTitle(drink.title.clone()));
        }

        match table.rows.get_mut(&drink.id) {
            Some(row) => {
                *row = drink.clone();
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_drink(&self, id: i32) -> Result<bool, RepositoryError> {
        Ok(self.table()?.rows.remove(&id).is_some())
    }

    async fn reset_with_seed(&self) -> Result<Drink, RepositoryError> {
        *self.table()? = MemoryTable::default();
        self.insert_drink(seed_drink()).await
    }
}
