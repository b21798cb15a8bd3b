//! Runs against a live Postgres. Point `DATABASE_URL` at a disposable database
//! and run with `cargo test -- --ignored`.

use drinks_api::{
    models::{Ingredient, NewDrink},
    repository::{DrinkRepository, PostgresRepository, RepositoryError},
};
use serial_test::serial;
use sqlx::PgPool;

// --- Test Context and Setup ---

struct DbTestContext {
    repo: PostgresRepository,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        let repo = PostgresRepository::new(pool);
        repo.migrate().await.expect("Failed to run database migrations.");
        repo.reset_with_seed().await.expect("Failed to reset drinks table.");

        DbTestContext { repo }
    }
}

fn latte() -> NewDrink {
    NewDrink {
        title: "Latte".to_string(),
        recipe: vec![
            Ingredient {
                name: "espresso".to_string(),
                color: "brown".to_string(),
                parts: 1,
            },
            Ingredient {
                name: "steamed milk".to_string(),
                color: "white".to_string(),
                parts: 3,
            },
        ],
    }
}

// --- Tests ---

#[tokio::test]
#[serial]
#[ignore = "requires DATABASE_URL"]
async fn test_reset_seeds_water() {
    let ctx = DbTestContext::setup().await;

    let drinks = ctx.repo.list_drinks().await.unwrap();

    assert_eq!(drinks.len(), 1);
    assert_eq!(drinks[0].id, 1);
    assert_eq!(drinks[0].title, "water");
}

#[tokio::test]
#[serial]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_and_fetch_round_trips_recipe() {
    let ctx = DbTestContext::setup().await;

    let created = ctx.repo.insert_drink(latte()).await.unwrap();
    let fetched = ctx.repo.get_drink(created.id).await.unwrap().unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.recipe[1].name, "steamed milk");
}

#[tokio::test]
#[serial]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_title_maps_to_duplicate_error() {
    let ctx = DbTestContext::setup().await;

    ctx.repo.insert_drink(latte()).await.unwrap();
    let err = ctx.repo.insert_drink(latte()).await.unwrap_err();

    assert!(matches!(err, RepositoryError::DuplicateTitle(t) if t == "Latte"));
}

#[tokio::test]
#[serial]
#[ignore = "requires DATABASE_URL"]
async fn test_update_and_delete() {
    let ctx = DbTestContext::setup().await;

    let mut drink = ctx.repo.insert_drink(latte()).await.unwrap();
    drink.title = "Oat Latte".to_string();
    let updated = ctx.repo.update_drink(&drink).await.unwrap().unwrap();
    assert_eq!(updated.title, "Oat Latte");

    assert!(ctx.repo.delete_drink(drink.id).await.unwrap());
    assert!(!ctx.repo.delete_drink(drink.id).await.unwrap());
    assert!(ctx.repo.get_drink(drink.id).await.unwrap().is_none());
}
