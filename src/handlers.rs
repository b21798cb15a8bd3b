use crate::{
    AppState,
    error::ApiError,
    models::{
        CreateDrinkRequest, DrinkCreatedResponse, DrinkDeletedResponse, DrinkDetailResponse,
        DrinkListResponse, ErrorResponse, UpdateDrinkRequest,
    },
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

// --- Handlers ---

/// list_drinks
///
/// [Public Route] Lists every drink in its short view (no ingredient names).
///
/// *Note*: an empty menu is reported as 404 rather than an empty list.
#[utoipa::path(
    get,
    path = "/drinks",
    responses(
        (status = 200, description = "All drinks, short view", body = DrinkListResponse),
        (status = 404, description = "No drinks on the menu", body = ErrorResponse)
    )
)]
pub async fn list_drinks(State(state): State<AppState>) -> Result<Json<DrinkListResponse>, ApiError> {
    let drinks = state.repo.list_drinks().await?;
    if drinks.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(DrinkListResponse {
        success: true,
        drinks: drinks.iter().map(|d| d.short()).collect(),
    }))
}

/// get_drinks_detail
///
/// [Requires `get:drinks-detail`] Lists every drink in its long view.
#[utoipa::path(
    get,
    path = "/drinks-detail",
    responses(
        (status = 200, description = "All drinks, long view", body = DrinkDetailResponse),
        (status = 401, description = "Authorization failed", body = ErrorResponse),
        (status = 404, description = "No drinks on the menu", body = ErrorResponse)
    )
)]
pub async fn get_drinks_detail(
    State(state): State<AppState>,
) -> Result<Json<DrinkDetailResponse>, ApiError> {
    let drinks = state.repo.list_drinks().await?;
    if drinks.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(DrinkDetailResponse {
        success: true,
        drinks: drinks.iter().map(|d| d.long()).collect(),
    }))
}

/// create_drink
///
/// [Requires `post:drinks`] Adds a drink to the menu. A single ingredient object
/// is accepted as a one-entry recipe.
#[utoipa::path(
    post,
    path = "/drinks",
    request_body = CreateDrinkRequest,
    responses(
        (status = 200, description = "Created", body = DrinkCreatedResponse),
        (status = 401, description = "Authorization failed", body = ErrorResponse),
        (status = 422, description = "Malformed body", body = ErrorResponse)
    )
)]
pub async fn create_drink(
    State(state): State<AppState>,
    payload: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinkCreatedResponse>, ApiError> {
    let Json(payload) = payload?;

    let drink = state.repo.insert_drink(payload.into()).await?;
    tracing::info!(id = drink.id, title = %drink.title, "drink created");

    Ok(Json(DrinkCreatedResponse {
        success: true,
        drinks: drink.long(),
    }))
}

/// update_drink
///
/// [Requires `patch:drinks`] Partially updates a drink. Title and recipe only
/// change when supplied and non-empty.
#[utoipa::path(
    patch,
    path = "/drinks/{id}",
    params(("id" = i32, Path, description = "Drink id")),
    request_body = UpdateDrinkRequest,
    responses(
        (status = 200, description = "Updated", body = DrinkDetailResponse),
        (status = 401, description = "Authorization failed", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn update_drink(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinkDetailResponse>, ApiError> {
    let Path(id) = id?;
    let mut drink = state.repo.get_drink(id).await?.ok_or(ApiError::NotFound)?;
    let Json(update) = payload?;

    drink.apply(update);
    let drink = state.repo.update_drink(&drink).await?.ok_or(ApiError::NotFound)?;
    tracing::info!(id = drink.id, "drink updated");

    Ok(Json(DrinkDetailResponse {
        success: true,
        drinks: vec![drink.long()],
    }))
}

/// delete_drink
///
/// [Requires `delete:drinks`] Removes a drink from the menu.
#[utoipa::path(
    delete,
    path = "/drinks/{id}",
    params(("id" = i32, Path, description = "Drink id")),
    responses(
        (status = 200, description = "Deleted", body = DrinkDeletedResponse),
        (status = 401, description = "Authorization failed", body = ErrorResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn delete_drink(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<DrinkDeletedResponse>, ApiError> {
    let Path(id) = id?;
    state.repo.get_drink(id).await?.ok_or(ApiError::NotFound)?;

    // A concurrent delete can win the race after the fetch above.
    if !state.repo.delete_drink(id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(id, "drink deleted");

    Ok(Json(DrinkDeletedResponse {
        success: true,
        delete: id,
    }))
}

// --- Fallbacks ---

/// Unknown paths.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Known paths called with an unsupported method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
