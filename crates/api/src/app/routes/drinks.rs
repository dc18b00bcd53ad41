use axum::{
    Json, Router,
    extract::{
        Extension, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
};

use coffeeshop_auth::{Permission, TokenPayload};
use coffeeshop_core::{Drink, DrinkId, DrinkLong, DrinkShort, NewDrink, Recipe};

use crate::app::dto::{CreateDrinkRequest, DeleteResponse, DrinksResponse, UpdateDrinkRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppState;
use crate::middleware::{PermissionGate, require_permission};

pub fn router(state: AppState) -> Router<AppState> {
    let gate = |required: Permission| PermissionGate::new(state.verifier.clone(), required);

    Router::new()
        .route(
            "/drinks",
            get(list_drinks).merge(
                post(create_drink)
                    .route_layer(from_fn_with_state(gate(Permission::POST_DRINKS), require_permission)),
            ),
        )
        .route(
            "/drinks-detail",
            get(list_drinks_detail).route_layer(from_fn_with_state(
                gate(Permission::GET_DRINKS_DETAIL),
                require_permission,
            )),
        )
        .route(
            "/drinks/:id",
            patch(update_drink)
                .route_layer(from_fn_with_state(gate(Permission::PATCH_DRINKS), require_permission))
                .merge(delete(delete_drink).route_layer(from_fn_with_state(
                    gate(Permission::DELETE_DRINKS),
                    require_permission,
                ))),
        )
}

/// Public listing. Any failure while listing is reported as 422.
pub async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<DrinkShort>>, ApiError> {
    let drinks = state.drinks.list_all().await.map_err(|e| {
        tracing::warn!("listing drinks failed: {e}");
        ApiError::Unprocessable
    })?;

    Ok(Json(DrinksResponse::new(drinks.iter().map(Drink::short).collect())))
}

pub async fn list_drinks_detail(
    State(state): State<AppState>,
    Extension(payload): Extension<TokenPayload>,
) -> Result<Json<DrinksResponse<DrinkLong>>, ApiError> {
    let drinks = state.drinks.list_all().await?;
    tracing::debug!(sub = ?payload.sub, count = drinks.len(), "listing drink details");

    Ok(Json(DrinksResponse::new(drinks.iter().map(Drink::long).collect())))
}

pub async fn create_drink(
    State(state): State<AppState>,
    Extension(payload): Extension<TokenPayload>,
    body: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkLong>>, ApiError> {
    let Json(body) = body?;
    let new = NewDrink::new(body.title, Recipe::new(body.recipe))?;

    let drink = state.drinks.insert(new).await?;
    tracing::info!(drink_id = %drink.id, title = %drink.title, sub = ?payload.sub, "drink created");

    Ok(Json(DrinksResponse::new(vec![drink.long()])))
}

/// The drink is looked up before the body is examined, so an unknown id is
/// 404 whatever the body holds.
pub async fn update_drink(
    State(state): State<AppState>,
    Extension(payload): Extension<TokenPayload>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkLong>>, ApiError> {
    let Path(id) = id?;
    let mut drink = state
        .drinks
        .find_by_id(DrinkId::new(id))
        .await?
        .ok_or(ApiError::NotFound)?;

    let Json(body) = body?;
    drink.apply(body.into_patch())?;
    state.drinks.update(&drink).await?;
    tracing::info!(drink_id = %drink.id, title = %drink.title, sub = ?payload.sub, "drink updated");

    Ok(Json(DrinksResponse::new(vec![drink.long()])))
}

pub async fn delete_drink(
    State(state): State<AppState>,
    Extension(payload): Extension<TokenPayload>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Path(id) = id?;
    let drink = state
        .drinks
        .find_by_id(DrinkId::new(id))
        .await?
        .ok_or(ApiError::NotFound)?;

    state.drinks.delete(&drink).await?;
    tracing::info!(drink_id = %drink.id, sub = ?payload.sub, "drink deleted");

    Ok(Json(DeleteResponse {
        success: true,
        delete: drink.id,
    }))
}
