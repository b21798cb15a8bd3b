use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Domain Schemas ---

/// Ingredient
///
/// A single entry of a drink recipe. `parts` is the ratio of this ingredient
/// relative to the others in the same cup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Ingredient {
    #[schema(example = "water")]
    pub name: String,
    #[schema(example = "blue")]
    pub color: String,
    /// Whole-number ratio. Fractional values are rejected with 422.
    #[schema(example = 1, minimum = 0)]
    pub parts: u32,
}

/// IngredientShort
///
/// The public projection of an `Ingredient`: the colour and ratio needed to
/// draw the cup, with the ingredient name withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct IngredientShort {
    pub color: String,
    /// Whole-number ratio.
    #[schema(minimum = 0)]
    pub parts: u32,
}

impl From<&Ingredient> for IngredientShort {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            color: ingredient.color.clone(),
            parts: ingredient.parts,
        }
    }
}

/// Drink
///
/// The persisted menu entry. The recipe is stored as a JSON encoded text column
/// (see `DrinkRow`) and decoded into typed ingredients at the repository boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    /// short
    ///
    /// Public view: ingredient names are hidden.
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.iter().map(IngredientShort::from).collect(),
        }
    }

    /// long
    ///
    /// Detailed view for holders of `get:drinks-detail` and for write responses.
    pub fn long(&self) -> DrinkLong {
        DrinkLong {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.clone(),
        }
    }

    /// apply
    ///
    /// Merges a partial update. A field only changes when it was supplied and is
    /// non-empty; an empty title or an empty recipe list leaves the stored value alone.
    pub fn apply(&mut self, update: UpdateDrinkRequest) {
        if let Some(title) = update.title.filter(|t| !t.is_empty()) {
            self.title = title;
        }
        if let Some(recipe) = update.recipe.map(RecipeInput::into_recipe) {
            if !recipe.is_empty() {
                self.recipe = recipe;
            }
        }
    }
}

/// NewDrink
///
/// A drink that has not been assigned an identifier by storage yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// DrinkRow
///
/// Raw database row (internal use). Maps directly to the `drinks` table, with the
/// recipe still in its encoded text form.
#[derive(Debug, Clone, FromRow)]
pub struct DrinkRow {
    pub id: i32,
    pub title: String,
    pub recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = serde_json::Error;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        Ok(Drink {
            id: row.id,
            title: row.title,
            recipe: serde_json::from_str(&row.recipe)?,
        })
    }
}

// --- Views (Output Schemas) ---

/// DrinkShort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DrinkShort {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<IngredientShort>,
}

/// DrinkLong
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DrinkLong {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

// --- Request Payloads (Input Schemas) ---

/// RecipeInput
///
/// Clients may send a recipe either as a single ingredient object or as a list.
/// A single object is wrapped into a one-element recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(untagged)]
#[ts(export)]
pub enum RecipeInput {
    Single(Ingredient),
    Many(Vec<Ingredient>),
}

impl RecipeInput {
    pub fn into_recipe(self) -> Vec<Ingredient> {
        match self {
            RecipeInput::Single(ingredient) => vec![ingredient],
            RecipeInput::Many(ingredients) => ingredients,
        }
    }
}

/// CreateDrinkRequest
///
/// Input payload for `POST /drinks`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateDrinkRequest {
    #[schema(example = "Water")]
    pub title: String,
    pub recipe: RecipeInput,
}

impl From<CreateDrinkRequest> for NewDrink {
    fn from(req: CreateDrinkRequest) -> Self {
        NewDrink {
            title: req.title,
            recipe: req.recipe.into_recipe(),
        }
    }
}

/// UpdateDrinkRequest
///
/// Partial update payload for `PATCH /drinks/{id}`. Omitted fields are left
/// untouched and are not serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateDrinkRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<RecipeInput>,
}

// --- Response Envelopes ---

/// DrinkListResponse
///
/// `GET /drinks` body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DrinkListResponse {
    pub success: bool,
    pub drinks: Vec<DrinkShort>,
}

/// DrinkDetailResponse
///
/// `GET /drinks-detail` and `PATCH /drinks/{id}` body. The update endpoint
/// returns the single updated drink inside a one-element list.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DrinkDetailResponse {
    pub success: bool,
    pub drinks: Vec<DrinkLong>,
}

/// DrinkCreatedResponse
///
/// `POST /drinks` body. Unlike the update response, the created drink is not
/// wrapped in a list.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DrinkCreatedResponse {
    pub success: bool,
    pub drinks: DrinkLong,
}

/// DrinkDeletedResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DrinkDeletedResponse {
    pub success: bool,
    pub delete: i32,
}

/// ErrorResponse
///
/// The uniform failure envelope. `error` holds the HTTP status code.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: u16,
    pub message: String,
}
