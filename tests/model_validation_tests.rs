use drinks_api::models::{
    CreateDrinkRequest, Drink, DrinkRow, Ingredient, NewDrink, RecipeInput, UpdateDrinkRequest,
};

fn mojito() -> Drink {
    Drink {
        id: 7,
        title: "Mojito".to_string(),
        recipe: vec![
            Ingredient {
                name: "lime".to_string(),
                color: "green".to_string(),
                parts: 1,
            },
            Ingredient {
                name: "soda".to_string(),
                color: "clear".to_string(),
                parts: 4,
            },
        ],
    }
}

#[test]
fn test_short_view_never_exposes_names() {
    let json = serde_json::to_value(mojito().short()).unwrap();

    assert_eq!(json["id"], 7);
    assert_eq!(json["title"], "Mojito");
    for entry in json["recipe"].as_array().unwrap() {
        assert!(entry.get("name").is_none());
        assert!(entry.get("color").is_some());
        assert!(entry.get("parts").is_some());
    }
}

#[test]
fn test_long_view_always_exposes_names() {
    let json = serde_json::to_value(mojito().long()).unwrap();

    let names: Vec<_> = json["recipe"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["lime", "soda"]);
}

#[test]
fn test_recipe_input_accepts_object_or_list() {
    let single: RecipeInput =
        serde_json::from_str(r#"{"name":"water","color":"blue","parts":1}"#).unwrap();
    let many: RecipeInput =
        serde_json::from_str(r#"[{"name":"water","color":"blue","parts":1}]"#).unwrap();

    assert!(matches!(single, RecipeInput::Single(_)));
    assert_eq!(single.into_recipe(), many.into_recipe());
}

#[test]
fn test_create_request_builds_new_drink() {
    let req: CreateDrinkRequest = serde_json::from_str(
        r#"{"title":"Water","recipe":{"name":"water","color":"blue","parts":1}}"#,
    )
    .unwrap();

    let new: NewDrink = req.into();
    assert_eq!(new.title, "Water");
    assert_eq!(new.recipe.len(), 1);
    assert_eq!(new.recipe[0].name, "water");
}

#[test]
fn test_update_request_optionality() {
    let partial: UpdateDrinkRequest = serde_json::from_str(r#"{"title":"New Title Only"}"#).unwrap();
    assert!(partial.recipe.is_none());

    let json_output = serde_json::to_string(&partial).unwrap();
    assert!(json_output.contains(r#""title":"New Title Only""#));
    assert!(!json_output.contains("recipe"));
}

#[test]
fn test_apply_replaces_only_supplied_non_empty_fields() {
    let mut drink = mojito();
    drink.apply(UpdateDrinkRequest {
        title: Some("Virgin Mojito".to_string()),
        recipe: Some(RecipeInput::Many(vec![])),
    });

    assert_eq!(drink.title, "Virgin Mojito");
    assert_eq!(drink.recipe, mojito().recipe);
}

#[test]
fn test_row_decodes_encoded_recipe() {
    let row = DrinkRow {
        id: 1,
        title: "water".to_string(),
        recipe: r#"[{"name":"water","color":"blue","parts":1}]"#.to_string(),
    };

    let drink = Drink::try_from(row).unwrap();
    assert_eq!(drink.recipe[0].color, "blue");
}

#[test]
fn test_row_with_corrupt_recipe_fails() {
    let row = DrinkRow {
        id: 1,
        title: "water".to_string(),
        recipe: "not json".to_string(),
    };

    assert!(Drink::try_from(row).is_err());
}

#[test]
fn test_fractional_parts_are_rejected() {
    let result = serde_json::from_str::<Ingredient>(r#"{"name":"milk","color":"white","parts":1.5}"#);

    assert!(result.is_err());
}
