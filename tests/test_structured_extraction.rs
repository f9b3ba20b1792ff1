use recipe_parser::{AppConfig, CancellationToken, ParseMethod, ParsedRecipe, RecipeParser};

fn create_recipe_html(json_ld: &str) -> String {
    format!(
        r#"
        <!DOCTYPE html>
        <html>
        <head>
            <title>Recipe Page</title>
            <script type="application/ld+json">
                {json_ld}
            </script>
        </head>
        <body>
            <h1>Recipe</h1>
        </body>
        </html>
        "#
    )
}

async fn parse_page(html: String) -> ParsedRecipe {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/recipe")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(html)
        .create_async()
        .await;

    let parser = RecipeParser::builder()
        .config(AppConfig::default())
        .build()
        .unwrap();
    let outcome = parser
        .parse(&format!("{}/recipe", server.url()), &CancellationToken::new())
        .await;

    assert_eq!(outcome.method(), ParseMethod::Structured);
    outcome.recipe().cloned().unwrap()
}

#[tokio::test]
async fn test_recipe_with_array_fields_and_empty_strings() {
    let json_ld = r#"
    {
        "@context": "https://schema.org",
        "@type": "Recipe",
        "author": {
            "@type": "Person",
            "name": "amateurprochef"
        },
        "cookTime": "PT30M",
        "datePublished": "2024-09-07T12:17:45-04:00",
        "description": "",
        "image": [
            "https://example.com/image1.jpg",
            "https://example.com/image2.jpg"
        ],
        "name": "Shahi Paneer",
        "prepTime": "",
        "recipeIngredient": [
            "300g paneer",
            "4 roma tomatoes",
            "2 red onion"
        ],
        "recipeInstructions": [
            {
                "@type": "HowToStep",
                "text": "Step 1: Chop vegetables"
            },
            {
                "@type": "HowToStep",
                "text": "Step 2: Cook the dish"
            }
        ],
        "recipeYield": "",
        "totalTime": ""
    }
    "#;

    let recipe = parse_page(create_recipe_html(json_ld)).await;

    assert_eq!(recipe.title, "Shahi Paneer");
    assert_eq!(recipe.description, None);
    assert_eq!(recipe.prep_time, None);
    assert_eq!(recipe.total_time, None);
    assert_eq!(recipe.servings, None);
    assert_eq!(recipe.cook_time.as_deref(), Some("30 minutes"));
    assert_eq!(recipe.image_url.as_deref(), Some("https://example.com/image1.jpg"));

    // Metric amounts are left untouched
    assert_eq!(recipe.ingredients[0].measurement.normalized, "300g paneer");
    assert_eq!(recipe.ingredients[1].measurement.normalized, "4 roma tomatoes");
    assert_eq!(
        recipe.instructions,
        vec!["Step 1: Chop vegetables", "Step 2: Cook the dish"]
    );
}

#[tokio::test]
async fn test_yoast_graph_with_sections() {
    let json_ld = r#"
    {
        "@context": "https://schema.org",
        "@graph": [
            {"@type": "Organization", "name": "Sweet Bakes", "logo": {"@type": "ImageObject", "url": "https://example.com/logo.png"}},
            {"@type": ["Article", "BlogPosting"], "headline": "Best Brownies"},
            {
                "@type": "Recipe",
                "name": "Fudgy Brownies &amp; Walnuts",
                "description": {"@type": "TextObject", "text": "Rich, dense &amp; chewy."},
                "image": {"@type": "ImageObject", "url": "https://example.com/brownies.jpg"},
                "recipeYield": ["16", "16 brownies"],
                "prepTime": "PT15M",
                "cookTime": "PT25M",
                "totalTime": "PT40M",
                "recipeIngredient": [
                    "1 stick butter",
                    "1 &frac12; cups sugar",
                    "2 large eggs",
                    "1/2 cup cocoa powder",
                    "1 tsp vanilla",
                    "pinch of salt"
                ],
                "recipeInstructions": [
                    {
                        "@type": "HowToSection",
                        "name": "Batter",
                        "itemListElement": [
                            {"@type": "HowToStep", "text": "Preheat the oven to 350 degrees F."},
                            {"@type": "HowToStep", "text": "Melt the butter and whisk in the sugar."}
                        ]
                    },
                    {
                        "@type": "HowToSection",
                        "name": "Bake",
                        "itemListElement": [
                            {"@type": "HowToStep", "text": "Bake for 25 minutes."}
                        ]
                    }
                ]
            }
        ]
    }
    "#;

    let recipe = parse_page(create_recipe_html(json_ld)).await;

    assert_eq!(recipe.title, "Fudgy Brownies & Walnuts");
    assert_eq!(recipe.description.as_deref(), Some("Rich, dense & chewy."));
    assert_eq!(recipe.image_url.as_deref(), Some("https://example.com/brownies.jpg"));
    assert_eq!(recipe.servings.as_deref(), Some("16"));
    assert_eq!(recipe.total_time.as_deref(), Some("40 minutes"));

    let normalized: Vec<&str> = recipe
        .ingredients
        .iter()
        .map(|i| i.measurement.normalized.as_str())
        .collect();
    assert_eq!(normalized[0], "125g butter");
    assert_eq!(normalized[1], "375ml sugar");
    assert_eq!(normalized[3], "125ml cocoa powder");
    assert_eq!(normalized[4], "5ml vanilla");
    assert_eq!(normalized[5], "pinch of salt");

    // Cups and spoons are acceptable in the regional rendering
    assert_eq!(
        recipe.ingredients[4].measurement.regional_equivalent.as_deref(),
        Some("1 tsp vanilla")
    );
    assert_eq!(recipe.ingredients[1].raw, "1 ½ cups sugar");

    assert_eq!(
        recipe.instructions,
        vec![
            "Preheat the oven to 175°C.",
            "Melt the butter and whisk in the sugar.",
            "Bake for 25 minutes."
        ]
    );
}

#[tokio::test]
async fn test_first_usable_block_wins() {
    let html = r#"
        <!DOCTYPE html>
        <html>
        <head>
            <script type="application/ld+json">{"@type": "BreadcrumbList", "itemListElement": [</script>
            <script type="application/ld+json">
                {"@type": "WebSite", "name": "Example"}
            </script>
            <script type="application/ld+json">
                [
                    {"@type": "Recipe", "name": "Teaser", "recipeIngredient": ["1 egg"]},
                    {"@type": "Recipe", "name": "Boiled Egg",
                     "recipeIngredient": ["1 egg"],
                     "recipeInstructions": "Boil the egg for 8 minutes.\nCool in ice water."}
                ]
            </script>
        </head>
        <body><h1>Boiled Egg</h1></body>
        </html>
    "#;

    let recipe = parse_page(html.to_string()).await;

    assert_eq!(recipe.title, "Boiled Egg");
    assert_eq!(
        recipe.instructions,
        vec!["Boil the egg for 8 minutes.", "Cool in ice water."]
    );
}

#[tokio::test]
async fn test_lowercase_type_and_missing_name() {
    let json_ld = r#"
    {
        "@context": "http://schema.org",
        "@type": "recipe",
        "recipeIngredient": "2 cups milk\n3 tbsp honey",
        "recipeInstructions": [{"name": "Warm the milk and stir in the honey."}],
        "recipeYield": 2,
        "totalTime": "PT1H5M"
    }
    "#;

    let recipe = parse_page(create_recipe_html(json_ld)).await;

    assert_eq!(recipe.title, "Untitled Recipe");
    assert_eq!(recipe.servings.as_deref(), Some("2"));
    assert_eq!(recipe.total_time.as_deref(), Some("1 hour 5 minutes"));
    assert_eq!(recipe.ingredients[0].measurement.normalized, "500ml milk");
    assert_eq!(recipe.ingredients[1].measurement.normalized, "45ml honey");
    assert_eq!(recipe.ingredients[1].name, "honey");
}
