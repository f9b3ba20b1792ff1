use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use recipe_parser::{
    AppConfig, CancellationToken, ExtractionOutcome, LlmProvider, ParseError, ParseMethod,
    Provider, RecipeParser,
};

struct StubProvider {
    answer: String,
    delay: Duration,
    calls: AtomicUsize,
}

impl StubProvider {
    fn new(answer: &str) -> Arc<Self> {
        Self::slow(answer, Duration::ZERO)
    }

    fn slow(answer: &str, delay: Duration) -> Arc<Self> {
        Arc::new(StubProvider {
            answer: answer.to_string(),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for StubProvider {
    fn provider_name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, ParseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.answer.clone())
    }
}

const GENERATIVE_ANSWER: &str = r#"Here is the recipe:
{
  "title": "Cheese Toast",
  "servings": "2 servings",
  "ingredients": ["2 slices bread", "2 oz cheese"],
  "instructions": ["Heat the oven to 400°F.", "Toast the bread with the cheese on top."]
}"#;

fn recipe_page(json_ld: &str) -> String {
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

fn unstructured_page() -> String {
    r#"
        <html><body>
        <nav>Home | Recipes | About | Contact</nav>
        <article>
            <h1>Cheese Toast</h1>
            <p>The quickest lunch there is, ready in ten minutes with things you already have.</p>
            <ul class="ingredients-list">
                <li>2 slices bread</li>
                <li>2 oz cheese</li>
            </ul>
            <ol>
                <li>Heat the oven to 400°F.</li>
                <li>Toast the bread with the cheese on top.</li>
            </ol>
        </article>
        </body></html>
    "#
    .to_string()
}

fn parser_with(provider: Arc<StubProvider>) -> RecipeParser {
    RecipeParser::builder()
        .config(AppConfig::default())
        .llm_provider(provider)
        .build()
        .unwrap()
}

async fn serve_html(server: &mut mockito::ServerGuard, path: &str, body: String) -> mockito::Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(body)
        .create_async()
        .await
}

#[tokio::test]
async fn test_structured_recipe_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let json_ld = r#"{"@type":"Recipe","recipeIngredient":["1 cup flour"],"recipeInstructions":["Bake at 350°F"],"name":"Test"}"#;
    let mock = serve_html(&mut server, "/recipe", recipe_page(json_ld)).await;

    let stub = StubProvider::new(GENERATIVE_ANSWER);
    let parser = parser_with(stub.clone());
    let url = format!("{}/recipe", server.url());

    let outcome = parser.parse(&url, &CancellationToken::new()).await;
    mock.assert_async().await;

    assert_eq!(outcome.method(), ParseMethod::Structured);
    let recipe = outcome.recipe().unwrap();
    assert_eq!(recipe.title, "Test");
    assert_eq!(recipe.url, url);
    assert!(recipe.ingredients[0].measurement.normalized.contains("250ml flour"));
    assert_eq!(recipe.ingredients[0].measurement.original, "1 cup flour");
    assert!(recipe.instructions[0].contains("175°C"));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_structured_response_json() {
    let mut server = mockito::Server::new_async().await;
    let json_ld = r#"{"@type":"Recipe","recipeIngredient":["1 cup flour"],"recipeInstructions":["Bake at 350°F"],"name":"Test","totalTime":"PT1H30M"}"#;
    let _mock = serve_html(&mut server, "/recipe", recipe_page(json_ld)).await;

    let parser = parser_with(StubProvider::new(GENERATIVE_ANSWER));
    let response = parser
        .parse_response(&format!("{}/recipe", server.url()), &CancellationToken::new())
        .await;
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["method"], "structured");
    assert_eq!(json["recipe"]["totalTime"], "1 hour 30 minutes");
    assert_eq!(
        json["recipe"]["ingredients"][0]["measurement"]["normalized"],
        "250ml flour"
    );
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn test_short_digest_fails_without_generative_call() {
    let mut server = mockito::Server::new_async().await;
    let page = "<html><body><main><p>Coming soon.</p></main></body></html>".to_string();
    let _mock = serve_html(&mut server, "/empty", page).await;

    let stub = StubProvider::new(GENERATIVE_ANSWER);
    let parser = parser_with(stub.clone());
    let outcome = parser
        .parse(&format!("{}/empty", server.url()), &CancellationToken::new())
        .await;

    assert!(matches!(
        outcome,
        ExtractionOutcome::Failure(ParseError::InsufficientContent { minimum: 100, .. })
    ));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_generative_fallback() {
    let mut server = mockito::Server::new_async().await;
    let _mock = serve_html(&mut server, "/toast", unstructured_page()).await;

    let stub = StubProvider::new(GENERATIVE_ANSWER);
    let parser = parser_with(stub.clone());
    let outcome = parser
        .parse(&format!("{}/toast", server.url()), &CancellationToken::new())
        .await;

    assert_eq!(stub.calls(), 1);
    assert_eq!(outcome.method(), ParseMethod::Generative);
    let recipe = outcome.recipe().unwrap();
    assert_eq!(recipe.title, "Cheese Toast");
    assert_eq!(recipe.servings.as_deref(), Some("2 servings"));
    assert_eq!(recipe.ingredients[1].measurement.normalized, "56.7g cheese");
    assert_eq!(recipe.ingredients[1].name, "cheese");
    assert_eq!(recipe.instructions[0], "Heat the oven to 200°C.");
}

#[tokio::test]
async fn test_invalid_generative_output_is_rejected() {
    let mut server = mockito::Server::new_async().await;
    let _mock = serve_html(&mut server, "/toast", unstructured_page()).await;

    let stub = StubProvider::new(r#"{"title": "Cheese Toast", "ingredients": ["2 oz cheese"]}"#);
    let parser = parser_with(stub.clone());
    let response = parser
        .parse_response(&format!("{}/toast", server.url()), &CancellationToken::new())
        .await;

    assert!(!response.success);
    assert_eq!(response.method, ParseMethod::Failed);
    assert!(response.recipe.is_none());
    assert!(response
        .error
        .unwrap()
        .contains("Missing required recipe fields"));
}

#[tokio::test]
async fn test_generative_fallback_through_anthropic_api() {
    let mut server = mockito::Server::new_async().await;
    let _page = serve_html(&mut server, "/toast", unstructured_page()).await;
    let api_body = serde_json::json!({
        "content": [{"type": "text", "text": GENERATIVE_ANSWER}]
    });
    let api = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(api_body.to_string())
        .create_async()
        .await;

    let parser = RecipeParser::builder()
        .config(AppConfig::default())
        .provider(Provider::Anthropic)
        .api_key("test-key")
        .base_url(server.url())
        .build()
        .unwrap();
    let outcome = parser
        .parse(&format!("{}/toast", server.url()), &CancellationToken::new())
        .await;

    api.assert_async().await;
    assert_eq!(outcome.method(), ParseMethod::Generative);
    assert_eq!(outcome.recipe().unwrap().ingredients.len(), 2);
}

#[tokio::test]
async fn test_fetch_failures() {
    let mut server = mockito::Server::new_async().await;
    let _missing = server
        .mock("GET", "/missing")
        .with_status(404)
        .create_async()
        .await;
    let _json = server
        .mock("GET", "/api")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create_async()
        .await;

    let parser = parser_with(StubProvider::new(GENERATIVE_ANSWER));
    let cancel = CancellationToken::new();

    let outcome = parser.parse(&format!("{}/missing", server.url()), &cancel).await;
    assert!(matches!(
        outcome,
        ExtractionOutcome::Failure(ParseError::HttpStatus(404))
    ));

    let outcome = parser.parse(&format!("{}/api", server.url()), &cancel).await;
    assert!(matches!(outcome, ExtractionOutcome::Failure(ParseError::NotHtml(_))));
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let parser = parser_with(StubProvider::new(GENERATIVE_ANSWER));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = parser.parse("http://127.0.0.1:9/recipe", &cancel).await;
    assert!(matches!(outcome, ExtractionOutcome::Failure(ParseError::Cancelled)));
}

#[tokio::test]
async fn test_cancel_aborts_generative_call() {
    let mut server = mockito::Server::new_async().await;
    let _mock = serve_html(&mut server, "/toast", unstructured_page()).await;

    let stub = StubProvider::slow(GENERATIVE_ANSWER, Duration::from_secs(30));
    let parser = parser_with(stub.clone());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let outcome = parser.parse(&format!("{}/toast", server.url()), &cancel).await;

    assert!(matches!(outcome, ExtractionOutcome::Failure(ParseError::Cancelled)));
    assert_eq!(stub.calls(), 1);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_generative_timeout() {
    let mut server = mockito::Server::new_async().await;
    let _mock = serve_html(&mut server, "/toast", unstructured_page()).await;

    let parser = RecipeParser::builder()
        .config(AppConfig::default())
        .llm_provider(StubProvider::slow(GENERATIVE_ANSWER, Duration::from_secs(30)))
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let outcome = parser
        .parse(&format!("{}/toast", server.url()), &CancellationToken::new())
        .await;

    match outcome {
        ExtractionOutcome::Failure(ParseError::Generative(message)) => {
            assert!(message.contains("No response"))
        }
        other => panic!("expected a generative timeout, got {:?}", other.method()),
    }
}

#[tokio::test]
async fn test_invalid_url_is_a_client_error() {
    let parser = parser_with(StubProvider::new(GENERATIVE_ANSWER));
    let response = parser
        .parse_response("not a url", &CancellationToken::new())
        .await;

    assert!(!response.success);
    assert_eq!(response.method, ParseMethod::Failed);
    assert!(response.error.unwrap().contains("Invalid URL format"));
}

/// A local port that accepts connections but never answers them.
fn silent_server() -> (std::net::TcpListener, String) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/recipe", listener.local_addr().unwrap());
    (listener, url)
}

#[tokio::test]
async fn test_fetch_timeout() {
    let (_listener, url) = silent_server();
    let stub = StubProvider::new(GENERATIVE_ANSWER);
    let parser = RecipeParser::builder()
        .config(AppConfig::default())
        .llm_provider(stub.clone())
        .fetch_timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let started = std::time::Instant::now();
    let outcome = parser.parse(&url, &CancellationToken::new()).await;

    assert!(matches!(outcome, ExtractionOutcome::Failure(ParseError::Fetch(_))));
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_cancel_aborts_fetch() {
    let (_listener, url) = silent_server();
    let stub = StubProvider::new(GENERATIVE_ANSWER);
    let parser = RecipeParser::builder()
        .config(AppConfig::default())
        .llm_provider(stub.clone())
        .fetch_timeout(Duration::from_secs(60))
        .build()
        .unwrap();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let outcome = parser.parse(&url, &cancel).await;

    assert!(matches!(outcome, ExtractionOutcome::Failure(ParseError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_response_keeps_requested_url() {
    let mut server = mockito::Server::new_async().await;
    let json_ld = r#"{"@type":"Recipe","recipeIngredient":["1 cup flour"],"recipeInstructions":["Bake at 350°F"],"name":"Test"}"#;
    let _mock = serve_html(&mut server, "/", recipe_page(json_ld)).await;

    let parser = parser_with(StubProvider::new(GENERATIVE_ANSWER));
    let requested = server.url();
    assert!(!requested.ends_with('/'));
    let response = parser
        .parse_response(&format!("  {requested} "), &CancellationToken::new())
        .await;

    assert!(response.success);
    assert_eq!(response.recipe.unwrap().url, requested);
}
