//! HTTP client for the Recetario REST API.
//!
//! This module provides the `ApiClient` struct: the authenticated request
//! pipeline every UI surface dispatches through. Each request is decorated
//! with the current bearer token (when one exists), and each response is
//! inspected for the 401 status that means the session is no longer valid.
//!
//! On 401 the client publishes a `SessionInvalidated` signal on the channel
//! it was constructed with and fails the call with `ApiError::Unauthorized`.
//! Tearing the session down is the root listener's job, never the client's:
//! the transport layer is built before the session owner and must not call
//! back into it directly.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::{InvalidationSender, SessionInvalidated, SessionManager, UserIdentity};
use crate::config::Config;
use crate::models::{Category, CategoryApi, NewRecipe, Recipe, RecipeApi, RecipePage};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Page size fetched when ranking recipes by rating.
/// Ratings live on individual entries, so ranking happens client-side over
/// a single large page.
const RATING_SCAN_PAGE_SIZE: usize = 100;

/// Sort expression for newest-first recipe listings
const SORT_NEWEST_FIRST: &str = "fechaCreacion,desc";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    contrasena: &'a str,
}

#[derive(Debug, Serialize)]
struct SignupRequest<'a> {
    #[serde(rename = "nombreUsuario")]
    username: &'a str,
    email: &'a str,
    contrasena: &'a str,
}

#[derive(Debug, Deserialize)]
struct JwtResponse {
    token: String,
    id: i64,
    #[serde(rename = "nombreUsuario")]
    username: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct SignupResponse {
    id: i64,
    #[serde(rename = "nombreUsuario")]
    username: String,
    email: String,
}

/// Spring `Page<T>` envelope
#[derive(Debug, Deserialize)]
struct PageResponse<T> {
    content: Vec<T>,
    #[serde(rename = "totalElements", default)]
    total_elements: u64,
    #[serde(rename = "totalPages", default)]
    total_pages: u32,
    #[serde(rename = "number", default)]
    page: u32,
}

/// Result of a successful authentication call.
///
/// Establishing the session is the caller's next step, via
/// `SessionManager::login` - acquisition and state mutation stay separate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: UserIdentity,
    pub token: String,
}

/// Search filters for `/recetas/search`. Unset fields are omitted from the
/// query string.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecipeSearch {
    #[serde(rename = "titulo", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "ingredienteNombre", skip_serializing_if = "Option::is_none")]
    pub ingredient: Option<String>,
    #[serde(rename = "dificultad", skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(
        rename = "tiempoPreparacionMax",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_prep_minutes: Option<i64>,
    #[serde(rename = "categoriaNombre", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// API client for the Recetario backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionManager,
    invalidated: InvalidationSender,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// The session handle is read-only from the client's point of view: it
    /// supplies the token at dispatch time. The sender half of the
    /// invalidation channel is how 401 responses reach the session owner.
    pub fn new(
        config: &Config,
        session: SessionManager,
        invalidated: InvalidationSender,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
            invalidated,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Authorization headers for the current session.
    ///
    /// The token is read fresh on every call: a request decorated before a
    /// logout simply completes with the old credential, and the server
    /// decides what to do with it.
    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.session.token() {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check a response from the decorated transport, publishing the
    /// session-expiry signal when the server answers 401.
    async fn check_response(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            warn!("Server rejected the session token");
            // A dropped receiver just means no root listener is wired up yet
            let _ = self.invalidated.send(SessionInvalidated);
        }
        Err(ApiError::from_status(status, &body).into())
    }

    /// Check a response from the auth endpoints. Rejected credentials are
    /// surfaced verbatim for the form to display; they never count as
    /// session expiry and never touch session state.
    async fn check_auth_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::credentials_rejected(&body).into())
    }

    // ===== Generic decorated transport =====

    /// GET a path under the API base, decorated with the session token.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = self.check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// GET with query parameters.
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = self.check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// POST a JSON body to a path under the API base, decorated with the
    /// session token.
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        let response = self.check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    // ===== Authentication =====

    /// Authenticate and return the identity plus bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let url = self.url("auth/login");
        let response = self
            .client
            .post(&url)
            .json(&LoginRequest {
                email,
                contrasena: password,
            })
            .send()
            .await
            .context("Failed to send login request")?;

        let response = Self::check_auth_response(response).await?;
        let jwt: JwtResponse = response
            .json()
            .await
            .context("Failed to parse login response")?;

        debug!(username = %jwt.username, "Login accepted");
        Ok(LoginOutcome {
            user: UserIdentity {
                id: jwt.id,
                username: jwt.username,
                email: jwt.email,
            },
            token: jwt.token,
        })
    }

    /// Register a new account. Returns the identity echoed by the server;
    /// signing up does not establish a session.
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Result<UserIdentity> {
        let url = self.url("auth/signup");
        let response = self
            .client
            .post(&url)
            .json(&SignupRequest {
                username,
                email,
                contrasena: password,
            })
            .send()
            .await
            .context("Failed to send signup request")?;

        let response = Self::check_auth_response(response).await?;
        let created: SignupResponse = response
            .json()
            .await
            .context("Failed to parse signup response")?;

        Ok(UserIdentity {
            id: created.id,
            username: created.username,
            email: created.email,
        })
    }

    // ===== Recipes =====

    /// Fetch the newest recipes.
    pub async fn fetch_latest_recipes(&self, limit: usize) -> Result<Vec<Recipe>> {
        let page: PageResponse<RecipeApi> = self
            .get_with_query(
                "recetas",
                &[("size", limit.to_string()), ("sort", SORT_NEWEST_FIRST.to_string())],
            )
            .await?;
        Ok(page.content.iter().map(RecipeApi::to_recipe).collect())
    }

    /// Fetch the best-rated recipes.
    ///
    /// The backend exposes no rating sort, so this scans one large page and
    /// ranks locally by average rating.
    pub async fn fetch_best_rated_recipes(&self, limit: usize) -> Result<Vec<Recipe>> {
        let page: PageResponse<RecipeApi> = self
            .get_with_query("recetas", &[("size", RATING_SCAN_PAGE_SIZE.to_string())])
            .await?;

        let mut recipes: Vec<Recipe> = page.content.iter().map(RecipeApi::to_recipe).collect();
        recipes.sort_by(|a, b| b.rating.cmp(&a.rating));
        recipes.truncate(limit);
        Ok(recipes)
    }

    /// Fetch all recipe categories.
    pub async fn fetch_categories(&self) -> Result<Vec<Category>> {
        let raw: Vec<CategoryApi> = self.get("categorias").await?;
        Ok(raw.iter().map(CategoryApi::to_category).collect())
    }

    /// Fetch the newest recipes in one category.
    pub async fn fetch_category_recipes(
        &self,
        category_id: i64,
        limit: usize,
    ) -> Result<Vec<Recipe>> {
        let page: PageResponse<RecipeApi> = self
            .get_with_query(
                &format!("categorias/{}/recetas", category_id),
                &[("size", limit.to_string()), ("sort", SORT_NEWEST_FIRST.to_string())],
            )
            .await?;
        Ok(page.content.iter().map(RecipeApi::to_recipe).collect())
    }

    /// Search recipes with the given filters, newest first.
    pub async fn search_recipes(
        &self,
        search: &RecipeSearch,
        page: u32,
        size: usize,
    ) -> Result<RecipePage> {
        let url = self.url("recetas/search");
        let response = self
            .client
            .get(&url)
            .query(search)
            .query(&[
                ("page", page.to_string()),
                ("size", size.to_string()),
                ("sort", SORT_NEWEST_FIRST.to_string()),
            ])
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = self.check_response(response).await?;
        let raw: PageResponse<RecipeApi> = response
            .json()
            .await
            .context("Failed to parse recipe search response")?;

        Ok(RecipePage {
            recipes: raw.content.iter().map(RecipeApi::to_recipe).collect(),
            total_elements: raw.total_elements,
            total_pages: raw.total_pages,
            page: raw.page,
        })
    }

    /// Create a recipe. Requires an established session; without one the
    /// server answers 401 and the call fails through the normal expiry path.
    pub async fn create_recipe(&self, recipe: &NewRecipe) -> Result<Recipe> {
        let created: RecipeApi = self.post("recetas", recipe).await?;
        Ok(created.to_recipe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_login_response() {
        let json = r#"{
            "token": "tok123",
            "type": "Bearer",
            "id": 7,
            "nombreUsuario": "ana",
            "email": "ana@example.com",
            "roles": ["ROLE_USER"]
        }"#;

        let jwt: JwtResponse = serde_json::from_str(json).expect("Failed to parse JwtResponse");
        assert_eq!(jwt.token, "tok123");
        assert_eq!(jwt.id, 7);
        assert_eq!(jwt.username, "ana");
        assert_eq!(jwt.email, "ana@example.com");
    }

    #[test]
    fn search_filters_skip_unset_fields() {
        let search = RecipeSearch {
            title: Some("tortilla".to_string()),
            max_prep_minutes: Some(30),
            ..Default::default()
        };

        let query = serde_json::to_value(&search).unwrap();
        let obj = query.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["titulo"], "tortilla");
        assert_eq!(obj["tiempoPreparacionMax"], 30);
    }

    #[test]
    fn parses_page_envelope() {
        let json = r#"{
            "content": [],
            "totalElements": 42,
            "totalPages": 3,
            "number": 1
        }"#;

        let page: PageResponse<RecipeApi> = serde_json::from_str(json).unwrap();
        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 42);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 1);
    }
}
