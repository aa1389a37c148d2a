//! Recipe and category domain models.
//!
//! The backend speaks Spanish camelCase (`titulo`, `urlImagen`,
//! `fechaCreacion`). The `*Api` types own that serde mapping and convert
//! into the domain structs the UI consumes, so field naming quirks stay in
//! this file.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Image shown when a recipe has none of its own
const DEFAULT_IMAGE_URL: &str = "/imagen-default.jpg";

/// Category name used when a recipe has no categories
const UNCATEGORIZED: &str = "Sin categoría";

/// Recipe difficulty as the backend enumerates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Facil,
    Media,
    Dificil,
}

impl Difficulty {
    /// Get the display name for this difficulty.
    pub fn display_name(&self) -> &'static str {
        match self {
            Difficulty::Facil => "Fácil",
            Difficulty::Media => "Media",
            Difficulty::Dificil => "Difícil",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// A recipe as the UI consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// First category name, or a placeholder when uncategorized
    pub category: String,
    /// Rounded mean of the ratings, 0 when unrated
    pub rating: u8,
    pub image_url: String,
    pub author: Option<String>,
    pub prep_minutes: Option<i64>,
    pub difficulty: Option<Difficulty>,
    pub created_at: Option<NaiveDateTime>,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipePage {
    pub recipes: Vec<Recipe>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub page: u32,
}

// ============================================================================
// Outbound payloads
// ============================================================================

/// Payload for creating a recipe.
///
/// Ingredients are sent by name; the backend resolves or creates the
/// matching ingredient records.
#[derive(Debug, Clone, Serialize)]
pub struct NewRecipe {
    pub titulo: String,
    pub descripcion: String,
    #[serde(rename = "tiempoPreparacion")]
    pub tiempo_preparacion: i64,
    pub dificultad: Difficulty,
    pub porciones: i64,
    pub categorias: Vec<CategoryRef>,
    pub ingredientes: Vec<NewIngredient>,
    pub pasos: Vec<NewStep>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewIngredient {
    pub nombre: String,
    pub cantidad: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewStep {
    pub orden: u32,
    pub descripcion: String,
}

// ============================================================================
// Raw API types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryApi {
    pub id: i64,
    pub nombre: String,
}

impl CategoryApi {
    pub fn to_category(&self) -> Category {
        Category {
            id: self.id,
            name: self.nombre.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingApi {
    pub puntuacion: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorRef {
    #[serde(rename = "nombreUsuario")]
    pub nombre_usuario: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeApi {
    pub id: i64,
    pub titulo: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub categorias: Vec<CategoryApi>,
    #[serde(default)]
    pub calificaciones: Vec<RatingApi>,
    #[serde(rename = "urlImagen", default)]
    pub url_imagen: Option<String>,
    #[serde(default)]
    pub usuario: Option<AuthorRef>,
    #[serde(rename = "tiempoPreparacion", default)]
    pub tiempo_preparacion: Option<i64>,
    #[serde(default)]
    pub dificultad: Option<Difficulty>,
    #[serde(rename = "fechaCreacion", default)]
    pub fecha_creacion: Option<NaiveDateTime>,
}

impl RecipeApi {
    pub fn to_recipe(&self) -> Recipe {
        Recipe {
            id: self.id,
            name: self.titulo.clone(),
            description: self.descripcion.clone(),
            category: self
                .categorias
                .first()
                .map(|c| c.nombre.clone())
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            rating: average_rating(&self.calificaciones),
            image_url: self
                .url_imagen
                .clone()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
            author: self
                .usuario
                .as_ref()
                .and_then(|u| u.nombre_usuario.clone()),
            prep_minutes: self.tiempo_preparacion,
            difficulty: self.dificultad,
            created_at: self.fecha_creacion,
        }
    }
}

/// Rounded mean of the ratings, 0 when unrated.
fn average_rating(ratings: &[RatingApi]) -> u8 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|r| r.puntuacion).sum();
    (sum as f64 / ratings.len() as f64).round() as u8
}
