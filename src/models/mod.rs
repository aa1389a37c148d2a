//! Domain models for the Recetario API.

pub mod recipe;

pub use recipe::{
    AuthorRef, Category, CategoryApi, CategoryRef, Difficulty, NewIngredient, NewRecipe, NewStep,
    RatingApi, Recipe, RecipeApi, RecipePage,
};
