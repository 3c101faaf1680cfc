//! Error-code-to-message table.
//!
//! Every user-facing error message is looked up here by key. The built-in
//! table is English; a YAML file mapping keys to strings can override any
//! entry. Positional placeholders `{0}`, `{1}`, ... are substituted by
//! [`MessageCatalog::format`].

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;
use tracing::warn;

pub const ACCESS_DENIED_USER_DATA: &str = "exception.access-denied.user-data";
pub const PERMISSION_DENIED_USER_PROFILE: &str = "exception.permission-denied.user-profile";
pub const UNAUTHORIZED: &str = "exception.unauthorized";
pub const ADMIN_REQUIRED: &str = "exception.access-denied.admin-required";
pub const INVALID_ID: &str = "invalid.id.negative";
pub const USER_NOT_FOUND: &str = "user.not-found";
pub const USER_DUPLICATE_USERNAME: &str = "user.duplicate.username";
pub const USER_DUPLICATE_EMAIL: &str = "user.duplicate.email";
pub const CATEGORY_NOT_FOUND: &str = "category.not-found";
pub const CATEGORY_ID_NOT_ZERO: &str = "category.id.not-zero";
pub const CATEGORY_DUPLICATE_NAME: &str = "category.duplicate.name";
pub const CATEGORY_HAS_PRODUCTS: &str = "category.has-products";
pub const SUBCATEGORY_ID_NOT_ZERO: &str = "subcategory.id.not-zero";
pub const SUBCATEGORY_NOT_FOUND: &str = "subcategory.not-found";
pub const SUBCATEGORY_FOREIGN: &str = "subcategory.foreign-category";
pub const SUBCATEGORY_HAS_PRODUCTS: &str = "subcategory.has-products";

const BUILTIN: &[(&str, &str)] = &[
    (ACCESS_DENIED_USER_DATA, "You have no permission to view this user's data"),
    (PERMISSION_DENIED_USER_PROFILE, "You have no permission to modify this user profile"),
    (UNAUTHORIZED, "Full authentication is required to access this resource"),
    (ADMIN_REQUIRED, "Administrator role is required for this operation"),
    (INVALID_ID, "Identifier must be positive or zero, got {0}"),
    (USER_NOT_FOUND, "User with id {0} not found"),
    (USER_DUPLICATE_USERNAME, "Username '{0}' is already taken"),
    (USER_DUPLICATE_EMAIL, "Email '{0}' is already taken"),
    (CATEGORY_NOT_FOUND, "Category with id {0} not found"),
    (CATEGORY_ID_NOT_ZERO, "New category id has to be zero, got {0}"),
    (CATEGORY_DUPLICATE_NAME, "Category with name '{0}' already exists"),
    (CATEGORY_HAS_PRODUCTS, "Category with id {0} has subcategories with products and can not be deleted"),
    (SUBCATEGORY_ID_NOT_ZERO, "New subcategory id has to be zero, got {0}"),
    (SUBCATEGORY_NOT_FOUND, "Subcategory with id {0} not found"),
    (SUBCATEGORY_FOREIGN, "Subcategory with id {0} belongs to another category"),
    (SUBCATEGORY_HAS_PRODUCTS, "Subcategory with id {0} has products and can not be removed"),
];

#[derive(Debug, Clone)]
pub struct MessageCatalog {
    entries: HashMap<String, String>,
}

impl MessageCatalog {
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(key, text)| (key.to_string(), text.to_string()))
            .collect();
        Self { entries }
    }

    /// Built-in table with entries replaced by those in `path`.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read messages file {}", path.display()))?;
        Self::builtin().with_overrides_from_yaml(&raw)
    }

    pub fn with_overrides_from_yaml(mut self, raw: &str) -> Result<Self> {
        let overrides: HashMap<String, String> =
            serde_yaml::from_str(raw).context("Messages file must be a map of key to text")?;
        for key in overrides.keys() {
            if !self.entries.contains_key(key) {
                warn!("Message override for unknown key '{}'", key);
            }
        }
        self.entries.extend(overrides);
        Ok(self)
    }

    /// Message text for `key`, or the key itself when unknown.
    pub fn get(&self, key: &str) -> String {
        match self.entries.get(key) {
            Some(text) => text.clone(),
            None => {
                warn!("No message registered for key '{}'", key);
                key.to_string()
            }
        }
    }

    pub fn format(&self, key: &str, args: &[&dyn Display]) -> String {
        args.iter()
            .enumerate()
            .fold(self.get(key), |text, (i, arg)| {
                text.replace(&format!("{{{}}}", i), &arg.to_string())
            })
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_every_key() {
        let catalog = MessageCatalog::builtin();
        for (key, _) in BUILTIN {
            assert_ne!(catalog.get(key), *key);
        }
    }

    #[test]
    fn test_format_substitutes_positional_args() {
        let catalog = MessageCatalog::builtin();
        assert_eq!(
            catalog.format(CATEGORY_NOT_FOUND, &[&42]),
            "Category with id 42 not found"
        );
        assert_eq!(
            catalog.format(CATEGORY_DUPLICATE_NAME, &[&"shoes"]),
            "Category with name 'shoes' already exists"
        );
    }

    #[test]
    fn test_unknown_key_falls_back_to_key() {
        let catalog = MessageCatalog::builtin();
        assert_eq!(catalog.get("no.such.key"), "no.such.key");
    }

    #[test]
    fn test_yaml_overrides() {
        let catalog = MessageCatalog::builtin()
            .with_overrides_from_yaml(
                "exception.access-denied.user-data: \"Доступ заборонено\"\ncategory.not-found: \"Категорію {0} не знайдено\"\n",
            )
            .unwrap();
        assert_eq!(catalog.get(ACCESS_DENIED_USER_DATA), "Доступ заборонено");
        assert_eq!(catalog.format(CATEGORY_NOT_FOUND, &[&7]), "Категорію 7 не знайдено");
        // untouched entries keep the built-in text
        assert_eq!(
            catalog.format(SUBCATEGORY_NOT_FOUND, &[&3]),
            "Subcategory with id 3 not found"
        );
    }

    #[test]
    fn test_yaml_must_be_a_map() {
        assert!(MessageCatalog::builtin()
            .with_overrides_from_yaml("- just\n- a list\n")
            .is_err());
    }
}
