//! Core domain types for Nutrilog.
//!
//! This module defines the fundamental types used throughout the system:
//! - Items (basic foods and recipes composed of other items)
//! - Consumption records
//! - Wire records exchanged with the persistence layer

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ============================================================================
// Item Types
// ============================================================================

/// How an item's per-serving value is defined
#[derive(Clone, Debug, PartialEq)]
pub enum ItemKind {
    /// A fixed per-serving value (calories)
    Leaf { value_per_serving: f64 },
    /// A weighted combination of other items, keyed by item id.
    /// Every serving multiplier is finite and positive.
    Composite { components: BTreeMap<String, f64> },
}

/// A catalog item: a basic food or a recipe built from other items
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub id: String,
    pub keywords: Vec<String>,
    pub kind: ItemKind,
}

impl Item {
    /// Create a leaf item with a fixed per-serving value
    pub fn leaf(id: impl Into<String>, keywords: Vec<String>, value_per_serving: f64) -> Self {
        Self {
            id: id.into(),
            keywords,
            kind: ItemKind::Leaf { value_per_serving },
        }
    }

    /// Create a composite item from (component id, servings) pairs
    pub fn composite(
        id: impl Into<String>,
        keywords: Vec<String>,
        components: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            id: id.into(),
            keywords,
            kind: ItemKind::Composite { components },
        }
    }

    /// Component ids referenced by this item (empty for leaves)
    pub fn component_ids(&self) -> Vec<&str> {
        match &self.kind {
            ItemKind::Leaf { .. } => Vec::new(),
            ItemKind::Composite { components } => components.keys().map(String::as_str).collect(),
        }
    }

    /// Case-insensitive keyword membership test.
    /// An empty keyword matches nothing.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        if keyword.is_empty() {
            return false;
        }
        self.keywords
            .iter()
            .any(|k| k.eq_ignore_ascii_case(keyword))
    }

    /// True when every search keyword is present on the item.
    /// An empty search matches everything (vacuous truth).
    pub fn matches_all(&self, keywords: &[String]) -> bool {
        keywords.iter().all(|k| self.matches_keyword(k))
    }

    /// True when at least one search keyword is present on the item.
    /// An empty search matches nothing.
    pub fn matches_any(&self, keywords: &[String]) -> bool {
        keywords.iter().any(|k| self.matches_keyword(k))
    }
}

// ============================================================================
// Wire Records
// ============================================================================

/// Tag distinguishing the two item record shapes on disk
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemRecordKind {
    Leaf,
    Composite,
}

/// One component reference inside a composite item record
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ComponentRecord {
    pub item_id: String,
    pub servings: f64,
}

/// On-disk form of a catalog item.
///
/// Leaves carry `value`; composites carry `components`. The structure is
/// re-validated when converted back into an [`Item`] so a hand-edited file
/// cannot smuggle in a malformed entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(rename = "type")]
    pub kind: ItemRecordKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ComponentRecord>>,
}

impl From<&Item> for ItemRecord {
    fn from(item: &Item) -> Self {
        match &item.kind {
            ItemKind::Leaf { value_per_serving } => ItemRecord {
                id: item.id.clone(),
                keywords: item.keywords.clone(),
                kind: ItemRecordKind::Leaf,
                value: Some(*value_per_serving),
                components: None,
            },
            ItemKind::Composite { components } => ItemRecord {
                id: item.id.clone(),
                keywords: item.keywords.clone(),
                kind: ItemRecordKind::Composite,
                value: None,
                components: Some(
                    components
                        .iter()
                        .map(|(item_id, servings)| ComponentRecord {
                            item_id: item_id.clone(),
                            servings: *servings,
                        })
                        .collect(),
                ),
            },
        }
    }
}

impl ItemRecord {
    /// Convert the record back into a domain item, validating its structure
    pub fn into_item(self) -> crate::Result<Item> {
        if self.id.trim().is_empty() {
            return Err(crate::Error::CatalogValidation(
                "item record has an empty id".into(),
            ));
        }

        match self.kind {
            ItemRecordKind::Leaf => {
                let value = self.value.ok_or_else(|| {
                    crate::Error::CatalogValidation(format!(
                        "leaf item '{}' is missing its value",
                        self.id
                    ))
                })?;
                if !value.is_finite() || value < 0.0 {
                    return Err(crate::Error::CatalogValidation(format!(
                        "leaf item '{}' has a negative or non-finite value",
                        self.id
                    )));
                }
                Ok(Item::leaf(self.id, self.keywords, value))
            }
            ItemRecordKind::Composite => {
                let components = self.components.ok_or_else(|| {
                    crate::Error::CatalogValidation(format!(
                        "composite item '{}' is missing its components",
                        self.id
                    ))
                })?;
                let mut map = BTreeMap::new();
                for component in components {
                    if !component.servings.is_finite() || component.servings <= 0.0 {
                        return Err(crate::Error::InvalidServings(component.servings));
                    }
                    map.insert(component.item_id, component.servings);
                }
                Ok(Item::composite(self.id, self.keywords, map))
            }
        }
    }
}

// ============================================================================
// Consumption Types
// ============================================================================

/// One consumed item within a day: at most one record exists per
/// (day, item_id) pair; repeated additions accumulate servings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConsumptionRecord {
    pub item_id: String,
    pub servings: f64,
    /// Optional meal label ("breakfast", "snack", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// On-disk form of one day of the log
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DayRecord {
    pub id: Uuid,
    pub day: NaiveDate,
    pub consumed: Vec<ConsumptionRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruit() -> Item {
        Item::leaf("apple", vec!["fruit".into(), "Sweet".into()], 95.0)
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let item = fruit();
        assert!(item.matches_keyword("FRUIT"));
        assert!(item.matches_keyword("sweet"));
        assert!(!item.matches_keyword("salty"));
    }

    #[test]
    fn test_empty_keyword_matches_nothing() {
        assert!(!fruit().matches_keyword(""));
    }

    #[test]
    fn test_match_all_over_empty_search_is_true() {
        assert!(fruit().matches_all(&[]));
    }

    #[test]
    fn test_match_any_over_empty_search_is_false() {
        assert!(!fruit().matches_any(&[]));
    }

    #[test]
    fn test_leaf_record_roundtrip() {
        let item = fruit();
        let record = ItemRecord::from(&item);
        assert_eq!(record.kind, ItemRecordKind::Leaf);
        assert_eq!(record.into_item().unwrap(), item);
    }

    #[test]
    fn test_composite_record_roundtrip() {
        let mut components = BTreeMap::new();
        components.insert("apple".to_string(), 2.0);
        components.insert("banana".to_string(), 1.0);
        let item = Item::composite("fruit_bowl", vec!["fruit".into()], components);

        let record = ItemRecord::from(&item);
        assert_eq!(record.kind, ItemRecordKind::Composite);
        assert_eq!(record.into_item().unwrap(), item);
    }

    #[test]
    fn test_leaf_record_without_value_is_rejected() {
        let record = ItemRecord {
            id: "broken".into(),
            keywords: vec![],
            kind: ItemRecordKind::Leaf,
            value: None,
            components: None,
        };
        assert!(record.into_item().is_err());
    }

    #[test]
    fn test_composite_record_with_nonpositive_servings_is_rejected() {
        let record = ItemRecord {
            id: "broken".into(),
            keywords: vec![],
            kind: ItemRecordKind::Composite,
            value: None,
            components: Some(vec![ComponentRecord {
                item_id: "apple".into(),
                servings: 0.0,
            }]),
        };
        assert!(matches!(
            record.into_item(),
            Err(crate::Error::InvalidServings(_))
        ));
    }

    #[test]
    fn test_item_record_json_shape() {
        let item = fruit();
        let json = serde_json::to_value(ItemRecord::from(&item)).unwrap();
        assert_eq!(json["type"], "leaf");
        assert_eq!(json["value"], 95.0);
        assert!(json.get("components").is_none());
    }

    #[test]
    fn test_day_record_serializes_date_as_iso() {
        let record = DayRecord {
            id: Uuid::new_v4(),
            day: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            consumed: vec![],
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["day"], "2024-01-01");
    }
}
