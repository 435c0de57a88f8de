use std::collections::BTreeMap;

/// Category → subcategory reference table shown next to the stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    entries: BTreeMap<String, Vec<String>>,
}

const DEFAULT_TABLE: &[(&str, &[&str])] = &[
    (
        "sports",
        &[
            "football", "soccer", "basketball", "tennis", "golf", "baseball", "cricket", "rugby",
            "hockey", "volleyball", "swimming", "athletics", "boxing", "martial arts",
            "wrestling", "gymnastics", "cycling", "racing", "surfing", "skiing", "snowboarding",
            "skateboarding",
        ],
    ),
    (
        "nature",
        &[
            "landscape", "mountains", "forest", "ocean", "beach", "sunset", "wildlife",
            "flowers", "garden", "plants", "trees", "waterfall",
        ],
    ),
    (
        "technology",
        &[
            "computer", "smartphone", "robot", "ai", "gadget", "electronics", "software",
            "hardware", "internet", "data", "cybersecurity",
        ],
    ),
    (
        "business",
        &[
            "office", "meeting", "presentation", "startup", "entrepreneur", "corporate",
            "finance", "marketing", "team", "workplace",
        ],
    ),
    (
        "art",
        &[
            "painting", "sculpture", "drawing", "illustration", "digital art", "gallery",
            "museum", "exhibition", "artist", "creative",
        ],
    ),
    (
        "fashion",
        &[
            "clothing", "accessories", "runway", "model", "style", "designer", "fashion show",
            "outfit", "trend", "luxury",
        ],
    ),
    (
        "music",
        &[
            "concert", "band", "musician", "instrument", "performance", "studio", "recording",
            "sound", "dj", "festival",
        ],
    ),
    (
        "education",
        &[
            "school", "university", "classroom", "student", "teacher", "learning", "study",
            "campus", "library", "research",
        ],
    ),
    (
        "health",
        &[
            "fitness", "wellness", "medical", "doctor", "hospital", "healthcare", "exercise",
            "yoga", "meditation", "nutrition",
        ],
    ),
    (
        "automotive",
        &[
            "car", "vehicle", "automobile", "transportation", "driving", "road", "highway",
            "racing", "motorcycle", "luxury car",
        ],
    ),
    (
        "abstract",
        &[
            "pattern", "texture", "background", "minimal", "geometric", "shape", "form", "color",
            "design", "artistic",
        ],
    ),
    (
        "editorial",
        &[
            "magazine", "cover", "story", "feature", "journalism", "press", "media",
            "publication", "article", "news",
        ],
    ),
    (
        "film",
        &[
            "movie", "cinema", "theater", "actor", "actress", "director", "scene", "set",
            "production", "hollywood",
        ],
    ),
    (
        "3d",
        &[
            "3d-rendering", "3d-model", "3d-art", "digital-art", "animation", "cg",
            "computer-graphics", "virtual", "simulation", "3d-design",
        ],
    ),
    (
        "architecture",
        &[
            "building", "city", "urban", "interior", "design", "modern", "house", "apartment",
            "structure", "construction",
        ],
    ),
    (
        "people",
        &[
            "portrait", "person", "human", "face", "lifestyle", "fashion", "beauty", "model",
            "family", "friends",
        ],
    ),
    (
        "animals",
        &[
            "pet", "dog", "cat", "wildlife", "bird", "mammal", "reptile", "fish", "insect", "zoo",
        ],
    ),
    (
        "food",
        &[
            "meal", "restaurant", "cooking", "recipe", "cuisine", "dessert", "breakfast",
            "lunch", "dinner", "snack",
        ],
    ),
    (
        "travel",
        &[
            "vacation", "tourism", "destination", "journey", "adventure", "explore", "trip",
            "holiday", "backpacking", "roadtrip",
        ],
    ),
];

impl Default for CategoryTable {
    fn default() -> Self {
        let entries = DEFAULT_TABLE
            .iter()
            .map(|(name, subs)| {
                (
                    (*name).to_string(),
                    subs.iter().map(|sub| (*sub).to_string()).collect(),
                )
            })
            .collect();
        Self { entries }
    }
}

impl CategoryTable {
    pub fn from_map(entries: BTreeMap<String, Vec<String>>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(name, subs)| (name.trim().to_ascii_lowercase(), subs))
            .filter(|(name, _)| !name.is_empty())
            .collect();
        Self { entries }
    }

    /// Subcategories of `category`; unknown categories have none.
    pub fn subcategories(&self, category: &str) -> &[String] {
        self.entries
            .get(&category.trim().to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_knows_the_stock_categories() {
        let table = CategoryTable::default();
        assert_eq!(table.entries.len(), 19);
        assert!(table.subcategories("nature").contains(&"waterfall".to_string()));
        assert_eq!(table.subcategories("3D")[0], "3d-rendering");
        assert!(table.subcategories("unknown").is_empty());
    }

    #[test]
    fn custom_table_normalizes_names() {
        let mut map = BTreeMap::new();
        map.insert(" Birds ".to_string(), vec!["owl".to_string()]);
        map.insert("  ".to_string(), vec!["ignored".to_string()]);
        let table = CategoryTable::from_map(map);
        assert_eq!(table.entries.keys().collect::<Vec<_>>(), vec!["birds"]);
        assert_eq!(table.subcategories("birds"), ["owl".to_string()]);
    }
}
