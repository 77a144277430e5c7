//! Depletable pool of ingredient names used while planning.

use std::collections::HashSet;

/// Plurals that the suffix rules get wrong.
const IRREGULAR: &[(&str, &str)] = &[
    ("leaves", "leaf"),
    ("loaves", "loaf"),
    ("halves", "half"),
    ("calves", "calf"),
    ("knives", "knife"),
    ("wolves", "wolf"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("teeth", "tooth"),
    ("feet", "foot"),
    ("children", "child"),
    ("people", "person"),
    ("cookies", "cookie"),
    ("brownies", "brownie"),
    ("smoothies", "smoothie"),
    ("veggies", "veggie"),
    ("pies", "pie"),
    ("olives", "olive"),
    ("chives", "chive"),
    ("cloves", "clove"),
    ("endives", "endive"),
    ("anchovies", "anchovy"),
    ("hoagies", "hoagie"),
    ("quiches", "quiche"),
    ("brioches", "brioche"),
    ("ganaches", "ganache"),
    ("sloes", "sloe"),
];

/// Words that are already singular even though they end in `s`.
const UNCOUNTABLE: &[&str] = &[
    "asparagus",
    "couscous",
    "hummus",
    "molasses",
    "citrus",
    "swiss",
    "grits",
    "series",
    "species",
    "lemongrass",
    "watercress",
    "brussels",
    "oats",
    "jus",
];

/// Reduces a plural English noun to its singular form.
///
/// Unknown forms are returned unchanged, so the result is always stable under
/// a second pass.
pub fn singularize(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, singular)) = IRREGULAR.iter().find(|(plural, _)| *plural == word) {
        return singular.to_string();
    }

    // Multi-word names ("cherry tomatoes") inflect on the last word only.
    if let Some((head, last)) = word.rsplit_once(' ') {
        return format!("{} {}", head, singularize(last));
    }

    if word.ends_with("ss") || word.ends_with("us") || word.len() <= 3 {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for suffix in ["ches", "shes", "xes", "sses", "oes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    match word.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => word.to_string(),
    }
}

/// Case-folds, trims and singularizes an ingredient name.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    singularize(&collapsed)
}

/// Ordered multiset of normalized ingredient names.
///
/// Duplicates are kept as separate entries; [`IngredientPool::remove`] drops
/// every entry matching a used name, not a single unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientPool {
    names: Vec<String>,
}

impl IngredientPool {
    pub fn from_inventory<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = items
            .into_iter()
            .map(|item| normalize_name(item.as_ref()))
            .filter(|name| !name.is_empty())
            .collect();
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns a new pool without any entry exactly equal to one of `used`.
    pub fn remove<S: AsRef<str>>(&self, used: &[S]) -> Self {
        let used: HashSet<&str> = used.iter().map(|u| u.as_ref()).collect();
        let names = self
            .names
            .iter()
            .filter(|name| !used.contains(name.as_str()))
            .cloned()
            .collect();
        Self { names }
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singularizes_common_food_plurals() {
        let cases = [
            ("tomatoes", "tomato"),
            ("eggs", "egg"),
            ("berries", "berry"),
            ("peaches", "peach"),
            ("radishes", "radish"),
            ("boxes", "box"),
            ("apples", "apple"),
            ("leaves", "leaf"),
            ("cookies", "cookie"),
            ("olives", "olive"),
            ("cherry tomatoes", "cherry tomato"),
            ("quiches", "quiche"),
            ("brioches", "brioche"),
            ("mini quiches", "mini quiche"),
            ("hoagies", "hoagie"),
            ("sloes", "sloe"),
            ("sizes", "size"),
            ("sandwiches", "sandwich"),
            ("glasses", "glass"),
        ];
        for (plural, singular) in cases {
            assert_eq!(singularize(plural), singular, "{plural}");
        }
    }

    #[test]
    fn leaves_singular_and_unknown_forms_alone() {
        for word in ["rice", "hummus", "asparagus", "molasses", "bass", "milk", "pea"] {
            assert_eq!(singularize(word), word);
        }
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in [
            "Tomatoes",
            " EGGS ",
            "Blueberries",
            "Green  Onions",
            "Swiss",
            "Loaves",
            "Sandwiches",
            "Peas",
            "Potatoes",
            "Hummus",
        ] {
            let once = normalize_name(raw);
            assert_eq!(normalize_name(&once), once, "{raw}");
        }
    }

    #[test]
    fn from_inventory_normalizes_and_drops_blanks() {
        let pool = IngredientPool::from_inventory(["Eggs", "  ", "Milk", "Tomatoes"]);
        assert_eq!(pool.names(), ["egg", "milk", "tomato"]);
    }

    #[test]
    fn remove_drops_every_occurrence() {
        let pool = IngredientPool::from_inventory(["egg", "egg", "milk"]);
        let after = pool.remove(&["egg"]);
        assert_eq!(after.names(), ["milk"]);
        assert_eq!(pool.len(), 3, "remove returns a new pool");
    }

    #[test]
    fn plural_recipe_names_deplete_singular_inventory() {
        let pool = IngredientPool::from_inventory(["Quiche", "milk", "brioche"]);
        let used = [normalize_name("Quiches"), normalize_name("brioches")];
        assert_eq!(pool.remove(&used).names(), ["milk"]);
    }

    #[test]
    fn remove_uses_exact_match_not_substring() {
        let pool = IngredientPool::from_inventory(["egg", "eggplant", "milk"]);
        let after = pool.remove(&["egg", "butter"]);
        assert_eq!(after.names(), ["eggplant", "milk"]);
    }
}
