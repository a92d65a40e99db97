// Type-ahead filtering for the season, venue and driver pickers

use crate::model::Driver;

/// Text a query is matched against, already lowercased
pub trait Searchable {
    fn search_key(&self) -> String;
}

impl Searchable for i32 {
    fn search_key(&self) -> String {
        self.to_string()
    }
}

impl Searchable for String {
    fn search_key(&self) -> String {
        self.to_lowercase()
    }
}

impl Searchable for Driver {
    /// First name, last name and number run together, e.g. "lewishamilton44"
    fn search_key(&self) -> String {
        format!(
            "{}{}{}",
            self.first_name.to_lowercase(),
            self.last_name.to_lowercase(),
            self.driver_number
        )
    }
}

/// A list of entries with their search keys computed once, up front
#[derive(Clone, Debug)]
pub struct SearchIndex<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for SearchIndex<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Searchable> SearchIndex<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            entries: items
                .into_iter()
                .map(|item| (item.search_key(), item))
                .collect(),
        }
    }

    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, item)| item)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose key contains `query`, ignoring case. An empty query matches all.
    pub fn filter(&self, query: &str) -> Vec<&T> {
        let query = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|(key, _)| key.contains(&query))
            .map(|(_, item)| item)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(number: &str, first: &str, last: &str) -> Driver {
        Driver {
            driver_number: number.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            ..Driver::default()
        }
    }

    #[test]
    fn test_filter_venues_ignores_case() {
        let venues = SearchIndex::new(vec![
            "Qatar Grand Prix".to_string(),
            "Las Vegas Grand Prix".to_string(),
            "Italian Grand Prix".to_string(),
        ]);
        let found = venues.filter("VEGAS");
        assert_eq!(found, vec!["Las Vegas Grand Prix"]);
        assert_eq!(venues.filter("").len(), 3);
        assert!(venues.filter("monaco").is_empty());
    }

    #[test]
    fn test_filter_years_by_substring() {
        let years = SearchIndex::new(vec![2024, 2023, 2022, 2019]);
        assert_eq!(years.filter("202"), vec![&2024, &2023, &2022]);
        assert_eq!(years.filter("19"), vec![&2019]);
    }

    #[test]
    fn test_filter_drivers_by_name_or_number() {
        let drivers = SearchIndex::new(vec![
            driver("44", "Lewis", "Hamilton"),
            driver("63", "George", "Russell"),
            driver("1", "Max", "Verstappen"),
        ]);
        let by_name = drivers.filter("ham");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].driver_number, "44");

        let by_number = drivers.filter("63");
        assert_eq!(by_number[0].last_name, "Russell");

        // first and last name are joined without a space
        assert_eq!(drivers.filter("georgerus").len(), 1);
        assert!(drivers.filter("george rus").is_empty());
    }
}
