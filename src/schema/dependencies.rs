use super::tables::{get_table, ALL_TABLES};
use super::types::TableSchema;
use crate::error::{Result, SetupError};
use std::collections::{HashMap, HashSet};

/// Resolves the order tables must be built in so every foreign key can be
/// added once all tables are loaded
pub struct DependencyResolver {
    /// Map of table name -> tables that depend on it
    reverse_deps: HashMap<&'static str, HashSet<&'static str>>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        let mut reverse_deps: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();

        for table in ALL_TABLES {
            for dep in table.dependencies() {
                reverse_deps.entry(dep).or_default().insert(table.name);
            }
        }

        Self { reverse_deps }
    }

    /// All tables, parents before children.
    ///
    /// Ties keep catalog order, so the result is stable across runs.
    pub fn load_order(&self) -> Result<Vec<&'static TableSchema>> {
        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut temp_visited: HashSet<&str> = HashSet::new();

        for table in ALL_TABLES {
            if !visited.contains(table.name) {
                self.visit(table.name, &mut visited, &mut temp_visited, &mut result)?;
            }
        }

        Ok(result)
    }

    /// Tables with a foreign key into `name`, sorted
    pub fn dependents(&self, name: &str) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .reverse_deps
            .get(name)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    fn visit<'a>(
        &self,
        name: &'a str,
        visited: &mut HashSet<&'a str>,
        temp_visited: &mut HashSet<&'a str>,
        result: &mut Vec<&'static TableSchema>,
    ) -> Result<()> {
        if temp_visited.contains(name) {
            return Err(SetupError::Catalog(format!(
                "circular dependency detected at: {}",
                name
            )));
        }
        if visited.contains(name) {
            return Ok(());
        }

        let table = get_table(name)
            .ok_or_else(|| SetupError::Catalog(format!("unknown table: {}", name)))?;

        temp_visited.insert(name);

        // Walk parents in declaration order rather than set order
        for fk in table.foreign_keys {
            let dep = fk.references_table;
            // Self references never constrain the order
            if dep != name {
                self.visit(dep, visited, temp_visited, result)?;
            }
        }

        temp_visited.remove(name);
        visited.insert(name);
        result.push(table);

        Ok(())
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(tables: &[&TableSchema], name: &str) -> usize {
        tables.iter().position(|t| t.name == name).unwrap()
    }

    #[test]
    fn test_parents_before_children() {
        let resolver = DependencyResolver::new();
        let tables = resolver.load_order().unwrap();
        assert_eq!(tables.len(), ALL_TABLES.len());

        for table in &tables {
            for dep in table.dependencies() {
                assert!(
                    position(&tables, dep) < position(&tables, table.name),
                    "{} must load before {}",
                    dep,
                    table.name
                );
            }
        }
    }

    #[test]
    fn test_catalog_order_is_already_valid() {
        let resolver = DependencyResolver::new();
        let names: Vec<_> = resolver
            .load_order()
            .unwrap()
            .iter()
            .map(|t| t.name)
            .collect();
        let catalog: Vec<_> = ALL_TABLES.iter().map(|t| t.name).collect();
        assert_eq!(names, catalog);
    }

    #[test]
    fn test_dependents_of_movie() {
        let resolver = DependencyResolver::new();
        assert_eq!(
            resolver.dependents("movie"),
            vec![
                "cast_member",
                "crew",
                "movie_genre",
                "movie_language",
                "movie_production_company",
                "movie_production_country"
            ]
        );
        assert!(resolver.dependents("crew").is_empty());
    }

    #[test]
    fn test_gender_is_shared_parent() {
        let resolver = DependencyResolver::new();
        assert_eq!(
            resolver.dependents("gender"),
            vec!["cast_member", "crew", "person"]
        );
    }
}
