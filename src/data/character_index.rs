//! Reverse name/appellation lookup over the catalog. Built by one pass once
//! the catalog is complete; read-only afterwards.

use std::collections::HashMap;

use super::catalog::GameCatalog;

#[derive(Debug, Default)]
pub struct CharacterIndex {
    name_to_id: HashMap<String, String>,
    appellation_to_id: HashMap<String, String>,
}

impl CharacterIndex {
    pub fn build(catalog: &GameCatalog) -> Self {
        let mut index = CharacterIndex::default();
        for (id, unit) in catalog.units() {
            index.name_to_id.insert(unit.name.clone(), id.clone());
            if !unit.appellation.is_empty() {
                index
                    .appellation_to_id
                    .insert(unit.appellation.clone(), id.clone());
            }
        }
        index
    }

    pub fn name_to_id(&self, name: &str) -> Option<&str> {
        self.name_to_id.get(name).map(String::as_str)
    }

    pub fn appellation_to_id(&self, appellation: &str) -> Option<&str> {
        self.appellation_to_id.get(appellation).map(String::as_str)
    }

    pub fn id_to_name<'c>(&self, catalog: &'c GameCatalog, id: &str) -> Option<&'c str> {
        catalog.unit(id).map(|unit| unit.name.as_str())
    }

    pub fn id_to_appellation<'c>(&self, catalog: &'c GameCatalog, id: &str) -> Option<&'c str> {
        catalog
            .unit(id)
            .map(|unit| unit.appellation.as_str())
            .filter(|appellation| !appellation.is_empty())
    }
}
