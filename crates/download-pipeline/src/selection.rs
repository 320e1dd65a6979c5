use crate::SelectableEntity;
use std::collections::HashMap;

// Labels are display strings and can collide (two tracks with the same name,
// artist and album). A colliding entity is kept under its label suffixed with
// the catalog id, so no search result is ever lost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    entities: HashMap<String, SelectableEntity>,
    labels: Vec<String>,
}

impl Selection {
    pub fn from_entities(entities: impl IntoIterator<Item = SelectableEntity>) -> Self {
        let mut selection = Self::default();
        for entity in entities {
            selection.insert(entity);
        }
        selection
    }

    // Returns the label the entity was stored under, or `None` for an exact duplicate.
    pub fn insert(&mut self, mut entity: SelectableEntity) -> Option<&str> {
        let is_duplicate = self
            .entities
            .values()
            .any(|existing| existing.kind == entity.kind && existing.id == entity.id);
        if is_duplicate {
            return None;
        }

        if self.entities.contains_key(&entity.label) {
            let base = format!("{} ({})", entity.label, entity.id);
            let mut candidate = base.clone();
            let mut n = 2;
            while self.entities.contains_key(&candidate) {
                candidate = format!("{} #{}", base, n);
                n += 1;
            }
            entity.label = candidate;
        }

        let label = entity.label.clone();
        self.labels.push(label.clone());
        self.entities.insert(label, entity);

        self.labels.last().map(String::as_str)
    }

    pub fn get(&self, label: &str) -> Option<&SelectableEntity> {
        self.entities.get(label)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
