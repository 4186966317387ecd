//! Creature templates and the factory that instantiates them.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use dungeon_puzzle_core::{ActorId, BaseStats, TemplateId};
use serde::Deserialize;
use thiserror::Error;

use crate::Creature;

/// Template describing a creature race.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CreatureTemplate {
    /// Identifier referenced by group configurations.
    pub id: TemplateId,
    /// Display name given to instances.
    pub name: String,
    /// Base attributes of every instance.
    #[serde(flatten)]
    pub stats: BaseStats,
    /// Whether instances are driven by an AI.
    #[serde(default = "default_has_ai")]
    pub has_ai: bool,
}

fn default_has_ai() -> bool {
    true
}

/// Errors raised while registering or instantiating templates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// No template is registered under the identifier.
    #[error("unknown creature template {}", .0.get())]
    UnknownTemplate(TemplateId),
    /// A template with the same identifier was registered twice.
    #[error("creature template {} registered twice", .0.get())]
    DuplicateTemplate(TemplateId),
}

/// Database of creature templates acting as the creature factory.
///
/// Actor identifiers are handed out sequentially starting at `1`.
#[derive(Debug)]
pub struct CreatureDb {
    templates: BTreeMap<TemplateId, CreatureTemplate>,
    next_actor_id: AtomicU64,
}

impl Default for CreatureDb {
    fn default() -> Self {
        Self {
            templates: BTreeMap::new(),
            next_actor_id: AtomicU64::new(1),
        }
    }
}

impl CreatureDb {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a database from the templates, rejecting duplicate identifiers.
    pub fn from_templates(
        templates: impl IntoIterator<Item = CreatureTemplate>,
    ) -> Result<Self, TemplateError> {
        let mut db = Self::new();
        for template in templates {
            db.register(template)?;
        }
        Ok(db)
    }

    /// Registers a template.
    pub fn register(&mut self, template: CreatureTemplate) -> Result<(), TemplateError> {
        if self.templates.contains_key(&template.id) {
            return Err(TemplateError::DuplicateTemplate(template.id));
        }
        let _ = self.templates.insert(template.id, template);
        Ok(())
    }

    /// Looks up a template.
    #[must_use]
    pub fn template(&self, id: TemplateId) -> Option<&CreatureTemplate> {
        self.templates.get(&id)
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Reports whether no templates are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Instantiates a fresh, unspawned creature of the template.
    pub fn create(&self, id: TemplateId) -> Result<Arc<Creature>, TemplateError> {
        let template = self
            .templates
            .get(&id)
            .ok_or(TemplateError::UnknownTemplate(id))?;
        let actor = ActorId::new(self.next_actor_id.fetch_add(1, Ordering::Relaxed));
        Ok(Arc::new(Creature::new(
            actor,
            template.id,
            template.name.clone(),
            template.stats,
            template.has_ai,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(id: u32, life: f32) -> CreatureTemplate {
        CreatureTemplate {
            id: TemplateId::new(id),
            name: format!("template-{id}"),
            stats: BaseStats {
                life,
                ..BaseStats::default()
            },
            has_ai: true,
        }
    }

    #[test]
    fn creates_distinct_actors_from_template() {
        let db = CreatureDb::from_templates([template(10_101, 40.0)]).expect("unique templates");

        let first = db.create(TemplateId::new(10_101)).expect("known template");
        let second = db.create(TemplateId::new(10_101)).expect("known template");

        assert_ne!(first.id(), second.id());
        assert_eq!(first.life(), 40.0);
        assert_eq!(first.name(), "template-10101");
        assert!(first.ai().is_some());
    }

    #[test]
    fn templates_are_looked_up_by_id() {
        let db = CreatureDb::from_templates([template(7, 12.0), template(9, 30.0)])
            .expect("unique templates");

        assert_eq!(db.len(), 2);
        assert_eq!(db.template(TemplateId::new(9)).map(|t| t.stats.life), Some(30.0));
        assert!(db.template(TemplateId::new(8)).is_none());
    }

    #[test]
    fn unknown_template_is_an_error() {
        let db = CreatureDb::new();
        assert_eq!(
            db.create(TemplateId::new(3)).map(|creature| creature.id()),
            Err(TemplateError::UnknownTemplate(TemplateId::new(3)))
        );
    }

    #[test]
    fn duplicate_templates_are_rejected() {
        let result = CreatureDb::from_templates([template(1, 1.0), template(1, 2.0)]);
        assert!(matches!(
            result,
            Err(TemplateError::DuplicateTemplate(id)) if id == TemplateId::new(1)
        ));
    }
}
