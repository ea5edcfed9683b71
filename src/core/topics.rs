//! Topics: named, independently filterable channels.
//!
//! Two stores sit behind [`TopicStore`]:
//!
//! - [`FixedTopics`]: capacity chosen up front, id = slot index, a removed slot
//!   is reused by the next insertion.
//! - [`DynamicTopics`]: unbounded, ids handed out by a counter so they are
//!   strictly increasing and never reused until [`TopicStore::clear`].

use super::level::{is_allowed, Level};
use crate::error::{Result, UlogError};
use crate::sinks::traits::OutputTarget;
use std::collections::BTreeMap;

/// Level a topic starts with.
pub const TOPIC_DEFAULT_LEVEL: Level = Level::TRACE;

/// Stable handle of a registered topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TopicId(usize);

impl TopicId {
    pub const fn new(value: usize) -> Self {
        TopicId(value)
    }

    pub const fn value(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
    pub level: Level,
    pub output: OutputTarget,
}

/// Answer of [`TopicRegistry::resolve`] for a loggable `(name, level)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicRoute {
    pub id: TopicId,
    pub output: OutputTarget,
}

/// Storage strategy for topics.
pub trait TopicStore: Send {
    /// Inserts a topic that is known not to exist yet.
    fn insert(&mut self, name: &str, output: OutputTarget) -> Result<TopicId>;

    fn find(&self, name: &str) -> Option<&Topic>;

    fn get(&self, id: TopicId) -> Option<&Topic>;

    fn get_mut(&mut self, id: TopicId) -> Option<&mut Topic>;

    /// Removes the topic called `name`, returning it.
    fn remove(&mut self, name: &str) -> Option<Topic>;

    fn clear(&mut self);

    fn len(&self) -> usize;
}

/// Fixed-capacity topic array.
#[derive(Debug)]
pub struct FixedTopics {
    slots: Vec<Option<Topic>>,
}

impl FixedTopics {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl TopicStore for FixedTopics {
    fn insert(&mut self, name: &str, output: OutputTarget) -> Result<TopicId> {
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_none())
            .ok_or_else(|| UlogError::error("topic table is full"))?;
        let id = TopicId(index);
        *slot = Some(Topic {
            id,
            name: name.to_string(),
            level: TOPIC_DEFAULT_LEVEL,
            output,
        });
        Ok(id)
    }

    fn find(&self, name: &str) -> Option<&Topic> {
        self.slots.iter().flatten().find(|topic| topic.name == name)
    }

    fn get(&self, id: TopicId) -> Option<&Topic> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: TopicId) -> Option<&mut Topic> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    fn remove(&mut self, name: &str) -> Option<Topic> {
        self.slots
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|topic| topic.name == name))
            .and_then(Option::take)
    }

    fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }
}

/// Unbounded topic arena keyed by id.
#[derive(Debug, Default)]
pub struct DynamicTopics {
    topics: BTreeMap<TopicId, Topic>,
    next_id: usize,
}

impl DynamicTopics {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TopicStore for DynamicTopics {
    fn insert(&mut self, name: &str, output: OutputTarget) -> Result<TopicId> {
        let id = TopicId(self.next_id);
        self.next_id += 1;
        self.topics.insert(
            id,
            Topic {
                id,
                name: name.to_string(),
                level: TOPIC_DEFAULT_LEVEL,
                output,
            },
        );
        Ok(id)
    }

    fn find(&self, name: &str) -> Option<&Topic> {
        self.topics.values().find(|topic| topic.name == name)
    }

    fn get(&self, id: TopicId) -> Option<&Topic> {
        self.topics.get(&id)
    }

    fn get_mut(&mut self, id: TopicId) -> Option<&mut Topic> {
        self.topics.get_mut(&id)
    }

    fn remove(&mut self, name: &str) -> Option<Topic> {
        let id = self.find(name)?.id;
        self.topics.remove(&id)
    }

    fn clear(&mut self) {
        self.topics.clear();
        self.next_id = 0;
    }

    fn len(&self) -> usize {
        self.topics.len()
    }
}

/// Topic registry shared by both storage strategies.
pub struct TopicRegistry {
    store: Box<dyn TopicStore>,
}

impl TopicRegistry {
    pub fn new(store: Box<dyn TopicStore>) -> Self {
        Self { store }
    }

    pub fn fixed(capacity: usize) -> Self {
        Self::new(Box::new(FixedTopics::new(capacity)))
    }

    pub fn dynamic() -> Self {
        Self::new(Box::new(DynamicTopics::new()))
    }

    /// Registers `name`, or returns the id it already has.
    pub fn add(&mut self, name: &str, output: OutputTarget) -> Result<TopicId> {
        if name.trim().is_empty() {
            return Err(UlogError::invalid_argument("topic name is blank"));
        }
        if let Some(topic) = self.store.find(name) {
            return Ok(topic.id);
        }
        self.store.insert(name, output)
    }

    pub fn id_of(&self, name: &str) -> Option<TopicId> {
        self.store.find(name).map(|topic| topic.id)
    }

    pub fn get(&self, id: TopicId) -> Option<&Topic> {
        self.store.get(id)
    }

    pub fn name_of(&self, id: TopicId) -> Option<&str> {
        self.store.get(id).map(|topic| topic.name.as_str())
    }

    /// Sets the level of topic `id`. The level must already be validated.
    pub fn set_level(&mut self, id: TopicId, level: Level) -> Result<()> {
        let topic = self
            .store
            .get_mut(id)
            .ok_or_else(|| UlogError::not_found(format!("topic id {}", id.0)))?;
        topic.level = level;
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(UlogError::invalid_argument("topic name is blank"));
        }
        self.store
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| UlogError::not_found(format!("topic '{}'", name)))
    }

    /// Single lookup deciding whether `(name, level)` is loggable and where
    /// it goes. `None` means drop the event.
    pub fn resolve(&self, name: &str, level: Level) -> Option<TopicRoute> {
        self.store
            .find(name)
            .filter(|topic| is_allowed(level, topic.level))
            .map(|topic| TopicRoute {
                id: topic.id,
                output: topic.output,
            })
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for TopicRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicRegistry")
            .field("len", &self.store.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::traits::OutputId;
    use proptest::prelude::*;

    fn registries() -> Vec<TopicRegistry> {
        vec![TopicRegistry::fixed(4), TopicRegistry::dynamic()]
    }

    #[test]
    fn test_add_is_idempotent() {
        for mut topics in registries() {
            let first = topics.add("net", OutputTarget::All).unwrap();
            let second = topics.add("net", OutputTarget::All).unwrap();
            assert_eq!(first, second);
            assert_eq!(topics.len(), 1);
        }
    }

    #[test]
    fn test_blank_name_rejected() {
        for mut topics in registries() {
            assert!(matches!(
                topics.add("  ", OutputTarget::All),
                Err(UlogError::InvalidArgument(_))
            ));
            assert!(matches!(topics.remove(""), Err(UlogError::InvalidArgument(_))));
        }
    }

    #[test]
    fn test_remove_then_lookup() {
        for mut topics in registries() {
            topics.add("disk", OutputTarget::All).unwrap();
            topics.remove("disk").unwrap();
            assert_eq!(topics.id_of("disk"), None);
            assert!(matches!(topics.remove("disk"), Err(UlogError::NotFound(_))));
        }
    }

    #[test]
    fn test_remove_ghost_is_not_found() {
        for mut topics in registries() {
            assert!(matches!(topics.remove("ghost"), Err(UlogError::NotFound(_))));
        }
    }

    #[test]
    fn test_fixed_reuses_slots_and_fills_up() {
        let mut topics = TopicRegistry::fixed(2);
        let a = topics.add("a", OutputTarget::All).unwrap();
        let b = topics.add("b", OutputTarget::All).unwrap();
        assert_eq!((a.value(), b.value()), (0, 1));
        assert!(matches!(
            topics.add("c", OutputTarget::All),
            Err(UlogError::Error(_))
        ));

        topics.remove("a").unwrap();
        let c = topics.add("c", OutputTarget::All).unwrap();
        assert_eq!(c, a);
    }

    #[test]
    fn test_dynamic_ids_never_reused_until_clear() {
        let mut topics = TopicRegistry::dynamic();
        let a = topics.add("a", OutputTarget::All).unwrap();
        let b = topics.add("b", OutputTarget::All).unwrap();
        topics.remove("b").unwrap();
        let c = topics.add("c", OutputTarget::All).unwrap();
        assert!(a < b && b < c);

        topics.clear();
        assert!(topics.is_empty());
        assert_eq!(topics.add("d", OutputTarget::All).unwrap().value(), 0);
    }

    #[test]
    fn test_resolve_applies_topic_level() {
        for mut topics in registries() {
            let target = OutputTarget::Id(OutputId::new(2));
            let id = topics.add("net", target).unwrap();
            topics.set_level(id, Level::WARN).unwrap();

            assert_eq!(topics.resolve("net", Level::INFO), None);
            assert_eq!(
                topics.resolve("net", Level::ERROR),
                Some(TopicRoute { id, output: target })
            );
            assert_eq!(topics.resolve("other", Level::FATAL), None);
        }
    }

    #[test]
    fn test_set_level_on_missing_topic() {
        let mut topics = TopicRegistry::dynamic();
        assert!(matches!(
            topics.set_level(TopicId::new(9), Level::INFO),
            Err(UlogError::NotFound(_))
        ));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u8),
        Remove(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![(0u8..6).prop_map(Op::Add), (0u8..6).prop_map(Op::Remove)]
    }

    proptest! {
        #[test]
        fn prop_dynamic_ids_strictly_increase(ops in proptest::collection::vec(op(), 1..64)) {
            let mut topics = TopicRegistry::dynamic();
            let mut highest: Option<TopicId> = None;
            for op in ops {
                match op {
                    Op::Add(n) => {
                        let name = format!("t{}", n);
                        let existed = topics.id_of(&name);
                        let id = topics.add(&name, OutputTarget::All).unwrap();
                        match existed {
                            Some(old) => {
                                prop_assert_eq!(old, id);
                            }
                            None => {
                                prop_assert!(highest.map_or(true, |h| id > h));
                                highest = Some(id);
                            }
                        }
                    }
                    Op::Remove(n) => {
                        let _ = topics.remove(&format!("t{}", n));
                    }
                }
            }
        }
    }
}
