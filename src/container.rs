use std::collections::HashMap;

use crate::{
    object::GameObject,
    property::{ArrayValue, ObjectRef, PropertyValue},
    Guid,
};

/// Insertion-ordered arena of decoded objects with lookup indices.
///
/// Objects are referenced by arena index everywhere (`parent`, `components`),
/// so the container can hand out plain `&GameObject` without shared ownership.
#[derive(Debug, Default)]
pub struct ObjectContainer {
    objects: Vec<GameObject>,
    by_guid: HashMap<Guid, usize>,
    by_name: HashMap<String, usize>,
}

impl ObjectContainer {
    pub fn new(objects: Vec<GameObject>) -> Self {
        let mut container = Self {
            objects,
            by_guid: HashMap::new(),
            by_name: HashMap::new(),
        };
        container.rebuild_indices();
        container
    }

    fn rebuild_indices(&mut self) {
        self.by_guid.clear();
        self.by_name.clear();
        for (i, object) in self.objects.iter().enumerate() {
            if !object.guid.is_nil() {
                self.by_guid.insert(object.guid, i);
            }
            if let Some(name) = object.primary_name() {
                // Components share their parent's first name with extra
                // entries; only top-level actors claim the name index.
                if !object.is_component() {
                    self.by_name.insert(name.to_string(), i);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.iter()
    }

    pub fn get(&self, id: usize) -> Option<&GameObject> {
        self.objects.get(id)
    }

    pub fn by_guid(&self, guid: &Guid) -> Option<&GameObject> {
        self.by_guid.get(guid).map(|&i| &self.objects[i])
    }

    pub fn by_name(&self, name: &str) -> Option<&GameObject> {
        self.by_name.get(name).map(|&i| &self.objects[i])
    }

    /// Linear scan for class names containing `pattern`.
    pub fn by_class_pattern<'a>(
        &'a self,
        pattern: &'a str,
    ) -> impl Iterator<Item = &'a GameObject> {
        self.objects
            .iter()
            .filter(move |o| o.class_name.value().contains(pattern))
    }

    /// Link components to their parents.
    ///
    /// An object A with more than one name belongs to the object whose first
    /// name equals `A.names[1]`; A lands in the parent's component map keyed
    /// by A's class name. Running the pass again produces the same links.
    pub fn build_relationships(&mut self) {
        let links: Vec<(usize, usize, String)> = self
            .objects
            .iter()
            .enumerate()
            .filter(|(_, object)| object.is_component())
            .filter_map(|(child, object)| {
                let parent_name = object.names[1].to_string();
                let parent = *self.by_name.get(&parent_name)?;
                Some((child, parent, object.class_name.value().to_owned()))
            })
            .collect();

        for (child, parent, class_name) in links {
            self.objects[child].parent = Some(parent);
            self.objects[parent].components.insert(class_name, child);
        }
    }

    /// Follow an object reference to its target, if it lives in this
    /// container.
    pub fn resolve(&self, reference: &ObjectRef) -> Option<&GameObject> {
        match reference {
            ObjectRef::Id(id) => usize::try_from(*id).ok().and_then(|i| self.get(i)),
            ObjectRef::Guid(guid) => self.by_guid(guid),
            ObjectRef::Name(name) => self.by_name(&name.to_string()),
            ObjectRef::Null => None,
        }
    }

    /// Messages for every id or GUID reference that does not resolve inside
    /// this container. Such references stay null on lookup; loaders fold the
    /// messages into `parse_errors`.
    pub fn dangling_references(&self) -> Vec<String> {
        let mut dangling = Vec::new();
        let check = |reference: &ObjectRef| match reference {
            ObjectRef::Id(_) | ObjectRef::Guid(_) => self.resolve(reference).is_none(),
            _ => false,
        };
        for object in &self.objects {
            for property in &object.properties {
                match &property.value {
                    PropertyValue::Object(reference) if check(reference) => {
                        dangling.push(format!(
                            "object {} property {}: unresolved reference {reference:?}",
                            object.id, property.name,
                        ));
                    }
                    PropertyValue::Array(ArrayValue::Object(refs))
                    | PropertyValue::Set(ArrayValue::Object(refs)) => {
                        for reference in refs.iter().filter(|r| check(r)) {
                            dangling.push(format!(
                                "object {} property {}: unresolved reference {reference:?}",
                                object.id, property.name,
                            ));
                        }
                    }
                    _ => {}
                }
            }
        }
        dangling
    }

    /// The status component attached to a creature or player pawn, if the
    /// relationship pass found one.
    pub fn status_component(&self, object: &GameObject) -> Option<&GameObject> {
        object
            .components
            .iter()
            .find(|(class, _)| class.contains("CharacterStatusComponent"))
            .map(|(_, &i)| &self.objects[i])
    }

    /// The inventory component attached to an actor, if any.
    pub fn inventory_component(&self, object: &GameObject) -> Option<&GameObject> {
        object
            .components
            .iter()
            .find(|(class, _)| class.contains("Inventory"))
            .map(|(_, &i)| &self.objects[i])
    }

    /// All creatures, tamed and wild.
    pub fn creatures(&self) -> Vec<&GameObject> {
        self.objects
            .iter()
            .filter(|o| {
                let class = o.class_name.value();
                class.contains("_Character_")
                    && !class.contains("Corpse")
                    && !class.contains("DinoCharacterStatusComponent")
            })
            .collect()
    }

    fn carries_tamer(&self, object: &GameObject) -> bool {
        if object.has_property("TamerString") {
            return true;
        }
        self.status_component(object)
            .is_some_and(|status| status.has_property("TamerString"))
    }

    pub fn tamed_creatures(&self) -> Vec<&GameObject> {
        self.creatures()
            .into_iter()
            .filter(|o| self.carries_tamer(o))
            .collect()
    }

    pub fn wild_creatures(&self) -> Vec<&GameObject> {
        self.creatures()
            .into_iter()
            .filter(|o| !self.carries_tamer(o))
            .collect()
    }

    /// Placed structures; inventory components are excluded.
    pub fn structures(&self) -> Vec<&GameObject> {
        self.objects
            .iter()
            .filter(|o| {
                let class = o.class_name.value();
                class.contains("Structure") && !class.contains("Inventory")
            })
            .collect()
    }

    /// Player avatars present on the map.
    pub fn player_pawns(&self) -> Vec<&GameObject> {
        self.by_class_pattern("PlayerPawnTest_").collect()
    }

    pub fn items(&self) -> Vec<&GameObject> {
        self.objects.iter().filter(|o| o.is_item).collect()
    }

    pub fn into_objects(self) -> Vec<GameObject> {
        self.objects
    }
}
