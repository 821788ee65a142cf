use std::fmt;
use log::debug;
use crate::model::{Schema, Value, ID_KEY};
use crate::{Entity, Error, Result};

/// An insertion-ordered collection of entities of one kind.
///
/// Every operation reports expected failures (bad attribute, bad value,
/// unknown key, bad index) as an [`Error`] value and leaves the collection
/// untouched in that case. Successful mutations return the message shown to
/// the operator.
pub struct SqList<E: Entity> {
    items: Vec<E>,
}

impl<E: Entity> SqList<E> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn schema(&self) -> &'static Schema {
        E::schema()
    }

    fn kind(&self) -> &'static str {
        E::schema().kind()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.items.iter()
    }

    /// Fails when the list is empty or `i` is not below its length.
    pub fn index_valid(&self, i: usize) -> Result<()> {
        if self.is_empty() {
            return Err(Error::EmptyList);
        }
        if i >= self.len() {
            return Err(Error::IndexOutOfRange(i));
        }
        Ok(())
    }

    /// Appends an already constructed (and therefore validated) entity.
    pub fn add(&mut self, item: E) -> Result<String> {
        let msg = format!("{} {} added.", self.kind(), item);
        debug!("Appending {} id {} at index {}", self.kind(), item.id(), self.len());
        self.items.push(item);
        Ok(msg)
    }

    /// Inserts before position `i`; `i == len()` appends.
    pub fn insert(&mut self, i: usize, item: E) -> Result<String> {
        if i > self.len() {
            return Err(Error::IndexOutOfRange(i));
        }
        let msg = format!("{} {} added.", self.kind(), item);
        self.items.insert(i, item);
        Ok(msg)
    }

    pub fn get_by_index(&self, i: usize) -> Result<&E> {
        self.index_valid(i)?;
        Ok(&self.items[i])
    }

    /// Returns the index of the first entity whose `key` equals `value`.
    ///
    /// Unless `key` is `"id"`, the value is validated against the schema
    /// first. Several matches are not disambiguated; see [`SqList::find_all`].
    pub fn find_index(&self, key: &str, value: impl Into<Value>) -> Result<usize> {
        let (key, value) = self.lookup(key, value.into())?;
        self.items
            .iter()
            .position(|item| item.record().get(&key).as_ref() == Some(&value))
            .ok_or_else(|| self.not_found(&key, &value))
    }

    /// Returns the indices of every entity whose `key` equals `value`, in order.
    pub fn find_all(&self, key: &str, value: impl Into<Value>) -> Result<Vec<usize>> {
        let (key, value) = self.lookup(key, value.into())?;
        let found: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.record().get(&key).as_ref() == Some(&value))
            .map(|(i, _)| i)
            .collect();
        if found.is_empty() {
            return Err(self.not_found(&key, &value));
        }
        Ok(found)
    }

    pub fn get(&self, key: &str, value: impl Into<Value>) -> Result<&E> {
        let i = self.find_index(key, value)?;
        Ok(&self.items[i])
    }

    /// Removes the stored entity carrying the same id as `item`.
    pub fn remove(&mut self, item: &E) -> Result<String> {
        if self.is_empty() {
            return Err(Error::EmptyList);
        }
        let i = self.find_index(ID_KEY, item.id())?;
        self.delete_by_index(i, false)
    }

    /// Removes the entity at `i`.
    ///
    /// With `check_index` unset the caller vouches for `i` (it came from a
    /// lookup); an out-of-range index is still reported rather than panicking.
    pub fn delete_by_index(&mut self, i: usize, check_index: bool) -> Result<String> {
        if check_index {
            self.index_valid(i)?;
        } else if i >= self.len() {
            return Err(Error::IndexOutOfRange(i));
        }
        let item = self.items.remove(i);
        debug!("Deleted {} id {} from index {}", self.kind(), item.id(), i);
        Ok(format!("{} {} deleted.", self.kind(), item))
    }

    pub fn delete(&mut self, key: &str, value: impl Into<Value>) -> Result<String> {
        let i = self.find_index(key, value)?;
        self.delete_by_index(i, false)
    }

    /// Validates `new_value` for `attr` and, only if valid, stores it on the
    /// entity at `i`.
    ///
    /// `check_attr_name` controls whether an undeclared name fails the schema
    /// check up front; undeclared names are never stored either way. The id
    /// cannot be updated.
    pub fn update_attr_by_index(
        &mut self,
        i: usize,
        attr: &str,
        new_value: impl Into<Value>,
        check_index: bool,
        check_attr_name: bool,
    ) -> Result<String> {
        if check_index {
            self.index_valid(i)?;
        }
        let attr = attr.to_lowercase();
        if attr == ID_KEY {
            return Err(Error::InvalidAttribute(attr));
        }

        let schema = self.schema();
        let value = schema.normalize(&attr, new_value.into());
        schema.check(&attr, &value, check_attr_name)?;
        if !schema.is_attr_valid(&attr) {
            return Err(Error::InvalidAttribute(attr));
        }

        let kind = self.kind();
        let item = self.items.get_mut(i).ok_or(Error::IndexOutOfRange(i))?;
        item.record_mut().set(&attr, value);
        Ok(format!("{} {} updated.", kind, attr))
    }

    /// Looks an entity up by `key` and updates one of its attributes.
    pub fn update(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        attr: &str,
        new_value: impl Into<Value>,
    ) -> Result<String> {
        let i = self.find_index(key, value)?;
        self.update_attr_by_index(i, attr, new_value, false, true)
    }

    fn lookup(&self, key: &str, value: Value) -> Result<(String, Value)> {
        let key = key.to_lowercase();
        if key == ID_KEY {
            let value = match value {
                Value::Text(s) => s.trim().parse::<i64>().map(Value::Integer).unwrap_or(Value::Text(s)),
                other => other,
            };
            return Ok((key, value));
        }
        let schema = self.schema();
        let value = schema.normalize(&key, value);
        schema.check(&key, &value, true)?;
        Ok((key, value))
    }

    fn not_found(&self, key: &str, value: &Value) -> Error {
        Error::NotFound {
            kind: self.kind().to_string(),
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

impl<E: Entity> Default for SqList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> fmt::Debug for SqList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqList")
            .field("kind", &self.kind())
            .field("len", &self.len())
            .finish()
    }
}

impl<'a, E: Entity> IntoIterator for &'a SqList<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Allocator;
    use crate::model::{Gender, Person};

    fn person(ids: &Allocator, name: &str, gender: i64, age: i64) -> Person {
        Person::new(
            [
                ("name", Value::from(name)),
                ("gender", Value::from(gender)),
                ("age", Value::from(age)),
            ],
            ids,
        )
        .unwrap()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let ids = Allocator::in_memory();
        let mut list = SqList::new();

        let john = person(&ids, "John Smith", 1, 20);
        assert_eq!(john.id(), 1);
        assert_eq!(list.add(john).unwrap(), "Person John Smith -- Male added.");

        assert_eq!(list.find_index("name", "John Smith").unwrap(), 0);

        let msg = list.update_attr_by_index(0, "age", 21i64, true, true).unwrap();
        assert_eq!(msg, "Person age updated.");
        assert_eq!(list.get("id", 1u64).unwrap().age(), Some(21));

        let msg = list.delete("id", 1u64).unwrap();
        assert!(msg.ends_with("deleted."));
        assert!(list.is_empty());
    }

    #[test]
    fn test_index_valid() {
        let ids = Allocator::in_memory();
        let mut list: SqList<Person> = SqList::new();
        assert!(matches!(list.index_valid(0), Err(Error::EmptyList)));

        list.add(person(&ids, "Alice", 0, 20)).unwrap();
        list.add(person(&ids, "Bob", 1, 21)).unwrap();
        assert!(list.index_valid(0).is_ok());
        assert!(list.index_valid(1).is_ok());
        let err = list.index_valid(2).unwrap_err();
        assert_eq!(err.to_string(), "Index--2 out of list.");
    }

    #[test]
    fn test_delete_by_index_decrements_length() {
        let ids = Allocator::in_memory();
        let mut list = SqList::new();
        for name in ["Alice", "Bob", "Carol"] {
            list.add(person(&ids, name, 0, 30)).unwrap();
        }

        list.delete_by_index(1, true).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.delete_by_index(5, true).is_err());
        assert!(list.delete_by_index(5, false).is_err());
        assert_eq!(list.len(), 2);

        list.delete_by_index(0, true).unwrap();
        list.delete_by_index(0, true).unwrap();
        assert_eq!(list.len(), 0);
        assert!(matches!(list.delete_by_index(0, true), Err(Error::EmptyList)));
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let ids = Allocator::in_memory();
        let mut list = SqList::new();
        list.add(person(&ids, "Alice", 0, 20)).unwrap();
        list.delete("id", 1u64).unwrap();

        let bob = person(&ids, "Bob", 1, 20);
        assert_eq!(bob.id(), 2);
        list.add(bob).unwrap();
        assert!(matches!(list.get("id", 1u64), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_update_with_invalid_value_leaves_record_unchanged() {
        let ids = Allocator::in_memory();
        let mut list = SqList::new();
        list.add(person(&ids, "Alice", 0, 20)).unwrap();

        let err = list.update_attr_by_index(0, "age", 500i64, true, true).unwrap_err();
        assert_eq!(err.to_string(), "500 is an invalid Age.");
        assert_eq!(list.get_by_index(0).unwrap().age(), Some(20));

        assert!(list.update_attr_by_index(0, "name", "alice", true, true).is_err());
        assert_eq!(list.get_by_index(0).unwrap().name(), "Alice");

        assert!(list.update_attr_by_index(0, "name", "", true, true).is_err());
        assert_eq!(list.get_by_index(0).unwrap().name(), "Alice");
    }

    #[test]
    fn test_update_rejects_id_and_unknown_names() {
        let ids = Allocator::in_memory();
        let mut list = SqList::new();
        list.add(person(&ids, "Alice", 0, 20)).unwrap();

        assert!(matches!(
            list.update_attr_by_index(0, "id", 9i64, true, true),
            Err(Error::InvalidAttribute(_))
        ));
        assert!(matches!(
            list.update_attr_by_index(0, "nickname", "Al", true, false),
            Err(Error::InvalidAttribute(_))
        ));
        assert_eq!(list.get_by_index(0).unwrap().id(), 1);
        assert!(!list.get_by_index(0).unwrap().record().contains("nickname"));
    }

    #[test]
    fn test_update_optional_blank_removes_attr() {
        let ids = Allocator::in_memory();
        let mut list = SqList::new();
        list.add(person(&ids, "Alice", 0, 20)).unwrap();

        list.update_attr_by_index(0, "address", "1 Main St", true, true).unwrap();
        assert_eq!(list.get_by_index(0).unwrap().record().text("address"), "1 Main St");

        list.update_attr_by_index(0, "address", "", true, true).unwrap();
        assert!(!list.get_by_index(0).unwrap().record().contains("address"));
    }

    #[test]
    fn test_find_validates_non_id_keys() {
        let ids = Allocator::in_memory();
        let mut list = SqList::new();
        list.add(person(&ids, "Alice", 0, 20)).unwrap();

        let err = list.find_index("name", "alice").unwrap_err();
        assert_eq!(err.to_string(), "alice is an invalid Name.");
        let err = list.find_index("colour", "red").unwrap_err();
        assert_eq!(err.to_string(), "colour is not a valid attribute.");
        let err = list.find_index("name", "Bob").unwrap_err();
        assert_eq!(err.to_string(), "Person with name=Bob not found.");
        let err = list.find_index("id", 42u64).unwrap_err();
        assert_eq!(err.to_string(), "Person with id=42 not found.");

        assert_eq!(list.find_index("id", "1").unwrap(), 0);
        assert_eq!(list.find_index("gender", Gender::Female).unwrap(), 0);
        assert_eq!(list.find_index("age", "20").unwrap(), 0);
    }

    #[test]
    fn test_first_match_wins_and_find_all() {
        let ids = Allocator::in_memory();
        let mut list = SqList::new();
        list.add(person(&ids, "Alice", 0, 20)).unwrap();
        list.add(person(&ids, "Bob", 1, 20)).unwrap();
        list.add(person(&ids, "Alice", 0, 40)).unwrap();

        assert_eq!(list.find_index("name", "Alice").unwrap(), 0);
        assert_eq!(list.find_all("name", "Alice").unwrap(), vec![0, 2]);
        assert!(list.find_all("name", "Carol").is_err());

        list.delete("name", "Alice").unwrap();
        assert_eq!(list.get("name", "Alice").unwrap().age(), Some(40));
    }

    #[test]
    fn test_remove_and_insert() {
        let ids = Allocator::in_memory();
        let mut list = SqList::new();
        let alice = person(&ids, "Alice", 0, 20);
        let copy = alice.clone();
        list.add(alice).unwrap();
        list.insert(0, person(&ids, "Bob", 1, 20)).unwrap();
        assert_eq!(list.get_by_index(0).unwrap().name(), "Bob");
        assert!(list.insert(5, person(&ids, "Carol", 0, 20)).is_err());

        list.remove(&copy).unwrap();
        assert_eq!(list.len(), 1);
        assert!(list.remove(&copy).is_err());
    }

    #[test]
    fn test_update_by_key() {
        let ids = Allocator::in_memory();
        let mut list = SqList::new();
        list.add(person(&ids, "Alice", 0, 20)).unwrap();

        list.update("name", "Alice", "gender", "male").unwrap();
        assert_eq!(list.get_by_index(0).unwrap().gender(), Some(Gender::Male));
        assert!(list.update("name", "Zed", "age", 30i64).is_err());
    }
}
