//! Table schema updater.
//!
//! Compares the current definition of a table with the desired one and
//! drives a [`SchemaModifier`] through the changes. Fields are matched by
//! name only: a field present on both sides is never touched, even when its
//! type, nullability or default differ.

use tracing::{debug, info};

use crate::definitions::{FieldDefinition, IndexDefinition, TableDefinition};
use crate::error::{SchemaModificationError, SchemaUpdateError};
use crate::modifier::SchemaModifier;
use crate::query::BoxFuture;

/// Brings a live table in line with a desired definition.
pub trait TableSchemaUpdater: Send + Sync {
    /// Updates the fields of `current` so they match `new`.
    ///
    /// Indexes are not reconciled.
    fn update_table<'a>(
        &'a self,
        current: &'a TableDefinition,
        new: &'a TableDefinition,
    ) -> BoxFuture<'a, Result<(), SchemaUpdateError>>;
}

/// Updater issuing one removal per dropped field, then one addition per new
/// field.
///
/// A failure stops the update; modifications already made stay applied.
#[derive(Debug, Clone)]
pub struct SimpleTableSchemaUpdater<M> {
    modifier: M,
}

impl<M: SchemaModifier> SimpleTableSchemaUpdater<M> {
    /// Creates an updater on top of the given modifier.
    #[must_use]
    pub const fn new(modifier: M) -> Self {
        Self { modifier }
    }

    /// Returns the modifier.
    #[must_use]
    pub const fn modifier(&self) -> &M {
        &self.modifier
    }

    /// Updates the indexes of `current` so they match `new`.
    ///
    /// Indexes are matched by name, like fields in
    /// [`TableSchemaUpdater::update_table`]. This is a separate step: it is
    /// never run as part of a field update.
    ///
    /// # Errors
    ///
    /// Fails with [`SchemaUpdateError::Mismatch`] when the names differ, and
    /// with [`SchemaUpdateError::Failed`] when a modification fails.
    pub async fn update_indexes(
        &self,
        current: &TableDefinition,
        new: &TableDefinition,
    ) -> Result<(), SchemaUpdateError> {
        ensure_same_table(current, new)?;

        self.apply_index_changes(current, new)
            .await
            .map_err(|source| failed(current, new, source))?;

        info!(table = current.name(), "Indexes updated");
        Ok(())
    }

    async fn apply_field_changes(
        &self,
        current: &TableDefinition,
        new: &TableDefinition,
    ) -> Result<(), SchemaModificationError> {
        let table = current.name();

        for field in fields_missing_from(current, new) {
            debug!(table, field = field.name(), "Removing field");
            self.modifier.remove_field(table, field.name()).await?;
        }

        for field in fields_missing_from(new, current) {
            debug!(table, field = field.name(), "Adding field");
            self.modifier.add_field(table, field).await?;
        }

        Ok(())
    }

    async fn apply_index_changes(
        &self,
        current: &TableDefinition,
        new: &TableDefinition,
    ) -> Result<(), SchemaModificationError> {
        let table = current.name();

        for index in indexes_missing_from(current, new) {
            debug!(table, index = index.name(), "Removing index");
            self.modifier.remove_index(table, index.name()).await?;
        }

        for index in indexes_missing_from(new, current) {
            debug!(table, index = index.name(), "Adding index");
            self.modifier.add_index(table, index).await?;
        }

        Ok(())
    }
}

impl<M: SchemaModifier> TableSchemaUpdater for SimpleTableSchemaUpdater<M> {
    fn update_table<'a>(
        &'a self,
        current: &'a TableDefinition,
        new: &'a TableDefinition,
    ) -> BoxFuture<'a, Result<(), SchemaUpdateError>> {
        Box::pin(async move {
            ensure_same_table(current, new)?;

            self.apply_field_changes(current, new)
                .await
                .map_err(|source| failed(current, new, source))?;

            info!(table = current.name(), "Table updated");
            Ok(())
        })
    }
}

/// Fields of `from` whose name does not appear in `other`, in `from` order.
fn fields_missing_from<'a>(
    from: &'a TableDefinition,
    other: &'a TableDefinition,
) -> impl Iterator<Item = &'a FieldDefinition> {
    from.fields()
        .values()
        .filter(move |f| !other.has_field_with_name(f.name()))
}

fn indexes_missing_from<'a>(
    from: &'a TableDefinition,
    other: &'a TableDefinition,
) -> impl Iterator<Item = &'a IndexDefinition> {
    from.indexes()
        .values()
        .filter(move |i| !other.has_index_with_name(i.name()))
}

fn ensure_same_table(
    current: &TableDefinition,
    new: &TableDefinition,
) -> Result<(), SchemaUpdateError> {
    if current.name() == new.name() {
        Ok(())
    } else {
        Err(SchemaUpdateError::Mismatch {
            current_name: current.name().to_string(),
            new_name: new.name().to_string(),
        })
    }
}

fn failed(
    current: &TableDefinition,
    new: &TableDefinition,
    source: SchemaModificationError,
) -> SchemaUpdateError {
    SchemaUpdateError::Failed {
        current: Box::new(current.clone()),
        new: Box::new(new.clone()),
        message: source.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::definitions::{IndexKind, TypeKind};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        AddField(String, String),
        RemoveField(String, String),
        AddIndex(String, String),
        RemoveIndex(String, String),
    }

    /// Records every call; fails on the field named in `fail_on`.
    #[derive(Default)]
    struct RecordingModifier {
        calls: Mutex<Vec<Call>>,
        fail_on: Option<String>,
    }

    impl RecordingModifier {
        fn failing_on(field: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on: Some(field.to_string()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(
            &self,
            call: Call,
            table: &str,
            name: &str,
        ) -> Result<(), SchemaModificationError> {
            if self.fail_on.as_deref() == Some(name) {
                return Err(SchemaModificationError::FieldRemovalFailed {
                    table: table.to_string(),
                    field: name.to_string(),
                    source: "backend refused".into(),
                });
            }
            self.calls.lock().unwrap().push(call);
            Ok(())
        }
    }

    impl SchemaModifier for RecordingModifier {
        fn add_field<'a>(
            &'a self,
            table: &'a str,
            field: &'a FieldDefinition,
        ) -> BoxFuture<'a, Result<(), SchemaModificationError>> {
            Box::pin(async move {
                self.record(
                    Call::AddField(table.to_string(), field.name().to_string()),
                    table,
                    field.name(),
                )
            })
        }

        fn remove_field<'a>(
            &'a self,
            table: &'a str,
            field_name: &'a str,
        ) -> BoxFuture<'a, Result<(), SchemaModificationError>> {
            Box::pin(async move {
                self.record(
                    Call::RemoveField(table.to_string(), field_name.to_string()),
                    table,
                    field_name,
                )
            })
        }

        fn add_index<'a>(
            &'a self,
            table: &'a str,
            index: &'a IndexDefinition,
        ) -> BoxFuture<'a, Result<(), SchemaModificationError>> {
            Box::pin(async move {
                self.record(
                    Call::AddIndex(table.to_string(), index.name().to_string()),
                    table,
                    index.name(),
                )
            })
        }

        fn remove_index<'a>(
            &'a self,
            table: &'a str,
            index_name: &'a str,
        ) -> BoxFuture<'a, Result<(), SchemaModificationError>> {
            Box::pin(async move {
                self.record(
                    Call::RemoveIndex(table.to_string(), index_name.to_string()),
                    table,
                    index_name,
                )
            })
        }
    }

    fn table(name: &str, fields: &[&str]) -> TableDefinition {
        TableDefinition::with_fields(
            name,
            fields
                .iter()
                .map(|f| FieldDefinition::new(*f, TypeKind::Integer).unwrap()),
        )
        .unwrap()
    }

    fn remove(field: &str) -> Call {
        Call::RemoveField("t".to_string(), field.to_string())
    }

    fn add(field: &str) -> Call {
        Call::AddField("t".to_string(), field.to_string())
    }

    #[tokio::test]
    async fn test_same_table_issues_nothing() {
        let updater = SimpleTableSchemaUpdater::new(RecordingModifier::default());
        let t = table("t", &["a", "b", "c"]);

        updater.update_table(&t, &t).await.unwrap();

        assert!(updater.modifier().calls().is_empty());
    }

    #[tokio::test]
    async fn test_removes_then_adds_by_name() {
        let updater = SimpleTableSchemaUpdater::new(RecordingModifier::default());

        updater
            .update_table(&table("t", &["a", "b", "c"]), &table("t", &["b", "c", "d"]))
            .await
            .unwrap();

        assert_eq!(updater.modifier().calls(), vec![remove("a"), add("d")]);
    }

    #[tokio::test]
    async fn test_order_follows_each_side() {
        let updater = SimpleTableSchemaUpdater::new(RecordingModifier::default());

        updater
            .update_table(&table("t", &["z", "k", "a"]), &table("t", &["y", "k", "b"]))
            .await
            .unwrap();

        assert_eq!(
            updater.modifier().calls(),
            vec![remove("z"), remove("a"), add("y"), add("b")]
        );
    }

    #[tokio::test]
    async fn test_changed_field_with_same_name_is_untouched() {
        let updater = SimpleTableSchemaUpdater::new(RecordingModifier::default());
        let current = table("t", &["a"]);
        let new = TableDefinition::with_fields(
            "t",
            [FieldDefinition::new("a", TypeKind::Blob).unwrap().not_null()],
        )
        .unwrap();

        updater.update_table(&current, &new).await.unwrap();

        assert!(updater.modifier().calls().is_empty());
    }

    #[tokio::test]
    async fn test_name_mismatch() {
        let updater = SimpleTableSchemaUpdater::new(RecordingModifier::default());

        let result = updater
            .update_table(&table("t", &["a"]), &table("u", &["b"]))
            .await;

        assert!(matches!(
            result,
            Err(SchemaUpdateError::Mismatch { ref current_name, ref new_name })
                if current_name == "t" && new_name == "u"
        ));
        assert!(updater.modifier().calls().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_wrapped_and_stops_the_update() {
        let updater = SimpleTableSchemaUpdater::new(RecordingModifier::failing_on("b"));
        let current = table("t", &["a", "b", "c"]);
        let new = table("t", &["c", "d"]);

        let err = updater.update_table(&current, &new).await.unwrap_err();

        match err {
            SchemaUpdateError::Failed {
                current: got_current,
                new: got_new,
                message,
                source,
            } => {
                assert_eq!(*got_current, current);
                assert_eq!(*got_new, new);
                assert!(message.contains("backend refused"));
                assert!(matches!(
                    source,
                    SchemaModificationError::FieldRemovalFailed { ref field, .. } if field == "b"
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
        // "a" was removed before the failure and stays removed.
        assert_eq!(updater.modifier().calls(), vec![remove("a")]);
    }

    #[tokio::test]
    async fn test_update_table_leaves_indexes_alone() {
        let updater = SimpleTableSchemaUpdater::new(RecordingModifier::default());
        let current = table("t", &["a"]);
        let new = current
            .mutate_indexes([IndexDefinition::new("i", ["a"], IndexKind::Index).unwrap()])
            .unwrap();

        updater.update_table(&current, &new).await.unwrap();
        assert!(updater.modifier().calls().is_empty());

        updater.update_indexes(&current, &new).await.unwrap();
        assert_eq!(
            updater.modifier().calls(),
            vec![Call::AddIndex("t".to_string(), "i".to_string())]
        );
    }

    #[tokio::test]
    async fn test_update_indexes_by_name() {
        let updater = SimpleTableSchemaUpdater::new(RecordingModifier::default());
        let base = table("t", &["a", "b"]);
        let current = base
            .mutate_indexes([
                IndexDefinition::new("old", ["a"], IndexKind::Index).unwrap(),
                IndexDefinition::new("kept", ["b"], IndexKind::Unique).unwrap(),
            ])
            .unwrap();
        let new = base
            .mutate_indexes([
                IndexDefinition::new("kept", ["a", "b"], IndexKind::Unique).unwrap(),
                IndexDefinition::new("fresh", ["b"], IndexKind::Index).unwrap(),
            ])
            .unwrap();

        updater.update_indexes(&current, &new).await.unwrap();

        assert_eq!(
            updater.modifier().calls(),
            vec![
                Call::RemoveIndex("t".to_string(), "old".to_string()),
                Call::AddIndex("t".to_string(), "fresh".to_string()),
            ]
        );
    }
}
