//! Explicit descriptors for the fields of each record.
//!
//! Each record type publishes a static table of `Field`s.  The table is
//! the single source of truth for a field's stable key, the version that
//! introduced it and its scope; the flat key-value codec and the keyed
//! update path consult it instead of inspecting the Rust structs.

use super::scope::Scope;
use super::version::SchemaVersion;

/// Metadata describing one field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// The name of the field in Rust code.  Purely informational.
    pub name: &'static str,
    /// The stable key under which the field is stored.
    pub key: &'static str,
    /// The version in which the field was introduced.
    pub version: SchemaVersion,
    /// Who may change the field after construction.
    pub scope: Scope,
    /// Must a stored record contain this key?
    pub required: bool,
}

impl Field {
    /// A required, read-only field introduced in `version`.
    pub const fn read_only(name: &'static str, key: &'static str, version: SchemaVersion) -> Field {
        Field {
            name,
            key,
            version,
            scope: Scope::ReadOnly,
            required: true,
        }
    }

    /// A required, read-write field introduced in `version`.
    pub const fn read_write(name: &'static str, key: &'static str, version: SchemaVersion) -> Field {
        Field {
            name,
            key,
            version,
            scope: Scope::ReadWrite,
            required: true,
        }
    }

    /// The same field, but allowed to be absent from stored records.
    pub const fn optional(self) -> Field {
        Field {
            required: false,
            ..self
        }
    }
}

/// Implemented by every record type with a descriptor table.
pub trait Schema {
    /// A human-readable name for the record, used in error messages.
    const RECORD: &'static str;

    /// The fields of this record, in their canonical order.
    fn fields() -> &'static [Field];

    /// Look up a field by its stable key.
    fn field_by_key(key: &str) -> Option<&'static Field> {
        Self::fields().iter().find(|f| f.key == key)
    }

    /// Look up a field by its Rust name.
    fn field_by_name(name: &str) -> Option<&'static Field> {
        Self::fields().iter().find(|f| f.name == name)
    }

    /// The fields a consumer that understands `version` can see.
    fn fields_visible_at(version: SchemaVersion) -> Vec<&'static Field> {
        Self::fields()
            .iter()
            .filter(|f| version.understands(f.version))
            .collect()
    }

    /// The stable keys of this record, in canonical order.
    fn keys() -> Vec<&'static str> {
        Self::fields().iter().map(|f| f.key).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Sample;

    const SAMPLE_FIELDS: &[Field] = &[
        Field::read_only("label", "lbl", SchemaVersion::V0_1),
        Field::read_write("current", "cur", SchemaVersion::new(0, 2)).optional(),
    ];

    impl Schema for Sample {
        const RECORD: &'static str = "sample";

        fn fields() -> &'static [Field] {
            SAMPLE_FIELDS
        }
    }

    #[test]
    fn fields_can_be_found_by_key_or_name() {
        assert_eq!(Sample::field_by_key("lbl").unwrap().name, "label");
        assert_eq!(Sample::field_by_name("current").unwrap().key, "cur");
        assert!(Sample::field_by_key("label").is_none());
        assert_eq!(Sample::keys(), vec!["lbl", "cur"]);
    }

    #[test]
    fn optional_keeps_everything_but_requiredness() {
        let field = Sample::field_by_key("cur").unwrap();
        assert!(!field.required);
        assert_eq!(field.scope, Scope::ReadWrite);
        assert_eq!(field.version, SchemaVersion::new(0, 2));
    }

    #[test]
    fn older_consumers_do_not_see_newer_fields() {
        let old = Sample::fields_visible_at(SchemaVersion::V0_1);
        assert_eq!(old.len(), 1);
        assert_eq!(old[0].key, "lbl");
        assert_eq!(Sample::fields_visible_at(SchemaVersion::new(0, 2)).len(), 2);
    }
}
