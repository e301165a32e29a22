//! external-dns plan changes

use serde::{Deserialize, Serialize};

use super::endpoint::{Endpoint, null_as_default};

/// Desired changes computed by external-dns (`POST /records` body).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Changes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub create: Vec<Endpoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub update_old: Vec<Endpoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub update_new: Vec<Endpoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub delete: Vec<Endpoint>,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty()
            && self.update_old.is_empty()
            && self.update_new.is_empty()
            && self.delete.is_empty()
    }

    /// Recreate strategy: `UpdateNew` joins the creates, `UpdateOld` joins the deletes.
    pub fn into_creates_and_deletes(self) -> (Vec<Endpoint>, Vec<Endpoint>) {
        let mut creates = self.create;
        creates.extend(self.update_new);
        let mut deletes = self.delete;
        deletes.extend(self.update_old);
        (creates, deletes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_plan_with_nulls() {
        let json = r#"{
            "Create": [{"dnsName":"a.example.com","targets":["1.1.1.1"],"recordType":"A"}],
            "UpdateOld": null,
            "UpdateNew": null
        }"#;
        let changes: Changes = serde_json::from_str(json).unwrap();
        assert_eq!(changes.create.len(), 1);
        assert!(changes.update_old.is_empty());
        assert!(changes.delete.is_empty());
        assert!(!changes.is_empty());
    }

    #[test]
    fn updates_fold_into_creates_and_deletes() {
        let ep = |name: &str| Endpoint::new(name, "A", 0, vec!["1.1.1.1".into()]);
        let changes = Changes {
            create: vec![ep("c")],
            update_old: vec![ep("old")],
            update_new: vec![ep("new")],
            delete: vec![ep("d")],
        };
        let (creates, deletes) = changes.into_creates_and_deletes();
        let names = |v: &[Endpoint]| v.iter().map(|e| e.dns_name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&creates), vec!["c", "new"]);
        assert_eq!(names(&deletes), vec!["d", "old"]);
    }
}
