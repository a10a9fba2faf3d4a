use serde::{Deserialize, Serialize};

use crate::field::FieldKind;

/// A single user entry. Fields are declared in key order so that derived
/// serialization writes them sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub age: u32,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub username: String,
}

impl UserRecord {
    pub fn new(
        username: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        age: u32,
    ) -> Self {
        Self {
            age,
            email: email.into(),
            name: name.into(),
            phone: phone.into(),
            username: username.into(),
        }
    }

    /// Returns the first field that fails its validator.
    pub fn validate(&self) -> Result<(), FieldKind> {
        match FieldKind::ALL
            .into_iter()
            .find(|kind| !kind.is_valid(&self.field(*kind)))
        {
            Some(kind) => Err(kind),
            None => Ok(()),
        }
    }

    /// Current value of a field rendered as prompt text.
    pub fn field(&self, kind: FieldKind) -> String {
        match kind {
            FieldKind::Username => self.username.clone(),
            FieldKind::Name => self.name.clone(),
            FieldKind::Email => self.email.clone(),
            FieldKind::Phone => self.phone.clone(),
            FieldKind::Age => self.age.to_string(),
        }
    }

    /// Copy of this record with every field set in `patch` replaced.
    pub fn patched(&self, patch: &UserPatch) -> Self {
        Self {
            age: patch.age.unwrap_or(self.age),
            email: patch.email.clone().unwrap_or_else(|| self.email.clone()),
            name: patch.name.clone().unwrap_or_else(|| self.name.clone()),
            phone: patch.phone.clone().unwrap_or_else(|| self.phone.clone()),
            username: self.username.clone(),
        }
    }
}

/// Partial update. `None` keeps the stored value; the username cannot change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub age: Option<u32>,
}

/// Pretty-prints any serializable value with `indent` spaces per level.
pub fn to_pretty_json<T: Serialize + ?Sized>(
    value: &T,
    indent: usize,
) -> Result<String, serde_json::Error> {
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> UserRecord {
        UserRecord::new("alice", "Alice A", "alice@example.com", "+12345678", 30)
    }

    #[test]
    fn test_valid_record() {
        assert_eq!(alice().validate(), Ok(()));
    }

    #[test]
    fn test_validate_reports_first_bad_field() {
        let mut user = alice();
        user.email = "nope".to_string();
        user.phone = "123".to_string();
        assert_eq!(user.validate(), Err(FieldKind::Email));

        let mut user = alice();
        user.age = 0;
        assert_eq!(user.validate(), Err(FieldKind::Age));

        let mut user = alice();
        user.age = 124;
        assert_eq!(user.validate(), Err(FieldKind::Age));

        let mut user = alice();
        user.username = " ".to_string();
        assert_eq!(user.validate(), Err(FieldKind::Username));
    }

    #[test]
    fn test_validate_agrees_with_field_table() {
        for age in [0, 1, 123, 124, 500] {
            let mut user = alice();
            user.age = age;
            assert_eq!(
                user.validate().is_ok(),
                FieldKind::Age.is_valid(&age.to_string()),
                "age {age}"
            );
        }
        for email in ["legacy", "a@b.c", "a b@c.d"] {
            let mut user = alice();
            user.email = email.to_string();
            assert_eq!(
                user.validate().is_ok(),
                FieldKind::Email.is_valid(email),
                "email {email}"
            );
        }
    }

    #[test]
    fn test_patch_retains_unset_fields() {
        let patch = UserPatch {
            email: Some("a@b.io".to_string()),
            age: Some(31),
            ..Default::default()
        };
        let updated = alice().patched(&patch);
        assert_eq!(updated.username, "alice");
        assert_eq!(updated.name, "Alice A");
        assert_eq!(updated.email, "a@b.io");
        assert_eq!(updated.phone, "+12345678");
        assert_eq!(updated.age, 31);

        assert_eq!(alice().patched(&UserPatch::default()), alice());
    }

    #[test]
    fn test_pretty_json_sorted_and_indented() {
        let json = to_pretty_json(&alice(), 4).unwrap();
        let expected = r#"{
    "age": 30,
    "email": "alice@example.com",
    "name": "Alice A",
    "phone": "+12345678",
    "username": "alice"
}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_field_rendering() {
        assert_eq!(alice().field(FieldKind::Age), "30");
        assert_eq!(alice().field(FieldKind::Phone), "+12345678");
    }
}
