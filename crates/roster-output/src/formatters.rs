use roster_types::{to_pretty_json, FieldKind, UserRecord};

const MENU_WIDTH: usize = 36;

pub const MENU_OPTIONS: [(&str, &str); 6] = [
    ("1", "Create User"),
    ("2", "View User"),
    ("3", "Update User"),
    ("4", "Delete User"),
    ("5", "Show All Users"),
    ("0", "Exit"),
];

pub fn format_menu() -> String {
    let mut lines = vec![
        String::new(),
        "═".repeat(MENU_WIDTH + 2),
        format!("║{:^width$}║", "USER MANAGEMENT MENU", width = MENU_WIDTH),
        format!("╠{}╣", "═".repeat(MENU_WIDTH)),
    ];
    for (key, label) in MENU_OPTIONS {
        let entry = format!("{}. {}", key, label);
        lines.push(format!("║ {:<width$}║", entry, width = MENU_WIDTH - 1));
    }
    lines.push(format!("╚{}╝", "═".repeat(MENU_WIDTH)));
    lines.join("\n")
}

pub fn format_user(user: &UserRecord, indent: usize) -> Result<String, serde_json::Error> {
    to_pretty_json(user, indent)
}

pub fn format_users(users: &[&UserRecord], indent: usize) -> Result<String, serde_json::Error> {
    if users.is_empty() {
        return Ok("No users found.".to_string());
    }
    let rendered = users
        .iter()
        .map(|u| format_user(u, indent))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rendered.join("\n"))
}

/// `Label: ` or `Label (current): `.
pub fn format_field_prompt(kind: FieldKind, current: Option<&str>) -> String {
    match current {
        Some(current) if !current.is_empty() => format!("{} ({}): ", kind.label(), current),
        _ => format!("{}: ", kind.label()),
    }
}

pub fn format_invalid_field(kind: FieldKind) -> String {
    format!("Invalid {}. Try again.", kind.label().to_lowercase())
}

pub fn format_not_found(username: &str) -> String {
    format!("User '{}' not found.", username)
}

pub fn format_already_exists(username: &str) -> String {
    format!("User '{}' already exists.", username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_layout() {
        let menu = format_menu();
        let lines: Vec<&str> = menu.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "");
        assert_eq!(lines[1].chars().count(), 38);
        assert_eq!(lines[2], "║        USER MANAGEMENT MENU        ║");
        assert_eq!(lines[3], format!("╠{}╣", "═".repeat(36)));
        assert_eq!(lines[4], "║ 1. Create User                     ║");
        assert_eq!(lines[8], "║ 5. Show All Users                  ║");
        assert_eq!(lines[9], "║ 0. Exit                            ║");
        for line in &lines[2..] {
            assert_eq!(line.chars().count(), 38, "{line:?}");
        }
    }

    #[test]
    fn test_field_prompts() {
        assert_eq!(format_field_prompt(FieldKind::Email, None), "Email: ");
        assert_eq!(
            format_field_prompt(FieldKind::Age, Some("30")),
            "Age (30): "
        );
        assert_eq!(format_field_prompt(FieldKind::Name, Some("")), "Name: ");
    }

    #[test]
    fn test_messages() {
        assert_eq!(format_invalid_field(FieldKind::Phone), "Invalid phone. Try again.");
        assert_eq!(format_not_found("bob"), "User 'bob' not found.");
        assert_eq!(format_already_exists("bob"), "User 'bob' already exists.");
    }

    #[test]
    fn test_format_users() {
        assert_eq!(format_users(&[], 4).unwrap(), "No users found.");

        let a = UserRecord::new("a", "A", "a@x.io", "+1234567", 1);
        let b = UserRecord::new("b", "B", "b@x.io", "+7654321", 2);
        let out = format_users(&[&a, &b], 2).unwrap();
        assert!(out.starts_with("{\n  \"age\": 1,"));
        assert!(out.contains("}\n{\n  \"age\": 2,"));
    }
}
