use std::io::{BufRead, Write};

use anyhow::Result;
use roster_output::*;
use roster_store::{RecordStore, StoreError};
use roster_types::{parse_age, FieldKind, UserPatch, UserRecord};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Create,
    View,
    Update,
    Delete,
    List,
    Exit,
}

impl Command {
    fn parse(choice: &str) -> Option<Self> {
        match choice {
            "1" => Some(Command::Create),
            "2" => Some(Command::View),
            "3" => Some(Command::Update),
            "4" => Some(Command::Delete),
            "5" => Some(Command::List),
            "0" => Some(Command::Exit),
            _ => None,
        }
    }
}

enum Flow {
    Continue,
    Done,
}

/// Blocking menu loop over a record store. Input closing at any prompt ends
/// the session without applying a half-entered change.
pub struct Session<R, W> {
    store: RecordStore,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(store: RecordStore, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
        }
    }

    pub fn run(mut self) -> Result<RecordStore> {
        loop {
            writeln!(self.output, "{}", format_menu())?;
            let Some(choice) = self.ask("Choose an option: ")? else {
                self.closed()?;
                break;
            };

            let flow = match Command::parse(&choice) {
                Some(command) => {
                    debug!("Dispatching {:?}", command);
                    self.dispatch(command)?
                }
                None => {
                    writeln!(self.output, "Invalid option. Try again.")?;
                    Flow::Continue
                }
            };
            if let Flow::Done = flow {
                break;
            }
        }
        self.output.flush()?;
        Ok(self.store)
    }

    fn dispatch(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Create => self.create_user(),
            Command::View => self.view_user(),
            Command::Update => self.update_user(),
            Command::Delete => self.delete_user(),
            Command::List => self.list_users(),
            Command::Exit => {
                self.farewell()?;
                Ok(Flow::Done)
            }
        }
    }

    fn create_user(&mut self) -> Result<Flow> {
        let Some(username) = self.prompt_field(FieldKind::Username, None)? else {
            return self.closed();
        };
        if self.store.contains(&username) {
            writeln!(self.output, "{}", format_already_exists(&username))?;
            return Ok(Flow::Continue);
        }

        let Some(name) = self.prompt_field(FieldKind::Name, None)? else {
            return self.closed();
        };
        let Some(email) = self.prompt_field(FieldKind::Email, None)? else {
            return self.closed();
        };
        let Some(phone) = self.prompt_field(FieldKind::Phone, None)? else {
            return self.closed();
        };
        let Some(age) = self.prompt_field(FieldKind::Age, None)? else {
            return self.closed();
        };
        // A zero here can only come from a validator miss and is rejected by the store.
        let age = parse_age(&age).unwrap_or_default();

        let record = UserRecord::new(username, name, email, phone, age);
        match self.store.create(record) {
            Ok(()) => writeln!(self.output, "User created successfully.")?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    fn view_user(&mut self) -> Result<Flow> {
        let Some(username) = self.ask("Enter username to view: ")? else {
            return self.closed();
        };
        let indent = self.store.indent();
        match self.store.get(&username).map(|user| format_user(user, indent)) {
            Ok(rendered) => writeln!(self.output, "{}", rendered?)?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    fn update_user(&mut self) -> Result<Flow> {
        let Some(username) = self.ask("Enter username to update: ")? else {
            return self.closed();
        };
        let current = match self.store.get(&username).cloned() {
            Ok(user) => user,
            Err(e) => {
                self.report(e)?;
                return Ok(Flow::Continue);
            }
        };

        let mut patch = UserPatch::default();
        for kind in [FieldKind::Name, FieldKind::Email, FieldKind::Phone, FieldKind::Age] {
            let Some(value) = self.prompt_field(kind, Some(&current.field(kind)))? else {
                return self.closed();
            };
            if value.is_empty() {
                continue;
            }
            match kind {
                FieldKind::Name => patch.name = Some(value),
                FieldKind::Email => patch.email = Some(value),
                FieldKind::Phone => patch.phone = Some(value),
                FieldKind::Age => patch.age = parse_age(&value),
                FieldKind::Username => {}
            }
        }

        match self.store.update(&username, &patch).map(|_| ()) {
            Ok(()) => writeln!(self.output, "User updated successfully.")?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    fn delete_user(&mut self) -> Result<Flow> {
        let Some(username) = self.ask("Enter username to delete: ")? else {
            return self.closed();
        };
        match self.store.delete(&username) {
            Ok(_) => writeln!(self.output, "User deleted.")?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    fn list_users(&mut self) -> Result<Flow> {
        let rendered = format_users(&self.store.list(), self.store.indent())?;
        writeln!(self.output, "{}", rendered)?;
        Ok(Flow::Continue)
    }

    /// Re-prompts until the input passes the field's validator. Blank input
    /// is returned empty to mean "keep" only when the current value is itself
    /// valid. `None` means the input closed.
    fn prompt_field(&mut self, kind: FieldKind, current: Option<&str>) -> Result<Option<String>> {
        let prompt = format_field_prompt(kind, current);
        loop {
            let Some(value) = self.ask(&prompt)? else {
                return Ok(None);
            };
            if value.is_empty() && current.is_some_and(|c| kind.is_valid(c)) {
                return Ok(Some(value));
            }
            if kind.is_valid(&value) {
                return Ok(Some(value));
            }
            writeln!(self.output, "{}", format_invalid_field(kind))?;
        }
    }

    /// Writes `prompt` and reads one trimmed line.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn report(&mut self, error: StoreError) -> Result<()> {
        let message = match &error {
            StoreError::NotFound(username) => format_not_found(username),
            StoreError::DuplicateUsername(username) => format_already_exists(username),
            StoreError::Invalid(kind) => format_invalid_field(*kind),
            other => format!("Error: {}", other),
        };
        writeln!(self.output, "{}", message)?;
        Ok(())
    }

    fn closed(&mut self) -> Result<Flow> {
        writeln!(self.output)?;
        self.farewell()?;
        Ok(Flow::Done)
    }

    fn farewell(&mut self) -> Result<()> {
        writeln!(self.output, "Goodbye.")?;
        Ok(())
    }
}
