//! Channel-agnostic command execution.

use std::time::Instant;

use modulock_core::{Channel, Result};
use modulock_protocol::{Command, Reply};
use modulock_storage::CredentialStore;

use crate::actuator::ActuatorScheduler;

/// Applies administrative commands to the controller state.
///
/// Borrowed for the duration of one command; the control loop is the only
/// place that builds one, which keeps roster and actuator mutations serial.
pub struct CommandDispatcher<'a> {
    store: &'a mut CredentialStore,
    actuators: &'a mut ActuatorScheduler,
}

impl<'a> CommandDispatcher<'a> {
    pub fn new(store: &'a mut CredentialStore, actuators: &'a mut ActuatorScheduler) -> Self {
        Self { store, actuators }
    }

    /// Execute `command` at time `now`.
    ///
    /// # Errors
    ///
    /// Roster errors from [`CredentialStore::add`] and
    /// [`CredentialStore::remove`] are returned unchanged so every channel
    /// reports the same reason.
    pub fn dispatch(&mut self, command: Command, now: Instant) -> Result<Reply> {
        match command {
            Command::OpenDoor => {
                self.actuators.trigger(Channel::Lock, now);
                self.actuators.trigger(Channel::OkIndicator, now);
                Ok(Reply::DoorOpened)
            }
            Command::AddUser { ra, name, uid } => {
                let credential = self.store.add(&ra, &name, &uid)?;
                Ok(Reply::UserAdded(credential))
            }
            Command::RemoveUser { ra } => {
                let removed = self.store.remove(&ra)?;
                Ok(Reply::UserRemoved(removed.ra))
            }
            Command::GetUsers => Ok(Reply::Roster(self.store.snapshot())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modulock_core::{CredentialKey, Error};
    use modulock_protocol::{CommandParser, render_text};
    use modulock_storage::MemoryBackend;

    fn fixture() -> (CredentialStore, ActuatorScheduler) {
        (
            CredentialStore::new(MemoryBackend::new()),
            ActuatorScheduler::default(),
        )
    }

    fn add(ra: &str, name: &str, uid: &str) -> Command {
        Command::AddUser {
            ra: ra.to_string(),
            name: name.to_string(),
            uid: uid.to_string(),
        }
    }

    #[test]
    fn test_open_door_pulses_lock_and_ok() {
        let (mut store, mut actuators) = fixture();
        let now = Instant::now();
        let reply = CommandDispatcher::new(&mut store, &mut actuators)
            .dispatch(Command::OpenDoor, now)
            .unwrap();

        assert_eq!(reply, Reply::DoorOpened);
        assert!(actuators.is_active(Channel::Lock));
        assert!(actuators.is_active(Channel::OkIndicator));
        assert!(!actuators.is_active(Channel::AlertIndicator));
    }

    #[test]
    fn test_roster_scenario() {
        let (mut store, mut actuators) = fixture();
        let now = Instant::now();
        let mut dispatcher = CommandDispatcher::new(&mut store, &mut actuators);

        assert!(matches!(
            dispatcher.dispatch(add("R1", "Alice", "AB12CD34"), now),
            Ok(Reply::UserAdded(_))
        ));
        assert!(matches!(
            dispatcher.dispatch(add("R1", "Bob", "FF00FF00"), now),
            Err(Error::Conflict { key: CredentialKey::Ra, .. })
        ));
        assert!(matches!(
            dispatcher.dispatch(add("R2", "Carol", "AB12CD34"), now),
            Err(Error::Conflict { key: CredentialKey::Uid, .. })
        ));

        let remove = Command::RemoveUser { ra: "R1".to_string() };
        assert!(matches!(
            dispatcher.dispatch(remove.clone(), now),
            Ok(Reply::UserRemoved(_))
        ));
        assert!(matches!(
            dispatcher.dispatch(remove, now),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_text_add_with_empty_ra_is_validation_error() {
        let (mut store, mut actuators) = fixture();
        let command = CommandParser::parse("ADD USER ,Name,UID").unwrap();
        let result = CommandDispatcher::new(&mut store, &mut actuators)
            .dispatch(command, Instant::now());

        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(render_text(&result).starts_with("ERR: Validation error"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_users_snapshot() {
        let (mut store, mut actuators) = fixture();
        let now = Instant::now();
        let mut dispatcher = CommandDispatcher::new(&mut store, &mut actuators);
        dispatcher.dispatch(add("R1", "Alice", "ab12cd34"), now).unwrap();
        dispatcher.dispatch(add("R2", "Bob", "0A0B0C0D"), now).unwrap();

        let Ok(Reply::Roster(roster)) = dispatcher.dispatch(Command::GetUsers, now) else {
            panic!("expected roster reply");
        };
        let ras: Vec<&str> = roster.users.iter().map(|c| c.ra.as_str()).collect();
        assert_eq!(ras, vec!["R1", "R2"]);
        assert_eq!(roster.users[0].uid.as_str(), "AB12CD34");
    }
}
