//! The user aggregate.

use crate::domain::foundation::{Aggregate, EventBuffer, EventEnvelope, EventId, Timestamp, UserId};

use super::{Email, FirstName, LastName, Role, UserRegistered};

/// A registered user and the roles granted to them.
///
/// The `version` field backs optimistic concurrency: updates assert the
/// persisted version still matches before writing.
#[derive(Debug, Clone)]
pub struct User {
    id: UserId,
    first_name: FirstName,
    last_name: LastName,
    email: Email,
    identity_id: String,
    roles: Vec<Role>,
    version: i32,
    events: EventBuffer,
}

impl User {
    /// Registers a new user with an initial role.
    ///
    /// Raises [`UserRegistered`]; the event stays buffered until the unit of
    /// work persists it together with the user row.
    pub fn register(first_name: FirstName, last_name: LastName, email: Email, role: Role) -> Self {
        let id = UserId::new();
        let mut user = Self {
            id,
            first_name,
            last_name,
            email,
            identity_id: String::new(),
            roles: vec![role],
            version: 0,
            events: EventBuffer::new(),
        };

        user.events.raise(&UserRegistered {
            event_id: EventId::new(),
            user_id: id,
            occurred_at: Timestamp::now(),
        });

        user
    }

    /// Rehydrates a user from storage. Raises no events.
    pub fn from_storage(
        id: UserId,
        first_name: FirstName,
        last_name: LastName,
        email: Email,
        identity_id: String,
        roles: Vec<Role>,
        version: i32,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            email,
            identity_id,
            roles,
            version,
            events: EventBuffer::new(),
        }
    }

    /// Links this user to the account created at the external identity provider.
    pub fn set_identity_id(&mut self, identity_id: impl Into<String>) {
        self.identity_id = identity_id.into();
    }

    /// Replaces the user's name fields.
    pub fn rename(&mut self, first_name: FirstName, last_name: LastName) {
        self.first_name = first_name;
        self.last_name = last_name;
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn first_name(&self) -> &FirstName {
        &self.first_name
    }

    pub fn last_name(&self) -> &LastName {
        &self.last_name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn identity_id(&self) -> &str {
        &self.identity_id
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn version(&self) -> i32 {
        self.version
    }
}

impl Aggregate for User {
    fn pull_domain_events(&mut self) -> Vec<EventEnvelope> {
        self.events.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserRegistered;

    fn registered_user() -> User {
        User::register(
            FirstName::new("Ada").unwrap(),
            LastName::new("Lovelace").unwrap(),
            Email::new("ada@example.com").unwrap(),
            Role::registered(),
        )
    }

    #[test]
    fn register_buffers_exactly_one_event() {
        let mut user = registered_user();

        let events = user.pull_domain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, UserRegistered::EVENT_TYPE);
        assert_eq!(events[0].aggregate_id, user.id().to_string());

        let concrete: UserRegistered = events[0].payload_as().unwrap();
        assert_eq!(concrete.user_id, user.id());
    }

    #[test]
    fn pulling_twice_yields_nothing_new() {
        let mut user = registered_user();
        assert_eq!(user.pull_domain_events().len(), 1);
        assert!(user.pull_domain_events().is_empty());
    }

    #[test]
    fn register_assigns_initial_role() {
        let user = registered_user();
        assert_eq!(user.roles(), &[Role::registered()]);
        assert_eq!(user.version(), 0);
    }

    #[test]
    fn rehydration_raises_no_events() {
        let mut user = User::from_storage(
            UserId::new(),
            FirstName::new("Ada").unwrap(),
            LastName::new("Lovelace").unwrap(),
            Email::new("ada@example.com").unwrap(),
            "identity-1".to_string(),
            vec![Role::registered()],
            3,
        );

        assert!(user.pull_domain_events().is_empty());
        assert_eq!(user.version(), 3);
    }
}
