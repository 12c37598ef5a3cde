//! In-memory [`Database`] used by tests.

use std::{collections::HashMap, sync::Arc};

use common::operations::{By, Insert, Select};
use tokio::sync::RwLock;
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session},
        Policy, User,
    },
    infra::{database, Database},
    Config, Service,
};

/// Creates a new [`Service`] over an empty [`Memory`] store.
pub(crate) fn service() -> Service<Memory> {
    Service::new(
        Config {
            session_codec: session::Codec::new(
                b"memory-secret",
                session::Codec::DEFAULT_LIFETIME,
            ),
            access_policy: Policy::default(),
        },
        Memory::default(),
    )
}

/// In-memory [`User`] store.
#[derive(Clone, Debug, Default)]
pub(crate) struct Memory {
    /// Stored [`User`]s.
    users: Arc<RwLock<HashMap<user::Id, User>>>,
}

impl Memory {
    /// Returns the number of stored [`User`]s.
    pub(crate) async fn users_count(&self) -> usize {
        self.users.read().await.len()
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.users.read().await.get(&by.into_inner()).cloned())
    }
}

impl<'e> Database<Select<By<Option<User>, &'e user::Email>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'e user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.users.write().await.insert(user.id, user));
        Ok(())
    }
}
