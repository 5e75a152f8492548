use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Role
///
/// The closed set of roles a user can hold. Roles are stored as lowercase
/// strings in the database; `FromStr` is the only way to turn a stored string
/// into a `Role`, so an unknown role fails at construction time instead of
/// silently slipping through a permission lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Realtor,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Realtor => "realtor",
            Role::Client => "client",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "realtor" => Ok(Role::Realtor),
            "client" => Ok(Role::Client),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource
///
/// The protected nouns of the API. Each maps to a URL prefix; the classifier
/// in `gate.rs` infers the resource from the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Users,
    Apartments,
}

impl Resource {
    /// The URL prefix under which this resource is served.
    pub fn prefix(&self) -> &'static str {
        match self {
            Resource::Users => "/users",
            Resource::Apartments => "/apartments",
        }
    }

    pub fn all() -> [Resource; 2] {
        [Resource::Users, Resource::Apartments]
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Users => f.write_str("users"),
            Resource::Apartments => f.write_str("apartments"),
        }
    }
}

/// Operation
///
/// The four operations a request can perform on a resource, inferred from the
/// HTTP verb by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub fn all() -> [Operation; 4] {
        [
            Operation::Create,
            Operation::Read,
            Operation::Update,
            Operation::Delete,
        ]
    }
}

/// PermissionMatrix
///
/// Static mapping of (role, resource) to the set of operations that role may
/// perform. Built once at startup and shared read-only behind an `Arc`;
/// request handling never mutates it, so lookups need no locking.
///
/// The matrix is default-deny: any combination without an explicit grant is
/// rejected. There is no error path — an ungranted pair is simply "not
/// allowed".
#[derive(Debug, Default)]
pub struct PermissionMatrix {
    grants: HashMap<(Role, Resource), HashSet<Operation>>,
}

impl PermissionMatrix {
    /// An empty matrix that denies everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// The production permission table:
    /// - admin: full access to users and apartments
    /// - realtor: full access to apartments
    /// - client: read-only access to apartments
    pub fn with_defaults() -> Self {
        let mut matrix = Self::new();
        matrix.grant(Role::Admin, Resource::Users, &Operation::all());
        matrix.grant(Role::Admin, Resource::Apartments, &Operation::all());
        matrix.grant(Role::Realtor, Resource::Apartments, &Operation::all());
        matrix.grant(Role::Client, Resource::Apartments, &[Operation::Read]);
        matrix
    }

    /// Adds operations to the grant set for (role, resource).
    /// Only callable during construction; the matrix is immutable once shared.
    pub fn grant(&mut self, role: Role, resource: Resource, ops: &[Operation]) {
        self.grants
            .entry((role, resource))
            .or_default()
            .extend(ops.iter().copied());
    }

    /// Returns true only if the role was explicitly granted the operation on
    /// the resource.
    pub fn allowed(&self, role: Role, resource: Resource, op: Operation) -> bool {
        self.grants
            .get(&(role, resource))
            .map(|ops| ops.contains(&op))
            .unwrap_or(false)
    }
}
