use rentals_portal::PermissionMatrix;
use rentals_portal::rbac::{Operation, Resource, Role};
use std::str::FromStr;

const ROLES: [Role; 3] = [Role::Admin, Role::Realtor, Role::Client];

#[test]
fn empty_matrix_denies_everything() {
    let matrix = PermissionMatrix::new();

    for role in ROLES {
        for resource in Resource::all() {
            for op in Operation::all() {
                assert!(
                    !matrix.allowed(role, resource, op),
                    "empty matrix allowed {:?} {:?} {:?}",
                    role,
                    resource,
                    op
                );
            }
        }
    }
}

#[test]
fn ungranted_combinations_are_denied_by_default() {
    let matrix = PermissionMatrix::with_defaults();

    // Realtors and clients were never granted anything on users.
    for op in Operation::all() {
        assert!(!matrix.allowed(Role::Realtor, Resource::Users, op));
        assert!(!matrix.allowed(Role::Client, Resource::Users, op));
    }

    // Clients can only read apartments.
    assert!(!matrix.allowed(Role::Client, Resource::Apartments, Operation::Create));
    assert!(!matrix.allowed(Role::Client, Resource::Apartments, Operation::Update));
    assert!(!matrix.allowed(Role::Client, Resource::Apartments, Operation::Delete));
}

#[test]
fn default_grants_match_the_permission_table() {
    let matrix = PermissionMatrix::with_defaults();

    for resource in Resource::all() {
        for op in Operation::all() {
            assert!(matrix.allowed(Role::Admin, resource, op));
        }
    }
    for op in Operation::all() {
        assert!(matrix.allowed(Role::Realtor, Resource::Apartments, op));
    }
    assert!(matrix.allowed(Role::Client, Resource::Apartments, Operation::Read));
}

#[test]
fn grant_is_additive_per_role_and_resource() {
    let mut matrix = PermissionMatrix::new();
    matrix.grant(Role::Client, Resource::Users, &[Operation::Read]);
    matrix.grant(Role::Client, Resource::Users, &[Operation::Update]);

    assert!(matrix.allowed(Role::Client, Resource::Users, Operation::Read));
    assert!(matrix.allowed(Role::Client, Resource::Users, Operation::Update));
    assert!(!matrix.allowed(Role::Client, Resource::Users, Operation::Delete));
    // A grant on one resource leaks nowhere else.
    assert!(!matrix.allowed(Role::Client, Resource::Apartments, Operation::Read));
}

#[test]
fn role_parsing_rejects_unknown_values() {
    assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
    assert_eq!(Role::from_str("realtor").unwrap(), Role::Realtor);
    assert_eq!(Role::from_str("client").unwrap(), Role::Client);

    assert!(Role::from_str("superuser").is_err());
    assert!(Role::from_str("Admin").is_err());
    assert!(Role::from_str("").is_err());
}
