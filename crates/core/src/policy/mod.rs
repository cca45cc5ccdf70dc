//! Tenant-scoped authorization policy.
//!
//! All role and ownership decisions live in this one module so the rules can
//! be tested without a handler or a database in sight. Handlers resolve a
//! [`TenantContext`] once at the request edge and pass it down; nothing below
//! the edge re-derives who the caller is.

use thiserror::Error;
use uuid::Uuid;

/// A member's role within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Organization owner. Exactly one per organization; immutable.
    Owner,
    /// Administrator: full document and member management.
    Admin,
    /// Regular member: may only edit rows they created.
    Member,
}

impl Role {
    /// Parses a role from its wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(Self::Owner),
            "admin" => Some(Self::Admin),
            "member" => Some(Self::Member),
            _ => None,
        }
    }

    /// Returns the wire representation of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Whether this role can change organization settings.
    #[must_use]
    pub const fn can_manage_org(self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Whether this role can invite, update, or remove members.
    #[must_use]
    pub const fn can_manage_members(self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }
}

/// The resolved caller: user, organization, and role.
///
/// Built once per request from the session identity and the caller's single
/// organization membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    /// Authenticated user ID.
    pub user_id: Uuid,
    /// The organization the user belongs to.
    pub organization_id: Uuid,
    /// The user's role in that organization.
    pub role: Role,
}

impl TenantContext {
    /// Whether the caller may edit, delete, restore, or email a row created
    /// by `created_by`. Owners and admins always may; members only their own.
    #[must_use]
    pub fn can_edit(&self, created_by: Uuid) -> bool {
        self.role.can_manage_org() || created_by == self.user_id
    }
}

/// An action a caller wants to perform, for [`authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Mutate a tenant-owned row created by the given user.
    EditOwned {
        /// The user that created the target row.
        created_by: Uuid,
    },
    /// Change organization settings.
    ManageOrganization,
    /// Invite, update, or remove members.
    ManageMembers,
}

/// A requested change to an organization member, for [`check_member_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberChange {
    /// Assign the member a new role.
    ChangeRole(Role),
    /// Remove the member from the organization.
    Remove,
}

/// A policy denial with a human-readable reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PolicyViolation(pub &'static str);

/// Central allow/deny decision for an action in a tenant context.
///
/// # Errors
///
/// Returns a [`PolicyViolation`] naming the rule that denied the action.
pub fn authorize(ctx: &TenantContext, action: Action) -> Result<(), PolicyViolation> {
    match action {
        Action::EditOwned { created_by } => {
            if ctx.can_edit(created_by) {
                Ok(())
            } else {
                Err(PolicyViolation(
                    "members may only modify documents they created",
                ))
            }
        }
        Action::ManageOrganization => {
            if ctx.role.can_manage_org() {
                Ok(())
            } else {
                Err(PolicyViolation(
                    "changing organization settings requires the admin or owner role",
                ))
            }
        }
        Action::ManageMembers => {
            if ctx.role.can_manage_members() {
                Ok(())
            } else {
                Err(PolicyViolation(
                    "managing members requires the admin or owner role",
                ))
            }
        }
    }
}

/// Checks whether `actor` may apply `change` to the member
/// `(target_user, target_role)`.
///
/// Rules:
/// - only owners and admins manage members;
/// - the owner role is immutable: the owner is never modified or removed,
///   and nobody is promoted to owner;
/// - an admin cannot touch another admin (only the owner can);
/// - an actor never removes themself.
///
/// # Errors
///
/// Returns a [`PolicyViolation`] naming the rule that denied the change.
pub fn check_member_change(
    actor: &TenantContext,
    target_user: Uuid,
    target_role: Role,
    change: MemberChange,
) -> Result<(), PolicyViolation> {
    authorize(actor, Action::ManageMembers)?;

    if change == MemberChange::Remove && target_user == actor.user_id {
        return Err(PolicyViolation("you cannot remove yourself"));
    }

    if target_role == Role::Owner {
        return Err(PolicyViolation("the owner cannot be modified or removed"));
    }

    if let MemberChange::ChangeRole(new_role) = change {
        if new_role == Role::Owner {
            return Err(PolicyViolation("ownership cannot be transferred"));
        }
    }

    if target_role == Role::Admin && actor.role != Role::Owner {
        return Err(PolicyViolation(
            "only the owner can modify or remove an admin",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ctx(role: Role) -> TenantContext {
        TenantContext {
            user_id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn test_role_parse_round_trip() {
        for role in [Role::Owner, Role::Admin, Role::Member] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("viewer"), None);
        assert_eq!(Role::parse("Owner"), None);
    }

    #[rstest]
    #[case(Role::Owner, true)]
    #[case(Role::Admin, true)]
    #[case(Role::Member, false)]
    fn test_can_edit_foreign_row(#[case] role: Role, #[case] expected: bool) {
        let ctx = ctx(role);
        let someone_else = Uuid::new_v4();
        assert_eq!(ctx.can_edit(someone_else), expected);
    }

    #[test]
    fn test_member_can_edit_own_row() {
        let ctx = ctx(Role::Member);
        assert!(ctx.can_edit(ctx.user_id));
    }

    #[test]
    fn test_authorize_edit_owned() {
        let member = ctx(Role::Member);
        assert!(authorize(&member, Action::EditOwned { created_by: member.user_id }).is_ok());
        assert!(
            authorize(
                &member,
                Action::EditOwned {
                    created_by: Uuid::new_v4()
                }
            )
            .is_err()
        );

        let admin = ctx(Role::Admin);
        assert!(
            authorize(
                &admin,
                Action::EditOwned {
                    created_by: Uuid::new_v4()
                }
            )
            .is_ok()
        );
    }

    #[rstest]
    #[case(Role::Owner, true)]
    #[case(Role::Admin, true)]
    #[case(Role::Member, false)]
    fn test_authorize_manage_organization(#[case] role: Role, #[case] allowed: bool) {
        assert_eq!(
            authorize(&ctx(role), Action::ManageOrganization).is_ok(),
            allowed
        );
    }

    #[test]
    fn test_member_cannot_manage_members() {
        let actor = ctx(Role::Member);
        let result = check_member_change(
            &actor,
            Uuid::new_v4(),
            Role::Member,
            MemberChange::Remove,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_owner_is_immutable() {
        let actor = ctx(Role::Owner);
        let target = Uuid::new_v4();

        assert!(check_member_change(&actor, target, Role::Owner, MemberChange::Remove).is_err());
        assert!(
            check_member_change(
                &actor,
                target,
                Role::Owner,
                MemberChange::ChangeRole(Role::Member)
            )
            .is_err()
        );
    }

    #[test]
    fn test_no_promotion_to_owner() {
        let actor = ctx(Role::Owner);
        let result = check_member_change(
            &actor,
            Uuid::new_v4(),
            Role::Member,
            MemberChange::ChangeRole(Role::Owner),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_admin_cannot_touch_admin() {
        let actor = ctx(Role::Admin);
        let target = Uuid::new_v4();

        assert!(check_member_change(&actor, target, Role::Admin, MemberChange::Remove).is_err());
        assert!(
            check_member_change(
                &actor,
                target,
                Role::Admin,
                MemberChange::ChangeRole(Role::Member)
            )
            .is_err()
        );
    }

    #[test]
    fn test_owner_can_demote_admin() {
        let actor = ctx(Role::Owner);
        let result = check_member_change(
            &actor,
            Uuid::new_v4(),
            Role::Admin,
            MemberChange::ChangeRole(Role::Member),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_admin_can_manage_regular_member() {
        let actor = ctx(Role::Admin);
        let target = Uuid::new_v4();

        assert!(check_member_change(&actor, target, Role::Member, MemberChange::Remove).is_ok());
        assert!(
            check_member_change(
                &actor,
                target,
                Role::Member,
                MemberChange::ChangeRole(Role::Admin)
            )
            .is_ok()
        );
    }

    #[test]
    fn test_cannot_remove_self() {
        let actor = ctx(Role::Owner);
        let result =
            check_member_change(&actor, actor.user_id, Role::Admin, MemberChange::Remove);
        assert!(result.is_err());

        // Changing your own role is caught by the owner/admin rules instead;
        // self-removal is the one explicitly self-referential case.
        let admin = ctx(Role::Admin);
        let result = check_member_change(&admin, admin.user_id, Role::Admin, MemberChange::Remove);
        assert!(result.is_err());
    }
}
