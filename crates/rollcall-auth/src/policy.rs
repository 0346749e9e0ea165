//! Authorization policy applied after token verification.
//!
//! | caller role | target == caller | decision  |
//! |-------------|------------------|-----------|
//! | admin       | any              | allow     |
//! | non-admin   | yes              | allow     |
//! | non-admin   | no               | Forbidden |

use rollcall_core::models::role::Role;
use rollcall_core::models::user::UpdateUser;

use crate::error::AuthError;
use crate::token::ValidatedClaims;

/// Decide whether `caller` may act on the user identified by `target_id`.
///
/// A blank caller identity or a missing target is [`AuthError::Malformed`]:
/// it means request wiring upstream is broken, not that the client erred.
pub fn authorize_owner_or_admin(
    caller: &ValidatedClaims,
    target_id: Option<&str>,
) -> Result<(), AuthError> {
    let caller_id = caller.user_id().trim();
    if caller_id.is_empty() {
        return Err(AuthError::Malformed("caller identity missing from token".into()));
    }
    let target_id = target_id.map(str::trim).filter(|t| !t.is_empty()).ok_or_else(|| {
        AuthError::Malformed("target identifier missing from request".into())
    })?;

    if caller.role() == Role::Admin {
        return Ok(());
    }
    if caller_id.eq_ignore_ascii_case(target_id) {
        return Ok(());
    }
    Err(AuthError::Forbidden(
        "not permitted to act on another user's account".into(),
    ))
}

/// Like [`authorize_owner_or_admin`], but also stops non-admins from
/// changing any account's role, their own included.
pub fn authorize_update(
    caller: &ValidatedClaims,
    target_id: Option<&str>,
    update: &UpdateUser,
) -> Result<(), AuthError> {
    authorize_owner_or_admin(caller, target_id)?;
    if update.role.is_some() && caller.role() != Role::Admin {
        return Err(AuthError::Forbidden("only admins may change roles".into()));
    }
    Ok(())
}

/// Require one of the staff roles (admin, secretary).
pub fn require_staff(caller: &ValidatedClaims) -> Result<(), AuthError> {
    if caller.role().is_staff() {
        Ok(())
    } else {
        Err(AuthError::Forbidden("staff role required".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::AccessTokenClaims;

    fn claims(sub: &str, role: Role) -> ValidatedClaims {
        ValidatedClaims(AccessTokenClaims {
            sub: sub.into(),
            email: "caller@example.com".into(),
            role,
            name: "Caller".into(),
            iss: "rollcall".into(),
            iat: 0,
            exp: 0,
            jti: "jti".into(),
        })
    }

    #[test]
    fn admin_may_act_on_anyone() {
        let caller = claims("a", Role::Admin);
        assert!(authorize_owner_or_admin(&caller, Some("b")).is_ok());
        assert!(authorize_owner_or_admin(&caller, Some("a")).is_ok());
    }

    #[test]
    fn non_admin_may_act_on_self_only() {
        for role in [Role::Student, Role::Secretary] {
            let caller = claims("self-id", role);
            assert!(authorize_owner_or_admin(&caller, Some("self-id")).is_ok());
            assert!(matches!(
                authorize_owner_or_admin(&caller, Some("other-id")),
                Err(AuthError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn missing_identity_or_target_is_malformed() {
        let caller = claims("", Role::Admin);
        assert!(matches!(
            authorize_owner_or_admin(&caller, Some("x")),
            Err(AuthError::Malformed(_))
        ));

        let caller = claims("a", Role::Student);
        assert!(matches!(
            authorize_owner_or_admin(&caller, None),
            Err(AuthError::Malformed(_))
        ));
        assert!(matches!(
            authorize_owner_or_admin(&caller, Some("  ")),
            Err(AuthError::Malformed(_))
        ));
    }

    #[test]
    fn students_cannot_promote_themselves() {
        let caller = claims("me", Role::Student);
        let update = UpdateUser {
            role: Some(Role::Admin),
            ..Default::default()
        };
        assert!(matches!(
            authorize_update(&caller, Some("me"), &update),
            Err(AuthError::Forbidden(_))
        ));

        let rename = UpdateUser {
            name: Some("New Name".into()),
            ..Default::default()
        };
        assert!(authorize_update(&caller, Some("me"), &rename).is_ok());
    }

    #[test]
    fn staff_requirement() {
        assert!(require_staff(&claims("a", Role::Admin)).is_ok());
        assert!(require_staff(&claims("a", Role::Secretary)).is_ok());
        assert!(require_staff(&claims("a", Role::Student)).is_err());
    }
}
