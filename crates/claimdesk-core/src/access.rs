//! The access policy engine.
//!
//! Two questions are answered here, for every resource kind:
//!
//! - *Which rows may this caller list?* [`scope`] returns either
//!   [`Scope::Unrestricted`] or [`Scope::OwnedBy`], which storage turns into a
//!   filter on the owner column.
//! - *May this caller touch this particular row?* [`authorize_record`] is
//!   run after every fetch by id, even though the id was supplied directly.
//!
//! Both are pure functions of the caller's [`Identity`]; no storage access
//! happens here.

use strum::{AsRefStr, Display};
use uuid::Uuid;

use crate::{
  Error,
  identity::{Identity, Role},
};

// ─── Vocabulary ──────────────────────────────────────────────────────────────

/// The kinds of resource subject to ownership scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
  Claims,
  Policies,
  Users,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
  List,
  Read,
  Create,
  Update,
  Delete,
}

impl ResourceKind {
  /// Roles exempt from ownership scoping for this kind of resource.
  pub fn privileged_roles(self) -> &'static [Role] {
    match self {
      Self::Claims => &[Role::Admin, Role::Adjuster],
      Self::Policies => &[Role::Admin, Role::Adjuster, Role::Agent],
      Self::Users => &[Role::Admin],
    }
  }

  pub fn is_privileged(self, role: Role) -> bool {
    self.privileged_roles().contains(&role)
  }
}

// ─── Decisions ───────────────────────────────────────────────────────────────

/// A restriction applied to a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
  Unrestricted,
  /// Only rows whose owner is this subject.
  OwnedBy(Uuid),
}

impl Scope {
  /// The owner filter storage should apply, if any.
  pub fn owner_filter(self) -> Option<Uuid> {
    match self {
      Self::Unrestricted => None,
      Self::OwnedBy(id) => Some(id),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Allow,
  Deny,
}

impl Decision {
  pub fn is_allowed(self) -> bool { matches!(self, Self::Allow) }

  /// Turn a denial into [`Error::Forbidden`].
  pub fn into_result(self, kind: ResourceKind, action: Action) -> Result<(), Error> {
    match self {
      Self::Allow => Ok(()),
      Self::Deny => Err(Error::Forbidden(format!(
        "Not permitted to {action} these {kind}"
      ))),
    }
  }
}

/// Anything with a single owning subject.
pub trait Owned {
  fn owner_id(&self) -> Uuid;
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Compute the list scope for `identity` on `kind`.
pub fn scope(identity: &Identity, kind: ResourceKind, action: Action) -> Scope {
  let scope = if kind.is_privileged(identity.role) {
    Scope::Unrestricted
  } else {
    Scope::OwnedBy(identity.subject_id)
  };
  tracing::debug!(
    subject = %identity.subject_id,
    role = %identity.role,
    %kind,
    %action,
    ?scope,
    "resolved list scope"
  );
  scope
}

/// Decide whether `identity` may perform `action` on `record`.
pub fn authorize_record<R>(
  identity: &Identity,
  record: &R,
  kind: ResourceKind,
  action: Action,
) -> Decision
where
  R: Owned + ?Sized,
{
  if kind.is_privileged(identity.role) || record.owner_id() == identity.subject_id {
    return Decision::Allow;
  }
  tracing::warn!(
    subject = %identity.subject_id,
    role = %identity.role,
    owner = %record.owner_id(),
    %kind,
    %action,
    "record access denied"
  );
  Decision::Deny
}

/// Decide an action that ownership alone can never grant (e.g. role changes).
pub fn require_privileged(
  identity: &Identity,
  kind: ResourceKind,
  action: Action,
) -> Decision {
  if kind.is_privileged(identity.role) {
    Decision::Allow
  } else {
    tracing::warn!(
      subject = %identity.subject_id,
      role = %identity.role,
      %kind,
      %action,
      "privileged action denied"
    );
    Decision::Deny
  }
}
