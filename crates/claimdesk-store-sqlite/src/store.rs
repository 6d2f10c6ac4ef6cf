//! [`SqliteStore`], the SQLite implementation of [`InsuranceStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use claimdesk_core::{
  claim::{Claim, ClaimPatch},
  date,
  identity::Role,
  page::PageRequest,
  policy::{Policy, PolicyPatch},
  store::{ClaimQuery, InsuranceStore, Listing, PolicyQuery, UserQuery},
  user::{Credential, NewUser, User, UserPatch},
};

use crate::{
  Error, Result,
  encode::{
    CLAIM_COLUMNS, POLICY_COLUMNS, RawClaim, RawPolicy, RawUser, USER_COLUMNS, encode_dt,
    encode_uuid,
  },
  schema::SCHEMA,
};

/// Column filters or assignments, bound positionally.
type Columns = Vec<(&'static str, Value)>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A claimdesk store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn user_where(&self, column: &'static str, value: String) -> Result<Option<RawUser>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_one(conn, "users", USER_COLUMNS, column, value, RawUser::from_row)?))
      .await?;
    Ok(raw)
  }

  async fn count_where(&self, table: &'static str, column: &'static str, id: Uuid) -> Result<u64> {
    let key = encode_uuid(id);
    let n: i64 = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1");
        Ok(conn.query_row(&sql, [key], |r| r.get(0))?)
      })
      .await?;
    Ok(u64::try_from(n).unwrap_or_default())
  }
}

// ─── SQL helpers ─────────────────────────────────────────────────────────────

fn where_clause(filters: &Columns) -> String {
  if filters.is_empty() {
    return String::new();
  }
  let conds: Vec<String> = filters.iter().map(|(c, _)| format!("{c} = ?")).collect();
  format!(" WHERE {}", conds.join(" AND "))
}

/// Fetch the row of `table` whose `key_column` equals `key`.
fn select_one<T>(
  conn: &rusqlite::Connection,
  table: &str,
  columns: &str,
  key_column: &str,
  key: String,
  read: impl FnOnce(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Option<T>> {
  let sql = format!("SELECT {columns} FROM {table} WHERE {key_column} = ?1");
  conn.query_row(&sql, [key], read).optional()
}

/// One page of `table` matching every filter, newest first, plus the size of
/// the whole filtered set.
fn select_page<T>(
  conn: &rusqlite::Connection,
  table: &str,
  columns: &str,
  filters: Columns,
  page: PageRequest,
  read: impl Fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<(Vec<T>, u64)> {
  let where_sql = where_clause(&filters);
  let mut params: Vec<Value> = filters.into_iter().map(|(_, v)| v).collect();

  let total: i64 = conn.query_row(
    &format!("SELECT COUNT(*) FROM {table}{where_sql}"),
    rusqlite::params_from_iter(params.iter()),
    |r| r.get(0),
  )?;

  params.push(Value::Integer(i64::from(page.limit)));
  params.push(Value::Integer(i64::try_from(page.offset()).unwrap_or(i64::MAX)));

  let sql = format!(
    "SELECT {columns} FROM {table}{where_sql}
     ORDER BY created_at DESC, rowid DESC
     LIMIT ? OFFSET ?"
  );
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(rusqlite::params_from_iter(params.iter()), |row| read(row))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok((rows, u64::try_from(total).unwrap_or_default()))
}

/// Assign `sets` on the row whose `key_column` equals `key`. A no-op when
/// `sets` is empty.
fn update_columns(
  conn: &rusqlite::Connection,
  table: &str,
  key_column: &str,
  key: &str,
  sets: Columns,
) -> rusqlite::Result<usize> {
  if sets.is_empty() {
    return Ok(0);
  }
  let assignments: Vec<String> = sets.iter().map(|(c, _)| format!("{c} = ?")).collect();
  let sql = format!("UPDATE {table} SET {} WHERE {key_column} = ?", assignments.join(", "));
  let mut params: Vec<Value> = sets.into_iter().map(|(_, v)| v).collect();
  params.push(Value::Text(key.to_owned()));
  conn.execute(&sql, rusqlite::params_from_iter(params))
}

fn text(s: impl Into<String>) -> Value { Value::Text(s.into()) }

fn uuid_value(id: Uuid) -> Value { Value::Text(encode_uuid(id)) }

fn decode_listing<R, T>(
  (rows, total): (Vec<R>, u64),
  decode: impl Fn(R) -> Result<T>,
) -> Result<Listing<T>> {
  let rows = rows.into_iter().map(decode).collect::<Result<Vec<_>>>()?;
  Ok((rows, total))
}

// ─── InsuranceStore impl ─────────────────────────────────────────────────────

impl InsuranceStore for SqliteStore {
  type Error = Error;

  // ── Users ───────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let now = date::now();
    let user = User {
      id:         Uuid::new_v4(),
      email:      input.email,
      name:       input.name,
      role:       Role::default(),
      created_at: now,
      updated_at: now,
    };

    let id_str = encode_uuid(user.id);
    let email = user.email.clone();
    let name = user.name.clone();
    let role = user.role.to_string();
    let hash = input.password_hash;
    let at_str = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, email, name, role, password_hash, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![id_str, email, name, role, hash, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    self.user_where("user_id", encode_uuid(id)).await?.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    self.user_where("email", email.to_owned()).await?.map(RawUser::into_user).transpose()
  }

  async fn get_credential(&self, email: &str) -> Result<Option<Credential>> {
    self
      .user_where("email", email.to_owned())
      .await?
      .map(RawUser::into_credential)
      .transpose()
  }

  async fn list_users(&self, query: UserQuery) -> Result<Listing<User>> {
    let mut filters = Columns::new();
    if let Some(id) = query.id {
      filters.push(("user_id", uuid_value(id)));
    }

    let raw = self
      .conn
      .call(move |conn| {
        Ok(select_page(conn, "users", USER_COLUMNS, filters, query.page, RawUser::from_row)?)
      })
      .await?;
    decode_listing(raw, RawUser::into_user)
  }

  async fn update_user(&self, id: Uuid, patch: &UserPatch) -> Result<Option<User>> {
    let mut sets = Columns::new();
    if let Some(name) = &patch.name {
      sets.push(("name", text(name.as_str())));
    }
    if let Some(email) = &patch.email {
      sets.push(("email", text(email.as_str())));
    }
    sets.push(("updated_at", text(encode_dt(date::now()))));

    let key = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        update_columns(conn, "users", "user_id", &key, sets)?;
        Ok(select_one(conn, "users", USER_COLUMNS, "user_id", key, RawUser::from_row)?)
      })
      .await?;
    raw.map(RawUser::into_user).transpose()
  }

  async fn set_role(&self, id: Uuid, role: Role) -> Result<Option<User>> {
    let sets = vec![
      ("role", text(role.to_string())),
      ("updated_at", text(encode_dt(date::now()))),
    ];

    let key = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        update_columns(conn, "users", "user_id", &key, sets)?;
        Ok(select_one(conn, "users", USER_COLUMNS, "user_id", key, RawUser::from_row)?)
      })
      .await?;
    raw.map(RawUser::into_user).transpose()
  }

  async fn delete_user(&self, id: Uuid) -> Result<bool> {
    let key = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM users WHERE user_id = ?1", [key])?))
      .await
      .map_err(Error::from);

    match deleted {
      Ok(n) => Ok(n > 0),
      Err(e) if e.is_foreign_key_violation() => Err(Error::HasDependents(id)),
      Err(e) => Err(e),
    }
  }

  // ── Policies ────────────────────────────────────────────────────────────

  async fn count_policies_for_owner(&self, owner_id: Uuid) -> Result<u64> {
    self.count_where("policies", "owner_id", owner_id).await
  }

  async fn insert_policy(&self, policy: &Policy) -> Result<()> {
    let id_str       = encode_uuid(policy.id);
    let number       = policy.policy_number.clone();
    let owner_str    = encode_uuid(policy.owner_id);
    let property_str = encode_uuid(policy.property_id);
    let type_str     = policy.policy_type.to_string();
    let status_str   = policy.status.to_string();
    let premium      = policy.premium;
    let coverage     = policy.coverage_amount;
    let deductible   = policy.deductible;
    let start_str    = encode_dt(policy.start_date);
    let end_str      = encode_dt(policy.end_date);
    let created_str  = encode_dt(policy.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO policies
             (policy_id, policy_number, owner_id, property_id, policy_type, status,
              premium, coverage_amount, deductible, start_date, end_date, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            id_str,
            number,
            owner_str,
            property_str,
            type_str,
            status_str,
            premium,
            coverage,
            deductible,
            start_str,
            end_str,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_policy(&self, id: Uuid) -> Result<Option<Policy>> {
    let key = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(select_one(conn, "policies", POLICY_COLUMNS, "policy_id", key, RawPolicy::from_row)?)
      })
      .await?;
    raw.map(RawPolicy::into_policy).transpose()
  }

  async fn list_policies(&self, query: PolicyQuery) -> Result<Listing<Policy>> {
    let mut filters = Columns::new();
    if let Some(owner) = query.owner_id {
      filters.push(("owner_id", uuid_value(owner)));
    }
    if let Some(status) = query.status {
      filters.push(("status", text(status.to_string())));
    }
    if let Some(policy_type) = query.policy_type {
      filters.push(("policy_type", text(policy_type.to_string())));
    }

    let raw = self
      .conn
      .call(move |conn| {
        Ok(select_page(conn, "policies", POLICY_COLUMNS, filters, query.page, RawPolicy::from_row)?)
      })
      .await?;
    decode_listing(raw, RawPolicy::into_policy)
  }

  async fn update_policy(&self, id: Uuid, patch: &PolicyPatch) -> Result<Option<Policy>> {
    let mut sets = Columns::new();
    if let Some(policy_type) = patch.policy_type {
      sets.push(("policy_type", text(policy_type.to_string())));
    }
    if let Some(start) = patch.start_date {
      sets.push(("start_date", text(encode_dt(start))));
    }
    if let Some(end) = patch.end_date {
      sets.push(("end_date", text(encode_dt(end))));
    }
    if let Some(premium) = patch.premium {
      sets.push(("premium", Value::Real(premium)));
    }
    if let Some(coverage) = patch.coverage_amount {
      sets.push(("coverage_amount", Value::Real(coverage)));
    }
    if let Some(deductible) = patch.deductible {
      sets.push(("deductible", Value::Real(deductible)));
    }
    if let Some(status) = patch.status {
      sets.push(("status", text(status.to_string())));
    }

    let key = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        update_columns(conn, "policies", "policy_id", &key, sets)?;
        Ok(select_one(conn, "policies", POLICY_COLUMNS, "policy_id", key, RawPolicy::from_row)?)
      })
      .await?;
    raw.map(RawPolicy::into_policy).transpose()
  }

  // ── Claims ──────────────────────────────────────────────────────────────

  async fn count_claims_for_policy(&self, policy_id: Uuid) -> Result<u64> {
    self.count_where("claims", "policy_id", policy_id).await
  }

  async fn insert_claim(&self, claim: &Claim) -> Result<()> {
    let id_str       = encode_uuid(claim.id);
    let number       = claim.claim_number.clone();
    let policy_str   = encode_uuid(claim.policy_id);
    let property_str = encode_uuid(claim.property_id);
    let owner_str    = encode_uuid(claim.owner_id);
    let adjuster_str = claim.adjuster_id.map(encode_uuid);
    let description  = claim.description.clone();
    let amount       = claim.amount;
    let incident_str = encode_dt(claim.incident_date);
    let status_str   = claim.status.to_string();
    let created_str  = encode_dt(claim.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO claims
             (claim_id, claim_number, policy_id, property_id, owner_id, adjuster_id,
              description, amount, incident_date, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            number,
            policy_str,
            property_str,
            owner_str,
            adjuster_str,
            description,
            amount,
            incident_str,
            status_str,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_claim(&self, id: Uuid) -> Result<Option<Claim>> {
    let key = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(select_one(conn, "claims", CLAIM_COLUMNS, "claim_id", key, RawClaim::from_row)?)
      })
      .await?;
    raw.map(RawClaim::into_claim).transpose()
  }

  async fn list_claims(&self, query: ClaimQuery) -> Result<Listing<Claim>> {
    let mut filters = Columns::new();
    if let Some(owner) = query.owner_id {
      filters.push(("owner_id", uuid_value(owner)));
    }
    if let Some(status) = query.status {
      filters.push(("status", text(status.to_string())));
    }
    if let Some(policy_id) = query.policy_id {
      filters.push(("policy_id", uuid_value(policy_id)));
    }

    let raw = self
      .conn
      .call(move |conn| {
        Ok(select_page(conn, "claims", CLAIM_COLUMNS, filters, query.page, RawClaim::from_row)?)
      })
      .await?;
    decode_listing(raw, RawClaim::into_claim)
  }

  async fn update_claim(&self, id: Uuid, patch: &ClaimPatch) -> Result<Option<Claim>> {
    let mut sets = Columns::new();
    if let Some(description) = &patch.description {
      sets.push(("description", text(description.as_str())));
    }
    if let Some(amount) = patch.amount {
      sets.push(("amount", Value::Real(amount)));
    }
    if let Some(incident) = patch.incident_date {
      sets.push(("incident_date", text(encode_dt(incident))));
    }
    if let Some(status) = patch.status {
      sets.push(("status", text(status.to_string())));
    }
    if let Some(adjuster) = patch.adjuster_id {
      sets.push(("adjuster_id", adjuster.map_or(Value::Null, uuid_value)));
    }

    let key = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        update_columns(conn, "claims", "claim_id", &key, sets)?;
        Ok(select_one(conn, "claims", CLAIM_COLUMNS, "claim_id", key, RawClaim::from_row)?)
      })
      .await?;
    raw.map(RawClaim::into_claim).transpose()
  }
}
