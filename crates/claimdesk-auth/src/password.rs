//! Salted argon2id password hashing.

use argon2::{
  Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
  password_hash::SaltString,
};
use rand_core::OsRng;

/// Hash `password` with a fresh random salt, returning a PHC string
/// (`$argon2id$v=19$…`).
pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Check `password` against a stored PHC string. An unparseable hash never
/// verifies.
pub fn verify(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_then_verify() {
    let phc = hash("correct horse").unwrap();
    assert!(phc.starts_with("$argon2id$"));
    assert!(verify("correct horse", &phc));
    assert!(!verify("battery staple", &phc));
  }

  #[test]
  fn salts_differ() {
    assert_ne!(hash("same").unwrap(), hash("same").unwrap());
  }

  #[test]
  fn garbage_hash_never_verifies() {
    assert!(!verify("anything", "not-a-phc-string"));
  }
}
