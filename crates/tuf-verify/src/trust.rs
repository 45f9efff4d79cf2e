//! Trust database: roles, their authorized keys, and key material.
//!
//! Verification only ever reads trust data through the narrow [`TrustDb`]
//! lookup trait, so the backing store can be an in-memory snapshot, a cache
//! in front of a remote root, or a transactional store.
//!
//! [`MemoryTrustDb`] is the in-memory snapshot. It admits keys and roles with
//! the usual root-manifest checks:
//! - key type must be `ed25519`
//! - a key's claimed ID must match the ID computed from its material
//! - role names are limited to the top-level roles
//! - thresholds are at least one

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ed25519_dalek::VerifyingKey;

use crate::canonicalize::to_canonical_jcs_bytes;
use crate::digest::{sha256_hex, KEY_ID_LENGTH};
use crate::error::{TrustDbError, TrustDbResult};
use crate::types::{KeyDocument, KeyValue, RoleDocument, TrustManifest};
use crate::verifier::{KeyScheme, PUBLIC_KEY_LENGTH};

/// Names of the roles a [`MemoryTrustDb`] accepts.
pub const TOP_LEVEL_ROLES: [&str; 4] = ["root", "targets", "snapshot", "timestamp"];

/// Read-only lookup of roles and keys.
///
/// Implementations must return internally consistent values from a single
/// lookup and must tolerate concurrent readers while keys are rotated.
pub trait TrustDb {
    /// Look up a role by name.
    fn role(&self, name: &str) -> Option<Role>;

    /// Look up a key by ID.
    fn key(&self, key_id: &str) -> Option<Key>;
}

impl<T: TrustDb + ?Sized> TrustDb for &T {
    fn role(&self, name: &str) -> Option<Role> {
        (**self).role(name)
    }

    fn key(&self, key_id: &str) -> Option<Key> {
        (**self).key(key_id)
    }
}

impl<T: TrustDb + ?Sized> TrustDb for Arc<T> {
    fn role(&self, name: &str) -> Option<Role> {
        (**self).role(name)
    }

    fn key(&self, key_id: &str) -> Option<Key> {
        (**self).key(key_id)
    }
}

/// A public signing key. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    id: String,
    scheme: KeyScheme,
    public: [u8; PUBLIC_KEY_LENGTH],
}

impl Key {
    /// Create an Ed25519 key, computing its ID.
    pub fn ed25519(public: [u8; PUBLIC_KEY_LENGTH]) -> TrustDbResult<Self> {
        Self::from_document(&KeyDocument {
            keytype: KeyScheme::Ed25519.keytype().to_string(),
            keyval: KeyValue {
                public: public.to_vec(),
            },
        })
    }

    /// Create a key from its published document.
    pub fn from_document(doc: &KeyDocument) -> TrustDbResult<Self> {
        if doc.keytype != KeyScheme::Ed25519.keytype() {
            return Err(TrustDbError::WrongKeyType {
                keytype: doc.keytype.clone(),
            });
        }

        let id = compute_key_id(doc)?;

        let public: [u8; PUBLIC_KEY_LENGTH] =
            doc.keyval
                .public
                .as_slice()
                .try_into()
                .map_err(|_| TrustDbError::InvalidKey {
                    key_id: id.clone(),
                    reason: format!(
                        "expected {} public key bytes, got {}",
                        PUBLIC_KEY_LENGTH,
                        doc.keyval.public.len()
                    ),
                })?;

        VerifyingKey::from_bytes(&public).map_err(|e| TrustDbError::InvalidKey {
            key_id: id.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            id,
            scheme: KeyScheme::Ed25519,
            public,
        })
    }

    /// Key ID: hex SHA-256 of the canonical key document.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Signature scheme of the key.
    pub fn scheme(&self) -> KeyScheme {
        self.scheme
    }

    /// Raw public key bytes.
    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.public
    }

    /// Published document for this key.
    pub fn to_document(&self) -> KeyDocument {
        KeyDocument {
            keytype: self.scheme.keytype().to_string(),
            keyval: KeyValue {
                public: self.public.to_vec(),
            },
        }
    }
}

/// Compute the ID of a key document.
pub fn compute_key_id(doc: &KeyDocument) -> TrustDbResult<String> {
    let invalid = |reason: String| TrustDbError::InvalidKey {
        key_id: String::new(),
        reason,
    };
    let value = serde_json::to_value(doc).map_err(|e| invalid(e.to_string()))?;
    let canonical = to_canonical_jcs_bytes(&value).map_err(|e| invalid(e.to_string()))?;
    Ok(sha256_hex(&canonical))
}

/// A named trust policy: authorized keys plus a signature threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    name: String,
    key_ids: HashSet<String>,
    threshold: NonZeroUsize,
}

impl Role {
    /// Create a role. The threshold must be at least one.
    pub fn new<I, S>(name: impl Into<String>, key_ids: I, threshold: usize) -> TrustDbResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let threshold = NonZeroUsize::new(threshold).ok_or(TrustDbError::InvalidThreshold {
            role: name.clone(),
            threshold: 0,
        })?;
        Ok(Self {
            name,
            key_ids: key_ids.into_iter().map(Into::into).collect(),
            threshold,
        })
    }

    /// Role name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of distinct authorized keys required.
    pub fn threshold(&self) -> usize {
        self.threshold.get()
    }

    /// Authorized key IDs.
    pub fn key_ids(&self) -> &HashSet<String> {
        &self.key_ids
    }

    /// Whether `key_id` may sign for this role.
    pub fn is_authorized(&self, key_id: &str) -> bool {
        self.key_ids.contains(key_id)
    }
}

/// In-memory trust database.
///
/// Cheap to clone; clones share state. Lookups clone the stored value out
/// under a read lock, so each lookup is internally consistent while another
/// thread rotates keys.
#[derive(Debug, Clone, Default)]
pub struct MemoryTrustDb {
    inner: Arc<RwLock<MemoryTrustDbInner>>,
}

#[derive(Debug, Default)]
struct MemoryTrustDbInner {
    /// Key ID -> Key
    keys: HashMap<String, Key>,

    /// Role name -> Role
    roles: HashMap<String, Role>,
}

impl MemoryTrustDb {
    /// Create an empty trust database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a trust database from a manifest's keys and roles.
    pub fn from_manifest(manifest: &TrustManifest) -> TrustDbResult<Self> {
        let db = Self::new();
        for (key_id, doc) in &manifest.keys {
            db.add_key(key_id, doc)?;
        }
        for (name, doc) in &manifest.roles {
            db.add_role(name, doc)?;
        }
        Ok(db)
    }

    /// Build a trust database from manifest JSON.
    pub fn from_manifest_json(bytes: &[u8]) -> TrustDbResult<Self> {
        let manifest: TrustManifest =
            serde_json::from_slice(bytes).map_err(|e| TrustDbError::Manifest {
                message: e.to_string(),
            })?;
        Self::from_manifest(&manifest)
    }

    /// Load a trust database from a manifest file.
    pub fn load(path: impl AsRef<Path>) -> TrustDbResult<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_manifest_json(&bytes)
    }

    /// Add a key under its claimed ID.
    pub fn add_key(&self, key_id: &str, doc: &KeyDocument) -> TrustDbResult<()> {
        let key = Key::from_document(doc)?;
        if key.id() != key_id {
            return Err(TrustDbError::KeyIdMismatch {
                claimed: key_id.to_string(),
                computed: key.id,
            });
        }

        tracing::debug!(key_id = %key.id(), "trusted key added");
        self.write().keys.insert(key.id.clone(), key);
        Ok(())
    }

    /// Add (or replace) a role.
    pub fn add_role(&self, name: &str, doc: &RoleDocument) -> TrustDbResult<()> {
        if !TOP_LEVEL_ROLES.contains(&name) {
            return Err(TrustDbError::InvalidRole {
                role: name.to_string(),
            });
        }

        let threshold = usize::try_from(doc.threshold)
            .ok()
            .filter(|t| *t >= 1)
            .ok_or_else(|| TrustDbError::InvalidThreshold {
                role: name.to_string(),
                threshold: doc.threshold,
            })?;

        if let Some(bad) = doc.key_ids.iter().find(|id| id.len() != KEY_ID_LENGTH) {
            return Err(TrustDbError::InvalidKeyId {
                role: name.to_string(),
                key_id: bad.clone(),
            });
        }

        let role = Role::new(name, doc.key_ids.iter().cloned(), threshold)?;
        tracing::debug!(
            role = name,
            keys = role.key_ids.len(),
            threshold,
            "role added"
        );
        self.write().roles.insert(name.to_string(), role);
        Ok(())
    }

    /// Remove a key (rotation / revocation).
    pub fn remove_key(&self, key_id: &str) -> Option<Key> {
        let removed = self.write().keys.remove(key_id);
        if removed.is_some() {
            tracing::info!(key_id, "trusted key removed");
        }
        removed
    }

    /// Remove a role.
    pub fn remove_role(&self, name: &str) -> Option<Role> {
        let removed = self.write().roles.remove(name);
        if removed.is_some() {
            tracing::info!(role = name, "role removed");
        }
        removed
    }

    /// All key IDs, sorted.
    pub fn key_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.read().keys.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// All role names, sorted.
    pub fn role_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.read().roles.keys().cloned().collect();
        names.sort();
        names
    }

    // A panicking writer cannot leave a half-inserted entry: every mutation is
    // a single map insert/remove.
    fn read(&self) -> RwLockReadGuard<'_, MemoryTrustDbInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryTrustDbInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TrustDb for MemoryTrustDb {
    fn role(&self, name: &str) -> Option<Role> {
        self.read().roles.get(name).cloned()
    }

    fn key(&self, key_id: &str) -> Option<Key> {
        self.read().keys.get(key_id).cloned()
    }
}
