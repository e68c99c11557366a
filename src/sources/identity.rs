/// Shape of an identity string handed to the upstream lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    /// 13-digit business tax id (RUC).
    TaxId,
    /// 10-digit personal id (cédula).
    PersonalId,
    Other,
}

fn all_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

pub fn identity_kind(id: &str) -> IdentityKind {
    let id = id.trim();
    if all_digits(id, 13) {
        IdentityKind::TaxId
    } else if all_digits(id, 10) {
        IdentityKind::PersonalId
    } else {
        IdentityKind::Other
    }
}

pub fn looks_like_tax_id(id: &str) -> bool {
    identity_kind(id) == IdentityKind::TaxId
}

pub fn looks_like_personal_id(id: &str) -> bool {
    identity_kind(id) == IdentityKind::PersonalId
}

/// The other form of the same identity: personal id + "001" for a natural
/// person's tax id, or the first ten digits of a tax id.
pub fn paired_identity(id: &str) -> Option<String> {
    let id = id.trim();
    match identity_kind(id) {
        IdentityKind::PersonalId => Some(format!("{}001", id)),
        IdentityKind::TaxId => Some(id[..10].to_string()),
        IdentityKind::Other => None,
    }
}

/// Identities to try for one lookup: the given one, then its pair.
pub fn lookup_candidates(id: &str) -> Vec<String> {
    let id = id.trim();
    let mut candidates = vec![id.to_string()];
    if let Some(pair) = paired_identity(id) {
        if pair != id {
            candidates.push(pair);
        }
    }
    candidates
}
