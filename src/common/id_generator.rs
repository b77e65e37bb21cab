//! Prefixed record ids
//!
//! Ids look like `U_K7NP3XQ2`: an entity tag, an underscore and eight
//! Crockford Base32 characters. The alphabet has no I, L, O or U.

use rand::Rng;

const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

const ID_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityPrefix {
    User,
    Link,
}

impl EntityPrefix {
    fn tag(self) -> char {
        match self {
            EntityPrefix::User => 'U',
            EntityPrefix::Link => 'L',
        }
    }

    /// Fresh random id for this entity type
    pub fn new_id(self) -> String {
        let mut rng = rand::thread_rng();
        let mut id = String::with_capacity(ID_LENGTH + 2);
        id.push(self.tag());
        id.push('_');
        id.extend(
            (0..ID_LENGTH)
                .map(|_| CROCKFORD_ALPHABET[rng.gen_range(0..CROCKFORD_ALPHABET.len())] as char),
        );
        id
    }
}

pub fn generate_user_id() -> String {
    EntityPrefix::User.new_id()
}

pub fn generate_link_id() -> String {
    EntityPrefix::Link.new_id()
}
