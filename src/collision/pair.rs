use crate::core::BodyHandle;
use crate::collision::contact::Contact;

/// Whether a pair appeared this step or persisted from the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairType {
    /// First step of overlap
    New,

    /// Overlapping in the previous step as well
    Keep,
}

/// Packs two body indices into a sortable key, B in the high half
#[inline]
pub fn pair_key(body_a: BodyHandle, body_b: BodyHandle) -> u64 {
    ((body_b.0 as u64) << 32) | body_a.0 as u64
}

/// A pair of bodies whose bounds overlap, with its cached contact
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    key: u64,
    body_a: BodyHandle,
    body_b: BodyHandle,

    /// New or kept
    pub pair_type: PairType,

    /// Contact manifold owned by the pair for its whole lifetime
    pub contact: Box<Contact>,
}

impl Pair {
    /// Creates a new pair with an empty contact. The handles are ordered so
    /// that `body_a < body_b`.
    pub fn new(body_a: BodyHandle, body_b: BodyHandle) -> Self {
        let (body_a, body_b) = if body_a <= body_b { (body_a, body_b) } else { (body_b, body_a) };
        Self {
            key: pair_key(body_a, body_b),
            body_a,
            body_b,
            pair_type: PairType::New,
            contact: Box::new(Contact::new()),
        }
    }

    /// Returns the sort key
    #[inline]
    pub fn key(&self) -> u64 {
        self.key
    }

    /// Returns the lower body handle
    #[inline]
    pub fn body_a(&self) -> BodyHandle {
        self.body_a
    }

    /// Returns the higher body handle
    #[inline]
    pub fn body_b(&self) -> BodyHandle {
        self.body_b
    }

    /// Checks if this pair contains the specified body
    #[inline]
    pub fn contains(&self, body: BodyHandle) -> bool {
        self.body_a == body || self.body_b == body
    }

    /// Returns the other body in the pair
    pub fn other(&self, body: BodyHandle) -> Option<BodyHandle> {
        if self.body_a == body {
            Some(self.body_b)
        } else if self.body_b == body {
            Some(self.body_a)
        } else {
            None
        }
    }
}
