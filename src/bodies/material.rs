/// Surface response properties of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Coefficient of restitution (bounciness), 0-1
    pub restitution: f32,

    /// Coefficient of friction
    pub friction: f32,
}

impl Material {
    /// Creates a new material with the specified properties
    pub fn new(restitution: f32, friction: f32) -> Self {
        Self { restitution, friction }
    }

    /// Restitution used for a contact between two materials
    #[inline]
    pub fn combined_restitution(&self, other: &Self) -> f32 {
        0.5 * (self.restitution + other.restitution)
    }

    /// Friction used for a contact between two materials
    #[inline]
    pub fn combined_friction(&self, other: &Self) -> f32 {
        (self.friction * other.friction).sqrt()
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            restitution: 0.2,
            friction: 0.6,
        }
    }
}
