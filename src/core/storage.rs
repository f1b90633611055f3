use crate::bodies::{RigidBody, State};
use crate::collision::CollisionFilter;
use crate::constraints::BallJoint;
use crate::core::{BodyHandle, JointHandle};
use crate::error::PhysicsError;
use crate::shapes::Collidable;
use crate::Result;

/// Flat, append-only storage for bodies, indexed by [`BodyHandle`].
///
/// Each body occupies the same slot in every array.
#[derive(Debug)]
pub struct BodyStorage {
    bodies: Vec<RigidBody>,
    states: Vec<State>,
    collidables: Vec<Collidable>,
    filters: Vec<CollisionFilter>,
    capacity: usize,
}

impl BodyStorage {
    /// Creates a new storage holding at most `capacity` bodies
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bodies: Vec::new(),
            states: Vec::new(),
            collidables: Vec::new(),
            filters: Vec::new(),
            capacity,
        }
    }

    /// Adds a body and returns its handle
    pub fn add(
        &mut self,
        body: RigidBody,
        state: State,
        collidable: Collidable,
        filter: CollisionFilter,
    ) -> Result<BodyHandle> {
        if self.is_full() {
            return Err(PhysicsError::CapacityExceeded {
                resource: "bodies",
                limit: self.capacity,
            });
        }

        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(body);
        self.states.push(state);
        self.collidables.push(collidable);
        self.filters.push(filter);
        Ok(handle)
    }

    /// Returns the number of bodies
    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns whether the storage is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Returns whether another body would exceed the capacity
    #[inline]
    pub fn is_full(&self) -> bool {
        self.bodies.len() >= self.capacity
    }

    /// Returns the maximum number of bodies
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns whether `handle` refers to a stored body
    #[inline]
    pub fn contains(&self, handle: BodyHandle) -> bool {
        handle.index() < self.bodies.len()
    }

    fn check(&self, handle: BodyHandle) -> Result<usize> {
        if self.contains(handle) {
            Ok(handle.index())
        } else {
            Err(PhysicsError::ResourceNotFound(format!("Body with handle {:?} not found", handle)))
        }
    }

    /// Gets a body by its handle, returning an error if not found
    pub fn get_body(&self, handle: BodyHandle) -> Result<&RigidBody> {
        self.check(handle).map(|i| &self.bodies[i])
    }

    /// Gets the state of a body
    pub fn get_state(&self, handle: BodyHandle) -> Result<&State> {
        self.check(handle).map(|i| &self.states[i])
    }

    /// Gets a mutable reference to the state of a body
    pub fn get_state_mut(&mut self, handle: BodyHandle) -> Result<&mut State> {
        let i = self.check(handle)?;
        Ok(&mut self.states[i])
    }

    /// Gets the collision geometry of a body
    pub fn get_collidable(&self, handle: BodyHandle) -> Result<&Collidable> {
        self.check(handle).map(|i| &self.collidables[i])
    }

    /// Gets the collision filter of a body
    pub fn get_filter(&self, handle: BodyHandle) -> Result<&CollisionFilter> {
        self.check(handle).map(|i| &self.filters[i])
    }

    /// All rigid bodies, by slot
    #[inline]
    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    /// All states, by slot
    #[inline]
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// All collidables, by slot
    #[inline]
    pub fn collidables(&self) -> &[Collidable] {
        &self.collidables
    }

    /// All collision filters, by slot
    #[inline]
    pub fn filters(&self) -> &[CollisionFilter] {
        &self.filters
    }

    /// Splits the storage so states can be mutated while the rest is read
    pub(crate) fn split_mut(&mut self) -> (&mut [State], &[RigidBody], &[Collidable], &[CollisionFilter]) {
        (&mut self.states, &self.bodies, &self.collidables, &self.filters)
    }
}

/// Append-only storage for joints, indexed by [`JointHandle`]
#[derive(Debug)]
pub struct JointStorage {
    joints: Vec<BallJoint>,
    capacity: usize,
}

impl JointStorage {
    /// Creates a new storage holding at most `capacity` joints
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            joints: Vec::new(),
            capacity,
        }
    }

    /// Adds a joint and returns its handle
    pub fn add(&mut self, joint: BallJoint) -> Result<JointHandle> {
        if self.joints.len() >= self.capacity {
            return Err(PhysicsError::CapacityExceeded {
                resource: "joints",
                limit: self.capacity,
            });
        }

        let handle = JointHandle(self.joints.len() as u32);
        self.joints.push(joint);
        Ok(handle)
    }

    /// Gets a joint by its handle, returning an error if not found
    pub fn get_joint(&self, handle: JointHandle) -> Result<&BallJoint> {
        self.joints
            .get(handle.index())
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("Joint with handle {:?} not found", handle)))
    }

    /// Returns the number of joints
    #[inline]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Returns whether the storage is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// All joints, by slot
    #[inline]
    pub fn joints(&self) -> &[BallJoint] {
        &self.joints
    }

    pub(crate) fn joints_mut(&mut self) -> &mut [BallJoint] {
        &mut self.joints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::Material;
    use crate::math::{Matrix3, Vector3};
    use crate::shapes::{ConvexMesh, Shape};
    use std::sync::Arc;

    fn collidable() -> Collidable {
        let mesh = Arc::new(ConvexMesh::cuboid(Vector3::one()).unwrap());
        Collidable::from_shape(Shape::from_mesh(mesh)).unwrap()
    }

    fn body() -> RigidBody {
        RigidBody::new(1.0, Matrix3::identity(), Material::default()).unwrap()
    }

    #[test]
    fn test_slots_are_sequential() {
        let mut storage = BodyStorage::with_capacity(4);
        let a = storage.add(body(), State::default(), collidable(), CollisionFilter::default()).unwrap();
        let b = storage.add(body(), State::default(), collidable(), CollisionFilter::default()).unwrap();

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut storage = BodyStorage::with_capacity(1);
        storage.add(body(), State::default(), collidable(), CollisionFilter::default()).unwrap();

        let result = storage.add(body(), State::default(), collidable(), CollisionFilter::default());
        assert_eq!(
            result,
            Err(PhysicsError::CapacityExceeded { resource: "bodies", limit: 1 })
        );
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_unknown_handle() {
        let storage = BodyStorage::with_capacity(1);
        assert!(matches!(storage.get_state(BodyHandle(0)), Err(PhysicsError::ResourceNotFound(_))));
    }
}
