use crate::bodies::{MotionType, RigidBody, RigidBodyDesc, State};
use crate::collision::{BroadPhase, BroadPhaseInput, Contact, NarrowPhase, Pair, PairFilter};
use crate::constraints::{BallJoint, ConstraintSolver, SequentialImpulseSolver, SolverBody};
use crate::core::{
    BodyHandle, BodyStorage, HeapAllocator, JointHandle, JointStorage, ScopedBuffer, SimulationConfig,
    StepAllocator,
};
use crate::error::PhysicsError;
use crate::integration::{Integrator, SymplecticEulerIntegrator};
use crate::math::{Aabb, Transform, Vector3};
use crate::shapes::Collidable;
use crate::Result;
use log::{debug, trace, warn};

/// The main physics world that owns every body and advances the simulation
pub struct PhysicsWorld {
    /// Configuration for the simulation
    config: SimulationConfig,

    /// All bodies in the world
    storage: BodyStorage,

    /// All joints in the world
    joints: JointStorage,

    /// Overlapping pairs from the last step, sorted by key
    pairs: Vec<Pair>,

    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    solver: SequentialImpulseSolver,
    integrator: SymplecticEulerIntegrator,

    /// Source of per-step scratch memory
    allocator: Box<dyn StepAllocator>,

    /// Optional user veto on broadphase pairs
    pair_filter: Option<PairFilter>,

    /// Number of completed steps
    frame: u64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Creates a new physics world with default settings
    pub fn new() -> Self {
        Self::build(SimulationConfig::default(), Box::new(HeapAllocator::new()))
    }

    /// Creates a new physics world with the given configuration
    pub fn with_config(config: SimulationConfig) -> Result<Self> {
        Self::with_allocator(config, Box::new(HeapAllocator::new()))
    }

    /// Creates a new physics world that draws step memory from `allocator`
    pub fn with_allocator(config: SimulationConfig, allocator: Box<dyn StepAllocator>) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, allocator))
    }

    fn build(config: SimulationConfig, allocator: Box<dyn StepAllocator>) -> Self {
        Self {
            storage: BodyStorage::with_capacity(config.max_bodies),
            joints: JointStorage::with_capacity(config.max_joints),
            pairs: Vec::new(),
            broad_phase: BroadPhase::new(config.aabb_margin, config.max_pairs),
            narrow_phase: NarrowPhase::new(),
            solver: SequentialImpulseSolver::new(config.solver_iterations, config.contact_bias, config.contact_slop),
            integrator: SymplecticEulerIntegrator::new(config.max_linear_velocity, config.max_angular_velocity),
            allocator,
            pair_filter: None,
            frame: 0,
            config,
        }
    }

    /// Returns a reference to the simulation configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Returns the step allocator
    pub fn allocator(&self) -> &dyn StepAllocator {
        self.allocator.as_ref()
    }

    /// Adds a body and returns its handle.
    ///
    /// An unfinished collidable is finished here. On error the world is unchanged.
    pub fn add_body(&mut self, desc: RigidBodyDesc, mut collidable: Collidable) -> Result<BodyHandle> {
        if self.storage.is_full() {
            return Err(PhysicsError::CapacityExceeded {
                resource: "bodies",
                limit: self.storage.capacity(),
            });
        }

        let body = RigidBody::new(desc.mass, desc.inertia, desc.material)?;

        if !collidable.is_finished() {
            collidable.finish()?;
        }

        for (i, shape) in collidable.shapes().iter().enumerate() {
            if !shape.mesh().has_concave_edges() {
                continue;
            }
            if self.config.reject_concave_meshes {
                return Err(PhysicsError::InvalidGeometry(format!("shape {} has concave edges", i)));
            }
            warn!("shape {} of body {} has concave edges; contacts may be wrong", i, self.storage.len());
        }

        let mut state = desc.state;
        state.orientation = state.orientation.normalize();
        if !state.position.is_finite() || !state.linear_velocity.is_finite() || !state.angular_velocity.is_finite() {
            return Err(PhysicsError::InvalidParameter("initial state must be finite".to_string()));
        }

        let handle = self.storage.add(body, state, collidable, desc.filter)?;
        debug!(
            "added body {:?} ({:?}, mass {}) at {}",
            handle, state.motion_type, desc.mass, state.position
        );
        Ok(handle)
    }

    /// Pins `anchor_a` (local to `body_a`) to `anchor_b` (local to `body_b`)
    pub fn add_ball_joint(
        &mut self,
        body_a: BodyHandle,
        body_b: BodyHandle,
        anchor_a: Vector3,
        anchor_b: Vector3,
    ) -> Result<JointHandle> {
        if body_a == body_b {
            return Err(PhysicsError::InvalidParameter(
                "a joint needs two different bodies".to_string(),
            ));
        }
        self.storage.get_body(body_a)?;
        self.storage.get_body(body_b)?;

        let joint = BallJoint::new(body_a, body_b, anchor_a, anchor_b).with_bias(self.config.joint_bias);
        let handle = self.joints.add(joint)?;
        debug!("added ball joint {:?} between {:?} and {:?}", handle, body_a, body_b);
        Ok(handle)
    }

    /// Steps the simulation forward by one fixed time step.
    ///
    /// Updates pairs, applies gravity, generates contacts, solves, then
    /// integrates. Fails only when the step allocator is exhausted, and every
    /// scratch buffer is reserved before any state changes, so a failed step
    /// leaves the world exactly as it was.
    pub fn step(&mut self) -> Result<()> {
        let dt = self.config.time_step;
        let gravity = self.config.gravity;
        let allocator = self.allocator.as_ref();

        let (states, bodies, collidables, filters) = self.storage.split_mut();

        let mut solver_bodies = ScopedBuffer::filled(allocator, states.len(), SolverBody::default())?;

        // Pair tracking reads positions only, so it can run ahead of gravity
        let input = BroadPhaseInput {
            states: &*states,
            collidables,
            filters,
            pair_filter: self.pair_filter.as_ref(),
        };
        let stats = self.broad_phase.update(input, &mut self.pairs, allocator)?;

        for (state, body) in states.iter_mut().zip(bodies) {
            self.integrator
                .apply_external_force(state, body, gravity * body.mass(), Vector3::zero(), dt);
        }

        let points = self.narrow_phase.detect_collisions(states, collidables, &mut self.pairs);

        self.solver
            .solve(states, bodies, &mut self.pairs, self.joints.joints_mut(), &mut solver_bodies, dt);

        self.integrator.integrate(states, dt);

        self.frame += 1;
        trace!(
            "frame {}: {} bodies, {} pairs ({} new), {} contact points",
            self.frame,
            states.len(),
            self.pairs.len(),
            stats.new_pairs,
            points
        );
        Ok(())
    }

    /// Returns the number of completed steps
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Returns the number of bodies
    pub fn body_count(&self) -> usize {
        self.storage.len()
    }

    /// Returns the number of joints
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Gets the state of a body
    pub fn state(&self, handle: BodyHandle) -> Result<&State> {
        self.storage.get_state(handle)
    }

    /// Gets the mass properties and material of a body
    pub fn rigid_body(&self, handle: BodyHandle) -> Result<&RigidBody> {
        self.storage.get_body(handle)
    }

    /// Gets the collision geometry of a body
    pub fn collidable(&self, handle: BodyHandle) -> Result<&Collidable> {
        self.storage.get_collidable(handle)
    }

    /// Gets a joint
    pub fn joint(&self, handle: JointHandle) -> Result<&BallJoint> {
        self.joints.get_joint(handle)
    }

    /// World-space bounds of a body as the broadphase sees them
    pub fn world_aabb(&self, handle: BodyHandle) -> Result<Aabb> {
        let state = self.storage.get_state(handle)?;
        let collidable = self.storage.get_collidable(handle)?;
        Ok(self.broad_phase.world_aabb(state, collidable))
    }

    /// World transform of one shape of a body
    pub fn shape_transform(&self, handle: BodyHandle, shape_index: usize) -> Result<Transform> {
        let state = self.storage.get_state(handle)?;
        let shape = self
            .storage
            .get_collidable(handle)?
            .shapes()
            .get(shape_index)
            .ok_or_else(|| {
                PhysicsError::ResourceNotFound(format!("Shape {} of body {:?} not found", shape_index, handle))
            })?;
        Ok(state.transform() * shape.offset_transform())
    }

    /// Pairs found by the last step, sorted by key
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// Contacts involving `handle` from the last step, with the other body
    pub fn contacts_of(&self, handle: BodyHandle) -> impl Iterator<Item = (BodyHandle, &Contact)> + '_ {
        self.pairs
            .iter()
            .filter_map(move |pair| pair.other(handle).map(|other| (other, &*pair.contact)))
    }

    /// Switches a body between active and static. Static bodies lose their velocity.
    pub fn set_motion_type(&mut self, handle: BodyHandle, motion_type: MotionType) -> Result<()> {
        let state = self.storage.get_state_mut(handle)?;
        state.motion_type = motion_type;
        if motion_type == MotionType::Static {
            state.linear_velocity = Vector3::zero();
            state.angular_velocity = Vector3::zero();
        }
        Ok(())
    }

    /// Sets the linear velocity of a body
    pub fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vector3) -> Result<()> {
        if !velocity.is_finite() {
            return Err(PhysicsError::InvalidParameter("velocity must be finite".to_string()));
        }
        self.storage.get_state_mut(handle)?.linear_velocity = velocity;
        Ok(())
    }

    /// Sets the angular velocity of a body
    pub fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: Vector3) -> Result<()> {
        if !velocity.is_finite() {
            return Err(PhysicsError::InvalidParameter("velocity must be finite".to_string()));
        }
        self.storage.get_state_mut(handle)?.angular_velocity = velocity;
        Ok(())
    }

    /// Installs a callback that can veto broadphase pairs from the next step on
    pub fn set_pair_filter<F>(&mut self, filter: F)
    where
        F: Fn(BodyHandle, BodyHandle) -> bool + 'static,
    {
        self.pair_filter = Some(Box::new(filter));
    }

    /// Removes the pair filter
    pub fn clear_pair_filter(&mut self) {
        self.pair_filter = None;
    }
}
