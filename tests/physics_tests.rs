use approx::assert_relative_eq;
use sat_physics::bodies::Material;
use sat_physics::collision::{CollisionFilter, CollisionGroup, PairType};
use sat_physics::constraints::SolverBody;
use sat_physics::core::{BoundedAllocator, StepAllocator};
use sat_physics::math::{Aabb, Matrix3, Quaternion, Vector3};
use sat_physics::{
    BodyHandle, Collidable, ConvexMesh, MotionType, PhysicsError, PhysicsWorld, RigidBodyDesc, Shape,
    SimulationConfig,
};
use std::mem::size_of;
use std::sync::Arc;

fn cube_collidable(scale: Vector3) -> Collidable {
    let mesh = Arc::new(ConvexMesh::cuboid(scale).unwrap());
    Collidable::from_shape(Shape::from_mesh(mesh)).unwrap()
}

fn add_cube(world: &mut PhysicsWorld, desc: RigidBodyDesc) -> BodyHandle {
    world.add_body(desc, cube_collidable(Vector3::one())).unwrap()
}

fn zero_gravity() -> SimulationConfig {
    SimulationConfig {
        gravity: Vector3::zero(),
        ..Default::default()
    }
}

#[test]
fn test_free_fall() {
    let mut world = PhysicsWorld::new();
    let body = add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::new(0.0, 10.0, 0.0)));

    let dt = world.config().time_step;
    let g = world.config().gravity.y;
    let mut expected_position = 10.0;
    let mut expected_velocity = 0.0;

    for _ in 0..60 {
        world.step().unwrap();

        // Semi-implicit: velocity first, then position with the new velocity
        expected_velocity += g * dt;
        expected_position += expected_velocity * dt;
    }

    let state = world.state(body).unwrap();
    assert_relative_eq!(state.linear_velocity.y, expected_velocity, epsilon = 1e-3);
    assert_relative_eq!(state.position.y, expected_position, epsilon = 1e-3);
    assert_eq!(world.frame(), 60);
}

#[test]
fn test_cube_rests_on_floor() {
    let mut world = PhysicsWorld::new();
    let floor = world
        .add_body(
            RigidBodyDesc::new_static(Vector3::zero()),
            cube_collidable(Vector3::new(20.0, 1.0, 20.0)),
        )
        .unwrap();
    let cube = add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::new(0.0, 1.0, 0.0)));

    for _ in 0..180 {
        world.step().unwrap();
    }

    let state = world.state(cube).unwrap();
    assert!(state.position.y > 0.9 && state.position.y < 1.1, "cube at {}", state.position);
    assert!(state.linear_velocity.y.abs() < 1e-3, "still moving at {}", state.linear_velocity);
    assert!(state.linear_velocity.length() < 1e-2);

    // The floor never moves
    let floor_state = world.state(floor).unwrap();
    assert_eq!(floor_state.position, Vector3::zero());
    assert_eq!(floor_state.orientation, Quaternion::identity());
    assert_eq!(floor_state.linear_velocity, Vector3::zero());

    assert_eq!(world.pairs().len(), 1);
    assert!(!world.pairs()[0].contact.is_empty());
}

#[test]
fn test_static_bodies_ignore_gravity() {
    let mut world = PhysicsWorld::new();
    let a = add_cube(&mut world, RigidBodyDesc::new_static(Vector3::new(0.0, 5.0, 0.0)));
    let b = add_cube(&mut world, RigidBodyDesc::new_static(Vector3::new(0.5, 5.0, 0.0)));

    for _ in 0..10 {
        world.step().unwrap();
    }

    assert_eq!(world.state(a).unwrap().position, Vector3::new(0.0, 5.0, 0.0));
    assert_eq!(world.state(b).unwrap().position, Vector3::new(0.5, 5.0, 0.0));

    // Overlapping statics never form a pair
    assert!(world.pairs().is_empty());
}

#[test]
fn test_pair_lifecycle() {
    let mut world = PhysicsWorld::with_config(zero_gravity()).unwrap();
    let a = add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::zero()));
    let b = add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::new(0.9, 0.0, 0.0)));

    world.step().unwrap();
    assert_eq!(world.pairs().len(), 1);
    let pair = &world.pairs()[0];
    assert_eq!(pair.pair_type, PairType::New);
    assert_eq!((pair.body_a(), pair.body_b()), (a, b));
    assert_eq!(pair.key(), ((b.index() as u64) << 32) | a.index() as u64);
    assert!(!pair.contact.is_empty());

    world.step().unwrap();
    assert_eq!(world.pairs().len(), 1);
    assert_eq!(world.pairs()[0].pair_type, PairType::Keep);

    world.set_linear_velocity(b, Vector3::new(50.0, 0.0, 0.0)).unwrap();
    world.step().unwrap();
    world.step().unwrap();
    assert!(world.pairs().is_empty());
    assert_eq!(world.contacts_of(a).count(), 0);
}

#[test]
fn test_pairs_sorted_by_key() {
    let mut world = PhysicsWorld::with_config(zero_gravity()).unwrap();
    let handles: Vec<BodyHandle> = (0..6)
        .map(|i| add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::new(i as f32 * 0.8, 0.0, 0.0))))
        .collect();

    world.step().unwrap();

    let pairs = world.pairs();
    assert_eq!(pairs.len(), handles.len() - 1);
    assert!(pairs.windows(2).all(|w| w[0].key() < w[1].key()));
    assert!(pairs.iter().all(|p| p.body_a() < p.body_b()));

    let neighbours: Vec<BodyHandle> = world.contacts_of(handles[2]).map(|(other, _)| other).collect();
    assert_eq!(neighbours, vec![handles[1], handles[3]]);
}

#[test]
fn test_collision_filter_and_pair_filter() {
    let mut world = PhysicsWorld::with_config(zero_gravity()).unwrap();
    let debris = CollisionFilter {
        group: CollisionGroup::DEBRIS,
        mask: CollisionGroup::ALL - CollisionGroup::DEBRIS,
    };
    add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::zero()).with_filter(debris));
    add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::new(0.5, 0.0, 0.0)).with_filter(debris));

    world.step().unwrap();
    assert!(world.pairs().is_empty());

    let mut world = PhysicsWorld::with_config(zero_gravity()).unwrap();
    add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::zero()));
    add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::new(0.5, 0.0, 0.0)));
    world.set_pair_filter(|_, _| false);

    world.step().unwrap();
    assert!(world.pairs().is_empty());

    world.clear_pair_filter();
    world.step().unwrap();
    assert_eq!(world.pairs().len(), 1);
}

fn drop_onto_floor(material: Material) -> Vector3 {
    let mut world = PhysicsWorld::with_config(zero_gravity()).unwrap();
    world
        .add_body(
            RigidBodyDesc::new_static(Vector3::zero()).with_material(material),
            cube_collidable(Vector3::new(10.0, 1.0, 10.0)),
        )
        .unwrap();
    let cube = add_cube(
        &mut world,
        RigidBodyDesc::new_dynamic(Vector3::new(0.0, 0.995, 0.0))
            .with_material(material)
            .with_linear_velocity(Vector3::new(0.0, -2.0, 0.0)),
    );

    world.step().unwrap();
    world.state(cube).unwrap().linear_velocity
}

#[test]
fn test_restitution_on_new_contact() {
    let bouncy = drop_onto_floor(Material::new(1.0, 0.0));
    let dead = drop_onto_floor(Material::new(0.0, 0.0));

    assert!(bouncy.y > 0.5, "velocity after bounce {}", bouncy);
    assert!(dead.y < 0.1, "velocity after landing {}", dead);
}

#[test]
fn test_capacity_failure_leaves_world_unchanged() {
    let config = SimulationConfig {
        max_bodies: 1,
        ..Default::default()
    };
    let mut world = PhysicsWorld::with_config(config).unwrap();
    add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::zero()));

    let result = world.add_body(RigidBodyDesc::new_dynamic(Vector3::zero()), cube_collidable(Vector3::one()));
    assert_eq!(
        result,
        Err(PhysicsError::CapacityExceeded {
            resource: "bodies",
            limit: 1
        })
    );
    assert_eq!(world.body_count(), 1);
}

#[test]
fn test_light_body_registers() {
    let mut world = PhysicsWorld::new();
    let side = 0.1;
    let inertia = Matrix3::identity() * (2.0 * side * side / 12.0);

    let body = world
        .add_body(
            RigidBodyDesc::new_dynamic(Vector3::new(0.0, 2.0, 0.0)).with_inertia(inertia),
            cube_collidable(Vector3::splat(side)),
        )
        .unwrap();

    let inv_inertia = world.rigid_body(body).unwrap().inv_inertia();
    assert_relative_eq!(inv_inertia.data[1][1], 600.0, epsilon = 1e-1);
    assert_relative_eq!(inv_inertia.data[0][1], 0.0);

    // Small bodies step like any other
    world.step().unwrap();
    assert!(world.state(body).unwrap().linear_velocity.y < 0.0);
}

#[test]
fn test_invalid_body_rejected() {
    let mut world = PhysicsWorld::new();

    let result = world.add_body(
        RigidBodyDesc::new_dynamic(Vector3::zero()).with_mass(0.0),
        cube_collidable(Vector3::one()),
    );
    assert!(matches!(result, Err(PhysicsError::InvalidParameter(_))));

    let result = world.add_body(
        RigidBodyDesc::new_dynamic(Vector3::zero()).with_inertia(Matrix3::zero()),
        cube_collidable(Vector3::one()),
    );
    assert!(matches!(result, Err(PhysicsError::InvalidParameter(_))));

    let result = world.add_body(RigidBodyDesc::new_dynamic(Vector3::zero()), Collidable::new());
    assert!(matches!(result, Err(PhysicsError::InvalidGeometry(_))));

    assert_eq!(world.body_count(), 0);
}

#[test]
fn test_concave_mesh_policy() {
    let vertices = [
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(-1.0, 1.0, 0.0),
    ];
    let mesh = Arc::new(ConvexMesh::new(&vertices, &[0, 1, 2, 1, 0, 3], Vector3::one()).unwrap());
    let collidable = Collidable::from_shape(Shape::from_mesh(mesh)).unwrap();

    let mut lenient = PhysicsWorld::new();
    assert!(lenient
        .add_body(RigidBodyDesc::new_dynamic(Vector3::zero()), collidable.clone())
        .is_ok());

    let config = SimulationConfig {
        reject_concave_meshes: true,
        ..Default::default()
    };
    let mut strict = PhysicsWorld::with_config(config).unwrap();
    assert!(matches!(
        strict.add_body(RigidBodyDesc::new_dynamic(Vector3::zero()), collidable),
        Err(PhysicsError::InvalidGeometry(_))
    ));
    assert_eq!(strict.body_count(), 0);
}

#[test]
fn test_invalid_config_rejected() {
    let config = SimulationConfig {
        time_step: -1.0,
        ..Default::default()
    };
    assert!(matches!(PhysicsWorld::with_config(config), Err(PhysicsError::InvalidParameter(_))));
}

#[test]
fn test_step_memory_released() {
    let mut world = PhysicsWorld::new();
    add_cube(&mut world, RigidBodyDesc::new_static(Vector3::zero()));
    add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::new(0.0, 0.9, 0.0)));

    world.step().unwrap();

    assert_eq!(world.allocator().bytes_in_use(), 0);
    assert!(world.allocator().peak_bytes() > 0);
}

#[test]
fn test_allocator_exhaustion() {
    let mut world =
        PhysicsWorld::with_allocator(SimulationConfig::default(), Box::new(BoundedAllocator::new(16))).unwrap();
    add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::zero()));
    add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::new(0.5, 0.0, 0.0)));

    let result = world.step();
    assert!(matches!(result, Err(PhysicsError::AllocationFailed { .. })));
    assert_eq!(world.frame(), 0);
    assert!(world.pairs().is_empty());
    assert_eq!(world.allocator().bytes_in_use(), 0);
}

#[test]
fn test_failed_step_leaves_world_untouched() {
    let solver_bytes = 2 * size_of::<SolverBody>();
    let aabb_bytes = 2 * size_of::<Aabb>();

    // Enough for pair tracking alone, then enough for the solver but not both
    for budget in [solver_bytes - 1, solver_bytes + aabb_bytes - 1] {
        let mut world =
            PhysicsWorld::with_allocator(SimulationConfig::default(), Box::new(BoundedAllocator::new(budget)))
                .unwrap();
        let a = add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::zero()));
        let b = add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::new(0.9, 0.0, 0.0)));

        let result = world.step();
        assert!(matches!(result, Err(PhysicsError::AllocationFailed { .. })), "budget {}", budget);
        assert_eq!(world.frame(), 0);
        assert!(world.pairs().is_empty());
        assert_eq!(world.allocator().bytes_in_use(), 0);

        for (handle, position) in [(a, Vector3::zero()), (b, Vector3::new(0.9, 0.0, 0.0))] {
            let state = world.state(handle).unwrap();
            assert_eq!(state.position, position);
            assert_eq!(state.linear_velocity, Vector3::zero());
            assert_eq!(state.angular_velocity, Vector3::zero());
        }
    }
}

#[test]
fn test_ball_joint_holds() {
    let mut world = PhysicsWorld::new();
    let anchor = add_cube(&mut world, RigidBodyDesc::new_static(Vector3::new(0.0, 5.0, 0.0)));
    let bob = add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::new(0.0, 3.0, 0.0)));

    let joint = world
        .add_ball_joint(anchor, bob, Vector3::new(0.0, -1.0, 0.0), Vector3::new(0.0, 1.0, 0.0))
        .unwrap();
    assert_eq!(world.joint_count(), 1);

    for _ in 0..120 {
        world.step().unwrap();
    }

    let joint = world.joint(joint).unwrap();
    let separation = joint.separation(world.state(anchor).unwrap(), world.state(bob).unwrap());
    assert!(separation < 0.05, "joint drifted {}", separation);
    assert_relative_eq!(world.state(bob).unwrap().position.y, 3.0, epsilon = 0.05);
}

#[test]
fn test_ball_joint_validation() {
    let mut world = PhysicsWorld::new();
    let a = add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::zero()));

    assert!(matches!(
        world.add_ball_joint(a, a, Vector3::zero(), Vector3::zero()),
        Err(PhysicsError::InvalidParameter(_))
    ));

    // A handle from a bigger world is unknown here
    let mut other = PhysicsWorld::new();
    add_cube(&mut other, RigidBodyDesc::new_dynamic(Vector3::zero()));
    let foreign = add_cube(&mut other, RigidBodyDesc::new_dynamic(Vector3::zero()));

    assert!(matches!(
        world.add_ball_joint(a, foreign, Vector3::zero(), Vector3::zero()),
        Err(PhysicsError::ResourceNotFound(_))
    ));
    assert!(matches!(world.state(foreign), Err(PhysicsError::ResourceNotFound(_))));
    assert_eq!(world.joint_count(), 0);
}

#[test]
fn test_orientation_stays_normalized() {
    let mut world = PhysicsWorld::with_config(zero_gravity()).unwrap();
    let tilted = Quaternion::from_axis_angle(Vector3::unit_z(), 0.4);
    let body = add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::zero()).with_orientation(tilted));
    assert_eq!(world.state(body).unwrap().orientation, tilted.normalize());
    world.set_angular_velocity(body, Vector3::new(2.0, 5.0, -1.0)).unwrap();

    for _ in 0..300 {
        world.step().unwrap();
        let q = world.state(body).unwrap().orientation;
        assert_relative_eq!(q.length(), 1.0, epsilon = 1e-4);
    }
}

#[test]
fn test_set_motion_type_static_stops_body() {
    let mut world = PhysicsWorld::new();
    let body = add_cube(&mut world, RigidBodyDesc::new_dynamic(Vector3::new(0.0, 4.0, 0.0)));

    world.step().unwrap();
    world.set_motion_type(body, MotionType::Static).unwrap();
    let frozen = world.state(body).unwrap().position;

    for _ in 0..10 {
        world.step().unwrap();
    }
    assert_eq!(world.state(body).unwrap().position, frozen);
    assert_eq!(world.state(body).unwrap().motion_type, MotionType::Static);
}

#[test]
fn test_shape_transform_and_world_aabb() {
    let mut world = PhysicsWorld::with_config(zero_gravity()).unwrap();
    let mesh = Arc::new(ConvexMesh::cuboid(Vector3::one()).unwrap());
    let mut collidable = Collidable::new();
    collidable
        .add_shape(Shape::new(mesh, Vector3::new(1.0, 0.0, 0.0), Quaternion::identity()))
        .unwrap();

    // Finished on registration
    let body = world
        .add_body(RigidBodyDesc::new_dynamic(Vector3::new(0.0, 2.0, 0.0)), collidable)
        .unwrap();
    assert!(world.collidable(body).unwrap().is_finished());

    let transform = world.shape_transform(body, 0).unwrap();
    assert_relative_eq!(transform.translation, Vector3::new(1.0, 2.0, 0.0), epsilon = 1e-6);
    assert!(matches!(world.shape_transform(body, 1), Err(PhysicsError::ResourceNotFound(_))));

    let aabb = world.world_aabb(body).unwrap();
    assert_relative_eq!(aabb.center, Vector3::new(1.0, 2.0, 0.0), epsilon = 1e-6);
    assert_relative_eq!(aabb.half, Vector3::splat(0.51), epsilon = 1e-6);
}

#[test]
fn test_rigid_body_query() {
    let mut world = PhysicsWorld::new();
    let body = add_cube(
        &mut world,
        RigidBodyDesc::new_dynamic(Vector3::zero())
            .with_mass(4.0)
            .with_material(Material::new(0.5, 0.25)),
    );

    let rigid_body = world.rigid_body(body).unwrap();
    assert_relative_eq!(rigid_body.mass(), 4.0);
    assert_relative_eq!(rigid_body.inv_mass(), 0.25);
    assert_relative_eq!(rigid_body.restitution(), 0.5);
    assert_relative_eq!(rigid_body.friction(), 0.25);
}
