use nalgebra::{UnitQuaternion, Vector3};
use rapier3d::prelude::*;
use std::collections::{HashMap, HashSet};

use super::avatar::locomotion::ConstraintMask;
use super::constants::physics as consts;
use super::touch_events::{ContactKind, ObjectTag};

// Collision groups: the avatar collides with scene geometry, scene objects
// collide with everything (cars must also hit barriers, not just the avatar).
const GROUP_SCENE: Group = Group::GROUP_1;
const GROUP_AVATAR: Group = Group::GROUP_2;

/// A tagged body in the scene. Classification comes from config, never from
/// geometry analysis.
pub struct SceneObject {
    pub tag: ObjectTag,
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
    pub is_trigger: bool,
}

/// Result of a downward surface query.
#[derive(Debug, Clone, Copy)]
pub struct GroundHit {
    pub distance: f32,
    pub normal: Vector3<f32>,
}

/// Wrapper around the Rapier3D physics world. Owns the tagged scene bodies
/// and the avatar's rigid body, and answers the two queries the controller
/// needs: downward surface rays and per-tick overlap sets.
pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,

    /// Tagged scene objects, keyed by scene id
    pub objects: HashMap<u64, SceneObject>,
    /// Maps collider handle back to scene id (for overlap detection)
    pub collider_to_id: HashMap<ColliderHandle, u64>,
    /// The avatar's dynamic body, if spawned
    pub avatar_body: Option<RigidBodyHandle>,
    pub avatar_collider: Option<ColliderHandle>,

    next_id: u64,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self {
            gravity: vector![0.0, -consts::DEFAULT_GRAVITY, 0.0],
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            objects: HashMap::new(),
            collider_to_id: HashMap::new(),
            avatar_body: None,
            avatar_collider: None,
            next_id: 1,
        }
    }

    /// Steps the physics simulation forward by dt seconds
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Refreshes the query pipeline so shape/ray queries see current poses.
    /// Needed before querying mid-tick, after scripted translation.
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Adds a tagged cuboid to the scene and returns its scene id.
    /// - `kinematic` objects (moving cars) are position-driven
    /// - trigger objects (rivers) become sensors with no solid response
    pub fn add_object(
        &mut self,
        position: [f32; 3],
        size: [f32; 3],
        rotation_deg: [f32; 3],
        tag: ObjectTag,
        is_trigger: bool,
        kinematic: bool,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        let rot = UnitQuaternion::from_euler_angles(
            rotation_deg[0].to_radians(),
            rotation_deg[1].to_radians(),
            rotation_deg[2].to_radians(),
        );
        let builder = if kinematic {
            RigidBodyBuilder::kinematic_position_based()
        } else {
            RigidBodyBuilder::fixed()
        };
        let body = builder
            .translation(vector![position[0], position[1], position[2]])
            .rotation(rot.scaled_axis())
            .build();
        let body_handle = self.rigid_body_set.insert(body);

        let collider = ColliderBuilder::cuboid(size[0] / 2.0, size[1] / 2.0, size[2] / 2.0)
            .sensor(is_trigger)
            .collision_groups(InteractionGroups::new(GROUP_SCENE, Group::ALL))
            .build();
        let collider_handle =
            self.collider_set
                .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);

        self.collider_to_id.insert(collider_handle, id);
        self.objects.insert(
            id,
            SceneObject {
                tag,
                body_handle,
                collider_handle,
                is_trigger,
            },
        );
        id
    }

    /// Drives a kinematic object (car lane movement) to a new position.
    pub fn set_object_position(&mut self, id: u64, position: [f32; 3]) {
        if let Some(object) = self.objects.get(&id) {
            if let Some(body) = self.rigid_body_set.get_mut(object.body_handle) {
                if body.is_kinematic() {
                    body.set_next_kinematic_translation(vector![
                        position[0],
                        position[1],
                        position[2]
                    ]);
                } else {
                    body.set_translation(vector![position[0], position[1], position[2]], true);
                }
            }
        }
    }

    pub fn object_position(&self, id: u64) -> Option<Vector3<f32>> {
        let object = self.objects.get(&id)?;
        let body = self.rigid_body_set.get(object.body_handle)?;
        Some(*body.translation())
    }

    pub fn tag_of(&self, id: u64) -> Option<ObjectTag> {
        self.objects.get(&id).map(|o| o.tag)
    }

    /// Solid collision or trigger volume, from the object's sensor flag.
    pub fn contact_kind(&self, id: u64) -> Option<ContactKind> {
        self.objects.get(&id).map(|o| {
            if o.is_trigger {
                ContactKind::Trigger
            } else {
                ContactKind::Solid
            }
        })
    }

    /// Spawns the avatar as a dynamic capsule with rotation locked. Scripted
    /// locomotion drives the horizontal axes; the body only ever simulates
    /// the vertical jump arc.
    pub fn add_avatar(&mut self, position: [f32; 3], rotation: UnitQuaternion<f32>) {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position[0], position[1], position[2]])
            .rotation(rotation.scaled_axis())
            .locked_axes(LockedAxes::ROTATION_LOCKED)
            .build();
        let body_handle = self.rigid_body_set.insert(body);

        let half_height =
            (consts::AVATAR_HEIGHT - 2.0 * consts::AVATAR_RADIUS).max(0.0) / 2.0;
        let collider = ColliderBuilder::capsule_y(half_height, consts::AVATAR_RADIUS)
            .collision_groups(InteractionGroups::new(GROUP_AVATAR, GROUP_SCENE))
            .build();
        let collider_handle =
            self.collider_set
                .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);

        self.avatar_body = Some(body_handle);
        self.avatar_collider = Some(collider_handle);
    }

    pub fn avatar_position(&self) -> Option<Vector3<f32>> {
        let body = self.rigid_body_set.get(self.avatar_body?)?;
        Some(*body.translation())
    }

    pub fn avatar_rotation(&self) -> Option<UnitQuaternion<f32>> {
        let body = self.rigid_body_set.get(self.avatar_body?)?;
        Some(*body.rotation())
    }

    pub fn set_avatar_position(&mut self, position: Vector3<f32>) {
        if let Some(handle) = self.avatar_body {
            if let Some(body) = self.rigid_body_set.get_mut(handle) {
                body.set_translation(position, true);
            }
        }
    }

    pub fn set_avatar_rotation(&mut self, rotation: UnitQuaternion<f32>) {
        if let Some(handle) = self.avatar_body {
            if let Some(body) = self.rigid_body_set.get_mut(handle) {
                body.set_rotation(rotation, true);
            }
        }
    }

    /// Teleports the avatar, zeroing accumulated velocity so the respawned
    /// avatar does not carry its pre-teleport fall.
    pub fn teleport_avatar(&mut self, position: Vector3<f32>, rotation: UnitQuaternion<f32>) {
        if let Some(handle) = self.avatar_body {
            if let Some(body) = self.rigid_body_set.get_mut(handle) {
                body.set_translation(position, true);
                body.set_rotation(rotation, true);
                body.set_linvel(vector![0.0, 0.0, 0.0], true);
                body.set_angvel(vector![0.0, 0.0, 0.0], true);
            }
        }
    }

    /// Applies the locomotion constraint mask to the avatar body.
    pub fn set_avatar_constraints(&mut self, mask: ConstraintMask) {
        if let Some(handle) = self.avatar_body {
            if let Some(body) = self.rigid_body_set.get_mut(handle) {
                body.set_locked_axes(locked_axes_for(mask), true);
            }
        }
    }

    /// One-shot upward jump impulse.
    pub fn apply_avatar_jump_impulse(&mut self, magnitude: f32) {
        if let Some(handle) = self.avatar_body {
            if let Some(body) = self.rigid_body_set.get_mut(handle) {
                body.apply_impulse(vector![0.0, magnitude, 0.0], true);
            }
        }
    }

    pub fn avatar_vertical_velocity(&self) -> Option<f32> {
        let body = self.rigid_body_set.get(self.avatar_body?)?;
        Some(body.linvel().y)
    }

    /// Casts a ray straight down from `origin`, skipping the avatar itself
    /// and trigger volumes, returning hit distance and surface normal.
    pub fn raycast_down(&self, origin: Vector3<f32>) -> Option<GroundHit> {
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![0.0, -1.0, 0.0],
        );

        let mut filter = QueryFilter::default().exclude_sensors();
        if let Some(body_handle) = self.avatar_body {
            filter = filter.exclude_rigid_body(body_handle);
        }

        let (_, intersection) = self.query_pipeline.cast_ray_and_get_normal(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            consts::GROUND_RAY_DISTANCE,
            true, // solid
            filter,
        )?;

        Some(GroundHit {
            distance: intersection.time_of_impact,
            normal: Vector3::new(
                intersection.normal.x,
                intersection.normal.y,
                intersection.normal.z,
            ),
        })
    }

    /// Samples absolute terrain height at a horizontal position by raycasting
    /// down from far above, hitting only ground-classified geometry.
    pub fn sample_height(&self, x: f32, z: f32) -> Option<f32> {
        let ray = Ray::new(
            point![x, consts::HEIGHT_SAMPLE_ORIGIN_Y, z],
            vector![0.0, -1.0, 0.0],
        );

        let ground_only = |handle: ColliderHandle, _: &Collider| {
            self.collider_to_id
                .get(&handle)
                .and_then(|id| self.objects.get(id))
                .map(|o| o.tag == ObjectTag::Ground)
                .unwrap_or(false)
        };
        let filter = QueryFilter::default().predicate(&ground_only);

        let (_, toi) = self.query_pipeline.cast_ray(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            consts::HEIGHT_SAMPLE_ORIGIN_Y + consts::GROUND_RAY_DISTANCE,
            true,
            filter,
        )?;

        Some(consts::HEIGHT_SAMPLE_ORIGIN_Y - toi)
    }

    /// Returns the scene ids of every object currently overlapping the
    /// avatar's collider, sensors included.
    pub fn detect_avatar_contacts(&self) -> HashSet<u64> {
        let mut contacts = HashSet::new();
        let (Some(body_handle), Some(collider_handle)) = (self.avatar_body, self.avatar_collider)
        else {
            return contacts;
        };
        let Some(collider) = self.collider_set.get(collider_handle) else {
            return contacts;
        };

        let shape = collider.shape();
        let pos = collider.position();
        let filter = QueryFilter::default().exclude_rigid_body(body_handle);

        self.query_pipeline.intersections_with_shape(
            &self.rigid_body_set,
            &self.collider_set,
            pos,
            shape,
            filter,
            |other_collider_handle| {
                if let Some(&id) = self.collider_to_id.get(&other_collider_handle) {
                    contacts.insert(id);
                }
                true // continue searching
            },
        );

        contacts
    }
}

/// Maps the locomotion constraint mask onto Rapier locked axes.
fn locked_axes_for(mask: ConstraintMask) -> LockedAxes {
    match mask {
        ConstraintMask::FreezeAll => LockedAxes::TRANSLATION_LOCKED | LockedAxes::ROTATION_LOCKED,
        ConstraintMask::VerticalOnly => {
            LockedAxes::ROTATION_LOCKED
                | LockedAxes::TRANSLATION_LOCKED_X
                | LockedAxes::TRANSLATION_LOCKED_Z
        }
        ConstraintMask::RotationOnly => LockedAxes::ROTATION_LOCKED,
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_world() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        world.add_object(
            [0.0, -0.5, 0.0],
            [200.0, 1.0, 200.0],
            [0.0; 3],
            ObjectTag::Ground,
            false,
            false,
        );
        world
    }

    #[test]
    fn test_raycast_down_hits_ground_with_normal() {
        let mut world = flat_world();
        world.add_avatar([0.0, 5.0, 0.0], UnitQuaternion::identity());
        world.update_query_pipeline();

        let hit = world
            .raycast_down(Vector3::new(0.0, 5.0, 0.0))
            .expect("ray should hit the ground slab");
        assert!((hit.distance - 5.0).abs() < 0.01);
        assert!((hit.normal.y - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_sample_height_ignores_non_ground() {
        let mut world = flat_world();
        // A bridge above the terrain must not affect the terrain sample.
        world.add_object(
            [0.0, 4.0, 0.0],
            [10.0, 0.5, 10.0],
            [0.0; 3],
            ObjectTag::Bridge,
            false,
            false,
        );
        world.update_query_pipeline();

        let height = world.sample_height(0.0, 0.0).expect("terrain sample");
        assert!((height - 0.0).abs() < 0.01);
    }

    #[test]
    fn test_detect_avatar_contacts_sees_sensors() {
        let mut world = flat_world();
        let river = world.add_object(
            [0.0, 1.0, 0.0],
            [4.0, 2.0, 4.0],
            [0.0; 3],
            ObjectTag::River,
            true,
            false,
        );
        world.add_avatar([0.0, 1.0, 0.0], UnitQuaternion::identity());
        world.update_query_pipeline();

        let contacts = world.detect_avatar_contacts();
        assert!(contacts.contains(&river));
        assert_eq!(world.contact_kind(river), Some(ContactKind::Trigger));
    }

    #[test]
    fn test_teleport_zeroes_velocity() {
        let mut world = flat_world();
        world.add_avatar([0.0, 10.0, 0.0], UnitQuaternion::identity());
        for _ in 0..10 {
            world.step(1.0 / 60.0);
        }
        assert!(world.avatar_vertical_velocity().unwrap() < -0.1);

        world.teleport_avatar(Vector3::new(0.0, 5.0, 0.0), UnitQuaternion::identity());
        assert_eq!(world.avatar_vertical_velocity().unwrap(), 0.0);
        assert!((world.avatar_position().unwrap().y - 5.0).abs() < 0.001);
    }
}
